use crate::utils::error::CuratorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One catalog search hit
///
/// Only the fields the enrichment needs; everything else in the payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl CatalogItem {
    /// Year prefix of `release_date` (`YYYY-MM-DD`)
    pub fn release_year(&self) -> Option<u16> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<CatalogItem>,
}

/// Title plus optional release year
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    pub title: String,
    pub year: Option<u16>,
}

impl SearchQuery {
    pub fn new(title: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            title: title.into(),
            year,
        }
    }

    /// Cache key: case-folded, whitespace-collapsed title and the year
    pub fn cache_key(&self) -> String {
        let title = self
            .title
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        match self.year {
            Some(year) => format!("{}|{}", title, year),
            None => format!("{}|", title),
        }
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => f.write_str(&self.title),
        }
    }
}

/// Parses `Title` or `Title:YYYY`
impl FromStr for SearchQuery {
    type Err = CuratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (title, year) = match s.rsplit_once(':') {
            Some((title, year)) if !year.is_empty() && year.chars().all(|c| c.is_ascii_digit()) => {
                let year = year
                    .parse::<u16>()
                    .map_err(|e| CuratorError::validation(format!("bad year in {:?}: {}", s, e)))?;
                (title, Some(year))
            }
            _ => (s, None),
        };

        let title = title.trim();
        if title.is_empty() {
            return Err(CuratorError::validation(format!("empty title in {:?}", s)));
        }
        Ok(Self::new(title, year))
    }
}

//! Catalog enrichment job
//!
//! Looks each query up in a [`MetadataSource`] and sorts the answers into
//! enriched, not-found, skipped and failed. An open breaker skips the query
//! rather than failing the run; cancellation aborts the run.

use crate::services::catalog::{CatalogItem, MetadataSource, SearchQuery};
use crate::utils::error::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A query paired with the catalog entry chosen for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enriched {
    pub query: SearchQuery,
    pub item: CatalogItem,
}

/// Per-query results of one enrichment run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentReport {
    pub enriched: Vec<Enriched>,
    pub not_found: Vec<SearchQuery>,
    /// Queries not attempted because the catalog was unavailable
    pub skipped: Vec<SearchQuery>,
    pub failed: Vec<(SearchQuery, String)>,
}

impl EnrichmentReport {
    pub fn total(&self) -> usize {
        self.enriched.len() + self.not_found.len() + self.skipped.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

pub struct EnrichmentJob<S: MetadataSource> {
    source: Arc<S>,
}

impl<S: MetadataSource> EnrichmentJob<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub async fn run(
        &self,
        cancel: &CancellationToken,
        queries: &[SearchQuery],
    ) -> Result<EnrichmentReport> {
        let mut report = EnrichmentReport::default();

        for query in queries {
            match self.source.search_movie(cancel, query).await {
                Ok(items) => match best_match(query, &items) {
                    Some(item) => {
                        debug!("Matched {} to catalog id {}", query, item.id);
                        report.enriched.push(Enriched {
                            query: query.clone(),
                            item: item.clone(),
                        });
                    }
                    None => {
                        info!("No catalog entry for {}", query);
                        report.not_found.push(query.clone());
                    }
                },
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) if e.is_circuit_open() => {
                    debug!("Skipping {}: {}", query, e);
                    report.skipped.push(query.clone());
                }
                Err(e) => {
                    warn!("Lookup for {} failed: {}", query, e);
                    report.failed.push((query.clone(), e.to_string()));
                }
            }
        }

        info!(
            "Enrichment finished: {} enriched, {} not found, {} skipped, {} failed",
            report.enriched.len(),
            report.not_found.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

/// The hit whose release year matches the query, else the first hit
fn best_match<'a>(query: &SearchQuery, items: &'a [CatalogItem]) -> Option<&'a CatalogItem> {
    query
        .year
        .and_then(|year| items.iter().find(|item| item.release_year() == Some(year)))
        .or_else(|| items.first())
}

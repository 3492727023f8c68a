//! Movie catalog lookups

mod client;
mod types;

pub use client::{CatalogClient, MetadataSource};
pub use types::{CatalogItem, SearchQuery, SearchResponse};

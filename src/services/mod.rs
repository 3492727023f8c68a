//! Services module
//!
//! This module contains the consumers of the resilience layer: the catalog
//! client and the scheduled jobs.

pub mod catalog;
pub mod jobs;

pub use catalog::{CatalogClient, CatalogItem, MetadataSource, SearchQuery};
pub use jobs::{EnrichmentJob, EnrichmentReport, JobOutcome, JobRunner};

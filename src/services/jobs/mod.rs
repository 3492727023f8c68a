//! Scheduled jobs and their lock lifecycle

mod enrichment;
mod runner;

pub use enrichment::{Enriched, EnrichmentJob, EnrichmentReport};
pub use runner::{JobOutcome, JobRunner};

//! HTTP Client utilities
//!
//! This module provides HTTP client configuration and the resilient client
//! every outbound call to a third-party API goes through.

pub mod resilient;
pub mod types;
pub mod utils;


pub use resilient::ResilientClient;
pub use types::HttpClientConfig;
pub use utils::ClientUtils;

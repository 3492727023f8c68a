//! Validation trait for curator settings

/// Implemented by every configuration section
///
/// The error is a human-readable message naming the offending field;
/// `Config::validate` wraps it in `CuratorError::Config`.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

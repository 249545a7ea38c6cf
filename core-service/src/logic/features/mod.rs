//! Features Module - Event Feature Extraction
//!
//! Turns a log event plus its sensitivity result into the fixed-order
//! numeric vector used by the outlier model.

pub mod extract;
pub mod layout;
pub mod vector;

#[cfg(test)]
mod tests;

pub use extract::{featurize, parse_hour, TimestampError, DEFAULT_HOUR};
pub use layout::{LayoutMismatchError, FEATURE_COUNT, FEATURE_VERSION};
pub use vector::{EventFeatures, FeatureVector};

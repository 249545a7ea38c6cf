//! Sensitivity Module
//!
//! Flags potential sensitive-data exposure (PHI / PII) in free text.
//!
//! ## Structure
//! - `types`: Result types (SensitivityResult, PatternTier)
//! - `rules`: The configurable taxonomy (patterns + keywords)
//! - `detector`: Compiled rules and the detection logic
//!
//! ## Usage
//! ```ignore
//! use grc_core::logic::sensitivity::SensitivityDetector;
//!
//! let detector = SensitivityDetector::with_default_rules();
//! let result = detector.detect("patient SSN 123-45-6789 logged");
//! assert_eq!(result.sensitivity, 5);
//! ```

pub mod types;
pub mod rules;
pub mod detector;

pub use types::{PatternTier, SensitivityResult, MAX_SENSITIVITY, MIN_SENSITIVITY};
pub use rules::{PatternRule, RulesError, SensitivityRules};
pub use detector::SensitivityDetector;

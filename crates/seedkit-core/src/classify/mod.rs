//! Column classification: maps a column's name, type, and table context onto a
//! `SemanticType`, and groups related semantic types into correlated clusters.

pub mod correlations;
pub mod rules;
pub mod semantic;

pub use correlations::{detect_correlations, DetectedCorrelation};
pub use rules::{classify_column, classify_schema};
pub use semantic::{CorrelationGroup, SemanticType};

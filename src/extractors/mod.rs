// src/extractors/mod.rs
pub mod kpi;
pub mod risk;
pub mod section;
pub mod value;

// Re-export key extraction types for convenience
pub use kpi::{classify, ClassificationRule, KpiScanner, MentionPredicate, CLASSIFICATION_RULES};
pub use risk::{RiskAggregator, RISK_BANNER};
pub use section::SectionSegmenter;
pub use value::{parse_value, Magnitude};

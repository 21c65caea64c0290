// src/lib.rs
//! Provenance-tagged KPI extraction from long-form filings.
//!
//! Four stages, each writing an artifact the next one reads:
//! page text extraction, section segmentation, KPI candidate scanning,
//! and raw risk text / validation checklist assembly. Every figure produced
//! is a candidate that an analyst has to confirm.

pub mod config;
pub mod document;
pub mod extractors;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod utils;

pub use config::{EmptyPagePolicy, PipelineConfig};
pub use models::{KpiCandidate, KpiName, MetricType, PageRecord, RiskExtraction, SectionList, SectionRecord};
pub use utils::AppError;

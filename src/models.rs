// src/models.rs
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// --- Page Records ---

/// One page of extracted document text. `page_number` is 1-based and
/// matches the page's position in the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub page_number: u32,
    pub text: String,
}

impl PageRecord {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self { page_number, text: text.into() }
    }

    /// A page with no text layer (e.g. a scanned image page).
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

// --- Section Records ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub title: String,
    pub start_page: u32,
    /// Last page belonging to this section (inclusive).
    pub end_page: u32,
    pub text_snippet: String,
    /// Full text of `start_page` only.
    pub page_text: String,
}

/// The section-list artifact handed from segmentation to the KPI and risk stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionList {
    pub report_name: String,
    pub generated_at: String,
    /// Highest page number, counting pages skipped as blank.
    pub page_count: u32,
    pub sections: Vec<SectionRecord>,
}

// --- KPI Candidates ---

/// Label assigned to a KPI mention from its surrounding text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KpiName {
    #[serde(rename = "Revenue")]
    Revenue,
    #[serde(rename = "Net Income (GAAP)")]
    NetIncome,
    #[serde(rename = "Adjusted EBITDA (Non-GAAP)")]
    AdjustedEbitda,
    #[serde(rename = "Growth Rate")]
    GrowthRate,
    #[serde(rename = "Financial Metric")]
    FinancialMetric,
}

impl KpiName {
    pub fn label(&self) -> &'static str {
        match self {
            KpiName::Revenue => "Revenue",
            KpiName::NetIncome => "Net Income (GAAP)",
            KpiName::AdjustedEbitda => "Adjusted EBITDA (Non-GAAP)",
            KpiName::GrowthRate => "Growth Rate",
            KpiName::FinancialMetric => "Financial Metric",
        }
    }
}

impl fmt::Display for KpiName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricType {
    #[serde(rename = "GAAP/Other")]
    GaapOther,
    #[serde(rename = "Non-GAAP")]
    NonGaap,
}

impl MetricType {
    /// Derived from the KPI label alone.
    pub fn for_kpi(name: KpiName) -> Self {
        if name.label().contains("Non-GAAP") {
            MetricType::NonGaap
        } else {
            MetricType::GaapOther
        }
    }
}

/// Marker that can only ever be `true`. Deserializing `false` is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationRequired;

impl ValidationRequired {
    pub fn get(&self) -> bool {
        true
    }
}

impl Serialize for ValidationRequired {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(true)
    }
}

impl<'de> Deserialize<'de> for ValidationRequired {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if bool::deserialize(deserializer)? {
            Ok(ValidationRequired)
        } else {
            Err(serde::de::Error::custom("validation_required must be true"))
        }
    }
}

/// A machine-suggested figure awaiting analyst confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiCandidate {
    pub kpi_name: KpiName,
    pub raw_text_snippet: String,
    pub raw_value_string: String,
    /// `None` means the raw string needs manual entry.
    pub parsed_value: Option<f64>,
    pub source_page: u32,
    pub validation_required: ValidationRequired,
    pub metric_type: MetricType,
}

impl KpiCandidate {
    pub fn new(
        kpi_name: KpiName,
        raw_text_snippet: String,
        raw_value_string: String,
        parsed_value: Option<f64>,
        source_page: u32,
    ) -> Self {
        Self {
            kpi_name,
            raw_text_snippet,
            raw_value_string,
            parsed_value,
            source_page,
            validation_required: ValidationRequired,
            metric_type: MetricType::for_kpi(kpi_name),
        }
    }
}

// --- Risk Extraction ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskExtraction {
    pub section_title: String,
    pub source_page: u32,
    pub raw_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_type_follows_label() {
        assert_eq!(MetricType::for_kpi(KpiName::AdjustedEbitda), MetricType::NonGaap);
        assert_eq!(MetricType::for_kpi(KpiName::NetIncome), MetricType::GaapOther);
        assert_eq!(MetricType::for_kpi(KpiName::GrowthRate), MetricType::GaapOther);
    }

    #[test]
    fn test_candidate_serializes_labels_and_flag() {
        let candidate = KpiCandidate::new(
            KpiName::AdjustedEbitda,
            "Adjusted EBITDA of $3 million".to_string(),
            "$3 million".to_string(),
            Some(3_000_000.0),
            4,
        );
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["kpi_name"], "Adjusted EBITDA (Non-GAAP)");
        assert_eq!(json["metric_type"], "Non-GAAP");
        assert_eq!(json["validation_required"], true);
        assert_eq!(json["source_page"], 4);
    }

    #[test]
    fn test_null_parsed_value_round_trips() {
        let json = r#"{"kpi_name":"Financial Metric","raw_text_snippet":"x","raw_value_string":"$1.2.3",
            "parsed_value":null,"source_page":2,"validation_required":true,"metric_type":"GAAP/Other"}"#;
        let candidate: KpiCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.parsed_value, None);
        assert!(candidate.validation_required.get());
    }

    #[test]
    fn test_validation_flag_cannot_be_false() {
        let json = r#"{"kpi_name":"Revenue","raw_text_snippet":"x","raw_value_string":"$1",
            "parsed_value":1.0,"source_page":1,"validation_required":false,"metric_type":"GAAP/Other"}"#;
        assert!(serde_json::from_str::<KpiCandidate>(json).is_err());
    }

    #[test]
    fn test_blank_page_detection() {
        assert!(PageRecord::new(3, "  \n\t").is_blank());
        assert!(!PageRecord::new(3, "Item 1A").is_blank());
    }
}

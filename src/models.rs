//! Data models for the metrics pipeline.
//!
//! This module contains the employee record as it is ingested from the
//! backend, the derived aggregate types, and the scale/band enums used to
//! interpret survey responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Score scale used to interpret survey responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScoreScale {
    /// 1-7 Likert scale (canonical)
    #[default]
    Likert7,
    /// 0-10 scale used by older survey exports
    Legacy10,
}

impl ScoreScale {
    /// Highest valid response on this scale.
    pub fn max(&self) -> u8 {
        match self {
            ScoreScale::Likert7 => 7,
            ScoreScale::Legacy10 => 10,
        }
    }

    /// Lowest response counted as a promoter.
    pub fn promoter_min(&self) -> u8 {
        match self {
            ScoreScale::Likert7 => 6,
            ScoreScale::Legacy10 => 9,
        }
    }

    /// Lowest response counted as a neutral.
    pub fn neutral_min(&self) -> u8 {
        match self {
            ScoreScale::Likert7 => 5,
            ScoreScale::Legacy10 => 7,
        }
    }

    /// Highest response counted as a neutral.
    pub fn neutral_max(&self) -> u8 {
        match self {
            ScoreScale::Likert7 => 5,
            ScoreScale::Legacy10 => 8,
        }
    }

    /// Classify a retention response. `None` for values outside the scale.
    ///
    /// Responses may be fractional (averaged imports). Anything at or above
    /// the promoter threshold promotes, only the neutral band itself is
    /// neutral, and everything else from 1 up detracts.
    pub fn classify(&self, value: f64) -> Option<Classification> {
        if !value.is_finite() || value <= 0.0 || value > f64::from(self.max()) {
            None
        } else if value >= f64::from(self.promoter_min()) {
            Some(Classification::Promoter)
        } else if value >= f64::from(self.neutral_min()) && value <= f64::from(self.neutral_max())
        {
            Some(Classification::Neutral)
        } else if value >= 1.0 {
            Some(Classification::Detractor)
        } else {
            None
        }
    }
}

impl fmt::Display for ScoreScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreScale::Likert7 => write!(f, "1-7 Likert"),
            ScoreScale::Legacy10 => write!(f, "0-10 legacy"),
        }
    }
}

/// eNPS classification of a single retention response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Promoter,
    Neutral,
    Detractor,
}

/// Qualitative band for an eNPS score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnpsBand {
    /// Below -20
    Critical,
    /// -20 to -1
    Fair,
    /// 0 to 19
    Good,
    /// 20 to 49
    VeryGood,
    /// 50 and above
    Excellent,
}

impl EnpsBand {
    /// Band for a given eNPS score.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 50 => EnpsBand::Excellent,
            s if s >= 20 => EnpsBand::VeryGood,
            s if s >= 0 => EnpsBand::Good,
            s if s >= -20 => EnpsBand::Fair,
            _ => EnpsBand::Critical,
        }
    }

    /// Returns an emoji representation of the band.
    pub fn emoji(&self) -> &'static str {
        match self {
            EnpsBand::Excellent => "🟢",
            EnpsBand::VeryGood => "🟩",
            EnpsBand::Good => "🟡",
            EnpsBand::Fair => "🟠",
            EnpsBand::Critical => "🔴",
        }
    }
}

impl fmt::Display for EnpsBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnpsBand::Excellent => write!(f, "Excellent"),
            EnpsBand::VeryGood => write!(f, "Very Good"),
            EnpsBand::Good => write!(f, "Good"),
            EnpsBand::Fair => write!(f, "Fair"),
            EnpsBand::Critical => write!(f, "Critical"),
        }
    }
}

/// A single employee as returned by the backend.
///
/// Score fields go through [`deserialize_score`], so a zero, null,
/// missing or malformed value is already `None` here and never needs re-checking downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    /// Opaque employee identifier.
    pub id: String,

    /// Display name.
    #[serde(rename = "nome", default)]
    pub name: String,

    /// Area the employee belongs to.
    #[serde(rename = "area_detalhe_id")]
    pub area_id: String,

    /// Area display name.
    #[serde(rename = "area_nome", default)]
    pub area_name: Option<String>,

    /// Tenure bucket label (e.g. "entre 1 e 2 anos").
    #[serde(rename = "tempo_empresa_nome", default)]
    pub tenure_bucket: Option<String>,

    /// "Expectation of retention" survey response.
    #[serde(
        rename = "expectativa_permanencia",
        default,
        deserialize_with = "deserialize_score"
    )]
    pub retention_expectation: Option<f64>,

    /// Overall average survey score.
    #[serde(
        rename = "score_medio_geral",
        default,
        deserialize_with = "deserialize_score"
    )]
    pub overall_score: Option<f64>,
}

impl EmployeeRecord {
    /// Creates a record with only the fields the aggregator reads.
    #[cfg(test)]
    pub fn scored(
        id: &str,
        area_id: &str,
        retention_expectation: Option<u8>,
        overall_score: Option<f64>,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
            area_id: area_id.to_string(),
            area_name: None,
            tenure_bucket: None,
            retention_expectation: retention_expectation.map(f64::from),
            overall_score,
        }
    }
}

/// Read a numeric score from any JSON shape the backend may send.
fn score_from_value(value: &Value) -> Option<f64> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if raw.is_finite() && raw > 0.0 {
        Some(raw)
    } else {
        None
    }
}

/// Deserialize a fractional score, mapping 0 / null / malformed to `None`.
pub fn deserialize_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(score_from_value))
}

/// One page of a paginated backend listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    #[serde(default)]
    pub total: usize,
    /// 1-indexed page number, when echoed back.
    #[serde(default)]
    pub page: Option<usize>,
    /// Page size, when echoed back.
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// A company known to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    #[serde(rename = "nome")]
    pub name: String,
}

/// Flattened organizational path of one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyEntry {
    #[serde(rename = "diretoria_id")]
    pub directorate_id: String,
    #[serde(rename = "diretoria")]
    pub directorate: String,
    #[serde(rename = "gerencia_id")]
    pub management_id: String,
    #[serde(rename = "gerencia")]
    pub management: String,
    #[serde(rename = "coordenacao_id")]
    pub coordination_id: String,
    #[serde(rename = "coordenacao")]
    pub coordination: String,
    pub area_id: String,
    #[serde(rename = "area")]
    pub area_name: String,
}

/// Metrics derived from a collection of employee records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Number of records in the input, answered or not.
    pub total_employees: usize,
    pub promoters: usize,
    pub neutrals: usize,
    pub detractors: usize,
    /// eNPS in [-100, 100]; `None` when nobody answered.
    pub enps_score: Option<i32>,
    /// Mean of valid overall scores; `None` when there are none.
    pub average_score: Option<f64>,
}

impl AggregateResult {
    /// Number of records with a valid retention response.
    pub fn valid_responses(&self) -> usize {
        self.promoters + self.neutrals + self.detractors
    }

    fn pct(&self, count: usize) -> Option<f64> {
        let valid = self.valid_responses();
        if valid == 0 {
            return None;
        }
        let pct = count as f64 * 100.0 / valid as f64;
        Some((pct * 100.0).round() / 100.0)
    }

    /// Promoters as a percentage of valid responses (2 decimals).
    pub fn promoter_pct(&self) -> Option<f64> {
        self.pct(self.promoters)
    }

    /// Neutrals as a percentage of valid responses (2 decimals).
    pub fn neutral_pct(&self) -> Option<f64> {
        self.pct(self.neutrals)
    }

    /// Detractors as a percentage of valid responses (2 decimals).
    pub fn detractor_pct(&self) -> Option<f64> {
        self.pct(self.detractors)
    }

    /// Qualitative band of the eNPS score, if any.
    pub fn band(&self) -> Option<EnpsBand> {
        self.enps_score.map(EnpsBand::from_score)
    }
}

/// Aggregate metrics for one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSummary {
    pub area_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_name: Option<String>,
    pub metrics: AggregateResult,
}

impl AreaSummary {
    /// Name to show for this area, falling back to its id.
    pub fn label(&self) -> &str {
        self.area_name.as_deref().unwrap_or(&self.area_id)
    }
}

/// Headcount for one area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaCount {
    pub area_id: String,
    pub total_employees: usize,
}

/// Per-area metrics plus the extremes across areas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaRollup {
    /// Areas in first-encountered order.
    pub areas: Vec<AreaSummary>,
    /// Index into `areas` of the highest eNPS.
    pub best: Option<usize>,
    /// Index into `areas` of the lowest eNPS.
    pub worst: Option<usize>,
    /// Mean of the areas' eNPS scores (areas without one excluded).
    pub mean_enps: Option<f64>,
}

impl AreaRollup {
    /// The area with the highest eNPS.
    pub fn best_area(&self) -> Option<&AreaSummary> {
        self.best.and_then(|i| self.areas.get(i))
    }

    /// The area with the lowest eNPS.
    pub fn worst_area(&self) -> Option<&AreaSummary> {
        self.worst.and_then(|i| self.areas.get(i))
    }

    /// Headcount per area, in rollup order.
    pub fn employee_counts(&self) -> Vec<AreaCount> {
        self.areas
            .iter()
            .map(|a| AreaCount {
                area_id: a.area_id.clone(),
                total_employees: a.metrics.total_employees,
            })
            .collect()
    }
}

/// A node in the organizational headcount tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: String,
    pub name: String,
    pub level: HierarchyLevel,
    pub total_employees: usize,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<HierarchyNode>,
}

/// Level of a hierarchy node, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyLevel {
    Directorate,
    Management,
    Coordination,
    Area,
}

/// Headcount in one tenure bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenureBucket {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

/// Metadata about the metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Backend the data was fetched from.
    pub api_url: String,
    /// Company the report covers, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Scale used to interpret responses.
    pub scale: ScoreScale,
    /// Number of areas fetched.
    pub areas_fetched: usize,
    /// Duration of fetch + aggregation in seconds.
    pub duration_seconds: f64,
}

/// The complete metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Metrics over every fetched employee.
    pub overall: AggregateResult,
    /// Per-area metrics and extremes.
    pub rollup: AreaRollup,
    /// Headcount tree, when the hierarchy was fetched.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub hierarchy: Vec<HierarchyNode>,
    /// Tenure distribution over all fetched employees.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tenure: Vec<TenureBucket>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_likert7_boundaries() {
        let scale = ScoreScale::Likert7;
        assert_eq!(scale.classify(7.0), Some(Classification::Promoter));
        assert_eq!(scale.classify(6.0), Some(Classification::Promoter));
        assert_eq!(scale.classify(5.0), Some(Classification::Neutral));
        assert_eq!(scale.classify(4.0), Some(Classification::Detractor));
        assert_eq!(scale.classify(1.0), Some(Classification::Detractor));
        assert_eq!(scale.classify(0.0), None);
        assert_eq!(scale.classify(8.0), None);
    }

    #[test]
    fn test_fractional_responses_classify() {
        let scale = ScoreScale::Likert7;
        assert_eq!(scale.classify(6.5), Some(Classification::Promoter));
        assert_eq!(scale.classify(5.5), Some(Classification::Detractor));
        assert_eq!(scale.classify(4.9), Some(Classification::Detractor));
        assert_eq!(scale.classify(2.5), Some(Classification::Detractor));
        assert_eq!(scale.classify(0.5), None);
        assert_eq!(scale.classify(7.5), None);
        assert_eq!(scale.classify(f64::NAN), None);

        let legacy = ScoreScale::Legacy10;
        assert_eq!(legacy.classify(7.5), Some(Classification::Neutral));
        assert_eq!(legacy.classify(8.5), Some(Classification::Detractor));
        assert_eq!(legacy.classify(9.5), Some(Classification::Promoter));
    }

    #[test]
    fn test_legacy10_boundaries() {
        let scale = ScoreScale::Legacy10;
        assert_eq!(scale.classify(10.0), Some(Classification::Promoter));
        assert_eq!(scale.classify(9.0), Some(Classification::Promoter));
        assert_eq!(scale.classify(8.0), Some(Classification::Neutral));
        assert_eq!(scale.classify(7.0), Some(Classification::Neutral));
        assert_eq!(scale.classify(6.0), Some(Classification::Detractor));
        assert_eq!(scale.classify(11.0), None);
    }

    #[test]
    fn test_enps_band() {
        assert_eq!(EnpsBand::from_score(100), EnpsBand::Excellent);
        assert_eq!(EnpsBand::from_score(50), EnpsBand::Excellent);
        assert_eq!(EnpsBand::from_score(49), EnpsBand::VeryGood);
        assert_eq!(EnpsBand::from_score(0), EnpsBand::Good);
        assert_eq!(EnpsBand::from_score(-20), EnpsBand::Fair);
        assert_eq!(EnpsBand::from_score(-21), EnpsBand::Critical);
    }

    #[test]
    fn test_record_from_backend_json() {
        let json = r#"{
            "id": "f1",
            "nome": "Ana",
            "area_detalhe_id": "a1",
            "area_nome": "Finance",
            "tempo_empresa_nome": "entre 1 e 2 anos",
            "expectativa_permanencia": 6,
            "score_medio_geral": 5.75
        }"#;

        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.area_id, "a1");
        assert_eq!(record.retention_expectation, Some(6.0));
        assert_eq!(record.overall_score, Some(5.75));
        assert_eq!(record.tenure_bucket.as_deref(), Some("entre 1 e 2 anos"));
    }

    #[test]
    fn test_zero_and_missing_scores_are_absent() {
        let json = r#"{"id": "f1", "area_detalhe_id": "a1", "expectativa_permanencia": 0}"#;
        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.retention_expectation, None);
        assert_eq!(record.overall_score, None);

        let json = r#"{"id": "f2", "area_detalhe_id": "a1",
                       "expectativa_permanencia": null, "score_medio_geral": 0.0}"#;
        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.retention_expectation, None);
        assert_eq!(record.overall_score, None);
    }

    #[test]
    fn test_malformed_scores_are_absent() {
        let json = r#"{"id": "f1", "area_detalhe_id": "a1",
                       "expectativa_permanencia": "n/a", "score_medio_geral": [1, 2]}"#;
        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.retention_expectation, None);
        assert_eq!(record.overall_score, None);

        let json = r#"{"id": "f2", "area_detalhe_id": "a1",
                       "expectativa_permanencia": -2, "score_medio_geral": -3}"#;
        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.retention_expectation, None);
        assert_eq!(record.overall_score, None);
    }

    #[test]
    fn test_fractional_responses_are_kept() {
        let json = r#"{"id": "f1", "area_detalhe_id": "a1", "expectativa_permanencia": 6.5}"#;
        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.retention_expectation, Some(6.5));

        let json = r#"{"id": "f2", "area_detalhe_id": "a1",
                       "expectativa_permanencia": "6.5000000000000000"}"#;
        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.retention_expectation, Some(6.5));
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let json = r#"{"id": "f1", "area_detalhe_id": "a1",
                       "expectativa_permanencia": "7", "score_medio_geral": "6.5"}"#;
        let record: EmployeeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.retention_expectation, Some(7.0));
        assert_eq!(record.overall_score, Some(6.5));
    }

    #[test]
    fn test_percentages() {
        let result = AggregateResult {
            total_employees: 4,
            promoters: 2,
            neutrals: 1,
            detractors: 0,
            enps_score: Some(67),
            average_score: None,
        };
        assert_eq!(result.valid_responses(), 3);
        assert_eq!(result.promoter_pct(), Some(66.67));
        assert_eq!(result.neutral_pct(), Some(33.33));
        assert_eq!(result.detractor_pct(), Some(0.0));

        assert_eq!(AggregateResult::default().promoter_pct(), None);
        assert_eq!(AggregateResult::default().band(), None);
    }
}

//! Read-only views of the backend's precomputed dashboard aggregates. The
//! client displays these numbers; it never computes them.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct PeriodInfo {
    pub start_date: String,
    pub end_date: String,
    pub days: u32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DashboardSummary {
    #[serde(default)]
    pub total_processed: u64,
    #[serde(default)]
    pub success_rate: f64,
    #[serde(default)]
    pub total_interviews: u64,
    #[serde(default)]
    pub avg_processing_time: f64,
    #[serde(default)]
    pub health_score: f64,
}

/// Overview payload of `/api/v1/dashboard/overview`. Only the summary block
/// is contractual; the rest is carried through untyped.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardOverview {
    pub period: Option<PeriodInfo>,
    #[serde(default)]
    pub summary: DashboardSummary,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SkillAnalytics {
    /// Skill name to occurrence count across processed CVs.
    #[serde(default)]
    pub skill_frequencies: BTreeMap<String, u64>,
    #[serde(default)]
    pub trending_up: Vec<String>,
    #[serde(default)]
    pub trending_down: Vec<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CareerAnalytics {
    /// Recommended-role name to frequency.
    #[serde(default)]
    pub role_frequencies: BTreeMap<String, u64>,
    /// Confidence bucket ("0.8-0.9" style) to count.
    #[serde(default)]
    pub confidence_distribution: BTreeMap<String, u64>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub environment: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub timestamp: f64,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

impl SkillAnalytics {
    /// Skills sorted by descending frequency, for display.
    pub fn top_skills(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .skill_frequencies
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(limit);
        ranked
    }
}

impl CareerAnalytics {
    pub fn top_roles(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut ranked: Vec<(&str, u64)> = self
            .role_frequencies
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(limit);
        ranked
    }
}

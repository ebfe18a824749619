use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::inventory::{AccountSnapshot, ContainerUsage, MetricsSummary, ShareUsage};

/// Bytes per gigabyte, the unit all pricing tables are expressed in.
pub const GIB: f64 = 1_073_741_824.0;

/// Declaration order is urgency order, so deriving `Ord` makes ascending
/// sorts put the most urgent severity first.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Finding {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub resource: String,
    pub finding: String,
    pub recommendation: String,
    pub remediation: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadProfile {
    Light,
    Moderate,
    Heavy,
}

impl WorkloadProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkloadProfile::Light => "light",
            WorkloadProfile::Moderate => "moderate",
            WorkloadProfile::Heavy => "heavy",
        }
    }
}

/// Always derived from size, tier and SKU through the pricing tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavingsEstimate {
    pub current_tier: String,
    pub recommended_tier: String,
    pub size_bytes: u64,
    pub size_gb: f64,
    pub current_monthly_cost: f64,
    pub optimized_monthly_cost: f64,
    pub monthly_savings: f64,
    pub annual_savings: f64,
    pub savings_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostRecommendation {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub container: String,
    pub current_tier: String,
    pub recommended_tier: String,
    pub affected_size_bytes: u64,
    pub affected_blob_count: u64,
    pub reason: String,
    pub estimated_savings: SavingsEstimate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierCost {
    pub size_bytes: u64,
    pub size_gb: f64,
    pub monthly_cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workload_profile: Option<WorkloadProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostAnalysis {
    pub account: String,
    pub total_size_bytes: u64,
    pub total_size_gb: f64,
    pub sku: String,
    pub tier_costs: BTreeMap<String, TierCost>,
    pub total_monthly_cost: f64,
    pub total_annual_cost: f64,
    pub recommendations: Vec<CostRecommendation>,
    pub total_monthly_savings: f64,
    pub total_annual_savings: f64,
    pub savings_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SecurityAnalysis {
    pub account: String,
    pub security_score: u32,
    pub total_findings: usize,
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GovernanceAnalysis {
    pub account: String,
    pub total_findings: usize,
    pub findings: Vec<Finding>,
}

/// Everything known about one storage account after its processing task ran.
/// Built once per account, never mutated afterwards except for the cost
/// re-analysis pass when the workload profile is auto-detected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountAssessment {
    pub account: AccountSnapshot,
    pub containers: Vec<ContainerUsage>,
    pub file_shares: Vec<ShareUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub governance: Option<GovernanceAnalysis>,
}

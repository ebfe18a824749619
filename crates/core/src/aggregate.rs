//! Fleet-wide rollups over the per-account assessments. All functions are
//! pure over the assessment slice and make no assumptions about the order
//! the orchestrator completed tasks in.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{AccountAssessment, Severity};

pub const MAX_RECOMMENDATIONS: usize = 20;

const ACCEPTED_TLS_VERSIONS: [&str; 2] = ["TLS1_2", "TLS1_3"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FleetStatistics {
    pub total_storage_accounts: usize,
    pub total_subscriptions: usize,
    pub total_containers: usize,
    pub total_file_shares: usize,
    pub total_blobs: u64,
    pub total_capacity_bytes: u64,
    pub total_stale_size_bytes: u64,
    pub total_monthly_cost: f64,
    pub total_monthly_savings: f64,
    pub average_security_score: f64,
    pub accounts_with_public_access: usize,
    pub accounts_without_public_access: usize,
    pub accounts_with_https_only: usize,
    pub accounts_without_https_only: usize,
    pub accounts_with_soft_delete: usize,
    pub accounts_without_soft_delete: usize,
    pub accounts_with_versioning: usize,
    pub accounts_with_tls12: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FindingsStatistics {
    pub total: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    Security,
    Governance,
    Cost,
}

impl RecommendationCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            RecommendationCategory::Security => "security",
            RecommendationCategory::Governance => "governance",
            RecommendationCategory::Cost => "cost",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub account: String,
    pub severity: Severity,
    pub title: String,
    pub finding: String,
    pub impact: String,
    pub recommendation: String,
    pub estimated_savings: f64,
    pub category: RecommendationCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountSummaryRow {
    pub name: String,
    pub location: String,
    pub sku: String,
    pub size_bytes: u64,
    pub container_count: usize,
    pub share_count: usize,
    pub security_score: u32,
    pub monthly_cost: f64,
    pub potential_savings: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSummary {
    pub statistics: FleetStatistics,
    pub findings_statistics: FindingsStatistics,
    pub top_recommendations: Vec<Recommendation>,
    pub account_summaries: Vec<AccountSummaryRow>,
}

pub fn summarize(assessments: &[AccountAssessment]) -> FleetSummary {
    FleetSummary {
        statistics: statistics(assessments),
        findings_statistics: findings_statistics(assessments),
        top_recommendations: top_recommendations(assessments),
        account_summaries: account_summaries(assessments),
    }
}

pub fn statistics(assessments: &[AccountAssessment]) -> FleetStatistics {
    let subscriptions: HashSet<&str> = assessments
        .iter()
        .map(|a| a.account.subscription_id.as_str())
        .collect();

    let container_bytes: u64 = assessments
        .iter()
        .flat_map(|a| a.containers.iter())
        .map(|c| c.total_size_bytes)
        .sum();
    let share_bytes: u64 = assessments
        .iter()
        .flat_map(|a| a.file_shares.iter())
        .map(|s| s.usage_bytes)
        .sum();

    let soft_delete_enabled = |a: &AccountAssessment| {
        a.account
            .blob_service_properties
            .delete_retention_policy
            .enabled
    };

    FleetStatistics {
        total_storage_accounts: assessments.len(),
        total_subscriptions: subscriptions.len(),
        total_containers: assessments.iter().map(|a| a.containers.len()).sum(),
        total_file_shares: assessments.iter().map(|a| a.file_shares.len()).sum(),
        total_blobs: assessments
            .iter()
            .flat_map(|a| a.containers.iter())
            .map(|c| c.blob_count)
            .sum(),
        total_capacity_bytes: container_bytes + share_bytes,
        total_stale_size_bytes: assessments
            .iter()
            .flat_map(|a| a.containers.iter())
            .map(|c| c.stale_size_bytes)
            .sum(),
        total_monthly_cost: assessments
            .iter()
            .filter_map(|a| a.cost.as_ref())
            .map(|c| c.total_monthly_cost)
            .sum(),
        total_monthly_savings: assessments
            .iter()
            .filter_map(|a| a.cost.as_ref())
            .map(|c| c.total_monthly_savings)
            .sum(),
        average_security_score: if assessments.is_empty() {
            0.0
        } else {
            let total: u32 = assessments
                .iter()
                .filter_map(|a| a.security.as_ref())
                .map(|s| s.security_score)
                .sum();
            f64::from(total) / assessments.len() as f64
        },
        accounts_with_public_access: assessments
            .iter()
            .filter(|a| a.account.allow_blob_public_access == Some(true))
            .count(),
        accounts_without_public_access: assessments
            .iter()
            .filter(|a| a.account.allow_blob_public_access != Some(true))
            .count(),
        accounts_with_https_only: assessments
            .iter()
            .filter(|a| a.account.https_only == Some(true))
            .count(),
        accounts_without_https_only: assessments
            .iter()
            .filter(|a| a.account.https_only != Some(true))
            .count(),
        accounts_with_soft_delete: assessments
            .iter()
            .filter(|a| soft_delete_enabled(a))
            .count(),
        accounts_without_soft_delete: assessments
            .iter()
            .filter(|a| !soft_delete_enabled(a))
            .count(),
        accounts_with_versioning: assessments
            .iter()
            .filter(|a| a.account.blob_service_properties.is_versioning_enabled)
            .count(),
        accounts_with_tls12: assessments
            .iter()
            .filter(|a| {
                a.account
                    .min_tls_version
                    .as_deref()
                    .is_some_and(|v| ACCEPTED_TLS_VERSIONS.contains(&v))
            })
            .count(),
    }
}

pub fn findings_statistics(assessments: &[AccountAssessment]) -> FindingsStatistics {
    let mut stats = FindingsStatistics::default();

    let all_findings = assessments.iter().flat_map(|a| {
        a.security
            .iter()
            .flat_map(|s| s.findings.iter())
            .chain(a.governance.iter().flat_map(|g| g.findings.iter()))
    });

    for finding in all_findings {
        stats.total += 1;
        match finding.severity {
            Severity::Critical => stats.critical += 1,
            Severity::High => stats.high += 1,
            Severity::Medium => stats.medium += 1,
            Severity::Low => stats.low += 1,
            Severity::Info => stats.info += 1,
        }
    }

    stats
}

/// Merge the security and governance findings and the cost recommendations
/// into one ranked list: ascending severity rank, then descending savings.
/// Only the top entries are kept.
pub fn top_recommendations(assessments: &[AccountAssessment]) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for assessment in assessments {
        let account = assessment.account.name.as_str();

        let finding_sources = [
            (
                RecommendationCategory::Security,
                assessment.security.as_ref().map(|s| &s.findings),
            ),
            (
                RecommendationCategory::Governance,
                assessment.governance.as_ref().map(|g| &g.findings),
            ),
        ];
        for (category, findings) in finding_sources {
            for finding in findings.into_iter().flatten() {
                recommendations.push(Recommendation {
                    account: account.to_string(),
                    severity: finding.severity,
                    title: finding.finding.clone(),
                    finding: finding.finding.clone(),
                    impact: finding.kind.clone(),
                    recommendation: finding.recommendation.clone(),
                    estimated_savings: 0.0,
                    category,
                });
            }
        }

        if let Some(cost) = &assessment.cost {
            for rec in &cost.recommendations {
                recommendations.push(Recommendation {
                    account: account.to_string(),
                    severity: rec.severity,
                    title: format!("Optimize {} tier", rec.container),
                    finding: rec.reason.clone(),
                    impact: format!(
                        "Cost optimization: {} to {}",
                        rec.current_tier, rec.recommended_tier
                    ),
                    recommendation: rec.reason.clone(),
                    estimated_savings: rec.estimated_savings.monthly_savings,
                    category: RecommendationCategory::Cost,
                });
            }
        }
    }

    recommendations.sort_by(|a, b| {
        a.severity
            .rank()
            .cmp(&b.severity.rank())
            .then_with(|| {
                b.estimated_savings
                    .partial_cmp(&a.estimated_savings)
                    .unwrap_or(Ordering::Equal)
            })
    });
    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

pub fn account_summaries(assessments: &[AccountAssessment]) -> Vec<AccountSummaryRow> {
    assessments
        .iter()
        .map(|a| {
            let container_bytes: u64 = a.containers.iter().map(|c| c.total_size_bytes).sum();
            let share_bytes: u64 = a.file_shares.iter().map(|s| s.usage_bytes).sum();
            AccountSummaryRow {
                name: a.account.name.clone(),
                location: a.account.location.clone(),
                sku: a.account.sku.clone().unwrap_or_default(),
                size_bytes: container_bytes + share_bytes,
                container_count: a.containers.len(),
                share_count: a.file_shares.len(),
                security_score: a.security.as_ref().map_or(0, |s| s.security_score),
                monthly_cost: a.cost.as_ref().map_or(0.0, |c| c.total_monthly_cost),
                potential_savings: a.cost.as_ref().map_or(0.0, |c| c.total_monthly_savings),
            }
        })
        .collect()
}

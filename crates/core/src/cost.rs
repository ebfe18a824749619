use std::collections::BTreeMap;

use crate::config::AssessConfig;
use crate::inventory::{AccountSnapshot, ContainerUsage, ShareUsage};
use crate::pricing::{self, FALLBACK_SKU, FILE_SHARES_TIER};
use crate::types::{
    CostAnalysis, CostRecommendation, SavingsEstimate, Severity, TierCost, WorkloadProfile, GIB,
};

/// Estimates storage spend and tier optimization opportunities for one
/// account. Pure over its inputs; the only state is the workload profile
/// used to price file share capacity.
#[derive(Debug, Clone)]
pub struct CostAnalyzer {
    workload_profile: WorkloadProfile,
}

impl CostAnalyzer {
    pub fn new(workload_profile: WorkloadProfile) -> Self {
        Self { workload_profile }
    }

    pub fn workload_profile(&self) -> WorkloadProfile {
        self.workload_profile
    }

    /// Estimated monthly cost in USD for `size_bytes` stored in the given
    /// tier. Zero bytes cost zero regardless of tier or SKU.
    pub fn estimate_storage_cost(&self, size_bytes: u64, access_tier: &str, sku: &str) -> f64 {
        if size_bytes == 0 {
            return 0.0;
        }

        let size_gb = size_bytes as f64 / GIB;

        if access_tier == FILE_SHARES_TIER {
            return size_gb * pricing::file_share_price_per_gb(self.workload_profile, sku);
        }

        size_gb * pricing::blob_price_per_gb(access_tier, sku)
    }

    pub fn tier_optimization_savings(
        &self,
        current_tier: &str,
        recommended_tier: &str,
        size_bytes: u64,
        sku: &str,
    ) -> SavingsEstimate {
        let current_monthly_cost = self.estimate_storage_cost(size_bytes, current_tier, sku);
        let optimized_monthly_cost = self.estimate_storage_cost(size_bytes, recommended_tier, sku);

        let monthly_savings = current_monthly_cost - optimized_monthly_cost;

        SavingsEstimate {
            current_tier: current_tier.to_string(),
            recommended_tier: recommended_tier.to_string(),
            size_bytes,
            size_gb: size_bytes as f64 / GIB,
            current_monthly_cost,
            optimized_monthly_cost,
            monthly_savings,
            annual_savings: monthly_savings * 12.0,
            savings_percent: if current_monthly_cost > 0.0 {
                monthly_savings / current_monthly_cost * 100.0
            } else {
                0.0
            },
        }
    }

    /// Tier recommendations for one container, derived from its stale data
    /// counts. The Hot-tier stale share is estimated proportionally: the
    /// container-wide stale ratio applied to the Hot bucket, since per-blob
    /// tier/staleness correlation is not collected.
    pub fn analyze_container_optimization(
        &self,
        container: &ContainerUsage,
        config: &AssessConfig,
    ) -> Vec<CostRecommendation> {
        let mut recommendations = Vec::new();

        let stale_size_gb = container.stale_size_bytes as f64 / GIB;
        if stale_size_gb < config.min_size_gb {
            return recommendations;
        }

        if let Some(hot) = container.access_tier_distribution.get("Hot") {
            if hot.count > 0 && container.stale_blob_count > 0 {
                let stale_ratio =
                    container.stale_blob_count as f64 / container.blob_count.max(1) as f64;
                let hot_stale_size = (hot.size_bytes as f64 * stale_ratio) as u64;

                if hot_stale_size > 0 {
                    recommendations.push(CostRecommendation {
                        kind: "tier_optimization".to_string(),
                        severity: Severity::Medium,
                        container: container.name.clone(),
                        current_tier: "Hot".to_string(),
                        recommended_tier: "Cool".to_string(),
                        affected_size_bytes: hot_stale_size,
                        affected_blob_count: (hot.count as f64 * stale_ratio) as u64,
                        reason: format!(
                            "Blobs not accessed in {}+ days should move to the Cool tier",
                            config.cool_tier_days
                        ),
                        estimated_savings: self.tier_optimization_savings(
                            "Hot",
                            "Cool",
                            hot_stale_size,
                            FALLBACK_SKU,
                        ),
                    });
                }
            }
        }

        if container.stale_size_bytes > 0 {
            recommendations.push(CostRecommendation {
                kind: "tier_optimization".to_string(),
                severity: Severity::Low,
                container: container.name.clone(),
                current_tier: "Cool".to_string(),
                recommended_tier: "Archive".to_string(),
                affected_size_bytes: container.stale_size_bytes,
                affected_blob_count: container.stale_blob_count,
                reason: format!(
                    "Data untouched for {}+ days could move to the Archive tier",
                    config.archive_tier_days
                ),
                estimated_savings: self.tier_optimization_savings(
                    "Cool",
                    "Archive",
                    container.stale_size_bytes,
                    FALLBACK_SKU,
                ),
            });
        }

        recommendations
    }

    /// Full cost picture for one account: per-tier monthly costs (zero-size
    /// tiers omitted), a blended file share entry, and the container
    /// recommendations rolled up into savings totals.
    pub fn analyze_account_costs(
        &self,
        account: &AccountSnapshot,
        containers: &[ContainerUsage],
        file_shares: &[ShareUsage],
        config: &AssessConfig,
    ) -> CostAnalysis {
        let sku = account
            .sku
            .clone()
            .unwrap_or_else(|| FALLBACK_SKU.to_string());

        let container_bytes: u64 = containers.iter().map(|c| c.total_size_bytes).sum();
        let share_bytes: u64 = file_shares.iter().map(|s| s.usage_bytes).sum();
        let total_size_bytes = container_bytes + share_bytes;

        let mut tier_costs: BTreeMap<String, TierCost> = BTreeMap::new();
        for tier in ["Hot", "Cool", "Archive"] {
            let tier_size: u64 = containers
                .iter()
                .map(|c| {
                    c.access_tier_distribution
                        .get(tier)
                        .map_or(0, |bucket| bucket.size_bytes)
                })
                .sum();
            if tier_size > 0 {
                tier_costs.insert(
                    tier.to_string(),
                    TierCost {
                        size_bytes: tier_size,
                        size_gb: tier_size as f64 / GIB,
                        monthly_cost: self.estimate_storage_cost(tier_size, tier, &sku),
                        workload_profile: None,
                        note: None,
                    },
                );
            }
        }

        if share_bytes > 0 {
            tier_costs.insert(
                FILE_SHARES_TIER.to_string(),
                TierCost {
                    size_bytes: share_bytes,
                    size_gb: share_bytes as f64 / GIB,
                    monthly_cost: self.estimate_storage_cost(share_bytes, FILE_SHARES_TIER, &sku),
                    workload_profile: Some(self.workload_profile),
                    note: Some(format!(
                        "Estimate based on the \"{}\" workload profile; actual costs vary with transaction patterns",
                        self.workload_profile.as_str()
                    )),
                },
            );
        }

        let total_monthly_cost: f64 = tier_costs.values().map(|t| t.monthly_cost).sum();

        let recommendations: Vec<CostRecommendation> = containers
            .iter()
            .flat_map(|c| self.analyze_container_optimization(c, config))
            .collect();

        let total_monthly_savings: f64 = recommendations
            .iter()
            .map(|r| r.estimated_savings.monthly_savings)
            .sum();

        CostAnalysis {
            account: account.name.clone(),
            total_size_bytes,
            total_size_gb: total_size_bytes as f64 / GIB,
            sku,
            tier_costs,
            total_monthly_cost,
            total_annual_cost: total_monthly_cost * 12.0,
            recommendations,
            total_monthly_savings,
            total_annual_savings: total_monthly_savings * 12.0,
            savings_percent: if total_monthly_cost > 0.0 {
                total_monthly_savings / total_monthly_cost * 100.0
            } else {
                0.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::TierBucket;

    fn analyzer() -> CostAnalyzer {
        CostAnalyzer::new(WorkloadProfile::Moderate)
    }

    fn container_with_hot_stale() -> ContainerUsage {
        // 100 blobs, 20 stale, everything in Hot at 100 GiB total.
        ContainerUsage {
            name: "archive-candidates".to_string(),
            blob_count: 100,
            total_size_bytes: 100 * GIB as u64,
            stale_blob_count: 20,
            stale_size_bytes: 20 * GIB as u64,
            access_tier_distribution: BTreeMap::from([(
                "Hot".to_string(),
                TierBucket {
                    count: 100,
                    size_bytes: 100 * GIB as u64,
                },
            )]),
            ..ContainerUsage::default()
        }
    }

    #[test]
    fn zero_bytes_cost_zero() {
        let a = analyzer();
        assert_eq!(a.estimate_storage_cost(0, "Hot", "Standard_LRS"), 0.0);
        assert_eq!(a.estimate_storage_cost(0, FILE_SHARES_TIER, "Standard_LRS"), 0.0);
        assert_eq!(a.estimate_storage_cost(0, "Nonsense", "Nonsense"), 0.0);
    }

    #[test]
    fn hot_cost_uses_blob_table() {
        let a = analyzer();
        let cost = a.estimate_storage_cost(GIB as u64, "Hot", "Standard_LRS");
        assert!((cost - 0.0184).abs() < 1e-9);
    }

    #[test]
    fn file_share_cost_uses_profile_table() {
        let heavy = CostAnalyzer::new(WorkloadProfile::Heavy);
        let cost = heavy.estimate_storage_cost(GIB as u64, FILE_SHARES_TIER, "Standard_LRS");
        assert!((cost - 0.48).abs() < 1e-9);
    }

    #[test]
    fn savings_are_positive_for_cheaper_target_tier() {
        let a = analyzer();
        let savings = a.tier_optimization_savings("Hot", "Cool", 50 * GIB as u64, "Standard_LRS");
        assert!(savings.monthly_savings > 0.0);
        assert!((savings.annual_savings - savings.monthly_savings * 12.0).abs() < 1e-9);
        assert!(savings.savings_percent > 0.0 && savings.savings_percent < 100.0);
    }

    #[test]
    fn savings_percent_is_zero_when_current_cost_is_zero() {
        let a = analyzer();
        let savings = a.tier_optimization_savings("Hot", "Cool", 0, "Standard_LRS");
        assert_eq!(savings.savings_percent, 0.0);
        assert_eq!(savings.monthly_savings, 0.0);
    }

    #[test]
    fn proportional_hot_stale_share_is_recommended() {
        let a = analyzer();
        let recs =
            a.analyze_container_optimization(&container_with_hot_stale(), &AssessConfig::default());

        // One Hot -> Cool proposal for the proportional stale share plus one
        // Cool -> Archive proposal for the full stale byte total.
        assert_eq!(recs.len(), 2);

        let hot_to_cool = &recs[0];
        assert_eq!(hot_to_cool.current_tier, "Hot");
        assert_eq!(hot_to_cool.recommended_tier, "Cool");
        assert_eq!(hot_to_cool.severity, Severity::Medium);
        // 20% stale ratio applied to 100 GiB of Hot data.
        assert_eq!(hot_to_cool.affected_size_bytes, 20 * GIB as u64);
        assert_eq!(hot_to_cool.affected_blob_count, 20);

        let cool_to_archive = &recs[1];
        assert_eq!(cool_to_archive.recommended_tier, "Archive");
        assert_eq!(cool_to_archive.severity, Severity::Low);
        assert_eq!(cool_to_archive.affected_size_bytes, 20 * GIB as u64);
    }

    #[test]
    fn small_stale_volumes_are_suppressed() {
        let a = analyzer();
        let container = ContainerUsage {
            stale_size_bytes: GIB as u64 / 2,
            ..container_with_hot_stale()
        };
        let recs = a.analyze_container_optimization(&container, &AssessConfig::default());
        assert!(recs.is_empty());
    }

    #[test]
    fn account_costs_sum_tiers_without_double_counting() {
        let a = analyzer();
        let account = AccountSnapshot {
            name: "stprod".to_string(),
            sku: Some("Standard_LRS".to_string()),
            ..AccountSnapshot::default()
        };
        let containers = vec![container_with_hot_stale()];
        let shares = vec![ShareUsage {
            name: "dept-share".to_string(),
            usage_bytes: 10 * GIB as u64,
            ..ShareUsage::default()
        }];

        let analysis = a.analyze_account_costs(&account, &containers, &shares, &AssessConfig::default());

        assert_eq!(analysis.total_size_bytes, 110 * GIB as u64);
        assert_eq!(analysis.tier_costs.len(), 2); // Hot + FileShares, no empty tiers
        assert!(analysis.tier_costs.contains_key("Hot"));
        assert!(analysis.tier_costs.contains_key(FILE_SHARES_TIER));

        let summed: f64 = analysis.tier_costs.values().map(|t| t.monthly_cost).sum();
        assert!((analysis.total_monthly_cost - summed).abs() < 1e-9);

        let expected_hot = 100.0 * 0.0184;
        let expected_shares = 10.0 * 0.20;
        assert!((analysis.total_monthly_cost - (expected_hot + expected_shares)).abs() < 1e-9);

        assert_eq!(analysis.recommendations.len(), 2);
        assert!(analysis.total_monthly_savings > 0.0);
    }

    #[test]
    fn missing_sku_falls_back_without_failing() {
        let a = analyzer();
        let account = AccountSnapshot {
            name: "stnosku".to_string(),
            sku: None,
            ..AccountSnapshot::default()
        };
        let analysis =
            a.analyze_account_costs(&account, &[container_with_hot_stale()], &[], &AssessConfig::default());
        assert_eq!(analysis.sku, "Standard_LRS");
        assert!(analysis.total_monthly_cost > 0.0);
    }
}

use proptest::prelude::*;

use storesweep_core::aggregate::{top_recommendations, MAX_RECOMMENDATIONS};
use storesweep_core::cost::CostAnalyzer;
use storesweep_core::inventory::AccountSnapshot;
use storesweep_core::security::score_findings;
use storesweep_core::types::{
    AccountAssessment, Finding, SecurityAnalysis, Severity, WorkloadProfile,
};

const SKUS: [&str; 6] = [
    "Standard_LRS",
    "Standard_GRS",
    "Standard_RAGRS",
    "Standard_ZRS",
    "Standard_GZRS",
    "Standard_RAGZRS",
];

// Tier pairs where the target is cheaper per GB for every SKU.
const CHEAPER_PAIRS: [(&str, &str); 3] = [("Hot", "Cool"), ("Hot", "Archive"), ("Cool", "Archive")];

fn severity_strategy() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Critical),
        Just(Severity::High),
        Just(Severity::Medium),
        Just(Severity::Low),
        Just(Severity::Info),
    ]
}

fn finding_with(severity: Severity) -> Finding {
    Finding {
        kind: "check".to_string(),
        severity,
        resource: "st".to_string(),
        finding: "observation".to_string(),
        recommendation: "act".to_string(),
        remediation: "fix".to_string(),
    }
}

proptest! {
    #[test]
    fn zero_bytes_always_cost_zero(tier in "\\PC*", sku in "\\PC*") {
        let analyzer = CostAnalyzer::new(WorkloadProfile::Moderate);
        prop_assert_eq!(analyzer.estimate_storage_cost(0, &tier, &sku), 0.0);
    }

    #[test]
    fn costs_are_never_negative(
        size in 0u64..=(1 << 50),
        tier in "\\PC*",
        sku in "\\PC*",
    ) {
        let analyzer = CostAnalyzer::new(WorkloadProfile::Moderate);
        prop_assert!(analyzer.estimate_storage_cost(size, &tier, &sku) >= 0.0);
    }

    #[test]
    fn moving_to_a_cheaper_tier_never_loses_money(
        pair_index in 0usize..CHEAPER_PAIRS.len(),
        sku_index in 0usize..SKUS.len(),
        size in 0u64..=(1 << 50),
    ) {
        let (current, recommended) = CHEAPER_PAIRS[pair_index];
        let analyzer = CostAnalyzer::new(WorkloadProfile::Moderate);
        let savings = analyzer.tier_optimization_savings(current, recommended, size, SKUS[sku_index]);

        prop_assert!(savings.monthly_savings >= 0.0,
            "negative savings for {} -> {} on {}: {}",
            current, recommended, SKUS[sku_index], savings.monthly_savings);
        prop_assert!((savings.annual_savings - savings.monthly_savings * 12.0).abs() < 1e-6);
        prop_assert!(savings.savings_percent >= 0.0 && savings.savings_percent <= 100.0);
    }

    #[test]
    fn security_score_stays_in_range(severities in prop::collection::vec(severity_strategy(), 0..40)) {
        let findings: Vec<Finding> = severities.into_iter().map(finding_with).collect();
        let score = score_findings(&findings);
        prop_assert!(score <= 100);
        if findings.is_empty() {
            prop_assert_eq!(score, 100);
        }
    }

    #[test]
    fn recommendation_list_is_bounded_and_ordered(
        severities in prop::collection::vec(severity_strategy(), 0..60),
    ) {
        let findings: Vec<Finding> = severities.into_iter().map(finding_with).collect();
        let assessment = AccountAssessment {
            account: AccountSnapshot {
                name: "stprop".to_string(),
                ..AccountSnapshot::default()
            },
            containers: Vec::new(),
            file_shares: Vec::new(),
            metrics: None,
            cost: None,
            security: Some(SecurityAnalysis {
                account: "stprop".to_string(),
                security_score: score_findings(&findings),
                total_findings: findings.len(),
                findings,
            }),
            governance: None,
        };

        let recommendations = top_recommendations(&[assessment]);
        prop_assert!(recommendations.len() <= MAX_RECOMMENDATIONS);
        for pair in recommendations.windows(2) {
            prop_assert!(pair[0].severity.rank() <= pair[1].severity.rank());
            if pair[0].severity == pair[1].severity {
                prop_assert!(pair[0].estimated_savings >= pair[1].estimated_savings);
            }
        }
    }
}

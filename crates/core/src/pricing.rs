//! Approximate storage pricing (per GB per month), East US list prices.
//! These are estimates; actual pricing varies by region and commitment.
//! Lookups never fail: unknown tiers and SKUs degrade to the closest
//! common equivalent so a cost estimate is always produced.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::types::WorkloadProfile;

pub const DEFAULT_BLOB_PRICE: f64 = 0.0184;
pub const DEFAULT_FILE_SHARE_PRICE: f64 = 0.20;

/// Pseudo access tier routing file share capacity through the workload
/// profile tables instead of the blob tier tables.
pub const FILE_SHARES_TIER: &str = "FileShares";

pub const FALLBACK_TIER: &str = "Hot";
pub const FALLBACK_SKU: &str = "Standard_LRS";

static BLOB_PRICING: Lazy<HashMap<&'static str, HashMap<&'static str, f64>>> = Lazy::new(|| {
    HashMap::from([
        (
            "Hot",
            HashMap::from([
                ("Standard_LRS", 0.0184),
                ("Standard_GRS", 0.0368),
                ("Standard_RAGRS", 0.046),
                ("Standard_ZRS", 0.0221),
                ("Standard_GZRS", 0.0455),
                ("Standard_RAGZRS", 0.05525),
            ]),
        ),
        (
            "Cool",
            HashMap::from([
                ("Standard_LRS", 0.01),
                ("Standard_GRS", 0.02),
                ("Standard_RAGRS", 0.025),
                ("Standard_ZRS", 0.012),
                ("Standard_GZRS", 0.025),
                ("Standard_RAGZRS", 0.03125),
            ]),
        ),
        (
            "Archive",
            HashMap::from([
                ("Standard_LRS", 0.00099),
                ("Standard_GRS", 0.00198),
                ("Standard_RAGRS", 0.00198),
            ]),
        ),
    ])
});

// Blended storage + transaction cost per profile. Premium SKUs include
// transactions in the storage price, hence the flat rate across profiles.
static FILE_SHARE_PRICING: Lazy<HashMap<WorkloadProfile, HashMap<&'static str, f64>>> =
    Lazy::new(|| {
        HashMap::from([
            (
                WorkloadProfile::Light,
                HashMap::from([
                    ("Standard_LRS", 0.10),
                    ("Standard_GRS", 0.18),
                    ("Standard_ZRS", 0.12),
                    ("Standard_GZRS", 0.22),
                    ("Premium_LRS", 0.20),
                    ("Premium_ZRS", 0.24),
                ]),
            ),
            (
                WorkloadProfile::Moderate,
                HashMap::from([
                    ("Standard_LRS", 0.20),
                    ("Standard_GRS", 0.35),
                    ("Standard_ZRS", 0.25),
                    ("Standard_GZRS", 0.45),
                    ("Premium_LRS", 0.20),
                    ("Premium_ZRS", 0.24),
                ]),
            ),
            (
                WorkloadProfile::Heavy,
                HashMap::from([
                    ("Standard_LRS", 0.48),
                    ("Standard_GRS", 0.75),
                    ("Standard_ZRS", 0.55),
                    ("Standard_GZRS", 0.85),
                    ("Premium_LRS", 0.20),
                    ("Premium_ZRS", 0.24),
                ]),
            ),
        ])
    });

/// Price per GB-month for blob capacity in the given tier and SKU.
pub fn blob_price_per_gb(access_tier: &str, sku: &str) -> f64 {
    let tier = if BLOB_PRICING.contains_key(access_tier) {
        access_tier
    } else {
        FALLBACK_TIER
    };
    let table = &BLOB_PRICING[tier];

    let sku = if table.contains_key(sku) {
        sku
    } else {
        debug!(sku, tier, "SKU not found in blob pricing, using {FALLBACK_SKU}");
        FALLBACK_SKU
    };

    table.get(sku).copied().unwrap_or(DEFAULT_BLOB_PRICE)
}

/// Blended price per GB-month for file share capacity under the given
/// workload profile and SKU.
pub fn file_share_price_per_gb(profile: WorkloadProfile, sku: &str) -> f64 {
    let table = &FILE_SHARE_PRICING[&profile];

    let sku = if table.contains_key(sku) {
        sku
    } else {
        debug!(sku, profile = profile.as_str(), "SKU not found in file share pricing, using {FALLBACK_SKU}");
        FALLBACK_SKU
    };

    table
        .get(sku)
        .copied()
        .unwrap_or(DEFAULT_FILE_SHARE_PRICE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tier_and_sku_returns_table_price() {
        assert_eq!(blob_price_per_gb("Hot", "Standard_LRS"), 0.0184);
        assert_eq!(blob_price_per_gb("Cool", "Standard_GRS"), 0.02);
        assert_eq!(blob_price_per_gb("Archive", "Standard_LRS"), 0.00099);
    }

    #[test]
    fn unknown_tier_falls_back_to_hot() {
        assert_eq!(
            blob_price_per_gb("Premium", "Standard_LRS"),
            blob_price_per_gb("Hot", "Standard_LRS")
        );
        assert_eq!(
            blob_price_per_gb("None", "Standard_ZRS"),
            blob_price_per_gb("Hot", "Standard_ZRS")
        );
    }

    #[test]
    fn unknown_sku_falls_back_to_lrs() {
        assert_eq!(
            blob_price_per_gb("Cool", "UltraDisk_LRS"),
            blob_price_per_gb("Cool", "Standard_LRS")
        );
        // Archive has no ZRS row, so ZRS degrades to the LRS archive price.
        assert_eq!(
            blob_price_per_gb("Archive", "Standard_ZRS"),
            blob_price_per_gb("Archive", "Standard_LRS")
        );
    }

    #[test]
    fn file_share_prices_scale_with_profile() {
        let light = file_share_price_per_gb(WorkloadProfile::Light, "Standard_LRS");
        let moderate = file_share_price_per_gb(WorkloadProfile::Moderate, "Standard_LRS");
        let heavy = file_share_price_per_gb(WorkloadProfile::Heavy, "Standard_LRS");
        assert!(light < moderate && moderate < heavy);
    }

    #[test]
    fn premium_file_shares_ignore_profile() {
        assert_eq!(
            file_share_price_per_gb(WorkloadProfile::Light, "Premium_LRS"),
            file_share_price_per_gb(WorkloadProfile::Heavy, "Premium_LRS"),
        );
    }

    #[test]
    fn file_share_unknown_sku_falls_back_to_lrs() {
        assert_eq!(
            file_share_price_per_gb(WorkloadProfile::Moderate, "Mystery_SKU"),
            file_share_price_per_gb(WorkloadProfile::Moderate, "Standard_LRS"),
        );
    }

    #[test]
    fn all_prices_are_positive() {
        for tier in ["Hot", "Cool", "Archive"] {
            for sku in [
                "Standard_LRS",
                "Standard_GRS",
                "Standard_RAGRS",
                "Standard_ZRS",
                "Standard_GZRS",
                "Standard_RAGZRS",
            ] {
                assert!(blob_price_per_gb(tier, sku) > 0.0);
            }
        }
        for profile in [
            WorkloadProfile::Light,
            WorkloadProfile::Moderate,
            WorkloadProfile::Heavy,
        ] {
            for sku in [
                "Standard_LRS",
                "Standard_GRS",
                "Standard_ZRS",
                "Standard_GZRS",
                "Premium_LRS",
                "Premium_ZRS",
            ] {
                assert!(file_share_price_per_gb(profile, sku) > 0.0);
            }
        }
    }
}

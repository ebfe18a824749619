use tracing::info;

use crate::inventory::ShareUsage;
use crate::types::{WorkloadProfile, GIB};

/// Share names that indicate profile-virtualization workloads, which drive
/// continuous transactional I/O regardless of capacity.
const HEAVY_WORKLOAD_KEYWORDS: [&str; 7] = [
    "fslogix",
    "profile",
    "userprofile",
    "avd",
    "wvd",
    "vdi",
    "citrix",
];

const MODERATE_CAPACITY_GB: f64 = 500.0;

/// Classify the fleet's transactional intensity from its file shares.
/// A single keyword match wins immediately; otherwise total capacity
/// decides. No shares at all means light.
pub fn detect_workload_profile(file_shares: &[ShareUsage]) -> WorkloadProfile {
    if file_shares.is_empty() {
        return WorkloadProfile::Light;
    }

    for share in file_shares {
        let name = share.name.to_lowercase();
        if HEAVY_WORKLOAD_KEYWORDS
            .iter()
            .any(|keyword| name.contains(keyword))
        {
            info!(share = %share.name, "detected profile-virtualization workload from share name");
            return WorkloadProfile::Heavy;
        }
    }

    let total_capacity_gb =
        file_shares.iter().map(|s| s.usage_bytes).sum::<u64>() as f64 / GIB;

    if total_capacity_gb > MODERATE_CAPACITY_GB {
        info!(total_capacity_gb, "detected moderate workload from total capacity");
        WorkloadProfile::Moderate
    } else {
        info!(total_capacity_gb, "detected light workload");
        WorkloadProfile::Light
    }
}

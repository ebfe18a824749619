use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::types::WorkloadProfile;

/// Workload profile as configured: either pinned to one of the three
/// profiles or left to auto-detection from the collected share inventory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProfileSetting {
    Auto,
    Light,
    Moderate,
    Heavy,
}

impl ProfileSetting {
    pub fn fixed(self) -> Option<WorkloadProfile> {
        match self {
            ProfileSetting::Auto => None,
            ProfileSetting::Light => Some(WorkloadProfile::Light),
            ProfileSetting::Moderate => Some(WorkloadProfile::Moderate),
            ProfileSetting::Heavy => Some(WorkloadProfile::Heavy),
        }
    }
}

impl Default for ProfileSetting {
    fn default() -> Self {
        ProfileSetting::Moderate
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssessConfig {
    pub stale_threshold_days: u64,
    pub cool_tier_days: u64,
    pub archive_tier_days: u64,
    pub min_size_gb: f64,
    pub workload_profile: ProfileSetting,
    pub pricing_region: String,
    pub required_tags: Vec<String>,
    pub naming_pattern: Option<String>,
    pub max_workers: usize,
    pub parallel: bool,
    pub quick_mode: bool,
    pub metrics_enabled: bool,
    pub cost_enabled: bool,
    pub security_enabled: bool,
    pub governance_enabled: bool,
    pub check_public_access: bool,
    pub check_encryption: bool,
    pub check_network_rules: bool,
    pub check_auth_methods: bool,
    pub check_data_protection: bool,
    pub check_lifecycle_policies: bool,
    pub check_diagnostics: bool,
}

impl Default for AssessConfig {
    fn default() -> Self {
        Self {
            stale_threshold_days: 90,
            cool_tier_days: 30,
            archive_tier_days: 180,
            min_size_gb: 1.0,
            workload_profile: ProfileSetting::default(),
            pricing_region: "eastus".to_string(),
            required_tags: Vec::new(),
            naming_pattern: None,
            max_workers: 5,
            parallel: true,
            quick_mode: false,
            metrics_enabled: true,
            cost_enabled: true,
            security_enabled: true,
            governance_enabled: true,
            check_public_access: true,
            check_encryption: true,
            check_network_rules: true,
            check_auth_methods: true,
            check_data_protection: true,
            check_lifecycle_policies: true,
            check_diagnostics: true,
        }
    }
}

impl AssessConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let config: AssessConfig =
            toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
        Ok(config)
    }

    pub fn discover() -> Option<Self> {
        let path = Path::new("storesweep.toml");
        if path.exists() {
            AssessConfig::load(path).ok()
        } else {
            None
        }
    }

    /// Quick mode trades depth for speed: detailed metrics are skipped and
    /// the worker pool is widened.
    pub fn apply_quick_mode(&mut self) {
        self.quick_mode = true;
        self.metrics_enabled = false;
        self.max_workers = 10;
    }

    /// The profile used for the first cost pass. Auto resolves to moderate
    /// until detection has seen the full share inventory.
    pub fn initial_profile(&self) -> WorkloadProfile {
        self.workload_profile
            .fixed()
            .unwrap_or(WorkloadProfile::Moderate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AssessConfig::default();
        assert_eq!(config.stale_threshold_days, 90);
        assert_eq!(config.min_size_gb, 1.0);
        assert_eq!(config.max_workers, 5);
        assert_eq!(config.workload_profile, ProfileSetting::Moderate);
        assert!(config.parallel);
        assert!(config.metrics_enabled);
    }

    #[test]
    fn quick_mode_widens_pool_and_disables_metrics() {
        let mut config = AssessConfig::default();
        config.apply_quick_mode();
        assert!(config.quick_mode);
        assert!(!config.metrics_enabled);
        assert_eq!(config.max_workers, 10);
    }

    #[test]
    fn auto_profile_starts_as_moderate() {
        let config = AssessConfig {
            workload_profile: ProfileSetting::Auto,
            ..AssessConfig::default()
        };
        assert_eq!(config.initial_profile(), WorkloadProfile::Moderate);
        assert_eq!(config.workload_profile.fixed(), None);
    }

    #[test]
    fn profile_setting_parses_from_plain_strings() {
        let config: AssessConfig =
            toml::from_str("workload_profile = \"auto\"").unwrap();
        assert_eq!(config.workload_profile, ProfileSetting::Auto);

        let config: AssessConfig =
            toml::from_str("workload_profile = \"heavy\"").unwrap();
        assert_eq!(config.workload_profile.fixed(), Some(WorkloadProfile::Heavy));
    }
}

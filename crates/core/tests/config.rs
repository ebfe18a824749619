use std::io::Write;

use storesweep_core::config::{AssessConfig, ProfileSetting};

#[test]
fn parse_valid_toml() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(
        f,
        r#"
stale_threshold_days = 60
min_size_gb = 5.0
workload_profile = "auto"
required_tags = ["environment", "owner", "cost-center"]
naming_pattern = "^st[a-z0-9]+$"
max_workers = 8
metrics_enabled = false
check_network_rules = false
"#
    )
    .unwrap();

    let cfg = AssessConfig::load(f.path()).unwrap();
    assert_eq!(cfg.stale_threshold_days, 60);
    assert_eq!(cfg.min_size_gb, 5.0);
    assert_eq!(cfg.workload_profile, ProfileSetting::Auto);
    assert_eq!(cfg.required_tags.len(), 3);
    assert_eq!(cfg.naming_pattern.as_deref(), Some("^st[a-z0-9]+$"));
    assert_eq!(cfg.max_workers, 8);
    assert!(!cfg.metrics_enabled);
    assert!(!cfg.check_network_rules);
    // Untouched fields keep their defaults.
    assert_eq!(cfg.cool_tier_days, 30);
    assert!(cfg.security_enabled);
}

#[test]
fn parse_empty_toml_gives_defaults() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "").unwrap();

    let cfg = AssessConfig::load(f.path()).unwrap();
    assert_eq!(cfg.stale_threshold_days, 90);
    assert_eq!(cfg.max_workers, 5);
    assert_eq!(cfg.workload_profile, ProfileSetting::Moderate);
    assert!(cfg.required_tags.is_empty());
    assert_eq!(cfg.naming_pattern, None);
    assert!(cfg.parallel);
}

#[test]
fn parse_invalid_toml_returns_error() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "this is not valid [ toml {{{{").unwrap();

    assert!(AssessConfig::load(f.path()).is_err());
}

#[test]
fn unknown_profile_value_is_rejected() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "workload_profile = \"extreme\"").unwrap();

    assert!(AssessConfig::load(f.path()).is_err());
}

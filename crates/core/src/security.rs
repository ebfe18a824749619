//! Security posture rules. Each check is a pure function over the account
//! snapshot, run in a fixed order so finding output is reproducible. Missing
//! configuration is reported as a finding, never as an error.

use crate::config::AssessConfig;
use crate::inventory::{AccountSnapshot, ServiceEncryption};
use crate::types::{Finding, SecurityAnalysis, Severity};

const ACCEPTED_TLS_VERSIONS: [&str; 2] = ["TLS1_2", "TLS1_3"];

pub fn analyze_account_security(
    account: &AccountSnapshot,
    config: &AssessConfig,
) -> SecurityAnalysis {
    let mut findings = Vec::new();

    if config.check_public_access {
        findings.extend(check_public_access(account));
    }
    if config.check_encryption {
        findings.extend(check_encryption(account));
    }
    if config.check_network_rules {
        findings.extend(check_network_access(account));
    }
    if config.check_auth_methods {
        findings.extend(check_authentication(account));
    }
    if config.check_data_protection {
        findings.extend(check_data_protection(account));
    }

    SecurityAnalysis {
        account: account.name.clone(),
        security_score: score_findings(&findings),
        total_findings: findings.len(),
        findings,
    }
}

/// Deducted score: start at 100, subtract 25 per critical, 15 per high and
/// 5 per medium finding, floored at 0. Low and info findings are reported
/// but never affect the score. The formula is deliberately coarse and must
/// stay stable across releases.
pub fn score_findings(findings: &[Finding]) -> u32 {
    let mut score: i64 = 100;
    for finding in findings {
        score -= match finding.severity {
            Severity::Critical => 25,
            Severity::High => 15,
            Severity::Medium => 5,
            Severity::Low | Severity::Info => 0,
        };
    }
    score.max(0) as u32
}

fn check_public_access(account: &AccountSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();

    if account.allow_blob_public_access == Some(true) {
        findings.push(Finding {
            kind: "public_access".to_string(),
            severity: Severity::High,
            resource: account.name.clone(),
            finding: "Public blob access is enabled at the storage account level".to_string(),
            recommendation: "Disable public blob access unless specifically required".to_string(),
            remediation: "Set allowBlobPublicAccess to false".to_string(),
        });
    }

    findings
}

fn check_encryption(account: &AccountSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();

    if account.https_only != Some(true) {
        findings.push(Finding {
            kind: "encryption_in_transit".to_string(),
            severity: Severity::High,
            resource: account.name.clone(),
            finding: "HTTPS-only traffic is not enforced".to_string(),
            recommendation: "Enable HTTPS-only traffic to protect data in transit".to_string(),
            remediation: "Set supportsHttpsTrafficOnly to true".to_string(),
        });
    }

    if let Some(min_tls) = &account.min_tls_version {
        if !ACCEPTED_TLS_VERSIONS.contains(&min_tls.as_str()) {
            findings.push(Finding {
                kind: "tls_version".to_string(),
                severity: Severity::Medium,
                resource: account.name.clone(),
                finding: format!(
                    "Minimum TLS version is {min_tls}, should be TLS 1.2 or higher"
                ),
                recommendation: "Set minimum TLS version to TLS 1.2".to_string(),
                remediation: "Set minimumTlsVersion to TLS1_2".to_string(),
            });
        }
    }

    let services: [(&str, &str, &Option<ServiceEncryption>); 4] = [
        ("blob", "Blob", &account.encryption_services.blob),
        ("file", "File", &account.encryption_services.file),
        ("queue", "Queue", &account.encryption_services.queue),
        ("table", "Table", &account.encryption_services.table),
    ];
    for (service, display, encryption) in services {
        let enabled = encryption.as_ref().is_some_and(|e| e.enabled);
        if !enabled {
            findings.push(Finding {
                kind: "encryption_at_rest".to_string(),
                severity: Severity::High,
                resource: account.name.clone(),
                finding: format!("{display} service encryption is not enabled"),
                recommendation: format!("Enable encryption for the {service} service"),
                remediation: format!("Enable encryption.services.{service}.enabled"),
            });
        }
    }

    if account.encryption_key_source.as_deref() == Some("Microsoft.Storage") {
        findings.push(Finding {
            kind: "encryption_key_management".to_string(),
            severity: Severity::Info,
            resource: account.name.clone(),
            finding: "Using platform-managed encryption keys".to_string(),
            recommendation: "Consider using customer-managed keys for enhanced control"
                .to_string(),
            remediation: "Configure customer-managed keys in a key vault".to_string(),
        });
    }

    findings
}

fn check_network_access(account: &AccountSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();
    let rules = &account.network_rule_set;

    if rules.default_action.as_deref() == Some("Allow") {
        findings.push(Finding {
            kind: "network_access".to_string(),
            severity: Severity::High,
            resource: account.name.clone(),
            finding: "Storage account allows access from all networks".to_string(),
            recommendation: "Restrict network access to specific virtual networks or IP ranges"
                .to_string(),
            remediation: "Configure firewall rules and set the default action to Deny".to_string(),
        });
    }

    for rule in &rules.ip_rules {
        if rule.value.starts_with("0.0.0.0") || rule.value == "*" {
            findings.push(Finding {
                kind: "network_access".to_string(),
                severity: Severity::High,
                resource: account.name.clone(),
                finding: format!("Overly permissive IP rule: {}", rule.value),
                recommendation: "Remove overly broad IP rules".to_string(),
                remediation: "Specify exact IP addresses or narrow CIDR ranges".to_string(),
            });
        }
    }

    if rules.virtual_network_rules.is_empty() && rules.default_action.as_deref() == Some("Deny") {
        findings.push(Finding {
            kind: "network_access".to_string(),
            severity: Severity::Info,
            resource: account.name.clone(),
            finding: "No virtual network rules configured".to_string(),
            recommendation: "Consider virtual network service endpoints for secure access"
                .to_string(),
            remediation: "Configure virtual network rules or private endpoints".to_string(),
        });
    }

    findings
}

fn check_authentication(account: &AccountSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();

    // Flagged whenever shared key auth is not explicitly disabled, including
    // when the setting is absent from the snapshot.
    if account.allow_shared_key_access != Some(false) {
        findings.push(Finding {
            kind: "authentication".to_string(),
            severity: Severity::Medium,
            resource: account.name.clone(),
            finding: "Shared key (access key) authentication is enabled".to_string(),
            recommendation: "Consider disabling shared key access in favor of directory-based authentication".to_string(),
            remediation: "Set allowSharedKeyAccess to false once applications no longer need it"
                .to_string(),
        });
    }

    if account.default_to_oauth_authentication != Some(true) {
        findings.push(Finding {
            kind: "authentication".to_string(),
            severity: Severity::Info,
            resource: account.name.clone(),
            finding: "Directory-based authentication is not the default".to_string(),
            recommendation: "Enable directory-based authentication as the default method"
                .to_string(),
            remediation: "Set defaultToOAuthAuthentication to true".to_string(),
        });
    }

    findings
}

fn check_data_protection(account: &AccountSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();
    let props = &account.blob_service_properties;

    if !props.delete_retention_policy.enabled {
        findings.push(Finding {
            kind: "data_protection".to_string(),
            severity: Severity::Medium,
            resource: account.name.clone(),
            finding: "Soft delete for blobs is not enabled".to_string(),
            recommendation: "Enable soft delete to protect against accidental deletion"
                .to_string(),
            remediation: "Enable soft delete with a retention period of 7-365 days".to_string(),
        });
    }

    if !props.container_delete_retention_policy.enabled {
        findings.push(Finding {
            kind: "data_protection".to_string(),
            severity: Severity::Medium,
            resource: account.name.clone(),
            finding: "Soft delete for containers is not enabled".to_string(),
            recommendation: "Enable container soft delete".to_string(),
            remediation: "Enable container soft delete with a retention period".to_string(),
        });
    }

    if !props.is_versioning_enabled {
        findings.push(Finding {
            kind: "data_protection".to_string(),
            severity: Severity::Low,
            resource: account.name.clone(),
            finding: "Blob versioning is not enabled".to_string(),
            recommendation: "Consider enabling versioning for better data protection".to_string(),
            remediation: "Enable blob versioning".to_string(),
        });
    }

    if !props.change_feed.enabled {
        findings.push(Finding {
            kind: "data_protection".to_string(),
            severity: Severity::Info,
            resource: account.name.clone(),
            finding: "Change feed is not enabled".to_string(),
            recommendation: "Enable the change feed for audit and tracking capabilities"
                .to_string(),
            remediation: "Enable change feed logging".to_string(),
        });
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{
        BlobServiceProperties, EncryptionServices, NetworkRuleSet, RetentionPolicy,
        ToggleProperty,
    };

    fn hardened_account() -> AccountSnapshot {
        let encrypted = Some(ServiceEncryption {
            enabled: true,
            key_type: None,
        });
        AccountSnapshot {
            name: "stlocked".to_string(),
            https_only: Some(true),
            min_tls_version: Some("TLS1_2".to_string()),
            allow_blob_public_access: Some(false),
            allow_shared_key_access: Some(false),
            default_to_oauth_authentication: Some(true),
            encryption_key_source: Some("Microsoft.Keyvault".to_string()),
            encryption_services: EncryptionServices {
                blob: encrypted.clone(),
                file: encrypted.clone(),
                queue: encrypted.clone(),
                table: encrypted,
            },
            network_rule_set: NetworkRuleSet {
                default_action: Some("Deny".to_string()),
                virtual_network_rules: vec![crate::inventory::VirtualNetworkRule {
                    id: "/subscriptions/s/vnets/private".to_string(),
                    action: None,
                    state: None,
                }],
                ..NetworkRuleSet::default()
            },
            blob_service_properties: BlobServiceProperties {
                delete_retention_policy: RetentionPolicy {
                    enabled: true,
                    days: Some(30),
                },
                container_delete_retention_policy: RetentionPolicy {
                    enabled: true,
                    days: Some(30),
                },
                is_versioning_enabled: true,
                change_feed: ToggleProperty { enabled: true },
                restore_policy: ToggleProperty { enabled: true },
                last_access_time_tracking_policy: ToggleProperty { enabled: true },
            },
            ..AccountSnapshot::default()
        }
    }

    #[test]
    fn hardened_account_scores_100_with_no_findings() {
        let analysis = analyze_account_security(&hardened_account(), &AssessConfig::default());
        assert!(
            analysis.findings.is_empty(),
            "unexpected findings: {:?}",
            analysis.findings
        );
        assert_eq!(analysis.security_score, 100);
    }

    #[test]
    fn exposed_account_matches_expected_score() {
        // Public access (high), no HTTPS (high), TLS1_0 (medium), blob soft
        // delete missing (medium), versioning off (low, no score impact):
        // 100 - 15*2 - 5*2 = 60.
        let mut account = AccountSnapshot {
            allow_blob_public_access: Some(true),
            https_only: Some(false),
            min_tls_version: Some("TLS1_0".to_string()),
            ..hardened_account()
        };
        account.blob_service_properties.delete_retention_policy = RetentionPolicy::default();
        account.blob_service_properties.is_versioning_enabled = false;

        let analysis = analyze_account_security(&account, &AssessConfig::default());

        let highs = analysis
            .findings
            .iter()
            .filter(|f| f.severity == Severity::High)
            .count();
        let mediums = analysis
            .findings
            .iter()
            .filter(|f| f.severity == Severity::Medium)
            .count();
        let lows = analysis
            .findings
            .iter()
            .filter(|f| f.severity == Severity::Low)
            .count();
        assert_eq!(highs, 2);
        assert_eq!(mediums, 2);
        assert_eq!(lows, 1);
        assert_eq!(analysis.security_score, 60);
    }

    #[test]
    fn missing_https_flag_is_treated_as_not_enforced() {
        let account = AccountSnapshot {
            https_only: None,
            ..hardened_account()
        };
        let analysis = analyze_account_security(&account, &AssessConfig::default());
        assert!(analysis
            .findings
            .iter()
            .any(|f| f.kind == "encryption_in_transit"));
    }

    #[test]
    fn absent_tls_version_is_not_flagged() {
        let account = AccountSnapshot {
            min_tls_version: None,
            ..hardened_account()
        };
        let analysis = analyze_account_security(&account, &AssessConfig::default());
        assert!(!analysis.findings.iter().any(|f| f.kind == "tls_version"));
    }

    #[test]
    fn each_unencrypted_service_is_flagged_separately() {
        let account = AccountSnapshot {
            encryption_services: EncryptionServices::default(),
            ..hardened_account()
        };
        let analysis = analyze_account_security(&account, &AssessConfig::default());
        let at_rest = analysis
            .findings
            .iter()
            .filter(|f| f.kind == "encryption_at_rest")
            .count();
        assert_eq!(at_rest, 4);
    }

    #[test]
    fn shared_key_absent_is_flagged() {
        let account = AccountSnapshot {
            allow_shared_key_access: None,
            ..hardened_account()
        };
        let analysis = analyze_account_security(&account, &AssessConfig::default());
        assert!(analysis
            .findings
            .iter()
            .any(|f| f.kind == "authentication" && f.severity == Severity::Medium));
    }

    #[test]
    fn broad_ip_rules_are_flagged_each() {
        let mut account = hardened_account();
        account.network_rule_set.ip_rules = vec![
            crate::inventory::IpRule {
                value: "0.0.0.0/0".to_string(),
                action: None,
            },
            crate::inventory::IpRule {
                value: "*".to_string(),
                action: None,
            },
            crate::inventory::IpRule {
                value: "203.0.113.7".to_string(),
                action: None,
            },
        ];
        let analysis = analyze_account_security(&account, &AssessConfig::default());
        let broad = analysis
            .findings
            .iter()
            .filter(|f| f.finding.starts_with("Overly permissive IP rule"))
            .count();
        assert_eq!(broad, 2);
    }

    #[test]
    fn deny_without_vnet_rules_is_informational() {
        let mut account = hardened_account();
        account.network_rule_set.virtual_network_rules.clear();
        let analysis = analyze_account_security(&account, &AssessConfig::default());
        let finding = analysis
            .findings
            .iter()
            .find(|f| f.finding == "No virtual network rules configured")
            .expect("informational network finding");
        assert_eq!(finding.severity, Severity::Info);
        assert_eq!(analysis.security_score, 100);
    }

    #[test]
    fn disabled_checks_produce_no_findings() {
        let account = AccountSnapshot {
            allow_blob_public_access: Some(true),
            https_only: Some(false),
            ..AccountSnapshot::default()
        };
        let config = AssessConfig {
            check_public_access: false,
            check_encryption: false,
            check_network_rules: false,
            check_auth_methods: false,
            check_data_protection: false,
            ..AssessConfig::default()
        };
        let analysis = analyze_account_security(&account, &config);
        assert!(analysis.findings.is_empty());
        assert_eq!(analysis.security_score, 100);
    }

    #[test]
    fn score_floors_at_zero() {
        let finding = Finding {
            kind: "x".to_string(),
            severity: Severity::Critical,
            resource: "r".to_string(),
            finding: String::new(),
            recommendation: String::new(),
            remediation: String::new(),
        };
        let findings: Vec<Finding> = std::iter::repeat(finding).take(10).collect();
        assert_eq!(score_findings(&findings), 0);
    }
}

//! Governance rules: tagging, naming, lifecycle, diagnostics, redundancy
//! and orphan detection. Same fixed-order, pure-function shape as the
//! security rules but scored nowhere; governance findings only feed the
//! fleet summary and reports.

use regex::Regex;
use tracing::warn;

use crate::config::AssessConfig;
use crate::inventory::{AccountSnapshot, ContainerUsage, MetricsSummary};
use crate::types::{Finding, GovernanceAnalysis, Severity};

pub fn analyze_account_governance(
    account: &AccountSnapshot,
    containers: &[ContainerUsage],
    metrics: Option<&MetricsSummary>,
    config: &AssessConfig,
) -> GovernanceAnalysis {
    let mut findings = Vec::new();

    findings.extend(check_tagging(account, &config.required_tags));
    findings.extend(check_naming_convention(
        account,
        config.naming_pattern.as_deref(),
    ));
    if config.check_lifecycle_policies {
        findings.extend(check_lifecycle_management(account));
    }
    if config.check_diagnostics {
        findings.extend(check_diagnostics(account));
    }
    findings.extend(check_redundancy(account));
    findings.extend(check_orphaned_resources(account, containers, metrics));

    GovernanceAnalysis {
        account: account.name.clone(),
        total_findings: findings.len(),
        findings,
    }
}

fn check_tagging(account: &AccountSnapshot, required_tags: &[String]) -> Vec<Finding> {
    let mut findings = Vec::new();

    if !required_tags.is_empty() {
        let missing: Vec<&str> = required_tags
            .iter()
            .filter(|tag| !account.tags.contains_key(tag.as_str()))
            .map(|tag| tag.as_str())
            .collect();
        if !missing.is_empty() {
            findings.push(Finding {
                kind: "tagging".to_string(),
                severity: Severity::Medium,
                resource: account.name.clone(),
                finding: format!("Missing required tags: {}", missing.join(", ")),
                recommendation: "Add required tags for cost tracking and governance".to_string(),
                remediation: format!("Add tags: {}", missing.join(", ")),
            });
        }
    }

    let empty: Vec<&str> = account
        .tags
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(tag, _)| tag.as_str())
        .collect();
    if !empty.is_empty() {
        findings.push(Finding {
            kind: "tagging".to_string(),
            severity: Severity::Low,
            resource: account.name.clone(),
            finding: format!("Tags with empty values: {}", empty.join(", ")),
            recommendation: "Populate tag values".to_string(),
            remediation: format!("Set values for tags: {}", empty.join(", ")),
        });
    }

    findings
}

/// An unset pattern always passes; so does an invalid one, after a warning,
/// since a broken convention should not fail the whole account.
fn name_matches(name: &str, pattern: &str) -> bool {
    match Regex::new(pattern) {
        // Anchored at the start, matching the usual convention-check style.
        Ok(re) => re.find(name).is_some_and(|m| m.start() == 0),
        Err(error) => {
            warn!(pattern, %error, "invalid naming convention pattern, skipping check");
            true
        }
    }
}

fn check_naming_convention(account: &AccountSnapshot, pattern: Option<&str>) -> Vec<Finding> {
    let mut findings = Vec::new();

    let Some(pattern) = pattern else {
        return findings;
    };

    if !name_matches(&account.name, pattern) {
        findings.push(Finding {
            kind: "naming_convention".to_string(),
            severity: Severity::Low,
            resource: account.name.clone(),
            finding: format!(
                "Storage account name does not match the naming convention pattern: {pattern}"
            ),
            recommendation: "Follow organizational naming conventions for consistency"
                .to_string(),
            remediation:
                "Rename to match the pattern (storage account names cannot be changed in place)"
                    .to_string(),
        });
    }

    findings
}

// The restore policy is a proxy signal: accounts with lifecycle management
// configured typically carry one. A direct policy read needs a separate
// management call that the inventory export does not include.
fn check_lifecycle_management(account: &AccountSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();

    if !account.blob_service_properties.restore_policy.enabled {
        findings.push(Finding {
            kind: "lifecycle_management".to_string(),
            severity: Severity::Info,
            resource: account.name.clone(),
            finding: "Lifecycle management policies not detected".to_string(),
            recommendation:
                "Configure lifecycle management to automatically tier or delete old data"
                    .to_string(),
            remediation: "Create a lifecycle management policy to optimize costs".to_string(),
        });
    }

    findings
}

fn check_diagnostics(account: &AccountSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();

    if !account
        .blob_service_properties
        .last_access_time_tracking_policy
        .enabled
    {
        findings.push(Finding {
            kind: "diagnostics".to_string(),
            severity: Severity::Info,
            resource: account.name.clone(),
            finding: "Last access time tracking is not enabled".to_string(),
            recommendation: "Enable last access time tracking for better lifecycle management"
                .to_string(),
            remediation: "Enable last access time tracking in the blob service properties"
                .to_string(),
        });
    }

    findings
}

fn check_redundancy(account: &AccountSnapshot) -> Vec<Finding> {
    let mut findings = Vec::new();
    let sku = account.sku.as_deref().unwrap_or("Unknown");

    if sku.contains("LRS") {
        findings.push(Finding {
            kind: "redundancy".to_string(),
            severity: Severity::Info,
            resource: account.name.clone(),
            finding: "Using locally redundant storage (LRS)".to_string(),
            recommendation:
                "Consider ZRS or GRS for production workloads requiring higher availability"
                    .to_string(),
            remediation: "Evaluate whether zone- or geo-redundant storage is needed".to_string(),
        });
    }

    if sku.contains("GRS") && account.secondary_location.is_none() {
        findings.push(Finding {
            kind: "redundancy".to_string(),
            severity: Severity::Medium,
            resource: account.name.clone(),
            finding: "Geo-redundant storage configured but no secondary location reported"
                .to_string(),
            recommendation: "Verify the geo-redundancy configuration".to_string(),
            remediation: "Check the storage account replication status".to_string(),
        });
    }

    findings
}

fn check_orphaned_resources(
    account: &AccountSnapshot,
    containers: &[ContainerUsage],
    metrics: Option<&MetricsSummary>,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    let total_blobs: u64 = containers.iter().map(|c| c.blob_count).sum();

    if total_blobs == 0 {
        findings.push(Finding {
            kind: "orphaned_resource".to_string(),
            severity: Severity::Low,
            resource: account.name.clone(),
            finding: "Storage account contains no blobs".to_string(),
            recommendation: "Consider deleting the account if it is no longer needed".to_string(),
            remediation: "Verify the storage account is still required, delete if not".to_string(),
        });
    }

    let has_activity = metrics.is_some_and(|m| m.has_activity);
    if !has_activity && total_blobs > 0 {
        findings.push(Finding {
            kind: "orphaned_resource".to_string(),
            severity: Severity::Low,
            resource: account.name.clone(),
            finding: "Storage account has no transaction activity in the monitoring period"
                .to_string(),
            recommendation: "Verify the storage account is actively used".to_string(),
            remediation: "Review usage and consider archiving or deleting if unused".to_string(),
        });
    }

    let empty_containers: Vec<&str> = containers
        .iter()
        .filter(|c| c.blob_count == 0)
        .map(|c| c.name.as_str())
        .collect();
    if !empty_containers.is_empty() {
        let listed: Vec<&str> = empty_containers.iter().copied().take(5).collect();
        findings.push(Finding {
            kind: "orphaned_resource".to_string(),
            severity: Severity::Info,
            resource: account.name.clone(),
            finding: format!("{} empty container(s) found", empty_containers.len()),
            recommendation: "Clean up empty containers".to_string(),
            remediation: format!("Delete empty containers: {}", listed.join(", ")),
        });
    }

    findings
}

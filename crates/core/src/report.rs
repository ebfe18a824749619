use std::io::Write;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::FleetSummary;
use crate::pool::ProcessFailure;
use crate::types::{AccountAssessment, Severity, GIB};

pub const REPORT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub report_version: String,
    pub generated_at: DateTime<Utc>,
    pub accounts: Vec<AccountAssessment>,
    pub summary: FleetSummary,
    pub failures: Vec<ProcessFailure>,
}

impl AssessmentReport {
    pub fn new(
        accounts: Vec<AccountAssessment>,
        summary: FleetSummary,
        failures: Vec<ProcessFailure>,
    ) -> Self {
        Self {
            report_version: REPORT_VERSION.to_string(),
            generated_at: Utc::now(),
            accounts,
            summary,
            failures,
        }
    }

    pub fn to_markdown(&self) -> String {
        let stats = &self.summary.statistics;
        let findings = &self.summary.findings_statistics;

        let mut s = String::new();
        s.push_str("# storesweep fleet report\n\n");
        s.push_str(&format!("- report_version: `{}`\n", self.report_version));
        s.push_str(&format!(
            "- generated_at: `{}`\n",
            self.generated_at.to_rfc3339()
        ));
        s.push('\n');

        s.push_str("## Fleet statistics\n\n");
        s.push_str(&format!(
            "- storage_accounts: `{}` across `{}` subscription(s)\n",
            stats.total_storage_accounts, stats.total_subscriptions
        ));
        s.push_str(&format!(
            "- containers: `{}`, file_shares: `{}`, blobs: `{}`\n",
            stats.total_containers, stats.total_file_shares, stats.total_blobs
        ));
        s.push_str(&format!(
            "- capacity: `{}` (stale: `{}`)\n",
            format_bytes(stats.total_capacity_bytes),
            format_bytes(stats.total_stale_size_bytes)
        ));
        s.push_str(&format!(
            "- estimated monthly cost: `${:.2}`, potential monthly savings: `${:.2}`\n",
            stats.total_monthly_cost, stats.total_monthly_savings
        ));
        s.push_str(&format!(
            "- average security score: `{:.1}`\n",
            stats.average_security_score
        ));
        s.push_str(&format!(
            "- public access enabled: `{}`, HTTPS-only enforced: `{}`, soft delete enabled: `{}`, TLS 1.2+: `{}`\n",
            stats.accounts_with_public_access,
            stats.accounts_with_https_only,
            stats.accounts_with_soft_delete,
            stats.accounts_with_tls12
        ));
        s.push('\n');

        s.push_str("## Findings by severity\n\n");
        s.push_str(&format!("- total: `{}`\n", findings.total));
        s.push_str(&format!("- critical: `{}`\n", findings.critical));
        s.push_str(&format!("- high: `{}`\n", findings.high));
        s.push_str(&format!("- medium: `{}`\n", findings.medium));
        s.push_str(&format!("- low: `{}`\n", findings.low));
        s.push_str(&format!("- info: `{}`\n", findings.info));
        s.push('\n');

        s.push_str("## Top recommendations\n\n");
        if self.summary.top_recommendations.is_empty() {
            s.push_str("- (none)\n");
        } else {
            for rec in &self.summary.top_recommendations {
                s.push_str(&format!("### {}\n", rec.title));
                s.push_str(&format!("- account: `{}`\n", rec.account));
                s.push_str(&format!("- severity: `{}`\n", rec.severity.as_str()));
                s.push_str(&format!("- category: `{}`\n", rec.category.as_str()));
                if rec.estimated_savings > 0.0 {
                    s.push_str(&format!(
                        "- estimated monthly savings: `${:.2}`\n",
                        rec.estimated_savings
                    ));
                }
                s.push_str(&format!("- recommendation: {}\n", rec.recommendation));
                s.push('\n');
            }
        }

        s.push_str("## Accounts\n\n");
        if self.summary.account_summaries.is_empty() {
            s.push_str("- (none)\n");
        } else {
            s.push_str(
                "| Account | Location | SKU | Size | Containers | Shares | Score | Monthly cost | Savings |\n",
            );
            s.push_str(
                "|---------|----------|-----|------|------------|--------|-------|--------------|---------|\n",
            );
            for row in &self.summary.account_summaries {
                s.push_str(&format!(
                    "| {} | {} | {} | {} | {} | {} | {} | ${:.2} | ${:.2} |\n",
                    row.name,
                    row.location,
                    row.sku,
                    format_bytes(row.size_bytes),
                    row.container_count,
                    row.share_count,
                    row.security_score,
                    row.monthly_cost,
                    row.potential_savings
                ));
            }
        }
        s.push('\n');

        if !self.failures.is_empty() {
            s.push_str("## Failed accounts\n\n");
            for failure in &self.failures {
                s.push_str(&format!("- `{}`: {}\n", failure.account, failure.error));
            }
            s.push('\n');
        }

        s
    }
}

/// One row per assessed account, mirroring the JSON report's summary data
/// in spreadsheet-friendly form.
pub fn write_accounts_csv<W: Write>(
    writer: W,
    assessments: &[AccountAssessment],
) -> anyhow::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record([
        "Subscription ID",
        "Resource Group",
        "Storage Account Name",
        "Location",
        "SKU",
        "Kind",
        "Creation Time",
        "Total Containers",
        "Total File Shares",
        "Total Blobs",
        "Total Size (GB)",
        "Stale Blobs",
        "Stale Size (GB)",
        "Public Access Allowed",
        "HTTPS Only",
        "Min TLS Version",
        "Soft Delete Enabled",
        "Versioning Enabled",
        "Security Score",
        "Security Findings",
        "Estimated Monthly Cost",
        "Potential Monthly Savings",
        "Tags",
    ])
    .context("write accounts csv header")?;

    for a in assessments {
        let account = &a.account;
        let total_blobs: u64 = a.containers.iter().map(|c| c.blob_count).sum();
        let container_bytes: u64 = a.containers.iter().map(|c| c.total_size_bytes).sum();
        let share_bytes: u64 = a.file_shares.iter().map(|s| s.usage_bytes).sum();
        let stale_blobs: u64 = a.containers.iter().map(|c| c.stale_blob_count).sum();
        let stale_bytes: u64 = a.containers.iter().map(|c| c.stale_size_bytes).sum();
        let props = &account.blob_service_properties;

        let tags = account
            .tags
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ");

        csv.write_record([
            account.subscription_id.clone(),
            account.resource_group.clone(),
            account.name.clone(),
            account.location.clone(),
            account.sku.clone().unwrap_or_default(),
            account.kind.clone().unwrap_or_default(),
            account
                .creation_time
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
            a.containers.len().to_string(),
            a.file_shares.len().to_string(),
            total_blobs.to_string(),
            format!("{:.2}", (container_bytes + share_bytes) as f64 / GIB),
            stale_blobs.to_string(),
            format!("{:.2}", stale_bytes as f64 / GIB),
            optional_bool(account.allow_blob_public_access),
            optional_bool(account.https_only),
            account.min_tls_version.clone().unwrap_or_default(),
            props.delete_retention_policy.enabled.to_string(),
            props.is_versioning_enabled.to_string(),
            a.security
                .as_ref()
                .map_or(String::new(), |s| s.security_score.to_string()),
            a.security
                .as_ref()
                .map_or(String::new(), |s| s.total_findings.to_string()),
            a.cost
                .as_ref()
                .map_or(String::new(), |c| format!("{:.2}", c.total_monthly_cost)),
            a.cost
                .as_ref()
                .map_or(String::new(), |c| format!("{:.2}", c.total_monthly_savings)),
            tags,
        ])
        .with_context(|| format!("write accounts csv row for {}", account.name))?;
    }

    csv.flush().context("flush accounts csv")?;
    Ok(())
}

/// Every security and governance finding across the fleet, one per row.
pub fn write_findings_csv<W: Write>(
    writer: W,
    assessments: &[AccountAssessment],
) -> anyhow::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record([
        "Storage Account",
        "Type",
        "Severity",
        "Finding",
        "Recommendation",
        "Remediation",
    ])
    .context("write findings csv header")?;

    for a in assessments {
        let findings = a
            .security
            .iter()
            .flat_map(|s| s.findings.iter())
            .chain(a.governance.iter().flat_map(|g| g.findings.iter()));
        for finding in findings {
            csv.write_record([
                a.account.name.as_str(),
                finding.kind.as_str(),
                finding.severity.as_str(),
                finding.finding.as_str(),
                finding.recommendation.as_str(),
                finding.remediation.as_str(),
            ])
            .with_context(|| format!("write findings csv row for {}", a.account.name))?;
        }
    }

    csv.flush().context("flush findings csv")?;
    Ok(())
}

fn optional_bool(value: Option<bool>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

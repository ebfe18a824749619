pub mod aggregate;
pub mod config;
pub mod cost;
pub mod governance;
pub mod inventory;
pub mod parser;
pub mod pool;
pub mod pricing;
pub mod report;
pub mod security;
pub mod types;
pub mod workload;

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{AssessConfig, ProfileSetting};
use crate::cost::CostAnalyzer;
use crate::inventory::{AccountRecord, ShareUsage};
use crate::parser::ParseMode;
use crate::report::AssessmentReport;

#[derive(Debug, thiserror::Error)]
pub enum AssessError {
    /// The inventory itself could not be read; there is nothing to assess.
    #[error(transparent)]
    Enumeration(#[from] anyhow::Error),
    /// Accounts were found but every single one failed processing, which is
    /// distinct from an empty fleet.
    #[error("all {attempted} storage account(s) failed processing")]
    AllAccountsFailed { attempted: usize },
}

#[derive(Debug, Clone)]
pub struct AssessOptions {
    pub config: AssessConfig,
    pub strict: bool,
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for AssessOptions {
    fn default() -> Self {
        Self {
            config: AssessConfig::default(),
            strict: false,
            cancel: None,
        }
    }
}

/// Run the full assessment over already-collected inventory records.
///
/// Phase 1 fans the accounts out over the worker pool. Phase 2 runs only
/// when the workload profile is set to auto: it needs the complete fleet
/// share inventory as detection input, so it is a sequential pass that
/// re-prices the cost analysis of every collected account without touching
/// security or governance results. Phase 3 aggregates.
pub fn assess(
    records: Vec<AccountRecord>,
    config: &AssessConfig,
    cancel: &Arc<AtomicBool>,
) -> AssessmentReport {
    info!(accounts = records.len(), "starting fleet assessment");

    let outcome = pool::process_accounts(records, config, cancel);
    let mut assessments = outcome.assessments;

    if config.workload_profile == ProfileSetting::Auto && config.cost_enabled {
        let all_shares: Vec<ShareUsage> = assessments
            .iter()
            .flat_map(|a| a.file_shares.iter().cloned())
            .collect();
        let detected = workload::detect_workload_profile(&all_shares);
        info!(profile = detected.as_str(), "auto-detected workload profile, re-pricing cost analysis");

        let analyzer = CostAnalyzer::new(detected);
        for assessment in &mut assessments {
            assessment.cost = Some(analyzer.analyze_account_costs(
                &assessment.account,
                &assessment.containers,
                &assessment.file_shares,
                config,
            ));
        }
    }

    let summary = aggregate::summarize(&assessments);
    AssessmentReport::new(assessments, summary, outcome.failures)
}

/// Parse an inventory export directory, then assess it.
pub fn assess_dir(input: &Path, opts: &AssessOptions) -> Result<AssessmentReport, AssessError> {
    let mode = if opts.strict {
        ParseMode::Strict
    } else {
        ParseMode::BestEffort
    };

    let records = parser::parse_inventory_dir(input, mode).map_err(AssessError::Enumeration)?;
    let attempted = records.len();
    if attempted == 0 {
        warn!("no storage accounts found in the inventory export");
    }

    let cancel = opts
        .cancel
        .clone()
        .unwrap_or_else(|| Arc::new(AtomicBool::new(false)));

    let report = assess(records, &opts.config, &cancel);

    if attempted > 0 && report.accounts.is_empty() && report.failures.len() == attempted {
        return Err(AssessError::AllAccountsFailed { attempted });
    }

    Ok(report)
}

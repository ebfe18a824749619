//! Account processing orchestrator.
//!
//! One task per storage account, fanned out over a bounded pool of worker
//! threads. Tasks own their assessment exclusively while building it and
//! hand the finished value back over a result channel, so the only shared
//! state is the channels themselves. A failure inside one account's task is
//! recorded and never affects the other tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::bail;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::AssessConfig;
use crate::cost::CostAnalyzer;
use crate::governance;
use crate::inventory::AccountRecord;
use crate::security;
use crate::types::AccountAssessment;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessFailure {
    pub account: String,
    pub error: String,
}

#[derive(Debug)]
pub struct ProcessOutcome {
    pub assessments: Vec<AccountAssessment>,
    pub failures: Vec<ProcessFailure>,
}

pub fn process_accounts(
    records: Vec<AccountRecord>,
    config: &AssessConfig,
    cancel: &Arc<AtomicBool>,
) -> ProcessOutcome {
    let total = records.len();

    let outcome = if config.parallel && total > 1 {
        process_parallel(records, config, cancel)
    } else {
        process_sequential(records, config, cancel)
    };

    info!(
        processed = outcome.assessments.len(),
        failed = outcome.failures.len(),
        total,
        "account processing complete"
    );
    outcome
}

fn process_sequential(
    records: Vec<AccountRecord>,
    config: &AssessConfig,
    cancel: &Arc<AtomicBool>,
) -> ProcessOutcome {
    let mut assessments = Vec::with_capacity(records.len());
    let mut failures = Vec::new();

    for record in records {
        if cancel.load(Ordering::Relaxed) {
            warn!("cancellation requested, skipping remaining accounts");
            break;
        }
        let name = record.account.name.clone();
        match process_account(record, config) {
            Ok(assessment) => assessments.push(assessment),
            Err(error) => {
                error!(account = %name, %error, "failed to process storage account");
                failures.push(ProcessFailure {
                    account: name,
                    error: format!("{error:#}"),
                });
            }
        }
    }

    finish(assessments, failures)
}

fn process_parallel(
    records: Vec<AccountRecord>,
    config: &AssessConfig,
    cancel: &Arc<AtomicBool>,
) -> ProcessOutcome {
    let workers = effective_workers(config.max_workers, records.len());
    debug!(workers, accounts = records.len(), "dispatching account processing pool");

    // Both channels are sized to the record count, so queueing the whole
    // fleet up front never blocks and workers never block on reporting.
    let (work_tx, work_rx) = crossbeam_channel::bounded::<AccountRecord>(records.len());
    let (result_tx, result_rx) =
        crossbeam_channel::bounded::<(String, anyhow::Result<AccountAssessment>)>(records.len());

    for record in records {
        work_tx
            .send(record)
            .expect("work queue sized to the record count");
    }
    drop(work_tx);

    let mut handles = Vec::with_capacity(workers);
    for worker in 0..workers {
        let work_rx = work_rx.clone();
        let result_tx = result_tx.clone();
        let cancel = Arc::clone(cancel);
        let config = config.clone();
        let handle = thread::Builder::new()
            .name(format!("storesweep-worker-{worker}"))
            .spawn(move || {
                while let Ok(record) = work_rx.recv() {
                    // Checked at dequeue time: cancellation stops new work
                    // from being picked up while in-flight tasks finish.
                    if cancel.load(Ordering::Relaxed) {
                        break;
                    }
                    let name = record.account.name.clone();
                    let result = process_account(record, &config);
                    if result_tx.send((name, result)).is_err() {
                        break;
                    }
                }
            })
            .expect("failed to spawn worker thread");
        handles.push(handle);
    }
    drop(result_tx);
    drop(work_rx);

    let mut assessments = Vec::new();
    let mut failures = Vec::new();
    // The iterator ends once every worker has dropped its sender.
    for (name, result) in result_rx {
        match result {
            Ok(assessment) => assessments.push(assessment),
            Err(error) => {
                error!(account = %name, %error, "failed to process storage account");
                failures.push(ProcessFailure {
                    account: name,
                    error: format!("{error:#}"),
                });
            }
        }
    }

    for handle in handles {
        let _ = handle.join();
    }

    finish(assessments, failures)
}

/// Results arrive in completion order; key them back to a stable order by
/// account name so downstream output never depends on scheduling.
fn finish(
    mut assessments: Vec<AccountAssessment>,
    mut failures: Vec<ProcessFailure>,
) -> ProcessOutcome {
    assessments.sort_by(|a, b| a.account.name.cmp(&b.account.name));
    failures.sort_by(|a, b| a.account.cmp(&b.account));
    ProcessOutcome {
        assessments,
        failures,
    }
}

fn effective_workers(max_workers: usize, accounts: usize) -> usize {
    let io_bound_cap = num_cpus::get().max(1) * 4;
    max_workers.max(1).min(accounts.max(1)).min(io_bound_cap)
}

fn process_account(
    record: AccountRecord,
    config: &AssessConfig,
) -> anyhow::Result<AccountAssessment> {
    let AccountRecord {
        account,
        containers,
        file_shares,
        metrics,
    } = record;

    if account.name.trim().is_empty() {
        bail!("inventory record is missing the account name");
    }
    debug!(account = %account.name, "processing storage account");

    let metrics = if config.metrics_enabled { metrics } else { None };

    let cost = config.cost_enabled.then(|| {
        CostAnalyzer::new(config.initial_profile()).analyze_account_costs(
            &account,
            &containers,
            &file_shares,
            config,
        )
    });
    let security = config
        .security_enabled
        .then(|| security::analyze_account_security(&account, config));
    let governance = config.governance_enabled.then(|| {
        governance::analyze_account_governance(&account, &containers, metrics.as_ref(), config)
    });

    Ok(AccountAssessment {
        account,
        containers,
        file_shares,
        metrics,
        cost,
        security,
        governance,
    })
}

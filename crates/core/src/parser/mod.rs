mod inventory_export;

use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::inventory::AccountRecord;

pub use inventory_export::{parse_inventory_export, InventoryExport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Strict,
    BestEffort,
}

/// Walk an inventory export directory and merge every `*.json` export into
/// one account list. Each export typically covers one subscription.
///
/// Finding no parseable export at all is fatal: there is nothing to assess
/// and the caller must be able to distinguish that from an empty fleet. In
/// best-effort mode individual malformed files are skipped with a warning;
/// strict mode turns the first one into an error.
pub fn parse_inventory_dir(input: &Path, mode: ParseMode) -> anyhow::Result<Vec<AccountRecord>> {
    let mut accounts: Vec<AccountRecord> = Vec::new();
    let mut sources: usize = 0;

    for entry in WalkDir::new(input).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "json" {
            continue;
        }

        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let reader = BufReader::new(file);

        match parse_inventory_export(reader) {
            Ok(export) => {
                debug!(
                    path = %path.display(),
                    accounts = export.accounts.len(),
                    "parsed inventory export"
                );
                accounts.extend(export.accounts);
                sources += 1;
            }
            Err(error) if mode == ParseMode::BestEffort => {
                warn!(path = %path.display(), %error, "skipping unparseable inventory export");
            }
            Err(error) => {
                return Err(error).with_context(|| format!("parse export {}", path.display()));
            }
        }
    }

    if sources == 0 {
        anyhow::bail!(
            "no inventory export files (*.json) found under {}",
            input.display()
        );
    }

    accounts.sort_by(|a, b| a.account.name.cmp(&b.account.name));
    Ok(accounts)
}

use std::io::Read;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::inventory::AccountRecord;

/// One inventory export file as produced by the upstream collector.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InventoryExport {
    pub exported_at: Option<DateTime<Utc>>,
    pub accounts: Vec<AccountRecord>,
}

pub fn parse_inventory_export<R: Read>(reader: R) -> anyhow::Result<InventoryExport> {
    serde_json::from_reader(reader).context("parse inventory export json")
}

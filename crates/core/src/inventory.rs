//! The in-memory contract produced by upstream inventory collectors.
//!
//! Every security-relevant field is optional: an export that omits a setting
//! is analyzed as "setting unknown", which the analyzers turn into findings
//! of absence rather than errors.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceEncryption {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EncryptionServices {
    pub blob: Option<ServiceEncryption>,
    pub file: Option<ServiceEncryption>,
    pub queue: Option<ServiceEncryption>,
    pub table: Option<ServiceEncryption>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IpRule {
    pub value: String,
    pub action: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VirtualNetworkRule {
    pub id: String,
    pub action: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkRuleSet {
    pub default_action: Option<String>,
    pub bypass: Option<String>,
    pub ip_rules: Vec<IpRule>,
    pub virtual_network_rules: Vec<VirtualNetworkRule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetentionPolicy {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToggleProperty {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BlobServiceProperties {
    pub delete_retention_policy: RetentionPolicy,
    pub container_delete_retention_policy: RetentionPolicy,
    pub is_versioning_enabled: bool,
    pub change_feed: ToggleProperty,
    pub restore_policy: ToggleProperty,
    pub last_access_time_tracking_policy: ToggleProperty,
}

/// Immutable configuration snapshot of one storage account, captured once
/// per assessment run by the inventory collector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSnapshot {
    pub id: String,
    pub name: String,
    pub resource_group: String,
    pub subscription_id: String,
    pub location: String,
    pub sku: Option<String>,
    pub kind: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub secondary_location: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub https_only: Option<bool>,
    pub min_tls_version: Option<String>,
    pub allow_blob_public_access: Option<bool>,
    pub allow_shared_key_access: Option<bool>,
    pub default_to_oauth_authentication: Option<bool>,
    pub encryption_key_source: Option<String>,
    pub encryption_services: EncryptionServices,
    pub network_rule_set: NetworkRuleSet,
    pub blob_service_properties: BlobServiceProperties,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TierBucket {
    pub count: u64,
    pub size_bytes: u64,
}

/// Per-container usage facts, embedded in the owning account's record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContainerUsage {
    pub name: String,
    pub public_access: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub blob_count: u64,
    pub total_size_bytes: u64,
    pub stale_blob_count: u64,
    pub stale_size_bytes: u64,
    pub access_tier_distribution: BTreeMap<String, TierBucket>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShareUsage {
    pub name: String,
    pub usage_bytes: u64,
    pub quota_gb: Option<u64>,
    pub access_tier: Option<String>,
    pub enabled_protocols: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricsSummary {
    pub total_transactions: f64,
    pub total_ingress_bytes: f64,
    pub total_egress_bytes: f64,
    pub avg_latency_ms: f64,
    pub avg_availability_percent: f64,
    pub has_activity: bool,
}

/// One account's complete inventory: the snapshot plus its sub-resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountRecord {
    pub account: AccountSnapshot,
    pub containers: Vec<ContainerUsage>,
    pub file_shares: Vec<ShareUsage>,
    pub metrics: Option<MetricsSummary>,
}

//! User and subscription domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_admin: bool,
    pub subscription_tier: SubscriptionTier,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

/// Billing plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Premium,
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionTier::Free => write!(f, "free"),
            SubscriptionTier::Premium => write!(f, "premium"),
        }
    }
}

/// Usage against the current plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    pub subscription_tier: SubscriptionTier,
    #[serde(default)]
    pub jobs_used: u32,
    /// `-1` means unlimited
    pub jobs_remaining: i64,
    #[serde(default = "default_true")]
    pub can_create_job: bool,
    #[serde(default)]
    pub needs_upgrade: bool,
}

impl SubscriptionStatus {
    /// Remaining job quota, `None` when unlimited
    pub fn remaining(&self) -> Option<u64> {
        u64::try_from(self.jobs_remaining).ok()
    }
}

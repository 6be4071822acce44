// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process ledger of catalog-backed requests and the credits they cost.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;

/// Entries kept when no cap is configured.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageAction {
    ModelsFetch,
    MaterialsFetch,
    Search,
}

impl UsageAction {
    /// Credits charged per request.
    pub fn credits(self) -> u32 {
        match self {
            UsageAction::ModelsFetch | UsageAction::MaterialsFetch | UsageAction::Search => 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageEntry {
    pub action: UsageAction,
    pub credits: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

/// Bounded ledger: the newest `max_entries` requests are kept and older ones
/// are dropped. The credit total covers every request since startup.
#[derive(Debug)]
pub struct UsageLedger {
    max_entries: usize,
    inner: Mutex<LedgerInner>,
}

#[derive(Debug, Default)]
struct LedgerInner {
    entries: VecDeque<UsageEntry>,
    total_credits: u64,
}

impl Default for UsageLedger {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl UsageLedger {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            inner: Mutex::new(LedgerInner::default()),
        }
    }

    pub fn record(&self, action: UsageAction, metadata: Value) {
        let entry = UsageEntry {
            action,
            credits: action.credits(),
            timestamp: Utc::now(),
            metadata,
        };
        tracing::info!(action = ?entry.action, credits = entry.credits, metadata = %entry.metadata, "Usage recorded");

        let mut inner = self.inner.lock();
        inner.total_credits += u64::from(entry.credits);
        inner.entries.push_back(entry);
        while inner.entries.len() > self.max_entries {
            inner.entries.pop_front();
        }
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> Vec<UsageEntry> {
        self.inner.lock().entries.iter().cloned().collect()
    }

    pub fn total_credits(&self) -> u64 {
        self.inner.lock().total_credits
    }
}

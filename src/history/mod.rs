//! In-memory run history, most recent first.
//!
//! Only successful runs are recorded. Entries are immutable once stored and
//! shared as `Arc`s so listing never clones full results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::engine::{ResultTab, RunContext, RunResult};
use crate::error::{AppError, AppResult};

/// A recorded successful run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub goal: String,
    pub timestamp: DateTime<Utc>,
    pub space: String,
    pub pages: Vec<String>,
    /// Display tabs, frozen at record time.
    pub tabs: Vec<ResultTab>,
    pub result: RunResult,
}

impl HistoryEntry {
    pub fn new(ctx: &RunContext, result: RunResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            goal: ctx.goal.clone(),
            timestamp: Utc::now(),
            space: ctx.space.clone(),
            pages: ctx.pages.clone(),
            tabs: result.tabs(),
            result,
        }
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            id: self.id,
            goal: self.goal.clone(),
            timestamp: self.timestamp,
            space: self.space.clone(),
            pages: self.pages.clone(),
            tools: self
                .result
                .tools_used()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Listing view of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub id: Uuid,
    pub goal: String,
    pub timestamp: DateTime<Utc>,
    pub space: String,
    pub pages: Vec<String>,
    pub tools: Vec<String>,
}

#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: RwLock<Vec<Arc<HistoryEntry>>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a finished run at the front of the history.
    pub fn record(&self, ctx: &RunContext, result: RunResult) -> Arc<HistoryEntry> {
        let entry = Arc::new(HistoryEntry::new(ctx, result));
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(0, Arc::clone(&entry));
        info!(id = %entry.id, total = entries.len(), "Run recorded in history");
        entry
    }

    /// Entries, most recent first.
    pub fn list(&self) -> Vec<Arc<HistoryEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn summaries(&self) -> Vec<HistorySummary> {
        self.list().iter().map(|entry| entry.summary()).collect()
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<HistoryEntry>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|entry| entry.id == *id)
            .cloned()
    }

    /// Restore a past run by id string.
    pub fn load(&self, id: &str) -> AppResult<Arc<HistoryEntry>> {
        let not_found = || AppError::HistoryNotFound { id: id.to_string() };
        let uuid = Uuid::parse_str(id.trim()).map_err(|_| not_found())?;
        self.get(&uuid).ok_or_else(not_found)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

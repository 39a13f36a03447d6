use serde::Serialize;

use crate::aggregate::resolve::DanglingRef;
use crate::aggregate::stale::StaleSummary;
use crate::discard::discard_model::{now_millis, DiscardStatus};

/// One line of the JSONL trace log.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u64,

    pub event: String,

    pub key: Option<String>,

    pub detail: Option<String>,
}

impl TraceEvent {
    pub fn now(event: impl ToString) -> Self {
        Self {
            timestamp_ms: now_millis(),
            event: event.to_string(),
            key: None,
            detail: None,
        }
    }

    pub fn dangling(dangling: &DanglingRef) -> Self {
        Self::now("dangling_discard")
            .with_key(&dangling.key)
            .with_detail(format!("{:?}", dangling.reason))
    }

    pub fn stale(stale: &StaleSummary) -> Self {
        Self::now("stale_summary").with_key(&stale.scope).with_detail(format!(
            "{}: stored {}, recomputed {}",
            stale.field, stale.stored, stale.recomputed
        ))
    }

    pub fn decision(key: &str, status: DiscardStatus) -> Self {
        Self::now("discard_decision")
            .with_key(key)
            .with_detail(format!("{:?}", status).to_lowercase())
    }

    pub fn with_key(mut self, key: impl ToString) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }
}

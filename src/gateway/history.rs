//! History collaborator interface.
//!
//! Durable history/collection storage lives outside this crate; the gateway
//! only defines the record shape it hands over and a trait for the boundary.
//! Status-0 results are recorded like any other outcome, distinguished by
//! their status rather than omitted.

use super::types::{NormalizedResponse, RequestDescription};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// One stored request/response pair. `insecure_tls` is surfaced as its own
/// flag so the caller's verification trade-off stays visible on the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: String,
    /// Unix seconds at record time.
    pub timestamp: u64,
    pub name: Option<String>,
    pub insecure_tls: bool,
    pub request: RequestDescription,
    pub response: NormalizedResponse,
}

impl HistoryRecord {
    pub fn capture(
        request: RequestDescription,
        response: NormalizedResponse,
        name: Option<String>,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            name,
            insecure_tls: request.insecure_tls,
            request,
            response,
        }
    }
}

/// Boundary to the external history store.
pub trait HistoryStore: Send + Sync {
    fn record(&self, record: HistoryRecord);

    /// Most recent records first, at most `limit` of them.
    fn recent(&self, limit: usize) -> Vec<HistoryRecord>;
}

/// In-memory store backing the route layer until a durable store is wired in.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    records: Mutex<Vec<HistoryRecord>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn record(&self, record: HistoryRecord) {
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(e) => tracing::error!(error = %e, "history store lock poisoned, dropping record"),
        }
    }

    fn recent(&self, limit: usize) -> Vec<HistoryRecord> {
        match self.records.lock() {
            Ok(records) => records.iter().rev().take(limit).cloned().collect(),
            Err(e) => {
                tracing::error!(error = %e, "history store lock poisoned");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn request(insecure: bool) -> RequestDescription {
        RequestDescription {
            method: "GET".to_string(),
            target_url: "https://example.test/".to_string(),
            headers: HashMap::new(),
            body: None,
            insecure_tls: insecure,
            ca_certificate: None,
        }
    }

    #[test]
    fn capture_lifts_the_insecure_flag_onto_the_record() {
        let response = NormalizedResponse::network_error("https://example.test/", "down".into());
        let record = HistoryRecord::capture(request(true), response, Some("smoke".into()));
        assert!(record.insecure_tls);
        assert_eq!(record.name.as_deref(), Some("smoke"));
        assert!(!record.id.is_empty());
        assert!(record.timestamp > 0);
    }

    #[test]
    fn status_zero_results_are_recorded_like_any_other() {
        let store = InMemoryHistoryStore::new();
        let response =
            NormalizedResponse::timeout("https://slow.test/", std::time::Duration::from_secs(30));
        store.record(HistoryRecord::capture(request(false), response, None));

        let recent = store.recent(10);
        assert_eq!(recent.len(), 1);
        assert!(recent[0].response.is_local_failure());
    }

    #[test]
    fn recent_returns_newest_first_up_to_limit() {
        let store = InMemoryHistoryStore::new();
        for i in 0..5 {
            let response =
                NormalizedResponse::network_error(&format!("https://t{i}.test/"), "x".into());
            store.record(HistoryRecord::capture(request(false), response, None));
        }

        let recent = store.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].response.final_url, "https://t4.test/");
        assert_eq!(recent[1].response.final_url, "https://t3.test/");
    }
}

//! Routing store, spec §4.6.
//!
//! Process-local map from IMSI to the VLR/MSC/SGSN/MME numbers last
//! established by a successful Update Location. Read-mostly and low
//! contention, so a single `RwLock` guards the whole map rather than a
//! sharded structure (spec §5/§9) — the same shape as
//! `TcapEndpoint::transactions` in the SIGTRAN stack this crate is built
//! from.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Routing numbers known for one subscriber, spec §3.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingEntry {
    pub vlr_number: Option<String>,
    pub msc_number: Option<String>,
    pub sgsn_number: Option<String>,
    pub mme_number: Option<String>,
}

impl RoutingEntry {
    /// At least one number must be present for a routing lookup to
    /// succeed (spec §3 invariant).
    pub fn has_any_number(&self) -> bool {
        self.vlr_number.is_some()
            || self.msc_number.is_some()
            || self.sgsn_number.is_some()
            || self.mme_number.is_some()
    }
}

/// Shared, process-lifetime routing table.
#[derive(Clone, Default)]
pub struct RoutingStore {
    entries: Arc<RwLock<HashMap<String, RoutingEntry>>>,
}

impl RoutingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last-writer-wins upsert: entirely replaces any prior entry for this
    /// IMSI, including fields the new entry leaves unset (spec §8
    /// idempotence invariant).
    pub async fn upsert(&self, imsi: &str, entry: RoutingEntry) {
        self.entries.write().await.insert(imsi.to_string(), entry);
    }

    pub async fn get(&self, imsi: &str) -> Option<RoutingEntry> {
        self.entries.read().await.get(imsi).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_entry_has_no_numbers() {
        let store = RoutingStore::new();
        assert!(store.get("001017890123453").await.is_none());
    }

    #[tokio::test]
    async fn second_upsert_wins_even_when_sparser() {
        let store = RoutingStore::new();
        store
            .upsert(
                "001017890123453",
                RoutingEntry {
                    vlr_number: Some("49123456789".to_string()),
                    msc_number: Some("49987654321".to_string()),
                    sgsn_number: None,
                    mme_number: None,
                },
            )
            .await;
        store
            .upsert(
                "001017890123453",
                RoutingEntry {
                    vlr_number: None,
                    msc_number: Some("49111111111".to_string()),
                    sgsn_number: None,
                    mme_number: None,
                },
            )
            .await;

        let entry = store.get("001017890123453").await.unwrap();
        assert_eq!(entry.vlr_number, None);
        assert_eq!(entry.msc_number.as_deref(), Some("49111111111"));
    }

    #[test]
    fn empty_entry_has_no_numbers() {
        assert!(!RoutingEntry::default().has_any_number());
    }
}

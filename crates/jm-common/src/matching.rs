use std::collections::BTreeSet;

use crate::api::worker::Worker;
use crate::store::{AvailabilityLedger, WorkerRepository};

/// Workers whose phone number has posted at least one availability event,
/// in registration order. Numbers without a worker are ignored.
pub fn match_available(workers: Vec<Worker>, available: &BTreeSet<String>) -> Vec<Worker> {
    workers
        .into_iter()
        .filter(|worker| available.contains(&worker.phone_number))
        .collect()
}

/// Snapshot both collections and intersect them for the dashboard.
pub async fn available_workers(
    workers: &WorkerRepository,
    ledger: &AvailabilityLedger,
) -> (Vec<Worker>, usize) {
    let registered = workers.list_all().await;
    let total = registered.len();
    let available = ledger.distinct_available_phone_numbers().await;
    (match_available(registered, &available), total)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::worker::WorkerRegistration;
    use crate::store::{RecordStore, StoreConfig};

    fn worker(id: u64, phone: &str) -> Worker {
        Worker {
            id,
            name: format!("w{id}"),
            location: "Indore".into(),
            skills: "painting".into(),
            experience: "2 years".into(),
            phone_number: phone.into(),
        }
    }

    #[test]
    fn keeps_only_registered_workers_with_events() {
        let workers = vec![worker(1, "A"), worker(2, "B")];
        let available = BTreeSet::from(["B".to_string(), "C".to_string()]);

        let matched = match_available(workers, &available);
        assert_eq!(matched, vec![worker(2, "B")]);
    }

    #[test]
    fn empty_ledger_matches_nothing() {
        let matched = match_available(vec![worker(1, "A")], &BTreeSet::new());
        assert!(matched.is_empty());
    }

    #[tokio::test]
    async fn dashboard_intersection_over_repositories() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(RecordStore::new(StoreConfig::in_dir(dir.path())));
        let workers = WorkerRepository::new(store.clone());
        let ledger = AvailabilityLedger::new(store);

        for phone in ["A", "B"] {
            workers
                .register(WorkerRegistration {
                    name: format!("worker {phone}"),
                    location: "Indore".into(),
                    skills: "painting".into(),
                    experience: "2 years".into(),
                    phone_number: phone.into(),
                })
                .await
                .unwrap();
        }
        ledger.record_availability("B", None).await.unwrap();
        ledger.record_availability("C", None).await.unwrap();
        ledger.record_availability("B", None).await.unwrap();

        let (matched, total) = available_workers(&workers, &ledger).await;
        assert_eq!(total, 2);
        assert_eq!(
            matched.iter().map(|w| w.phone_number.as_str()).collect::<Vec<_>>(),
            vec!["B"]
        );
    }
}

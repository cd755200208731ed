use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::api::worker::{Worker, WorkerRegistration};
use crate::store::records::{Collection, RecordStore};
use crate::store::{first_missing_field, storage_error};

storage_error!(WorkerStorageError {
    #[error("phone number already registered: {0}")]
    DuplicatePhone(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("worker id space exhausted after id {0}")]
    IdSpaceExhausted(u64),
});

/// Worker records on top of the workers document.
///
/// Every call is a full load (and for writes, save) of the document; the
/// mutex serializes those cycles within this process.
#[derive(Debug)]
pub struct WorkerRepository {
    store: Arc<RecordStore>,
    lock: Mutex<()>,
}

fn next_worker_id(workers: &[Worker]) -> Result<u64, WorkerStorageError> {
    match workers.iter().map(|w| w.id).max() {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or(WorkerStorageError::IdSpaceExhausted(max)),
    }
}

impl WorkerRepository {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    #[instrument(skip(self, registration), fields(phone_number = %registration.phone_number))]
    pub async fn register(
        &self,
        registration: WorkerRegistration,
    ) -> Result<Worker, WorkerStorageError> {
        if let Some(field) = first_missing_field(&registration.fields()) {
            return Err(WorkerStorageError::MissingField(field));
        }

        let _guard = self.lock.lock().await;
        let mut workers: Vec<Worker> = self.store.load(Collection::Workers).await;

        if workers
            .iter()
            .any(|w| w.phone_number == registration.phone_number)
        {
            return Err(WorkerStorageError::DuplicatePhone(registration.phone_number));
        }

        let worker = registration.into_worker(next_worker_id(&workers)?);
        workers.push(worker.clone());
        self.store.save(Collection::Workers, &workers).await?;

        info!(worker_id = worker.id, "worker_registered");
        Ok(worker)
    }

    pub async fn list_all(&self) -> Vec<Worker> {
        let _guard = self.lock.lock().await;
        self.store.load(Collection::Workers).await
    }

    pub async fn find_by_phone(&self, phone_number: &str) -> Option<Worker> {
        self.list_all()
            .await
            .into_iter()
            .find(|w| w.phone_number == phone_number)
    }

    pub async fn find_by_id(&self, id: u64) -> Option<Worker> {
        self.list_all().await.into_iter().find(|w| w.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::records::StoreConfig;

    fn repo(dir: &tempfile::TempDir) -> (WorkerRepository, Arc<RecordStore>) {
        let store = Arc::new(RecordStore::new(StoreConfig::in_dir(dir.path())));
        (WorkerRepository::new(store.clone()), store)
    }

    fn registration(name: &str, phone: &str) -> WorkerRegistration {
        WorkerRegistration {
            name: name.into(),
            location: "Nashik".into(),
            skills: "plumbing, tiling".into(),
            experience: "5 years".into(),
            phone_number: phone.into(),
        }
    }

    #[tokio::test]
    async fn first_worker_gets_id_one() {
        let dir = tempfile::tempdir().unwrap();
        let (workers, _) = repo(&dir);

        let worker = workers.register(registration("Ravi", "111")).await.unwrap();
        assert_eq!(worker.id, 1);
        assert_eq!(worker.name, "Ravi");
        assert_eq!(workers.list_all().await, vec![worker]);
    }

    #[tokio::test]
    async fn duplicate_phone_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (workers, _) = repo(&dir);

        workers
            .register(registration("Ravi", "9998887777"))
            .await
            .unwrap();
        let err = workers
            .register(registration("Someone Else", "9998887777"))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkerStorageError::DuplicatePhone(ref p) if p == "9998887777"));
        assert_eq!(workers.list_all().await.len(), 1);
    }

    #[tokio::test]
    async fn phone_match_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let (workers, _) = repo(&dir);

        workers.register(registration("A", "98765 43210")).await.unwrap();
        workers.register(registration("B", "9876543210")).await.unwrap();

        assert_eq!(workers.list_all().await.len(), 2);
        assert!(workers.find_by_phone("98765-43210").await.is_none());
    }

    #[tokio::test]
    async fn next_id_follows_max_existing_id() {
        let dir = tempfile::tempdir().unwrap();
        let (workers, store) = repo(&dir);

        let seeded = [1, 2, 5]
            .into_iter()
            .map(|id| registration("seed", &format!("seed-{id}")).into_worker(id))
            .collect::<Vec<_>>();
        store.save(Collection::Workers, &seeded).await.unwrap();

        let worker = workers.register(registration("New", "777")).await.unwrap();
        assert_eq!(worker.id, 6);
    }

    #[tokio::test]
    async fn hand_edited_max_id_does_not_wrap() {
        let dir = tempfile::tempdir().unwrap();
        let (workers, store) = repo(&dir);

        let seeded = vec![registration("seed", "seed-max").into_worker(u64::MAX)];
        store.save(Collection::Workers, &seeded).await.unwrap();

        let err = workers
            .register(registration("New", "777"))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerStorageError::IdSpaceExhausted(u64::MAX)));
        assert_eq!(workers.list_all().await, seeded);
    }

    #[tokio::test]
    async fn blank_field_is_rejected_before_touching_storage() {
        let dir = tempfile::tempdir().unwrap();
        let (workers, _) = repo(&dir);

        let mut incomplete = registration("Ravi", "111");
        incomplete.skills = "   ".into();

        let err = workers.register(incomplete).await.unwrap_err();
        assert!(matches!(err, WorkerStorageError::MissingField("skills")));
        assert!(!dir.path().join("workers.json").exists());
    }

    #[tokio::test]
    async fn lookups_scan_current_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let (workers, _) = repo(&dir);

        let ravi = workers.register(registration("Ravi", "111")).await.unwrap();
        let meena = workers.register(registration("Meena", "222")).await.unwrap();

        assert_eq!(workers.find_by_phone("222").await, Some(meena));
        assert_eq!(workers.find_by_id(ravi.id).await, Some(ravi));
        assert_eq!(workers.find_by_id(42).await, None);
        assert_eq!(workers.find_by_phone("333").await, None);
    }

    #[tokio::test]
    async fn list_all_is_stable_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let (workers, _) = repo(&dir);

        workers.register(registration("Ravi", "111")).await.unwrap();
        workers.register(registration("Meena", "222")).await.unwrap();

        assert_eq!(workers.list_all().await, workers.list_all().await);
    }

    #[tokio::test]
    async fn concurrent_registrations_do_not_lose_updates() {
        let dir = tempfile::tempdir().unwrap();
        let (workers, _) = repo(&dir);
        let workers = Arc::new(workers);

        let handles = (0..10)
            .map(|i| {
                let workers = workers.clone();
                tokio::spawn(async move {
                    workers
                        .register(registration("w", &format!("phone-{i}")))
                        .await
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut ids = workers
            .list_all()
            .await
            .into_iter()
            .map(|w| w.id)
            .collect::<Vec<_>>();
        ids.sort_unstable();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }
}

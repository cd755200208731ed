use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::api::availability::AvailabilityEvent;
use crate::store::records::{Collection, RecordStore};
use crate::store::storage_error;

storage_error!(LedgerStorageError {
    #[error("availability event requires a phone number")]
    MissingPhoneNumber,
});

/// Append-only log of availability signals.
///
/// The ledger does not check that a phone number belongs to a registered
/// worker; the missed-call workflow does that before recording. Events never
/// expire.
#[derive(Debug)]
pub struct AvailabilityLedger {
    store: Arc<RecordStore>,
    lock: Mutex<()>,
}

impl AvailabilityLedger {
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Append an event stamped with `timestamp`, or the current time.
    #[instrument(skip(self))]
    pub async fn record_availability(
        &self,
        phone_number: &str,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<AvailabilityEvent, LedgerStorageError> {
        if phone_number.is_empty() {
            return Err(LedgerStorageError::MissingPhoneNumber);
        }

        let event = AvailabilityEvent::new(phone_number, timestamp.unwrap_or_else(Utc::now));

        let _guard = self.lock.lock().await;
        let mut events: Vec<AvailabilityEvent> =
            self.store.load(Collection::Availability).await;
        events.push(event.clone());
        self.store.save(Collection::Availability, &events).await?;

        info!(timestamp = %event.timestamp, "availability_recorded");
        Ok(event)
    }

    /// Every event in insertion order.
    pub async fn list_events(&self) -> Vec<AvailabilityEvent> {
        let _guard = self.lock.lock().await;
        self.store.load(Collection::Availability).await
    }

    pub async fn distinct_available_phone_numbers(&self) -> BTreeSet<String> {
        self.list_events()
            .await
            .into_iter()
            .map(|event| event.phone_number)
            .collect()
    }
}

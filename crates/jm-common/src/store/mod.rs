pub mod availability;
pub mod contractors;
pub mod records;
pub mod workers;

/// Declare a repository error enum that also carries [`StorageError`].
macro_rules! storage_error {
    ($name:ident { $($variants:tt)* }) => {
        #[derive(Debug, thiserror::Error)]
        pub enum $name {
            $($variants)*
            #[error(transparent)]
            Storage(#[from] $crate::store::records::StorageError),
        }
    };
}

pub(crate) use storage_error;

/// Name of the first field that is blank after trimming.
pub(crate) fn first_missing_field(fields: &[(&'static str, &str)]) -> Option<&'static str> {
    fields
        .iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
}

pub use availability::{AvailabilityLedger, LedgerStorageError};
pub use contractors::{ContractorRepository, ContractorStorageError};
pub use records::{Collection, Document, RecordStore, StorageError, StoreConfig};
pub use workers::{WorkerRepository, WorkerStorageError};

use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::{info, instrument, warn};

use crate::api::contractor::{
    ContractorAccount, ContractorRecord, ContractorRegistration, ContractorTable,
};
use crate::password::{hash_password, verify_password, PasswordError};
use crate::store::records::{Collection, RecordStore};
use crate::store::{first_missing_field, storage_error};

storage_error!(ContractorStorageError {
    #[error("username already taken: {0}")]
    DuplicateUsername(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("{0}")]
    Password(#[from] PasswordError),
});

/// Contractor credentials keyed by username.
#[derive(Debug)]
pub struct ContractorRepository {
    store: Arc<RecordStore>,
    bcrypt_cost: u32,
    lock: Mutex<()>,
    /// Verified against on the unknown-username path; hashed on first use.
    decoy_hash: OnceCell<String>,
}

impl ContractorRepository {
    pub fn new(store: Arc<RecordStore>, bcrypt_cost: u32) -> Self {
        Self {
            store,
            bcrypt_cost,
            lock: Mutex::new(()),
            decoy_hash: OnceCell::new(),
        }
    }

    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(
        &self,
        registration: ContractorRegistration,
    ) -> Result<ContractorAccount, ContractorStorageError> {
        if let Some(field) = first_missing_field(&registration.fields()) {
            return Err(ContractorStorageError::MissingField(field));
        }

        let password_hash = hash_password(&registration.password, self.bcrypt_cost).await?;

        let _guard = self.lock.lock().await;
        let mut table: ContractorTable = self.store.load(Collection::Contractors).await;

        if table.contains_key(&registration.username) {
            return Err(ContractorStorageError::DuplicateUsername(
                registration.username,
            ));
        }

        let record = ContractorRecord {
            password_hash,
            name: registration.name,
            phone_number: registration.phone_number,
            age: registration.age,
            job_type: registration.job_type,
        };
        let account = ContractorAccount::from_record(&registration.username, &record);

        table.insert(registration.username, record);
        self.store.save(Collection::Contractors, &table).await?;

        info!("contractor_registered");
        Ok(account)
    }

    /// Unknown usernames and wrong passwords both yield
    /// [`ContractorStorageError::InvalidCredentials`].
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<ContractorAccount, ContractorStorageError> {
        let Some(record) = self.load_record(username).await else {
            self.verify_against_decoy(password).await;
            return Err(ContractorStorageError::InvalidCredentials);
        };

        match verify_password(password, &record.password_hash).await {
            Ok(true) => Ok(ContractorAccount::from_record(username, &record)),
            Ok(false) => Err(ContractorStorageError::InvalidCredentials),
            Err(err) => {
                warn!(error = %err, "stored password hash unusable");
                Err(ContractorStorageError::InvalidCredentials)
            }
        }
    }

    pub async fn find(&self, username: &str) -> Option<ContractorAccount> {
        self.load_record(username)
            .await
            .map(|record| ContractorAccount::from_record(username, &record))
    }

    async fn verify_against_decoy(&self, password: &str) {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| hash_password("jm-decoy-password", self.bcrypt_cost))
            .await;

        match decoy {
            Ok(hash) => {
                let _ = verify_password(password, hash).await;
            }
            Err(err) => warn!(error = %err, "decoy password hash unavailable"),
        }
    }

    async fn load_record(&self, username: &str) -> Option<ContractorRecord> {
        let _guard = self.lock.lock().await;
        let mut table: ContractorTable = self.store.load(Collection::Contractors).await;
        table.remove(username)
    }
}

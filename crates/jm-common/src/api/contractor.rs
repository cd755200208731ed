use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Persisted contractor credentials, stored under the username key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractorRecord {
    pub password_hash: String,
    pub name: String,
    pub phone_number: String,
    pub age: String,
    pub job_type: String,
}

/// On-disk shape of the contractors document: `username -> record`.
pub type ContractorTable = BTreeMap<String, ContractorRecord>;

/// Public view of a contractor. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractorAccount {
    pub username: String,
    pub name: String,
    pub phone_number: String,
    pub age: String,
    pub job_type: String,
}

impl ContractorAccount {
    pub fn from_record(username: &str, record: &ContractorRecord) -> Self {
        Self {
            username: username.to_string(),
            name: record.name.clone(),
            phone_number: record.phone_number.clone(),
            age: record.age.clone(),
            job_type: record.job_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContractorRegistration {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub job_type: String,
}

impl ContractorRegistration {
    pub(crate) fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("name", self.name.as_str()),
            ("phone_number", self.phone_number.as_str()),
            ("age", self.age.as_str()),
            ("job_type", self.job_type.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

use serde::{Deserialize, Serialize};

use crate::api::contractor::ContractorAccount;
use crate::api::worker::Worker;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub contractor: ContractorAccount,
    pub available_workers: Vec<Worker>,
    pub registered_workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HireStatus {
    Notified,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HireResponse {
    pub status: HireStatus,
    pub worker_id: u64,
    pub worker_name: String,
    pub message: String,
}

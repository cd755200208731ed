use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::api::contractor::ContractorAccount;
use crate::api::worker::Worker;

/// What was (or would have been) sent to the worker.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HireNotice {
    pub worker_id: u64,
    pub to: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}

/// Delivery of a hire request to a worker. No state is recorded in the
/// stores; delivery is entirely the implementor's concern.
pub trait HireNotifier: Send + Sync {
    fn notify(&self, contractor: &ContractorAccount, worker: &Worker) -> HireNotice;
}

pub fn hire_message(contractor: &ContractorAccount, worker: &Worker) -> String {
    format!(
        "Hello {}, {} ({}) wants to hire you. Call back on {}.",
        worker.name, contractor.name, contractor.job_type, contractor.phone_number
    )
}

/// Simulated SMS: the message is written to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl HireNotifier for LogNotifier {
    fn notify(&self, contractor: &ContractorAccount, worker: &Worker) -> HireNotice {
        let notice = HireNotice {
            worker_id: worker.id,
            to: worker.phone_number.clone(),
            message: hire_message(contractor, worker),
            sent_at: Utc::now(),
        };

        info!(
            worker_id = notice.worker_id,
            to = %notice.to,
            contractor = %contractor.username,
            message = %notice.message,
            "hire_notification_simulated"
        );

        notice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_notifier_addresses_the_worker() {
        let contractor = ContractorAccount {
            username: "asha".into(),
            name: "Asha Builders".into(),
            phone_number: "9000000001".into(),
            age: "44".into(),
            job_type: "construction".into(),
        };
        let worker = Worker {
            id: 7,
            name: "Ravi".into(),
            location: "Pune".into(),
            skills: "masonry".into(),
            experience: "4 years".into(),
            phone_number: "9111111111".into(),
        };

        let notice = LogNotifier.notify(&contractor, &worker);
        assert_eq!(notice.worker_id, 7);
        assert_eq!(notice.to, "9111111111");
        assert!(notice.message.contains("Asha Builders"));
        assert!(notice.message.contains("9000000001"));
    }
}

pub mod api;
pub mod logging;
pub mod matching;
pub mod notify;
pub mod password;
pub mod store;

pub use api::availability::AvailabilityEvent;
pub use api::contractor::{ContractorAccount, ContractorRecord};
pub use api::worker::Worker;

pub mod availability;
pub mod contractor;
pub mod dashboard;
pub mod missed_call;
pub mod worker;

pub mod contractors;
pub mod dashboard;
pub mod health;
pub mod missed_call;
pub mod pages;
pub mod workers;

pub mod contracts;
pub mod milestones;
pub mod payments;
pub mod time_logs;
pub mod transactions;
pub mod users;

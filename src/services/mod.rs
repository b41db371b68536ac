pub mod contracts;
pub mod escrow;
pub mod milestones;
pub mod settlement;
pub mod time_logs;

pub mod participant;
pub mod period;
pub mod profile;
pub mod report;
pub mod role;
pub mod stats;

pub mod aggregation;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod hierarchy;
pub mod models;
pub mod state;
pub mod store;
pub mod text;

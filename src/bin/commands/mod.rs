pub mod config;
pub mod history;

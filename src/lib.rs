pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod steps;
pub mod storage;
pub mod types;

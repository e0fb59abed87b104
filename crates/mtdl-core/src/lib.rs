pub mod config;
pub mod logging;

pub mod orchestrator;
pub mod partition;
pub mod progress;
pub mod transfer;
pub mod url_model;

pub mod config;
pub mod error;
pub mod fetch;
pub mod http_client;
pub mod logging;
pub mod narrative;
pub mod normalize;
pub mod present;
pub mod prompt;
pub mod report;
pub mod state;
pub mod stats;

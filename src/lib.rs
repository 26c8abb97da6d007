pub mod analytics;
pub mod backend;
pub mod config;
pub mod error;
pub mod profile;
pub mod prompts;
pub mod session;
pub mod state;
pub mod workflow;

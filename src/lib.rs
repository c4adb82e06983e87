pub mod api;
pub mod config;
pub mod engine;
pub mod provider;
pub mod search;
pub mod server;

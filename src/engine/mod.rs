// Thumbnail cache engine — synchronous resolve path plus background fetch pool.

pub mod cache;
pub mod fetcher;
pub mod resolver;
pub mod stats;

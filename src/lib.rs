pub mod config;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod types;

pub use pipeline::classify::classify;
pub use pipeline::parse::{extract_batch, extract_tracks};
pub use pipeline::search::search;

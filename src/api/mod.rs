pub mod middleware;
pub mod routes;

// Re-export public types and functions
pub use middleware::log_request_errors;
pub use routes::{extract_video_links, health, relay_xhs};

// HTTP API (axum)
pub mod api;

// CLI renderings
pub mod report;

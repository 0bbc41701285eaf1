// Forecast request/response domain
pub mod forecasting;

// Feature schema shared with the model
pub mod ml;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;

// Market data integrity checks
pub mod validation;

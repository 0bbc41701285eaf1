// Binance REST market data
pub mod binance;

// Shared HTTP plumbing
pub mod core;

// Local CSV market data
pub mod csv_market_data;

// Config -> adapters
pub mod factory;

// Offline market data and model stubs
pub mod mock;

// Prometheus metrics
pub mod observability;

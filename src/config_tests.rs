use crate::config::{Config, ModelBackend, Mode};
use std::env;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const ALL_VARS: &[&str] = &[
    "MODE",
    "SYMBOL",
    "BINANCE_BASE_URL",
    "BINANCE_API_KEY",
    "CSV_PATH",
    "MODEL_PATH",
    "MODEL_BACKEND",
    "MODEL_TYPE",
    "MODEL_TRAINING_PERIOD",
    "MODEL_MAPE",
    "FORECAST_HORIZON_DAYS",
    "FORECAST_LOOKBACK_DAYS",
    "FORECAST_MIN_ROWS",
    "MA_PERIOD",
    "RSI_PERIOD",
    "FORECAST_PROPAGATE_ONLY_PRICE",
    "SERVER_BIND_ADDRESS",
    "SERVER_PORT",
];

fn clear_env() {
    for key in ALL_VARS {
        unsafe { env::remove_var(key) };
    }
}

fn set(key: &str, value: &str) {
    unsafe { env::set_var(key, value) };
}

#[test]
fn test_config_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.mode, Mode::Mock);
    assert_eq!(config.market_data.symbol, "BTC/USDT");
    assert_eq!(config.market_data.binance.base_url, "https://api.binance.com");
    assert_eq!(config.model.path, PathBuf::from("models/model.onnx"));
    assert_eq!(config.model.backend, ModelBackend::Onnx);
    assert_eq!(config.model.model_type, "LSTM");
    assert_eq!(config.forecast.horizon_days, 30);
    assert_eq!(config.forecast.lookback_days, 300);
    assert_eq!(config.forecast.min_rows, 50);
    assert!(config.forecast.propagate_only_price);
    assert_eq!(config.server.port, 5001);
    assert_eq!(config.server.bind_address, "0.0.0.0");
}

#[test]
fn test_config_overrides() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    set("MODE", "Binance");
    set("SYMBOL", "ETH/USDT");
    set("MODEL_PATH", "models/forest.json");
    set("FORECAST_HORIZON_DAYS", "7");
    set("FORECAST_PROPAGATE_ONLY_PRICE", "false");
    set("SERVER_PORT", "8080");

    let config = Config::from_env().unwrap();

    assert_eq!(config.mode, Mode::Binance);
    assert_eq!(config.market_data.symbol, "ETH/USDT");
    assert_eq!(config.model.backend, ModelBackend::SmartCore);
    assert_eq!(config.model.metadata().model_path, "models/forest.json");
    assert_eq!(config.forecast.horizon_days, 7);
    assert!(!config.forecast.propagate_only_price);
    assert_eq!(config.server.port, 8080);

    let settings = config.forecast.settings(&config.market_data.symbol);
    assert_eq!(settings.symbol, "ETH/USDT");
    assert_eq!(settings.horizon, 7);

    clear_env();
}

#[test]
fn test_explicit_backend_wins_over_extension() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    set("MODEL_PATH", "models/forest.json");
    set("MODEL_BACKEND", "onnx");

    let config = Config::from_env().unwrap();
    assert_eq!(config.model.backend, ModelBackend::Onnx);

    clear_env();
}

#[test]
fn test_invalid_values_rejected() {
    let _guard = get_env_lock().lock().unwrap();

    clear_env();
    set("MODE", "alpaca");
    assert!(Config::from_env().is_err());

    clear_env();
    set("FORECAST_HORIZON_DAYS", "thirty");
    let err = Config::from_env().unwrap_err();
    assert!(format!("{:#}", err).contains("FORECAST_HORIZON_DAYS"));

    clear_env();
    set("MA_PERIOD", "0");
    assert!(Config::from_env().is_err());

    clear_env();
    set("FORECAST_LOOKBACK_DAYS", "60");
    assert!(Config::from_env().is_err());

    clear_env();
    set("SERVER_PORT", "70000");
    assert!(Config::from_env().is_err());

    clear_env();
}

#[test]
fn test_empty_values_fall_back_to_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    clear_env();

    set("SYMBOL", "");
    set("RSI_PERIOD", "  ");

    let config = Config::from_env().unwrap();
    assert_eq!(config.market_data.symbol, "BTC/USDT");
    assert_eq!(config.forecast.rsi_period, 14);

    clear_env();
}

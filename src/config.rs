use std::env;

use crate::error::FleetError;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub request_queue_size: usize,
    pub event_buffer_size: usize,
    pub base_name: String,
    pub base_lat: f64,
    pub base_lng: f64,
    pub base_capacity: usize,
    pub scenario_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self, FleetError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            request_queue_size: parse_or_default("REQUEST_QUEUE_SIZE", 1024)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            base_name: env::var("BASE_NAME").unwrap_or_else(|_| "base1".to_string()),
            base_lat: parse_or_default("BASE_LAT", 52.3738)?,
            base_lng: parse_or_default("BASE_LNG", 9.7312)?,
            base_capacity: parse_or_default("BASE_CAPACITY", 16)?,
            scenario_path: env::var("SCENARIO_PATH")
                .unwrap_or_else(|_| "scenario.json".to_string()),
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, FleetError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| FleetError::Config(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Rolling hold window, reset on every hold touch.
    #[serde(default = "default_hold_seconds")]
    pub hold_seconds: u64,
    /// Flat per-seat ticket price, in whole currency units.
    #[serde(default = "default_seat_price")]
    pub seat_price_amount: i64,
    /// Loyalty earn rate when no admin-configured rate is active.
    /// Business-policy placeholder, pending product confirmation.
    #[serde(default = "default_loyalty_rate")]
    pub default_loyalty_rate: f64,
    #[serde(default = "default_seat_rows")]
    pub seat_rows: u8,
    #[serde(default = "default_seat_columns")]
    pub seat_columns: u8,
}

fn default_hold_seconds() -> u64 {
    7200
}
fn default_seat_price() -> i64 {
    350
}
fn default_loyalty_rate() -> f64 {
    0.01
}
fn default_seat_rows() -> u8 {
    7
}
fn default_seat_columns() -> u8 {
    12
}

impl Default for BusinessRules {
    fn default() -> Self {
        BusinessRules {
            hold_seconds: default_hold_seconds(),
            seat_price_amount: default_seat_price(),
            default_loyalty_rate: default_loyalty_rate(),
            seat_rows: default_seat_rows(),
            seat_columns: default_seat_columns(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `MARQUEE__SERVER__PORT=8080`
            .add_source(config::Environment::with_prefix("MARQUEE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rule_defaults() {
        let rules = BusinessRules::default();
        assert_eq!(rules.hold_seconds, 7200);
        assert_eq!(rules.seat_price_amount, 350);
        assert_eq!(rules.seat_rows, 7);
        assert_eq!(rules.seat_columns, 12);
    }
}

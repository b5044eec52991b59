use crate::app_config::{
    AppConfig, CatalogSettings, Environment, RankingSource, DEFAULT_ATTRIBUTE_CODES,
    DEFAULT_RANKING_SOURCES,
};
use crate::inventory_fields::InventoryFields;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Returns `true` for a bare SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`.
#[must_use]
pub fn is_sql_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        or_default(var, default)
            .parse::<i64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_flag = |var: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, "false");
        parse_bool(&raw).ok_or_else(|| invalid(var, format!("expected a boolean, got {raw:?}")))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("CATIDX_ENV", "development"))?;
    let log_level = or_default("CATIDX_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("CATIDX_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("CATIDX_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("CATIDX_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let stock_website_id = parse_i64("CATIDX_STOCK_WEBSITE_ID", "0")?;

    let ranking_sources = split_list(&or_default("CATIDX_RANKING_SOURCES", DEFAULT_RANKING_SOURCES))
        .iter()
        .map(|raw| RankingSource::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let attribute_codes = split_list(&or_default("CATIDX_ATTRIBUTE_CODES", DEFAULT_ATTRIBUTE_CODES));
    if let Some(bad) = attribute_codes.iter().find(|c| !is_sql_identifier(c)) {
        return Err(ConfigError::InvalidIdentifier {
            context: "CATIDX_ATTRIBUTE_CODES".to_string(),
            value: bad.clone(),
        });
    }

    let catalog = CatalogSettings {
        use_native_url_keys: parse_flag("CATIDX_USE_NATIVE_URL_KEYS")?,
        slug_from_url_key: parse_flag("CATIDX_SLUG_FROM_URL_KEY")?,
        product_url_suffix: or_default("CATIDX_PRODUCT_URL_SUFFIX", ".html"),
        ranking_sources,
        attribute_codes,
    };

    let defaults = InventoryFields::default();
    let required = lookup("CATIDX_INVENTORY_COLUMNS")
        .map_or_else(|_| defaults.required_columns().to_vec(), |raw| split_list(&raw));
    let child_required = lookup("CATIDX_INVENTORY_CHILD_COLUMNS").map_or_else(
        |_| defaults.child_required_columns().to_vec(),
        |raw| split_list(&raw),
    );
    let inventory_fields = InventoryFields::new(required, child_required)?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        stock_website_id,
        catalog,
        inventory_fields,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CATIDX_ENV".to_string(),
            reason: format!("unknown environment {other:?}"),
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" | "" => Some(false),
        _ => None,
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

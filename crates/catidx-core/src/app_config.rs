use crate::config::is_sql_identifier;
use crate::inventory_fields::InventoryFields;
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// An auxiliary table holding a per-product, per-store popularity counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingSource {
    pub table: String,
    /// Column holding the counter value.
    pub metric_column: String,
    /// Document field the counter is written to.
    pub field: String,
}

impl RankingSource {
    /// Parse `table:column[:field]`. The field defaults to the table name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidIdentifier`] if the string is malformed or
    /// any part is not a plain SQL identifier.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = raw.trim().split(':').map(str::trim).collect();
        let (table, metric_column, field) = match parts.as_slice() {
            [table, column] => (*table, *column, *table),
            [table, column, field] => (*table, *column, *field),
            _ => {
                return Err(ConfigError::InvalidIdentifier {
                    context: "ranking source".to_string(),
                    value: raw.to_string(),
                })
            }
        };

        for part in [table, metric_column, field] {
            if !is_sql_identifier(part) {
                return Err(ConfigError::InvalidIdentifier {
                    context: format!("ranking source {raw:?}"),
                    value: part.to_string(),
                });
            }
        }

        Ok(Self {
            table: table.to_string(),
            metric_column: metric_column.to_string(),
            field: field.to_string(),
        })
    }
}

pub const DEFAULT_RANKING_SOURCES: &str =
    "amasty_sorting_most_viewed:views_num,amasty_sorting_bestsellers:qty_ordered";

pub const DEFAULT_ATTRIBUTE_CODES: &str = "name,url_key,status,visibility,price,special_price,\
     description,short_description,meta_title,meta_description,image,small_image,thumbnail";

/// Settings read by the attribute provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Use the stored `url_key` as the slug without regenerating it.
    pub use_native_url_keys: bool,
    /// Generate the slug from `url_key` rather than `name`.
    pub slug_from_url_key: bool,
    /// Suffix stripped from rewrite request paths, e.g. `".html"`.
    pub product_url_suffix: String,
    pub ranking_sources: Vec<RankingSource>,
    pub attribute_codes: Vec<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            use_native_url_keys: false,
            slug_from_url_key: false,
            product_url_suffix: ".html".to_string(),
            ranking_sources: DEFAULT_RANKING_SOURCES
                .split(',')
                .filter_map(|raw| RankingSource::parse(raw).ok())
                .collect(),
            attribute_codes: DEFAULT_ATTRIBUTE_CODES
                .split(',')
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub stock_website_id: i64,
    pub catalog: CatalogSettings,
    pub inventory_fields: InventoryFields,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("stock_website_id", &self.stock_website_id)
            .field("catalog", &self.catalog)
            .field("inventory_fields", &self.inventory_fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_source_field_defaults_to_table() {
        let source = RankingSource::parse("amasty_sorting_bestsellers:qty_ordered").unwrap();
        assert_eq!(source.table, "amasty_sorting_bestsellers");
        assert_eq!(source.metric_column, "qty_ordered");
        assert_eq!(source.field, "amasty_sorting_bestsellers");
    }

    #[test]
    fn ranking_source_explicit_field() {
        let source = RankingSource::parse(" views : views_num : popularity ").unwrap();
        assert_eq!(source.table, "views");
        assert_eq!(source.metric_column, "views_num");
        assert_eq!(source.field, "popularity");
    }

    #[test]
    fn ranking_source_rejects_missing_column() {
        assert!(RankingSource::parse("views").is_err());
        assert!(RankingSource::parse("a:b:c:d").is_err());
    }

    #[test]
    fn ranking_source_rejects_non_identifiers() {
        let err = RankingSource::parse("views:views_num; DROP TABLE x").unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidIdentifier { ref value, .. } if value == "views_num; DROP TABLE x"),
            "expected InvalidIdentifier, got: {err:?}"
        );
    }

    #[test]
    fn default_catalog_settings_carry_both_ranking_sources() {
        let settings = CatalogSettings::default();
        let fields: Vec<&str> = settings
            .ranking_sources
            .iter()
            .map(|s| s.field.as_str())
            .collect();
        assert_eq!(
            fields,
            vec!["amasty_sorting_most_viewed", "amasty_sorting_bestsellers"]
        );
        assert!(settings.attribute_codes.iter().any(|c| c == "url_key"));
        assert!(!settings.use_native_url_keys);
    }
}

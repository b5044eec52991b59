//! Domain types, configuration, and the pure enrichment transforms shared by
//! the catalog indexing adapters.

use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod enrich;
pub mod inventory_fields;
pub mod records;
pub mod slug;
pub mod stock;

pub use app_config::{AppConfig, CatalogSettings, Environment, RankingSource};
pub use config::{load_app_config, load_app_config_from_env};
pub use enrich::{apply_ranking_values, apply_slug, enrich_attributes, merge_attributes};
pub use inventory_fields::{FieldType, InventoryFields};
pub use records::{product_ids, seed_batch, IndexedRecord, ProductId, RecordBatch};
pub use slug::{slugify, DefaultSlugGenerator, SlugGenerator};
pub use stock::{ConfiguredStockScope, StockLevel, StockScope};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("invalid SQL identifier {value:?} in {context}")]
    InvalidIdentifier { context: String, value: String },

    #[error("unknown stock item column: {0}")]
    UnknownInventoryColumn(String),
}

/// Failures raised while transforming a batch, independent of the database.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record lacks the field a transform reads from.
    #[error("product {product_id} has no `{field}` field")]
    MissingField { product_id: ProductId, field: String },

    #[error("slug generation failed for product {product_id}: {reason}")]
    Slug { product_id: ProductId, reason: String },
}

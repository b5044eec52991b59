//! Seams to the rest of the indexing pipeline.
//!
//! Both traits have database-backed implementations in this crate
//! ([`crate::EavAttributeLoader`], [`crate::UrlRewritePathAssigner`]); hosts
//! may supply their own.

use async_trait::async_trait;
use catidx_core::{ProductId, RecordBatch};

use crate::EnrichError;

/// Loads attribute values for a set of products in a store scope.
#[async_trait]
pub trait AttributeLoader: Send + Sync {
    /// Returns one record per product that has attribute data. Products with
    /// no data may be omitted.
    async fn load_attributes(
        &self,
        store_id: i64,
        ids: &[ProductId],
    ) -> Result<RecordBatch, EnrichError>;
}

/// Assigns storefront URL paths to an enriched batch.
#[async_trait]
pub trait UrlPathAssigner: Send + Sync {
    async fn add_url_path(
        &self,
        batch: RecordBatch,
        store_id: i64,
    ) -> Result<RecordBatch, EnrichError>;
}

//! Attribute, slug, and popularity enrichment of product documents.

use std::collections::HashMap;
use std::sync::Arc;

use catidx_core::{
    enrich_attributes, product_ids, CatalogSettings, ProductId, RankingSource, RecordBatch,
    SlugGenerator,
};
use sqlx::PgPool;

use crate::collaborators::{AttributeLoader, UrlPathAssigner};
use crate::ranking::fetch_ranking_values;
use crate::EnrichError;

/// Enriches a batch with attribute values, a slug, ranking counters, and
/// finally URL paths.
///
/// Holds no per-call state; one instance can serve every batch.
#[derive(Clone)]
pub struct AttributeData {
    pool: PgPool,
    settings: CatalogSettings,
    loader: Arc<dyn AttributeLoader>,
    slug_generator: Arc<dyn SlugGenerator>,
    url_paths: Arc<dyn UrlPathAssigner>,
}

impl std::fmt::Debug for AttributeData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeData")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AttributeData {
    #[must_use]
    pub fn new(
        pool: PgPool,
        settings: CatalogSettings,
        loader: Arc<dyn AttributeLoader>,
        slug_generator: Arc<dyn SlugGenerator>,
        url_paths: Arc<dyn UrlPathAssigner>,
    ) -> Self {
        Self {
            pool,
            settings,
            loader,
            slug_generator,
            url_paths,
        }
    }

    /// Enrich every record in `batch` for the given store.
    ///
    /// Every product in the input comes back exactly once; nothing is
    /// returned if any step fails.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Core`] if a slug cannot be produced, or
    /// [`EnrichError::Db`] if any read fails. Collaborator errors are
    /// passed through unchanged.
    pub async fn enrich(
        &self,
        batch: RecordBatch,
        store_id: i64,
    ) -> Result<RecordBatch, EnrichError> {
        if batch.is_empty() {
            return Ok(batch);
        }
        let ids = product_ids(&batch);

        let attributes = self.loader.load_attributes(store_id, &ids).await?;
        tracing::debug!(
            store_id,
            requested = ids.len(),
            loaded = attributes.len(),
            "loaded product attributes"
        );

        let mut rankings: Vec<(&RankingSource, HashMap<ProductId, i64>)> =
            Vec::with_capacity(self.settings.ranking_sources.len());
        for source in &self.settings.ranking_sources {
            let values = fetch_ranking_values(&self.pool, source, &ids, store_id).await?;
            rankings.push((source, values));
        }

        let batch = enrich_attributes(
            batch,
            attributes,
            &rankings,
            &self.settings,
            self.slug_generator.as_ref(),
        )?;

        let batch = self.url_paths.add_url_path(batch, store_id).await?;

        tracing::info!(store_id, products = batch.len(), "enriched product attributes");
        Ok(batch)
    }
}

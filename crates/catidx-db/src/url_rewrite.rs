use std::collections::HashMap;

use async_trait::async_trait;
use catidx_core::{product_ids, RecordBatch};
use serde_json::Value;
use sqlx::PgPool;

use crate::collaborators::UrlPathAssigner;
use crate::EnrichError;

pub const URL_PATH_FIELD: &str = "url_path";

/// Sets `url_path` from the product's canonical rewrite in the store, i.e.
/// the product rewrite with no category metadata.
#[derive(Debug, Clone)]
pub struct UrlRewritePathAssigner {
    pool: PgPool,
    suffix: String,
}

impl UrlRewritePathAssigner {
    #[must_use]
    pub fn new(pool: PgPool, suffix: impl Into<String>) -> Self {
        Self {
            pool,
            suffix: suffix.into(),
        }
    }
}

#[async_trait]
impl UrlPathAssigner for UrlRewritePathAssigner {
    async fn add_url_path(
        &self,
        mut batch: RecordBatch,
        store_id: i64,
    ) -> Result<RecordBatch, EnrichError> {
        if batch.is_empty() {
            return Ok(batch);
        }
        let ids = product_ids(&batch);

        let rows = sqlx::query_as::<_, (i64, String)>(
            "SELECT entity_id::bigint AS entity_id, request_path \
             FROM url_rewrite \
             WHERE entity_type = 'product' \
               AND metadata IS NULL \
               AND store_id = $2 \
               AND entity_id = ANY($1) \
             ORDER BY entity_id, url_rewrite_id",
        )
        .bind(&ids)
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        let mut paths: HashMap<i64, String> = HashMap::with_capacity(rows.len());
        for (id, request_path) in rows {
            paths.entry(id).or_insert(request_path);
        }

        tracing::debug!(
            store_id,
            requested = ids.len(),
            found = paths.len(),
            "loaded product url rewrites"
        );

        for (id, record) in &mut batch {
            if let Some(path) = paths.get(id) {
                record.insert(
                    URL_PATH_FIELD.to_string(),
                    Value::String(strip_url_suffix(path, &self.suffix).to_string()),
                );
            }
        }

        Ok(batch)
    }
}

/// Remove `suffix` from the end of `path` when present.
#[must_use]
pub fn strip_url_suffix<'a>(path: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return path;
    }
    path.strip_suffix(suffix).unwrap_or(path)
}

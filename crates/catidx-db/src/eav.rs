//! Attribute loading from the typed EAV value tables.

use async_trait::async_trait;
use catidx_core::{IndexedRecord, ProductId, RecordBatch};
use serde_json::Value;
use sqlx::{types::Json, PgPool};

use crate::collaborators::AttributeLoader;
use crate::EnrichError;

/// Store id holding the default (admin) values that store views override.
pub const DEFAULT_STORE_ID: i64 = 0;

/// Value tables, one per attribute backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EavBackend {
    Varchar,
    Int,
    Decimal,
    Text,
    Datetime,
}

impl EavBackend {
    pub const ALL: [EavBackend; 5] = [
        EavBackend::Varchar,
        EavBackend::Int,
        EavBackend::Decimal,
        EavBackend::Text,
        EavBackend::Datetime,
    ];

    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            EavBackend::Varchar => "catalog_product_entity_varchar",
            EavBackend::Int => "catalog_product_entity_int",
            EavBackend::Decimal => "catalog_product_entity_decimal",
            EavBackend::Text => "catalog_product_entity_text",
            EavBackend::Datetime => "catalog_product_entity_datetime",
        }
    }

    /// SELECT for this backend. Rows come back default store first so that
    /// store-view values overwrite defaults when folded in order.
    #[must_use]
    pub fn select(self) -> String {
        format!(
            "SELECT v.entity_id::bigint AS entity_id, a.attribute_code, \
                    to_jsonb(v.value) AS value \
             FROM {table} v \
             JOIN eav_attribute a ON a.attribute_id = v.attribute_id \
             WHERE v.entity_id = ANY($1) \
               AND v.store_id IN ($2, $3) \
               AND a.attribute_code = ANY($4) \
             ORDER BY v.entity_id, (v.store_id <> $2), a.attribute_code",
            table = self.table()
        )
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct EavValueRow {
    entity_id: i64,
    attribute_code: String,
    value: Json<Value>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct EntityRow {
    entity_id: i64,
    sku: Option<String>,
    type_id: Option<String>,
}

/// Loads a configured set of attribute codes for products in a store,
/// falling back to default-store values.
#[derive(Debug, Clone)]
pub struct EavAttributeLoader {
    pool: PgPool,
    attribute_codes: Vec<String>,
}

impl EavAttributeLoader {
    #[must_use]
    pub fn new(pool: PgPool, attribute_codes: Vec<String>) -> Self {
        Self {
            pool,
            attribute_codes,
        }
    }
}

#[async_trait]
impl AttributeLoader for EavAttributeLoader {
    async fn load_attributes(
        &self,
        store_id: i64,
        ids: &[ProductId],
    ) -> Result<RecordBatch, EnrichError> {
        let mut batch = RecordBatch::new();
        if ids.is_empty() {
            return Ok(batch);
        }

        let entities = sqlx::query_as::<_, EntityRow>(
            "SELECT entity_id::bigint AS entity_id, sku, type_id \
             FROM catalog_product_entity \
             WHERE entity_id = ANY($1) \
             ORDER BY entity_id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        for entity in entities {
            let record = batch.entry(entity.entity_id).or_default();
            record.insert("sku".to_string(), entity.sku.map_or(Value::Null, Value::String));
            record.insert(
                "type_id".to_string(),
                entity.type_id.map_or(Value::Null, Value::String),
            );
        }

        for backend in EavBackend::ALL {
            let rows = sqlx::query_as::<_, EavValueRow>(&backend.select())
                .bind(ids)
                .bind(DEFAULT_STORE_ID)
                .bind(store_id)
                .bind(&self.attribute_codes)
                .fetch_all(&self.pool)
                .await?;

            tracing::debug!(
                table = backend.table(),
                store_id,
                rows = rows.len(),
                "loaded attribute values"
            );

            fold_values(&mut batch, rows.into_iter().map(|row| {
                (row.entity_id, row.attribute_code, row.value.0)
            }));
        }

        Ok(batch)
    }
}

/// Fold `(entity_id, code, value)` triples into the batch in order, later
/// triples overwriting earlier ones.
fn fold_values(batch: &mut RecordBatch, values: impl Iterator<Item = (ProductId, String, Value)>) {
    for (id, code, value) in values {
        batch
            .entry(id)
            .or_insert_with(IndexedRecord::new)
            .insert(code, value);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn every_backend_has_a_distinct_table() {
        let mut tables: Vec<&str> = EavBackend::ALL.iter().map(|b| b.table()).collect();
        tables.sort_unstable();
        tables.dedup();
        assert_eq!(tables.len(), EavBackend::ALL.len());
    }

    #[test]
    fn select_orders_default_store_first() {
        let sql = EavBackend::Varchar.select();
        assert!(sql.contains("FROM catalog_product_entity_varchar v"));
        assert!(sql.contains("ORDER BY v.entity_id, (v.store_id <> $2)"));
    }

    #[test]
    fn store_values_override_defaults_when_folded_in_order() {
        let mut batch = RecordBatch::new();
        fold_values(
            &mut batch,
            vec![
                (1, "name".to_string(), json!("Default Name")),
                (1, "name".to_string(), json!("Store Name")),
                (2, "status".to_string(), json!(1)),
            ]
            .into_iter(),
        );

        assert_eq!(batch[&1]["name"], json!("Store Name"));
        assert_eq!(batch[&2]["status"], json!(1));
    }
}

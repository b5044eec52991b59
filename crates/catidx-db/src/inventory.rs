//! Inventory documents: stock items adjusted by pending reservations.

use catidx_core::inventory_fields::{field_type, selectable_columns, STOCK_STATUS_FIELD};
use catidx_core::{
    IndexedRecord, InventoryFields, ProductId, RecordBatch, StockLevel, StockScope,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use sqlx::{types::Json, PgPool};

use crate::EnrichError;

/// One grouped `(product_id, item_id, stock_id)` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StockItemRow {
    pub product_id: i64,
    pub stock_id: i64,
    pub item_id: i64,
    pub base_qty: Option<Decimal>,
    pub base_is_in_stock: Option<i32>,
    /// Website stock status; `NULL` when no status row exists for the scope.
    pub stock_status: Option<i32>,
    /// Sum of reservation quantities; `NULL` when there are no reservations.
    pub reservation_qty: Option<Decimal>,
    /// The caller-requested stock-item columns, read verbatim.
    pub columns: Json<Map<String, Value>>,
}

impl StockItemRow {
    /// Resolve the effective stock and build the indexed document.
    #[must_use]
    pub fn into_record(self) -> IndexedRecord {
        let level = StockLevel::resolve(
            self.base_qty,
            self.base_is_in_stock.is_some_and(|flag| flag != 0),
            self.reservation_qty,
        );

        let mut record: IndexedRecord = self
            .columns
            .0
            .into_iter()
            .map(|(column, value)| {
                let value = match field_type(&column) {
                    Some(ty) => ty.cast(value),
                    None => value,
                };
                (column, value)
            })
            .collect();

        record.insert(
            STOCK_STATUS_FIELD.to_string(),
            self.stock_status.map_or(Value::Null, Value::from),
        );
        record.insert(
            "qty".to_string(),
            level
                .qty
                .and_then(|q| q.to_f64())
                .map_or(Value::Null, Value::from),
        );
        record.insert("is_in_stock".to_string(), Value::Bool(level.is_in_stock));
        record
    }
}

/// Build the grouped stock-item SELECT for the given verbatim columns.
///
/// Columns must already be validated against the stock-item schema (see
/// [`InventoryFields::new`]); they are spliced into the statement.
/// `$1` binds the product ids and `$2` the website scope.
#[must_use]
pub fn build_inventory_select(columns: &[&str]) -> String {
    let columns_expr = if columns.is_empty() {
        "'{}'::jsonb".to_string()
    } else {
        let pairs: Vec<String> = columns
            .iter()
            .map(|c| format!("'{c}', main_table.{c}"))
            .collect();
        format!("jsonb_build_object({})", pairs.join(", "))
    };

    format!(
        "SELECT main_table.product_id::bigint AS product_id, \
                main_table.stock_id::bigint AS stock_id, \
                main_table.item_id::bigint AS item_id, \
                main_table.qty::numeric AS base_qty, \
                main_table.is_in_stock::int4 AS base_is_in_stock, \
                status_table.stock_status::int4 AS stock_status, \
                SUM(reservation_table.quantity)::numeric AS reservation_qty, \
                {columns_expr} AS columns \
         FROM cataloginventory_stock_item AS main_table \
         LEFT JOIN cataloginventory_stock_status AS status_table \
                ON main_table.product_id = status_table.product_id \
               AND main_table.stock_id = status_table.stock_id \
               AND status_table.website_id = $2 \
         LEFT JOIN catalog_product_entity AS product_table \
                ON main_table.product_id = product_table.entity_id \
         LEFT JOIN inventory_reservation AS reservation_table \
                ON reservation_table.sku = product_table.sku \
               AND main_table.stock_id = reservation_table.stock_id \
         WHERE main_table.product_id = ANY($1) \
         GROUP BY main_table.product_id, main_table.item_id, main_table.stock_id, \
                  status_table.stock_status \
         ORDER BY main_table.product_id, main_table.stock_id, main_table.item_id"
    )
}

/// Loads inventory documents for parent products and child variants.
#[derive(Debug, Clone)]
pub struct Inventory<S> {
    pool: PgPool,
    fields: InventoryFields,
    scope: S,
}

impl<S: StockScope> Inventory<S> {
    #[must_use]
    pub fn new(pool: PgPool, fields: InventoryFields, scope: S) -> Self {
        Self {
            pool,
            fields,
            scope,
        }
    }

    /// Inventory for parent products, using the required column set.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Db`] if the query fails.
    pub async fn load_inventory(&self, ids: &[ProductId]) -> Result<RecordBatch, EnrichError> {
        self.load(ids, self.fields.required_columns()).await
    }

    /// Inventory for child variants, using the child column set.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Db`] if the query fails.
    pub async fn load_children_inventory(
        &self,
        ids: &[ProductId],
    ) -> Result<RecordBatch, EnrichError> {
        self.load(ids, self.fields.child_required_columns()).await
    }

    async fn load(&self, ids: &[ProductId], columns: &[String]) -> Result<RecordBatch, EnrichError> {
        if ids.is_empty() {
            return Ok(RecordBatch::new());
        }
        let website_id = self.scope.default_scope_id();
        let sql = build_inventory_select(&selectable_columns(columns));

        let rows = sqlx::query_as::<_, StockItemRow>(&sql)
            .bind(ids)
            .bind(website_id)
            .fetch_all(&self.pool)
            .await?;

        let row_count = rows.len();
        let batch = collect_by_product(rows);

        tracing::info!(
            website_id,
            requested = ids.len(),
            rows = row_count,
            products = batch.len(),
            "loaded inventory"
        );

        Ok(batch)
    }
}

/// Key rows by product id. A later stock row for the same product replaces
/// the earlier one.
#[must_use]
pub fn collect_by_product(rows: Vec<StockItemRow>) -> RecordBatch {
    let mut batch = RecordBatch::new();
    for row in rows {
        let product_id = row.product_id;
        let stock_id = row.stock_id;
        if batch.insert(product_id, row.into_record()).is_some() {
            tracing::warn!(
                product_id,
                stock_id,
                "multiple stock rows for product; keeping the last"
            );
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(base_qty: i64, reservation_qty: Option<i64>) -> StockItemRow {
        StockItemRow {
            product_id: 7,
            stock_id: 1,
            item_id: 70,
            base_qty: Some(Decimal::from(base_qty)),
            base_is_in_stock: Some(1),
            stock_status: Some(1),
            reservation_qty: reservation_qty.map(Decimal::from),
            columns: Json(
                json!({"product_id": 7, "manage_stock": 1, "min_sale_qty": "1.0000"})
                    .as_object()
                    .cloned()
                    .unwrap_or_default(),
            ),
        }
    }

    #[test]
    fn select_builds_columns_object_and_join_plan() {
        let sql = build_inventory_select(&["product_id", "manage_stock"]);
        assert!(sql.contains(
            "jsonb_build_object('product_id', main_table.product_id, \
             'manage_stock', main_table.manage_stock)"
        ));
        assert!(sql.contains("status_table.website_id = $2"));
        assert!(sql.contains("reservation_table.sku = product_table.sku"));
        assert!(sql.contains("GROUP BY main_table.product_id, main_table.item_id, main_table.stock_id"));
    }

    #[test]
    fn select_with_no_columns_builds_empty_object() {
        let sql = build_inventory_select(&[]);
        assert!(sql.contains("'{}'::jsonb AS columns"));
    }

    #[test]
    fn record_applies_reservations() {
        let record = row(10, Some(-3)).into_record();
        assert_eq!(record["qty"], json!(7.0));
        assert_eq!(record["is_in_stock"], json!(true));
    }

    #[test]
    fn record_without_reservations_keeps_base_qty() {
        let record = row(10, None).into_record();
        assert_eq!(record["qty"], json!(10.0));
        assert_eq!(record["is_in_stock"], json!(true));
    }

    #[test]
    fn record_out_of_stock_when_reservations_drain_quantity() {
        let record = row(3, Some(-3)).into_record();
        assert_eq!(record["qty"], json!(0.0));
        assert_eq!(record["is_in_stock"], json!(false));
    }

    #[test]
    fn record_casts_requested_columns() {
        let record = row(1, None).into_record();
        assert_eq!(record["product_id"], json!(7));
        assert_eq!(record["manage_stock"], json!(true));
        assert_eq!(record["min_sale_qty"], json!(1.0));
        assert_eq!(record["stock_status"], json!(1));
    }

    #[test]
    fn missing_status_row_reads_as_null() {
        let mut r = row(1, None);
        r.stock_status = None;
        assert_eq!(r.into_record()["stock_status"], Value::Null);
    }

    #[test]
    fn collect_by_product_keeps_last_stock_row() {
        let first = row(5, None);
        let mut second = row(2, None);
        second.stock_id = 2;
        second.item_id = 71;

        let batch = collect_by_product(vec![first, second]);

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[&7]["qty"], json!(2.0));
    }
}

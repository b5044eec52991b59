//! Reads from the auxiliary popularity tables (most viewed, bestsellers, ...).

use std::collections::HashMap;

use catidx_core::{ProductId, RankingSource};
use sqlx::PgPool;

use crate::DbError;

/// Build the per-source SELECT. `table` and `metric_column` were validated
/// as plain identifiers when the [`RankingSource`] was parsed.
///
/// Values are truncated toward zero and missing values read as 0. Several
/// rows for one product and store collapse to their largest value.
#[must_use]
pub fn build_ranking_select(source: &RankingSource) -> String {
    format!(
        "SELECT main_table.product_id::bigint AS product_id, \
                COALESCE(TRUNC(MAX(main_table.{column})::numeric), 0)::bigint AS value \
         FROM {table} AS main_table \
         WHERE main_table.product_id = ANY($1) \
           AND main_table.store_id = $2 \
         GROUP BY main_table.product_id \
         ORDER BY main_table.product_id",
        table = source.table,
        column = source.metric_column,
    )
}

/// Fetch `product_id -> value` for one ranking source, restricted to the
/// given products and store, one value per product.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fetch_ranking_values(
    pool: &PgPool,
    source: &RankingSource,
    ids: &[ProductId],
    store_id: i64,
) -> Result<HashMap<ProductId, i64>, DbError> {
    let rows = sqlx::query_as::<_, (i64, i64)>(&build_ranking_select(source))
        .bind(ids)
        .bind(store_id)
        .fetch_all(pool)
        .await?;

    tracing::debug!(
        table = %source.table,
        store_id,
        requested = ids.len(),
        found = rows.len(),
        "loaded ranking values"
    );

    Ok(rows.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_interpolates_table_and_column() {
        let source = RankingSource::parse("amasty_sorting_bestsellers:qty_ordered").unwrap();
        let sql = build_ranking_select(&source);

        assert!(sql.contains("FROM amasty_sorting_bestsellers AS main_table"));
        assert!(sql.contains("TRUNC(MAX(main_table.qty_ordered)::numeric)"));
        assert!(sql.contains("main_table.product_id = ANY($1)"));
        assert!(sql.contains("main_table.store_id = $2"));
    }

    #[test]
    fn select_collapses_duplicate_rows_per_product() {
        let source = RankingSource::parse("amasty_sorting_most_viewed:views_num").unwrap();
        let sql = build_ranking_select(&source);

        assert!(sql.contains("GROUP BY main_table.product_id"));
        assert!(sql.contains("MAX(main_table.views_num)"));
    }
}

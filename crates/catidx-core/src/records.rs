use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Catalog entity id of a product.
pub type ProductId = i64;

/// A partial search document: field name to value.
pub type IndexedRecord = Map<String, Value>;

/// A batch of documents being enriched, keyed by product id.
///
/// Ordered so that queries and output are deterministic for a given batch.
pub type RecordBatch = BTreeMap<ProductId, IndexedRecord>;

/// Returns the ids of a batch in ascending order.
#[must_use]
pub fn product_ids(batch: &RecordBatch) -> Vec<ProductId> {
    batch.keys().copied().collect()
}

/// Builds a batch of seed records carrying only their `id` field.
#[must_use]
pub fn seed_batch(ids: &[ProductId]) -> RecordBatch {
    ids.iter()
        .map(|&id| {
            let mut record = IndexedRecord::new();
            record.insert("id".to_string(), Value::from(id));
            (id, record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_ids_are_sorted() {
        let batch = seed_batch(&[30, 10, 20]);
        assert_eq!(product_ids(&batch), vec![10, 20, 30]);
    }

    #[test]
    fn seed_batch_dedupes_ids() {
        let batch = seed_batch(&[5, 5, 7]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[&5]["id"], Value::from(5));
    }
}

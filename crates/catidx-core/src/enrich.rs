//! Pure transforms applied by the attribute provider once its reads are done.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use crate::app_config::{CatalogSettings, RankingSource};
use crate::records::{IndexedRecord, ProductId, RecordBatch};
use crate::slug::SlugGenerator;
use crate::CoreError;

pub const SLUG_FIELD: &str = "slug";
pub const URL_KEY_FIELD: &str = "url_key";
pub const NAME_FIELD: &str = "name";

/// Merge loaded attribute rows into the batch. Attribute values win on key
/// collision. Rows for ids outside the batch are ignored.
pub fn merge_attributes(batch: &mut RecordBatch, attributes: RecordBatch) {
    for (id, attrs) in attributes {
        if let Some(record) = batch.get_mut(&id) {
            record.extend(attrs);
        }
    }
}

/// Set `slug` on a record and, when generating, overwrite `url_key` with it.
///
/// # Errors
///
/// Returns [`CoreError::MissingField`] when the source field is absent (or not
/// a string while generating), or the generator's error.
pub fn apply_slug(
    record: &mut IndexedRecord,
    id: ProductId,
    settings: &CatalogSettings,
    generator: &dyn SlugGenerator,
) -> Result<(), CoreError> {
    if settings.use_native_url_keys {
        let url_key = record
            .get(URL_KEY_FIELD)
            .cloned()
            .ok_or_else(|| missing(id, URL_KEY_FIELD))?;
        record.insert(SLUG_FIELD.to_string(), url_key);
        return Ok(());
    }

    let source = if settings.slug_from_url_key {
        URL_KEY_FIELD
    } else {
        NAME_FIELD
    };
    let text = record
        .get(source)
        .and_then(Value::as_str)
        .ok_or_else(|| missing(id, source))?;

    let slug = generator.generate(text, id)?;
    record.insert(URL_KEY_FIELD.to_string(), Value::String(slug.clone()));
    record.insert(SLUG_FIELD.to_string(), Value::String(slug));
    Ok(())
}

/// Write a ranking counter onto every record in the batch, defaulting to 0.
pub fn apply_ranking_values(
    batch: &mut RecordBatch,
    field: &str,
    values: &HashMap<ProductId, i64>,
) {
    for (id, record) in batch.iter_mut() {
        let value = values.get(id).copied().unwrap_or(0);
        record.insert(field.to_string(), Value::from(value));
    }
}

/// Run attribute merge, slug generation, and ranking defaults over a batch.
///
/// Only records that received attribute rows are slugged. A record with no
/// attribute data (e.g. a product deleted after it was queued) passes
/// through with its ranking fields and nothing else.
///
/// `rankings` pairs each configured source with the values fetched for it.
/// Sources are applied in order, so a later source writing the same field
/// wins.
///
/// # Errors
///
/// Returns the first [`CoreError`] raised while slugging a record; the batch
/// is consumed and nothing partial is returned.
pub fn enrich_attributes(
    mut batch: RecordBatch,
    attributes: RecordBatch,
    rankings: &[(&RankingSource, HashMap<ProductId, i64>)],
    settings: &CatalogSettings,
    generator: &dyn SlugGenerator,
) -> Result<RecordBatch, CoreError> {
    let loaded: BTreeSet<ProductId> = attributes.keys().copied().collect();
    merge_attributes(&mut batch, attributes);

    for (id, record) in &mut batch {
        if loaded.contains(id) {
            apply_slug(record, *id, settings, generator)?;
        }
    }

    for (source, values) in rankings {
        apply_ranking_values(&mut batch, &source.field, values);
    }

    Ok(batch)
}

fn missing(id: ProductId, field: &str) -> CoreError {
    CoreError::MissingField {
        product_id: id,
        field: field.to_string(),
    }
}

#[cfg(test)]
#[path = "enrich_test.rs"]
mod tests;

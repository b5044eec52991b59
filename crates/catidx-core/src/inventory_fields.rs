//! Column requirements for inventory documents.
//!
//! The stock-item schema is fixed here so that requested columns can be
//! validated once at configuration time and then spliced into SQL safely.

use serde_json::{Number, Value};

use crate::ConfigError;

/// How a column's raw value is represented in the indexed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Text,
}

impl FieldType {
    /// Coerce a raw database value into this type. `null` is preserved;
    /// values that cannot be coerced become `null`.
    #[must_use]
    pub fn cast(self, value: Value) -> Value {
        match (self, value) {
            (_, Value::Null) => Value::Null,
            (FieldType::Bool, Value::Bool(b)) => Value::Bool(b),
            (FieldType::Bool, Value::Number(n)) => Value::Bool(n.as_f64().is_some_and(|f| f != 0.0)),
            (FieldType::Bool, Value::String(s)) => match s.trim() {
                "" | "0" | "false" => Value::Bool(false),
                _ => Value::Bool(true),
            },
            (FieldType::Int, Value::Bool(b)) => Value::from(i64::from(b)),
            (FieldType::Int, Value::Number(n)) => int_value(&n),
            (FieldType::Int, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map_or(Value::Null, |n| int_value(&n)),
            (FieldType::Float, Value::Bool(b)) => Value::from(f64::from(u8::from(b))),
            (FieldType::Float, Value::Number(n)) => float_value(n.as_f64()),
            (FieldType::Float, Value::String(s)) => float_value(s.trim().parse::<f64>().ok()),
            (FieldType::Text, Value::String(s)) => Value::String(s),
            (FieldType::Text, other) => Value::String(other.to_string()),
            (_, Value::Array(_) | Value::Object(_)) => Value::Null,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn int_value(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::from(i)
    } else {
        n.as_f64()
            .map_or(Value::Null, |f| Value::from(f.trunc() as i64))
    }
}

fn float_value(f: Option<f64>) -> Value {
    f.and_then(Number::from_f64).map_or(Value::Null, Value::Number)
}

/// Columns computed from reservations instead of being read verbatim.
pub const COMPUTED_COLUMNS: [&str; 2] = ["qty", "is_in_stock"];

/// Field carrying the website stock status joined onto each row.
pub const STOCK_STATUS_FIELD: &str = "stock_status";

const STOCK_ITEM_SCHEMA: &[(&str, FieldType)] = &[
    ("item_id", FieldType::Int),
    ("product_id", FieldType::Int),
    ("stock_id", FieldType::Int),
    ("qty", FieldType::Float),
    ("min_qty", FieldType::Float),
    ("use_config_min_qty", FieldType::Bool),
    ("is_qty_decimal", FieldType::Bool),
    ("backorders", FieldType::Int),
    ("use_config_backorders", FieldType::Bool),
    ("min_sale_qty", FieldType::Float),
    ("use_config_min_sale_qty", FieldType::Bool),
    ("max_sale_qty", FieldType::Float),
    ("use_config_max_sale_qty", FieldType::Bool),
    ("is_in_stock", FieldType::Bool),
    ("low_stock_date", FieldType::Text),
    ("notify_stock_qty", FieldType::Float),
    ("use_config_notify_stock_qty", FieldType::Bool),
    ("manage_stock", FieldType::Bool),
    ("use_config_manage_stock", FieldType::Bool),
    ("stock_status_changed_auto", FieldType::Bool),
    ("use_config_qty_increments", FieldType::Bool),
    ("qty_increments", FieldType::Float),
    ("use_config_enable_qty_inc", FieldType::Bool),
    ("enable_qty_increments", FieldType::Bool),
    ("is_decimal_divided", FieldType::Bool),
    ("website_id", FieldType::Int),
];

const DEFAULT_CHILD_COLUMNS: &[&str] = &[
    "product_id",
    "stock_id",
    "qty",
    "is_in_stock",
    "min_sale_qty",
    "max_sale_qty",
    "use_config_min_sale_qty",
    "use_config_max_sale_qty",
    "manage_stock",
    "use_config_manage_stock",
    "backorders",
    "use_config_backorders",
];

/// Type of a stock-item column or of the joined `stock_status` field.
#[must_use]
pub fn field_type(column: &str) -> Option<FieldType> {
    if column == STOCK_STATUS_FIELD {
        return Some(FieldType::Int);
    }
    STOCK_ITEM_SCHEMA
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, ty)| *ty)
}

/// Columns requested for parent products and for their child variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryFields {
    required: Vec<String>,
    child_required: Vec<String>,
}

impl Default for InventoryFields {
    fn default() -> Self {
        Self {
            required: STOCK_ITEM_SCHEMA
                .iter()
                .map(|(name, _)| (*name).to_string())
                .filter(|name| name != "website_id")
                .collect(),
            child_required: DEFAULT_CHILD_COLUMNS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
        }
    }
}

impl InventoryFields {
    /// Build a column set, rejecting any column outside the stock-item schema.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownInventoryColumn`] for the first column
    /// that is not a known stock-item column.
    pub fn new(required: Vec<String>, child_required: Vec<String>) -> Result<Self, ConfigError> {
        for column in required.iter().chain(&child_required) {
            if field_type(column).is_none() || column == STOCK_STATUS_FIELD {
                return Err(ConfigError::UnknownInventoryColumn(column.clone()));
            }
        }
        Ok(Self {
            required,
            child_required,
        })
    }

    #[must_use]
    pub fn required_columns(&self) -> &[String] {
        &self.required
    }

    #[must_use]
    pub fn child_required_columns(&self) -> &[String] {
        &self.child_required
    }
}

/// The columns to read verbatim: `columns` minus [`COMPUTED_COLUMNS`],
/// deduplicated, in request order.
#[must_use]
pub fn selectable_columns(columns: &[String]) -> Vec<&str> {
    let mut selected: Vec<&str> = Vec::with_capacity(columns.len());
    for column in columns {
        let column = column.as_str();
        if COMPUTED_COLUMNS.contains(&column) || selected.contains(&column) {
            continue;
        }
        selected.push(column);
    }
    selected
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn selectable_columns_drop_computed_fields() {
        let columns = strings(&["product_id", "qty", "min_sale_qty", "is_in_stock"]);
        assert_eq!(selectable_columns(&columns), vec!["product_id", "min_sale_qty"]);
    }

    #[test]
    fn selectable_columns_dedupe_in_order() {
        let columns = strings(&["stock_id", "product_id", "stock_id"]);
        assert_eq!(selectable_columns(&columns), vec!["stock_id", "product_id"]);
    }

    #[test]
    fn new_rejects_unknown_column() {
        let err = InventoryFields::new(strings(&["product_id", "qty; DROP TABLE x"]), vec![])
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::UnknownInventoryColumn(ref c) if c == "qty; DROP TABLE x"),
            "expected UnknownInventoryColumn, got: {err:?}"
        );
    }

    #[test]
    fn new_rejects_stock_status_as_item_column() {
        let err = InventoryFields::new(vec![], strings(&["stock_status"])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownInventoryColumn(_)));
    }

    #[test]
    fn default_fields_are_valid_and_include_computed_columns() {
        let fields = InventoryFields::default();
        let rebuilt = InventoryFields::new(
            fields.required_columns().to_vec(),
            fields.child_required_columns().to_vec(),
        )
        .unwrap();
        assert_eq!(rebuilt, fields);
        assert!(fields.required_columns().iter().any(|c| c == "qty"));
        assert!(fields.child_required_columns().iter().any(|c| c == "is_in_stock"));
        assert!(!fields.required_columns().iter().any(|c| c == "website_id"));
    }

    #[test]
    fn field_type_covers_stock_status() {
        assert_eq!(field_type("stock_status"), Some(FieldType::Int));
        assert_eq!(field_type("manage_stock"), Some(FieldType::Bool));
        assert_eq!(field_type("nope"), None);
    }

    #[test]
    fn cast_bool_from_database_flags() {
        assert_eq!(FieldType::Bool.cast(json!(1)), json!(true));
        assert_eq!(FieldType::Bool.cast(json!(0)), json!(false));
        assert_eq!(FieldType::Bool.cast(json!("1")), json!(true));
        assert_eq!(FieldType::Bool.cast(Value::Null), Value::Null);
    }

    #[test]
    fn cast_int_truncates_decimals() {
        assert_eq!(FieldType::Int.cast(json!(3.9)), json!(3));
        assert_eq!(FieldType::Int.cast(json!("12")), json!(12));
        assert_eq!(FieldType::Int.cast(json!("abc")), Value::Null);
    }

    #[test]
    fn cast_float_and_text() {
        assert_eq!(FieldType::Float.cast(json!(2)), json!(2.0));
        assert_eq!(FieldType::Float.cast(json!("1.5")), json!(1.5));
        assert_eq!(FieldType::Text.cast(json!("2026-01-01")), json!("2026-01-01"));
        assert_eq!(FieldType::Text.cast(json!(5)), json!("5"));
    }
}

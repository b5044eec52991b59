use rust_decimal::Decimal;

/// Resolves the website scope that stock-status rows are read under.
pub trait StockScope: Send + Sync {
    fn default_scope_id(&self) -> i64;
}

/// A fixed website scope taken from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfiguredStockScope {
    pub website_id: i64,
}

impl StockScope for ConfiguredStockScope {
    fn default_scope_id(&self) -> i64 {
        self.website_id
    }
}

/// Effective stock of one product/stock row after pending reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevel {
    /// `None` when the stock item itself has no quantity.
    pub qty: Option<Decimal>,
    pub is_in_stock: bool,
}

impl StockLevel {
    /// Combine a stock item with the sum of its reservations.
    ///
    /// `reservation_qty` is `None` when the product has no reservation rows
    /// in the stock at all. Reservations are negative while an order is
    /// pending, so they only ever lower the quantity until compensated.
    ///
    /// The base flag survives when the resulting quantity is positive or
    /// when there are no reservations; otherwise the row is out of stock.
    /// A quantity of exactly zero with no reservations keeps the base flag.
    #[must_use]
    pub fn resolve(
        base_qty: Option<Decimal>,
        base_is_in_stock: bool,
        reservation_qty: Option<Decimal>,
    ) -> Self {
        let qty = base_qty.map(|base| base + reservation_qty.unwrap_or(Decimal::ZERO));
        let positive = qty.is_some_and(|q| q > Decimal::ZERO);
        let is_in_stock = if positive || reservation_qty.is_none() {
            base_is_in_stock
        } else {
            false
        };
        Self { qty, is_in_stock }
    }
}

//! Filters, sort orders and pagination for list endpoints.
//!
//! Query-string values arrive as optional strings. Empty strings mean "not
//! given", unknown sort keys fall back to insertion order, and malformed
//! numbers are rejected rather than silently ignored.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while reading list parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    /// A numeric parameter did not parse.
    #[error("{param} must be a number")]
    NotANumber {
        /// Query parameter name.
        param: &'static str,
    },
    /// A page or page size below one.
    #[error("{param} must be at least 1")]
    BelowOne {
        /// Query parameter name.
        param: &'static str,
    },
}

/// 1-indexed page selection.
///
/// The selected window is `[(page - 1) * per_page, page * per_page)` of the
/// filtered, sorted result. Pages past the end are empty, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    per_page: u32,
}

impl Pagination {
    /// Page used when `pagina` is absent.
    pub const DEFAULT_PAGE: u32 = 1;
    /// Page size used when `itens_por_pagina` is absent.
    pub const DEFAULT_PER_PAGE: u32 = 10;

    /// Read pagination from the raw `pagina` and `itens_por_pagina` values.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError`] if either value is not an integer or is below one.
    pub fn from_params(page: Option<&str>, per_page: Option<&str>) -> Result<Self, ListingError> {
        Ok(Self {
            page: positive_param("pagina", page)?.unwrap_or(Self::DEFAULT_PAGE),
            per_page: positive_param("itens_por_pagina", per_page)?
                .unwrap_or(Self::DEFAULT_PER_PAGE),
        })
    }

    /// The requested page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The requested page size.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// SQL `OFFSET` for this page, saturating at `i64::MAX` so a page far
    /// past the end is simply empty.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1).saturating_mul(i64::from(self.per_page))
    }

    /// SQL `LIMIT` for this page.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

/// Catalog ordering (`ordenar_por`). Always ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    /// Insertion order.
    #[default]
    Id,
    /// `ordenar_por=estoque`
    Stock,
    /// `ordenar_por=preco`
    Price,
}

impl ProductSort {
    /// Read `ordenar_por`; anything unrecognised keeps insertion order.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("estoque") => Self::Stock,
            Some("preco") => Self::Price,
            _ => Self::Id,
        }
    }
}

/// Catalog filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name.
    pub name: Option<String>,
    /// Inclusive maximum unit price.
    pub max_price: Option<Decimal>,
}

impl ProductFilter {
    /// Read `nome` and `preco_max`.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::NotANumber`] if `preco_max` is not a decimal.
    pub fn from_params(name: Option<&str>, max_price: Option<&str>) -> Result<Self, ListingError> {
        let max_price = non_empty(max_price)
            .map(|raw| {
                Decimal::from_str(raw)
                    .or_else(|_| Decimal::from_scientific(raw))
                    .map_err(|_| ListingError::NotANumber { param: "preco_max" })
            })
            .transpose()?;

        Ok(Self {
            name: non_empty(name).map(str::to_owned),
            max_price,
        })
    }
}

/// Purchase-history ordering (`ordenar_por`). Always ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionSort {
    /// Insertion order.
    #[default]
    Id,
    /// `ordenar_por=data`
    Date,
    /// `ordenar_por=total`
    Total,
}

impl TransactionSort {
    /// Read `ordenar_por`; anything unrecognised keeps insertion order.
    #[must_use]
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("data") => Self::Date,
            Some("total") => Self::Total,
            _ => Self::Id,
        }
    }
}

/// Purchase-history filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Case-insensitive substring of the purchased product's name.
    pub product_name: Option<String>,
    /// Inclusive minimum quantity.
    pub min_quantity: Option<i32>,
}

impl TransactionFilter {
    /// Read `produto` and `quantidade_min`.
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::NotANumber`] if `quantidade_min` is not an integer.
    pub fn from_params(
        product_name: Option<&str>,
        min_quantity: Option<&str>,
    ) -> Result<Self, ListingError> {
        let min_quantity = non_empty(min_quantity)
            .map(|raw| {
                raw.parse::<i32>().map_err(|_| ListingError::NotANumber {
                    param: "quantidade_min",
                })
            })
            .transpose()?;

        Ok(Self {
            product_name: non_empty(product_name).map(str::to_owned),
            min_quantity,
        })
    }
}

/// Build an `ILIKE` pattern matching `needle` anywhere, escaping the
/// pattern metacharacters `\`, `%` and `_`.
#[must_use]
pub fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn positive_param(param: &'static str, value: Option<&str>) -> Result<Option<u32>, ListingError> {
    let Some(raw) = non_empty(value) else {
        return Ok(None);
    };
    let parsed: i64 = raw.parse().map_err(|_| ListingError::NotANumber { param })?;
    if parsed < 1 {
        return Err(ListingError::BelowOne { param });
    }
    u32::try_from(parsed)
        .map(Some)
        .map_err(|_| ListingError::NotANumber { param })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let page = Pagination::from_params(None, Some("")).unwrap();
        assert_eq!(page, Pagination::default());
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn test_pagination_window() {
        let page = Pagination::from_params(Some("2"), Some("1")).unwrap();
        assert_eq!(page.offset(), 1);
        assert_eq!(page.limit(), 1);

        let page = Pagination::from_params(Some("3"), Some("25")).unwrap();
        assert_eq!(page.offset(), 50);
        assert_eq!(page.limit(), 25);
    }

    #[test]
    fn test_pagination_far_page_is_just_a_large_offset() {
        let page = Pagination::from_params(Some("1000000"), Some("1000")).unwrap();
        assert_eq!(page.offset(), 999_999_000);
    }

    #[test]
    fn test_pagination_extreme_values_do_not_overflow() {
        let page = Pagination::from_params(Some("4294967295"), Some("4294967295")).unwrap();
        assert_eq!(page.offset(), i64::MAX);
        assert_eq!(page.limit(), 4_294_967_295);
    }

    #[test]
    fn test_pagination_rejects_zero_and_garbage() {
        assert_eq!(
            Pagination::from_params(Some("0"), None),
            Err(ListingError::BelowOne { param: "pagina" })
        );
        assert_eq!(
            Pagination::from_params(None, Some("-5")),
            Err(ListingError::BelowOne {
                param: "itens_por_pagina"
            })
        );
        assert_eq!(
            Pagination::from_params(Some("dois"), None),
            Err(ListingError::NotANumber { param: "pagina" })
        );
    }

    #[test]
    fn test_product_sort_from_param() {
        assert_eq!(ProductSort::from_param(Some("estoque")), ProductSort::Stock);
        assert_eq!(ProductSort::from_param(Some("preco")), ProductSort::Price);
        assert_eq!(ProductSort::from_param(Some("-preco")), ProductSort::Id);
        assert_eq!(ProductSort::from_param(None), ProductSort::Id);
    }

    #[test]
    fn test_transaction_sort_from_param() {
        assert_eq!(TransactionSort::from_param(Some("data")), TransactionSort::Date);
        assert_eq!(TransactionSort::from_param(Some("total")), TransactionSort::Total);
        assert_eq!(TransactionSort::from_param(Some("nome")), TransactionSort::Id);
    }

    #[test]
    fn test_product_filter_from_params() {
        let filter = ProductFilter::from_params(Some("Produto"), Some("150")).unwrap();
        assert_eq!(filter.name.as_deref(), Some("Produto"));
        assert_eq!(filter.max_price, Some(Decimal::from(150)));

        let empty = ProductFilter::from_params(Some(""), Some("  ")).unwrap();
        assert_eq!(empty, ProductFilter::default());
    }

    #[test]
    fn test_product_filter_rejects_bad_price() {
        assert_eq!(
            ProductFilter::from_params(None, Some("barato")),
            Err(ListingError::NotANumber { param: "preco_max" })
        );
    }

    #[test]
    fn test_transaction_filter_from_params() {
        let filter = TransactionFilter::from_params(Some("caneta"), Some("2")).unwrap();
        assert_eq!(filter.product_name.as_deref(), Some("caneta"));
        assert_eq!(filter.min_quantity, Some(2));

        assert!(TransactionFilter::from_params(None, Some("2.5")).is_err());
    }

    #[test]
    fn test_contains_pattern_escapes() {
        assert_eq!(contains_pattern("abc"), "%abc%");
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}

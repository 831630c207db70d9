//! Personal customers as listed by `listcustomers`.

use serde::Serialize;
use serde_json::Value;

use crate::bag::{apply_fields, as_integer, PropertyBag, Setter};

/// Columns with a dedicated attribute on [`Customer`].
const FIELDS: &[(&str, Setter<Customer>)] = &[
    ("Customer", |c: &mut Customer, v: &Value| c.identifier = as_integer(v)),
    ("Credits", |c: &mut Customer, v: &Value| {
        c.credit = as_integer(v).unwrap_or_default();
    }),
];

/// A customer of the reseller.
///
/// Built once from a property bag and read-only afterwards. Columns the client
/// does not know about are kept in [`Customer::options`], so new backend fields
/// are not lost.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Customer {
    identifier: Option<i64>,
    credit: i64,
    options: PropertyBag,
}

impl Customer {
    /// Build a customer from a decoded property bag.
    #[must_use]
    pub fn from_bag(bag: PropertyBag) -> Self {
        let mut customer = Self::default();
        let options = apply_fields(&mut customer, bag, FIELDS);
        Self { options, ..customer }
    }

    /// Internal EVC identifier, unset when the backend did not provide a usable one.
    #[must_use]
    pub const fn identifier(&self) -> Option<i64> {
        self.identifier
    }

    /// Personal account balance for the current reseller.
    #[must_use]
    pub const fn credit(&self) -> i64 {
        self.credit
    }

    /// Every column that is not a known attribute.
    #[must_use]
    pub const fn options(&self) -> &PropertyBag {
        &self.options
    }

    /// One unknown column by name.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

impl From<PropertyBag> for Customer {
    fn from(bag: PropertyBag) -> Self {
        Self::from_bag(bag)
    }
}

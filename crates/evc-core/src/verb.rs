//! API verbs.
//!
//! A verb is the `verb` query parameter that selects which backend operation a
//! GET request performs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest `lastdays` value accepted by `getrecentpurchases`.
pub const MIN_PURCHASE_DAYS: i64 = 1;

/// Largest `lastdays` value accepted by `getrecentpurchases`.
pub const MAX_PURCHASE_DAYS: i64 = 99;

/// Operations understood by the EVC backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    /// Does the customer exist in the global EVC customer base.
    CheckEvcCustomer,
    /// Make an EVC customer a personal customer of the reseller.
    AddCustomer,
    /// Read a personal account balance.
    GetCustomerAccount,
    /// Add (or subtract) credits to a personal account balance.
    AddCustomerAccount,
    /// Overwrite a personal account balance.
    SetCustomerAccount,
    /// Is the customer a personal customer of the reseller.
    CheckCustomer,
    /// List the personal customers of the reseller.
    ListCustomers,
    /// Purchases performed during the last days.
    GetRecentPurchases,
}

impl Verb {
    /// Every verb, in declaration order.
    pub const ALL: [Verb; 8] = [
        Verb::CheckEvcCustomer,
        Verb::AddCustomer,
        Verb::GetCustomerAccount,
        Verb::AddCustomerAccount,
        Verb::SetCustomerAccount,
        Verb::CheckCustomer,
        Verb::ListCustomers,
        Verb::GetRecentPurchases,
    ];

    /// The wire name of the verb.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CheckEvcCustomer => "checkevccustomer",
            Self::AddCustomer => "addcustomer",
            Self::GetCustomerAccount => "getcustomeraccount",
            Self::AddCustomerAccount => "addcustomeraccount",
            Self::SetCustomerAccount => "setcustomeraccount",
            Self::CheckCustomer => "checkcustomer",
            Self::ListCustomers => "listcustomers",
            Self::GetRecentPurchases => "getrecentpurchases",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known verb.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown verb: {0}")]
pub struct VerbError(pub String);

impl FromStr for Verb {
    type Err = VerbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|verb| verb.as_str() == s)
            .ok_or_else(|| VerbError(s.to_string()))
    }
}

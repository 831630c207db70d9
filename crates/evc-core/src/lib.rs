//! Core types for the EVC reseller-credit API.
//!
//! The EVC backend speaks an untyped text protocol over HTTP GET. Every answer is
//! either `ok: <value>` or `fail: <reason>`, and the collection verbs embed a JSON
//! document after the literal `JSON follows `. This crate holds everything that can
//! be decided without doing I/O:
//!
//! - **Verbs**: [`Verb`], the operation selector sent with each request
//! - **Property bags**: [`PropertyBag`] and the scalar coercions used by the mappers
//! - **Records**: [`Customer`] and [`Purchase`], built from property bags
//! - **Classification**: [`classify`] turns `(status, body)` into an [`Outcome`]
//!
//! # Example
//!
//! ```
//! use evc_core::{classify, Expectation, Outcome, Payload};
//!
//! let response = classify(200, "ok: 42\n", Expectation::Integer);
//! assert_eq!(response.outcome, Outcome::Success(Payload::Integer(42)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bag;
pub mod customer;
pub mod purchase;
pub mod response;
pub mod verb;

pub use bag::PropertyBag;
pub use customer::Customer;
pub use purchase::Purchase;
pub use response::{
    classify, ClassifiedResponse, Expectation, Outcome, Payload, CREDENTIAL_ERRORS,
    FAIL_PREFIX, JSON_FOLLOWS_PREFIX, OK_PREFIX,
};
pub use verb::{Verb, VerbError, MAX_PURCHASE_DAYS, MIN_PURCHASE_DAYS};

//! EVC reseller-credit API client.
//!
//! This crate provides an async client for the evc.de reseller-credit API: checking
//! and adjusting personal account balances, managing personal customers and
//! reading recent purchases.
//!
//! # Example
//!
//! ```no_run
//! use evc_client::{EvcClient, EvcConfig};
//!
//! # async fn example() -> Result<(), evc_client::ClientError> {
//! let config = EvcConfig::new("your-api-id", "your-reseller-number", "your-password");
//! let client = EvcClient::new(&config)?;
//!
//! if client.is_personal(33333).await? {
//!     let balance = client.add_credit(33333, 10).await?;
//!     println!("New balance: {balance} credits");
//! }
//!
//! for purchase in client.get_purchases(7, Some(33333)).await? {
//!     println!("{:?} bought {:?}", purchase.date(), purchase.filename());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Every operation returns a [`ClientError`]. Credential problems
//! ([`ClientError::Credential`]) are kept apart from other backend rejections
//! ([`ClientError::Logic`]) so callers can react to them without reading messages.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod config;
mod emulation;
mod error;
mod transport;

pub use client::EvcClient;
pub use config::{EvcConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECONDS};
pub use emulation::{EmulatedTransport, CUSTOMERS_FIXTURE, EMULATED_BALANCE, PURCHASES_FIXTURE};
pub use error::ClientError;
pub use transport::{HttpTransport, Params, RawResponse, Transport};

pub use evc_core::{Customer, PropertyBag, Purchase, Verb};

//! # medichat-pharmacy
//!
//! A process-local pharmacy storefront. Everything lives in one
//! [`store::PharmacyStore`]; nothing is persisted and payment is simulated.
//!
//! - [`catalog`]: products and catalog filtering
//! - [`cart`]: the shopping cart and its commands
//! - [`order`]: orders and delivery details
//! - [`payment`]: simulated payment orders
//! - [`money`]: overflow-checked totals
//! - [`account`]: mock user accounts and sessions
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use medichat_pharmacy::{cart::CartCommand, store::PharmacyStore};
//!
//! let store = PharmacyStore::seeded();
//! store.update_cart(CartCommand::add("1", 2))?;
//! let order = store.checkout("1", address)?;
//! ```

pub mod account;
pub mod cart;
pub mod catalog;
pub mod money;
pub mod order;
pub mod payment;
pub mod store;

pub use store::PharmacyStore;

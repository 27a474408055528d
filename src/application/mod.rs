//! Application layer orchestrating the storefront's stateful services.
//!
//! [`ledger::CartLedger`] owns the cart of one session and keeps it persisted.
//! [`checkout::CheckoutSequencer`] drives a single checkout attempt over a
//! snapshot of that ledger, with the payment gateway injected as a port.
//! [`catalog::CatalogService`] is the merchant's product list.

pub mod catalog;
pub mod checkout;
pub mod ledger;

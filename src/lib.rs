//! Cart ledger and checkout sequencing for a storefront.
//!
//! The [`application::ledger::CartLedger`] keeps one session's cart and
//! persists it to a [`domain::ports::LocalStorage`]. The
//! [`application::checkout::CheckoutSequencer`] walks a snapshot of that cart
//! through `review → payment → processing → success`, with payment handled by
//! an injected [`domain::ports::PaymentGateway`].

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod logging;

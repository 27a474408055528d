//! Domain types: cart lines, prices, the merchant catalog, checkout sessions,
//! and the ports the application layer talks to.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod ports;
pub mod price;

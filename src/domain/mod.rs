//! Storefront domain: cart, catalog read models, checkout and account forms
pub mod account;
pub mod aggregates;
pub mod checkout;
pub mod events;
pub mod value_objects;

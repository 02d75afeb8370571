//! Aggregates module
pub mod cart;
pub mod order;
pub mod product;
pub mod store;

pub use cart::{Addition, Cart, CartError, Change, LineItem, NewLineItem, ShippingPolicy};
pub use order::{generate_order_number, OrderReceipt, OrderSubmission};
pub use product::{
    Category, ProductDetail, ProductOrdering, ProductPage, ProductQuery, ProductRecord, ProductSize,
    ProductSummary, ProductWithRelated, SortField,
};
pub use store::{AddOutcome, CartStore, Visibility, VisibilityChange};

//! Shared primitive types used across the desk.

/// Row identifier assigned by the store. Stable for the lifetime of a row.
pub type EntityId = i64;

/// Monetary amount in the desk's single reporting currency.
pub type Money = f64;

//! Fund data source implementations.

pub mod cafci;

pub use cafci::{CafciAdapter, CafciConfig, PERFORMANCE_SCALE, PRICE_SCALE};

//! Application services layer.

pub mod cache;
pub mod context;
pub mod error;
pub mod outcome;
pub mod pagination;
pub mod products;
pub mod repos;

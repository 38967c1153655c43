//! Data access layer

pub mod accounts;

pub use accounts::{AccountDirectory, PgAccountDirectory};

//! # relkv-types
//!
//! Shared domain types for the relkv relational layer.
//!
//! This crate defines the data structures used throughout the system:
//! - Entity kinds and the `Entity` trait tying a record shape to its keyspace
//! - Records: users, companies, products, categories, orders
//! - Views: denormalized join and aggregate results
//! - Settings: configuration types
//!
//! ## Usage
//!
//! ```rust
//! use relkv_types::{Entity, EntityKind, User};
//!
//! let user = User::new("Alice Smith", "alice@example.com", 1);
//! assert_eq!(User::KIND, EntityKind::Users);
//! assert_eq!(user.id(), 0);
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod records;
pub mod views;

pub use config::Settings;
pub use entity::{Entity, EntityKind, RecordId};
pub use error::RelkvError;
pub use records::{Category, Company, Order, Product, User};
pub use views::{CompanyStats, OrderWithDetails, ProductSales, UserWithCompany};

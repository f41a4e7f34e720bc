//! Small demo dataset.
//!
//! Loaded by `relkv seed` and used as the fixture for query tests.

use relkv_types::{Category, Company, Order, Product, User};
use tracing::info;

use crate::error::StorageError;
use crate::records::RecordStore;

/// Number of records written per kind by [`seed_demo_data`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedCounts {
    pub categories: usize,
    pub companies: usize,
    pub users: usize,
    pub products: usize,
    pub orders: usize,
}

/// Write a small, fully connected dataset.
///
/// References assume a fresh store (ids starting at 1). Seeding twice
/// appends a second copy whose references point at the first one.
pub fn seed_demo_data(store: &RecordStore) -> Result<SeedCounts, StorageError> {
    let mut counts = SeedCounts::default();

    for name in ["Electronics", "Books", "Clothing"] {
        store.create_category(Category::new(name))?;
        counts.categories += 1;
    }

    for (name, industry) in [
        ("Tech Corp", "Technology"),
        ("Fashion Ltd", "Fashion"),
        ("Book Store Inc", "Retail"),
    ] {
        store.create_company(Company::new(name, industry))?;
        counts.companies += 1;
    }

    for (name, email, company_id) in [
        ("Alice Smith", "alice@example.com", 1),
        ("Bob Johnson", "bob@example.com", 2),
        ("Charlie Brown", "charlie@example.com", 1),
    ] {
        store.create_user(User::new(name, email, company_id))?;
        counts.users += 1;
    }

    for (name, price, category_id, company_id, description) in [
        ("Laptop", 999.99, 1, 1, "High-performance laptop"),
        ("Programming Book", 49.99, 2, 3, "Learn Rust programming"),
        ("T-Shirt", 19.99, 3, 2, "Cotton t-shirt"),
    ] {
        let product = Product::new(name, price, category_id, company_id, description);
        store.create_product(product)?;
        counts.products += 1;
    }

    for (user_id, product_id, quantity, amount, status) in [
        (1, 1, 1, 999.99, "completed"),
        (2, 3, 2, 39.98, "completed"),
        (1, 2, 1, 49.99, "pending"),
        (3, 1, 1, 999.99, "completed"),
    ] {
        store.create_order(Order::new(user_id, product_id, quantity, amount, status))?;
        counts.orders += 1;
    }

    info!(?counts, "Seeded demo data");
    Ok(counts)
}

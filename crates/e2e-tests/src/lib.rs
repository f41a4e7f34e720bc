//! End-to-end test infrastructure for relkv.
//!
//! Provides a shared TestHarness and dataset builders for tests covering
//! the path from record creation through relational views.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

use relkv_query::QueryEngine;
use relkv_storage::RecordStore;
use relkv_types::{Category, Company, Order, Product, RecordId, User};

/// Shared test harness for E2E tests.
///
/// Owns a temp directory holding one RocksDB instance, a record store over
/// it, and a query engine sharing that store.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub temp_dir: TempDir,
    /// Shared record store
    pub store: Arc<RecordStore>,
    /// Query engine over `store`
    pub engine: QueryEngine,
}

impl TestHarness {
    /// Create a new harness over a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self::open_in(temp_dir)
    }

    fn open_in(temp_dir: TempDir) -> Self {
        let store =
            Arc::new(RecordStore::open(temp_dir.path()).expect("Failed to open test store"));
        let engine = QueryEngine::new(store.clone());
        Self {
            temp_dir,
            store,
            engine,
        }
    }

    /// Close the database and open it again from disk.
    pub fn reopen(self) -> Self {
        let TestHarness {
            temp_dir,
            store,
            engine,
        } = self;
        drop(engine);
        drop(store);
        Self::open_in(temp_dir)
    }

    pub fn company(&self, name: &str) -> Company {
        self.store
            .create_company(Company::new(name, "Technology"))
            .expect("Failed to create company")
    }

    pub fn user(&self, name: &str, company_id: RecordId) -> User {
        self.store
            .create_user(User::new(name, format!("{}@example.com", name), company_id))
            .expect("Failed to create user")
    }

    pub fn category(&self, name: &str) -> Category {
        self.store
            .create_category(Category::new(name))
            .expect("Failed to create category")
    }

    pub fn product(&self, name: &str, price: f64, category_id: RecordId) -> Product {
        self.store
            .create_product(Product::new(name, price, category_id, 1, ""))
            .expect("Failed to create product")
    }

    pub fn order(&self, user_id: RecordId, product_id: RecordId, amount: f64) -> Order {
        self.store
            .create_order(Order::new(user_id, product_id, 1, amount, "completed"))
            .expect("Failed to create order")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Shape of a randomly generated dataset.
#[derive(Debug, Clone, Copy)]
pub struct DatasetShape {
    pub companies: usize,
    pub users: usize,
    pub categories: usize,
    pub products: usize,
    pub orders: usize,
    /// Fraction of references deliberately pointed at missing records
    pub dangling_ratio: f64,
}

impl Default for DatasetShape {
    fn default() -> Self {
        Self {
            companies: 4,
            users: 15,
            categories: 3,
            products: 8,
            orders: 60,
            dangling_ratio: 0.1,
        }
    }
}

/// Fill the harness with a reproducible random dataset.
///
/// Amounts are whole numbers so sums compare exactly.
pub fn random_dataset(harness: &TestHarness, shape: DatasetShape, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);

    let pick = |rng: &mut StdRng, count: usize| -> RecordId {
        if rng.random_bool(shape.dangling_ratio) {
            10_000 + rng.random_range(0..100)
        } else {
            rng.random_range(1..=count as RecordId)
        }
    };

    for i in 0..shape.companies {
        harness.company(&format!("company-{}", i));
    }
    for i in 0..shape.categories {
        harness.category(&format!("category-{}", i));
    }
    for i in 0..shape.users {
        let company_id = pick(&mut rng, shape.companies);
        harness.user(&format!("user-{}", i), company_id);
    }
    for i in 0..shape.products {
        let category_id = pick(&mut rng, shape.categories);
        let price = rng.random_range(1..500) as f64;
        harness.product(&format!("product-{}", i), price, category_id);
    }
    for _ in 0..shape.orders {
        let user_id = pick(&mut rng, shape.users);
        let product_id = pick(&mut rng, shape.products);
        let amount = rng.random_range(1..1_000) as f64;
        harness.order(user_id, product_id, amount);
    }
}

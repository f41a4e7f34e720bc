//! Denormalized results produced by the join and aggregation engine.

use serde::{Deserialize, Serialize};

use crate::records::{Category, Company, Order, Product, User};

/// One-to-one join of a user and the company it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserWithCompany {
    pub user: User,
    pub company: Company,
}

/// An order with every hop of its relationship chain resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithDetails {
    pub order: Order,
    pub user: User,
    pub product: Product,
    pub category: Category,
}

/// Per-company aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyStats {
    pub company: Company,
    pub user_count: usize,
    pub order_count: usize,
    pub total_revenue: f64,
}

impl CompanyStats {
    /// Zeroed stats for a company with no users or orders yet.
    pub fn empty(company: Company) -> Self {
        Self {
            company,
            user_count: 0,
            order_count: 0,
            total_revenue: 0.0,
        }
    }
}

/// Sales accumulated for a single product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSales {
    pub product: Product,
    pub total_orders: usize,
    pub total_revenue: f64,
}

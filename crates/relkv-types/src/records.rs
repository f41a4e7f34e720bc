//! Persisted record shapes.
//!
//! Records are immutable-by-replacement: an update rewrites the whole value.
//! Cross-record references are plain ids and may dangle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityKind, RecordId};

/// A person belonging to exactly one company (by reference).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub company_id: RecordId,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, company_id: RecordId) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: email.into(),
            company_id,
            created_at: Utc::now(),
        }
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::Users;

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn stamp_created(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }
}

/// An organization referenced by users and products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: RecordId,
    pub name: String,
    pub industry: String,
    pub created_at: DateTime<Utc>,
}

impl Company {
    pub fn new(name: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            industry: industry.into(),
            created_at: Utc::now(),
        }
    }
}

impl Entity for Company {
    const KIND: EntityKind = EntityKind::Companies;

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn stamp_created(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }
}

/// A sellable item. Price is non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    pub price: f64,
    pub category_id: RecordId,
    pub company_id: RecordId,
    pub description: String,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        price: f64,
        category_id: RecordId,
        company_id: RecordId,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            name: name.into(),
            price,
            category_id,
            company_id,
            description: description.into(),
        }
    }
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Products;

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn validate(&self) -> Result<(), String> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!(
                "product price must be a non-negative number, got {}",
                self.price
            ));
        }
        Ok(())
    }
}

/// Product grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: RecordId,
    pub name: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
        }
    }
}

impl Entity for Category {
    const KIND: EntityKind = EntityKind::Categories;

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

/// A purchase of one product by one user.
///
/// `status` is free-form ("completed", "pending", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: RecordId,
    pub user_id: RecordId,
    pub product_id: RecordId,
    pub quantity: u32,
    pub amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        user_id: RecordId,
        product_id: RecordId,
        quantity: u32,
        amount: f64,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            user_id,
            product_id,
            quantity,
            amount,
            status: status.into(),
            created_at: Utc::now(),
        }
    }
}

impl Entity for Order {
    const KIND: EntityKind = EntityKind::Orders;

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn stamp_created(&mut self, at: DateTime<Utc>) {
        self.created_at = at;
    }

    fn validate(&self) -> Result<(), String> {
        if self.quantity == 0 {
            return Err("order quantity must be positive".to_string());
        }
        if !self.amount.is_finite() {
            return Err(format!(
                "order amount must be a finite number, got {}",
                self.amount
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_json_field_names() {
        let user = User::new("Alice Smith", "alice@example.com", 7);
        let value: serde_json::Value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["company_id"], 7);
        assert_eq!(value["email"], "alice@example.com");
        assert!(value.get("created_at").is_some());
    }

    #[test]
    fn test_user_serialization_preserves_timestamp() {
        let user = User::new("Bob Johnson", "bob@example.com", 2);
        let bytes = serde_json::to_vec(&user).unwrap();
        let decoded: User = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(user, decoded);
        assert_eq!(user.created_at, decoded.created_at);
    }

    #[test]
    fn test_stamp_created_is_noop_for_products() {
        let mut product = Product::new("Laptop", 999.99, 1, 1, "High-performance laptop");
        let before = product.clone();
        product.stamp_created(Utc::now());
        assert_eq!(product, before);
    }

    #[test]
    fn test_product_validation() {
        assert!(Product::new("Free sample", 0.0, 1, 1, "").validate().is_ok());
        assert!(Product::new("Refund", -1.0, 1, 1, "").validate().is_err());
        assert!(Product::new("Broken", f64::NAN, 1, 1, "").validate().is_err());
        assert!(Product::new("Broken", f64::INFINITY, 1, 1, "").validate().is_err());
    }

    #[test]
    fn test_order_validation() {
        assert!(Order::new(1, 1, 1, -5.0, "refunded").validate().is_ok());
        assert!(Order::new(1, 1, 0, 5.0, "completed").validate().is_err());
        assert!(Order::new(1, 1, 1, f64::NAN, "completed").validate().is_err());
    }

    #[test]
    fn test_users_and_categories_always_valid() {
        assert!(User::new("", "", 0).validate().is_ok());
        assert!(Category::new("").validate().is_ok());
    }

    #[test]
    fn test_set_id() {
        let mut order = Order::new(1, 1, 2, 39.98, "completed");
        assert_eq!(order.id(), 0);
        order.set_id(42);
        assert_eq!(order.id(), 42);
    }
}

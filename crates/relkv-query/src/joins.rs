//! Join views: one-to-one, multi-hop, and filtered.

use relkv_types::{
    Category, Company, Order, OrderWithDetails, Product, RecordId, User, UserWithCompany,
};
use tracing::{debug, instrument};

use crate::engine::QueryEngine;
use crate::error::QueryError;

impl QueryEngine {
    /// Every user joined with its company, in user listing order.
    ///
    /// Users whose company is missing are left out.
    #[instrument(skip(self))]
    pub fn users_with_companies(&self) -> Result<Vec<UserWithCompany>, QueryError> {
        let users = self.store().list_users()?;
        let mut results = Vec::with_capacity(users.len());

        for user in users {
            match self.resolve::<Company>(user.company_id)? {
                Some(company) => results.push(UserWithCompany { user, company }),
                None => {
                    debug!(
                        user_id = user.id,
                        company_id = user.company_id,
                        "Dropping user: company not found"
                    );
                }
            }
        }

        Ok(results)
    }

    /// Every order with its user, product, and the product's category.
    ///
    /// An order is left out if any hop is missing. Order listing order is kept.
    #[instrument(skip(self))]
    pub fn orders_with_details(&self) -> Result<Vec<OrderWithDetails>, QueryError> {
        let orders = self.store().list_orders()?;
        let mut results = Vec::with_capacity(orders.len());

        for order in orders {
            let Some(user) = self.resolve::<User>(order.user_id)? else {
                debug!(
                    order_id = order.id,
                    user_id = order.user_id,
                    "Dropping order: user not found"
                );
                continue;
            };
            if let Some(details) = self.resolve_product_hops(order, user)? {
                results.push(details);
            }
        }

        Ok(results)
    }

    /// Orders placed by one user, with product and category resolved.
    ///
    /// Fails with `NotFound` if the user does not exist. Orders with a
    /// missing product or category are left out.
    #[instrument(skip(self))]
    pub fn user_orders_with_products(
        &self,
        user_id: RecordId,
    ) -> Result<Vec<OrderWithDetails>, QueryError> {
        let user = self
            .resolve::<User>(user_id)?
            .ok_or_else(|| QueryError::NotFound(format!("user {}", user_id)))?;

        let orders = self.store().list_orders()?;
        let mut results = Vec::new();

        for order in orders.into_iter().filter(|o| o.user_id == user_id) {
            if let Some(details) = self.resolve_product_hops(order, user.clone())? {
                results.push(details);
            }
        }

        Ok(results)
    }

    /// Resolve order -> product -> category. `None` if either hop is missing.
    fn resolve_product_hops(
        &self,
        order: Order,
        user: User,
    ) -> Result<Option<OrderWithDetails>, QueryError> {
        let Some(product) = self.resolve::<Product>(order.product_id)? else {
            debug!(
                order_id = order.id,
                product_id = order.product_id,
                "Dropping order: product not found"
            );
            return Ok(None);
        };
        let Some(category) = self.resolve::<Category>(product.category_id)? else {
            debug!(
                order_id = order.id,
                category_id = product.category_id,
                "Dropping order: category not found"
            );
            return Ok(None);
        };

        Ok(Some(OrderWithDetails {
            order,
            user,
            product,
            category,
        }))
    }
}

#[cfg(test)]
mod tests {
    use relkv_storage::StorageError;
    use relkv_types::{Company, Order, Product, User};

    use crate::engine::test_support::{create_test_engine, seed};
    use crate::error::QueryError;

    #[test]
    fn test_users_with_companies() {
        let (engine, _temp) = create_test_engine();
        seed(&engine);

        let rows = engine.users_with_companies().unwrap();
        let pairs: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.user.name.as_str(), r.company.name.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Alice Smith", "Tech Corp"),
                ("Bob Johnson", "Fashion Ltd"),
                ("Charlie Brown", "Tech Corp"),
            ]
        );
    }

    #[test]
    fn test_users_with_dangling_company_are_dropped() {
        let (engine, _temp) = create_test_engine();
        let store = engine.store();

        store.create_company(Company::new("Tech Corp", "Technology")).unwrap();
        store.create_user(User::new("Alice", "a@example.com", 1)).unwrap();
        store.create_user(User::new("Dangling", "d@example.com", 99)).unwrap();
        store.create_user(User::new("Carol", "c@example.com", 1)).unwrap();

        let rows = engine.users_with_companies().unwrap();
        let names: Vec<&str> = rows.iter().map(|r| r.user.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Carol"]);
    }

    #[test]
    fn test_users_with_companies_empty() {
        let (engine, _temp) = create_test_engine();
        assert!(engine.users_with_companies().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_company_aborts_join() {
        let (engine, _temp) = create_test_engine();
        let store = engine.store();

        store.create_user(User::new("Alice", "a@example.com", 1)).unwrap();
        store.storage().put(b"companies:1", b"garbage").unwrap();

        let result = engine.users_with_companies();
        assert!(matches!(
            result,
            Err(QueryError::Storage(StorageError::Deserialization { .. }))
        ));
    }

    #[test]
    fn test_orders_with_details() {
        let (engine, _temp) = create_test_engine();
        seed(&engine);

        let rows = engine.orders_with_details().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].order.id, 1);
        assert_eq!(rows[0].user.name, "Alice Smith");
        assert_eq!(rows[0].product.name, "Laptop");
        assert_eq!(rows[0].category.name, "Electronics");
        assert_eq!(rows[1].product.name, "T-Shirt");
        assert_eq!(rows[1].category.name, "Clothing");
    }

    #[test]
    fn test_orders_with_details_drops_broken_hops() {
        let (engine, _temp) = create_test_engine();
        seed(&engine);
        let store = engine.store();

        // Missing user
        store.create_order(Order::new(42, 1, 1, 1.0, "completed")).unwrap();
        // Missing product
        store.create_order(Order::new(1, 42, 1, 1.0, "completed")).unwrap();
        // Product whose category is missing
        let orphan = store
            .create_product(Product::new("Orphan", 5.0, 42, 1, ""))
            .unwrap();
        store
            .create_order(Order::new(1, orphan.id, 1, 5.0, "completed"))
            .unwrap();

        let rows = engine.orders_with_details().unwrap();
        let ids: Vec<u64> = rows.iter().map(|r| r.order.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_user_orders_with_products() {
        let (engine, _temp) = create_test_engine();
        seed(&engine);

        let rows = engine.user_orders_with_products(1).unwrap();
        let products: Vec<&str> = rows.iter().map(|r| r.product.name.as_str()).collect();
        assert_eq!(products, vec!["Laptop", "Programming Book"]);
        assert!(rows.iter().all(|r| r.user.id == 1));
        assert_eq!(rows[1].order.status, "pending");
    }

    #[test]
    fn test_user_orders_for_user_without_orders() {
        let (engine, _temp) = create_test_engine();
        seed(&engine);
        let user = engine
            .store()
            .create_user(User::new("Dana", "dana@example.com", 3))
            .unwrap();

        assert!(engine.user_orders_with_products(user.id).unwrap().is_empty());
    }

    #[test]
    fn test_user_orders_missing_user_is_not_found() {
        let (engine, _temp) = create_test_engine();
        seed(&engine);

        let result = engine.user_orders_with_products(404);
        assert!(matches!(result, Err(QueryError::NotFound(_))));
    }
}

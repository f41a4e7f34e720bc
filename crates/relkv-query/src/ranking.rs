//! Per-category product sales rankings.
//!
//! Products are grouped by category name. A product whose category cannot be
//! resolved lands in the `""` group, so "no category" and "unknown category"
//! share a bucket. Within a group, products rank by revenue descending, then
//! by product id ascending.

use std::collections::{BTreeMap, HashMap};

use relkv_types::{Category, Product, ProductSales, RecordId};
use tracing::{debug, instrument};

use crate::engine::QueryEngine;
use crate::error::QueryError;

/// Category name -> ranked product sales.
pub type SalesByCategory = BTreeMap<String, Vec<ProductSales>>;

impl QueryEngine {
    /// Products with at least one order, ranked within their category.
    ///
    /// Orders for unknown products are skipped.
    #[instrument(skip(self))]
    pub fn top_selling_products_by_category(&self) -> Result<SalesByCategory, QueryError> {
        let orders = self.store().list_orders()?;
        let products: HashMap<RecordId, Product> = self
            .store()
            .list_products()?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();
        let categories: HashMap<RecordId, Category> = self
            .store()
            .list_categories()?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut sales: HashMap<RecordId, ProductSales> = HashMap::new();
        for order in &orders {
            let Some(product) = products.get(&order.product_id) else {
                debug!(
                    order_id = order.id,
                    product_id = order.product_id,
                    "Skipping order: product not found"
                );
                continue;
            };
            let entry = sales.entry(product.id).or_insert_with(|| ProductSales {
                product: product.clone(),
                total_orders: 0,
                total_revenue: 0.0,
            });
            entry.total_orders += 1;
            entry.total_revenue += order.amount;
        }

        let mut grouped = SalesByCategory::new();
        for stats in sales.into_values() {
            let category_name = categories
                .get(&stats.product.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_default();
            grouped.entry(category_name).or_default().push(stats);
        }

        for ranked in grouped.values_mut() {
            ranked.sort_by(|a, b| {
                b.total_revenue
                    .total_cmp(&a.total_revenue)
                    .then_with(|| a.product.id.cmp(&b.product.id))
            });
        }

        Ok(grouped)
    }

    /// Like [`QueryEngine::top_selling_products_by_category`], keeping at
    /// most `limit` products per category.
    pub fn top_products_by_category(&self, limit: usize) -> Result<SalesByCategory, QueryError> {
        let mut grouped = self.top_selling_products_by_category()?;
        for ranked in grouped.values_mut() {
            ranked.truncate(limit);
        }
        Ok(grouped)
    }
}

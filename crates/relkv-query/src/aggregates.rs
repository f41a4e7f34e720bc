//! Grouped aggregates.

use std::collections::HashMap;

use relkv_types::{CompanyStats, RecordId};
use tracing::{debug, instrument};

use crate::engine::QueryEngine;
use crate::error::QueryError;

impl QueryEngine {
    /// User count, order count, and revenue for every company.
    ///
    /// Orders are attributed to the company of the ordering user. Orders
    /// whose user is missing count toward no company. Companies with no
    /// users or orders appear with zeroed stats, in company listing order.
    #[instrument(skip(self))]
    pub fn company_stats(&self) -> Result<Vec<CompanyStats>, QueryError> {
        let companies = self.store().list_companies()?;
        let users = self.store().list_users()?;
        let orders = self.store().list_orders()?;

        let mut user_counts: HashMap<RecordId, usize> = HashMap::new();
        let mut company_of_user: HashMap<RecordId, RecordId> = HashMap::with_capacity(users.len());
        for user in &users {
            *user_counts.entry(user.company_id).or_insert(0) += 1;
            company_of_user.insert(user.id, user.company_id);
        }

        // (order count, revenue) per company, summed in order listing order
        let mut order_totals: HashMap<RecordId, (usize, f64)> = HashMap::new();
        for order in &orders {
            match company_of_user.get(&order.user_id) {
                Some(company_id) => {
                    let totals = order_totals.entry(*company_id).or_insert((0, 0.0));
                    totals.0 += 1;
                    totals.1 += order.amount;
                }
                None => {
                    debug!(order_id = order.id, user_id = order.user_id, "Order has no known user");
                }
            }
        }

        let stats = companies
            .into_iter()
            .map(|company| {
                let user_count = user_counts.get(&company.id).copied().unwrap_or(0);
                let (order_count, total_revenue) =
                    order_totals.get(&company.id).copied().unwrap_or((0, 0.0));
                CompanyStats {
                    company,
                    user_count,
                    order_count,
                    total_revenue,
                }
            })
            .collect();

        Ok(stats)
    }
}

use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::{
    error::{AppError, Result},
    models::dashboard::Counter,
    repositories::traits::DashboardStore,
};

const COUNT_USERS: &str = "SELECT COUNT(*) AS total FROM users";
const COUNT_CUSTOMERS: &str = "SELECT COUNT(*) AS total FROM customer";
const COUNT_ORDERS: &str = "SELECT COUNT(*) AS total FROM orders";

fn query_for(counter: Counter) -> &'static str {
    match counter {
        Counter::Users => COUNT_USERS,
        Counter::Customers => COUNT_CUSTOMERS,
        Counter::Orders => COUNT_ORDERS,
    }
}

/// Dashboard counters read straight from the CRM tables.
#[derive(Clone)]
pub struct PgDashboardStore {
    pool: Pool,
}

impl PgDashboardStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DashboardStore for PgDashboardStore {
    async fn count(&self, counter: Counter) -> Result<i64> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(query_for(counter)).await?;
        let row = client.query_one(&statement, &[]).await?;
        row.try_get("total")
            .map_err(|_| AppError::MissingData(counter.as_str().to_string()))
    }
}

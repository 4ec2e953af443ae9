use crate::{
    models::dashboard::{Counter, DashboardCounts},
    repositories::traits::DashboardStore,
};

/// Loads every dashboard counter independently.
///
/// A counter that fails to load is reported and shown as zero; the others
/// are unaffected.
pub async fn load_counts(store: &dyn DashboardStore) -> DashboardCounts {
    let mut counts = DashboardCounts::default();

    for counter in Counter::ALL {
        match store.count(counter).await {
            Ok(value) => counts.set(counter, value),
            Err(e) => tracing::error!("Dashboard error ({}): {}", counter.as_str(), e),
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use async_trait::async_trait;

    struct OrdersTableMissing;

    #[async_trait]
    impl DashboardStore for OrdersTableMissing {
        async fn count(&self, counter: Counter) -> Result<i64> {
            match counter {
                Counter::Users => Ok(12),
                Counter::Customers => Ok(7),
                Counter::Orders => Err(AppError::Unavailable("relation orders does not exist".into())),
            }
        }
    }

    #[tokio::test]
    async fn one_failing_counter_does_not_zero_the_others() {
        let counts = load_counts(&OrdersTableMissing).await;
        assert_eq!(
            counts,
            DashboardCounts {
                users: 12,
                customers: 7,
                orders: 0
            }
        );
    }

    #[tokio::test]
    async fn memory_store_counts_customers_by_role() {
        let store = crate::repositories::memory::MemoryStore::with_demo_users().unwrap();
        let counts = load_counts(&store).await;
        assert_eq!(counts.users, 2);
        assert_eq!(counts.customers, 1);
        assert_eq!(counts.orders, 0);
    }
}

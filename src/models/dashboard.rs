/// A headline counter on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Users,
    Customers,
    Orders,
}

impl Counter {
    pub const ALL: [Counter; 3] = [Counter::Users, Counter::Customers, Counter::Orders];

    pub fn as_str(self) -> &'static str {
        match self {
            Counter::Users => "users",
            Counter::Customers => "customers",
            Counter::Orders => "orders",
        }
    }
}

/// Headline counters on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardCounts {
    pub users: i64,
    pub customers: i64,
    pub orders: i64,
}

impl DashboardCounts {
    pub fn set(&mut self, counter: Counter, value: i64) {
        match counter {
            Counter::Users => self.users = value,
            Counter::Customers => self.customers = value,
            Counter::Orders => self.orders = value,
        }
    }
}

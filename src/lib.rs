pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;
pub mod views;

pub mod crypto {
    pub mod password;
    pub mod token;
}

pub mod models {
    pub mod audit;
    pub mod dashboard;
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod audit;
    pub mod dashboard;
    pub mod memory;
    pub mod session;
    pub mod traits;
    pub mod user;
}

pub mod services {
    pub mod audit;
    pub mod auth;
    pub mod csrf;
    pub mod dashboard;
    pub mod guard;
    pub mod session;
}

pub mod handlers {
    pub mod auth;
    pub mod dashboard;
    pub mod page;
}

pub mod middleware_layer {
    pub mod auth;
    pub mod csrf;
    pub mod rate_limit;
    pub mod session;
}

pub mod validation {
    pub mod auth;
}

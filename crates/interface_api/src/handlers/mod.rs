//! Request handlers, one module per resource

pub mod activity;
pub mod auth;
pub mod bills;
pub mod clients;
pub mod health;
pub mod products;
pub mod sales;
pub mod transactions;
pub mod users;

pub mod activity;
pub mod api_router;
pub mod assets;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod customers;
pub mod employees;
pub mod leave;
pub mod maintenance;
pub mod reports;
pub mod rnd;
pub mod shared;
pub mod tasks;
pub mod visits;

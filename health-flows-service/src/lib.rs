pub mod config;
pub mod flows;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

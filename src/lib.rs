pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod poll;
pub mod services;

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod pricing;
pub mod schemas;
pub mod services;
pub mod state;
pub mod workflow;

#[cfg(test)]
pub mod testing;

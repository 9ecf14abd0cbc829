pub mod activity;
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod security;
pub mod session;
pub mod types;
pub mod validation;

pub use app::{app, AppState};

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod contact;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod observer;
pub mod testing;

pub use app::{router, AppState};

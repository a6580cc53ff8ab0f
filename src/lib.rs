pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod services;
pub mod visibility;

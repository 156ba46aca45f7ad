// Little Lemon client - library root

pub mod api;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod http_client;
pub mod models;
pub mod request;

pub use api::LemonApi;
pub use error::ApiError;
pub use http_client::ApiClient;

pub mod api;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod pagination;
pub mod services;

pub use error::{AppError, AppResult};

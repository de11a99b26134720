//! Sentiment Service - scores review text with an external model and keeps a history.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

//! HTTP request handlers

pub mod error;
pub mod events;
pub mod health;

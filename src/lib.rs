//! econcal library
//!
//! Economic calendar retrieval with a horizon-based cache: a weekly snapshot
//! is served until its latest event has passed, and served stale when the
//! upstream feed is down.

pub mod cache;
pub mod calendar;
pub mod cli;
pub mod handlers;
pub mod server;
pub mod service;
pub mod state;
pub mod upstream;

#[cfg(test)]
mod testing;

//! Core modules: storage plumbing, discovery, configuration and shared helpers.

pub mod broker;
pub mod config;
pub mod db;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod output;
pub mod pool;
pub mod schemas;
pub mod store;
pub mod time;

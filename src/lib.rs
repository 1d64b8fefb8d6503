// Core infrastructure modules
pub mod core;

// Service-facing modules
pub mod config;
pub mod formatter;
pub mod service;

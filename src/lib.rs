//! Library crate for spike-stats, exposing modules for the binary and integration tests.

pub mod assets;
pub mod cache;
pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod identity;
pub mod riot;
pub mod routes;
pub mod services;
pub mod state;
pub mod stats;

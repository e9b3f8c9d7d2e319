//! Syntax highlighting and theme CSS served behind a cache-aside layer.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

//! Application services: highlighting and theme conversion behind the cache.

pub mod error;
pub mod highlight;
pub mod render;
pub mod response;
pub mod theme;

//! Health-rating core for the food catalog.
//!
//! The crate hosts the deterministic rule engine that turns a product's
//! declared ingredients and per-100g nutriment values into a 1–5 health
//! rating, the TTL/LRU cache that sits in front of it, and the batch
//! scheduler that keeps stored ratings fresh across the catalog. HTTP
//! routing, search, and persistence mechanics live in the surrounding
//! services; this crate only defines the store contract it needs.

pub mod cache;
pub mod clock;
pub mod config;
pub mod rating;
pub mod scheduler;

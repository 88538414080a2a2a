//! Footgraph: a concurrent football statistics scraper.
//!
//! League overview pages yield clubs and squad links, squad pages yield
//! player profile links, and profile pages yield biographies and season
//! statistics. Everything lands in a SQLite store keyed by stable ids.

pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parse;
pub mod pipeline;
pub mod pool;
pub mod renderer;
pub mod scrape;
pub mod store;

//! Bounded pool of browser contexts shared by the worker stages.

pub mod manager;

pub use manager::{ContextHandle, PoolManager};

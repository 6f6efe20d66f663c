//! tokenkit Library
//!
//! Compiles multi-brand design token sources into per-platform artifacts
//! and resolves (brand, token type, format) lookups against the compiled
//! tree.

pub mod cli;
pub mod compiler;
pub mod config;
pub mod constants;
pub mod models;
pub mod planner;
pub mod resolver;
#[cfg(feature = "web")]
pub mod web;

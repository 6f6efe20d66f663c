//! Data models for tokens, filters, formats and the category registry.
//!
//! Models are independent of the filesystem; scanning and compilation live in
//! [`crate::planner`] and [`crate::compiler`].

pub mod category;
pub mod filter;
pub mod format;
pub mod token;

// Re-export all model types
pub use category::CategoryRegistry;
pub use filter::{AttributeSpec, TokenFilter};
pub use format::{Format, Platform, Renderer, TransformGroup};
pub use token::Token;

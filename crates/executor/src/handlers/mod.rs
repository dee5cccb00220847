//! Command handlers.
//!
//! Handlers are grouped by what they touch:
//! - catalog: the loaded index, index builds and exports
//! - mirror: the Record Store

pub mod catalog;
pub mod mirror;

//! Catalog Workflow Tests
//!
//! End-to-end tests through the public facade:
//! - Build an index from a catalog directory
//! - Query, facet and export it
//! - Mirror upstream changes and pick them up with a rebuild

mod common;

mod workflow;

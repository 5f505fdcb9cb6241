//! Polygon primitives: outline extraction and the polygon container.
//!
//! The pipeline only depends on the `polygonize`/`place` contracts; both are
//! replaceable.

pub mod extract;
pub mod pack;

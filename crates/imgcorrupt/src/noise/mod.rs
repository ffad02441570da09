//! Procedural noise used by the weather corruptions.
//!
//! The plasma fractal draws from the ambient RNG and must run inside a
//! temporary seed scope to be reproducible.

mod plasma;

pub use plasma::plasma_fractal;

//! imgcorrupt CLI library.
//!
//! Command implementations and image file I/O for the `imgcorrupt` binary.

pub mod commands;
pub mod io;

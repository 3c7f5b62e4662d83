//! The `utils` module provides a collection of utility functions and common
//! definitions used across the `popstore` crate.
//!
//! It centralizes the error type shared by every store backend and the
//! logging bootstrap used by the maintenance binary.

pub mod error;
pub mod logging;

#[cfg(test)]
mod tests;

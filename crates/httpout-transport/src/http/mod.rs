//! HTTP output.
//!
//! This module provides the reqwest-backed [`HttpOutput`].

mod client;
pub use client::{HttpOutput, MARKER_HEADER};

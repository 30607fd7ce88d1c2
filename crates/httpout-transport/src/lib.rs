//! # httpout Transport
//!
//! Network implementations of the [`Outputer`](httpout_core::Outputer)
//! contract defined in `httpout-core`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  Ingestion pipeline │  (calls publish_event / publish_events)
//! ├─────────────────────┤
//! │  httpout-core       │  (Outputer, Capsule, HttpOutputConfig)
//! ├─────────────────────┤
//! │  httpout-transport  │  <- This crate (implementations)
//! ├─────────────────────┤
//! │  Network (HTTP)     │
//! └─────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use httpout_core::{HttpOutputConfig, NoopSignaler, Outputer, PublishOptions};
//! use httpout_transport::HttpOutput;
//!
//! let output = HttpOutput::new(HttpOutputConfig::new("http://127.0.0.1").with_port(8080))?;
//! output
//!     .publish_events(&NoopSignaler, &PublishOptions::new(), events)
//!     .await?;
//! ```

pub mod http;

pub use http::{HttpOutput, MARKER_HEADER};

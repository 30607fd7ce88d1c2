//! # httpout
//!
//! An HTTP event sink. Batches of JSON events are enriched with custom fields,
//! optionally wrapped in an operator-defined envelope (a *capsule*) and
//! POSTed as one JSON document to a configured endpoint.
//!
//! ## Capsules
//!
//! A capsule is an arbitrary JSON template. Every string in it that equals
//! the configured signature is replaced by the JSON array of the batch:
//!
//! ```text
//! capsule:   {"type": "batch", "payload": "EVENTS"}     signature: "EVENTS"
//! batch:     [{"a": 1}, {"a": 2}]
//! body:      {"type": "batch", "payload": [{"a": 1}, {"a": 2}]}
//! ```
//!
//! Without a capsule the body is the batch array itself.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use httpout::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = HttpOutputConfig::new("http://collector.local")
//!         .with_port(9200)
//!         .with_header("Authorization", "Bearer token")
//!         .with_capsule(Capsule::from(json!({"payload": "EVENTS"})), "EVENTS");
//!
//!     let output = HttpOutput::new(config)?;
//!     let event = json!({"message": "hello"}).as_object().cloned().unwrap();
//!
//!     output
//!         .publish_event(&NoopSignaler, &PublishOptions::new(), event)
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: load `httpout.toml` (default)
//! - `yaml-config`: load `httpout.yaml`
//! - `json-log`: JSON log lines

pub use httpout_core as core;
pub use httpout_runtime as runtime;
pub use httpout_transport as transport;

pub use httpout_core::{
    Capsule, ConfigurationError, Event, HttpOutputConfig, Outputer, PublishError,
    PublishOptions, Signaler, StatusPolicy,
};
pub use httpout_runtime::{
    ConfigLoader, HttpoutConfig, OutputRegistry, RuntimeError, load_config, logging,
};
pub use httpout_transport::HttpOutput;

/// Prelude module for convenient imports.
pub mod prelude {
    // Configuration and construction
    pub use httpout_core::{Capsule, Event, HttpOutputConfig, StatusPolicy};
    pub use httpout_transport::HttpOutput;

    // Publishing
    pub use httpout_core::{
        ChannelSignaler, NoopSignaler, Outputer, PublishError, PublishOptions, SignalOutcome,
        Signaler,
    };

    // Runtime
    pub use httpout_runtime::{ConfigLoader, HttpoutConfig, OutputRegistry, load_config, logging};
}

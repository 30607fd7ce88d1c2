//! # httpout Core
//!
//! Core building blocks for the httpout event sink.
//!
//! ## Modules
//!
//! - **Events**: JSON-object event records and custom field merging ([`Event`])
//! - **Capsules**: operator-defined envelope templates and signature
//!   substitution ([`Capsule`])
//! - **Output contract**: what the ingestion pipeline calls ([`Outputer`],
//!   [`Signaler`], [`PublishOptions`])
//! - **Configuration**: per-output settings ([`HttpOutputConfig`])
//!
//! ## Publish Flow
//!
//! ```text
//! ┌───────────┐  events  ┌──────────┐ capsule? ┌────────────┐  JSON  ┌───────────┐
//! │ Ingestion │─────────▶│ Outputer │─────────▶│ substitute │───────▶│ HTTP POST │
//! └───────────┘          └──────────┘          └────────────┘        └───────────┘
//!       ▲                                                                  │
//!       └──────────────────── Signaler (completed / failed) ◀──────────────┘
//! ```

pub mod capsule;
pub mod config;
pub mod error;
pub mod event;
pub mod output;

pub use capsule::{Capsule, Scalar};
pub use config::{HttpOutputConfig, StatusPolicy};
pub use error::{ConfigurationError, ConfigurationResult, PublishError, PublishResult};
pub use event::{Event, batch_value, merge_fields};
pub use output::{
    BoxedOutputer, ChannelSignaler, NoopSignaler, Outputer, PublishOptions, SignalOutcome,
    Signaler,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::{
        Capsule, Event, HttpOutputConfig, NoopSignaler, Outputer, PublishError, PublishOptions,
        Signaler,
    };
}

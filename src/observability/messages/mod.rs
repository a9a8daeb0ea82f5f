// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging and tracing.
//!
//! Each message type implements:
//!
//! * `Display` - human-readable output (supports future i18n)
//! * [`StructuredLog`] - machine-readable fields + span creation
//!
//! # Usage
//!
//! ```rust
//! use graphmill::observability::messages::{StructuredLog, graph::RunStarted};
//!
//! let msg = RunStarted { target_count: 1, node_count: 5 };
//!
//! // Human-readable only:
//! tracing::info!("{}", msg);
//!
//! // Message plus structured fields at the type's own level:
//! msg.log();
//! ```

pub mod graph;
pub mod node;
pub mod persistence;

use tracing::Span;

/// Trait for messages that support structured logging and tracing.
///
/// `log()` emits the human-readable message together with machine-readable
/// fields at the level matching the message's semantic meaning; `span()`
/// creates a tracing span carrying the same fields as attributes.
pub trait StructuredLog {
    /// Emit a log event with structured fields.
    fn log(&self);

    /// Create a span with this message's fields as attributes.
    fn span(&self, name: &str) -> Span;
}

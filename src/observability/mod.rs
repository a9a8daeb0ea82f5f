// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Centralized message types for all diagnostic and operational logging in
//! the engine. Message types follow a struct-based pattern with `Display`
//! implementations to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Enable future internationalization without code changes
//! * Provide consistent, structured logging output
//!
//! Messages are organized by subsystem:
//! * `messages::graph` - run and batch lifecycle events
//! * `messages::node` - staleness decisions, overrides, resource release
//! * `messages::persistence` - state file save and load events

pub mod messages;

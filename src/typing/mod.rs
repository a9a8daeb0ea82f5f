// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Runtime type checking for processor arguments.
//!
//! Node inputs and outputs are plain JSON values, so static types cannot
//! protect the seams between processors. This module provides the runtime
//! counterpart: [`TypeSpec`] describes an expected shape, [`matches`] checks
//! a value against it, and [`Signature`] bundles the per-argument specs a
//! processor declares for its `process` call.

mod signature;
mod type_spec;

pub use signature::{Param, Signature, TypeMismatch};
pub use type_spec::{matches, TypeSpec};

/// The named-argument bag handed to `Processor::process`.
pub type ArgMap = serde_json::Map<String, serde_json::Value>;

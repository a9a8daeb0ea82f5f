// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // pipeline definitions + processor registry
pub mod errors;     // error handling
pub mod flow;       // incremental graph engine
pub mod observability;
pub mod processors; // engine-provided processors
pub mod traits;     // unified abstractions
pub mod typing;     // runtime type checks

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod processor;

pub use processor::{Processor, ProcessorFactory, ProcessorSpec};

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod flow;
mod validation;

pub use flow::FlowError;
pub use validation::ValidationError;

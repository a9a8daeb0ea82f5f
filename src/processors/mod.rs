// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Engine-provided processors.
//!
//! `Constant` and `Function` lift plain values and closures into the graph
//! without a bespoke processor type. `ChangeCase` and `Sum` are small local
//! processors used by the default registry and the runner binary.

mod change_case;
mod constant;
mod function;
mod sum;

pub use change_case::ChangeCase;
pub use constant::Constant;
pub use function::Function;
pub use sum::Sum;

// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Built-in work bodies.

mod fn_filter;
mod identity;
mod joiners;
mod splitters;

pub use fn_filter::FnFilter;
pub use identity::Identity;
pub use joiners::RoundrobinJoiner;
pub use splitters::{DuplicateSplitter, RoundrobinSplitter};

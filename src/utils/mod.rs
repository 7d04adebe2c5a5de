// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod isolation;

pub use isolation::{call_isolated, describe_panic};

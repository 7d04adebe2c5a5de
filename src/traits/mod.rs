// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod instrumentable;
pub mod module;
pub mod source;

pub use instrumentable::Instrumentable;
pub use module::Module;
pub use source::{SampleBuffer, SampleSource};

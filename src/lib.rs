// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod binding;       // tap menu + view selection
pub mod chain;         // processing chain host
pub mod config;        // config + chain builder
pub mod errors;        // error handling
pub mod modules;       // concrete processing modules
pub mod observability;
pub mod source;        // sample sources
pub mod tap;           // tap identity, payloads, registry
pub mod traits;        // unified abstractions
pub mod utils;

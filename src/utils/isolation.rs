// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Run a collaborator callback so that neither an `Err` nor a panic escapes.
///
/// Returns the failure as a human-readable reason. Used wherever the producer
/// thread hands data to code it does not own.
///
/// # Example
/// ```rust
/// use tapline::utils::call_isolated;
///
/// let reason = call_isolated(|| -> anyhow::Result<()> { panic!("boom") }).unwrap_err();
/// assert_eq!(reason, "panicked: boom");
/// ```
pub fn call_isolated<F>(callback: F) -> Result<(), String>
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(error.to_string()),
        Err(panic) => Err(describe_panic(panic.as_ref())),
    }
}

pub fn describe_panic(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}

//! Read-only views over a loaded dataset.

pub mod daily_frame;
pub mod error;
pub mod patterns;

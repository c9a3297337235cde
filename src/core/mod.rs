//! Core types shared by every vndr component.
//!
//! - [`error`]: the [`VndrError`] taxonomy and user-facing [`ErrorContext`]
//! - [`warnings`]: the per-run [`Warnings`] collector used by `--strict`

pub mod error;
pub mod warnings;

pub use error::{ErrorContext, VndrError, user_friendly_error};
pub use warnings::Warnings;

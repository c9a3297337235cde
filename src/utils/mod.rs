//! Cross-cutting utilities.

pub mod fs;

pub use fs::{atomic_write, ensure_dir, remove_dir_all, slash_relative};

//! Version range matching and selection
//!
//! This module provides:
//! - The npm range grammar (`Range`)
//! - Picking the manifest a specifier resolves to from a packument

mod pick;
mod range;

pub use pick::{pick, LATEST_TAG};
pub use range::{precedence, Range};

//! Employee records and their performance entries.

pub mod handlers;
pub mod hiring;

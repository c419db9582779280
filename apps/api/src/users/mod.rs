//! Account administration API.

pub mod handlers;

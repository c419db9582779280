//! Candidate applications to job postings.
//!
//! A user may apply to the same job more than once; repeats are accepted and
//! logged.

pub mod handlers;

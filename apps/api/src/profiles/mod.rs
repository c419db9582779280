//! Candidate profiles and their work experience.

pub mod handlers;

//! Job postings. Reads are public; every posting needs a title.

pub mod handlers;

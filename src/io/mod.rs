//! File export of projection results.

pub mod export;

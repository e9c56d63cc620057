//! Flutter bridge for the LearnHub core.

pub mod api;

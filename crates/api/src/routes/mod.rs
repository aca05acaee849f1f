//! Route Handlers

pub mod estimates;
pub mod feedback;
pub mod fields;

//! Route handlers

pub mod alerts;
pub mod events;
pub mod subjects;

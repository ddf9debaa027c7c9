//! Command implementations

pub mod batch;
pub mod convert;
pub mod info;

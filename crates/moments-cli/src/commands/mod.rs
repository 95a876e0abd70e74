//! Command handlers

pub mod config;
pub mod export;
pub mod moment;
pub mod status;

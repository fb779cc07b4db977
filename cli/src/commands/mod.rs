//! Command implementations

pub mod action;
pub mod config;
pub mod logs;
pub mod status;
pub mod version;

//! Command handlers

pub mod bookmark;
pub mod config;
pub mod settings;
pub mod status;
pub mod tag;
pub mod transfer;

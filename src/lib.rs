pub mod config;
pub mod error;
pub mod fs_util;
pub mod gateway;
pub mod memory;
pub mod relay;
pub mod types;
pub mod upload;

pub mod commands;
pub mod config;
pub mod error;
pub mod formatting;
pub mod id_management;

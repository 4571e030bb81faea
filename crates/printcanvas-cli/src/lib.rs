//! PrintCanvas CLI: render, export and check saved design documents.

pub mod cli;
pub mod commands;
pub mod resolver;

// Module exports for models
// Plain data shared by the selection, collapse and reconciliation services

pub mod cell;
pub mod recurring;
pub mod settings;
pub mod timespan;

// Tutor Availability Library
// Grid selection, collapsing and timezone reconciliation for availability editing

pub mod error;
pub mod models;
pub mod services;
pub mod utils;

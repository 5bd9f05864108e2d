// Service module exports

pub mod cell_index;
pub mod collapse;
pub mod editor;
pub mod gesture;
pub mod grid;
pub mod recurring;
pub mod replay;
pub mod selection;
pub mod settings;
pub mod timezone;

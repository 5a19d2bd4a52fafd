pub mod clipboard;
pub mod controller;
pub mod state;
pub mod transition;

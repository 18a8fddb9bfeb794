pub mod config;
pub mod convert;

pub use crate::utils::tui::create_spinner;

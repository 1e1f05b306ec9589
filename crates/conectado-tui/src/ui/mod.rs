//! Terminal UI module using ratatui.
//!
//! - `render`: Frame layout, login screen, header, status bar and overlays
//! - `dashboard`: Summary cards, charts and the school list
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling

pub mod dashboard;
pub mod input;
pub mod render;
pub mod styles;

//! Reusable widgets.

pub mod context_menu;

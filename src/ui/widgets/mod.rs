// src/ui/widgets/mod.rs

pub mod footer;  // Key hints for the current state.
pub mod input;   // Target and port boxes.
pub mod results; // Content of the focused tab.
pub mod tabs;    // Tab bar with a status marker per category.

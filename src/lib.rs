//! zen-timer library - water-level session timer overlay

pub mod audio;
pub mod cli;
pub mod controller;
pub mod params;
pub mod pidfile;
pub mod rendering;
pub mod session;
pub mod water;

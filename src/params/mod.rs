//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Physical units (seconds, Hz, points)
//! - Documented ranges and meanings

mod audio;
mod render;
mod session;

// Re-export all types
pub use audio::{BowlConfig, Harmonic};
pub use render::{OverlayStyle, Rgb};
pub use session::{SessionConfig, DEFAULT_MINUTES};

//! SVG chart rendering.
//!
//! Rendering is purely a consumer of pipeline outputs; nothing here feeds
//! back into fitting or regression.

pub mod charts;
pub mod framework;

pub use charts::*;
pub use framework::*;

//! VisionX Media single-page site.
//!
//! Everything but `frontend` also builds natively, so the scroll spy and the
//! growth counter are tested without a browser.

pub mod config;
pub mod counter;
pub mod format;
#[cfg(target_arch = "wasm32")]
pub mod frontend;
pub mod links;
pub mod logging;
pub mod scroll_spy;
pub mod section;

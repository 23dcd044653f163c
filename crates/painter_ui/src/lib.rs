//! # Painter UI
//!
//! The window side of Painter.
//!
//! ```text
//!   window events ──> [Display Thread: Viewer] ──post──> Execution Loop
//!                            ^                               │
//!                            └──── ChannelPresenter <────────┘
//!                                   (bounded, try_send)
//! ```
//!
//! The execution loop presents frames through a [`ChannelPresenter`]; the
//! [`DisplayThread`] receives them, scales them to the window and publishes
//! them to a [`Surface`]. Right-clicks travel the other way as operations.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod display;
pub mod input;
pub mod presenter;
pub mod surface;
pub mod viewer;

pub use display::DisplayThread;
pub use input::{Key, MouseButton, ViewerEvent};
pub use presenter::{ChannelPresenter, DroppedFrames};
pub use surface::{MemorySurface, Surface};
pub use viewer::{placeholder, Viewer, ViewerControl, ViewerStats};

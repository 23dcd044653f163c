//! # Painter
//!
//! A minimal scripted drawing tool built on a single-consumer execution loop.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ painter_lang │───>│ painter_core │───>│  painter_ui  │
//! │   (parse)    │    │ (queue+loop) │    │  (display)   │
//! └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! This crate re-exports the three layers and adds what the command-line
//! tool needs: logging setup, PNG output and a session runner.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod logging;
pub mod png;
pub mod session;

pub use painter_core;
pub use painter_lang;
pub use painter_ui;

pub use png::PngSurface;
pub use session::{parse_script, run, ParseMode, SessionReport};

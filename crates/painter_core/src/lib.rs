//! # Painter Core
//!
//! The operation queue and execution loop behind the Painter drawing tool.
//!
//! ## Architecture
//!
//! ```text
//!   Parser   ──┐
//!   Viewer   ──┼──> [OperationQueue] ──> [Execution Loop Thread] ──> Presenter
//!   Script N ──┘    (unbounded FIFO)     (owns Canvas + Frame)
//! ```
//!
//! Any number of producers post [`Operation`]s. Exactly one thread pops them
//! and applies them to the [`CanvasState`] and the [`Frame`] it owns. Nothing
//! else ever touches the canvas, so the canvas itself needs no lock.
//!
//! ## Example
//!
//! ```rust,ignore
//! use painter_core::{ExecutionLoop, FillOperation, PainterConfig, UpdateOperation, Color};
//!
//! let lp = ExecutionLoop::start(&PainterConfig::default(), presenter)?;
//! lp.post(FillOperation::new(Color::GREEN))?;
//! lp.post(UpdateOperation)?;
//! let stats = lp.stop_and_wait()?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod canvas;
pub mod color;
pub mod config;
pub mod error;
pub mod exec;
pub mod frame;
pub mod operation;
pub mod queue;

pub use canvas::{CanvasState, Cross, Point, Rect};
pub use color::Color;
pub use config::{CanvasConfig, CrossConfig, DisplayConfig, PainterConfig};
pub use error::{PainterError, PainterResult};
pub use exec::{ExecutionLoop, FnPresenter, LoopHandle, LoopState, LoopStats, Presenter};
pub use frame::Frame;
pub use operation::{
    scale_coords, CompositeOperation, FillOperation, FnOperation, Operation, ShapeOperation,
    Task, UpdateOperation,
};
pub use queue::OperationQueue;

#![warn(missing_docs)]

//! STEP file reading for stepmesh.
//!
//! Parses ISO 10303-21 exchange files (AP203/AP214) and extracts the faces of
//! every solid and shell as a [`StepShape`]: surface geometry plus boundary
//! loops, ready for tessellation.
//!
//! # Example
//!
//! ```no_run
//! use stepmesh_step::read_step;
//!
//! let shape = read_step("model.step").unwrap();
//! println!("{} faces", shape.face_count());
//! ```

mod error;
mod lexer;
mod parser;
mod reader;
mod shape;

pub mod entities;

pub use entities::{
    AxisPlacement, BoundaryLoop, Circle, EdgeGeometry, LoopSegment, ShapeFace, SurfaceKind,
};
pub use error::StepError;
pub use parser::{Parser, Record, StepEntity, StepFile, StepValue};
pub use reader::{read_step, read_step_from_buffer};
pub use shape::{Body, BodyKind, StepShape};

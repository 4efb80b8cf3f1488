#![warn(missing_docs)]

//! Deterministic 2D ray tracing for the lightbench optics engine.
//!
//! A [`Scene`] is built from a validated
//! [`SceneDocument`](lightbench_ir::SceneDocument), rays are emitted from its
//! sources, and each ray is walked through the bounce loop until it
//! terminates.
//!
//! # Architecture
//!
//! - [`scene`] - Resolved, validated scene elements with rigid poses
//! - [`emit`] - Ray generation for point and collimated sources
//! - [`intersect`] - Per-element intersection in local frames, nearest-hit selection
//! - [`interact`] - Reflection and refraction rules per element kind
//! - [`tracer`] - The bounce-loop state machine and parallel scene tracing
//!
//! # Example
//!
//! ```ignore
//! use lightbench_ir::SceneDocument;
//! use lightbench_trace::{trace_scene, Scene};
//!
//! let doc = SceneDocument::from_json(&json)?;
//! let scene = Scene::from_document(&doc)?;
//! let output = trace_scene(&scene);
//! for traced in &output.rays {
//!     println!("{:?}", traced.ray.terminal_reason);
//! }
//! ```

mod error;
mod ray;

pub mod emit;
pub mod interact;
pub mod intersect;
pub mod scene;
pub mod tracer;

pub use emit::emit_rays;
pub use error::{Result, SceneError};
pub use intersect::{nearest_intersection, ElementRef, Intersection};
pub use ray::{Ray, TerminalReason};
pub use scene::{ConicMirror, Lens, LensModel, LineSensor, Scene, Settings, Source};
pub use tracer::{step, trace_ray, trace_scene, TraceOutput, TraceState, TracedRay};

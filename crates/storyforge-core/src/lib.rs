//! # storyforge-core
//!
//! Core types and primitives for the Storyforge storyboard engine.
//! This crate contains foundational types shared across all Storyforge crates:
//! easing functions, command colours, vectors, layers, content hashes,
//! configuration, diagnostics, and error types.

pub mod cancel;
pub mod color;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod hash;
pub mod math;
pub mod types;

pub use config::*;

pub use cancel::CancellationToken;
pub use color::CommandColor;
pub use diagnostic::{Diagnostic, DiagnosticSeverity};
pub use error::{StoryError, StoryResult};
pub use hash::ContentHash;
pub use math::Vec2;
pub use types::{Easing, ExportTarget, Layer, LogLevel, LoopType, Origin};

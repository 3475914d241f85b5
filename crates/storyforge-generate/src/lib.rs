//! # storyforge-generate
//!
//! The generation pipeline. A [`Generator`] runs every script, merges and
//! orders their groups into an element stream, passes the stream through
//! its registered [`GenerationStep`]s and hands the result to an encoder.
//! [`Project`] wires a generator up from a `storyforge.toml` project
//! directory.

pub mod asset_cache;
pub mod generator;
pub mod project;
pub mod step;
pub mod steps;

pub use asset_cache::{AssetCache, CacheEntry};
pub use generator::{GenerationResult, Generator};
pub use project::Project;
pub use step::{GenerationStep, StepContext};
pub use steps::{
    DropNonFinite, FilterByTarget, FilterByVisibility, MaterializeAssets, RoundPrecision,
    WidescreenOffset,
};

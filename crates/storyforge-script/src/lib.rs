//! # storyforge-script
//!
//! The script contract and everything a script can reach while it runs:
//! the execution context, host capabilities (files, generated assets,
//! beatmap timing, logging), the shared variable registry, the parallel
//! script runner, and the Rhai language host.

pub mod asset;
pub mod beatmap;
pub mod capability;
pub mod context;
pub mod rhai_host;
pub mod runner;
pub mod script;
pub mod variables;

pub use asset::{asset_token, token_name, AssetDescriptor, AssetProvider, AssetRegistry};
pub use beatmap::{Beatmap, TimingPoint, Waveform};
pub use capability::{Capabilities, FileProvider, LogEntry, ProjectFiles, ScriptLogger, TracingLogger};
pub use context::{ScriptContext, ScriptOutput};
pub use rhai_host::RhaiScript;
pub use runner::{RunOptions, RunOutput, ScriptManager, ScriptOutcome};
pub use script::{FnScript, Script};
pub use variables::{ScriptFunction, ScriptVariable, VariableRegistry};

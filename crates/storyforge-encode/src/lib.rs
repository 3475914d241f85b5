//! # storyforge-encode
//!
//! Encoders turn the final ordered [`ElementStream`] into output. The
//! [`OsbEncoder`] writes the line-oriented `[Events]` text the game reads;
//! the [`SceneGraphEncoder`] builds an in-memory per-layer graph for live
//! preview. Both preserve the stream's ordering.

pub mod format;
pub mod osb;
pub mod scene;

pub use osb::OsbEncoder;
pub use scene::{SceneElement, SceneGraph, SceneGraphEncoder, SceneLayer};

use storyforge_core::StoryResult;
use storyforge_ir::{ElementStream, GroupSet};

/// Serializes a finished element stream.
pub trait StoryboardEncoder {
    type Output;

    /// `groups` is the group set the stream's group positions refer to.
    fn encode(&self, stream: &ElementStream, groups: &GroupSet) -> StoryResult<Self::Output>;
}

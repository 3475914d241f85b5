use storyforge_core::{Diagnostic, StoryResult};
use storyforge_ir::{ElementStream, GroupSet};

/// Shared state handed to every step of one generation run.
#[derive(Debug)]
pub struct StepContext<'a> {
    /// Merged groups; stream entries refer to them by position.
    pub groups: &'a GroupSet,
    pub diagnostics: Vec<Diagnostic>,
    pub assets_generated: usize,
    pub assets_reused: usize,
}

impl<'a> StepContext<'a> {
    pub fn new(groups: &'a GroupSet) -> Self {
        Self {
            groups,
            diagnostics: Vec::new(),
            assets_generated: 0,
            assets_reused: 0,
        }
    }

    /// Name of the group at `position`, or an empty string.
    pub fn group_name(&self, position: usize) -> &str {
        self.groups
            .by_index(position)
            .map(|g| g.name.as_str())
            .unwrap_or_default()
    }

    pub fn warn(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(source = %diagnostic.source, "{}", diagnostic.message);
        self.diagnostics.push(diagnostic);
    }
}

/// A transformation over the ordered element stream.
///
/// Steps run in registration order. Malformed elements are dropped with a
/// diagnostic; an `Err` aborts the whole run and is reserved for failures
/// outside any single element.
pub trait GenerationStep: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, stream: &mut ElementStream, ctx: &mut StepContext<'_>) -> StoryResult<()>;
}

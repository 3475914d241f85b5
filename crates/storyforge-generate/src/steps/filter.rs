use storyforge_core::{ExportTarget, StoryResult};
use storyforge_ir::ElementStream;

use crate::step::{GenerationStep, StepContext};

/// Keeps only elements whose group exports to `target`. With no target
/// every element is kept. The run's video is never filtered.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterByTarget {
    pub target: Option<ExportTarget>,
}

impl FilterByTarget {
    pub fn new(target: Option<ExportTarget>) -> Self {
        Self { target }
    }
}

impl GenerationStep for FilterByTarget {
    fn name(&self) -> &str {
        "filter-by-target"
    }

    fn apply(&self, stream: &mut ElementStream, ctx: &mut StepContext<'_>) -> StoryResult<()> {
        let Some(target) = self.target else {
            return Ok(());
        };
        let before = stream.len();
        let groups = ctx.groups;
        stream.retain(|entry| {
            groups
                .by_index(entry.group)
                .is_some_and(|g| g.export_target == target)
        });
        tracing::debug!(target = ?target, dropped = before - stream.len(), "filtered by export target");
        Ok(())
    }
}

/// Drops elements of hidden groups unless `include_hidden` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterByVisibility {
    pub include_hidden: bool,
}

impl FilterByVisibility {
    pub fn new(include_hidden: bool) -> Self {
        Self { include_hidden }
    }
}

impl GenerationStep for FilterByVisibility {
    fn name(&self) -> &str {
        "filter-by-visibility"
    }

    fn apply(&self, stream: &mut ElementStream, ctx: &mut StepContext<'_>) -> StoryResult<()> {
        if self.include_hidden {
            return Ok(());
        }
        let groups = ctx.groups;
        stream.retain(|entry| groups.by_index(entry.group).map_or(true, |g| g.visible));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyforge_ir::GroupSet;

    fn groups() -> GroupSet {
        let mut groups = GroupSet::new();
        groups.get_or_create("Story").create_sprite("story.png");
        let diff = groups.get_or_create("Diff");
        diff.export_target = ExportTarget::Difficulty;
        diff.create_sprite("diff.png");
        let hidden = groups.get_or_create("Hidden");
        hidden.visible = false;
        hidden.create_sprite("hidden.png");
        groups
    }

    fn paths(stream: &ElementStream) -> Vec<&str> {
        stream.entries.iter().map(|e| e.element.path()).collect()
    }

    #[test]
    fn test_filter_by_target() {
        let groups = groups();
        let mut stream = ElementStream::build(&groups, None);
        let mut ctx = StepContext::new(&groups);
        FilterByTarget::new(Some(ExportTarget::Difficulty))
            .apply(&mut stream, &mut ctx)
            .unwrap();
        assert_eq!(paths(&stream), vec!["diff.png"]);

        let mut stream = ElementStream::build(&groups, None);
        FilterByTarget::new(None).apply(&mut stream, &mut ctx).unwrap();
        assert_eq!(stream.len(), 3);
    }

    #[test]
    fn test_filter_by_visibility() {
        let groups = groups();
        let mut stream = ElementStream::build(&groups, None);
        let mut ctx = StepContext::new(&groups);
        FilterByVisibility::new(false).apply(&mut stream, &mut ctx).unwrap();
        assert_eq!(paths(&stream), vec!["story.png", "diff.png"]);

        let mut stream = ElementStream::build(&groups, None);
        FilterByVisibility::new(true).apply(&mut stream, &mut ctx).unwrap();
        assert_eq!(stream.len(), 3);
    }
}

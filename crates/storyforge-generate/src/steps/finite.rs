use storyforge_core::{Diagnostic, StoryResult};
use storyforge_ir::ElementStream;

use crate::step::{GenerationStep, StepContext};

/// Drops elements carrying NaN or infinite numbers, and a video with a
/// non-finite offset. Each drop is reported as a warning diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropNonFinite;

impl DropNonFinite {
    pub fn new() -> Self {
        Self
    }
}

impl GenerationStep for DropNonFinite {
    fn name(&self) -> &str {
        "drop-non-finite"
    }

    fn apply(&self, stream: &mut ElementStream, ctx: &mut StepContext<'_>) -> StoryResult<()> {
        if stream.video.as_ref().is_some_and(|v| !v.offset.is_finite()) {
            if let Some(video) = stream.video.take() {
                ctx.warn(Diagnostic::warning(
                    self.name(),
                    format!("dropped video '{}': offset {} is not finite", video.path, video.offset),
                ));
            }
        }

        let malformed: Vec<(usize, String)> = stream
            .entries
            .iter()
            .filter(|e| !e.element.is_finite())
            .map(|e| (e.group, e.element.path().to_string()))
            .collect();
        if malformed.is_empty() {
            return Ok(());
        }

        for (group, path) in &malformed {
            let group = ctx.group_name(*group).to_string();
            ctx.warn(
                Diagnostic::warning(self.name(), format!("dropped element '{path}': non-finite number"))
                    .in_group(group),
            );
        }
        stream.retain(|e| e.element.is_finite());
        tracing::debug!(dropped = malformed.len(), "dropped non-finite elements");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyforge_core::{Layer, Origin, Vec2};
    use storyforge_ir::{GroupSet, Video};

    #[test]
    fn test_non_finite_elements_dropped_with_diagnostic() {
        let mut groups = GroupSet::new();
        let group = groups.get_or_create("G");
        group
            .create_sprite_at("far.png", Layer::Background, Origin::Centre, Vec2::new(f64::INFINITY, 0.0))
            .fade(0.0, 100.0, 0.0, 1.0)
            .unwrap();
        group.create_sprite("ok.png").fade(0.0, 100.0, 0.0, 1.0).unwrap();
        group.create_sample("hit.wav", f64::NAN, 50.0, Layer::Background);

        let mut stream = ElementStream::build(&groups, Some(Video::new("bg.mp4", f64::NAN)));
        let mut ctx = StepContext::new(&groups);
        DropNonFinite::new().apply(&mut stream, &mut ctx).unwrap();

        let paths: Vec<_> = stream.entries.iter().map(|e| e.element.path()).collect();
        assert_eq!(paths, vec!["ok.png"]);
        assert!(stream.video.is_none());
        assert_eq!(ctx.diagnostics.len(), 3);
        assert!(ctx.diagnostics[1..]
            .iter()
            .all(|d| d.group.as_deref() == Some("G")));
    }

    #[test]
    fn test_finite_stream_untouched() {
        let mut groups = GroupSet::new();
        groups.get_or_create("G").create_sprite("a.png").fade_at(0.0, 1.0).unwrap();
        let mut stream = ElementStream::build(&groups, Some(Video::new("bg.mp4", 0.0)));
        let before = stream.clone();
        let mut ctx = StepContext::new(&groups);
        DropNonFinite::new().apply(&mut stream, &mut ctx).unwrap();
        assert_eq!(stream, before);
        assert!(ctx.diagnostics.is_empty());
    }
}

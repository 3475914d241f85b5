use crate::element::ScriptElement;
use crate::group::GroupSet;
use crate::stream::ElementStream;
use storyforge_core::Diagnostic;

const SOURCE: &str = "validate";

/// Check an element stream for suspicious but non-fatal content.
pub fn validate_stream(stream: &ElementStream, groups: &GroupSet) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if let Some(video) = &stream.video {
        if video.path.trim().is_empty() {
            diagnostics.push(Diagnostic::warning(SOURCE, "video has an empty path"));
        }
    }

    for entry in &stream.entries {
        let group_name = groups
            .by_index(entry.group)
            .map(|g| g.name.clone())
            .unwrap_or_default();

        if entry.element.path().trim().is_empty() {
            diagnostics.push(
                Diagnostic::warning(SOURCE, "element has an empty path").in_group(&group_name),
            );
        }

        let Some(sprite) = entry.element.sprite() else {
            continue;
        };
        let kind = match entry.element {
            ScriptElement::Animation(_) => "animation",
            _ => "sprite",
        };
        if sprite.command_count() == 0 {
            diagnostics.push(
                Diagnostic::warning(SOURCE, format!("{kind} '{}' has no commands", sprite.path))
                    .in_group(&group_name),
            );
        }
        if sprite.has_open_scope() {
            diagnostics.push(
                Diagnostic::warning(
                    SOURCE,
                    format!("{kind} '{}' has a loop or trigger group that was never ended", sprite.path),
                )
                .in_group(&group_name),
            );
        }
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Video;

    #[test]
    fn test_clean_stream_has_no_diagnostics() {
        let mut groups = GroupSet::new();
        groups
            .get_or_create("G")
            .create_sprite("a.png")
            .fade_at(0.0, 1.0)
            .unwrap();
        let stream = ElementStream::build(&groups, Some(Video::new("bg.mp4", 0.0)));
        assert!(validate_stream(&stream, &groups).is_empty());
    }

    #[test]
    fn test_reports_empty_and_unbalanced_sprites() {
        let mut groups = GroupSet::new();
        let group = groups.get_or_create("Intro");
        group.create_sprite("empty.png");
        group
            .create_sprite("open.png")
            .start_loop_group(0.0, 2)
            .unwrap()
            .fade(0.0, 10.0, 0.0, 1.0)
            .unwrap();

        let stream = ElementStream::build(&groups, None);
        let diagnostics = validate_stream(&stream, &groups);
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics[0].message.contains("no commands"));
        assert!(diagnostics[1].message.contains("never ended"));
        assert_eq!(diagnostics[1].group.as_deref(), Some("Intro"));
    }
}

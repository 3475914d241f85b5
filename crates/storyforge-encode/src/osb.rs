use std::path::Path;

use storyforge_core::{Layer, StoryError, StoryResult, Vec2};
use storyforge_ir::{
    Animation, CommandValue, ElementStream, GroupSet, LoopScope, Sample, ScriptElement, Sprite,
    Timeline, TimelineGroup, TriggerScope, Video,
};

use crate::format::{time, value};
use crate::StoryboardEncoder;

/// Writes the storyboard `[Events]` section.
///
/// ```text
/// [Events]
/// //Background and Video events
/// Video,-200,"bg.mp4"
/// //Storyboard Layer 0 (Background)
/// Sprite,Background,TopLeft,"test.png",0,0
///  F,0,0,100,0,1
///  L,1000,4
///   R,0,0,500,0,6.28
/// //Storyboard Layer 1 (Fail)
/// ...
/// //Storyboard Sound Samples
/// Sample,1000,0,"hit.wav",60
/// ```
#[derive(Debug, Clone, Default)]
pub struct OsbEncoder;

impl OsbEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode and write to `path`, creating parent directories.
    pub fn write_file(&self, stream: &ElementStream, groups: &GroupSet, path: &Path) -> StoryResult<()> {
        let text = self.encode(stream, groups)?;
        Self::write_text(&text, path)
    }

    /// Write already encoded storyboard text to `path`, creating parent
    /// directories.
    pub fn write_text(text: &str, path: &Path) -> StoryResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, text)
            .map_err(|e| StoryError::Encode(format!("failed to write {}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), bytes = text.len(), "wrote storyboard");
        Ok(())
    }
}

impl StoryboardEncoder for OsbEncoder {
    type Output = String;

    fn encode(&self, stream: &ElementStream, groups: &GroupSet) -> StoryResult<String> {
        let mut out = Lines::default();
        out.push(0, "[Events]");
        out.push(0, "//Background and Video events");
        if let Some(video) = &stream.video {
            write_video(&mut out, video);
        }

        for layer in Layer::ALL {
            out.push(0, format!("//Storyboard Layer {} ({})", layer.index(), layer.osb_name()));
            for entry in stream.layer(layer) {
                match &entry.element {
                    ScriptElement::Sprite(sprite) => write_sprite(&mut out, sprite),
                    ScriptElement::Animation(animation) => write_animation(&mut out, animation),
                    ScriptElement::Sample(_) => {}
                }
            }
        }

        out.push(0, "//Storyboard Sound Samples");
        for entry in &stream.entries {
            if let ScriptElement::Sample(sample) = &entry.element {
                write_sample(&mut out, sample);
            }
        }

        tracing::debug!(
            groups = groups.len(),
            elements = stream.len(),
            lines = out.count,
            "encoded storyboard text"
        );
        Ok(out.text)
    }
}

#[derive(Default)]
struct Lines {
    text: String,
    count: usize,
}

impl Lines {
    fn push(&mut self, depth: usize, line: impl AsRef<str>) {
        for _ in 0..depth {
            self.text.push(' ');
        }
        self.text.push_str(line.as_ref());
        self.text.push('\n');
        self.count += 1;
    }
}

fn position(p: Vec2) -> String {
    format!("{},{}", value(p.x), value(p.y))
}

fn write_video(out: &mut Lines, video: &Video) {
    out.push(0, format!("Video,{},\"{}\"", time(video.offset), video.path));
}

fn write_sample(out: &mut Lines, sample: &Sample) {
    out.push(
        0,
        format!(
            "Sample,{},{},\"{}\",{}",
            time(sample.time),
            sample.layer.index(),
            sample.path,
            value(sample.volume.round())
        ),
    );
}

fn write_sprite(out: &mut Lines, sprite: &Sprite) {
    out.push(
        0,
        format!(
            "Sprite,{},{},\"{}\",{}",
            sprite.layer.osb_name(),
            sprite.origin.osb_name(),
            sprite.path,
            position(sprite.initial_position)
        ),
    );
    write_scopes(out, sprite);
}

fn write_animation(out: &mut Lines, animation: &Animation) {
    out.push(
        0,
        format!(
            "Animation,{},{},\"{}\",{},{},{},{}",
            animation.layer.osb_name(),
            animation.origin.osb_name(),
            animation.path,
            position(animation.initial_position),
            animation.frame_count,
            value(animation.frame_delay),
            animation.loop_type.osb_name()
        ),
    );
    write_scopes(out, &animation.sprite);
}

fn write_scopes(out: &mut Lines, sprite: &Sprite) {
    write_group(out, 1, &sprite.commands);
    for scope in &sprite.loops {
        write_loop(out, scope);
    }
    for scope in &sprite.triggers {
        write_trigger(out, scope);
    }
}

fn write_loop(out: &mut Lines, scope: &LoopScope) {
    out.push(1, format!("L,{},{}", time(scope.start_time), scope.total_iterations));
    write_group(out, 2, &scope.commands);
}

fn write_trigger(out: &mut Lines, scope: &TriggerScope) {
    let mut header = format!(
        "T,{},{},{}",
        scope.trigger_name,
        time(scope.start_time),
        time(scope.end_time)
    );
    if scope.group_number != 0 {
        header.push_str(&format!(",{}", scope.group_number));
    }
    out.push(1, header);
    write_group(out, 2, &scope.commands);
}

/// Channels in emission order.
fn write_group(out: &mut Lines, depth: usize, group: &TimelineGroup) {
    write_timeline(out, depth, "M", &group.moves, |v| position(*v));
    write_timeline(out, depth, "MX", &group.move_x, |v| value(*v));
    write_timeline(out, depth, "MY", &group.move_y, |v| value(*v));
    write_timeline(out, depth, "S", &group.scale, |v| value(*v));
    write_timeline(out, depth, "R", &group.rotation, |v| value(*v));
    write_timeline(out, depth, "F", &group.opacity, |v| value(*v));
    write_timeline(out, depth, "C", &group.colour, |c| {
        let [r, g, b] = c.to_rgb8();
        format!("{r},{g},{b}")
    });
    write_timeline(out, depth, "V", &group.vector_scale, |v| position(*v));
    write_timeline(out, depth, "P", &group.flip_h, |_| "H".to_string());
    write_timeline(out, depth, "P", &group.flip_v, |_| "V".to_string());
    write_timeline(out, depth, "P", &group.additive, |_| "A".to_string());
}

/// One line per command: `code,easing,start,end,from[,to]`. The end time
/// is left empty for instants and `to` is omitted when it matches `from`.
fn write_timeline<T: CommandValue>(
    out: &mut Lines,
    depth: usize,
    code: &str,
    timeline: &Timeline<T>,
    fields: impl Fn(&T) -> String,
) {
    for command in timeline.commands() {
        let start = time(command.start_time);
        let end = time(command.end_time);
        let from = fields(&command.start_value);
        let to = fields(&command.end_value);

        let mut line = format!("{code},{},{start},", command.easing.id());
        if end != start {
            line.push_str(&end);
        }
        line.push(',');
        line.push_str(&from);
        if to != from {
            line.push(',');
            line.push_str(&to);
        }
        out.push(depth, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyforge_core::{CommandColor, Easing, LoopType, Origin};

    fn encode(groups: &GroupSet, video: Option<Video>) -> String {
        let stream = ElementStream::build(groups, video);
        OsbEncoder::new().encode(&stream, groups).unwrap()
    }

    fn body(text: &str) -> Vec<&str> {
        text.lines().filter(|l| !l.starts_with("//") && *l != "[Events]").collect()
    }

    #[test]
    fn test_section_skeleton() {
        let text = encode(&GroupSet::new(), None);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[Events]",
                "//Background and Video events",
                "//Storyboard Layer 0 (Background)",
                "//Storyboard Layer 1 (Fail)",
                "//Storyboard Layer 2 (Pass)",
                "//Storyboard Layer 3 (Foreground)",
                "//Storyboard Layer 4 (Overlay)",
                "//Storyboard Sound Samples",
            ]
        );
    }

    #[test]
    fn test_sprite_commands_in_channel_order() {
        let mut groups = GroupSet::new();
        groups
            .get_or_create("Test")
            .create_sprite("test.png")
            .additive(0.0, 1000.0)
            .unwrap()
            .fade(0.0, 100.0, 0.0, 1.0)
            .unwrap()
            .move_x(100.0, 200.0, 0.0, 320.0)
            .unwrap()
            .move_xy_eased(Easing::OutQuad, 0.0, 500.0, Vec2::new(320.0, 240.0), Vec2::new(0.0, 0.0))
            .unwrap();

        let text = encode(&groups, None);
        assert_eq!(
            body(&text),
            vec![
                "Sprite,Background,TopLeft,\"test.png\",0,0",
                " M,4,0,500,320,240,0,0",
                " MX,0,100,200,0,320",
                " F,0,0,100,0,1",
                " P,0,0,1000,A",
            ]
        );
    }

    #[test]
    fn test_instant_and_constant_shorthand() {
        let mut groups = GroupSet::new();
        groups
            .get_or_create("G")
            .create_sprite_at("a.png", Layer::Foreground, Origin::Centre, Vec2::new(320.0, 240.5))
            .scale_at(250.0, 0.5)
            .unwrap()
            .colour(0.0, 1000.0, CommandColor::WHITE, CommandColor::WHITE)
            .unwrap()
            .rotate(0.0, 500.0, -0.0, 1.5)
            .unwrap();

        let text = encode(&groups, None);
        assert_eq!(
            body(&text),
            vec![
                "Sprite,Foreground,Centre,\"a.png\",320,240.5",
                " S,0,250,,0.5",
                " R,0,0,500,0,1.5",
                " C,0,0,1000,255,255,255",
            ]
        );
    }

    #[test]
    fn test_loop_and_trigger_blocks() {
        let mut groups = GroupSet::new();
        let sprite = groups.get_or_create("G").create_sprite("a.png");
        sprite.fade_at(0.0, 1.0).unwrap();
        sprite.start_loop_group(1000.0, 4).unwrap();
        sprite.rotate(0.0, 500.0, 0.0, 6.28).unwrap();
        sprite.end_group().unwrap();
        sprite.start_trigger_group("HitSoundClap", 0.0, 5000.0, 0).unwrap();
        sprite.scale(0.0, 100.0, 1.0, 1.2).unwrap();
        sprite.end_group().unwrap();
        sprite.start_trigger_group("Passing", 0.0, 5000.0, 3).unwrap();
        sprite.flip_v_at(0.0).unwrap();
        sprite.end_group().unwrap();

        let text = encode(&groups, None);
        assert_eq!(
            body(&text),
            vec![
                "Sprite,Background,TopLeft,\"a.png\",0,0",
                " F,0,0,,1",
                " L,1000,4",
                "  R,0,0,500,0,6.28",
                " T,HitSoundClap,0,5000",
                "  S,0,0,100,1,1.2",
                " T,Passing,0,5000,3",
                "  P,0,0,,V",
            ]
        );
    }

    #[test]
    fn test_video_animation_and_samples() {
        let mut groups = GroupSet::new();
        let group = groups.get_or_create("G");
        group.create_sample("hit.wav", 1000.4, 60.0, Layer::Foreground);
        group
            .create_animation(
                "sb/anim.png",
                Layer::Overlay,
                Origin::BottomCentre,
                Vec2::new(10.0, 20.0),
                8,
                33.5,
                LoopType::Once,
            )
            .unwrap()
            .fade_at(0.0, 1.0)
            .unwrap();

        let text = encode(&groups, Some(Video::new("bg.mp4", -200.0)));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[2], "Video,-200,\"bg.mp4\"");
        let overlay = lines
            .iter()
            .position(|l| *l == "//Storyboard Layer 4 (Overlay)")
            .unwrap();
        assert_eq!(
            lines[overlay + 1],
            "Animation,Overlay,BottomCentre,\"sb/anim.png\",10,20,8,33.5,LoopOnce"
        );
        assert_eq!(lines.last(), Some(&"Sample,1000,3,\"hit.wav\",60"));
    }
}

use storyforge_core::math::round_to;
use storyforge_core::{ExportSettings, StoryResult, Vec2};
use storyforge_ir::{CommandValue, ElementStream, Timeline, TimelineGroup};

use crate::step::{GenerationStep, StepContext};

/// Rounds command values and initial positions to per-family decimal
/// places. Times and colours are left alone.
#[derive(Debug, Clone, Copy)]
pub struct RoundPrecision {
    pub move_precision: u32,
    pub scale_precision: u32,
    pub alpha_precision: u32,
    pub rotation_precision: u32,
}

impl RoundPrecision {
    pub fn from_settings(settings: &ExportSettings) -> Self {
        Self {
            move_precision: settings.move_precision,
            scale_precision: settings.scale_precision,
            alpha_precision: settings.alpha_precision,
            rotation_precision: settings.rotation_precision,
        }
    }

    fn round_group(&self, group: &mut TimelineGroup) {
        let (m, s, a, r) = (
            self.move_precision,
            self.scale_precision,
            self.alpha_precision,
            self.rotation_precision,
        );
        round_timeline(&mut group.moves, |v| round_vec(v, m));
        round_timeline(&mut group.move_x, |v| round_to(v, m));
        round_timeline(&mut group.move_y, |v| round_to(v, m));
        round_timeline(&mut group.scale, |v| round_to(v, s));
        round_timeline(&mut group.vector_scale, |v| round_vec(v, s));
        round_timeline(&mut group.opacity, |v| round_to(v, a));
        round_timeline(&mut group.rotation, |v| round_to(v, r));
    }
}

impl Default for RoundPrecision {
    fn default() -> Self {
        Self::from_settings(&ExportSettings::default())
    }
}

fn round_vec(v: Vec2, decimals: u32) -> Vec2 {
    Vec2::new(round_to(v.x, decimals), round_to(v.y, decimals))
}

fn round_timeline<T: CommandValue>(timeline: &mut Timeline<T>, round: impl Fn(T) -> T) {
    for command in timeline.commands_mut() {
        command.start_value = round(command.start_value);
        command.end_value = round(command.end_value);
    }
}

impl GenerationStep for RoundPrecision {
    fn name(&self) -> &str {
        "round-precision"
    }

    fn apply(&self, stream: &mut ElementStream, _ctx: &mut StepContext<'_>) -> StoryResult<()> {
        for element in stream.elements_mut() {
            let Some(sprite) = element.sprite_mut() else {
                continue;
            };
            sprite.initial_position = round_vec(sprite.initial_position, self.move_precision);
            for scope in sprite.scopes_mut() {
                self.round_group(scope);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyforge_core::{Layer, Origin};
    use storyforge_ir::GroupSet;

    fn stream() -> (GroupSet, ElementStream) {
        let mut groups = GroupSet::new();
        let sprite = groups.get_or_create("G").create_sprite_at(
            "a.png",
            Layer::Background,
            Origin::Centre,
            Vec2::new(320.123456, 240.987654),
        );
        sprite.fade(0.0, 100.0, 0.333333, 0.666666).unwrap();
        sprite.rotate_at(0.0, 3.14159265).unwrap();
        sprite.start_loop_group(0.0, 2).unwrap();
        sprite.move_x(0.0, 10.0, 1.23456, 7.891011).unwrap();
        sprite.end_group().unwrap();
        let stream = ElementStream::build(&groups, None);
        (groups, stream)
    }

    #[test]
    fn test_rounds_each_family() {
        let (groups, mut stream) = stream();
        let step = RoundPrecision {
            move_precision: 1,
            scale_precision: 4,
            alpha_precision: 2,
            rotation_precision: 3,
        };
        step.apply(&mut stream, &mut StepContext::new(&groups)).unwrap();

        let sprite = stream.entries[0].element.sprite().unwrap();
        assert_eq!(sprite.initial_position, Vec2::new(320.1, 241.0));
        let fade = &sprite.commands.opacity.commands()[0];
        assert_eq!((fade.start_value, fade.end_value), (0.33, 0.67));
        assert_eq!(sprite.commands.rotation.commands()[0].start_value, 3.142);
        let looped = &sprite.loops[0].commands.move_x.commands()[0];
        assert_eq!((looped.start_value, looped.end_value), (1.2, 7.9));
    }

    #[test]
    fn test_rounding_is_idempotent() {
        let (groups, mut once) = stream();
        let step = RoundPrecision::default();
        step.apply(&mut once, &mut StepContext::new(&groups)).unwrap();
        let mut twice = once.clone();
        step.apply(&mut twice, &mut StepContext::new(&groups)).unwrap();
        assert_eq!(once, twice);
    }
}

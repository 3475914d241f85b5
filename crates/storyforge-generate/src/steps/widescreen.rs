use storyforge_core::{ExportSettings, StoryResult};
use storyforge_ir::{ElementStream, TimelineGroup};

use crate::step::{GenerationStep, StepContext};

/// Shifts every X coordinate by a constant so 4:3-authored content is
/// centred on a widescreen canvas.
#[derive(Debug, Clone, Copy)]
pub struct WidescreenOffset {
    pub offset: f64,
}

impl WidescreenOffset {
    pub fn new(offset: f64) -> Self {
        Self { offset }
    }

    pub fn from_settings(settings: &ExportSettings) -> Self {
        Self::new(settings.widescreen_offset())
    }

    fn shift_group(&self, group: &mut TimelineGroup) {
        for command in group.moves.commands_mut() {
            command.start_value.x += self.offset;
            command.end_value.x += self.offset;
        }
        for command in group.move_x.commands_mut() {
            command.start_value += self.offset;
            command.end_value += self.offset;
        }
    }
}

impl GenerationStep for WidescreenOffset {
    fn name(&self) -> &str {
        "widescreen-offset"
    }

    fn apply(&self, stream: &mut ElementStream, _ctx: &mut StepContext<'_>) -> StoryResult<()> {
        for element in stream.elements_mut() {
            let Some(sprite) = element.sprite_mut() else {
                continue;
            };
            sprite.initial_position.x += self.offset;
            for scope in sprite.scopes_mut() {
                self.shift_group(scope);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyforge_core::{Layer, Origin, Vec2};
    use storyforge_ir::GroupSet;

    #[test]
    fn test_shifts_x_only() {
        let mut groups = GroupSet::new();
        let sprite = groups.get_or_create("G").create_sprite_at(
            "a.png",
            Layer::Background,
            Origin::Centre,
            Vec2::new(10.0, 20.0),
        );
        sprite
            .move_xy(0.0, 100.0, Vec2::new(0.0, 0.0), Vec2::new(640.0, 480.0))
            .unwrap();
        sprite.move_y_at(0.0, 55.0).unwrap();
        sprite.start_trigger_group("Failing", 0.0, 100.0, 0).unwrap();
        sprite.move_x_at(0.0, 5.0).unwrap();
        sprite.end_group().unwrap();

        let mut stream = ElementStream::build(&groups, None);
        WidescreenOffset::from_settings(&ExportSettings::default())
            .apply(&mut stream, &mut StepContext::new(&groups))
            .unwrap();

        let sprite = stream.entries[0].element.sprite().unwrap();
        assert_eq!(sprite.initial_position, Vec2::new(117.0, 20.0));
        let moved = &sprite.commands.moves.commands()[0];
        assert_eq!(moved.start_value, Vec2::new(107.0, 0.0));
        assert_eq!(moved.end_value, Vec2::new(747.0, 480.0));
        assert_eq!(sprite.commands.move_y.commands()[0].start_value, 55.0);
        assert_eq!(sprite.triggers[0].commands.move_x.commands()[0].start_value, 112.0);
    }
}

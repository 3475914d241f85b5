use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

use crate::timeline::{LoopScope, TimelineGroup, TriggerScope};
use storyforge_core::{
    CommandColor, Easing, Layer, LoopType, Origin, StoryError, StoryResult, Vec2,
};

/// Which scope receives authoring calls on a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ActiveScope {
    #[default]
    Root,
    Loop(usize),
    Trigger(usize),
}

/// Generates the three call shapes of a value channel:
/// `name_eased(easing, start, end, from, to)`, `name(start, end, from, to)`
/// and `name_at(time, value)`.
macro_rules! value_channel {
    ($(#[$doc:meta])* $field:ident: $ty:ty => $eased:ident, $plain:ident, $at:ident) => {
        $(#[$doc])*
        pub fn $eased(
            &mut self,
            easing: Easing,
            start_time: f64,
            end_time: f64,
            from: $ty,
            to: $ty,
        ) -> StoryResult<&mut Self> {
            self.current_scope_mut()
                .$field
                .add(easing, start_time, end_time, from, to)?;
            Ok(self)
        }

        pub fn $plain(
            &mut self,
            start_time: f64,
            end_time: f64,
            from: $ty,
            to: $ty,
        ) -> StoryResult<&mut Self> {
            self.$eased(Easing::Linear, start_time, end_time, from, to)
        }

        pub fn $at(&mut self, time: f64, value: $ty) -> StoryResult<&mut Self> {
            self.$eased(Easing::Linear, time, time, value, value)
        }
    };
}

/// Same as `value_channel!` for the flag channels, which carry no values.
macro_rules! param_channel {
    ($(#[$doc:meta])* $field:ident => $eased:ident, $plain:ident, $at:ident) => {
        $(#[$doc])*
        pub fn $eased(
            &mut self,
            easing: Easing,
            start_time: f64,
            end_time: f64,
        ) -> StoryResult<&mut Self> {
            self.current_scope_mut()
                .$field
                .add(easing, start_time, end_time, true, true)?;
            Ok(self)
        }

        pub fn $plain(&mut self, start_time: f64, end_time: f64) -> StoryResult<&mut Self> {
            self.$eased(Easing::Linear, start_time, end_time)
        }

        pub fn $at(&mut self, time: f64) -> StoryResult<&mut Self> {
            self.$eased(Easing::Linear, time, time)
        }
    };
}

/// A textured element with a root command scope plus loop and trigger scopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    pub path: String,
    pub origin: Origin,
    pub initial_position: Vec2,
    pub layer: Layer,
    /// Root scope.
    pub commands: TimelineGroup,
    pub loops: Vec<LoopScope>,
    pub triggers: Vec<TriggerScope>,
    #[serde(skip)]
    active: ActiveScope,
}

impl Sprite {
    pub fn new(path: impl Into<String>, layer: Layer, origin: Origin, initial_position: Vec2) -> Self {
        Self {
            path: path.into(),
            origin,
            initial_position,
            layer,
            commands: TimelineGroup::new(),
            loops: Vec::new(),
            triggers: Vec::new(),
            active: ActiveScope::Root,
        }
    }

    fn current_scope_mut(&mut self) -> &mut TimelineGroup {
        match self.active {
            ActiveScope::Root => &mut self.commands,
            ActiveScope::Loop(index) => match self.loops.get_mut(index) {
                Some(scope) => &mut scope.commands,
                None => &mut self.commands,
            },
            ActiveScope::Trigger(index) => match self.triggers.get_mut(index) {
                Some(scope) => &mut scope.commands,
                None => &mut self.commands,
            },
        }
    }

    value_channel! {
        /// Move to an absolute position.
        moves: Vec2 => move_xy_eased, move_xy, move_xy_at
    }
    value_channel!(move_x: f64 => move_x_eased, move_x, move_x_at);
    value_channel!(move_y: f64 => move_y_eased, move_y, move_y_at);
    value_channel!(scale: f64 => scale_eased, scale, scale_at);
    value_channel! {
        /// Per-axis scale.
        vector_scale: Vec2 => scale_vec_eased, scale_vec, scale_vec_at
    }
    value_channel! {
        /// Rotation in radians.
        rotation: f64 => rotate_eased, rotate, rotate_at
    }
    value_channel! {
        /// Opacity in `[0, 1]`.
        opacity: f64 => fade_eased, fade, fade_at
    }
    value_channel!(colour: CommandColor => colour_eased, colour, colour_at);
    param_channel!(flip_h => flip_h_eased, flip_h, flip_h_at);
    param_channel!(flip_v => flip_v_eased, flip_v, flip_v_at);
    param_channel! {
        /// Additive blending for the span.
        additive => additive_eased, additive, additive_at
    }

    pub fn colour_hex(
        &mut self,
        start_time: f64,
        end_time: f64,
        from: &str,
        to: &str,
    ) -> StoryResult<&mut Self> {
        let from = CommandColor::from_hex(from)?;
        let to = CommandColor::from_hex(to)?;
        self.colour(start_time, end_time, from, to)
    }

    pub fn colour_hex_at(&mut self, time: f64, hex: &str) -> StoryResult<&mut Self> {
        let colour = CommandColor::from_hex(hex)?;
        self.colour_at(time, colour)
    }

    /// Colour from `(hue, saturation, lightness)` triples, hue in degrees.
    pub fn colour_hsl(
        &mut self,
        start_time: f64,
        end_time: f64,
        from: (f64, f64, f64),
        to: (f64, f64, f64),
    ) -> StoryResult<&mut Self> {
        self.colour(
            start_time,
            end_time,
            CommandColor::from_hsl(from.0, from.1, from.2),
            CommandColor::from_hsl(to.0, to.1, to.2),
        )
    }

    /// Colour from `(hue, saturation, value)` triples, hue in degrees.
    pub fn colour_hsv(
        &mut self,
        start_time: f64,
        end_time: f64,
        from: (f64, f64, f64),
        to: (f64, f64, f64),
    ) -> StoryResult<&mut Self> {
        self.colour(
            start_time,
            end_time,
            CommandColor::from_hsv(from.0, from.1, from.2),
            CommandColor::from_hsv(to.0, to.1, to.2),
        )
    }

    fn ensure_no_open_scope(&self, opening: &str) -> StoryResult<()> {
        match self.active {
            ActiveScope::Root => Ok(()),
            ActiveScope::Loop(_) => Err(StoryError::contract(format!(
                "cannot start a {opening} group on '{}' while a loop group is open",
                self.path
            ))),
            ActiveScope::Trigger(_) => Err(StoryError::contract(format!(
                "cannot start a {opening} group on '{}' while a trigger group is open",
                self.path
            ))),
        }
    }

    /// Open a loop scope. `total_iterations` counts every playthrough.
    pub fn start_loop_group(&mut self, start_time: f64, total_iterations: u32) -> StoryResult<&mut Self> {
        self.ensure_no_open_scope("loop")?;
        if !start_time.is_finite() {
            return Err(StoryError::InvalidArgument(format!(
                "loop start time must be finite (got {start_time})"
            )));
        }
        if total_iterations == 0 {
            return Err(StoryError::InvalidArgument(
                "loop group needs at least one iteration".to_string(),
            ));
        }
        self.loops.push(LoopScope {
            start_time,
            total_iterations,
            commands: TimelineGroup::new(),
        });
        self.active = ActiveScope::Loop(self.loops.len() - 1);
        Ok(self)
    }

    pub fn start_trigger_group(
        &mut self,
        trigger_name: impl Into<String>,
        start_time: f64,
        end_time: f64,
        group_number: i32,
    ) -> StoryResult<&mut Self> {
        self.ensure_no_open_scope("trigger")?;
        if !start_time.is_finite() || !end_time.is_finite() || start_time > end_time {
            return Err(StoryError::InvalidArgument(format!(
                "invalid trigger window {start_time}..{end_time}"
            )));
        }
        self.triggers.push(TriggerScope {
            trigger_name: trigger_name.into(),
            start_time,
            end_time,
            group_number,
            commands: TimelineGroup::new(),
        });
        self.active = ActiveScope::Trigger(self.triggers.len() - 1);
        Ok(self)
    }

    /// Close the open loop or trigger scope. Errors when none is open.
    pub fn end_group(&mut self) -> StoryResult<&mut Self> {
        if self.active == ActiveScope::Root {
            return Err(StoryError::contract(format!(
                "end_group on '{}' without an open loop or trigger group",
                self.path
            )));
        }
        self.active = ActiveScope::Root;
        Ok(self)
    }

    pub fn has_open_scope(&self) -> bool {
        self.active != ActiveScope::Root
    }

    /// Start of the root scope; loops and triggers are not included.
    pub fn start_time(&self) -> f64 {
        self.commands.start_time().unwrap_or(0.0)
    }

    /// End of the root scope; loops and triggers do not extend it.
    pub fn end_time(&self) -> f64 {
        self.commands.end_time().unwrap_or(0.0)
    }

    pub fn duration(&self) -> f64 {
        self.end_time() - self.start_time()
    }

    /// Commands over the root scope and every nested scope.
    pub fn command_count(&self) -> usize {
        self.commands.command_count()
            + self.loops.iter().map(|l| l.commands.command_count()).sum::<usize>()
            + self.triggers.iter().map(|t| t.commands.command_count()).sum::<usize>()
    }

    /// Initial position, scope windows and every command are finite.
    pub fn is_finite(&self) -> bool {
        self.initial_position.x.is_finite()
            && self.initial_position.y.is_finite()
            && self.commands.is_finite()
            && self
                .loops
                .iter()
                .all(|l| l.start_time.is_finite() && l.commands.is_finite())
            && self.triggers.iter().all(|t| {
                t.start_time.is_finite() && t.end_time.is_finite() && t.commands.is_finite()
            })
    }

    /// The root scope followed by every loop and trigger scope.
    pub fn scopes_mut(&mut self) -> impl Iterator<Item = &mut TimelineGroup> + '_ {
        std::iter::once(&mut self.commands)
            .chain(self.loops.iter_mut().map(|l| &mut l.commands))
            .chain(self.triggers.iter_mut().map(|t| &mut t.commands))
    }
}

/// A sprite that cycles through numbered frame files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub sprite: Sprite,
    pub frame_count: u32,
    /// Milliseconds per frame.
    pub frame_delay: f64,
    pub loop_type: LoopType,
}

impl Animation {
    pub fn new(sprite: Sprite, frame_count: u32, frame_delay: f64, loop_type: LoopType) -> StoryResult<Self> {
        if frame_count == 0 {
            return Err(StoryError::InvalidArgument(format!(
                "animation '{}' needs at least one frame",
                sprite.path
            )));
        }
        if !frame_delay.is_finite() || frame_delay < 0.0 {
            return Err(StoryError::InvalidArgument(format!(
                "animation '{}' has invalid frame delay {frame_delay}",
                sprite.path
            )));
        }
        Ok(Self {
            sprite,
            frame_count,
            frame_delay,
            loop_type,
        })
    }
}

impl Deref for Animation {
    type Target = Sprite;

    fn deref(&self) -> &Sprite {
        &self.sprite
    }
}

impl DerefMut for Animation {
    fn deref_mut(&mut self) -> &mut Sprite {
        &mut self.sprite
    }
}

/// A one-shot audio cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub path: String,
    pub time: f64,
    /// Volume in `[0, 100]`.
    pub volume: f64,
    pub layer: Layer,
}

impl Sample {
    pub fn new(path: impl Into<String>, time: f64, volume: f64, layer: Layer) -> Self {
        Self {
            path: path.into(),
            time,
            volume: volume.clamp(0.0, 100.0),
            layer,
        }
    }
}

/// The background video of a run. At most one exists per generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub path: String,
    /// Playback offset in milliseconds.
    pub offset: f64,
}

impl Video {
    pub fn new(path: impl Into<String>, offset: f64) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

/// An element a script placed inside a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScriptElement {
    Sprite(Sprite),
    Animation(Animation),
    Sample(Sample),
}

impl ScriptElement {
    pub fn layer(&self) -> Layer {
        match self {
            ScriptElement::Sprite(s) => s.layer,
            ScriptElement::Animation(a) => a.layer,
            ScriptElement::Sample(s) => s.layer,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            ScriptElement::Sprite(s) => &s.path,
            ScriptElement::Animation(a) => &a.path,
            ScriptElement::Sample(s) => &s.path,
        }
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        let path = path.into();
        match self {
            ScriptElement::Sprite(s) => s.path = path,
            ScriptElement::Animation(a) => a.path = path,
            ScriptElement::Sample(s) => s.path = path,
        }
    }

    pub fn start_time(&self) -> f64 {
        match self {
            ScriptElement::Sprite(s) => s.start_time(),
            ScriptElement::Animation(a) => a.start_time(),
            ScriptElement::Sample(s) => s.time,
        }
    }

    /// End time for elements with a duration; samples are points in time.
    pub fn end_time(&self) -> Option<f64> {
        match self {
            ScriptElement::Sprite(s) => Some(s.end_time()),
            ScriptElement::Animation(a) => Some(a.end_time()),
            ScriptElement::Sample(_) => None,
        }
    }

    /// Ordering key within a layer: start time, then end time or 0.
    pub fn sort_key(&self) -> (f64, f64) {
        (self.start_time(), self.end_time().unwrap_or(0.0))
    }

    /// False when any number this element would write is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        match self {
            ScriptElement::Sprite(s) => s.is_finite(),
            ScriptElement::Animation(a) => a.frame_delay.is_finite() && a.sprite.is_finite(),
            ScriptElement::Sample(s) => s.time.is_finite() && s.volume.is_finite(),
        }
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        match self {
            ScriptElement::Sprite(s) => Some(s),
            ScriptElement::Animation(a) => Some(&a.sprite),
            ScriptElement::Sample(_) => None,
        }
    }

    pub fn sprite_mut(&mut self) -> Option<&mut Sprite> {
        match self {
            ScriptElement::Sprite(s) => Some(s),
            ScriptElement::Animation(a) => Some(&mut a.sprite),
            ScriptElement::Sample(_) => None,
        }
    }
}

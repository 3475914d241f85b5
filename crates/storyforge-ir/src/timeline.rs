use serde::{Deserialize, Serialize};

use crate::command::{Command, CommandValue};
use storyforge_core::{CommandColor, Easing, StoryResult, Vec2};

/// An append-only sequence of commands for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline<T> {
    commands: Vec<Command<T>>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
        }
    }
}

impl<T: CommandValue> Timeline<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command. Commands are never reordered or removed.
    pub fn add(
        &mut self,
        easing: Easing,
        start_time: f64,
        end_time: f64,
        start_value: T,
        end_value: T,
    ) -> StoryResult<()> {
        let command = Command::new(easing, start_time, end_time, start_value, end_value)?;
        self.commands.push(command);
        Ok(())
    }

    pub fn commands(&self) -> &[Command<T>] {
        &self.commands
    }

    /// Mutable access to command values for post-processing steps.
    pub fn commands_mut(&mut self) -> &mut [Command<T>] {
        &mut self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn is_finite(&self) -> bool {
        self.commands.iter().all(Command::is_finite)
    }

    /// Earliest command start, or `None` for an empty timeline.
    pub fn start_time(&self) -> Option<f64> {
        self.commands
            .iter()
            .map(|c| c.start_time)
            .reduce(f64::min)
    }

    /// Latest command end, or `None` for an empty timeline.
    pub fn end_time(&self) -> Option<f64> {
        self.commands.iter().map(|c| c.end_time).reduce(f64::max)
    }

    pub fn duration(&self) -> f64 {
        match (self.start_time(), self.end_time()) {
            (Some(start), Some(end)) => end - start,
            _ => 0.0,
        }
    }

    /// Channel value at `time`: the last command covering `time` wins,
    /// otherwise the closest command before it holds its end value.
    pub fn value_at(&self, time: f64) -> Option<T> {
        if let Some(covering) = self
            .commands
            .iter()
            .rev()
            .find(|c| c.start_time <= time && time <= c.end_time)
        {
            return Some(covering.value_at(time));
        }
        let before = self
            .commands
            .iter()
            .filter(|c| c.end_time < time)
            .max_by(|a, b| a.end_time.total_cmp(&b.end_time));
        match before {
            Some(cmd) => Some(cmd.end_value),
            None => self
                .commands
                .iter()
                .min_by(|a, b| a.start_time.total_cmp(&b.start_time))
                .map(|c| c.start_value),
        }
    }
}

/// The full set of animatable channels for one authoring scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineGroup {
    pub moves: Timeline<Vec2>,
    pub move_x: Timeline<f64>,
    pub move_y: Timeline<f64>,
    pub scale: Timeline<f64>,
    pub vector_scale: Timeline<Vec2>,
    pub rotation: Timeline<f64>,
    pub opacity: Timeline<f64>,
    pub colour: Timeline<CommandColor>,
    pub flip_h: Timeline<bool>,
    pub flip_v: Timeline<bool>,
    pub additive: Timeline<bool>,
}

impl TimelineGroup {
    pub fn new() -> Self {
        Self::default()
    }

    fn starts(&self) -> [Option<f64>; 11] {
        [
            self.moves.start_time(),
            self.move_x.start_time(),
            self.move_y.start_time(),
            self.scale.start_time(),
            self.vector_scale.start_time(),
            self.rotation.start_time(),
            self.opacity.start_time(),
            self.colour.start_time(),
            self.flip_h.start_time(),
            self.flip_v.start_time(),
            self.additive.start_time(),
        ]
    }

    fn ends(&self) -> [Option<f64>; 11] {
        [
            self.moves.end_time(),
            self.move_x.end_time(),
            self.move_y.end_time(),
            self.scale.end_time(),
            self.vector_scale.end_time(),
            self.rotation.end_time(),
            self.opacity.end_time(),
            self.colour.end_time(),
            self.flip_h.end_time(),
            self.flip_v.end_time(),
            self.additive.end_time(),
        ]
    }

    /// Earliest start over every channel.
    pub fn start_time(&self) -> Option<f64> {
        self.starts().into_iter().flatten().reduce(f64::min)
    }

    /// Latest end over every channel.
    pub fn end_time(&self) -> Option<f64> {
        self.ends().into_iter().flatten().reduce(f64::max)
    }

    pub fn duration(&self) -> f64 {
        match (self.start_time(), self.end_time()) {
            (Some(start), Some(end)) => end - start,
            _ => 0.0,
        }
    }

    pub fn command_count(&self) -> usize {
        self.moves.len()
            + self.move_x.len()
            + self.move_y.len()
            + self.scale.len()
            + self.vector_scale.len()
            + self.rotation.len()
            + self.opacity.len()
            + self.colour.len()
            + self.flip_h.len()
            + self.flip_v.len()
            + self.additive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.command_count() == 0
    }

    /// Every command on every channel has finite times and values.
    pub fn is_finite(&self) -> bool {
        self.moves.is_finite()
            && self.move_x.is_finite()
            && self.move_y.is_finite()
            && self.scale.is_finite()
            && self.vector_scale.is_finite()
            && self.rotation.is_finite()
            && self.opacity.is_finite()
            && self.colour.is_finite()
            && self.flip_h.is_finite()
            && self.flip_v.is_finite()
            && self.additive.is_finite()
    }
}

/// A loop scope: its commands replay `total_iterations` times from `start_time`.
///
/// `total_iterations` counts every playthrough, including the first one, and
/// is written to the loop header unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopScope {
    pub start_time: f64,
    pub total_iterations: u32,
    /// Commands with times relative to `start_time`.
    pub commands: TimelineGroup,
}

/// A trigger scope: its commands play when `trigger_name` fires inside the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerScope {
    pub trigger_name: String,
    pub start_time: f64,
    pub end_time: f64,
    pub group_number: i32,
    /// Commands with times relative to the moment the trigger fires.
    pub commands: TimelineGroup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_timeline_aggregates() {
        let timeline: Timeline<f64> = Timeline::new();
        assert!(timeline.is_empty());
        assert_eq!(timeline.start_time(), None);
        assert_eq!(timeline.end_time(), None);
        assert_eq!(timeline.duration(), 0.0);
        assert_eq!(timeline.value_at(10.0), None);
    }

    #[test]
    fn test_timeline_aggregates_follow_appends() {
        let mut timeline: Timeline<f64> = Timeline::new();
        timeline.add(Easing::Linear, 500.0, 1000.0, 0.0, 1.0).unwrap();
        assert_eq!(timeline.start_time(), Some(500.0));
        timeline.add(Easing::Linear, 100.0, 200.0, 1.0, 0.0).unwrap();
        timeline.add(Easing::Linear, 1500.0, 1500.0, 0.5, 0.5).unwrap();
        assert_eq!(timeline.start_time(), Some(100.0));
        assert_eq!(timeline.end_time(), Some(1500.0));
        assert_eq!(timeline.duration(), 1400.0);
        assert_eq!(timeline.len(), 3);
        // append-only: insertion order is preserved
        assert_eq!(timeline.commands()[1].start_time, 100.0);
    }

    #[test]
    fn test_timeline_rejects_invalid_command_without_appending() {
        let mut timeline: Timeline<f64> = Timeline::new();
        assert!(timeline.add(Easing::Linear, 10.0, 5.0, 0.0, 1.0).is_err());
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_value_at_last_covering_command_wins() {
        let mut timeline: Timeline<f64> = Timeline::new();
        timeline.add(Easing::Linear, 0.0, 100.0, 0.0, 1.0).unwrap();
        timeline.add(Easing::Linear, 50.0, 150.0, 10.0, 10.0).unwrap();
        assert_eq!(timeline.value_at(75.0), Some(10.0));
        assert_eq!(timeline.value_at(25.0), Some(0.25));
        assert_eq!(timeline.value_at(500.0), Some(10.0));
        assert_eq!(timeline.value_at(-5.0), Some(0.0));
    }

    #[test]
    fn test_group_aggregates_over_channels() {
        let mut group = TimelineGroup::new();
        assert_eq!(group.start_time(), None);
        group.opacity.add(Easing::Linear, 200.0, 300.0, 0.0, 1.0).unwrap();
        group
            .moves
            .add(Easing::Linear, 100.0, 250.0, Vec2::zero(), Vec2::new(1.0, 1.0))
            .unwrap();
        group.additive.add(Easing::Linear, 400.0, 800.0, true, true).unwrap();
        assert_eq!(group.start_time(), Some(100.0));
        assert_eq!(group.end_time(), Some(800.0));
        assert_eq!(group.duration(), 700.0);
        assert_eq!(group.command_count(), 3);
    }
}

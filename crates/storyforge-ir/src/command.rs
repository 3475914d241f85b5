use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use storyforge_core::{CommandColor, Easing, StoryError, StoryResult, Vec2};

/// A value type a timeline channel can carry.
pub trait CommandValue: Copy + PartialEq + Debug {
    /// Interpolate towards `other` at eased progress `t`.
    fn interpolate(&self, other: &Self, t: f64) -> Self;

    /// False when any component is NaN or infinite.
    fn is_finite(&self) -> bool;
}

impl CommandValue for f64 {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }

    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

impl CommandValue for Vec2 {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        self.lerp(other, t)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl CommandValue for CommandColor {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        self.lerp(other, t)
    }

    fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }
}

/// Parameter channels (flip, additive) hold a constant flag for the command's span.
impl CommandValue for bool {
    fn interpolate(&self, _other: &Self, _t: f64) -> Self {
        *self
    }

    fn is_finite(&self) -> bool {
        true
    }
}

/// A timed interpolation instruction on one animation channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command<T> {
    pub easing: Easing,
    pub start_time: f64,
    pub end_time: f64,
    pub start_value: T,
    pub end_value: T,
}

impl<T: CommandValue> Command<T> {
    /// Create a command, rejecting non-finite times or values and `start_time > end_time`.
    pub fn new(
        easing: Easing,
        start_time: f64,
        end_time: f64,
        start_value: T,
        end_value: T,
    ) -> StoryResult<Self> {
        if !start_time.is_finite() || !end_time.is_finite() {
            return Err(StoryError::InvalidArgument(format!(
                "command times must be finite (got {start_time}..{end_time})"
            )));
        }
        if !start_value.is_finite() || !end_value.is_finite() {
            return Err(StoryError::InvalidArgument(format!(
                "command values must be finite (got {start_value:?}..{end_value:?})"
            )));
        }
        if start_time > end_time {
            return Err(StoryError::InvalidArgument(format!(
                "command ends before it starts ({start_time} > {end_time})"
            )));
        }
        Ok(Self {
            easing,
            start_time,
            end_time,
            start_value,
            end_value,
        })
    }

    /// Times and values are all finite. Fields are public, so steps that
    /// edit them in place can break this after construction.
    pub fn is_finite(&self) -> bool {
        self.start_time.is_finite()
            && self.end_time.is_finite()
            && self.start_value.is_finite()
            && self.end_value.is_finite()
    }

    /// An instantaneous command holding `value` at `time`.
    pub fn instant(time: f64, value: T) -> StoryResult<Self> {
        Self::new(Easing::Linear, time, time, value, value)
    }

    pub fn is_instant(&self) -> bool {
        self.start_time == self.end_time
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Value of this command at `time`, holding the end points outside its span.
    pub fn value_at(&self, time: f64) -> T {
        if time <= self.start_time {
            return self.start_value;
        }
        if time >= self.end_time {
            return self.end_value;
        }
        let progress = (time - self.start_time) / self.duration();
        self.start_value
            .interpolate(&self.end_value, self.easing.apply(progress))
    }

    /// Shift both endpoints by `offset` milliseconds.
    pub fn offset(&self, offset: f64) -> Self {
        Self {
            start_time: self.start_time + offset,
            end_time: self.end_time + offset,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_rejects_reversed_times() {
        assert!(Command::<f64>::new(Easing::Linear, 100.0, 50.0, 0.0, 1.0).is_err());
        assert!(Command::<f64>::new(Easing::Linear, f64::NAN, 50.0, 0.0, 1.0).is_err());
        assert!(Command::<f64>::new(Easing::Linear, 50.0, 50.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn test_command_rejects_non_finite_values() {
        assert!(Command::<f64>::new(Easing::Linear, 0.0, 100.0, f64::NAN, 1.0).is_err());
        assert!(Command::<f64>::new(Easing::Linear, 0.0, 100.0, 0.0, f64::INFINITY).is_err());
        assert!(Command::instant(0.0, Vec2::new(f64::NEG_INFINITY, 0.0)).is_err());
        assert!(Command::instant(0.0, CommandColor { r: f64::NAN, g: 0.0, b: 0.0 }).is_err());
        assert!(Command::instant(0.0, true).is_ok());

        let mut command = Command::<f64>::new(Easing::Linear, 0.0, 100.0, 0.0, 1.0).unwrap();
        assert!(command.is_finite());
        command.end_value = f64::NAN;
        assert!(!command.is_finite());
    }

    #[test]
    fn test_instant_command() {
        let cmd = Command::<f64>::instant(250.0, 0.5).unwrap();
        assert!(cmd.is_instant());
        assert_eq!(cmd.start_value, cmd.end_value);
        assert_eq!(cmd.duration(), 0.0);
    }

    #[test]
    fn test_value_at_linear() {
        let cmd = Command::<f64>::new(Easing::Linear, 0.0, 100.0, 0.0, 320.0).unwrap();
        assert_eq!(cmd.value_at(-10.0), 0.0);
        assert!((cmd.value_at(50.0) - 160.0).abs() < 1e-9);
        assert_eq!(cmd.value_at(200.0), 320.0);
    }

    #[test]
    fn test_value_at_eased_vector() {
        let cmd = Command::new(
            Easing::InQuad,
            0.0,
            100.0,
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 200.0),
        )
        .unwrap();
        let v = cmd.value_at(50.0);
        assert!((v.x - 25.0).abs() < 1e-9);
        assert!((v.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_offset() {
        let cmd = Command::<f64>::new(Easing::OutQuad, 10.0, 20.0, 1.0, 0.0).unwrap();
        let shifted = cmd.offset(1000.0);
        assert_eq!(shifted.start_time, 1010.0);
        assert_eq!(shifted.end_time, 1020.0);
        assert_eq!(shifted.easing, Easing::OutQuad);
    }
}

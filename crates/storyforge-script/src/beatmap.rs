//! Read-only beatmap and audio context handed to scripts.
//!
//! Parsing beatmap files and decoding audio happen elsewhere; scripts only
//! query these values.

use serde::{Deserialize, Serialize};

/// Beat length used when a beatmap has no uninherited timing point (120 BPM).
pub const DEFAULT_BEAT_DURATION: f64 = 500.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingPoint {
    /// Start of the section in milliseconds.
    pub offset: f64,
    /// Milliseconds per beat.
    pub beat_duration: f64,
    /// Beats per measure.
    pub meter: u32,
    /// Uninherited points define tempo; inherited ones only change velocity.
    pub uninherited: bool,
    pub kiai: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Beatmap {
    pub name: String,
    pub audio_path: Option<String>,
    /// Sorted by offset.
    pub timing_points: Vec<TimingPoint>,
    pub bookmarks: Vec<f64>,
}

impl Beatmap {
    /// The tempo-defining timing point in effect at `time`.
    ///
    /// Times before the first point resolve to the first point.
    pub fn timing_point_at(&self, time: f64) -> Option<&TimingPoint> {
        let mut uninherited = self.timing_points.iter().filter(|p| p.uninherited);
        let first = uninherited.next()?;
        Some(
            std::iter::once(first)
                .chain(uninherited)
                .take_while(|p| p.offset <= time)
                .last()
                .unwrap_or(first),
        )
    }

    pub fn beat_duration_at(&self, time: f64) -> f64 {
        self.timing_point_at(time)
            .map(|p| p.beat_duration)
            .unwrap_or(DEFAULT_BEAT_DURATION)
    }

    pub fn bpm_at(&self, time: f64) -> f64 {
        60_000.0 / self.beat_duration_at(time)
    }

    /// Whether `time` falls in a kiai section of any timing point.
    pub fn is_kiai(&self, time: f64) -> bool {
        self.timing_points
            .iter()
            .take_while(|p| p.offset <= time)
            .last()
            .map(|p| p.kiai)
            .unwrap_or(false)
    }
}

/// Amplitude access to the beatmap's audio track.
pub trait Waveform: Send + Sync {
    /// Track length in milliseconds.
    fn duration(&self) -> f64;

    /// Normalised amplitude in `[0, 1]` at `time`.
    fn amplitude_at(&self, time: f64) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(offset: f64, beat_duration: f64, uninherited: bool) -> TimingPoint {
        TimingPoint {
            offset,
            beat_duration,
            meter: 4,
            uninherited,
            kiai: false,
        }
    }

    #[test]
    fn test_timing_point_lookup() {
        let beatmap = Beatmap {
            timing_points: vec![
                point(1000.0, 500.0, true),
                point(2000.0, -100.0, false),
                point(5000.0, 250.0, true),
            ],
            ..Default::default()
        };
        assert_eq!(beatmap.beat_duration_at(0.0), 500.0);
        assert_eq!(beatmap.beat_duration_at(2500.0), 500.0);
        assert_eq!(beatmap.beat_duration_at(5000.0), 250.0);
        assert_eq!(beatmap.bpm_at(6000.0), 240.0);
    }

    #[test]
    fn test_empty_beatmap_defaults() {
        let beatmap = Beatmap::default();
        assert!(beatmap.timing_point_at(100.0).is_none());
        assert_eq!(beatmap.beat_duration_at(100.0), DEFAULT_BEAT_DURATION);
        assert!(!beatmap.is_kiai(100.0));
    }
}

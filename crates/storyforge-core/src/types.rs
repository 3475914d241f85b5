use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

/// Presentation surface an element is drawn on.
///
/// Declaration order is the emission order of the `[Events]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    Background,
    Failing,
    Passing,
    Foreground,
    Overlay,
}

impl Layer {
    /// All layers in emission order.
    pub const ALL: [Layer; 5] = [
        Layer::Background,
        Layer::Failing,
        Layer::Passing,
        Layer::Foreground,
        Layer::Overlay,
    ];

    /// Layer number used by `Sample` lines and section comments.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Layer name as written in the storyboard text format.
    pub fn osb_name(self) -> &'static str {
        match self {
            Layer::Background => "Background",
            Layer::Failing => "Fail",
            Layer::Passing => "Pass",
            Layer::Foreground => "Foreground",
            Layer::Overlay => "Overlay",
        }
    }
}

impl Default for Layer {
    fn default() -> Self {
        Layer::Background
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.osb_name())
    }
}

impl FromStr for Layer {
    type Err = crate::StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "background" => Ok(Layer::Background),
            "fail" | "failing" => Ok(Layer::Failing),
            "pass" | "passing" => Ok(Layer::Passing),
            "foreground" => Ok(Layer::Foreground),
            "overlay" => Ok(Layer::Overlay),
            _ => Err(crate::StoryError::InvalidArgument(format!(
                "unknown layer '{s}'"
            ))),
        }
    }
}

/// Anchor point of a sprite's texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    TopLeft,
    TopCentre,
    TopRight,
    CentreLeft,
    Centre,
    CentreRight,
    BottomLeft,
    BottomCentre,
    BottomRight,
}

impl Origin {
    pub fn osb_name(self) -> &'static str {
        match self {
            Origin::TopLeft => "TopLeft",
            Origin::TopCentre => "TopCentre",
            Origin::TopRight => "TopRight",
            Origin::CentreLeft => "CentreLeft",
            Origin::Centre => "Centre",
            Origin::CentreRight => "CentreRight",
            Origin::BottomLeft => "BottomLeft",
            Origin::BottomCentre => "BottomCentre",
            Origin::BottomRight => "BottomRight",
        }
    }
}

impl Default for Origin {
    fn default() -> Self {
        Origin::TopLeft
    }
}

impl FromStr for Origin {
    type Err = crate::StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace("center", "centre");
        match normalized.as_str() {
            "topleft" => Ok(Origin::TopLeft),
            "topcentre" => Ok(Origin::TopCentre),
            "topright" => Ok(Origin::TopRight),
            "centreleft" => Ok(Origin::CentreLeft),
            "centre" => Ok(Origin::Centre),
            "centreright" => Ok(Origin::CentreRight),
            "bottomleft" => Ok(Origin::BottomLeft),
            "bottomcentre" => Ok(Origin::BottomCentre),
            "bottomright" => Ok(Origin::BottomRight),
            _ => Err(crate::StoryError::InvalidArgument(format!(
                "unknown origin '{s}'"
            ))),
        }
    }
}

/// Playback mode of an animation's frame sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopType {
    Forever,
    Once,
}

impl LoopType {
    pub fn osb_name(self) -> &'static str {
        match self {
            LoopType::Forever => "LoopForever",
            LoopType::Once => "LoopOnce",
        }
    }
}

impl Default for LoopType {
    fn default() -> Self {
        LoopType::Forever
    }
}

impl FromStr for LoopType {
    type Err = crate::StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forever" | "loopforever" => Ok(LoopType::Forever),
            "once" | "looponce" => Ok(LoopType::Once),
            _ => Err(crate::StoryError::InvalidArgument(format!(
                "unknown loop type '{s}'"
            ))),
        }
    }
}

/// Which output a group's content is exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportTarget {
    None,
    Storyboard,
    Difficulty,
}

impl Default for ExportTarget {
    fn default() -> Self {
        ExportTarget::Storyboard
    }
}

impl FromStr for ExportTarget {
    type Err = crate::StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(ExportTarget::None),
            "storyboard" => Ok(ExportTarget::Storyboard),
            "difficulty" => Ok(ExportTarget::Difficulty),
            _ => Err(crate::StoryError::InvalidArgument(format!(
                "unknown export target '{s}'"
            ))),
        }
    }
}

/// Severity of a message logged by a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl FromStr for LogLevel {
    type Err = crate::StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(crate::StoryError::InvalidArgument(format!(
                "unknown log level '{s}'"
            ))),
        }
    }
}

/// Easing function for command interpolation.
///
/// Discriminants are the numeric identifiers written in command lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Easing {
    Linear = 0,
    Out = 1,
    In = 2,
    InQuad = 3,
    OutQuad = 4,
    InOutQuad = 5,
    InCubic = 6,
    OutCubic = 7,
    InOutCubic = 8,
    InQuart = 9,
    OutQuart = 10,
    InOutQuart = 11,
    InQuint = 12,
    OutQuint = 13,
    InOutQuint = 14,
    InSine = 15,
    OutSine = 16,
    InOutSine = 17,
    InExpo = 18,
    OutExpo = 19,
    InOutExpo = 20,
    InCirc = 21,
    OutCirc = 22,
    InOutCirc = 23,
    InElastic = 24,
    OutElastic = 25,
    OutElasticHalf = 26,
    OutElasticQuarter = 27,
    InOutElastic = 28,
    InBack = 29,
    OutBack = 30,
    InOutBack = 31,
    InBounce = 32,
    OutBounce = 33,
    InOutBounce = 34,
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Linear
    }
}

const BACK: f64 = 1.70158;
const BACK_IN_OUT: f64 = BACK * 1.525;

fn reverse(f: fn(f64) -> f64, t: f64) -> f64 {
    1.0 - f(1.0 - t)
}

fn in_out(f: fn(f64) -> f64, t: f64) -> f64 {
    if t < 0.5 {
        0.5 * f(2.0 * t)
    } else {
        0.5 * (2.0 - f(2.0 - 2.0 * t))
    }
}

fn quad(t: f64) -> f64 {
    t * t
}
fn cubic(t: f64) -> f64 {
    t * t * t
}
fn quart(t: f64) -> f64 {
    t.powi(4)
}
fn quint(t: f64) -> f64 {
    t.powi(5)
}
fn sine(t: f64) -> f64 {
    1.0 - (t * PI / 2.0).cos()
}
fn expo(t: f64) -> f64 {
    2f64.powf(10.0 * (t - 1.0))
}
fn circ(t: f64) -> f64 {
    1.0 - (1.0 - t * t).max(0.0).sqrt()
}
fn elastic_out_with(t: f64, period_scale: f64) -> f64 {
    2f64.powf(-10.0 * t) * ((period_scale * t - 0.075) * (2.0 * PI) / 0.3).sin() + 1.0
}
fn elastic_out(t: f64) -> f64 {
    elastic_out_with(t, 1.0)
}
fn elastic_in(t: f64) -> f64 {
    reverse(elastic_out, t)
}
fn back(t: f64) -> f64 {
    t * t * ((BACK + 1.0) * t - BACK)
}
fn back_in_out(t: f64) -> f64 {
    t * t * ((BACK_IN_OUT + 1.0) * t - BACK_IN_OUT)
}
fn bounce_out(t: f64) -> f64 {
    if t < 1.0 / 2.75 {
        7.5625 * t * t
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        7.5625 * t * t + 0.75
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        7.5625 * t * t + 0.9375
    } else {
        let t = t - 2.625 / 2.75;
        7.5625 * t * t + 0.984375
    }
}
fn bounce_in(t: f64) -> f64 {
    reverse(bounce_out, t)
}

impl Easing {
    /// Every easing, ordered by numeric identifier.
    pub const ALL: [Easing; 35] = [
        Easing::Linear,
        Easing::Out,
        Easing::In,
        Easing::InQuad,
        Easing::OutQuad,
        Easing::InOutQuad,
        Easing::InCubic,
        Easing::OutCubic,
        Easing::InOutCubic,
        Easing::InQuart,
        Easing::OutQuart,
        Easing::InOutQuart,
        Easing::InQuint,
        Easing::OutQuint,
        Easing::InOutQuint,
        Easing::InSine,
        Easing::OutSine,
        Easing::InOutSine,
        Easing::InExpo,
        Easing::OutExpo,
        Easing::InOutExpo,
        Easing::InCirc,
        Easing::OutCirc,
        Easing::InOutCirc,
        Easing::InElastic,
        Easing::OutElastic,
        Easing::OutElasticHalf,
        Easing::OutElasticQuarter,
        Easing::InOutElastic,
        Easing::InBack,
        Easing::OutBack,
        Easing::InOutBack,
        Easing::InBounce,
        Easing::OutBounce,
        Easing::InOutBounce,
    ];

    /// Numeric identifier used in the storyboard text format.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Look up an easing by its numeric identifier.
    pub fn from_id(id: i64) -> Option<Easing> {
        usize::try_from(id)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Apply the easing function to a normalized progress value t in [0, 1].
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::In | Easing::InQuad => quad(t),
            Easing::Out | Easing::OutQuad => reverse(quad, t),
            Easing::InOutQuad => in_out(quad, t),
            Easing::InCubic => cubic(t),
            Easing::OutCubic => reverse(cubic, t),
            Easing::InOutCubic => in_out(cubic, t),
            Easing::InQuart => quart(t),
            Easing::OutQuart => reverse(quart, t),
            Easing::InOutQuart => in_out(quart, t),
            Easing::InQuint => quint(t),
            Easing::OutQuint => reverse(quint, t),
            Easing::InOutQuint => in_out(quint, t),
            Easing::InSine => sine(t),
            Easing::OutSine => reverse(sine, t),
            Easing::InOutSine => in_out(sine, t),
            Easing::InExpo => expo(t),
            Easing::OutExpo => reverse(expo, t),
            Easing::InOutExpo => in_out(expo, t),
            Easing::InCirc => circ(t),
            Easing::OutCirc => reverse(circ, t),
            Easing::InOutCirc => in_out(circ, t),
            Easing::InElastic => elastic_in(t),
            Easing::OutElastic => elastic_out(t),
            Easing::OutElasticHalf => elastic_out_with(t, 0.5),
            Easing::OutElasticQuarter => elastic_out_with(t, 0.25),
            Easing::InOutElastic => in_out(elastic_in, t),
            Easing::InBack => back(t),
            Easing::OutBack => reverse(back, t),
            Easing::InOutBack => in_out(back_in_out, t),
            Easing::InBounce => bounce_in(t),
            Easing::OutBounce => bounce_out(t),
            Easing::InOutBounce => in_out(bounce_in, t),
        }
    }
}

impl FromStr for Easing {
    type Err = crate::StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase().replace(['_', '-', ' '], "");
        if wanted == "none" || wanted == "linear" {
            return Ok(Easing::Linear);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|e| format!("{e:?}").to_ascii_lowercase() == wanted)
            .ok_or_else(|| crate::StoryError::InvalidArgument(format!("unknown easing '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_linear() {
        let e = Easing::Linear;
        assert!((e.apply(0.0)).abs() < 0.001);
        assert!((e.apply(0.5) - 0.5).abs() < 0.001);
        assert!((e.apply(1.0) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_easing_in_out_shapes() {
        assert!(Easing::InQuad.apply(0.5) < 0.5);
        assert!(Easing::OutQuad.apply(0.5) > 0.5);
        assert!((Easing::InOutCubic.apply(0.5) - 0.5).abs() < 0.001);
        assert!((Easing::In.apply(0.3) - Easing::InQuad.apply(0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_easing_boundaries() {
        for easing in Easing::ALL {
            assert!(
                easing.apply(0.0).abs() < 0.002,
                "{:?} should start at 0",
                easing
            );
            assert!(
                (easing.apply(1.0) - 1.0).abs() < 0.002,
                "{:?} should end at 1",
                easing
            );
        }
    }

    #[test]
    fn test_easing_ids_round_trip() {
        for (i, easing) in Easing::ALL.iter().enumerate() {
            assert_eq!(easing.id() as usize, i);
            assert_eq!(Easing::from_id(i as i64), Some(*easing));
        }
        assert_eq!(Easing::from_id(35), None);
        assert_eq!(Easing::from_id(-1), None);
    }

    #[test]
    fn test_easing_from_str() {
        assert_eq!("OutBounce".parse::<Easing>().unwrap(), Easing::OutBounce);
        assert_eq!("in_out_sine".parse::<Easing>().unwrap(), Easing::InOutSine);
        assert_eq!("None".parse::<Easing>().unwrap(), Easing::Linear);
        assert!("wobble".parse::<Easing>().is_err());
    }

    #[test]
    fn test_layer_order_and_names() {
        assert_eq!(Layer::ALL[0], Layer::Background);
        assert_eq!(Layer::ALL[4], Layer::Overlay);
        assert_eq!(Layer::Failing.osb_name(), "Fail");
        assert_eq!(Layer::Passing.index(), 2);
        assert_eq!("pass".parse::<Layer>().unwrap(), Layer::Passing);
    }

    #[test]
    fn test_origin_parse_accepts_american_spelling() {
        assert_eq!("BottomCenter".parse::<Origin>().unwrap(), Origin::BottomCentre);
        assert_eq!(Origin::default(), Origin::TopLeft);
    }
}

//! Rhai language host.
//!
//! Exposes the script API to `.rhai` files:
//!
//! ```text
//! let bg = get_group("Background").create_sprite("sb/bg.jpg", "Background", "Centre", 320, 240);
//! bg.fade(0, 1000, 0, 1).scale(0, 0.5);
//! bg.start_loop_group(1000, 4);
//! bg.rotate("OutQuad", 0, 500, 0, 3.14);
//! bg.end_group();
//! ```
//!
//! Numbers may be passed as integers or floats. Easings are passed as a
//! numeric id or a name (`"OutQuad"`). Every value mutator accepts the
//! `(easing, start, end, from, to)`, `(start, end, from, to)` and
//! `(time, value)` shapes; vector and colour channels take their components
//! spread out (`move_xy(0, 100, x1, y1, x2, y2)`).

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rhai::{Array, Dynamic, Engine, EvalAltResult, Scope};
use storyforge_core::{
    CommandColor, Easing, Layer, LogLevel, LoopType, Origin, StoryError, StoryResult, Vec2,
    VariableValue,
};
use storyforge_ir::{Group, ScriptElement, Sprite};

use crate::asset::AssetDescriptor;
use crate::beatmap::DEFAULT_BEAT_DURATION;
use crate::context::ScriptContext;
use crate::script::Script;

type Shared = Rc<RefCell<ScriptContext>>;
type HostResult<T> = Result<T, Box<EvalAltResult>>;

type ScalarMutator = for<'a> fn(&'a mut Sprite, Easing, f64, f64, f64, f64) -> StoryResult<&'a mut Sprite>;
type VectorMutator = for<'a> fn(&'a mut Sprite, Easing, f64, f64, Vec2, Vec2) -> StoryResult<&'a mut Sprite>;
type FlagMutator = for<'a> fn(&'a mut Sprite, Easing, f64, f64) -> StoryResult<&'a mut Sprite>;

/// A script written in Rhai.
#[derive(Debug, Clone)]
pub struct RhaiScript {
    name: String,
    source: String,
    path: Option<PathBuf>,
}

impl RhaiScript {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            path: None,
        }
    }

    /// Load a script file; its name is the file stem.
    pub fn from_file(path: &Path) -> StoryResult<Self> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| StoryError::InvalidArgument(format!("bad script path {}", path.display())))?
            .to_string();
        let source = std::fs::read_to_string(path)?;
        Ok(Self {
            name,
            source,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Parse the script without running it.
    pub fn check_syntax(&self) -> StoryResult<()> {
        Engine::new()
            .compile(&self.source)
            .map(|_| ())
            .map_err(|e| StoryError::script(&self.name, e.to_string()))
    }
}

impl Script for RhaiScript {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, ctx: &mut ScriptContext) -> StoryResult<()> {
        let shared: Shared = Rc::new(RefCell::new(std::mem::take(ctx)));
        let result = run_source(&self.source, &shared);
        *ctx = match Rc::try_unwrap(shared) {
            Ok(cell) => cell.into_inner(),
            Err(shared) => std::mem::take(&mut *shared.borrow_mut()),
        };
        result.map_err(|e| StoryError::script(&self.name, e.to_string()))
    }
}

fn run_source(source: &str, shared: &Shared) -> HostResult<()> {
    let mut engine = Engine::new();
    register_api(&mut engine, shared);

    let mut scope = Scope::new();
    for (name, value) in shared.borrow().variables().values() {
        scope.push_constant_dynamic(name.to_string(), to_dynamic(value));
    }

    engine.run_with_scope(&mut scope, source)
}

fn host_err(err: StoryError) -> Box<EvalAltResult> {
    err.to_string().into()
}

fn host_msg(message: String) -> Box<EvalAltResult> {
    message.into()
}

fn number(value: &Dynamic, what: &str) -> HostResult<f64> {
    if let Ok(v) = value.as_float() {
        return Ok(v);
    }
    if let Ok(v) = value.as_int() {
        return Ok(v as f64);
    }
    Err(host_msg(format!("{what} must be a number, got {}", value.type_name())))
}

fn count(value: &Dynamic, what: &str) -> HostResult<u32> {
    let v = number(value, what)?;
    if v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f64 {
        return Err(host_msg(format!("{what} must be a non-negative integer, got {v}")));
    }
    Ok(v as u32)
}

fn integer(value: &Dynamic, what: &str) -> HostResult<i32> {
    let v = number(value, what)?;
    if v.fract() != 0.0 || v < i32::MIN as f64 || v > i32::MAX as f64 {
        return Err(host_msg(format!("{what} must be an integer, got {v}")));
    }
    Ok(v as i32)
}

fn text(value: &Dynamic, what: &str) -> HostResult<String> {
    value
        .clone()
        .into_string()
        .map_err(|actual| host_msg(format!("{what} must be a string, got {actual}")))
}

fn easing_arg(value: &Dynamic) -> HostResult<Easing> {
    if let Ok(id) = value.as_int() {
        return Easing::from_id(id).ok_or_else(|| host_msg(format!("unknown easing id {id}")));
    }
    text(value, "easing")?.parse().map_err(host_err)
}

fn layer_arg(value: &str) -> HostResult<Layer> {
    value.parse().map_err(host_err)
}

fn origin_arg(value: &str) -> HostResult<Origin> {
    value.parse().map_err(host_err)
}

fn vec2(x: &Dynamic, y: &Dynamic) -> HostResult<Vec2> {
    Ok(Vec2::new(number(x, "x")?, number(y, "y")?))
}

fn colour(r: &Dynamic, g: &Dynamic, b: &Dynamic) -> HostResult<CommandColor> {
    Ok(CommandColor::rgb(number(r, "red")?, number(g, "green")?, number(b, "blue")?))
}

fn hex_colour(value: &str) -> HostResult<CommandColor> {
    CommandColor::from_hex(value).map_err(|e| host_err(e.into()))
}

fn to_dynamic(value: &VariableValue) -> Dynamic {
    match value {
        VariableValue::Bool(v) => Dynamic::from(*v),
        VariableValue::Int(v) => Dynamic::from(*v),
        VariableValue::Float(v) => Dynamic::from(*v),
        VariableValue::Text(v) => Dynamic::from(v.clone()),
    }
}

fn from_dynamic(value: &Dynamic) -> HostResult<VariableValue> {
    if let Ok(v) = value.as_bool() {
        return Ok(VariableValue::Bool(v));
    }
    if let Ok(v) = value.as_int() {
        return Ok(VariableValue::Int(v));
    }
    if let Ok(v) = value.as_float() {
        return Ok(VariableValue::Float(v));
    }
    if value.is_string() {
        return Ok(VariableValue::Text(text(value, "argument")?));
    }
    Err(host_msg(format!("unsupported argument type {}", value.type_name())))
}

/// A group as seen from a script.
#[derive(Clone)]
struct GroupHandle {
    ctx: Shared,
    name: String,
}

impl GroupHandle {
    fn with_group<T>(&self, f: impl FnOnce(&mut Group) -> StoryResult<T>) -> HostResult<T> {
        let mut ctx = self
            .ctx
            .try_borrow_mut()
            .map_err(|_| host_msg("script context is busy".to_string()))?;
        f(ctx.get_group(&self.name)).map_err(host_err)
    }

    fn sprite(&self, index: usize) -> SpriteHandle {
        SpriteHandle {
            ctx: self.ctx.clone(),
            group: self.name.clone(),
            index,
        }
    }

    fn create_sprite(&self, path: String, layer: Layer, origin: Origin, position: Vec2) -> HostResult<SpriteHandle> {
        let index = self.with_group(|group| {
            let index = group.len();
            group.create_sprite_at(path, layer, origin, position);
            Ok(index)
        })?;
        Ok(self.sprite(index))
    }
}

/// A sprite or animation inside a group, addressed by position.
#[derive(Clone)]
struct SpriteHandle {
    ctx: Shared,
    group: String,
    index: usize,
}

impl SpriteHandle {
    fn apply(&self, f: impl FnOnce(&mut Sprite) -> StoryResult<()>) -> HostResult<SpriteHandle> {
        let mut ctx = self
            .ctx
            .try_borrow_mut()
            .map_err(|_| host_msg("script context is busy".to_string()))?;
        let sprite = ctx
            .groups_mut()
            .get_mut(&self.group)
            .and_then(|group| group.element_mut(self.index))
            .and_then(ScriptElement::sprite_mut)
            .ok_or_else(|| {
                host_msg(format!(
                    "element {} of group '{}' is not a sprite",
                    self.index, self.group
                ))
            })?;
        f(sprite).map_err(host_err)?;
        Ok(self.clone())
    }

    fn read<T>(&self, f: impl FnOnce(&Sprite) -> T) -> HostResult<T> {
        let ctx = self
            .ctx
            .try_borrow()
            .map_err(|_| host_msg("script context is busy".to_string()))?;
        ctx.groups()
            .get(&self.group)
            .and_then(|group| group.elements.get(self.index))
            .and_then(ScriptElement::sprite)
            .map(f)
            .ok_or_else(|| host_msg(format!("element {} of group '{}' is not a sprite", self.index, self.group)))
    }
}

fn register_api(engine: &mut Engine, shared: &Shared) {
    engine
        .register_type_with_name::<GroupHandle>("Group")
        .register_type_with_name::<SpriteHandle>("Sprite")
        .register_type_with_name::<AssetDescriptor>("AssetDescriptor");

    register_output(engine, shared);
    register_context(engine, shared);
    register_groups(engine, shared);
    register_sprites(engine);
}

fn register_output(engine: &mut Engine, shared: &Shared) {
    let ctx = shared.clone();
    engine.on_print(move |message| {
        if let Ok(mut ctx) = ctx.try_borrow_mut() {
            ctx.log(LogLevel::Info, message);
        }
    });
    let ctx = shared.clone();
    engine.on_debug(move |message, _source, _position| {
        if let Ok(mut ctx) = ctx.try_borrow_mut() {
            ctx.log(LogLevel::Debug, message);
        }
    });

    let cancel = shared.borrow().cancellation().clone();
    engine.on_progress(move |_operations| {
        if cancel.is_cancelled() {
            Some(Dynamic::from("generation cancelled".to_string()))
        } else {
            None
        }
    });

    let ctx = shared.clone();
    engine.register_fn("log", move |message: &str| {
        ctx.borrow_mut().log(LogLevel::Info, message);
    });
    let ctx = shared.clone();
    engine.register_fn("log", move |message: &str, level: &str| -> HostResult<()> {
        let level: LogLevel = level.parse().map_err(host_err)?;
        ctx.borrow_mut().log(level, message);
        Ok(())
    });
}

fn register_context(engine: &mut Engine, shared: &Shared) {
    let ctx = shared.clone();
    engine.register_fn("set_video", move |path: &str, offset: Dynamic| -> HostResult<()> {
        let offset = number(&offset, "video offset")?;
        ctx.borrow_mut().set_video(path, offset).map_err(host_err)
    });
    let ctx = shared.clone();
    engine.register_fn("set_video", move |path: &str| -> HostResult<()> {
        ctx.borrow_mut().set_video(path, 0.0).map_err(host_err)
    });

    let ctx = shared.clone();
    engine.register_fn("fetch", move |path: &str| -> HostResult<String> {
        ctx.borrow().fetch(path).map_err(host_err)
    });

    let ctx = shared.clone();
    engine.register_fn(
        "get_asset",
        move |name: &str, descriptor: AssetDescriptor| -> HostResult<String> {
            ctx.borrow().get_asset(name, descriptor).map_err(host_err)
        },
    );
    engine.register_fn(
        "solid_image",
        |width: Dynamic, height: Dynamic, hex: &str| -> HostResult<AssetDescriptor> {
            Ok(AssetDescriptor::solid(
                count(&width, "width")?,
                count(&height, "height")?,
                hex_colour(hex)?,
            ))
        },
    );
    engine.register_fn(
        "gradient_image",
        |width: Dynamic, height: Dynamic, from: &str, to: &str, vertical: bool| -> HostResult<AssetDescriptor> {
            Ok(AssetDescriptor::gradient(
                count(&width, "width")?,
                count(&height, "height")?,
                hex_colour(from)?,
                hex_colour(to)?,
                vertical,
            ))
        },
    );

    let ctx = shared.clone();
    engine.register_fn("call", move |name: &str| -> HostResult<Dynamic> {
        let result = ctx.borrow().call(name, &[]).map_err(host_err)?;
        Ok(to_dynamic(&result))
    });
    let ctx = shared.clone();
    engine.register_fn("call", move |name: &str, args: Array| -> HostResult<Dynamic> {
        let args = args.iter().map(from_dynamic).collect::<HostResult<Vec<_>>>()?;
        let result = ctx.borrow().call(name, &args).map_err(host_err)?;
        Ok(to_dynamic(&result))
    });

    let ctx = shared.clone();
    engine.register_fn("beat_duration", move |time: Dynamic| -> HostResult<f64> {
        let time = number(&time, "time")?;
        Ok(ctx
            .borrow()
            .beatmap()
            .map(|b| b.beat_duration_at(time))
            .unwrap_or(DEFAULT_BEAT_DURATION))
    });
    let ctx = shared.clone();
    engine.register_fn("bookmarks", move || -> Array {
        ctx.borrow()
            .beatmap()
            .map(|b| b.bookmarks.iter().map(|t| Dynamic::from(*t)).collect())
            .unwrap_or_default()
    });
    let ctx = shared.clone();
    engine.register_fn("is_kiai", move |time: Dynamic| -> HostResult<bool> {
        let time = number(&time, "time")?;
        Ok(ctx.borrow().beatmap().is_some_and(|b| b.is_kiai(time)))
    });
    let ctx = shared.clone();
    engine.register_fn("amplitude", move |time: Dynamic| -> HostResult<f64> {
        let time = number(&time, "time")?;
        Ok(ctx
            .borrow()
            .waveform()
            .map(|w| w.amplitude_at(time))
            .unwrap_or(0.0))
    });
}

fn register_groups(engine: &mut Engine, shared: &Shared) {
    let ctx = shared.clone();
    engine.register_fn("get_group", move |name: &str| -> HostResult<GroupHandle> {
        ctx.try_borrow_mut()
            .map_err(|_| host_msg("script context is busy".to_string()))?
            .get_group(name);
        Ok(GroupHandle {
            ctx: ctx.clone(),
            name: name.to_string(),
        })
    });

    engine.register_get("name", |group: &mut GroupHandle| group.name.clone());

    engine.register_fn("create_sprite", |group: &mut GroupHandle, path: &str| {
        group.create_sprite(path.to_string(), Layer::Background, Origin::TopLeft, Vec2::zero())
    });
    engine.register_fn(
        "create_sprite",
        |group: &mut GroupHandle, path: &str, layer: &str, origin: &str| {
            group.create_sprite(path.to_string(), layer_arg(layer)?, origin_arg(origin)?, Vec2::zero())
        },
    );
    engine.register_fn(
        "create_sprite",
        |group: &mut GroupHandle, path: &str, layer: &str, origin: &str, x: Dynamic, y: Dynamic| {
            group.create_sprite(path.to_string(), layer_arg(layer)?, origin_arg(origin)?, vec2(&x, &y)?)
        },
    );

    engine.register_fn(
        "create_animation",
        |group: &mut GroupHandle,
         path: &str,
         layer: &str,
         origin: &str,
         x: Dynamic,
         y: Dynamic,
         frame_count: Dynamic,
         frame_delay: Dynamic,
         loop_type: &str|
         -> HostResult<SpriteHandle> {
            let layer = layer_arg(layer)?;
            let origin = origin_arg(origin)?;
            let position = vec2(&x, &y)?;
            let frame_count = count(&frame_count, "frame count")?;
            let frame_delay = number(&frame_delay, "frame delay")?;
            let loop_type: LoopType = loop_type.parse().map_err(host_err)?;
            let index = group.with_group(|g| {
                let index = g.len();
                g.create_animation(path, layer, origin, position, frame_count, frame_delay, loop_type)?;
                Ok(index)
            })?;
            Ok(group.sprite(index))
        },
    );

    engine.register_fn(
        "create_sample",
        |group: &mut GroupHandle, path: &str, time: Dynamic, volume: Dynamic| -> HostResult<()> {
            let time = number(&time, "time")?;
            let volume = number(&volume, "volume")?;
            group.with_group(|g| {
                g.create_sample(path, time, volume, Layer::Background);
                Ok(())
            })
        },
    );
    engine.register_fn(
        "create_sample",
        |group: &mut GroupHandle, path: &str, time: Dynamic, volume: Dynamic, layer: &str| -> HostResult<()> {
            let time = number(&time, "time")?;
            let volume = number(&volume, "volume")?;
            let layer = layer_arg(layer)?;
            group.with_group(|g| {
                g.create_sample(path, time, volume, layer);
                Ok(())
            })
        },
    );
}

fn register_scalar(engine: &mut Engine, name: &str, apply: ScalarMutator) {
    engine.register_fn(
        name,
        move |s: &mut SpriteHandle, easing: Dynamic, start: Dynamic, end: Dynamic, from: Dynamic, to: Dynamic| {
            let easing = easing_arg(&easing)?;
            let (start, end) = (number(&start, "start time")?, number(&end, "end time")?);
            let (from, to) = (number(&from, "start value")?, number(&to, "end value")?);
            s.apply(|sprite| apply(sprite, easing, start, end, from, to).map(|_| ()))
        },
    );
    engine.register_fn(
        name,
        move |s: &mut SpriteHandle, start: Dynamic, end: Dynamic, from: Dynamic, to: Dynamic| {
            let (start, end) = (number(&start, "start time")?, number(&end, "end time")?);
            let (from, to) = (number(&from, "start value")?, number(&to, "end value")?);
            s.apply(|sprite| apply(sprite, Easing::Linear, start, end, from, to).map(|_| ()))
        },
    );
    engine.register_fn(name, move |s: &mut SpriteHandle, time: Dynamic, value: Dynamic| {
        let time = number(&time, "time")?;
        let value = number(&value, "value")?;
        s.apply(|sprite| apply(sprite, Easing::Linear, time, time, value, value).map(|_| ()))
    });
}

fn register_vector(engine: &mut Engine, name: &str, apply: VectorMutator) {
    engine.register_fn(
        name,
        move |s: &mut SpriteHandle,
              easing: Dynamic,
              start: Dynamic,
              end: Dynamic,
              x1: Dynamic,
              y1: Dynamic,
              x2: Dynamic,
              y2: Dynamic| {
            let easing = easing_arg(&easing)?;
            let (start, end) = (number(&start, "start time")?, number(&end, "end time")?);
            let (from, to) = (vec2(&x1, &y1)?, vec2(&x2, &y2)?);
            s.apply(|sprite| apply(sprite, easing, start, end, from, to).map(|_| ()))
        },
    );
    engine.register_fn(
        name,
        move |s: &mut SpriteHandle, start: Dynamic, end: Dynamic, x1: Dynamic, y1: Dynamic, x2: Dynamic, y2: Dynamic| {
            let (start, end) = (number(&start, "start time")?, number(&end, "end time")?);
            let (from, to) = (vec2(&x1, &y1)?, vec2(&x2, &y2)?);
            s.apply(|sprite| apply(sprite, Easing::Linear, start, end, from, to).map(|_| ()))
        },
    );
    engine.register_fn(name, move |s: &mut SpriteHandle, time: Dynamic, x: Dynamic, y: Dynamic| {
        let time = number(&time, "time")?;
        let value = vec2(&x, &y)?;
        s.apply(|sprite| apply(sprite, Easing::Linear, time, time, value, value).map(|_| ()))
    });
}

fn register_flag(engine: &mut Engine, name: &str, apply: FlagMutator) {
    engine.register_fn(
        name,
        move |s: &mut SpriteHandle, easing: Dynamic, start: Dynamic, end: Dynamic| {
            let easing = easing_arg(&easing)?;
            let (start, end) = (number(&start, "start time")?, number(&end, "end time")?);
            s.apply(|sprite| apply(sprite, easing, start, end).map(|_| ()))
        },
    );
    engine.register_fn(name, move |s: &mut SpriteHandle, start: Dynamic, end: Dynamic| {
        let (start, end) = (number(&start, "start time")?, number(&end, "end time")?);
        s.apply(|sprite| apply(sprite, Easing::Linear, start, end).map(|_| ()))
    });
    engine.register_fn(name, move |s: &mut SpriteHandle, time: Dynamic| {
        let time = number(&time, "time")?;
        s.apply(|sprite| apply(sprite, Easing::Linear, time, time).map(|_| ()))
    });
}

fn register_colour(engine: &mut Engine, name: &str) {
    engine.register_fn(
        name,
        |s: &mut SpriteHandle,
         easing: Dynamic,
         start: Dynamic,
         end: Dynamic,
         r1: Dynamic,
         g1: Dynamic,
         b1: Dynamic,
         r2: Dynamic,
         g2: Dynamic,
         b2: Dynamic| {
            let easing = easing_arg(&easing)?;
            let (start, end) = (number(&start, "start time")?, number(&end, "end time")?);
            let (from, to) = (colour(&r1, &g1, &b1)?, colour(&r2, &g2, &b2)?);
            s.apply(|sprite| sprite.colour_eased(easing, start, end, from, to).map(|_| ()))
        },
    );
    engine.register_fn(
        name,
        |s: &mut SpriteHandle,
         start: Dynamic,
         end: Dynamic,
         r1: Dynamic,
         g1: Dynamic,
         b1: Dynamic,
         r2: Dynamic,
         g2: Dynamic,
         b2: Dynamic| {
            let (start, end) = (number(&start, "start time")?, number(&end, "end time")?);
            let (from, to) = (colour(&r1, &g1, &b1)?, colour(&r2, &g2, &b2)?);
            s.apply(|sprite| sprite.colour(start, end, from, to).map(|_| ()))
        },
    );
    engine.register_fn(
        name,
        |s: &mut SpriteHandle, time: Dynamic, r: Dynamic, g: Dynamic, b: Dynamic| {
            let time = number(&time, "time")?;
            let value = colour(&r, &g, &b)?;
            s.apply(|sprite| sprite.colour_at(time, value).map(|_| ()))
        },
    );
}

fn register_sprites(engine: &mut Engine) {
    register_vector(engine, "move_xy", Sprite::move_xy_eased);
    register_scalar(engine, "move_x", Sprite::move_x_eased);
    register_scalar(engine, "move_y", Sprite::move_y_eased);
    register_scalar(engine, "scale", Sprite::scale_eased);
    register_vector(engine, "scale_vec", Sprite::scale_vec_eased);
    register_scalar(engine, "rotate", Sprite::rotate_eased);
    register_scalar(engine, "fade", Sprite::fade_eased);
    register_colour(engine, "colour");
    register_colour(engine, "color");
    register_flag(engine, "flip_h", Sprite::flip_h_eased);
    register_flag(engine, "flip_v", Sprite::flip_v_eased);
    register_flag(engine, "additive", Sprite::additive_eased);

    engine.register_fn(
        "colour_hex",
        |s: &mut SpriteHandle, easing: Dynamic, start: Dynamic, end: Dynamic, from: &str, to: &str| {
            let easing = easing_arg(&easing)?;
            let (start, end) = (number(&start, "start time")?, number(&end, "end time")?);
            let (from, to) = (hex_colour(from)?, hex_colour(to)?);
            s.apply(|sprite| sprite.colour_eased(easing, start, end, from, to).map(|_| ()))
        },
    );
    engine.register_fn(
        "colour_hex",
        |s: &mut SpriteHandle, start: Dynamic, end: Dynamic, from: &str, to: &str| {
            let (start, end) = (number(&start, "start time")?, number(&end, "end time")?);
            s.apply(|sprite| sprite.colour_hex(start, end, from, to).map(|_| ()))
        },
    );
    engine.register_fn("colour_hex", |s: &mut SpriteHandle, time: Dynamic, hex: &str| {
        let time = number(&time, "time")?;
        s.apply(|sprite| sprite.colour_hex_at(time, hex).map(|_| ()))
    });

    engine.register_fn(
        "start_loop_group",
        |s: &mut SpriteHandle, start: Dynamic, iterations: Dynamic| {
            let start = number(&start, "loop start")?;
            let iterations = count(&iterations, "loop count")?;
            s.apply(|sprite| sprite.start_loop_group(start, iterations).map(|_| ()))
        },
    );
    engine.register_fn(
        "start_trigger_group",
        |s: &mut SpriteHandle, trigger: &str, start: Dynamic, end: Dynamic| {
            let (start, end) = (number(&start, "trigger start")?, number(&end, "trigger end")?);
            s.apply(|sprite| sprite.start_trigger_group(trigger, start, end, 0).map(|_| ()))
        },
    );
    engine.register_fn(
        "start_trigger_group",
        |s: &mut SpriteHandle, trigger: &str, start: Dynamic, end: Dynamic, group_number: Dynamic| {
            let (start, end) = (number(&start, "trigger start")?, number(&end, "trigger end")?);
            let group_number = integer(&group_number, "trigger group")?;
            s.apply(|sprite| sprite.start_trigger_group(trigger, start, end, group_number).map(|_| ()))
        },
    );
    engine.register_fn("end_group", |s: &mut SpriteHandle| {
        s.apply(|sprite| sprite.end_group().map(|_| ()))
    });

    engine.register_get("start_time", |s: &mut SpriteHandle| -> HostResult<f64> {
        s.read(Sprite::start_time)
    });
    engine.register_get("end_time", |s: &mut SpriteHandle| -> HostResult<f64> {
        s.read(Sprite::end_time)
    });
    engine.register_get("path", |s: &mut SpriteHandle| -> HostResult<String> {
        s.read(|sprite| sprite.path.clone())
    });
}

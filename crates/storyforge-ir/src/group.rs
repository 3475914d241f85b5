use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::element::{Animation, Sample, ScriptElement, Sprite};
use storyforge_core::{ExportTarget, GroupsConfig, Layer, LoopType, Origin, StoryResult, Vec2};

/// A named bag of elements contributed by one or more scripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// Elements in creation order.
    pub elements: Vec<ScriptElement>,
    pub visible: bool,
    pub export_target: ExportTarget,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
            visible: true,
            export_target: ExportTarget::Storyboard,
        }
    }

    /// Sprite on the background layer anchored top-left at (0, 0).
    pub fn create_sprite(&mut self, path: impl Into<String>) -> &mut Sprite {
        self.create_sprite_at(path, Layer::Background, Origin::TopLeft, Vec2::zero())
    }

    pub fn create_sprite_at(
        &mut self,
        path: impl Into<String>,
        layer: Layer,
        origin: Origin,
        position: Vec2,
    ) -> &mut Sprite {
        let index = self.elements.len();
        self.elements
            .push(ScriptElement::Sprite(Sprite::new(path, layer, origin, position)));
        match &mut self.elements[index] {
            ScriptElement::Sprite(sprite) => sprite,
            _ => unreachable!("element {index} was just pushed as a sprite"),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn create_animation(
        &mut self,
        path: impl Into<String>,
        layer: Layer,
        origin: Origin,
        position: Vec2,
        frame_count: u32,
        frame_delay: f64,
        loop_type: LoopType,
    ) -> StoryResult<&mut Animation> {
        let sprite = Sprite::new(path, layer, origin, position);
        let animation = Animation::new(sprite, frame_count, frame_delay, loop_type)?;
        let index = self.elements.len();
        self.elements.push(ScriptElement::Animation(animation));
        match &mut self.elements[index] {
            ScriptElement::Animation(animation) => Ok(animation),
            _ => unreachable!("element {index} was just pushed as an animation"),
        }
    }

    pub fn create_sample(
        &mut self,
        path: impl Into<String>,
        time: f64,
        volume: f64,
        layer: Layer,
    ) -> &mut Sample {
        let index = self.elements.len();
        self.elements
            .push(ScriptElement::Sample(Sample::new(path, time, volume, layer)));
        match &mut self.elements[index] {
            ScriptElement::Sample(sample) => sample,
            _ => unreachable!("element {index} was just pushed as a sample"),
        }
    }

    pub fn element_mut(&mut self, index: usize) -> Option<&mut ScriptElement> {
        self.elements.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// The groups of one script or one run, keyed by exact name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupSet {
    groups: Vec<Group>,
    index: HashMap<String, usize>,
}

impl GroupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-sensitive lookup that creates the group on first reference.
    pub fn get_or_create(&mut self, name: &str) -> &mut Group {
        let position = match self.index.get(name) {
            Some(&position) => position,
            None => {
                let position = self.groups.len();
                self.groups.push(Group::new(name));
                self.index.insert(name.to_string(), position);
                position
            }
        };
        &mut self.groups[position]
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.index.get(name).map(|&i| &self.groups[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Group> {
        match self.index.get(name) {
            Some(&i) => self.groups.get_mut(i),
            None => None,
        }
    }

    /// Group at `position` in the current ordering.
    pub fn by_index(&self, position: usize) -> Option<&Group> {
        self.groups.get(position)
    }

    pub fn by_index_mut(&mut self, position: usize) -> Option<&mut Group> {
        self.groups.get_mut(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn element_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// Fold another set in by group name, appending its elements after ours.
    pub fn merge(&mut self, other: GroupSet) {
        for group in other.groups {
            self.get_or_create(&group.name).elements.extend(group.elements);
        }
    }

    /// Overwrite visibility and export target from persisted settings.
    pub fn apply_settings(&mut self, config: &GroupsConfig) {
        for group in &mut self.groups {
            let settings = config.settings_for(&group.name);
            group.visible = settings.visible;
            group.export_target = settings.export_target;
        }
    }

    /// Reorder groups by an explicit name list.
    ///
    /// Listed names take key `position + 1`; unknown names take key 0 and
    /// therefore come before every listed group. The sort is stable.
    pub fn order_by(&mut self, order: &[String]) {
        let key = |name: &str| {
            order
                .iter()
                .position(|n| n == name)
                .map(|p| p + 1)
                .unwrap_or(0)
        };
        self.groups.sort_by_key(|g| key(&g.name));
        self.index = self
            .groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.name.clone(), i))
            .collect();
    }
}

use serde::{Deserialize, Serialize};

use crate::element::{ScriptElement, Video};
use crate::group::GroupSet;
use storyforge_core::Layer;

/// One element of the ordered stream, tagged with its owning group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEntry {
    /// Position of the owning group in the [`GroupSet`] ordering.
    pub group: usize,
    pub element: ScriptElement,
}

/// The ordered element stream handed to generation steps and encoders.
///
/// Entries are laid out layer by layer in [`Layer::ALL`] order. Inside a
/// layer, groups follow the group-set ordering and each group's elements
/// are stably sorted by `(start time, end time or 0)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementStream {
    pub video: Option<Video>,
    pub entries: Vec<StreamEntry>,
}

impl ElementStream {
    pub fn build(groups: &GroupSet, video: Option<Video>) -> Self {
        let mut entries = Vec::with_capacity(groups.element_count());
        for layer in Layer::ALL {
            for (position, group) in groups.iter().enumerate() {
                let mut selected: Vec<&ScriptElement> = group
                    .elements
                    .iter()
                    .filter(|e| e.layer() == layer)
                    .collect();
                selected.sort_by(|a, b| {
                    let (a_start, a_end) = a.sort_key();
                    let (b_start, b_end) = b.sort_key();
                    a_start.total_cmp(&b_start).then(a_end.total_cmp(&b_end))
                });
                entries.extend(selected.into_iter().map(|element| StreamEntry {
                    group: position,
                    element: element.clone(),
                }));
            }
        }
        Self { video, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.video.is_none()
    }

    /// Entries drawn on `layer`, in stream order.
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &StreamEntry> {
        self.entries.iter().filter(move |e| e.element.layer() == layer)
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut ScriptElement> {
        self.entries.iter_mut().map(|e| &mut e.element)
    }

    /// Drop entries failing `keep`, preserving the order of the rest.
    pub fn retain(&mut self, keep: impl FnMut(&StreamEntry) -> bool) {
        self.entries.retain(keep);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyforge_core::{Origin, Vec2};

    #[test]
    fn test_stream_is_layer_major() {
        let mut groups = GroupSet::new();
        let group = groups.get_or_create("G");
        group
            .create_sprite_at("front.png", Layer::Foreground, Origin::Centre, Vec2::zero())
            .fade_at(0.0, 1.0)
            .unwrap();
        group.create_sprite("back.png").fade_at(500.0, 1.0).unwrap();

        let stream = ElementStream::build(&groups, None);
        let paths: Vec<_> = stream.entries.iter().map(|e| e.element.path()).collect();
        assert_eq!(paths, vec!["back.png", "front.png"]);
        assert_eq!(stream.layer(Layer::Foreground).count(), 1);
    }

    #[test]
    fn test_point_elements_sort_before_same_start_spans() {
        let mut groups = GroupSet::new();
        let group = groups.get_or_create("G");
        group.create_sprite("span.png").fade(100.0, 300.0, 0.0, 1.0).unwrap();
        group.create_sample("hit.wav", 100.0, 100.0, Layer::Background);

        let stream = ElementStream::build(&groups, None);
        assert_eq!(stream.entries[0].element.path(), "hit.wav");
        assert_eq!(stream.entries[1].element.path(), "span.png");
    }

    #[test]
    fn test_exact_ties_keep_creation_order() {
        let mut groups = GroupSet::new();
        let group = groups.get_or_create("G");
        for name in ["first.png", "second.png", "third.png"] {
            group.create_sprite(name).fade(0.0, 100.0, 0.0, 1.0).unwrap();
        }
        let stream = ElementStream::build(&groups, None);
        let paths: Vec<_> = stream.entries.iter().map(|e| e.element.path()).collect();
        assert_eq!(paths, vec!["first.png", "second.png", "third.png"]);
    }
}

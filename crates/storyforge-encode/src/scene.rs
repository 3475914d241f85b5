//! In-memory scene graph for live preview.

use serde::{Deserialize, Serialize};
use storyforge_core::{Layer, StoryResult};
use storyforge_ir::{ElementStream, GroupSet, ScriptElement, Video};

use crate::StoryboardEncoder;

/// An element together with the name of the group that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneElement {
    pub group: String,
    pub element: ScriptElement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLayer {
    pub layer: Layer,
    pub elements: Vec<SceneElement>,
}

/// Per-layer ordered element lists, one entry for every [`Layer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGraph {
    pub video: Option<Video>,
    pub layers: Vec<SceneLayer>,
}

impl SceneGraph {
    pub fn layer(&self, layer: Layer) -> Option<&SceneLayer> {
        self.layers.iter().find(|l| l.layer == layer)
    }

    pub fn element_count(&self) -> usize {
        self.layers.iter().map(|l| l.elements.len()).sum()
    }

    /// Latest time any root-scope command or sample reaches.
    pub fn end_time(&self) -> f64 {
        self.layers
            .iter()
            .flat_map(|l| &l.elements)
            .map(|e| e.element.end_time().unwrap_or_else(|| e.element.start_time()))
            .fold(0.0, f64::max)
    }

    pub fn to_json(&self) -> StoryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SceneGraphEncoder;

impl SceneGraphEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl StoryboardEncoder for SceneGraphEncoder {
    type Output = SceneGraph;

    fn encode(&self, stream: &ElementStream, groups: &GroupSet) -> StoryResult<SceneGraph> {
        let layers = Layer::ALL
            .iter()
            .map(|&layer| SceneLayer {
                layer,
                elements: stream
                    .layer(layer)
                    .map(|entry| SceneElement {
                        group: groups
                            .by_index(entry.group)
                            .map(|g| g.name.clone())
                            .unwrap_or_default(),
                        element: entry.element.clone(),
                    })
                    .collect(),
            })
            .collect();

        let graph = SceneGraph {
            video: stream.video.clone(),
            layers,
        };
        tracing::debug!(elements = graph.element_count(), "built scene graph");
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storyforge_core::{Origin, Vec2};

    #[test]
    fn test_scene_graph_matches_stream_order() {
        let mut groups = GroupSet::new();
        let fx = groups.get_or_create("Fx");
        fx.create_sprite("late.png").fade_at(900.0, 1.0).unwrap();
        fx.create_sprite("early.png").fade(100.0, 400.0, 0.0, 1.0).unwrap();
        groups
            .get_or_create("Top")
            .create_sprite_at("top.png", Layer::Overlay, Origin::Centre, Vec2::zero())
            .fade_at(0.0, 1.0)
            .unwrap();

        let stream = ElementStream::build(&groups, Some(Video::new("bg.mp4", 0.0)));
        let graph = SceneGraphEncoder::new().encode(&stream, &groups).unwrap();

        assert_eq!(graph.layers.len(), 5);
        assert_eq!(graph.element_count(), 3);
        let background: Vec<_> = graph
            .layer(Layer::Background)
            .unwrap()
            .elements
            .iter()
            .map(|e| e.element.path())
            .collect();
        assert_eq!(background, vec!["early.png", "late.png"]);
        let overlay = &graph.layer(Layer::Overlay).unwrap().elements[0];
        assert_eq!(overlay.group, "Top");
        assert_eq!(graph.end_time(), 900.0);
        assert_eq!(graph.video.as_ref().unwrap().path, "bg.mp4");
    }

    #[test]
    fn test_scene_graph_json_is_tagged() {
        let mut groups = GroupSet::new();
        groups
            .get_or_create("G")
            .create_sample("hit.wav", 10.0, 50.0, Layer::Background);
        let stream = ElementStream::build(&groups, None);
        let json = SceneGraphEncoder::new()
            .encode(&stream, &groups)
            .unwrap()
            .to_json()
            .unwrap();
        assert!(json.contains("\"kind\": \"sample\""));
    }
}

use storyforge_core::{Layer, Origin, Vec2};
use storyforge_encode::{OsbEncoder, SceneGraphEncoder, StoryboardEncoder};
use storyforge_ir::{ElementStream, GroupSet, Video};

fn headers(text: &str) -> Vec<String> {
    text.lines()
        .filter(|l| l.starts_with("Sprite,") || l.starts_with("Sample,"))
        .map(str::to_string)
        .collect()
}

fn sample_groups() -> GroupSet {
    let mut groups = GroupSet::new();
    let fx = groups.get_or_create("Fx");
    fx.create_sprite_at("b.png", Layer::Foreground, Origin::Centre, Vec2::new(1.0, 2.0))
        .fade(500.0, 900.0, 0.0, 1.0)
        .unwrap();
    fx.create_sprite_at("a.png", Layer::Foreground, Origin::Centre, Vec2::new(1.0, 2.0))
        .fade(500.0, 700.0, 0.0, 1.0)
        .unwrap();
    fx.create_sample("kick.wav", 0.0, 100.0, Layer::Background);

    let intro = groups.get_or_create("Intro");
    intro.create_sprite("bg.png").fade(0.0, 10_000.0, 1.0, 1.0).unwrap();
    groups
}

#[test]
fn test_group_order_and_time_order_in_text() {
    let mut groups = sample_groups();
    groups.order_by(&["Intro".to_string(), "Fx".to_string()]);
    let stream = ElementStream::build(&groups, Some(Video::new("v.mp4", 0.0)));
    let text = OsbEncoder::new().encode(&stream, &groups).unwrap();

    assert_eq!(
        headers(&text),
        vec![
            "Sprite,Background,TopLeft,\"bg.png\",0,0",
            "Sprite,Foreground,Centre,\"a.png\",1,2",
            "Sprite,Foreground,Centre,\"b.png\",1,2",
            "Sample,0,0,\"kick.wav\",100",
        ]
    );
    assert!(text.contains(" F,0,0,10000,1\n"));
}

#[test]
fn test_encoders_agree_on_order() {
    let groups = sample_groups();
    let stream = ElementStream::build(&groups, None);
    let text = OsbEncoder::new().encode(&stream, &groups).unwrap();
    let graph = SceneGraphEncoder::new().encode(&stream, &groups).unwrap();

    let from_graph: Vec<String> = graph
        .layers
        .iter()
        .flat_map(|l| &l.elements)
        .filter(|e| e.element.sprite().is_some())
        .map(|e| e.element.path().to_string())
        .collect();
    let from_text: Vec<String> = headers(&text)
        .iter()
        .filter(|h| h.starts_with("Sprite,"))
        .filter_map(|h| h.split('"').nth(1).map(str::to_string))
        .collect();
    assert_eq!(from_graph, from_text);
}

#[test]
fn test_write_file_creates_parents() {
    let dir = std::env::temp_dir().join(format!("storyforge-encode-{}", std::process::id()));
    let path = dir.join("nested").join("story.osb");
    let groups = sample_groups();
    let stream = ElementStream::build(&groups, None);
    OsbEncoder::new().write_file(&stream, &groups, &path).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.starts_with("[Events]\n"));
    std::fs::remove_dir_all(dir).ok();
}

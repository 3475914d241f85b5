use storyforge_core::{Layer, Origin, Vec2};
use storyforge_ir::{ElementStream, GroupSet};

/// Builds a group set the way two scripts would, then merges them.
fn merged(order: &[&str]) -> GroupSet {
    let mut script_a = GroupSet::new();
    let intro = script_a.get_or_create("Intro");
    intro.create_sprite("late.png").fade(900.0, 1000.0, 0.0, 1.0).unwrap();
    intro.create_sprite("early.png").fade(100.0, 400.0, 0.0, 1.0).unwrap();
    intro.create_sample("clap.wav", 100.0, 80.0, Layer::Background);

    let mut script_b = GroupSet::new();
    let intro = script_b.get_or_create("Intro");
    intro.create_sprite("short.png").fade(100.0, 200.0, 0.0, 1.0).unwrap();
    intro
        .create_sprite_at("hud.png", Layer::Overlay, Origin::Centre, Vec2::new(320.0, 240.0))
        .fade_at(0.0, 1.0)
        .unwrap();
    script_b
        .get_or_create("Backdrop")
        .create_sprite("bg.png")
        .fade(0.0, 5000.0, 1.0, 1.0)
        .unwrap();

    let mut run = GroupSet::new();
    run.merge(script_a);
    run.merge(script_b);
    run.order_by(&order.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    run
}

#[test]
fn test_layer_order_is_non_decreasing_per_group() {
    let groups = merged(&["Intro", "Backdrop"]);
    let stream = ElementStream::build(&groups, None);

    for layer in Layer::ALL {
        for group in 0..groups.len() {
            let keys: Vec<_> = stream
                .layer(layer)
                .filter(|e| e.group == group)
                .map(|e| e.element.sort_key())
                .collect();
            assert!(
                keys.windows(2).all(|w| w[0].0 < w[1].0 || (w[0].0 == w[1].0 && w[0].1 <= w[1].1)),
                "keys out of order: {keys:?}"
            );
        }
    }
}

#[test]
fn test_merged_background_layout() {
    let groups = merged(&["Intro", "Backdrop"]);
    let stream = ElementStream::build(&groups, None);
    let background: Vec<_> = stream
        .layer(Layer::Background)
        .map(|e| e.element.path())
        .collect();
    assert_eq!(
        background,
        vec!["clap.wav", "short.png", "early.png", "late.png", "bg.png"]
    );
    let overlay: Vec<_> = stream.layer(Layer::Overlay).map(|e| e.element.path()).collect();
    assert_eq!(overlay, vec!["hud.png"]);
}

#[test]
fn test_unlisted_group_precedes_listed_groups() {
    let groups = merged(&["Intro"]);
    let names: Vec<_> = groups.names().collect();
    assert_eq!(names, vec!["Backdrop", "Intro"]);

    let stream = ElementStream::build(&groups, None);
    let first = stream.layer(Layer::Background).next().unwrap();
    assert_eq!(first.element.path(), "bg.png");
}

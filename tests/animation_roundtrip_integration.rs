//! Integration tests for animation data and playback.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test animation_roundtrip_integration
//! ```

use std::io::Cursor;
use std::time::Duration;

use migfx::components::sprite::Sprite;
use migfx::components::spriteanimator::SpriteAnimator;
use migfx::entity::Entity;
use migfx::primitives::{Color, Direction, Rect};
use migfx::resources::animation::{Animation, Frame};
use migfx::resources::animationstore::AnimationSet;
use migfx::serialization::{BinarySerializable, XmlSerializable};
use migfx::systems::animation::{Animator, PlaybackState};

const QUARTER: Duration = Duration::from_millis(250);

fn frame(column: u32) -> Frame {
    Frame::new(Rect::new(column as f32 * 32.0, 0.0, 32.0, 32.0), QUARTER)
}

fn walk() -> Animation {
    Animation::with_frames("walk", (0..4).map(frame)).unwrap()
}

fn walk_set() -> AnimationSet {
    let mut set = AnimationSet::new();
    assert!(set.add(walk(), false));
    set
}

// =============================================================================
// Animation data
// =============================================================================

#[test]
fn walk_animation_survives_binary_round_trip() {
    let mut stream = Vec::new();
    {
        let original = walk();
        assert_eq!(original.length(), Duration::from_secs(1));
        original.save_to_stream(&mut stream).unwrap();
    }

    let loaded = Animation::from_stream(&mut Cursor::new(stream)).unwrap();
    assert_eq!(loaded.length(), Duration::from_secs(1));
    assert_eq!(loaded.count(), 4);
    assert_eq!(loaded.id(), "walk");
}

#[test]
fn frame_modifiers_survive_xml_round_trip() {
    let mut animation = walk();
    animation
        .set(
            2,
            frame(2)
                .with_color(Color::new(10, 20, 30, 40))
                .with_orientation(Direction::Left)
                .with_flip(true, false),
        )
        .unwrap();
    let loaded = Animation::from_xml_str(&animation.to_xml()).unwrap();
    assert_eq!(loaded, animation);
    assert_eq!(loaded.get(2).unwrap().orientation, Direction::Left);
}

#[test]
fn animation_set_rejects_duplicate_ids() {
    let mut set = AnimationSet::new();
    for i in 0..10 {
        assert!(set.add(Animation::new(format!("as{i}")).unwrap(), false));
    }
    assert_eq!(set.len(), 10);

    assert!(!set.add(Animation::new("as0").unwrap(), false));
    assert_eq!(set.len(), 10);

    // Same id, any case, replaces only when asked to.
    assert!(set.add(walk(), false));
    assert!(set.add(Animation::with_frames("WALK", [frame(0)]).unwrap(), true));
    assert_eq!(set.len(), 11);
    assert_eq!(set.get("walk").unwrap().count(), 1);
}

#[test]
fn animation_set_round_trips_in_key_order() {
    let mut set = AnimationSet::new();
    for id in ["run", "idle", "Jump"] {
        set.add(Animation::with_frames(id, [frame(1)]).unwrap(), false);
    }
    let from_bytes = AnimationSet::from_bytes(&set.to_bytes().unwrap()).unwrap();
    let from_xml = AnimationSet::from_xml_str(&set.to_xml()).unwrap();
    assert_eq!(from_bytes, set);
    assert_eq!(from_xml, set);
    assert_eq!(from_xml.ids().collect::<Vec<_>>(), vec!["idle", "Jump", "run"]);
}

// =============================================================================
// Animator
// =============================================================================

#[test]
fn animator_walks_through_frames_and_wraps() {
    let mut animator = Animator::new(walk_set());
    assert_eq!(animator.state(), PlaybackState::Stopped);
    animator.play(Some("walk"));

    let mut seen = Vec::new();
    for _ in 0..5 {
        animator.update(QUARTER);
        seen.push(animator.frame_index());
    }
    assert_eq!(seen, vec![1, 2, 3, 0, 1]);
    assert!(animator.is_playing());
}

#[test]
fn animator_without_looping_stops_after_last_frame() {
    let mut animator = Animator::new(walk_set());
    animator.set_looping(false);
    animator.play(None);
    for _ in 0..4 {
        animator.update(QUARTER);
    }
    assert_eq!(animator.frame_index(), 0);
    assert!(!animator.is_playing());
    assert_eq!(animator.state(), PlaybackState::Stopped);
}

#[test]
fn animator_multiplier_slows_playback() {
    let mut animator = Animator::new(walk_set());
    animator.set_multiplier(2.0);
    animator.play(None);
    animator.update(QUARTER);
    assert_eq!(animator.frame_index(), 0);
    animator.update(QUARTER);
    assert_eq!(animator.frame_index(), 1);
}

#[test]
fn animator_ignores_unknown_selection() {
    let mut animator = Animator::new(walk_set());
    assert!(animator.set_selected("walk"));
    assert!(!animator.set_selected("swim"));
    assert_eq!(animator.selected(), "walk");
}

#[test]
fn animator_round_trip_keeps_playback_state() {
    let mut animator = Animator::new(walk_set());
    animator.play(Some("walk"));
    animator.update(QUARTER);
    animator.pause();
    assert_eq!(animator.state(), PlaybackState::Paused);

    let loaded = Animator::from_bytes(&animator.to_bytes().unwrap()).unwrap();
    assert_eq!(loaded, animator);
    assert_eq!(loaded.frame_index(), 1);
    assert_eq!(Animator::from_xml_str(&animator.to_xml()).unwrap(), animator);
}

// =============================================================================
// SpriteAnimator on an entity
// =============================================================================

#[test]
fn sprite_animator_drives_sprite_region() {
    let mut hero = Entity::new("hero").unwrap();
    let mut animator = Animator::new(walk_set());
    animator.play(Some("walk"));
    hero.with_component(SpriteAnimator::new(animator), false)
        .unwrap();

    let region = |e: &Entity| e.get_component::<Sprite>().unwrap().image().rect;
    assert_eq!(region(&hero), frame(0).rect);

    hero.update(QUARTER);
    assert_eq!(region(&hero), frame(1).rect);
    hero.update(QUARTER);
    assert_eq!(region(&hero), frame(2).rect);

    let loaded = Entity::from_xml_str(&hero.to_xml()).unwrap();
    assert_eq!(loaded, hero);
    assert_eq!(region(&loaded), frame(2).rect);
}

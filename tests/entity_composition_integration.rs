//! Integration tests for entity composition rules and persistence.
//!
//! # Usage
//!
//! ```sh
//! cargo test --test entity_composition_integration
//! ```

use std::io::Cursor;

use migfx::components::ComponentKind;
use migfx::components::button::Button;
use migfx::components::fillbar::FillBar;
use migfx::components::label::Label;
use migfx::components::sprite::Sprite;
use migfx::components::textbox::TextBox;
use migfx::components::transform::Transform;
use migfx::entity::Entity;
use migfx::error::{CompositionError, SerializeError};
use migfx::primitives::{Color, Direction, Vector2f};
use migfx::serialization::{BinarySerializable, XmlSerializable};

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn kinds(entity: &Entity) -> Vec<ComponentKind> {
    entity.component_kinds().collect()
}

/// Every required kind present, no incompatible pair present.
fn is_consistent(entity: &Entity) -> bool {
    let attached = kinds(entity);
    attached.iter().all(|kind| {
        kind.required().iter().all(|r| attached.contains(r))
            && attached.iter().all(|other| kind.is_compatible_with(*other))
    })
}

#[test]
fn every_kind_can_be_added_to_an_empty_entity() {
    for kind in ComponentKind::ALL {
        let mut entity = Entity::new("blank").unwrap();
        entity.add_component_kind(kind, false).unwrap();
        assert!(entity.has_component(kind), "{kind}");
        assert!(is_consistent(&entity), "{kind}");
        assert_eq!(kinds(&entity).last(), Some(&kind));
    }
}

#[test]
fn widgets_are_mutually_exclusive() {
    let widgets = [
        ComponentKind::Button,
        ComponentKind::CheckBox,
        ComponentKind::FillBar,
        ComponentKind::TextBox,
    ];
    for first in widgets {
        for second in widgets.into_iter().filter(|k| *k != first) {
            let mut entity = Entity::new("widget").unwrap();
            entity.add_component_kind(first, false).unwrap();
            let before = kinds(&entity);
            let err = entity.add_component_kind(second, false).err();
            assert!(
                matches!(
                    err,
                    Some(CompositionError::Incompatible { .. })
                        | Some(CompositionError::Unsatisfiable { .. })
                ),
                "{first} then {second}: {err:?}"
            );
            assert_eq!(kinds(&entity), before);
        }
    }
}

#[test]
fn button_pulls_in_sprite_label_and_transform_once() {
    let mut entity = Entity::new("ok").unwrap();
    entity.add_component::<Button>(false).unwrap();
    assert_eq!(
        kinds(&entity),
        vec![
            ComponentKind::Transform,
            ComponentKind::Sprite,
            ComponentKind::Label,
            ComponentKind::Button,
        ]
    );
}

#[test]
fn removal_respects_dependents() {
    let mut entity = Entity::new("field").unwrap();
    entity.add_component::<TextBox>(false).unwrap();

    assert!(matches!(
        entity.remove_component::<Label>(),
        Err(CompositionError::RequiredBy {
            required_by: ComponentKind::TextBox,
            ..
        })
    ));
    entity.remove_component::<TextBox>().unwrap();
    entity.remove_component::<Label>().unwrap();
    assert_eq!(kinds(&entity), vec![ComponentKind::Transform]);
    assert!(is_consistent(&entity));
}

#[test]
fn transform_updates_flow_into_sprite_vertices() {
    let mut entity = Entity::new("tile").unwrap();
    entity.add_component::<Sprite>(false).unwrap();
    {
        let transform = entity.get_component_mut::<Transform>().unwrap();
        transform.set_position(Vector2f::new(10.0, 20.0));
        transform.set_size(Vector2f::new(4.0, 8.0));
    }
    entity.update(Default::default());

    let vertices = entity.get_component::<Sprite>().unwrap().vertices();
    assert!(approx_eq(vertices[0].position.x, 10.0));
    assert!(approx_eq(vertices[2].position.x, 14.0));
    assert!(approx_eq(vertices[2].position.y, 28.0));
}

#[test]
fn tree_round_trips_through_both_formats() {
    let mut root = Entity::new("hud").unwrap();
    root.add_component::<Transform>(false).unwrap();

    let mut health = Entity::new("health").unwrap();
    health
        .with_component(FillBar::new(0.6, Color::new(220, 30, 30, 255), Direction::Right), false)
        .unwrap();
    health.get_component_mut::<Transform>().unwrap().set_rotation(90.0);
    root.add_child(health);

    let mut title = Entity::new("title").unwrap();
    title.add_component::<Label>(false).unwrap().set_text("Level <1> & \"more\"");
    root.add_child(title);

    let mut stream = Vec::new();
    root.save_to_stream(&mut stream).unwrap();
    let from_bytes = Entity::from_stream(&mut Cursor::new(stream)).unwrap();
    assert_eq!(from_bytes, root);

    let document = root.to_element().to_document();
    let from_xml = Entity::from_xml_str(&document).unwrap();
    assert_eq!(from_xml, root);
    assert_eq!(from_xml.tree_size(), 3);
    assert_eq!(
        from_xml.find("title").unwrap().get_component::<Label>().unwrap().text(),
        "Level <1> & \"more\""
    );
    assert!(approx_eq(
        from_xml.find("health").unwrap().get_component::<FillBar>().unwrap().fill(),
        0.6
    ));
}

#[test]
fn truncated_stream_is_an_error() {
    let mut entity = Entity::new("short").unwrap();
    entity.add_component::<Label>(false).unwrap();
    let bytes = entity.to_bytes().unwrap();
    let result = Entity::from_bytes(&bytes[..bytes.len() / 2]);
    assert!(matches!(result, Err(SerializeError::Io(_))));
}

#[test]
fn loading_conflicting_components_fails() {
    let mut button = Entity::new("x").unwrap();
    button.add_component::<Button>(false).unwrap();
    let mut xml = button.to_xml();
    // Splice a FillBar next to the Button.
    let bar = FillBar::default().to_xml();
    xml = xml.replace("</Components>", &format!("{bar}</Components>"));
    assert!(matches!(
        Entity::from_xml_str(&xml),
        Err(SerializeError::Composition(CompositionError::Incompatible { .. }))
    ));
}

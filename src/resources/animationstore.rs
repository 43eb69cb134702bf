//! Animation library keyed by case-insensitive identifier.
//!
//! An [`AnimationSet`] owns its animations. Keys are the lower-cased ids, so
//! `"Walk"` and `"WALK"` refer to the same entry. Iteration follows ascending
//! key order, which is also what "the first animation" means for the
//! [`Animator`](crate::systems::animation::Animator).

use std::collections::BTreeMap;
use std::collections::btree_map;

use log::debug;

use crate::error::{SerializeError, SerializeResult};
use crate::resources::animation::Animation;
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{
    BinaryReader, BinarySerializable, BinaryWriter, XmlSerializable, impl_xml_display,
};

/// Case-insensitive name → [`Animation`] collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationSet {
    animations: BTreeMap<String, Animation>,
}

impl AnimationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an animation.
    ///
    /// Returns `false` and leaves the set unchanged when an animation with the
    /// same id exists and `replace` is false.
    pub fn add(&mut self, animation: Animation, replace: bool) -> bool {
        let key = animation.key();
        if !replace && self.animations.contains_key(&key) {
            debug!("Animation '{}' already exists, not replacing", animation.id());
            return false;
        }
        self.animations.insert(key, animation);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Animation> {
        self.animations.get(&id.to_lowercase())
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Animation> {
        self.animations.get_mut(&id.to_lowercase())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.animations.contains_key(&id.to_lowercase())
    }

    pub fn remove(&mut self, id: &str) -> Option<Animation> {
        self.animations.remove(&id.to_lowercase())
    }

    /// First animation in iteration order.
    pub fn first(&self) -> Option<&Animation> {
        self.animations.values().next()
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn clear(&mut self) {
        self.animations.clear();
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, Animation> {
        self.animations.values()
    }

    /// Original-case ids in iteration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.animations.values().map(Animation::id)
    }
}

impl<'a> IntoIterator for &'a AnimationSet {
    type Item = &'a Animation;
    type IntoIter = btree_map::Values<'a, String, Animation>;

    fn into_iter(self) -> Self::IntoIter {
        self.animations.values()
    }
}

impl FromIterator<Animation> for AnimationSet {
    /// Later animations replace earlier ones with the same id.
    fn from_iter<I: IntoIterator<Item = Animation>>(iter: I) -> Self {
        let mut set = Self::new();
        for animation in iter {
            set.add(animation, true);
        }
        set
    }
}

impl BinarySerializable for AnimationSet {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write_len(self.animations.len())?;
        for animation in self.animations.values() {
            w.write(animation)?;
        }
        Ok(())
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        let mut set = Self::new();
        for animation in r.read_vec::<Animation>()? {
            let id = animation.id().to_string();
            if !set.add(animation, false) {
                return Err(SerializeError::invalid(format!(
                    "duplicate animation id '{id}'"
                )));
            }
        }
        Ok(set)
    }
}

impl XmlSerializable for AnimationSet {
    const ELEMENT: &'static str = "AnimationSet";

    fn to_element(&self) -> XmlElement {
        xml::list_element(Self::ELEMENT, self.iter().map(Animation::to_element))
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        let mut set = Self::new();
        for child in xml::child_elements(node) {
            let animation = Animation::from_element(child)?;
            let id = animation.id().to_string();
            if !set.add(animation, false) {
                return Err(SerializeError::invalid(format!(
                    "duplicate animation id '{id}'"
                )));
            }
        }
        Ok(set)
    }
}

impl_xml_display!(AnimationSet);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Rect;
    use crate::resources::animation::Frame;
    use std::time::Duration;

    fn anim(id: &str, frames: usize) -> Animation {
        Animation::with_frames(
            id,
            (0..frames).map(|i| {
                Frame::new(
                    Rect::new(i as f32 * 16.0, 0.0, 16.0, 16.0),
                    Duration::from_millis(100),
                )
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut set = AnimationSet::new();
        assert!(set.add(anim("Walk", 2), false));
        assert!(set.contains("walk"));
        assert!(set.contains("WALK"));
        assert_eq!(set.get("wAlK").unwrap().id(), "Walk");
        assert!(set.get("run").is_none());
    }

    #[test]
    fn test_duplicate_without_replace_fails() {
        let mut set = AnimationSet::new();
        assert!(set.add(anim("walk", 2), false));
        assert!(!set.add(anim("WALK", 5), false));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("walk").unwrap().count(), 2);
    }

    #[test]
    fn test_duplicate_with_replace_overwrites() {
        let mut set = AnimationSet::new();
        set.add(anim("walk", 2), false);
        assert!(set.add(anim("Walk", 5), true));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("walk").unwrap().count(), 5);
    }

    #[test]
    fn test_first_is_lowest_key() {
        let set: AnimationSet = [anim("run", 1), anim("Idle", 1), anim("jump", 1)]
            .into_iter()
            .collect();
        assert_eq!(set.first().unwrap().id(), "Idle");
        assert_eq!(set.ids().collect::<Vec<_>>(), vec!["Idle", "jump", "run"]);
    }

    #[test]
    fn test_remove() {
        let mut set = AnimationSet::new();
        set.add(anim("walk", 1), false);
        assert!(set.remove("WALK").is_some());
        assert!(set.is_empty());
        assert!(set.remove("walk").is_none());
    }

    #[test]
    fn test_duplicate_ids_in_xml_rejected() {
        let text = r#"<AnimationSet><Animation ID="a"/><Animation ID="A"/></AnimationSet>"#;
        assert!(AnimationSet::from_xml_str(text).is_err());
    }

    #[test]
    fn test_xml_round_trip() {
        let set: AnimationSet = [anim("walk", 3), anim("idle", 1)].into_iter().collect();
        let back = AnimationSet::from_xml_str(&set.to_xml()).unwrap();
        assert_eq!(back, set);
    }
}

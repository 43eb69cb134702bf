//! Entities: a named bag of components plus child entities.
//!
//! An [`Entity`] owns its components exclusively, in registration order, and
//! keeps the set consistent with the [`ComponentKind`] registry at every
//! mutation:
//!
//! - every required kind of every attached component is attached;
//! - no two attached kinds are incompatible;
//! - at most one component per kind.
//!
//! Adding a component auto-adds the defaults for any missing requirements
//! (dependencies first). Any failed attach or removal leaves the entity
//! unchanged.
//!
//! Children are owned by value and processed after their parent's own
//! components on update, event handling and draw.

use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;
use smallvec::SmallVec;

use crate::components::{Component, ComponentKind, ComponentType, DrawContext, Siblings};
use crate::error::{ArgumentError, CompositionError, SerializeError, SerializeResult};
use crate::events::input::InputEvent;
use crate::resources::animation::validate_id;
use crate::resources::assets::Assets;
use crate::resources::rendertarget::RenderTarget;
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{
    BinaryReader, BinarySerializable, BinaryWriter, XmlSerializable, impl_xml_display,
};

/// Kinds to attach, dependencies first.
type AttachPlan = SmallVec<[ComponentKind; 4]>;

#[derive(Debug)]
pub struct Entity {
    id: String,
    components: Vec<Box<dyn Component>>,
    children: Vec<Entity>,
    parent: Option<String>,
}

impl Entity {
    pub fn new(id: impl Into<String>) -> Result<Self, ArgumentError> {
        Ok(Self {
            id: validate_id(id)?,
            components: Vec::new(),
            children: Vec::new(),
            parent: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rename; components and children follow. Fails on a child entity,
    /// see [`Entity::rename_child`].
    pub fn set_id(&mut self, id: impl Into<String>) -> Result<(), ArgumentError> {
        if self.parent.is_some() {
            return Err(ArgumentError::ChildRename(self.id.clone()));
        }
        self.rename(validate_id(id)?);
        Ok(())
    }

    fn rename(&mut self, id: String) {
        self.id = id;
        for component in &mut self.components {
            component.base_mut().owner = Some(self.id.clone());
        }
        for child in &mut self.children {
            child.parent = Some(self.id.clone());
        }
    }

    /// Id of the entity this one is a child of.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    fn index_of(&self, kind: ComponentKind) -> Option<usize> {
        self.components.iter().position(|c| c.kind() == kind)
    }

    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.index_of(kind).is_some()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Attached kinds in registration order.
    pub fn component_kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components.iter().map(|c| c.kind())
    }

    pub fn components(&self) -> impl Iterator<Item = &dyn Component> {
        self.components.iter().map(|c| c.as_ref())
    }

    pub fn component(&self, kind: ComponentKind) -> Option<&dyn Component> {
        self.index_of(kind).map(|i| self.components[i].as_ref())
    }

    pub fn component_mut(&mut self, kind: ComponentKind) -> Option<&mut dyn Component> {
        let index = self.index_of(kind)?;
        Some(self.components[index].as_mut())
    }

    pub fn get_component<T: ComponentType>(&self) -> Option<&T> {
        self.component(T::KIND)?.as_any().downcast_ref::<T>()
    }

    pub fn get_component_mut<T: ComponentType>(&mut self) -> Option<&mut T> {
        self.component_mut(T::KIND)?.as_any_mut().downcast_mut::<T>()
    }

    /// Kinds that adding `kind` would attach, dependencies first and `kind`
    /// last, after checking the resulting set for conflicts.
    fn plan_attach(
        &self,
        kind: ComponentKind,
        replace: bool,
    ) -> Result<AttachPlan, CompositionError> {
        if self.has_component(kind) && !replace {
            return Err(CompositionError::AlreadyAttached(kind));
        }

        let mut plan = AttachPlan::new();
        self.collect_missing(kind, &mut plan);
        if !plan.contains(&kind) {
            plan.push(kind);
        }

        for existing in self.component_kinds().filter(|k| *k != kind) {
            if !kind.is_compatible_with(existing) {
                return Err(CompositionError::Incompatible {
                    kind,
                    conflicts_with: existing,
                });
            }
        }
        for (i, added) in plan.iter().copied().enumerate().filter(|(_, k)| *k != kind) {
            let clashes_existing = self
                .component_kinds()
                .any(|existing| !added.is_compatible_with(existing));
            let clashes_planned = plan
                .iter()
                .enumerate()
                .any(|(j, other)| i != j && !added.is_compatible_with(*other));
            if clashes_existing || clashes_planned {
                return Err(CompositionError::Unsatisfiable {
                    kind,
                    requires: added,
                });
            }
        }
        Ok(plan)
    }

    /// Post-order walk of the requirement graph, skipping attached kinds.
    fn collect_missing(&self, kind: ComponentKind, plan: &mut AttachPlan) {
        for required in kind.required() {
            if !self.has_component(*required) && !plan.contains(required) {
                self.collect_missing(*required, plan);
                plan.push(*required);
            }
        }
    }

    /// Run `on_add` then `refresh` on the component at `index`.
    fn run_attach_hooks(&mut self, index: usize) {
        if let Some((component, mut siblings)) = Siblings::split(&mut self.components, index) {
            component.on_add(&mut siblings);
            component.refresh(&mut siblings);
        }
    }

    fn attach(&mut self, mut component: Box<dyn Component>) -> usize {
        component.base_mut().owner = Some(self.id.clone());
        let index = match self.index_of(component.kind()) {
            Some(index) => {
                let mut old = std::mem::replace(&mut self.components[index], component);
                old.dispose();
                index
            }
            None => {
                self.components.push(component);
                self.components.len() - 1
            }
        };
        self.run_attach_hooks(index);
        index
    }

    /// Attach `component`, auto-adding default instances of any missing
    /// required kinds first. With `replace`, an attached component of the
    /// same kind is disposed and swapped out in place.
    pub fn insert_component(
        &mut self,
        component: Box<dyn Component>,
        replace: bool,
    ) -> Result<&mut dyn Component, CompositionError> {
        let kind = component.kind();
        let plan = self.plan_attach(kind, replace).inspect_err(|e| warn!("{}: {e}", self.id))?;
        for dependency in plan.into_iter().filter(|k| *k != kind) {
            debug!("{}: adding required {dependency} for {kind}", self.id);
            self.attach(dependency.create());
        }
        let index = self.attach(component);
        Ok(self.components[index].as_mut())
    }

    /// Attach a default instance of `kind`.
    pub fn add_component_kind(
        &mut self,
        kind: ComponentKind,
        replace: bool,
    ) -> Result<&mut dyn Component, CompositionError> {
        self.insert_component(kind.create(), replace)
    }

    /// Attach a default `T`.
    pub fn add_component<T: ComponentType>(
        &mut self,
        replace: bool,
    ) -> Result<&mut T, CompositionError> {
        self.with_component(T::default(), replace)
    }

    /// Attach a configured `T`.
    pub fn with_component<T: ComponentType>(
        &mut self,
        component: T,
        replace: bool,
    ) -> Result<&mut T, CompositionError> {
        let attached = self.insert_component(Box::new(component), replace)?;
        attached
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(CompositionError::NotAttached(T::KIND))
    }

    /// Detach, dispose and return the component of `kind`.
    pub fn remove_component_kind(
        &mut self,
        kind: ComponentKind,
    ) -> Result<Box<dyn Component>, CompositionError> {
        let Some(index) = self.index_of(kind) else {
            return Err(CompositionError::NotAttached(kind));
        };
        if let Some(dependent) = self
            .component_kinds()
            .find(|other| *other != kind && other.required().contains(&kind))
        {
            let e = CompositionError::RequiredBy {
                kind,
                required_by: dependent,
            };
            warn!("{}: {e}", self.id);
            return Err(e);
        }
        let mut removed = self.components.remove(index);
        removed.dispose();
        removed.base_mut().owner = None;
        debug!("{}: removed {kind}", self.id);
        Ok(removed)
    }

    pub fn remove_component<T: ComponentType>(&mut self) -> Result<(), CompositionError> {
        self.remove_component_kind(T::KIND).map(|_| ())
    }

    /// Re-derive state of every component, in registration order.
    pub fn refresh(&mut self) {
        for index in 0..self.components.len() {
            if let Some((component, mut siblings)) = Siblings::split(&mut self.components, index) {
                component.refresh(&mut siblings);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Children
    // ---------------------------------------------------------------------

    /// Adopt `child`, replacing any child with the same id.
    pub fn add_child(&mut self, mut child: Entity) -> &mut Entity {
        child.parent = Some(self.id.clone());
        let index = match self.children.iter().position(|c| c.id == child.id) {
            Some(index) => {
                self.children[index] = child;
                index
            }
            None => {
                self.children.push(child);
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    pub fn remove_child(&mut self, id: &str) -> Option<Entity> {
        let index = self.children.iter().position(|c| c.id == id)?;
        let mut child = self.children.remove(index);
        child.parent = None;
        Some(child)
    }

    /// Rename the child `id`; fails if a sibling already uses `new_id`.
    pub fn rename_child(&mut self, id: &str, new_id: impl Into<String>) -> Result<(), ArgumentError> {
        let new_id = validate_id(new_id)?;
        if new_id != id && self.child(&new_id).is_some() {
            return Err(ArgumentError::DuplicateIdentifier(new_id));
        }
        let child = self
            .child_mut(id)
            .ok_or_else(|| ArgumentError::UnknownChild(id.to_string()))?;
        child.rename(new_id);
        Ok(())
    }

    pub fn child(&self, id: &str) -> Option<&Entity> {
        self.children.iter().find(|c| c.id == id)
    }

    pub fn child_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.children.iter_mut().find(|c| c.id == id)
    }

    pub fn children(&self) -> &[Entity] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Entity] {
        &mut self.children
    }

    /// This entity or the first descendant (depth first) with `id`.
    pub fn find(&self, id: &str) -> Option<&Entity> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Entity> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Number of entities in this tree, this one included.
    pub fn tree_size(&self) -> usize {
        1 + self.children.iter().map(Entity::tree_size).sum::<usize>()
    }

    // ---------------------------------------------------------------------
    // Frame hooks
    // ---------------------------------------------------------------------

    /// Update enabled components in registration order, then children.
    pub fn update(&mut self, dt: Duration) {
        for index in 0..self.components.len() {
            if let Some((component, mut siblings)) = Siblings::split(&mut self.components, index)
                && component.is_enabled()
            {
                component.update(dt, &mut siblings);
            }
        }
        for child in &mut self.children {
            child.update(dt);
        }
    }

    /// Deliver `event` to enabled components, then children.
    pub fn handle_event(&mut self, event: &InputEvent) {
        for index in 0..self.components.len() {
            if let Some((component, mut siblings)) = Siblings::split(&mut self.components, index)
                && component.is_enabled()
            {
                component.handle_event(event, &mut siblings);
            }
        }
        for child in &mut self.children {
            child.handle_event(event);
        }
    }

    /// Draw visible components, enabled or not, then children.
    pub fn draw(&self, target: &mut dyn RenderTarget, assets: &mut Assets) {
        for component in self.components.iter().filter(|c| c.is_visible()) {
            let mut cx = DrawContext {
                target: &mut *target,
                assets: &mut *assets,
                components: &self.components,
            };
            component.draw(&mut cx);
        }
        for child in &self.children {
            child.draw(target, assets);
        }
    }

    // ---------------------------------------------------------------------
    // Loading
    // ---------------------------------------------------------------------

    /// Build an entity from decoded parts, checking the component rules and
    /// running the attach hooks.
    fn assemble(
        id: String,
        components: Vec<Box<dyn Component>>,
        children: Vec<Entity>,
    ) -> SerializeResult<Self> {
        let mut entity = Self::new(id)?;
        let kinds: Vec<ComponentKind> = components.iter().map(|c| c.kind()).collect();
        for (i, kind) in kinds.iter().enumerate() {
            if kinds[..i].contains(kind) {
                return Err(CompositionError::AlreadyAttached(*kind).into());
            }
            if let Some(requires) = kind.required().iter().find(|r| !kinds.contains(r)) {
                return Err(CompositionError::Unsatisfiable {
                    kind: *kind,
                    requires: *requires,
                }
                .into());
            }
            if let Some(other) = kinds[..i].iter().find(|o| !kind.is_compatible_with(**o)) {
                return Err(CompositionError::Incompatible {
                    kind: *kind,
                    conflicts_with: *other,
                }
                .into());
            }
        }
        for mut component in components {
            component.base_mut().owner = Some(entity.id.clone());
            entity.components.push(component);
        }
        for index in 0..entity.components.len() {
            entity.run_attach_hooks(index);
        }
        for mut child in children {
            if entity.child(&child.id).is_some() {
                return Err(ArgumentError::DuplicateIdentifier(child.id.clone()).into());
            }
            child.parent = Some(entity.id.clone());
            entity.children.push(child);
        }
        Ok(entity)
    }

    /// Serde-friendly outline of the tree.
    pub fn summary(&self) -> EntitySummary {
        EntitySummary {
            id: self.id.clone(),
            components: self.component_kinds().map(|k| k.type_name()).collect(),
            children: self.children.iter().map(Entity::summary).collect(),
        }
    }
}

/// Outline of an entity tree, for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySummary {
    pub id: String,
    pub components: Vec<&'static str>,
    pub children: Vec<EntitySummary>,
}

impl Clone for Entity {
    /// Deep copy, detached from any parent; the copy's components are owned by the copy.
    fn clone(&self) -> Self {
        let components = self
            .components
            .iter()
            .map(|c| {
                let mut copy = c.clone_component();
                copy.base_mut().owner = Some(self.id.clone());
                copy
            })
            .collect();
        let mut copy = Self {
            id: self.id.clone(),
            components,
            children: self.children.clone(),
            parent: None,
        };
        for child in &mut copy.children {
            child.parent = Some(copy.id.clone());
        }
        copy.refresh();
        copy
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.components.len() == other.components.len()
            && self
                .components
                .iter()
                .zip(&other.components)
                .all(|(a, b)| a.eq_component(b.as_ref()))
            && self.children == other.children
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        for component in &mut self.components {
            component.dispose();
        }
    }
}

impl BinarySerializable for Entity {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write_str(&self.id)?;
        w.write_len(self.components.len())?;
        for component in &self.components {
            w.write_u32(component.kind().tag())?;
            component.write_component(w)?;
        }
        w.write_len(self.children.len())?;
        for child in &self.children {
            child.write_binary(w)?;
        }
        Ok(())
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        let id = r.read_string()?;
        let count = r.read_len()?;
        let mut components = Vec::with_capacity(count.min(ComponentKind::ALL.len()));
        for _ in 0..count {
            let tag = r.read_u32()?;
            let kind = ComponentKind::from_tag(tag)
                .ok_or_else(|| SerializeError::UnknownComponent(format!("tag {tag}")))?;
            let mut component = kind.create();
            component.read_component(r)?;
            components.push(component);
        }
        let children = r.read_vec::<Entity>()?;
        Self::assemble(id, components, children)
    }
}

impl XmlSerializable for Entity {
    const ELEMENT: &'static str = "Entity";

    fn to_element(&self) -> XmlElement {
        XmlElement::new(Self::ELEMENT)
            .attr("ID", &self.id)
            .child(xml::list_element(
                "Components",
                self.components.iter().map(|c| c.component_element()),
            ))
            .child(xml::list_element(
                "Children",
                self.children.iter().map(Entity::to_element),
            ))
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        let id = xml::attr_str(node, "ID")?.to_string();
        let components = xml::child_elements(xml::child(node, "Components")?)
            .map(|element| -> SerializeResult<Box<dyn Component>> {
                let kind: ComponentKind = element.tag_name().name().parse()?;
                let mut component = kind.create();
                component.read_component_element(element)?;
                Ok(component)
            })
            .collect::<SerializeResult<Vec<_>>>()?;
        let children = match xml::optional_child(node, "Children") {
            Some(list) => xml::child_elements(list)
                .map(Entity::from_element)
                .collect::<SerializeResult<Vec<_>>>()?,
            None => Vec::new(),
        };
        Self::assemble(id, components, children)
    }
}

impl_xml_display!(Entity);

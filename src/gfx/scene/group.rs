//! Named collections of actors drawn as one object

use super::actor::Actor;
use crate::gfx::gpu::GpuContext;

/// Ordered parts sharing one name and one selection state
///
/// Flags set on the group are pushed down to every part so the parts render
/// the group's state. By convention the first part is the visual core and is
/// skipped when picking.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    parts: Vec<Actor>,
    visible: bool,
    pickable: bool,
    selectable: bool,
    selected: bool,
    highlighted: bool,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parts: Vec::new(),
            visible: true,
            pickable: true,
            selectable: false,
            selected: false,
            highlighted: false,
        }
    }

    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Adds a part, replacing any part with the same name in place
    pub fn add_part(&mut self, part: Actor) {
        match self.parts.iter_mut().find(|p| p.name() == part.name()) {
            Some(existing) => *existing = part,
            None => self.parts.push(part),
        }
    }

    pub fn part(&self, name: &str) -> Option<&Actor> {
        self.parts.iter().find(|p| p.name() == name)
    }

    pub fn part_mut(&mut self, name: &str) -> Option<&mut Actor> {
        self.parts.iter_mut().find(|p| p.name() == name)
    }

    pub fn parts(&self) -> &[Actor] {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> &mut [Actor] {
        &mut self.parts
    }

    /// Parts a pick ray is tested against
    pub fn pickable_parts(&self) -> impl Iterator<Item = &Actor> {
        self.parts.iter().skip(1)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_pickable(&self) -> bool {
        self.pickable
    }

    pub fn set_pickable(&mut self, pickable: bool) {
        self.pickable = pickable;
    }

    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    pub fn set_selectable(&mut self, selectable: bool) {
        self.selectable = selectable;
        for part in &mut self.parts {
            part.set_selectable(selectable);
        }
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
        for part in &mut self.parts {
            part.set_selected(selected);
        }
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
        for part in &mut self.parts {
            part.set_highlighted(highlighted);
        }
    }

    pub fn set_error_highlight(&mut self, value: bool) {
        for part in &mut self.parts {
            part.set_error_highlight(value);
        }
    }

    pub fn set_warning_highlight(&mut self, value: bool) {
        for part in &mut self.parts {
            part.set_warning_highlight(value);
        }
    }

    /// Releases the buffers of every part
    pub fn destroy(&mut self, gpu: &mut dyn GpuContext) {
        for part in &mut self.parts {
            part.destroy(gpu);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::gfx::gpu::CommandRecorder;
    use crate::gfx::scene::actor::Shape;
    use crate::gfx::shader_library::ShaderLibrary;

    fn cube(library: &Rc<ShaderLibrary>, name: &str) -> Actor {
        Actor::new(name, library, Shape::Cube { size: 1.0 })
    }

    #[test]
    fn flags_propagate_to_parts() {
        let mut gpu = CommandRecorder::new();
        let library = Rc::new(ShaderLibrary::new(&mut gpu).unwrap());
        let mut group = Group::new("marker");
        group.add_part(cube(&library, "core"));
        group.add_part(cube(&library, "arm"));

        group.set_selectable(true);
        group.set_selected(true);
        group.set_highlighted(true);

        assert!(group.parts().iter().all(|p| p.is_selected() && p.is_highlighted()));
        assert!(group.part("arm").unwrap().is_selectable());

        group.set_selected(false);
        assert!(group.parts().iter().all(|p| !p.is_selected()));
    }

    #[test]
    fn parts_keep_insertion_order_and_skip_the_core_for_picking() {
        let mut gpu = CommandRecorder::new();
        let library = Rc::new(ShaderLibrary::new(&mut gpu).unwrap());
        let mut group = Group::new("marker");
        for name in ["core", "x", "y"] {
            group.add_part(cube(&library, name));
        }
        group.add_part(cube(&library, "x"));

        let names: Vec<&str> = group.parts().iter().map(Actor::name).collect();
        assert_eq!(names, ["core", "x", "y"]);

        let pickable: Vec<&str> = group.pickable_parts().map(Actor::name).collect();
        assert_eq!(pickable, ["x", "y"]);
    }

    #[test]
    fn destroy_releases_every_part() {
        let mut gpu = CommandRecorder::new();
        let library = Rc::new(ShaderLibrary::new(&mut gpu).unwrap());
        let mut group = Group::new("pair");
        group.add_part(cube(&library, "a").build(&mut gpu).unwrap());
        group.add_part(cube(&library, "b").build(&mut gpu).unwrap());
        assert_eq!(gpu.live_buffers(), 2);

        group.destroy(&mut gpu);
        assert_eq!(gpu.live_buffers(), 0);
    }
}

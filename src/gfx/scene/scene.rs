use cgmath::{SquareMatrix, Vector2, Vector3, Vector4, Zero};

use super::actor::{Actor, RenderRole};
use super::drawable::{DrawStyle, Drawable, RenderContext, RenderPass, Shading};
use super::group::Group;
use super::light::Light;
use crate::gfx::camera::camera_utils::dehomogenize;
use crate::gfx::camera::Camera;
use crate::gfx::gpu::{GpuContext, PolygonOffset, Viewport};
use crate::gfx::picking::{PickResult, Ray};

/// Offset pushing filled polygons back so edges drawn on top win the depth test
pub const EDGE_POLYGON_OFFSET: PolygonOffset = PolygonOffset {
    factor: 1.0,
    units: 4.0,
};

/// Entry of a scene: a single actor or a group of parts
#[derive(Debug, Clone)]
pub enum SceneNode {
    Actor(Actor),
    Group(Group),
}

impl From<Actor> for SceneNode {
    fn from(actor: Actor) -> Self {
        SceneNode::Actor(actor)
    }
}

impl From<Group> for SceneNode {
    fn from(group: Group) -> Self {
        SceneNode::Group(group)
    }
}

impl SceneNode {
    pub fn name(&self) -> &str {
        match self {
            SceneNode::Actor(actor) => actor.name(),
            SceneNode::Group(group) => group.name(),
        }
    }

    /// Actors drawn for this node, in order
    pub fn parts(&self) -> &[Actor] {
        match self {
            SceneNode::Actor(actor) => std::slice::from_ref(actor),
            SceneNode::Group(group) => group.parts(),
        }
    }

    pub fn role(&self) -> RenderRole {
        match self {
            SceneNode::Actor(actor) => actor.role(),
            SceneNode::Group(_) => RenderRole::Normal,
        }
    }

    pub fn as_actor(&self) -> Option<&Actor> {
        match self {
            SceneNode::Actor(actor) => Some(actor),
            SceneNode::Group(_) => None,
        }
    }

    pub fn as_actor_mut(&mut self) -> Option<&mut Actor> {
        match self {
            SceneNode::Actor(actor) => Some(actor),
            SceneNode::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            SceneNode::Group(group) => Some(group),
            SceneNode::Actor(_) => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            SceneNode::Group(group) => Some(group),
            SceneNode::Actor(_) => None,
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            SceneNode::Actor(actor) => actor.is_visible(),
            SceneNode::Group(group) => group.is_visible(),
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        match self {
            SceneNode::Actor(actor) => actor.set_visible(visible),
            SceneNode::Group(group) => group.set_visible(visible),
        }
    }

    pub fn is_pickable(&self) -> bool {
        match self {
            SceneNode::Actor(actor) => actor.is_pickable(),
            SceneNode::Group(group) => group.is_pickable(),
        }
    }

    pub fn is_selectable(&self) -> bool {
        match self {
            SceneNode::Actor(actor) => actor.is_selectable(),
            SceneNode::Group(group) => group.is_selectable(),
        }
    }

    pub fn is_selected(&self) -> bool {
        match self {
            SceneNode::Actor(actor) => actor.is_selected(),
            SceneNode::Group(group) => group.is_selected(),
        }
    }

    pub fn set_selected(&mut self, selected: bool) {
        match self {
            SceneNode::Actor(actor) => actor.set_selected(selected),
            SceneNode::Group(group) => group.set_selected(selected),
        }
    }

    pub fn is_highlighted(&self) -> bool {
        match self {
            SceneNode::Actor(actor) => actor.is_highlighted(),
            SceneNode::Group(group) => group.is_highlighted(),
        }
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        match self {
            SceneNode::Actor(actor) => actor.set_highlighted(highlighted),
            SceneNode::Group(group) => group.set_highlighted(highlighted),
        }
    }

    pub fn destroy(&mut self, gpu: &mut dyn GpuContext) {
        match self {
            SceneNode::Actor(actor) => actor.destroy(gpu),
            SceneNode::Group(group) => group.destroy(gpu),
        }
    }
}

/// Ordered actors viewed through one camera
///
/// System actors (background, grid, axes) are drawn first and never take
/// part in selection or picking. User actors keep insertion order, which is
/// also the order they are drawn and picked in.
#[derive(Debug, Clone)]
pub struct Scene {
    name: String,
    camera: Camera,
    light: Light,
    lighting: bool,
    shading: Shading,
    draw_style: DrawStyle,
    system_actors: Vec<SceneNode>,
    actors: Vec<SceneNode>,
    selected: Option<String>,
    highlighted: Option<String>,
    viewport: Viewport,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            camera: Camera::new(),
            light: Light::default(),
            lighting: true,
            shading: Shading::default(),
            draw_style: DrawStyle::default(),
            system_actors: Vec::new(),
            actors: Vec::new(),
            selected: None,
            highlighted: None,
            viewport: Viewport::new(0, 0, 1, 1),
        }
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_light(mut self, light: Light) -> Self {
        self.light = light;
        self
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Uniform state shared by every draw of the frame
    pub fn render_context(&self) -> RenderContext {
        let view = self.camera.view_matrix();
        RenderContext {
            view,
            projection: self.camera.projection_matrix(),
            light: self.light.uniform(&view),
            lighting: self.lighting,
            shading: self.shading,
        }
    }

    /// Draws system actors, then user actors, into the scene's viewport
    ///
    /// Background and grid nodes get a single solid pass. With
    /// [`DrawStyle::SolidWithEdges`] every other part is drawn filled with a
    /// polygon offset and then again as wireframe with its edge material;
    /// other styles draw each part once in that style.
    pub fn render(&self, gpu: &mut dyn GpuContext) {
        gpu.set_viewport(self.viewport);
        gpu.clear_depth();

        let ctx = self.render_context();
        let with_edges = self.draw_style == DrawStyle::SolidWithEdges;

        for node in self.system_actors.iter().chain(&self.actors) {
            if !node.is_visible() {
                continue;
            }
            for part in node.parts().iter().filter(|part| part.is_visible()) {
                match node.role() {
                    RenderRole::Background | RenderRole::GridFloor => {
                        gpu.set_polygon_offset(None);
                        part.draw(gpu, &ctx, DrawStyle::Solid, RenderPass::Primary);
                    }
                    RenderRole::Normal if with_edges => {
                        gpu.set_polygon_offset(Some(EDGE_POLYGON_OFFSET));
                        part.draw(gpu, &ctx, DrawStyle::Solid, RenderPass::Primary);
                        gpu.set_polygon_offset(None);
                        part.draw(gpu, &ctx, DrawStyle::Wireframe, RenderPass::Edges);
                    }
                    RenderRole::Normal => {
                        gpu.set_polygon_offset(None);
                        part.draw(gpu, &ctx, self.draw_style, RenderPass::Primary);
                    }
                }
            }
        }
    }

    /// World-space ray through a point in normalized device coordinates
    ///
    /// The ray starts on the near plane. Returns `None` when the camera
    /// matrices cannot be inverted.
    pub fn ray(&self, point: Vector2<f32>) -> Option<Ray> {
        let inverse_projection = self.camera.projection_matrix().invert()?;
        let inverse_view = self.camera.view_matrix().invert()?;
        let unproject = |depth: f32| {
            let eye = dehomogenize(inverse_projection * Vector4::new(point.x, point.y, depth, 1.0));
            dehomogenize(inverse_view * eye.extend(1.0))
        };

        let near = unproject(-1.0);
        let inner = unproject(0.0);
        Some(Ray::new(near, inner - near))
    }

    /// Closest pickable user actor under a point in normalized device coordinates
    ///
    /// Groups are tested through their parts, skipping the first. On equal
    /// distances the earlier inserted candidate is kept.
    pub fn pick(&self, point: Vector2<f32>) -> Option<PickResult> {
        let ray = self.ray(point)?;
        let mut closest: Option<PickResult> = None;
        let mut consider = |name: &str, part: Option<&str>, distance: Option<f32>| {
            let Some(distance) = distance else {
                return;
            };
            if closest.as_ref().map_or(true, |best| distance < best.distance) {
                closest = Some(PickResult {
                    name: name.to_string(),
                    part: part.map(str::to_string),
                    distance,
                    point: ray.point_at(distance),
                });
            }
        };

        for node in &self.actors {
            if !node.is_pickable() || !node.is_visible() {
                continue;
            }
            match node {
                SceneNode::Actor(actor) => consider(actor.name(), None, actor.intersect(&ray)),
                SceneNode::Group(group) => {
                    for part in group.pickable_parts().filter(|p| p.is_pickable()) {
                        consider(group.name(), Some(part.name()), part.intersect(&ray));
                    }
                }
            }
        }

        if let Some(hit) = &closest {
            log::debug!("Picked '{}' at distance {:.3}", hit.name, hit.distance);
        }
        closest
    }

    /// Point where the ray under `point` crosses the plane `z = depth`
    ///
    /// Falls back to the origin when the plane is not crossed ahead of the ray.
    pub fn project(&self, point: Vector2<f32>, depth: f32) -> Vector3<f32> {
        self.ray(point)
            .and_then(|ray| ray.plane_z_distance(depth).map(|t| ray.point_at(t)))
            .unwrap_or_else(Vector3::zero)
    }

    /// Makes `name` the selected actor, `None` clears the selection
    ///
    /// Returns `false` and leaves the selection untouched for an unknown name.
    pub fn select_actor(&mut self, name: Option<&str>) -> bool {
        if let Some(name) = name {
            if !self.has_actor(name) {
                return false;
            }
        }

        if let Some(previous) = self.selected.take() {
            if let Some(node) = self.actor_mut(&previous) {
                node.set_selected(false);
            }
        }
        if let Some(name) = name {
            if let Some(node) = self.actor_mut(name) {
                node.set_selected(true);
            }
            self.selected = Some(name.to_string());
        }
        log::debug!("Scene '{}' selection: {:?}", self.name, self.selected);
        true
    }

    /// Makes `name` the highlighted actor, `None` clears the highlight
    pub fn highlight_actor(&mut self, name: Option<&str>) -> bool {
        if let Some(name) = name {
            if !self.has_actor(name) {
                return false;
            }
        }

        if let Some(previous) = self.highlighted.take() {
            if let Some(node) = self.actor_mut(&previous) {
                node.set_highlighted(false);
            }
        }
        if let Some(name) = name {
            if let Some(node) = self.actor_mut(name) {
                node.set_highlighted(true);
            }
            self.highlighted = Some(name.to_string());
        }
        log::debug!("Scene '{}' highlight: {:?}", self.name, self.highlighted);
        true
    }

    /// Appends a user actor, optionally selecting it
    ///
    /// A node whose name is already taken is handed back unchanged.
    pub fn add_actor(
        &mut self,
        node: impl Into<SceneNode>,
        select: bool,
    ) -> Result<&mut SceneNode, SceneNode> {
        let node = node.into();
        if self.has_actor(node.name()) || self.system_actor(node.name()).is_some() {
            log::warn!("Scene '{}' already has an actor named '{}'", self.name, node.name());
            return Err(node);
        }

        let name = node.name().to_string();
        let index = self.actors.len();
        self.actors.push(node);
        log::debug!("Added actor '{}' to scene '{}'", name, self.name);

        if select {
            self.select_actor(Some(&name));
        }
        Ok(&mut self.actors[index])
    }

    /// Removes and destroys a user actor
    ///
    /// When the removed actor was selected, the last selectable remaining
    /// actor becomes selected instead.
    pub fn remove_actor(&mut self, gpu: &mut dyn GpuContext, name: &str) -> bool {
        let Some(index) = self.actors.iter().position(|n| n.name() == name) else {
            return false;
        };

        let mut node = self.actors.remove(index);
        node.destroy(gpu);
        log::debug!("Removed actor '{}' from scene '{}'", name, self.name);

        if self.highlighted.as_deref() == Some(name) {
            self.highlighted = None;
        }
        if self.selected.as_deref() == Some(name) {
            self.selected = None;
            let next = self
                .actors
                .iter()
                .rev()
                .find(|n| n.is_selectable())
                .map(|n| n.name().to_string());
            self.select_actor(next.as_deref());
        }
        true
    }

    /// Appends an actor drawn before every user actor
    pub fn add_system_actor(
        &mut self,
        node: impl Into<SceneNode>,
    ) -> Result<&mut SceneNode, SceneNode> {
        let node = node.into();
        if self.system_actor(node.name()).is_some() || self.has_actor(node.name()) {
            return Err(node);
        }
        let index = self.system_actors.len();
        log::debug!("Added system actor '{}' to scene '{}'", node.name(), self.name);
        self.system_actors.push(node);
        Ok(&mut self.system_actors[index])
    }

    pub fn remove_system_actor(&mut self, gpu: &mut dyn GpuContext, name: &str) -> bool {
        let Some(index) = self.system_actors.iter().position(|n| n.name() == name) else {
            return false;
        };
        let mut node = self.system_actors.remove(index);
        node.destroy(gpu);
        true
    }

    /// Removes every user actor and releases its buffers
    pub fn clear(&mut self, gpu: &mut dyn GpuContext) {
        for node in &mut self.actors {
            node.destroy(gpu);
        }
        self.actors.clear();
        self.selected = None;
        self.highlighted = None;
    }

    /// Releases system and user actors alike
    pub fn destroy(&mut self, gpu: &mut dyn GpuContext) {
        self.clear(gpu);
        for node in &mut self.system_actors {
            node.destroy(gpu);
        }
        self.system_actors.clear();
    }

    pub fn has_actor(&self, name: &str) -> bool {
        self.actors.iter().any(|n| n.name() == name)
    }

    pub fn actor(&self, name: &str) -> Option<&SceneNode> {
        self.actors.iter().find(|n| n.name() == name)
    }

    pub fn actor_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        self.actors.iter_mut().find(|n| n.name() == name)
    }

    pub fn actors(&self) -> &[SceneNode] {
        &self.actors
    }

    pub fn system_actor(&self, name: &str) -> Option<&SceneNode> {
        self.system_actors.iter().find(|n| n.name() == name)
    }

    pub fn system_actor_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        self.system_actors.iter_mut().find(|n| n.name() == name)
    }

    pub fn system_actors(&self) -> &[SceneNode] {
        &self.system_actors
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut Light {
        &mut self.light
    }

    pub fn set_light(&mut self, light: Light) {
        self.light = light;
    }

    pub fn lighting(&self) -> bool {
        self.lighting
    }

    pub fn set_lighting(&mut self, lighting: bool) {
        self.lighting = lighting;
    }

    pub fn shading(&self) -> Shading {
        self.shading
    }

    pub fn set_shading(&mut self, shading: Shading) {
        self.shading = shading;
    }

    pub fn draw_style(&self) -> DrawStyle {
        self.draw_style
    }

    pub fn set_draw_style(&mut self, draw_style: DrawStyle) {
        self.draw_style = draw_style;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use cgmath::{InnerSpace, Matrix4};

    use super::*;
    use crate::gfx::geometry::BackgroundPalette;
    use crate::gfx::gizmos::OrientationMarker;
    use crate::gfx::gpu::{CommandRecorder, PolygonMode, ProgramKind};
    use crate::gfx::scene::actor::Shape;
    use crate::gfx::shader_library::ShaderLibrary;

    struct Fixture {
        gpu: CommandRecorder,
        library: Rc<ShaderLibrary>,
        scene: Scene,
    }

    fn fixture() -> Fixture {
        let mut gpu = CommandRecorder::new();
        let library = Rc::new(ShaderLibrary::new(&mut gpu).unwrap());
        let mut camera = Camera::new()
            .with_position(Vector3::new(0.0, 0.0, 3.5))
            .with_aspect_ratio(800.0 / 600.0);
        camera.point_at(Vector3::zero(), Vector3::unit_y());
        let scene = Scene::new("world")
            .with_camera(camera)
            .with_viewport(Viewport::new(0, 0, 800, 600));
        Fixture {
            gpu,
            library,
            scene,
        }
    }

    impl Fixture {
        fn cube(&mut self, name: &str) -> Actor {
            Actor::new(name, &self.library, Shape::Cube { size: 1.0 })
                .build(&mut self.gpu)
                .unwrap()
        }

        fn add_cube(&mut self, name: &str, select: bool) {
            let cube = self.cube(name);
            assert!(self.scene.add_actor(cube, select).is_ok());
        }
    }

    fn selected_count(scene: &Scene) -> usize {
        scene.actors().iter().filter(|n| n.is_selected()).count()
    }

    #[test]
    fn selecting_moves_the_flag() {
        let mut f = fixture();
        f.add_cube("a", false);
        f.add_cube("b", false);

        assert!(f.scene.select_actor(Some("a")));
        assert!(f.scene.select_actor(Some("b")));

        assert!(!f.scene.actor("a").unwrap().is_selected());
        assert!(f.scene.actor("b").unwrap().is_selected());
        assert_eq!(selected_count(&f.scene), 1);
        assert_eq!(f.scene.selected(), Some("b"));

        assert!(!f.scene.select_actor(Some("missing")));
        assert_eq!(f.scene.selected(), Some("b"));

        assert!(f.scene.select_actor(None));
        assert_eq!(selected_count(&f.scene), 0);
    }

    #[test]
    fn highlight_is_a_separate_slot() {
        let mut f = fixture();
        f.add_cube("a", true);
        f.add_cube("b", false);

        f.scene.highlight_actor(Some("b"));
        f.scene.highlight_actor(Some("a"));

        assert!(f.scene.actor("a").unwrap().is_highlighted());
        assert!(!f.scene.actor("b").unwrap().is_highlighted());
        assert_eq!(f.scene.selected(), Some("a"));
        assert_eq!(f.scene.highlighted(), Some("a"));
    }

    #[test]
    fn removing_the_selection_reselects_the_last_selectable() {
        let mut f = fixture();
        f.add_cube("a", false);
        f.add_cube("b", false);
        f.add_cube("c", true);
        let plain = Actor::new(
            "sphere",
            &f.library,
            Shape::Icosahedron {
                radius: 1.0,
                level: 0,
                colors: false,
            },
        );
        assert!(f.scene.add_actor(plain, false).is_ok());

        assert!(f.scene.remove_actor(&mut f.gpu, "c"));
        assert_eq!(f.scene.selected(), Some("b"));
        assert!(f.scene.actor("b").unwrap().is_selected());

        assert!(f.scene.remove_actor(&mut f.gpu, "a"));
        assert_eq!(f.scene.selected(), Some("b"));

        assert!(f.scene.remove_actor(&mut f.gpu, "b"));
        assert_eq!(f.scene.selected(), None);
        assert!(!f.scene.remove_actor(&mut f.gpu, "b"));
    }

    #[test]
    fn removing_destroys_buffers() {
        let mut f = fixture();
        f.add_cube("a", false);
        f.add_cube("b", false);
        assert_eq!(f.gpu.live_buffers(), 2);

        f.scene.remove_actor(&mut f.gpu, "a");
        assert_eq!(f.gpu.live_buffers(), 1);

        f.scene.clear(&mut f.gpu);
        assert_eq!(f.gpu.live_buffers(), 0);
        assert!(f.scene.actors().is_empty());
    }

    #[test]
    fn duplicate_names_are_handed_back() {
        let mut f = fixture();
        f.add_cube("a", false);
        let again = f.cube("a");

        let rejected = f.scene.add_actor(again, true).unwrap_err();
        assert_eq!(rejected.name(), "a");
        assert_eq!(f.scene.actors().len(), 1);
        assert_eq!(f.scene.selected(), None);
    }

    #[test]
    fn picking_the_centre_hits_the_front_face() {
        let mut f = fixture();
        f.add_cube("cube", false);

        let hit = f.scene.pick(Vector2::new(0.0, 0.0)).unwrap();
        assert_eq!(hit.name, "cube");
        assert_eq!(hit.part, None);

        // the ray starts on the near plane, 0.1 in front of the eye
        let expected = f.scene.camera().focal_distance() - 0.5 - f.scene.camera().near_plane();
        assert!((hit.distance - expected).abs() < 1e-3);
        assert!((hit.point.z - 0.5).abs() < 1e-3);

        assert!(f.scene.pick(Vector2::new(0.9, 0.9)).is_none());
    }

    #[test]
    fn ties_keep_the_first_inserted_actor() {
        let mut f = fixture();
        f.add_cube("first", false);
        f.add_cube("second", false);

        let hit = f.scene.pick(Vector2::new(0.0, 0.0)).unwrap();
        assert_eq!(hit.name, "first");

        let near = f.cube("near");
        let near = near.with_transform(Matrix4::from_translation(Vector3::new(0.0, 0.0, 1.0)));
        f.scene.add_actor(near, false).unwrap();
        assert_eq!(f.scene.pick(Vector2::new(0.0, 0.0)).unwrap().name, "near");
    }

    #[test]
    fn unpickable_and_system_actors_are_ignored() {
        let mut f = fixture();
        let background = Actor::new("background", &f.library, Shape::Background(BackgroundPalette::default()))
            .build(&mut f.gpu)
            .unwrap();
        f.scene.add_system_actor(background).unwrap();
        let hidden = f.cube("cube").with_pickable(false);
        f.scene.add_actor(hidden, false).unwrap();

        assert!(f.scene.pick(Vector2::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn groups_are_picked_through_their_parts() {
        let mut f = fixture();
        let marker = OrientationMarker::default().build(&mut f.gpu, &f.library).unwrap();
        f.scene.add_actor(marker, false).unwrap();

        // the sphere sits at the centre but is not a pick target; the z cone points at the eye
        let hit = f.scene.pick(Vector2::new(0.0, 0.0)).unwrap();
        assert_eq!(hit.name, "marker");
        assert_eq!(hit.part.as_deref(), Some("zaxis"));
    }

    #[test]
    fn project_intersects_the_depth_plane() {
        let f = fixture();
        let centre = f.scene.project(Vector2::new(0.0, 0.0), 0.0);
        assert!(centre.magnitude2() < 1e-6);

        let behind = f.scene.project(Vector2::new(0.0, 0.0), 10.0);
        assert_eq!(behind, Vector3::zero());
    }

    #[test]
    fn solid_with_edges_draws_two_passes_per_actor() {
        let mut f = fixture();
        f.add_cube("a", false);
        f.add_cube("b", false);
        f.scene.set_draw_style(DrawStyle::SolidWithEdges);
        f.gpu.clear_commands();

        f.scene.render(&mut f.gpu);

        let draws = f.gpu.draws();
        assert_eq!(draws.len(), 4);
        for pair in draws.chunks(2) {
            assert_eq!(pair[0].program, Some(ProgramKind::Phong));
            assert_eq!(pair[0].polygon_mode, PolygonMode::Fill);
            assert_eq!(pair[0].polygon_offset, Some(EDGE_POLYGON_OFFSET));
            assert_eq!(pair[1].program, Some(ProgramKind::WireframeMaterial));
            assert_eq!(pair[1].polygon_mode, PolygonMode::Line);
            assert_eq!(pair[1].polygon_offset, None);
        }
        assert_eq!(draws[0].geometry, draws[1].geometry);
        assert_ne!(draws[1].geometry, draws[2].geometry);
        assert_eq!(draws[0].viewport, Some(Viewport::new(0, 0, 800, 600)));
    }

    #[test]
    fn background_gets_one_solid_pass_before_user_actors() {
        let mut f = fixture();
        f.add_cube("cube", false);
        let background = Actor::new("background", &f.library, Shape::Background(BackgroundPalette::default()))
            .build(&mut f.gpu)
            .unwrap();
        f.scene.add_system_actor(background).unwrap();
        f.scene.set_draw_style(DrawStyle::SolidWithEdges);
        f.gpu.clear_commands();

        f.scene.render(&mut f.gpu);

        let draws = f.gpu.draws();
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].program, Some(ProgramKind::Background));
        assert_eq!(draws[0].polygon_offset, None);
        assert_eq!(draws[0].depth_policy, crate::gfx::gpu::DepthPolicy::Disabled);
        assert_eq!(draws[1].program, Some(ProgramKind::Phong));
    }

    #[test]
    fn plain_styles_draw_once_and_hidden_actors_are_skipped() {
        let mut f = fixture();
        f.add_cube("a", false);
        f.add_cube("b", false);
        f.scene.actor_mut("b").unwrap().set_visible(false);
        f.scene.set_draw_style(DrawStyle::Wireframe);
        f.scene.set_lighting(false);
        f.gpu.clear_commands();

        f.scene.render(&mut f.gpu);

        let draws = f.gpu.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].program, Some(ProgramKind::UniformMaterial));
        assert_eq!(draws[0].polygon_mode, PolygonMode::Line);
        // a plain wireframe pass keeps the surface material
        assert_eq!(draws[0].uniforms.unwrap().material.diffuse, Vector3::new(0.8, 0.8, 0.8));
    }
}

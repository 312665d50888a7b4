//! Interactive viewer demo
//!
//! Left drag rotates, right drag pans, the wheel zooms and a click selects.
//! Keys: 1-6 view presets, P lens, W/S/E/V draw style, L lighting, F shading,
//! A animation, G grid, X axes, Home reset, C/R store/recall, Esc quit.

use anyhow::Context;
use viewer3d::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = ViewerOptions::from_env()
        .context("Failed to read viewer options")?
        .with_title("viewer3d");
    let mut app = ViewerApp::new(options).context("Failed to create the event loop")?;

    app.set_setup(|gpu, renderer| {
        let library = renderer.library().clone();

        let cube = Actor::new("cube", &library, Shape::Cube { size: 0.6 })
            .with_material(Material::gold())
            .with_transform(Matrix4::from_translation(Vector3::new(1.2, 0.3, 0.0)))
            .build(gpu)?;

        let sphere = Actor::new(
            "sphere",
            &library,
            Shape::Icosahedron {
                radius: 0.35,
                level: 3,
                colors: false,
            },
        )
        .with_material(Material::ruby())
        .with_transform(Matrix4::from_translation(Vector3::new(-1.2, 0.35, 0.0)))
        .with_selectable(true)
        .build(gpu)?;

        let base = Actor::new(
            "pillar/base",
            &library,
            Shape::Cylinder {
                radius: 0.25,
                height: 0.2,
                resolution: 32,
            },
        )
        .with_material(Material::chrome())
        .with_transform(Matrix4::from_translation(Vector3::new(0.0, 0.1, -1.2)))
        .build(gpu)?;
        let column = Actor::new(
            "pillar/column",
            &library,
            Shape::Cylinder {
                radius: 0.12,
                height: 1.0,
                resolution: 32,
            },
        )
        .with_material(Material::emerald())
        .with_transform(Matrix4::from_translation(Vector3::new(0.0, 0.7, -1.2)))
        .build(gpu)?;

        let mut pillar = Group::new("pillar").with_selectable(true);
        pillar.add_part(base);
        pillar.add_part(column);

        let scene = renderer.scene_mut();
        for node in [SceneNode::from(cube), SceneNode::from(sphere), SceneNode::from(pillar)] {
            if let Err(mut rejected) = scene.add_actor(node, false) {
                rejected.destroy(gpu);
            }
        }
        Ok(())
    });

    app.run().context("Viewer exited with an error")?;
    Ok(())
}

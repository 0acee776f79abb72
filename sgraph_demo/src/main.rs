//! Scene graph demo application
//!
//! Builds a small two-link arm, clones it, moves a joint on the original and
//! logs the structure and bounds of both copies.
//!
//! Usage: `sgraph_demo [config.toml|config.ron]`

use std::rc::Rc;

use sgraph::config::{Config, ConfigError, SceneConfig};
use sgraph::foundation::logging;
use sgraph::foundation::math::{constants, Quat, Vector3, Vector3f};
use sgraph::geometry::MeshGenerator;
use sgraph::scene::{
    BoundingBox, SceneDumper, SgCamera, SgCloneMap, SgFog, SgGroup, SgLight, SgMaterial, SgMesh, SgNode, SgObject,
    SgPosTransform, SgShape, UpdateAction,
};
use sgraph::SceneError;
use thiserror::Error;

#[derive(Debug, Error)]
enum DemoError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("could not generate {0} mesh")]
    Geometry(&'static str),
}

/// Handles to the parts of the arm the demo edits later
struct Arm {
    root: Rc<SgGroup>,
    elbow: Rc<SgPosTransform>,
}

fn shape(mesh: Option<Rc<SgMesh>>, what: &'static str, material: &Rc<SgMaterial>) -> Result<Rc<SgShape>, DemoError> {
    let shape = SgShape::new();
    shape.set_name(what);
    shape.set_mesh(Some(mesh.ok_or(DemoError::Geometry(what))?));
    shape.set_material(Some(Rc::clone(material)));
    Ok(shape)
}

fn build_arm(generator: &mut MeshGenerator) -> Result<Arm, DemoError> {
    let metal = SgMaterial::new();
    metal.set_name("metal");
    metal.set_diffuse_color(Vector3f::new(0.6, 0.6, 0.65));
    metal.set_specular_color(Vector3f::new(0.9, 0.9, 0.9));

    let root = SgGroup::new();
    root.set_name("world");

    let base = shape(generator.generate_box(Vector3::new(0.4, 0.1, 0.4)), "base", &metal)?;
    root.add_child(base, true);

    // Both links share one cylinder mesh
    let link_mesh = generator.generate_cylinder(0.05, 0.5, true, true, true);
    let link = shape(link_mesh, "link", &metal)?;
    let joint = shape(generator.generate_sphere(0.07), "joint", &metal)?;

    let shoulder = SgPosTransform::from_translation(Vector3::new(0.0, 0.3, 0.0));
    shoulder.set_name("shoulder");
    shoulder.add_child(link.clone(), true);
    shoulder.add_child(joint.clone(), true);

    let elbow = SgPosTransform::from_translation(Vector3::new(0.0, 0.5, 0.0));
    elbow.set_name("elbow");
    elbow.add_child(link, true);
    elbow.add_child(joint, true);

    let tip = SgPosTransform::from_translation(Vector3::new(0.0, 0.35, 0.0));
    tip.set_name("tip");
    tip.add_child(shape(generator.generate_cone(0.06, 0.2, true, true), "gripper", &metal)?, true);
    elbow.add_child(tip, true);

    shoulder.add_child(elbow.clone(), true);
    root.add_child(shoulder, true);

    let light = SgLight::new_directional();
    light.set_name("sun");
    light.set_direction(Vector3::new(-1.0, -1.0, -1.0).normalize());
    root.add_child(light, true);

    let fog = SgFog::new();
    fog.set_name("haze");
    fog.set_visibility_range(25.0);
    root.add_child(fog, true);

    let eye = Vector3::new(2.0, 1.5, 2.0);
    let center = Vector3::new(0.0, 0.6, 0.0);
    if let Some(placement) = SgCamera::position_looking_at(&eye, &center, &Vector3::y()) {
        let mount = SgPosTransform::from_isometry(placement);
        mount.set_name("camera mount");
        mount.add_child(SgCamera::new_perspective(), true);
        root.add_child(mount, true);
    }

    Ok(Arm { root, elbow })
}

fn describe(label: &str, bbox: &BoundingBox) {
    let size = bbox.size();
    log::info!(
        "{} bounds: center ({:.3}, {:.3}, {:.3}), size ({:.3}, {:.3}, {:.3})",
        label,
        bbox.center().x,
        bbox.center().y,
        bbox.center().z,
        size.x,
        size.y,
        size.z
    );
}

fn run(config: &SceneConfig) -> Result<(), DemoError> {
    let mut generator = MeshGenerator::from_config(&config.mesh);
    let arm = build_arm(&mut generator)?;
    log::info!("Built arm scene:\n{}", SceneDumper::dump(&*arm.root));
    describe("Original", &arm.root.bounding_box());

    let mut map = SgCloneMap::from_config(&config.cloning);
    let copy = map.find_or_create_clone(&arm.root)?;
    log::info!("Cloned {} objects", map.len());

    // Bend the original elbow by 90 degrees around Z
    arm.elbow.set_rotation(Quat::from_axis_angle(&Vector3::z_axis(), constants::HALF_PI));
    arm.elbow.notify_update(UpdateAction::MODIFIED);

    describe("Original after bending", &arm.root.bounding_box());
    describe("Clone", &copy.bounding_box());
    log::debug!("Clone structure:\n{}", SceneDumper::dump(&*copy));
    Ok(())
}

fn main() -> Result<(), DemoError> {
    let config = match std::env::args().nth(1) {
        Some(path) => SceneConfig::load_from_file(&path)?,
        None => SceneConfig::default(),
    };
    config.validate()?;
    logging::init_with_level(&config.log_level);
    log::info!("Starting scene graph demo");

    if let Err(e) = run(&config) {
        log::error!("Demo failed: {}", e);
        return Err(e);
    }

    log::info!("Scene graph demo finished successfully");
    Ok(())
}

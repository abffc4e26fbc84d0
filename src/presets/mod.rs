use crate::math::{v, M3};
use crate::scene::{
    Cube, Cylinder, Material, MaterialId, MaterialTable, Object, Pattern, Plane, Scene,
    SceneConfig, SceneError, ShadowMode, Sphere,
};
use crate::shade::{Camera, InteractionState, Light};
use tracing::debug;

pub struct Preset {
    pub scene: Scene,
    pub config: SceneConfig,
    pub camera: Camera,
    pub light: Light,
    pub focal: f64,
}

pub const NAMES: [&str; 3] = ["showcase", "orbit", "floor"];

pub fn build(name: &str, state: InteractionState) -> Result<Preset, SceneError> {
    let preset = match name {
        "showcase" => showcase(state),
        "orbit" => orbit(state),
        "floor" => floor(state),
        other => return Err(SceneError::UnknownPreset(other.to_string())),
    }?;
    debug!(name, angle = state.rotation_angle, "built preset");
    Ok(preset)
}

fn rotate_y(angle: f64) -> M3 {
    let (s, c) = angle.sin_cos();
    M3::new(v(c, 0., -s), v(0., 1., 0.), v(s, 0., c))
}

const FLOOR: MaterialId = MaterialId(0);
const BALL: MaterialId = MaterialId(1);
const BLOCK: MaterialId = MaterialId(2);
const COLUMN: MaterialId = MaterialId(3);

fn checker_floor() -> Material {
    Material {
        pattern: Pattern::Checker {
            a: v(0.85, 0.85, 0.8),
            b: v(0.25, 0.3, 0.35),
            scale: 1.,
        },
        specular_exponent: 16.,
        specular_weight: 0.15,
    }
}

/// Sphere, cube and cylinder over a checkerboard floor with soft shadows;
/// the light swings with the interaction phase.
fn showcase(state: InteractionState) -> Result<Preset, SceneError> {
    let materials = MaterialTable::new(vec![
        (FLOOR, checker_floor()),
        (
            BALL,
            Material {
                pattern: Pattern::Solid(v(0.85, 0.2, 0.15)),
                specular_exponent: 32.,
                specular_weight: 0.8,
            },
        ),
        (
            BLOCK,
            Material {
                pattern: Pattern::Solid(v(0.2, 0.35, 0.8)),
                specular_exponent: 8.,
                specular_weight: 0.3,
            },
        ),
        (
            COLUMN,
            Material {
                pattern: Pattern::Solid(v(0.25, 0.7, 0.35)),
                specular_exponent: 16.,
                specular_weight: 0.5,
            },
        ),
    ]);
    let scene = Scene::new(
        vec![
            Object {
                shape: Box::new(Plane { height: 0. }),
                material: FLOOR,
            },
            Object {
                shape: Box::new(Sphere {
                    center: v(0., 1., 0.),
                    radius: 1.,
                }),
                material: BALL,
            },
            Object {
                shape: Box::new(Cube {
                    center: v(2.2, 0.6, -0.8),
                    half_extent: v(0.6, 0.6, 0.6),
                }),
                material: BLOCK,
            },
            Object {
                shape: Box::new(Cylinder {
                    origin: v(-2.1, 0., 0.9),
                    axis: v(0., 1., 0.),
                    radius: 0.5,
                    height: 1.8,
                }),
                material: COLUMN,
            },
        ],
        materials,
    )?;

    let phase = state.light_phase;
    let light = Light::at(v(4.5 * phase.cos(), 5.5, 4.5 * phase.sin()));
    let eye = rotate_y(state.rotation_angle) * v(0., 2.5, -6.5);
    Ok(Preset {
        scene,
        config: SceneConfig::default(),
        camera: Camera::look_at(eye, v(0., 0.8, 0.), 0.),
        light,
        focal: 1.8,
    })
}

/// Two spheres over a solid floor, hard shadows, attenuated orbiting light.
fn orbit(state: InteractionState) -> Result<Preset, SceneError> {
    let materials = MaterialTable::new(vec![
        (FLOOR, Material::matte(v(0.45, 0.45, 0.5))),
        (
            BALL,
            Material {
                pattern: Pattern::Solid(v(0.9, 0.65, 0.2)),
                specular_exponent: 48.,
                specular_weight: 1.,
            },
        ),
        (
            BLOCK,
            Material {
                pattern: Pattern::Solid(v(0.5, 0.2, 0.6)),
                specular_exponent: 12.,
                specular_weight: 0.4,
            },
        ),
    ]);
    let scene = Scene::new(
        vec![
            Object {
                shape: Box::new(Plane { height: -0.5 }),
                material: FLOOR,
            },
            Object {
                shape: Box::new(Sphere {
                    center: v(-1.2, 0.5, 0.),
                    radius: 1.,
                }),
                material: BALL,
            },
            Object {
                shape: Box::new(Sphere {
                    center: v(1.4, 0.1, 0.6),
                    radius: 0.6,
                }),
                material: BLOCK,
            },
        ],
        materials,
    )?;

    let phase = state.light_phase;
    let light = Light {
        position: v(3.5 * phase.cos(), 4., 3.5 * phase.sin()),
        linear_falloff: 0.03,
        quadratic_falloff: 0.005,
    };
    let config = SceneConfig {
        shadow: ShadowMode::Hard,
        background: v(0.08, 0.09, 0.12),
        ambient: 0.06,
        filmic: false,
        gamma: 2.1,
        max_steps: 96,
        ..SceneConfig::default()
    };
    let eye = rotate_y(state.rotation_angle) * v(0., 1.8, -5.5);
    Ok(Preset {
        scene,
        config,
        camera: Camera::look_at(eye, v(0., 0.2, 0.), 0.),
        light,
        focal: 1.5,
    })
}

/// A single infinite checkerboard plane; the marcher takes its closed-form
/// intersection path.
fn floor(state: InteractionState) -> Result<Preset, SceneError> {
    let scene = Scene::new(
        vec![Object {
            shape: Box::new(Plane { height: 0. }),
            material: FLOOR,
        }],
        MaterialTable::new(vec![(FLOOR, checker_floor())]),
    )?;
    let config = SceneConfig {
        shadow: ShadowMode::Hard,
        ambient: 0.15,
        filmic: false,
        ..SceneConfig::default()
    };
    let eye = rotate_y(state.rotation_angle) * v(0., 3., -8.);
    Ok(Preset {
        scene,
        config,
        camera: Camera::look_at(eye, v(0., 0., 2.), 0.),
        light: Light::at(v(6., 10., -4.)),
        focal: 1.6,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_preset_builds() {
        for name in NAMES {
            assert!(build(name, InteractionState::default()).is_ok(), "{name}");
        }
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(matches!(
            build("torus", InteractionState::default()),
            Err(SceneError::UnknownPreset(_))
        ));
    }

    #[test]
    fn floor_preset_is_a_single_plane_scene() {
        let preset = build("floor", InteractionState::default()).unwrap();
        assert!(preset.scene.as_single_plane().is_some());
    }

    #[test]
    fn rotation_moves_the_camera_eye() {
        let still = build("showcase", InteractionState::default()).unwrap();
        let turned = build(
            "showcase",
            InteractionState {
                rotation_angle: std::f64::consts::FRAC_PI_2,
                light_phase: 0.,
            },
        )
        .unwrap();
        assert!((still.camera.position.x - turned.camera.position.x).abs() > 1.);
    }
}

use crate::math::{abs2, add, mul, normalize, sub, v, V3, B1, B2, B3};
use crate::scene::{MaterialId, Plane, Scene, SceneConfig};

#[derive(Clone, Copy, Debug)]
pub struct MarchResult {
    pub travelled: f64,
    pub hit: Option<MaterialId>,
}

/// Sphere tracing: advance by the sampled scene distance, which never skips
/// a surface as long as no primitive overestimates its true distance.
/// Exhausting the step budget counts as a miss at the far bound.
pub fn march(scene: &Scene, origin: &V3, dir: &V3, cfg: &SceneConfig) -> MarchResult {
    if let Some((plane, material)) = scene.as_single_plane() {
        return intersect_plane(plane, material, origin, dir, cfg);
    }
    let mut travelled = cfg.near;
    for _ in 0..cfg.max_steps {
        let p = add(origin, &mul(travelled, dir));
        let sample = scene.sample(&p);
        if sample.distance < cfg.precision {
            return MarchResult {
                travelled,
                hit: Some(sample.material),
            };
        }
        travelled += sample.distance;
        if travelled > cfg.far {
            break;
        }
    }
    MarchResult {
        travelled: cfg.far,
        hit: None,
    }
}

// Single-plane scenes admit an exact closed-form intersection.
fn intersect_plane(
    plane: &Plane,
    material: MaterialId,
    origin: &V3,
    dir: &V3,
    cfg: &SceneConfig,
) -> MarchResult {
    let t = (plane.height - origin.y) / dir.y;
    if t.is_finite() && t >= cfg.near && t <= cfg.far {
        MarchResult {
            travelled: t,
            hit: Some(material),
        }
    } else {
        MarchResult {
            travelled: cfg.far,
            hit: None,
        }
    }
}

pub fn dsdf(scene: &Scene, x: &V3, eps: f64) -> V3 {
    let dx = scene.distance(&add(x, &mul(eps, &B1))) - scene.distance(&sub(x, &mul(eps, &B1)));
    let dy = scene.distance(&add(x, &mul(eps, &B2))) - scene.distance(&sub(x, &mul(eps, &B2)));
    let dz = scene.distance(&add(x, &mul(eps, &B3))) - scene.distance(&sub(x, &mul(eps, &B3)));
    v(dx, dy, dz)
}

/// Unit normal from the central-difference gradient of the field. Symmetric
/// singularities (sphere centers, cube corners) have no gradient; fall back
/// to a fixed axis rather than normalizing a zero vector into NaN.
pub fn normal(scene: &Scene, x: &V3, eps: f64) -> V3 {
    let g = dsdf(scene, x, eps);
    if abs2(&g) == 0. {
        return B2;
    }
    normalize(&g)
}

/// Any occluder between `origin` and the light fully blocks it. The caller
/// offsets `origin` off its surface by the shadow bias.
pub fn hard_shadow(
    scene: &Scene,
    origin: &V3,
    light_dir: &V3,
    min_t: f64,
    max_t: f64,
    cfg: &SceneConfig,
) -> f64 {
    let mut t = min_t;
    for _ in 0..cfg.max_steps {
        let d = scene.distance(&add(origin, &mul(t, light_dir)));
        if d < cfg.precision {
            return 0.;
        }
        t += d;
        if t >= max_t {
            break;
        }
    }
    1.
}

/// Penumbra marching after iq (http://iquilezles.org/www/articles/rmshadows/rmshadows.htm):
/// `d / t` tracks the angle subtended by the nearest occluder seen from the
/// shaded point, so grazing near-misses darken the result; `k` scales how
/// hard they are penalized.
pub fn soft_shadow(
    scene: &Scene,
    origin: &V3,
    light_dir: &V3,
    min_t: f64,
    max_t: f64,
    k: f64,
    cfg: &SceneConfig,
) -> f64 {
    let mut penumbra = 1.0f64;
    let mut t = min_t;
    for _ in 0..cfg.max_steps {
        let d = scene.distance(&add(origin, &mul(t, light_dir)));
        if d < cfg.precision {
            return 0.;
        }
        penumbra = penumbra.min(k * d / t);
        t += d;
        if t >= max_t {
            break;
        }
    }
    penumbra
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{abs, dot, O};
    use crate::scene::{Material, MaterialTable, Object, Sphere};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn table() -> MaterialTable {
        MaterialTable::new(vec![
            (MaterialId(0), Material::matte(v(1., 1., 1.))),
            (MaterialId(1), Material::matte(v(0.5, 0.5, 0.5))),
        ])
    }

    fn unit_sphere_scene() -> Scene {
        Scene::new(
            vec![Object {
                shape: Box::new(Sphere {
                    center: O,
                    radius: 1.,
                }),
                material: MaterialId(0),
            }],
            table(),
        )
        .unwrap()
    }

    #[test]
    fn march_hits_unit_sphere_at_expected_distance() {
        let cfg = SceneConfig::default();
        let result = march(&unit_sphere_scene(), &v(0., 0., -3.), &v(0., 0., 1.), &cfg);
        assert_eq!(result.hit, Some(MaterialId(0)));
        assert_abs_diff_eq!(result.travelled, 2., epsilon = 1e-2);
    }

    #[test]
    fn march_away_from_geometry_misses_at_far_bound() {
        let cfg = SceneConfig::default();
        let result = march(&unit_sphere_scene(), &v(0., 0., -3.), &v(0., 0., -1.), &cfg);
        assert!(result.hit.is_none());
        assert_relative_eq!(result.travelled, cfg.far);
    }

    fn plane_scene(height: f64) -> Scene {
        Scene::new(
            vec![Object {
                shape: Box::new(Plane { height }),
                material: MaterialId(1),
            }],
            table(),
        )
        .unwrap()
    }

    #[test]
    fn single_plane_uses_exact_intersection() {
        let cfg = SceneConfig::default();
        let dir = normalize(&v(0., -1., 1.));
        let result = march(&plane_scene(-1.), &v(0., 2., 0.), &dir, &cfg);
        assert_eq!(result.hit, Some(MaterialId(1)));
        assert_relative_eq!(result.travelled, 3. * 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn single_plane_miss_when_ray_points_up() {
        let cfg = SceneConfig::default();
        let result = march(&plane_scene(-1.), &v(0., 2., 0.), &v(0., 1., 0.), &cfg);
        assert!(result.hit.is_none());
        assert_relative_eq!(result.travelled, cfg.far);
    }

    #[test]
    fn normal_on_sphere_points_radially() {
        let scene = unit_sphere_scene();
        let n = normal(&scene, &v(0., 0., -1.), 5e-4);
        assert_relative_eq!(abs(&n), 1., epsilon = 1e-9);
        assert!(dot(&n, &v(0., 0., -1.)) > 0.999);
    }

    #[test]
    fn normal_is_deterministic() {
        let scene = unit_sphere_scene();
        let p = v(0.2, 0.4, -0.95);
        let a = normal(&scene, &p, 5e-4);
        let b = normal(&scene, &p, 5e-4);
        assert_eq!(a.x.to_bits(), b.x.to_bits());
        assert_eq!(a.y.to_bits(), b.y.to_bits());
        assert_eq!(a.z.to_bits(), b.z.to_bits());
    }

    #[test]
    fn normal_at_singularity_falls_back_to_fixed_axis() {
        let scene = unit_sphere_scene();
        let n = normal(&scene, &O, 5e-4);
        assert_relative_eq!(n.x, B2.x);
        assert_relative_eq!(n.y, B2.y);
        assert_relative_eq!(n.z, B2.z);
    }

    fn floor_and_blocker_scene() -> Scene {
        Scene::new(
            vec![
                Object {
                    shape: Box::new(Plane { height: 0. }),
                    material: MaterialId(1),
                },
                Object {
                    shape: Box::new(Sphere {
                        center: v(0., 2., 0.),
                        radius: 0.5,
                    }),
                    material: MaterialId(0),
                },
            ],
            table(),
        )
        .unwrap()
    }

    #[test]
    fn hard_shadow_blocked_by_interposed_sphere() {
        let cfg = SceneConfig::default();
        let scene = floor_and_blocker_scene();
        let up = v(0., 1., 0.);
        let shadowed = hard_shadow(&scene, &v(0., cfg.shadow_bias, 0.), &up, 0.01, 10., &cfg);
        assert_relative_eq!(shadowed, 0.);
    }

    #[test]
    fn hard_shadow_open_path_is_fully_lit() {
        let cfg = SceneConfig::default();
        let scene = floor_and_blocker_scene();
        let up = v(0., 1., 0.);
        let lit = hard_shadow(&scene, &v(5., cfg.shadow_bias, 0.), &up, 0.01, 10., &cfg);
        assert_relative_eq!(lit, 1.);
    }

    #[test]
    fn soft_shadow_darkens_monotonically_toward_occluder() {
        let cfg = SceneConfig::default();
        let scene = floor_and_blocker_scene();
        let up = v(0., 1., 0.);
        let mut previous = 1.0f64;
        // walking the shaded point toward the sphere's vertical axis
        for x in [4., 2.5, 1.5, 1., 0.7] {
            let factor = soft_shadow(&scene, &v(x, cfg.shadow_bias, 0.), &up, 0.01, 10., 8., &cfg);
            assert!((0. ..=1.).contains(&factor));
            assert!(factor <= previous + 1e-12);
            previous = factor;
        }
        let occluded = soft_shadow(&scene, &v(0., cfg.shadow_bias, 0.), &up, 0.01, 10., 8., &cfg);
        assert_relative_eq!(occluded, 0.);
    }

    #[test]
    fn soft_shadow_near_miss_is_dimmer_than_open_sky() {
        let cfg = SceneConfig::default();
        let scene = floor_and_blocker_scene();
        let up = v(0., 1., 0.);
        let grazing = soft_shadow(&scene, &v(0.7, cfg.shadow_bias, 0.), &up, 0.01, 10., 8., &cfg);
        assert!(grazing < 1.);
        assert!(grazing > 0.);
    }
}

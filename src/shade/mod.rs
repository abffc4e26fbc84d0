use crate::marcher::{hard_shadow, march, normal, soft_shadow};
use crate::math::{abs, add, clamp01, cross, dot, mix, mul, normalize, splat, sub, v, M3, V3};
use crate::scene::{Material, Pattern, Scene, SceneConfig, ShadowMode};

/// Per-frame interactive state resolved by the host before shading starts.
/// Passed by value; never read back out of rendered pixels.
#[derive(Clone, Copy, Debug, Default)]
pub struct InteractionState {
    pub rotation_angle: f64,
    pub light_phase: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: V3,
    pub basis: M3,
}

impl Camera {
    pub fn look_at(eye: V3, target: V3, roll: f64) -> Camera {
        let cw = normalize(&sub(&target, &eye));
        let cp = v(roll.sin(), roll.cos(), 0.);
        let cu = normalize(&cross(&cw, &cp));
        let cv = cross(&cu, &cw);
        Camera {
            position: eye,
            basis: M3::new(cu, cv, cw),
        }
    }

    pub fn ray_dir(&self, u: f64, w: f64, focal: f64) -> V3 {
        normalize(&(self.basis * v(u, w, focal)))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Light {
    pub position: V3,
    pub linear_falloff: f64,
    pub quadratic_falloff: f64,
}

impl Light {
    pub fn at(position: V3) -> Light {
        Light {
            position,
            linear_falloff: 0.,
            quadratic_falloff: 0.,
        }
    }

    pub fn attenuation(&self, d: f64) -> f64 {
        1. / (1. + self.linear_falloff * d + self.quadratic_falloff * d * d)
    }
}

fn gl_fract(x: f64) -> f64 {
    x - x.floor()
}

/// Cell parity of the checker grid; boundaries lie exactly on the grid lines.
pub fn checker_color(a: &V3, b: &V3, scale: f64, p: &V3) -> V3 {
    let cell = (scale * p.x).floor() + (scale * p.z).floor();
    if (cell as i64).rem_euclid(2) == 0 {
        *a
    } else {
        *b
    }
}

/// Analytic box filter of the checker pattern over one pixel's footprint
/// (http://iquilezles.org/www/articles/checkerfiltering/checkerfiltering.htm).
/// Returns the weight of the odd-cell color in [0, 1].
pub fn checker_weight(px: f64, pz: f64, wx: f64, wz: f64) -> f64 {
    let wx = wx.abs() + 1e-3;
    let wz = wz.abs() + 1e-3;
    let ix = 2.
        * ((gl_fract((px - 0.5 * wx) * 0.5) - 0.5).abs()
            - (gl_fract((px + 0.5 * wx) * 0.5) - 0.5).abs())
        / wx;
    let iz = 2.
        * ((gl_fract((pz - 0.5 * wz) * 0.5) - 0.5).abs()
            - (gl_fract((pz + 0.5 * wz) * 0.5) - 0.5).abs())
        / wz;
    0.5 - 0.5 * ix * iz
}

fn surface_color(material: &Material, p: &V3, footprint: Option<(V3, V3)>) -> V3 {
    match material.pattern {
        Pattern::Solid(color) => color,
        Pattern::Checker { a, b, scale } => match footprint {
            Some((dpdx, dpdy)) => {
                let f = checker_weight(
                    scale * p.x,
                    scale * p.z,
                    scale * (dpdx.x.abs() + dpdy.x.abs()),
                    scale * (dpdx.z.abs() + dpdy.z.abs()),
                );
                mix(&a, &b, f)
            }
            None => checker_color(&a, &b, scale, p),
        },
    }
}

fn tone_map1(x: f64) -> f64 {
    (x * (2.51 * x + 0.03)) / (x * (2.43 * x + 0.59) + 0.14)
}

// ACES-style rational fit; overshoots 1.0 slightly for hot inputs, clamped
// at the end of shade.
pub fn tone_map(x: &V3) -> V3 {
    v(tone_map1(x.x), tone_map1(x.y), tone_map1(x.z))
}

fn gamma_correct(c: &V3, gamma: f64) -> V3 {
    let c = clamp01(c);
    v(
        c.x.powf(1. / gamma),
        c.y.powf(1. / gamma),
        c.z.powf(1. / gamma),
    )
}

/// Camera-ray to color: march, shade the hit with ambient + shadowed
/// diffuse + shadowed specular, then tone map. `rdx`/`rdy` are the ray
/// directions of the neighboring pixels, used to size the checker filter
/// footprint on the floor.
pub fn shade(
    scene: &Scene,
    cfg: &SceneConfig,
    light: &Light,
    ro: &V3,
    rd: &V3,
    rdx: &V3,
    rdy: &V3,
) -> V3 {
    let result = march(scene, ro, rd, cfg);
    let Some(id) = result.hit else {
        return cfg.background;
    };
    let p = add(ro, &mul(result.travelled, rd));
    let n = normal(scene, &p, cfg.normal_eps);
    let Some(material) = scene.materials().get(id) else {
        // unreachable for scenes built through Scene::new
        return cfg.background;
    };

    // project the pixel footprint onto the horizontal surface through p
    let footprint = if rd.y.abs() > 1e-6 && rdx.y.abs() > 1e-6 && rdy.y.abs() > 1e-6 {
        let height = ro.y - p.y;
        Some((
            mul(height, &sub(&mul(1. / rd.y, rd), &mul(1. / rdx.y, rdx))),
            mul(height, &sub(&mul(1. / rd.y, rd), &mul(1. / rdy.y, rdy))),
        ))
    } else {
        None
    };
    let base = surface_color(material, &p, footprint);

    let to_light = sub(&light.position, &p);
    let light_dist = abs(&to_light);
    let l = mul(1. / light_dist, &to_light);
    let shadow_origin = add(&p, &mul(cfg.shadow_bias, &n));
    let shadow = match cfg.shadow {
        ShadowMode::Hard => hard_shadow(scene, &shadow_origin, &l, cfg.shadow_bias, light_dist, cfg),
        ShadowMode::Soft { k } => {
            soft_shadow(scene, &shadow_origin, &l, cfg.shadow_bias, light_dist, k, cfg)
        }
    };
    let attenuation = light.attenuation(light_dist);
    let diffuse = dot(&n, &l).max(0.);
    let half = normalize(&sub(&l, rd));
    let specular = dot(&n, &half).max(0.).powf(material.specular_exponent)
        * material.specular_weight;

    // ambient is never shadowed
    let mut color = mul(cfg.ambient, &base);
    color = add(&color, &mul(attenuation * shadow * diffuse, &base));
    color = add(&color, &mul(attenuation * shadow * specular, &splat(1.)));

    let mapped = if cfg.filmic { tone_map(&color) } else { color };
    gamma_correct(&mapped, cfg.gamma)
}

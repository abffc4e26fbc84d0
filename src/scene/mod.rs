use crate::math::{abs, dot, max_component, mul, sub, v, vabs, vmax, V3, O};
use thiserror::Error;

pub trait Renderable: Send + Sync {
    fn sdf(&self, x: &V3) -> f64;

    fn as_plane(&self) -> Option<&Plane> {
        None
    }
}

pub struct Sphere {
    pub center: V3,
    pub radius: f64,
}

pub struct Cube {
    pub center: V3,
    pub half_extent: V3,
}

pub struct Plane {
    pub height: f64,
}

pub struct Cylinder {
    pub origin: V3,
    pub axis: V3,
    pub radius: f64,
    pub height: f64,
}

impl Renderable for Sphere {
    fn sdf(&self, x: &V3) -> f64 {
        abs(&sub(x, &self.center)) - self.radius
    }
}

impl Renderable for Cube {
    fn sdf(&self, x: &V3) -> f64 {
        let q = sub(&vabs(&sub(x, &self.center)), &self.half_extent);
        abs(&vmax(&q, &O)) + max_component(&q).min(0.)
    }
}

impl Renderable for Plane {
    fn sdf(&self, x: &V3) -> f64 {
        x.y - self.height
    }

    fn as_plane(&self) -> Option<&Plane> {
        Some(self)
    }
}

impl Renderable for Cylinder {
    // Change of basis onto the axis, then a 2D clamp against the end caps.
    // The sign is authoritative everywhere; the magnitude is conservative
    // inside the cap corner regions.
    fn sdf(&self, x: &V3) -> f64 {
        let rel = sub(x, &self.origin);
        let along = dot(&rel, &self.axis);
        let radial = abs(&sub(&rel, &mul(along, &self.axis))) - self.radius;
        let capped = (along - 0.5 * self.height).abs() - 0.5 * self.height;
        let outside = (radial.max(0.).powi(2) + capped.max(0.).powi(2)).sqrt();
        radial.max(capped).min(0.) + outside
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

#[derive(Clone, Copy, Debug)]
pub enum Pattern {
    Solid(V3),
    Checker { a: V3, b: V3, scale: f64 },
}

#[derive(Clone, Copy, Debug)]
pub struct Material {
    pub pattern: Pattern,
    pub specular_exponent: f64,
    pub specular_weight: f64,
}

impl Material {
    pub fn matte(color: V3) -> Material {
        Material {
            pattern: Pattern::Solid(color),
            specular_exponent: 1.,
            specular_weight: 0.,
        }
    }
}

#[derive(Default)]
pub struct MaterialTable {
    entries: Vec<(MaterialId, Material)>,
}

impl MaterialTable {
    pub fn new(entries: Vec<(MaterialId, Material)>) -> MaterialTable {
        MaterialTable { entries }
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, material)| material)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SceneSample {
    pub distance: f64,
    pub material: MaterialId,
}

pub struct Object {
    pub shape: Box<dyn Renderable>,
    pub material: MaterialId,
}

pub struct Scene {
    objects: Vec<Object>,
    materials: MaterialTable,
}

impl Scene {
    /// An object referencing a material that is missing from the table is a
    /// configuration bug, rejected here rather than surfacing mid-shade.
    pub fn new(objects: Vec<Object>, materials: MaterialTable) -> Result<Scene, SceneError> {
        if objects.is_empty() {
            return Err(SceneError::Empty);
        }
        for object in &objects {
            if materials.get(object.material).is_none() {
                return Err(SceneError::UnknownMaterial(object.material));
            }
        }
        Ok(Scene { objects, materials })
    }

    /// Union of all objects: the strictly smallest distance wins, so objects
    /// at exactly equal distance keep the earlier one.
    pub fn sample(&self, p: &V3) -> SceneSample {
        let mut best = SceneSample {
            distance: f64::INFINITY,
            material: self.objects[0].material,
        };
        for object in &self.objects {
            let d = object.shape.sdf(p);
            if d < best.distance {
                best = SceneSample {
                    distance: d,
                    material: object.material,
                };
            }
        }
        best
    }

    pub fn distance(&self, p: &V3) -> f64 {
        self.sample(p).distance
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn as_single_plane(&self) -> Option<(&Plane, MaterialId)> {
        match self.objects.as_slice() {
            [only] => only.shape.as_plane().map(|plane| (plane, only.material)),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum ShadowMode {
    Hard,
    Soft { k: f64 },
}

#[derive(Clone, Copy, Debug)]
pub struct SceneConfig {
    pub max_steps: u32,
    pub near: f64,
    pub far: f64,
    pub precision: f64,
    pub normal_eps: f64,
    pub shadow_bias: f64,
    pub shadow: ShadowMode,
    pub background: V3,
    pub ambient: f64,
    pub gamma: f64,
    pub filmic: bool,
}

impl Default for SceneConfig {
    fn default() -> SceneConfig {
        SceneConfig {
            max_steps: 128,
            near: 0.,
            far: 40.,
            precision: 1e-3,
            normal_eps: 5e-4,
            shadow_bias: 1e-2,
            shadow: ShadowMode::Soft { k: 8. },
            background: v(0.7, 0.75, 0.85),
            ambient: 0.1,
            gamma: 2.2,
            filmic: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene contains no objects")]
    Empty,
    #[error("object references material {0:?} which is not in the table")]
    UnknownMaterial(MaterialId),
    #[error("no preset named `{0}`")]
    UnknownPreset(String),
}

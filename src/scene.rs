use anyhow::{bail, Result};
use glam::Vec3;
use serde::Serialize;

/// Size of the sphere array declared in `raytrace.wgsl`
pub const MAX_SPHERES: usize = 32;

/// Surface description mirrored by the shader's `Material` struct
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Material {
    pub color: Vec3,
    pub smoothness: f32,
    pub emission_color: Vec3,
    pub emission_strength: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec3::ZERO,
            smoothness: 0.0,
            emission_color: Vec3::ZERO,
            emission_strength: 0.0,
        }
    }
}

impl Material {
    pub fn diffuse(color: Vec3) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn emissive(emission_color: Vec3, emission_strength: f32) -> Self {
        Self {
            emission_color,
            emission_strength,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 1.0, Material::default())
    }
}

/// Individually editable sphere properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SphereField {
    Center,
    Radius,
    Color,
    Smoothness,
    EmissionColor,
    EmissionStrength,
}

impl SphereField {
    pub const ALL: [SphereField; 6] = [
        SphereField::Center,
        SphereField::Radius,
        SphereField::Color,
        SphereField::Smoothness,
        SphereField::EmissionColor,
        SphereField::EmissionStrength,
    ];

    /// Path below `spheres[i]` in the shader's naming scheme
    pub fn path(self) -> &'static str {
        match self {
            SphereField::Center => "center",
            SphereField::Radius => "radius",
            SphereField::Color => "material.color",
            SphereField::Smoothness => "material.smoothness",
            SphereField::EmissionColor => "material.emissionColor",
            SphereField::EmissionStrength => "material.emissionStrength",
        }
    }

    /// Full uniform name, e.g. `spheres[2].material.color`
    pub fn uniform_name(self, index: usize) -> String {
        format!("spheres[{}].{}", index, self.path())
    }
}

/// New value for one sphere property
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SphereChange {
    Center(Vec3),
    Radius(f32),
    Color(Vec3),
    Smoothness(f32),
    EmissionColor(Vec3),
    EmissionStrength(f32),
}

impl SphereChange {
    pub fn field(&self) -> SphereField {
        match self {
            SphereChange::Center(_) => SphereField::Center,
            SphereChange::Radius(_) => SphereField::Radius,
            SphereChange::Color(_) => SphereField::Color,
            SphereChange::Smoothness(_) => SphereField::Smoothness,
            SphereChange::EmissionColor(_) => SphereField::EmissionColor,
            SphereChange::EmissionStrength(_) => SphereField::EmissionStrength,
        }
    }

    fn apply(self, sphere: &mut Sphere) {
        match self {
            SphereChange::Center(v) => sphere.center = v,
            SphereChange::Radius(r) => sphere.radius = r.max(0.0),
            SphereChange::Color(c) => sphere.material.color = c,
            SphereChange::Smoothness(s) => sphere.material.smoothness = s.clamp(0.0, 1.0),
            SphereChange::EmissionColor(c) => sphere.material.emission_color = c,
            SphereChange::EmissionStrength(s) => sphere.material.emission_strength = s.max(0.0),
        }
    }
}

/// Scene edit requested by the UI
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEdit {
    Modify { index: usize, change: SphereChange },
    Add(Sphere),
    Remove(usize),
}

/// What a successfully applied edit touched, so callers re-marshal only that
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneChange {
    /// One property of one sphere
    Field { index: usize, field: SphereField },
    /// A sphere was appended at `index`
    Added { index: usize },
    /// Spheres from `from` onwards shifted down by one
    Removed { from: usize },
}

/// Ordered, in-memory list of spheres
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scene {
    spheres: Vec<Sphere>,
}

impl Scene {
    pub fn new(spheres: Vec<Sphere>) -> Self {
        let mut spheres = spheres;
        if spheres.len() > MAX_SPHERES {
            log::warn!(
                "Scene has {} spheres, only the first {} are kept",
                spheres.len(),
                MAX_SPHERES
            );
            spheres.truncate(MAX_SPHERES);
        }
        Self { spheres }
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.spheres.len() >= MAX_SPHERES
    }

    pub fn get(&self, index: usize) -> Option<&Sphere> {
        self.spheres.get(index)
    }

    pub fn apply(&mut self, edit: SceneEdit) -> Result<SceneChange> {
        match edit {
            SceneEdit::Modify { index, change } => {
                let Some(sphere) = self.spheres.get_mut(index) else {
                    bail!("No sphere at index {} (scene has {})", index, self.spheres.len());
                };
                change.apply(sphere);
                Ok(SceneChange::Field {
                    index,
                    field: change.field(),
                })
            }
            SceneEdit::Add(sphere) => {
                if self.is_full() {
                    bail!("Scene is full ({} spheres)", MAX_SPHERES);
                }
                self.spheres.push(sphere);
                Ok(SceneChange::Added {
                    index: self.spheres.len() - 1,
                })
            }
            SceneEdit::Remove(index) => {
                if index >= self.spheres.len() {
                    bail!("No sphere at index {} (scene has {})", index, self.spheres.len());
                }
                self.spheres.remove(index);
                Ok(SceneChange::Removed { from: index })
            }
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Three tinted lights floating over a large white ground sphere
pub fn default_scene() -> Scene {
    let offset = 3.0_f32.sqrt();
    Scene::new(vec![
        Sphere::new(
            Vec3::new(-offset, 1.5, -1.0),
            1.0,
            Material::emissive(Vec3::new(1.0, 0.6, 0.6), 1.6),
        ),
        Sphere::new(
            Vec3::new(0.0, 1.5, 2.0),
            1.0,
            Material::emissive(Vec3::new(0.6, 1.0, 0.6), 1.6),
        ),
        Sphere::new(
            Vec3::new(offset, 1.5, -1.0),
            1.0,
            Material::emissive(Vec3::new(0.6, 0.6, 1.0), 1.6),
        ),
        Sphere::new(
            Vec3::new(0.0, -400.0, 0.0),
            400.0,
            Material::diffuse(Vec3::ONE),
        ),
    ])
}

//! Named uniform marshalling.
//!
//! The raytracing shader reads a single uniform struct (`Globals` in
//! `raytrace.wgsl`). Fields are addressed by the same names the shader
//! declares, including nested sphere fields such as
//! `spheres[3].material.emissionColor`. Scene records are written through
//! small static schema tables instead of any runtime introspection.

use anyhow::{anyhow, bail, Result};
use glam::{Vec2, Vec3};

use crate::scene::{Material, Sphere, SphereField, MAX_SPHERES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    UInt,
    Vec2,
    Vec3,
}

impl UniformKind {
    /// Bytes written, not counting alignment padding
    pub fn size(self) -> usize {
        match self {
            UniformKind::Float | UniformKind::UInt => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    UInt(u32),
    Vec2(Vec2),
    Vec3(Vec3),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::UInt(_) => UniformKind::UInt,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
        }
    }

    fn encode(&self, out: &mut [u8]) {
        match self {
            UniformValue::Float(v) => out[..4].copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::UInt(v) => out[..4].copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Vec2(v) => out[..8].copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Vec3(v) => {
                out[..12].copy_from_slice(bytemuck::cast_slice(&v.to_array()))
            }
        }
    }

    fn decode(kind: UniformKind, bytes: &[u8]) -> Self {
        let f = |i: usize| f32::from_ne_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        match kind {
            UniformKind::Float => UniformValue::Float(f(0)),
            UniformKind::UInt => {
                UniformValue::UInt(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            UniformKind::Vec2 => UniformValue::Vec2(Vec2::new(f(0), f(4))),
            UniformKind::Vec3 => UniformValue::Vec3(Vec3::new(f(0), f(4), f(8))),
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::UInt(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

/// Anything that accepts named uniform writes
pub trait UniformSink {
    fn write(&mut self, name: &str, value: UniformValue) -> Result<()>;
}

/// One entry of a schema table: a field path and how to read it
pub struct Field<T> {
    pub path: &'static str,
    pub read: fn(&T) -> UniformValue,
}

pub const SPHERE_FIELDS: &[Field<Sphere>] = &[
    Field {
        path: "center",
        read: |s| s.center.into(),
    },
    Field {
        path: "radius",
        read: |s| s.radius.into(),
    },
];

pub const MATERIAL_FIELDS: &[Field<Material>] = &[
    Field {
        path: "color",
        read: |m| m.color.into(),
    },
    Field {
        path: "smoothness",
        read: |m| m.smoothness.into(),
    },
    Field {
        path: "emissionColor",
        read: |m| m.emission_color.into(),
    },
    Field {
        path: "emissionStrength",
        read: |m| m.emission_strength.into(),
    },
];

/// Walk a schema table and write every field under `prefix`
pub fn write_fields<T>(
    sink: &mut dyn UniformSink,
    prefix: &str,
    record: &T,
    fields: &[Field<T>],
) -> Result<()> {
    for field in fields {
        sink.write(&format!("{}.{}", prefix, field.path), (field.read)(record))?;
    }
    Ok(())
}

/// Write all of `spheres[index]`, including its nested material
pub fn write_sphere(sink: &mut dyn UniformSink, index: usize, sphere: &Sphere) -> Result<()> {
    let prefix = format!("spheres[{}]", index);
    write_fields(sink, &prefix, sphere, SPHERE_FIELDS)?;
    write_fields(sink, &format!("{}.material", prefix), &sphere.material, MATERIAL_FIELDS)
}

/// Write a single sphere property, e.g. after a slider edit
pub fn write_sphere_field(
    sink: &mut dyn UniformSink,
    index: usize,
    sphere: &Sphere,
    field: SphereField,
) -> Result<()> {
    let path = field.path();
    let value = match path.strip_prefix("material.") {
        Some(rest) => MATERIAL_FIELDS
            .iter()
            .find(|f| f.path == rest)
            .map(|f| (f.read)(&sphere.material)),
        None => SPHERE_FIELDS
            .iter()
            .find(|f| f.path == path)
            .map(|f| (f.read)(sphere)),
    }
    .ok_or_else(|| anyhow!("No schema entry for sphere field '{}'", path))?;

    sink.write(&field.uniform_name(index), value)
}

// === Layout of `Globals` in raytrace.wgsl ===

struct Slot {
    name: &'static str,
    offset: usize,
    kind: UniformKind,
}

const fn slot(name: &'static str, offset: usize, kind: UniformKind) -> Slot {
    Slot { name, offset, kind }
}

// vec3 aligns to 16; scalars fill the trailing 4 bytes
const GLOBAL_SLOTS: &[Slot] = &[
    slot("resolution", 0, UniformKind::Vec2),
    slot("fov", 8, UniformKind::Float),
    slot("skyboxLightStrength", 12, UniformKind::Float),
    slot("position", 16, UniformKind::Vec3),
    slot("raysPerPixel", 28, UniformKind::UInt),
    slot("forward", 32, UniformKind::Vec3),
    slot("maxBounceLimit", 44, UniformKind::UInt),
    slot("right", 48, UniformKind::Vec3),
    slot("accumulationFrame", 60, UniformKind::UInt),
    slot("up", 64, UniformKind::Vec3),
    slot("sphereAmount", 76, UniformKind::UInt),
];

const SPHERE_SLOTS: &[Slot] = &[
    slot("center", 0, UniformKind::Vec3),
    slot("radius", 12, UniformKind::Float),
    slot("material.color", 16, UniformKind::Vec3),
    slot("material.smoothness", 28, UniformKind::Float),
    slot("material.emissionColor", 32, UniformKind::Vec3),
    slot("material.emissionStrength", 44, UniformKind::Float),
];

pub const SPHERES_OFFSET: usize = 80;
pub const SPHERE_STRIDE: usize = 48;
pub const BLOCK_SIZE: usize = SPHERES_OFFSET + SPHERE_STRIDE * MAX_SPHERES;

fn resolve(name: &str) -> Result<(usize, UniformKind)> {
    if let Some(rest) = name.strip_prefix("spheres[") {
        let (index, path) = rest
            .split_once("].")
            .ok_or_else(|| anyhow!("Malformed uniform name '{}'", name))?;
        let index: usize = index
            .parse()
            .map_err(|_| anyhow!("Bad sphere index in uniform name '{}'", name))?;
        if index >= MAX_SPHERES {
            bail!("Sphere index {} out of range in '{}'", index, name);
        }
        let slot = SPHERE_SLOTS
            .iter()
            .find(|s| s.name == path)
            .ok_or_else(|| anyhow!("Unknown uniform '{}'", name))?;
        return Ok((SPHERES_OFFSET + index * SPHERE_STRIDE + slot.offset, slot.kind));
    }

    GLOBAL_SLOTS
        .iter()
        .find(|s| s.name == name)
        .map(|s| (s.offset, s.kind))
        .ok_or_else(|| anyhow!("Unknown uniform '{}'", name))
}

/// CPU-side mirror of the shader's uniform buffer
#[derive(Debug, Clone)]
pub struct UniformBlock {
    bytes: Vec<u8>,
    dirty: bool,
}

impl UniformBlock {
    pub fn new() -> Self {
        Self {
            bytes: vec![0; BLOCK_SIZE],
            dirty: true,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns whether an upload is due and clears the flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn read(&self, name: &str) -> Result<UniformValue> {
        let (offset, kind) = resolve(name)?;
        Ok(UniformValue::decode(kind, &self.bytes[offset..]))
    }
}

impl Default for UniformBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformSink for UniformBlock {
    fn write(&mut self, name: &str, value: UniformValue) -> Result<()> {
        let (offset, kind) = resolve(name)?;
        if kind != value.kind() {
            bail!("Uniform '{}' is {:?}, got {:?}", name, kind, value.kind());
        }
        let size = kind.size();
        let mut encoded = [0u8; 12];
        value.encode(&mut encoded);

        let target = &mut self.bytes[offset..offset + size];
        if target[..] != encoded[..size] {
            target.copy_from_slice(&encoded[..size]);
            self.dirty = true;
        }
        Ok(())
    }
}

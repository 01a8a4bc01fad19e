//! Envelope Kernel Backend
//!
//! Reference engine that represents each solid by its axis-aligned envelope
//! and an analytic volume. Volumes are exact for primitives and for booleans
//! between boxes; for other shapes boolean volumes are estimated from the
//! overlap of the envelopes.
//!
//! Export writes the envelope itself (STL) or a JSON summary of the parts.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use glam::{DQuat, DVec2, DVec3};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use super::{
    Aabb, Assembly, BooleanType, CadError, CadKernel, CadResult, ExportFormat, Face, MirrorPlane,
    Primitive, Solid,
};

/// Stored geometry for one solid
#[derive(Debug, Clone, Copy, PartialEq)]
struct Envelope {
    bounds: Option<Aabb>,
    volume: f64,
}

impl Envelope {
    const EMPTY: Envelope = Envelope {
        bounds: None,
        volume: 0.0,
    };

    fn new(bounds: Aabb, volume: f64) -> Self {
        Self {
            bounds: Some(bounds),
            volume,
        }
    }

    fn with_volume(self, volume: f64) -> Self {
        Self {
            volume: volume.max(0.0),
            ..self
        }
    }
}

/// Envelope-based geometry kernel
pub struct EnvelopeKernel {
    /// Storage for solid data (keyed by UUID)
    solids: Mutex<HashMap<Uuid, Envelope>>,
}

impl EnvelopeKernel {
    /// Create a new envelope kernel
    pub fn new() -> Self {
        Self {
            solids: Mutex::new(HashMap::new()),
        }
    }

    /// Number of solids currently stored
    pub fn solid_count(&self) -> usize {
        self.solids.lock().len()
    }

    /// Store an envelope and return a Solid reference
    fn store(&self, envelope: Envelope) -> Solid {
        let id = Uuid::new_v4();
        self.solids.lock().insert(id, envelope);
        Solid::new(id)
    }

    /// Get a stored envelope by ID
    fn get(&self, solid: &Solid) -> CadResult<Envelope> {
        self.solids
            .lock()
            .get(&solid.id)
            .copied()
            .ok_or(CadError::SolidNotFound(solid.id))
    }

    /// Overlap volume estimate between two envelopes
    fn overlap(a: &Envelope, b: &Envelope) -> f64 {
        match (a.bounds, b.bounds) {
            (Some(ba), Some(bb)) => ba
                .intersection(&bb)
                .map(|i| i.volume().min(a.volume).min(b.volume))
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Total edge length of a box envelope (12 edges)
    fn edge_length(bounds: &Aabb) -> f64 {
        let s = bounds.size();
        4.0 * (s.x + s.y + s.z)
    }

    fn primitive_envelope(primitive: &Primitive) -> CadResult<Envelope> {
        let positive = |name: &str, v: f64| {
            if v > 0.0 && v.is_finite() {
                Ok(v)
            } else {
                Err(CadError::InvalidParameter(format!(
                    "{} must be positive, got {}",
                    name, v
                )))
            }
        };

        // Places a box of `size` either centered on the origin or with its
        // minimum corner at the origin.
        let place = |size: DVec3, centered: bool| {
            if centered {
                Aabb::from_center_size(DVec3::ZERO, size)
            } else {
                Aabb::new(DVec3::ZERO, size)
            }
        };

        let envelope = match *primitive {
            Primitive::Box {
                length,
                width,
                height,
                centered,
            } => {
                let size = DVec3::new(
                    positive("length", length)?,
                    positive("width", width)?,
                    positive("height", height)?,
                );
                Envelope::new(place(size, centered), size.x * size.y * size.z)
            }
            Primitive::Cylinder {
                radius,
                height,
                angle,
                centered,
            } => {
                let r = positive("radius", radius)?;
                let h = positive("height", height)?;
                let size = DVec3::new(2.0 * r, 2.0 * r, h);
                Envelope::new(place(size, centered), PI * r * r * h * angle / 360.0)
            }
            Primitive::Sphere {
                radius,
                angle1,
                angle2,
                angle3,
                centered,
            } => {
                let r = positive("radius", radius)?;
                let band = (angle2.to_radians().sin() - angle1.to_radians().sin()).max(0.0);
                let volume = 2.0 / 3.0 * PI * r.powi(3) * band * angle3 / 360.0;
                Envelope::new(place(DVec3::splat(2.0 * r), centered), volume)
            }
            Primitive::Cone {
                radius1,
                radius2,
                height,
                angle,
                centered,
            } => {
                let h = positive("height", height)?;
                let r = radius1.max(radius2);
                positive("radius", r)?;
                let volume =
                    PI * h * (radius1 * radius1 + radius1 * radius2 + radius2 * radius2) / 3.0
                        * angle
                        / 360.0;
                Envelope::new(place(DVec3::new(2.0 * r, 2.0 * r, h), centered), volume)
            }
            Primitive::Torus {
                major_radius,
                minor_radius,
                angle1,
                angle2,
                angle3,
            } => {
                let big = positive("major_radius", major_radius)?;
                let small = positive("minor_radius", minor_radius)?;
                let outer = big + small;
                let sweep = ((angle2 - angle1) / 360.0).clamp(0.0, 1.0) * angle3 / 360.0;
                Envelope::new(
                    Aabb::from_center_size(DVec3::ZERO, DVec3::new(2.0 * outer, 2.0 * outer, 2.0 * small)),
                    2.0 * PI * PI * big * small * small * sweep,
                )
            }
            Primitive::Wedge {
                dx,
                dy,
                dz,
                xmin,
                zmin,
                xmax,
                zmax,
            } => {
                let dx = positive("dx", dx)?;
                let dy = positive("dy", dy)?;
                let dz = positive("dz", dz)?;
                // Prismatoid between the base (dx * dz at y = 0) and the top
                // rectangle (xmin..xmax, zmin..zmax at y = dy).
                let top_x = (xmax - xmin).max(0.0);
                let top_z = (zmax - zmin).max(0.0);
                let base = dx * dz;
                let top = top_x * top_z;
                let mid = (dx + top_x) / 2.0 * (dz + top_z) / 2.0;
                let volume = dy / 6.0 * (base + 4.0 * mid + top);
                let bounds = Aabb::new(
                    DVec3::new(xmin.min(0.0), 0.0, zmin.min(0.0)),
                    DVec3::new(xmax.max(dx), dy, zmax.max(dz)),
                )
                .translated(-DVec3::new(dx, dy, dz) * 0.5);
                Envelope::new(bounds, volume)
            }
            Primitive::SpurGear {
                module,
                teeth,
                width,
                bore,
                hub_diameter,
                hub_length,
                ..
            } => {
                let m = positive("module", module)?;
                let w = positive("width", width)?;
                let pitch = m * teeth as f64 / 2.0;
                let tip = pitch + m;
                let root = (pitch - 1.25 * m).max(0.0);
                // Teeth fill roughly half of the addendum-dedendum ring.
                let mean = (tip + root) / 2.0;
                let mut volume = PI * (mean * mean - (bore / 2.0).powi(2)).max(0.0) * w;
                let mut height = w;
                if let (Some(hub_d), Some(hub_l)) = (hub_diameter, hub_length) {
                    volume += PI * ((hub_d / 2.0).powi(2) - (bore / 2.0).powi(2)).max(0.0) * hub_l;
                    height += hub_l;
                }
                Envelope::new(
                    Aabb::new(DVec3::new(-tip, -tip, 0.0), DVec3::new(tip, tip, height)),
                    volume,
                )
            }
            Primitive::BevelGear {
                module,
                teeth,
                cone_angle,
                bore,
                face_width,
                ..
            } => {
                let m = positive("module", module)?;
                let b = positive("face_width", face_width)?;
                let delta = cone_angle.to_radians();
                let outer = m * teeth as f64 / 2.0 + m;
                let inner = (outer - b * delta.sin()).max(0.0);
                let h = b * delta.cos();
                let frustum = PI * h * (outer * outer + outer * inner + inner * inner) / 3.0;
                let volume = (frustum - PI * (bore / 2.0).powi(2) * h).max(0.0);
                Envelope::new(
                    Aabb::new(DVec3::new(-outer, -outer, 0.0), DVec3::new(outer, outer, h)),
                    volume,
                )
            }
        };

        Ok(envelope)
    }

    fn write_stl(&self, assembly: &Assembly, path: &Path) -> CadResult<()> {
        let mut triangles = Vec::new();
        for part in &assembly.parts {
            if let Some(bounds) = self.get(&part.solid)?.bounds {
                triangles.extend(box_triangles(&bounds));
            }
        }

        let file = File::create(path).map_err(|e| CadError::FileIo(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        stl_io::write_stl(&mut writer, triangles.iter())
            .map_err(|e| CadError::FileIo(e.to_string()))
    }

    fn write_json(&self, assembly: &Assembly, path: &Path) -> CadResult<()> {
        #[derive(Serialize)]
        struct PartSummary<'a> {
            name: &'a str,
            min: Option<[f64; 3]>,
            max: Option<[f64; 3]>,
            volume: f64,
        }

        #[derive(Serialize)]
        struct AssemblySummary<'a> {
            kernel: &'a str,
            units: &'a str,
            parts: Vec<PartSummary<'a>>,
        }

        let parts = assembly
            .parts
            .iter()
            .map(|part| {
                let envelope = self.get(&part.solid)?;
                Ok(PartSummary {
                    name: &part.name,
                    min: envelope.bounds.map(|b| b.min.to_array()),
                    max: envelope.bounds.map(|b| b.max.to_array()),
                    volume: envelope.volume,
                })
            })
            .collect::<CadResult<Vec<_>>>()?;

        let summary = AssemblySummary {
            kernel: self.name(),
            units: "mm",
            parts,
        };

        let file = File::create(path).map_err(|e| CadError::FileIo(e.to_string()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &summary)
            .map_err(|e| CadError::FileIo(e.to_string()))
    }
}

impl Default for EnvelopeKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// Triangulate the six faces of a box, outward facing
fn box_triangles(bounds: &Aabb) -> Vec<stl_io::Triangle> {
    let c = bounds.corners();
    // Quads as corner indices, counter-clockwise seen from outside.
    let faces: [([usize; 4], [f32; 3]); 6] = [
        ([0, 3, 2, 1], [0.0, 0.0, -1.0]),
        ([4, 5, 6, 7], [0.0, 0.0, 1.0]),
        ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
        ([3, 7, 6, 2], [0.0, 1.0, 0.0]),
        ([0, 4, 7, 3], [-1.0, 0.0, 0.0]),
        ([1, 2, 6, 5], [1.0, 0.0, 0.0]),
    ];

    let vertex = |i: usize| stl_io::Vertex::new(c[i].as_vec3().to_array());

    faces
        .iter()
        .flat_map(|(quad, normal)| {
            [[quad[0], quad[1], quad[2]], [quad[0], quad[2], quad[3]]].map(|tri| {
                stl_io::Triangle {
                    normal: stl_io::Normal::new(*normal),
                    vertices: tri.map(vertex),
                }
            })
        })
        .collect()
}

impl CadKernel for EnvelopeKernel {
    fn name(&self) -> &str {
        "envelope"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn workplane(&self) -> CadResult<Solid> {
        Ok(self.store(Envelope::EMPTY))
    }

    fn release(&self, solid: &Solid) {
        self.solids.lock().remove(&solid.id);
    }

    fn make_primitive(&self, primitive: &Primitive) -> CadResult<Solid> {
        let envelope = Self::primitive_envelope(primitive)?;
        tracing::trace!(kind = primitive.kind(), ?envelope, "built primitive");
        Ok(self.store(envelope))
    }

    fn boolean(&self, a: &Solid, b: &Solid, op: BooleanType) -> CadResult<Solid> {
        let ea = self.get(a)?;
        let eb = self.get(b)?;
        let overlap = Self::overlap(&ea, &eb);

        let result = match op {
            BooleanType::Union => {
                let bounds = match (ea.bounds, eb.bounds) {
                    (Some(x), Some(y)) => Some(x.union(&y)),
                    (x, y) => x.or(y),
                };
                Envelope {
                    bounds,
                    volume: ea.volume + eb.volume - overlap,
                }
            }
            BooleanType::Subtract => ea.with_volume(ea.volume - overlap),
            BooleanType::Intersect => match (ea.bounds, eb.bounds) {
                (Some(x), Some(y)) => match x.intersection(&y) {
                    Some(bounds) => Envelope::new(bounds, overlap),
                    None => Envelope::EMPTY,
                },
                _ => Envelope::EMPTY,
            },
        };

        Ok(self.store(result))
    }

    fn translate(&self, solid: &Solid, offset: DVec3) -> CadResult<Solid> {
        let envelope = self.get(solid)?;
        Ok(self.store(Envelope {
            bounds: envelope.bounds.map(|b| b.translated(offset)),
            ..envelope
        }))
    }

    fn rotate(&self, solid: &Solid, pivot: DVec3, axis: DVec3, degrees: f64) -> CadResult<Solid> {
        let axis = axis.try_normalize().ok_or_else(|| {
            CadError::InvalidParameter("rotation axis must be non-zero".into())
        })?;
        let rotation = DQuat::from_axis_angle(axis, degrees.to_radians());
        let envelope = self.get(solid)?;
        let bounds = envelope.bounds.and_then(|b| {
            Aabb::from_points(b.corners().map(|p| pivot + rotation * (p - pivot)))
        });
        Ok(self.store(Envelope { bounds, ..envelope }))
    }

    fn cut_hole(
        &self,
        solid: &Solid,
        face: Face,
        position: DVec2,
        diameter: f64,
        depth: Option<f64>,
    ) -> CadResult<Solid> {
        if diameter <= 0.0 {
            return Err(CadError::InvalidParameter(format!(
                "hole diameter must be positive, got {}",
                diameter
            )));
        }
        let envelope = self.get(solid)?;
        let bounds = envelope
            .bounds
            .ok_or_else(|| CadError::OperationFailed("cannot cut a hole into an empty solid".into()))?;

        let size = bounds.size();
        let (u, v) = face.plane_axes();
        let radius = diameter / 2.0;
        if position.x.abs() + radius > size[u] / 2.0 || position.y.abs() + radius > size[v] / 2.0 {
            tracing::warn!(%face, ?position, diameter, "hole lies outside the face; nothing cut");
            return Ok(self.store(envelope));
        }

        let through = size[face.axis_index()];
        let depth = depth.map_or(through, |d| d.min(through));
        let removed = PI * radius * radius * depth;
        Ok(self.store(envelope.with_volume(envelope.volume - removed)))
    }

    fn fillet(&self, solid: &Solid, radius: f64) -> CadResult<Solid> {
        let envelope = self.get(solid)?;
        let bounds = envelope
            .bounds
            .ok_or_else(|| CadError::OperationFailed("cannot fillet an empty solid".into()))?;
        if radius <= 0.0 || radius * 2.0 >= bounds.size().min_element() {
            return Err(CadError::OperationFailed(format!(
                "fillet radius {} does not fit the solid",
                radius
            )));
        }
        let removed = (1.0 - PI / 4.0) * radius * radius * Self::edge_length(&bounds);
        Ok(self.store(envelope.with_volume(envelope.volume - removed)))
    }

    fn chamfer(&self, solid: &Solid, length: f64) -> CadResult<Solid> {
        let envelope = self.get(solid)?;
        let bounds = envelope
            .bounds
            .ok_or_else(|| CadError::OperationFailed("cannot chamfer an empty solid".into()))?;
        if length <= 0.0 || length * 2.0 >= bounds.size().min_element() {
            return Err(CadError::OperationFailed(format!(
                "chamfer length {} does not fit the solid",
                length
            )));
        }
        let removed = 0.5 * length * length * Self::edge_length(&bounds);
        Ok(self.store(envelope.with_volume(envelope.volume - removed)))
    }

    fn shell(&self, solid: &Solid, thickness: f64, faces_to_remove: &[Face]) -> CadResult<Solid> {
        let envelope = self.get(solid)?;
        let bounds = envelope
            .bounds
            .ok_or_else(|| CadError::OperationFailed("cannot shell an empty solid".into()))?;
        if thickness <= 0.0 {
            return Err(CadError::InvalidParameter(format!(
                "shell thickness must be positive, got {}",
                thickness
            )));
        }

        let outer = bounds.size();
        let mut inner = outer;
        for axis in 0..3 {
            let open = faces_to_remove
                .iter()
                .filter(|f| f.axis_index() == axis)
                .count()
                .min(2) as f64;
            inner[axis] -= (2.0 - open) * thickness;
        }
        if inner.min_element() <= 0.0 {
            return Err(CadError::OperationFailed(format!(
                "shell thickness {} leaves no cavity",
                thickness
            )));
        }

        let fill = envelope.volume / bounds.volume();
        let cavity = inner.x * inner.y * inner.z * fill;
        Ok(self.store(envelope.with_volume(envelope.volume - cavity)))
    }

    fn mirror(&self, solid: &Solid, plane: MirrorPlane) -> CadResult<Solid> {
        let envelope = self.get(solid)?;
        let k = plane.flipped_axis();
        let bounds = envelope.bounds.map(|b| {
            let (mut min, mut max) = (b.min, b.max);
            min[k] = -b.max[k];
            max[k] = -b.min[k];
            Aabb { min, max }
        });
        Ok(self.store(Envelope { bounds, ..envelope }))
    }

    fn bounding_box(&self, solid: &Solid) -> CadResult<Option<Aabb>> {
        Ok(self.get(solid)?.bounds)
    }

    fn volume(&self, solid: &Solid) -> CadResult<f64> {
        Ok(self.get(solid)?.volume)
    }

    fn export(&self, assembly: &Assembly, path: &Path, format: ExportFormat) -> CadResult<()> {
        if assembly.is_empty() {
            return Err(CadError::OperationFailed("assembly has no parts".into()));
        }
        match format {
            ExportFormat::Stl => self.write_stl(assembly, path),
            ExportFormat::Json => self.write_json(assembly, path),
            other => Err(CadError::UnsupportedFormat(format!(
                "{} (envelope kernel writes stl and json)",
                other
            ))),
        }
    }
}

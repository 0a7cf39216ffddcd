// model.rs - in-memory walkmesh: faces, hooks and whole-mesh edits

use serde::{Deserialize, Serialize};

use crate::geometry::{
    Vector3, triangle_area, triangle_centre, triangle_contains_xy, triangle_normal,
    triangle_planar_distance,
};
use crate::material::SurfaceMaterial;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum WalkmeshType {
    PlaceableOrDoor = 0,
    #[default]
    AreaModel = 1,
}

impl WalkmeshType {
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            0 => Some(Self::PlaceableOrDoor),
            1 => Some(Self::AreaModel),
            _ => None,
        }
    }

    pub fn id(self) -> u32 {
        self as u32
    }
}

/// A walkmesh triangle. `trans[i]` is the layout room transition of edge `i`,
/// where edge 0 is (v1, v2), edge 1 is (v2, v3) and edge 2 is (v3, v1).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BwmFace {
    pub v1: Vector3,
    pub v2: Vector3,
    pub v3: Vector3,
    pub material: SurfaceMaterial,
    pub trans: [Option<u32>; 3],
}

impl BwmFace {
    pub fn new(v1: Vector3, v2: Vector3, v3: Vector3, material: SurfaceMaterial) -> Self {
        Self {
            v1,
            v2,
            v3,
            material,
            trans: [None; 3],
        }
    }

    pub fn vertices(&self) -> [Vector3; 3] {
        [self.v1, self.v2, self.v3]
    }

    /// End points of local edge `index` (0..=2)
    pub fn edge(&self, index: usize) -> (Vector3, Vector3) {
        match index {
            0 => (self.v1, self.v2),
            1 => (self.v2, self.v3),
            _ => (self.v3, self.v1),
        }
    }

    pub fn transition(&self, edge: usize) -> Option<u32> {
        self.trans.get(edge).copied().flatten()
    }

    pub fn walkable(&self) -> bool {
        self.material.walkable()
    }

    pub fn normal(&self) -> Vector3 {
        triangle_normal(self.v1, self.v2, self.v3)
    }

    pub fn planar_distance(&self) -> f64 {
        triangle_planar_distance(self.v1, self.v2, self.v3)
    }

    pub fn centre(&self) -> Vector3 {
        triangle_centre(self.v1, self.v2, self.v3)
    }

    pub fn area(&self) -> f64 {
        triangle_area(self.v1, self.v2, self.v3)
    }

    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        triangle_contains_xy(self.v1, self.v2, self.v3, x, y)
    }

    fn vertices_mut(&mut self) -> [&mut Vector3; 3] {
        [&mut self.v1, &mut self.v2, &mut self.v3]
    }
}

/// A walkmesh for an area, door or placeable.
///
/// Faces own their vertices; shared corners are found by value when needed.
/// Adjacency, perimeter edges and the AABB tree are derived from `faces` on
/// every call and refer to faces by index, so any edit to `faces` invalidates
/// previously derived results.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Walkmesh {
    pub walkmesh_type: WalkmeshType,
    pub faces: Vec<BwmFace>,
    pub position: Vector3,
    pub relative_hook1: Vector3,
    pub relative_hook2: Vector3,
    pub absolute_hook1: Vector3,
    pub absolute_hook2: Vector3,
}

impl Walkmesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices of walkable faces, in face order
    pub fn walkable_faces(&self) -> Vec<usize> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| face.walkable())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Indices of unwalkable faces, in face order
    pub fn unwalkable_faces(&self) -> Vec<usize> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| !face.walkable())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Distinct vertices in first-seen order. This order defines the vertex
    /// table on write.
    pub fn vertices(&self) -> Vec<Vector3> {
        self.indexed_vertices().0
    }

    /// Distinct vertices plus, for every face, the positions of its corners
    /// in that list.
    pub fn indexed_vertices(&self) -> (Vec<Vector3>, Vec<[usize; 3]>) {
        let mut vertices: Vec<Vector3> = Vec::new();
        let mut indices = Vec::with_capacity(self.faces.len());
        for face in &self.faces {
            let mut corners = [0usize; 3];
            for (corner, vertex) in corners.iter_mut().zip(face.vertices()) {
                *corner = match vertices.iter().position(|v| v.approx_eq(vertex)) {
                    Some(existing) => existing,
                    None => {
                        vertices.push(vertex);
                        vertices.len() - 1
                    }
                };
            }
            indices.push(corners);
        }
        (vertices, indices)
    }

    pub fn bounding_box(&self) -> Option<(Vector3, Vector3)> {
        let first = self.faces.first()?.v1;
        Some(
            self.faces
                .iter()
                .flat_map(|face| face.vertices())
                .fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))),
        )
    }

    pub fn translate(&mut self, dx: f64, dy: f64, dz: f64) {
        let offset = Vector3::new(dx, dy, dz);
        for face in &mut self.faces {
            for vertex in face.vertices_mut() {
                *vertex += offset;
            }
        }
    }

    /// Rotate counter-clockwise about the Z axis
    pub fn rotate(&mut self, degrees: f64) {
        let (sin, cos) = degrees.to_radians().sin_cos();
        for face in &mut self.faces {
            for vertex in face.vertices_mut() {
                let (x, y) = (vertex.x, vertex.y);
                vertex.x = x * cos - y * sin;
                vertex.y = x * sin + y * cos;
            }
        }
    }

    /// Mirror across the requested axes. A single-axis mirror turns every face
    /// inside out, so the winding is reversed to keep normals pointing up.
    pub fn flip(&mut self, flip_x: bool, flip_y: bool) {
        if !flip_x && !flip_y {
            return;
        }

        for face in &mut self.faces {
            for vertex in face.vertices_mut() {
                if flip_x {
                    vertex.x = -vertex.x;
                }
                if flip_y {
                    vertex.y = -vertex.y;
                }
            }
        }

        if flip_x != flip_y {
            for face in &mut self.faces {
                // (v3, v2, v1): new edge 0 is old edge 1, new edge 1 is old edge 0
                std::mem::swap(&mut face.v1, &mut face.v3);
                face.trans.swap(0, 1);
            }
        }
    }

    /// Renumber layout room transitions, e.g. after rooms are reordered
    pub fn change_lyt_indexes(&mut self, old: u32, new: u32) {
        for face in &mut self.faces {
            for trans in face.trans.iter_mut() {
                if *trans == Some(old) {
                    *trans = Some(new);
                }
            }
        }
    }
}

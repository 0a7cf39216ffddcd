// adjacency.rs - shared-edge neighbours between walkable faces

use serde::{Deserialize, Serialize};

use crate::geometry::Vector3;
use crate::model::{BwmFace, Walkmesh};

/// The neighbour across one edge: `face` indexes `Walkmesh::faces`, `edge`
/// is the neighbour's local edge (0..=2) that coincides with ours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BwmAdjacency {
    pub face: usize,
    pub edge: usize,
}

pub type FaceAdjacencies = [Option<BwmAdjacency>; 3];

/// Which local edge of `other` uses both end points of `edge`, if any.
/// Bit 0x01/0x02/0x04 marks v1/v2/v3 of `other` lying on the edge.
fn shared_edge(other: &BwmFace, edge: (Vector3, Vector3)) -> Option<usize> {
    let on_edge = |p: Vector3| p.approx_eq(edge.0) || p.approx_eq(edge.1);

    let mut flag = 0u8;
    if on_edge(other.v1) {
        flag |= 0x01;
    }
    if on_edge(other.v2) {
        flag |= 0x02;
    }
    if on_edge(other.v3) {
        flag |= 0x04;
    }

    match flag {
        0x03 => Some(0),
        0x06 => Some(1),
        0x05 => Some(2),
        _ => None,
    }
}

fn resolve(faces: &[BwmFace], walkable: &[usize], face: usize) -> FaceAdjacencies {
    let mut result: FaceAdjacencies = [None; 3];
    let Some(target) = faces.get(face) else {
        return result;
    };

    for (slot, adjacency) in result.iter_mut().enumerate() {
        let edge = target.edge(slot);
        for &other in walkable {
            if other == face {
                continue;
            }
            // no early exit: the last matching face wins
            if let Some(other_edge) = shared_edge(&faces[other], edge) {
                *adjacency = Some(BwmAdjacency {
                    face: other,
                    edge: other_edge,
                });
            }
        }
    }
    result
}

impl Walkmesh {
    /// Neighbours of `face` across edges (v1,v2), (v2,v3), (v3,v1).
    /// Only walkable faces are candidates; an out-of-range index has none.
    pub fn adjacencies(&self, face: usize) -> FaceAdjacencies {
        resolve(&self.faces, &self.walkable_faces(), face)
    }

    /// Adjacencies of every walkable face, parallel to `walkable_faces()`
    pub fn adjacency_table(&self) -> Vec<FaceAdjacencies> {
        let walkable = self.walkable_faces();
        walkable
            .iter()
            .map(|&face| resolve(&self.faces, &walkable, face))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::SurfaceMaterial;
    use crate::test_support::{grid, quad, single, tri, v};

    fn adj(face: usize, edge: usize) -> Option<BwmAdjacency> {
        Some(BwmAdjacency { face, edge })
    }

    #[test]
    fn test_quad_diagonal() {
        let wok = quad();
        assert_eq!(wok.adjacencies(0), [None, None, adj(1, 0)]);
        assert_eq!(wok.adjacencies(1), [adj(0, 2), None, None]);
    }

    #[test]
    fn test_single_face_has_no_neighbours() {
        assert_eq!(single().adjacencies(0), [None, None, None]);
        assert_eq!(single().adjacencies(5), [None, None, None]);
    }

    #[test]
    fn test_unwalkable_neighbour_is_ignored() {
        let mut wok = quad();
        wok.faces[1].material = SurfaceMaterial::NonWalk;
        assert_eq!(wok.adjacencies(0), [None, None, None]);
        // an unwalkable face can still be queried and sees walkable neighbours
        assert_eq!(wok.adjacencies(1), [adj(0, 2), None, None]);
    }

    #[test]
    fn test_no_walkable_faces() {
        let mut wok = quad();
        for face in &mut wok.faces {
            face.material = SurfaceMaterial::Lava;
        }
        assert!(wok.adjacency_table().is_empty());
    }

    #[test]
    fn test_last_match_wins() {
        // three faces share the (0,0)-(1,0) edge
        let mut wok = single();
        wok.faces.push(tri(v(1.0, 0.0, 0.0), v(0.0, 0.0, 0.0), v(0.5, -1.0, 0.0)));
        wok.faces.push(tri(v(0.5, -2.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 0.0, 0.0)));
        assert_eq!(wok.adjacencies(0)[0], adj(2, 1));
    }

    #[test]
    fn test_matches_within_f32_precision() {
        let mut wok = quad();
        let nudged = Vector3::from_f32(wok.faces[1].v1.to_f32()) + v(1e-9, 0.0, 0.0);
        wok.faces[1].v1 = nudged;
        assert_eq!(wok.adjacencies(0)[2], adj(1, 0));
    }

    #[test]
    fn test_symmetry_on_grid() {
        let wok = grid(3);
        let table = wok.adjacency_table();
        for (a, slots) in table.iter().enumerate() {
            for (edge_a, slot) in slots.iter().enumerate() {
                if let Some(BwmAdjacency { face: b, edge: edge_b }) = *slot {
                    assert_eq!(table[b][edge_b], adj(a, edge_a));
                }
            }
        }
    }
}

// edges.rs - perimeter edges of the walkable surface
//
// Walks each boundary loop by stepping around a face until an edge has a
// neighbour, then hopping across to the neighbour's following edge. Loops are
// emitted contiguously and the last edge of each loop is flagged final.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::Walkmesh;

/// A walkable-face edge with no walkable neighbour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BwmEdge {
    /// Index into `Walkmesh::faces`
    pub face: usize,
    /// Local edge of `face` (0..=2)
    pub index: usize,
    pub transition: Option<u32>,
    /// Last edge of its perimeter loop
    pub is_final: bool,
}

impl Walkmesh {
    /// Boundary edges in perimeter order.
    pub fn edges(&self) -> Vec<BwmEdge> {
        let walkable = self.walkable_faces();
        let adjacencies = self.adjacency_table();

        // face index -> position in `walkable`
        let mut walkable_pos = vec![None; self.faces.len()];
        for (pos, &face) in walkable.iter().enumerate() {
            walkable_pos[face] = Some(pos);
        }

        let max_hops = walkable.len() * 3;
        let mut visited: HashSet<usize> = HashSet::new();
        let mut edges: Vec<BwmEdge> = Vec::new();

        for start_face in 0..walkable.len() {
            for start_edge in 0..3 {
                if adjacencies[start_face][start_edge].is_some()
                    || visited.contains(&(start_face * 3 + start_edge))
                {
                    continue;
                }

                let mut face = start_face;
                let mut edge = start_edge;
                let mut hops = 0usize;
                loop {
                    if let Some(adjacency) = adjacencies[face][edge] {
                        hops += 1;
                        if hops > max_hops {
                            tracing::warn!(
                                "Perimeter walk from face {} edge {} never reached a boundary edge; mesh is not manifold",
                                walkable[start_face],
                                start_edge
                            );
                            break;
                        }
                        let Some(next) = walkable_pos[adjacency.face] else {
                            break;
                        };
                        face = next;
                        edge = (adjacency.edge + 1) % 3;
                        continue;
                    }

                    let key = face * 3 + edge;
                    if !visited.insert(key) {
                        break;
                    }
                    hops = 0;
                    let source = walkable[face];
                    edges.push(BwmEdge {
                        face: source,
                        index: edge,
                        transition: self.faces[source].transition(edge),
                        is_final: false,
                    });
                    edge = (edge + 1) % 3;
                }

                if let Some(last) = edges.last_mut() {
                    last.is_final = true;
                }
            }
        }

        edges
    }

    /// 1-based indices into `edges()` of each loop's final edge
    pub fn perimeters(&self) -> Vec<usize> {
        perimeters_of(&self.edges())
    }
}

pub fn perimeters_of(edges: &[BwmEdge]) -> Vec<usize> {
    edges
        .iter()
        .enumerate()
        .filter(|(_, edge)| edge.is_final)
        .map(|(idx, _)| idx + 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::SurfaceMaterial;
    use crate::test_support::{grid, islands, quad, single};

    fn keys(edges: &[BwmEdge]) -> Vec<(usize, usize)> {
        edges.iter().map(|e| (e.face, e.index)).collect()
    }

    #[test]
    fn test_quad_perimeter_order() {
        let edges = quad().edges();
        assert_eq!(keys(&edges), vec![(0, 0), (0, 1), (1, 1), (1, 2)]);
        assert_eq!(perimeters_of(&edges), vec![4]);
    }

    #[test]
    fn test_single_face() {
        let wok = single();
        assert_eq!(keys(&wok.edges()), vec![(0, 0), (0, 1), (0, 2)]);
        assert_eq!(wok.perimeters(), vec![3]);
    }

    #[test]
    fn test_transitions_follow_edges() {
        let mut wok = quad();
        wok.faces[1].trans = [None, Some(3), None];
        let edges = wok.edges();
        assert_eq!(edges[2].transition, Some(3));
        assert!(edges.iter().filter(|e| e.transition.is_some()).count() == 1);
    }

    #[test]
    fn test_two_islands_two_loops() {
        let edges = islands().edges();
        assert_eq!(edges.len(), 8);
        assert_eq!(perimeters_of(&edges), vec![4, 8]);
        // loops stay contiguous
        assert!(edges[..4].iter().all(|e| e.face < 2));
        assert!(edges[4..].iter().all(|e| e.face >= 2));
    }

    #[test]
    fn test_grid_boundary_is_one_loop() {
        let wok = grid(3);
        let edges = wok.edges();
        assert_eq!(edges.len(), 12);
        assert_eq!(perimeters_of(&edges), vec![12]);
    }

    #[test]
    fn test_edges_match_missing_adjacencies() {
        let mut wok = grid(3);
        wok.faces[8].material = SurfaceMaterial::DeepWater;
        wok.faces[9].material = SurfaceMaterial::DeepWater;
        let walkable = wok.walkable_faces();
        let table = wok.adjacency_table();

        let mut expected = HashSet::new();
        for (pos, slots) in table.iter().enumerate() {
            for (edge, slot) in slots.iter().enumerate() {
                if slot.is_none() {
                    expected.insert((walkable[pos], edge));
                }
            }
        }
        let edges = wok.edges();
        let emitted: HashSet<_> = keys(&edges).into_iter().collect();
        assert_eq!(emitted.len(), edges.len());
        assert_eq!(emitted, expected);
        // outer boundary (12 edges) then the hole around the removed centre square
        assert_eq!(edges.len(), 16);
        assert_eq!(wok.perimeters(), vec![12, 16]);
        // the hole walk crosses faces between emitted edges; the final flag
        // sits on the edge emitted just before it returns to its start
        assert_eq!(keys(&edges[12..]), vec![(3, 1), (6, 1), (14, 0), (11, 2)]);
        assert!(edges[11].is_final && edges[15].is_final);
        assert_eq!(edges.iter().filter(|e| e.is_final).count(), 2);
        assert!(edges.iter().all(|e| e.face != 8 && e.face != 9));
    }

    #[test]
    fn test_idempotent() {
        let wok = grid(2);
        assert_eq!(wok.edges(), wok.edges());
    }

    #[test]
    fn test_nothing_walkable() {
        let mut wok = quad();
        wok.faces.iter_mut().for_each(|f| f.material = SurfaceMaterial::Obscuring);
        assert!(wok.edges().is_empty());
        assert!(wok.perimeters().is_empty());
    }
}

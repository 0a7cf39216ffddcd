// query.rs - point lookup, nearest face and face-to-face paths

use pathfinding::prelude::astar;

use crate::geometry::Vector3;
use crate::model::Walkmesh;

/// Path costs are centroid distances scaled to integers for the A* search
const COST_SCALE: f64 = 1000.0;

fn scaled(distance: f64) -> u64 {
    (distance * COST_SCALE).round() as u64
}

impl Walkmesh {
    /// First face, in face order, whose XY projection contains (x, y).
    /// Overlapping faces are not disambiguated by height.
    pub fn face_at(&self, x: f64, y: f64) -> Option<usize> {
        self.faces.iter().position(|face| face.contains_xy(x, y))
    }

    /// Face whose centroid is closest to `point`; ties keep the earlier face
    pub fn nearest_face(&self, point: Vector3) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, face) in self.faces.iter().enumerate() {
            let distance = face.centre().distance(point);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((idx, distance));
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Shortest chain of walkable faces from `start` to `goal` across shared
    /// edges, measured between centroids. Both ends are included.
    pub fn find_path(&self, start: usize, goal: usize) -> Option<Vec<usize>> {
        let walkable = self.walkable_faces();
        if !walkable.contains(&start) || !walkable.contains(&goal) {
            return None;
        }

        let table = self.adjacency_table();
        let mut row_of = vec![None; self.faces.len()];
        for (row, &face) in walkable.iter().enumerate() {
            row_of[face] = Some(row);
        }
        let centres: Vec<Vector3> = self.faces.iter().map(|face| face.centre()).collect();
        let centres = &centres;
        let goal_centre = centres[goal];

        let (path, _cost) = astar(
            &start,
            |&face| {
                let here = centres[face];
                row_of[face]
                    .map(|row| table[row])
                    .into_iter()
                    .flatten()
                    .flatten()
                    .map(move |adj| (adj.face, scaled(here.distance(centres[adj.face]))))
                    .collect::<Vec<_>>()
            },
            |&face| scaled(centres[face].distance(goal_centre)),
            |&face| face == goal,
        )?;
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::SurfaceMaterial;
    use crate::test_support::{grid, islands, single, tri, v};

    #[test]
    fn test_face_at_single_triangle() {
        let wok = single();
        assert_eq!(wok.face_at(0.25, 0.25), Some(0));
        assert_eq!(wok.face_at(10.0, 10.0), None);
    }

    #[test]
    fn test_face_at_first_match_wins() {
        let mut wok = single();
        // same footprint one storey up
        wok.faces.push(tri(v(0.0, 0.0, 5.0), v(1.0, 0.0, 5.0), v(0.0, 1.0, 5.0)));
        assert_eq!(wok.face_at(0.2, 0.2), Some(0));
        wok.faces.swap(0, 1);
        assert_eq!(wok.face_at(0.2, 0.2), Some(0));
        assert_eq!(wok.faces[0].v1.z, 5.0);
    }

    #[test]
    fn test_face_at_grid() {
        let wok = grid(2);
        // square (1,1) is faces 6 and 7; (1.8, 1.2) is below its diagonal
        assert_eq!(wok.face_at(1.8, 1.2), Some(6));
        assert_eq!(wok.face_at(1.2, 1.8), Some(7));
    }

    #[test]
    fn test_nearest_face() {
        let wok = islands();
        assert_eq!(wok.nearest_face(v(9.0, 0.5, 0.0)), Some(3));
        assert_eq!(wok.nearest_face(v(-5.0, 0.0, 0.0)), Some(1));
        assert_eq!(Walkmesh::new().nearest_face(Vector3::zero()), None);
    }

    #[test]
    fn test_nearest_face_tie_keeps_first() {
        let mut wok = single();
        wok.faces.push(wok.faces[0].clone());
        assert_eq!(wok.nearest_face(v(3.0, 3.0, 0.0)), Some(0));
    }

    #[test]
    fn test_find_path_across_grid() {
        let wok = grid(3);
        let path = wok.find_path(0, 17).unwrap();
        assert_eq!(path.first(), Some(&0));
        assert_eq!(path.last(), Some(&17));
        for pair in path.windows(2) {
            assert!(wok.adjacencies(pair[0]).iter().flatten().any(|a| a.face == pair[1]));
        }
        assert_eq!(wok.find_path(4, 4), Some(vec![4]));
    }

    #[test]
    fn test_find_path_is_deterministic() {
        let wok = grid(3);
        assert_eq!(wok.find_path(1, 16), wok.find_path(1, 16));
    }

    #[test]
    fn test_find_path_blocked() {
        assert_eq!(islands().find_path(0, 3), None);

        let mut wok = grid(3);
        wok.faces[17].material = SurfaceMaterial::Lava;
        assert_eq!(wok.find_path(0, 17), None);
        assert_eq!(wok.find_path(0, 99), None);
    }
}

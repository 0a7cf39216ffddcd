// aabb.rs - bounding volume hierarchy over walkmesh faces
//
// Built top-down over all faces (walkable or not). Each level splits on the
// mean face centroid along one axis; the layout of the resulting tree is part
// of the file format, so the axis choice below must not be "improved".

use serde::{Deserialize, Serialize};

use crate::error::{BwmError, BwmResult};
use crate::geometry::Vector3;
use crate::model::{BwmFace, Walkmesh};

/// Recursion guard for pathological input
pub const MAX_TREE_DEPTH: usize = 128;

/// Most significant plane of a node, as stored in the file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum SplitPlane {
    NegativeZ = -3,
    NegativeY = -2,
    NegativeX = -1,
    #[default]
    None = 0,
    PositiveX = 1,
    PositiveY = 2,
    PositiveZ = 3,
}

impl SplitPlane {
    /// Plane for a 0-based split axis
    pub fn from_axis(axis: usize) -> Self {
        match axis {
            0 => Self::PositiveX,
            1 => Self::PositiveY,
            _ => Self::PositiveZ,
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            -3 => Some(Self::NegativeZ),
            -2 => Some(Self::NegativeY),
            -1 => Some(Self::NegativeX),
            0 => Some(Self::None),
            1 => Some(Self::PositiveX),
            2 => Some(Self::PositiveY),
            3 => Some(Self::PositiveZ),
            _ => None,
        }
    }

    pub fn id(self) -> i32 {
        self as i32
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AabbNode {
    pub bb_min: Vector3,
    pub bb_max: Vector3,
    /// Set on leaves only; index into `Walkmesh::faces`
    pub face: Option<usize>,
    pub sigplane: SplitPlane,
    pub left: Option<Box<AabbNode>>,
    pub right: Option<Box<AabbNode>>,
}

impl AabbNode {
    pub fn is_leaf(&self) -> bool {
        self.face.is_some()
    }

    fn contains_xy(&self, x: f64, y: f64) -> bool {
        x >= self.bb_min.x && x <= self.bb_max.x && y >= self.bb_min.y && y <= self.bb_max.y
    }
}

/// One node of the pre-order flattened tree. `left`/`right` are 0-based
/// positions in the same list.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlatAabb {
    pub bb_min: Vector3,
    pub bb_max: Vector3,
    pub face: Option<usize>,
    pub sigplane: SplitPlane,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AabbTree {
    root: AabbNode,
}

impl AabbTree {
    pub fn build(faces: &[BwmFace]) -> BwmResult<Self> {
        let all: Vec<usize> = (0..faces.len()).collect();
        let root = build_node(faces, &all, 0)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &AabbNode {
        &self.root
    }

    /// Pre-order flattening, parents before children, left subtree first
    pub fn flatten(&self) -> Vec<FlatAabb> {
        let mut out = Vec::new();
        flatten_into(&self.root, &mut out);
        out
    }

    /// Faces whose leaf box contains (x, y) in the XY plane, in pre-order
    pub fn query_xy(&self, x: f64, y: f64) -> Vec<usize> {
        let mut found = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if !node.contains_xy(x, y) {
                continue;
            }
            if let Some(face) = node.face {
                found.push(face);
                continue;
            }
            // right pushed first so left is visited first
            if let Some(right) = &node.right {
                stack.push(right);
            }
            if let Some(left) = &node.left {
                stack.push(left);
            }
        }
        found
    }
}

fn build_node(faces: &[BwmFace], subset: &[usize], depth: usize) -> BwmResult<AabbNode> {
    if depth > MAX_TREE_DEPTH {
        return Err(BwmError::TreeTooDeep {
            depth: MAX_TREE_DEPTH,
        });
    }
    let Some(&first) = subset.first() else {
        return Err(BwmError::EmptyFaceSet);
    };

    let mut bb_min = faces[first].v1;
    let mut bb_max = faces[first].v1;
    let mut centre_sum = Vector3::zero();
    for &idx in subset {
        let face = &faces[idx];
        for vertex in face.vertices() {
            bb_min = bb_min.min(vertex);
            bb_max = bb_max.max(vertex);
        }
        centre_sum += face.centre();
    }
    // mean of face centroids, not the box centre
    let bb_centre = centre_sum / subset.len() as f64;

    if subset.len() == 1 {
        return Ok(AabbNode {
            bb_min,
            bb_max,
            face: Some(first),
            sigplane: SplitPlane::None,
            left: None,
            right: None,
        });
    }

    let size = bb_max - bb_min;
    let mut axis = 0;
    if size.y > size.x {
        axis = 1;
    }
    if size.z > size.y {
        axis = 2;
    }

    let split = bb_centre.axis(axis);
    let coplanar = subset
        .iter()
        .all(|&idx| faces[idx].centre().axis(axis) == split);
    if coplanar {
        axis = (axis + 1) % 3;
    }

    let split = bb_centre.axis(axis);
    let (left, right): (Vec<usize>, Vec<usize>) = subset
        .iter()
        .copied()
        .partition(|&idx| faces[idx].centre().axis(axis) < split);

    if left.is_empty() || right.is_empty() {
        return Err(BwmError::DegenerateTree {
            faces: subset.len(),
            axis,
        });
    }

    Ok(AabbNode {
        bb_min,
        bb_max,
        face: None,
        sigplane: SplitPlane::from_axis(axis),
        left: Some(Box::new(build_node(faces, &left, depth + 1)?)),
        right: Some(Box::new(build_node(faces, &right, depth + 1)?)),
    })
}

fn flatten_into(node: &AabbNode, out: &mut Vec<FlatAabb>) -> usize {
    let idx = out.len();
    out.push(FlatAabb {
        bb_min: node.bb_min,
        bb_max: node.bb_max,
        face: node.face,
        sigplane: node.sigplane,
        left: None,
        right: None,
    });
    if let Some(left) = &node.left {
        let child = flatten_into(left, out);
        out[idx].left = Some(child);
    }
    if let Some(right) = &node.right {
        let child = flatten_into(right, out);
        out[idx].right = Some(child);
    }
    idx
}

impl Walkmesh {
    /// Tree over every face. Fails on an empty or unsplittable mesh.
    pub fn aabb_tree(&self) -> BwmResult<AabbTree> {
        AabbTree::build(&self.faces)
    }

    /// Pre-order flattened tree; empty for a mesh without faces
    pub fn aabbs(&self) -> BwmResult<Vec<FlatAabb>> {
        if self.faces.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.aabb_tree()?.flatten())
    }
}

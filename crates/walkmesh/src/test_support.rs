// Hand-built meshes shared by the unit tests

use crate::geometry::Vector3;
use crate::material::SurfaceMaterial;
use crate::model::{BwmFace, Walkmesh};

pub fn v(x: f64, y: f64, z: f64) -> Vector3 {
    Vector3::new(x, y, z)
}

pub fn tri(a: Vector3, b: Vector3, c: Vector3) -> BwmFace {
    BwmFace::new(a, b, c, SurfaceMaterial::Dirt)
}

/// One right triangle (0,0,0) (1,0,0) (0,1,0)
pub fn single() -> Walkmesh {
    let mut wok = Walkmesh::new();
    wok.faces.push(tri(v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0), v(0.0, 1.0, 0.0)));
    wok
}

/// Two counter-clockwise triangles covering the unit square, sharing the diagonal
pub fn quad() -> Walkmesh {
    let mut wok = Walkmesh::new();
    wok.faces.push(square(0.0, 0.0)[0].clone());
    wok.faces.push(square(0.0, 0.0)[1].clone());
    wok
}

fn square(x: f64, y: f64) -> [BwmFace; 2] {
    let a = v(x, y, 0.0);
    let b = v(x + 1.0, y, 0.0);
    let c = v(x + 1.0, y + 1.0, 0.0);
    let d = v(x, y + 1.0, 0.0);
    [tri(a, b, c), tri(a, c, d)]
}

/// `n` x `n` unit squares, two triangles each, row-major
pub fn grid(n: usize) -> Walkmesh {
    let mut wok = Walkmesh::new();
    for j in 0..n {
        for i in 0..n {
            wok.faces.extend(square(i as f64, j as f64));
        }
    }
    wok
}

/// Two unit squares far apart: two separate perimeters
pub fn islands() -> Walkmesh {
    let mut wok = Walkmesh::new();
    wok.faces.extend(square(0.0, 0.0));
    wok.faces.extend(square(10.0, 0.0));
    wok
}

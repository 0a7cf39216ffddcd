// BWM tools - Walkmesh Library
// Binary walkmesh (.wok/.dwk/.pwk) codec and the geometry derived from it

pub mod aabb;
pub mod adjacency;
pub mod cache;
pub mod edges;
pub mod error;
pub mod geometry;
pub mod io_bwm;
pub mod material;
pub mod model;
pub mod query;

#[cfg(test)]
mod test_support;

pub use aabb::{AabbNode, AabbTree, FlatAabb, SplitPlane};
pub use adjacency::{BwmAdjacency, FaceAdjacencies};
pub use cache::{CacheKey, WalkmeshCache};
pub use edges::BwmEdge;
pub use error::{BwmError, BwmResult};
pub use geometry::Vector3;
pub use io_bwm::{BwmBinaryReader, BwmBinaryWriter, WalkmeshKind, bytes_bwm, read_bwm, write_bwm};
pub use material::SurfaceMaterial;
pub use model::{BwmFace, Walkmesh, WalkmeshType};

// io_bwm.rs - binary BWM V1.0 walkmesh reader/writer
//
// Layout (little-endian):
//   0   "BWM " "V1.0"
//   8   walkmesh type
//   12  relative hook 1, relative hook 2, absolute hook 1, absolute hook 2
//   60  position
//   72  vertex count/offset, face count, indices/materials/normals/distances offsets
//   100 aabb count/offset, 4 unknown bytes
//   112 adjacency count/offset, edge count/offset, perimeter count/offset
//   136 tables
//
// Only vertices, indices, materials and edge transitions are read. Normals,
// plane distances, the AABB tree, adjacency and perimeters are pure functions
// of the faces and are regenerated on every write.

use std::fs;
use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use bwm_shared::{INVALID_INDEX, VECTOR3_SIZE};
use bwm_shared::util::ByteBuffer;
use tracing::debug;

use crate::edges::perimeters_of;
use crate::error::{BwmError, BwmResult};
use crate::geometry::Vector3;
use crate::material::SurfaceMaterial;
use crate::model::{BwmFace, Walkmesh, WalkmeshType};

pub const BWM_MAGIC: &[u8; 4] = b"BWM ";
pub const BWM_VERSION: &[u8; 4] = b"V1.0";
pub const HEADER_SIZE: usize = 136;

const VERTEX_SIZE: usize = VECTOR3_SIZE;
const INDEX_SIZE: usize = 12;
const MATERIAL_SIZE: usize = 4;
const NORMAL_SIZE: usize = VECTOR3_SIZE;
const DISTANCE_SIZE: usize = 4;
const AABB_SIZE: usize = 44;
const ADJACENCY_SIZE: usize = 12;
const EDGE_SIZE: usize = 8;
const PERIMETER_SIZE: usize = 4;

/// Constant stored in every AABB record after the face index
const AABB_UNKNOWN: u32 = 4;

/// File extensions walkmeshes ship under
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkmeshKind {
    /// `.wok` - area walkmesh
    Area,
    /// `.dwk` - door walkmesh
    Door,
    /// `.pwk` - placeable walkmesh
    Placeable,
}

impl WalkmeshKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "wok" => Some(Self::Area),
            "dwk" => Some(Self::Door),
            "pwk" => Some(Self::Placeable),
            _ => None,
        }
    }

    pub fn walkmesh_type(self) -> WalkmeshType {
        match self {
            Self::Area => WalkmeshType::AreaModel,
            Self::Door | Self::Placeable => WalkmeshType::PlaceableOrDoor,
        }
    }
}

struct Reader {
    buf: ByteBuffer,
}

impl Reader {
    fn truncated(&self) -> BwmError {
        BwmError::Truncated {
            position: self.buf.read_pos(),
        }
    }

    fn seek(&mut self, pos: u32) -> BwmResult<()> {
        self.buf
            .seek(pos as usize)
            .map_err(|_| BwmError::Truncated {
                position: pos as usize,
            })
    }

    fn tag(&mut self) -> BwmResult<[u8; 4]> {
        let bytes = self.buf.read_bytes(4).map_err(|_| self.truncated())?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn u32(&mut self) -> BwmResult<u32> {
        self.buf.read_u32().map_err(|_| self.truncated())
    }

    fn skip(&mut self, count: usize) -> BwmResult<()> {
        self.buf.read_skip(count).map_err(|_| self.truncated())
    }

    fn vector3(&mut self) -> BwmResult<Vector3> {
        let v = self.buf.read_vector3().map_err(|_| self.truncated())?;
        Ok(Vector3::from_f32(v))
    }
}

/// Reads a walkmesh out of a byte window, e.g. a resource inside an archive.
pub struct BwmBinaryReader<'a> {
    data: &'a [u8],
}

impl<'a> BwmBinaryReader<'a> {
    /// `size == 0` takes everything from `offset` to the end of `source`.
    pub fn new(source: &'a [u8], offset: usize, size: usize) -> BwmResult<Self> {
        let end = if size == 0 {
            Some(source.len())
        } else {
            offset.checked_add(size)
        };
        match end {
            Some(end) if offset <= end && end <= source.len() => Ok(Self {
                data: &source[offset..end],
            }),
            _ => Err(BwmError::InvalidWindow {
                offset,
                size,
                len: source.len(),
            }),
        }
    }

    fn check_extent(&self, offset: u32, count: u32, size: usize) -> BwmResult<()> {
        if count == 0 {
            return Ok(());
        }
        let end = (count as usize)
            .checked_mul(size)
            .and_then(|len| len.checked_add(offset as usize));
        match end {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(BwmError::Truncated {
                position: self.data.len(),
            }),
        }
    }

    pub fn load(&self) -> BwmResult<Walkmesh> {
        let mut r = Reader {
            buf: ByteBuffer::from_vec(self.data.to_vec()),
        };

        let magic = r.tag()?;
        if &magic != BWM_MAGIC {
            return Err(BwmError::InvalidMagic { found: magic });
        }
        let version = r.tag()?;
        if &version != BWM_VERSION {
            return Err(BwmError::UnsupportedVersion {
                found: String::from_utf8_lossy(&version).to_string(),
            });
        }

        let type_id = r.u32()?;
        let walkmesh_type =
            WalkmeshType::from_id(type_id).ok_or(BwmError::UnknownWalkmeshType { id: type_id })?;

        let mut wok = Walkmesh {
            walkmesh_type,
            relative_hook1: r.vector3()?,
            relative_hook2: r.vector3()?,
            absolute_hook1: r.vector3()?,
            absolute_hook2: r.vector3()?,
            position: r.vector3()?,
            faces: Vec::new(),
        };

        let vertex_count = r.u32()?;
        let vertex_offset = r.u32()?;
        let face_count = r.u32()?;
        let indices_offset = r.u32()?;
        let materials_offset = r.u32()?;
        // normals and planar distances offsets
        r.skip(8)?;
        let aabb_count = r.u32()?;
        // aabb offset, unknown
        r.skip(8)?;
        let adjacency_count = r.u32()?;
        r.skip(4)?;
        let edge_count = r.u32()?;
        let edge_offset = r.u32()?;
        let perimeter_count = r.u32()?;
        r.skip(4)?;

        // only the tables read below; the rest are regenerated on write
        for (offset, count, size) in [
            (vertex_offset, vertex_count, VERTEX_SIZE),
            (indices_offset, face_count, INDEX_SIZE),
            (materials_offset, face_count, MATERIAL_SIZE),
            (edge_offset, edge_count, EDGE_SIZE),
        ] {
            self.check_extent(offset, count, size)?;
        }

        debug!(
            "BWM header: type={:?} vertices={} faces={} edges={} (ignored: aabbs={} adjacencies={} perimeters={})",
            walkmesh_type, vertex_count, face_count, edge_count, aabb_count, adjacency_count, perimeter_count
        );

        r.seek(vertex_offset)?;
        let mut vertices = Vec::with_capacity(vertex_count as usize);
        for _ in 0..vertex_count {
            vertices.push(r.vector3()?);
        }

        r.seek(indices_offset)?;
        let mut faces = Vec::with_capacity(face_count as usize);
        for face in 0..face_count as usize {
            let mut corners = [Vector3::zero(); 3];
            for corner in corners.iter_mut() {
                let index = r.u32()?;
                *corner = *vertices
                    .get(index as usize)
                    .ok_or(BwmError::InvalidVertexIndex {
                        face,
                        index,
                        vertex_count: vertices.len(),
                    })?;
            }
            faces.push(BwmFace::new(
                corners[0],
                corners[1],
                corners[2],
                SurfaceMaterial::Undefined,
            ));
        }

        r.seek(materials_offset)?;
        for (idx, face) in faces.iter_mut().enumerate() {
            let id = r.u32()?;
            face.material =
                SurfaceMaterial::from_id(id).ok_or(BwmError::UnknownMaterial { face: idx, id })?;
        }

        r.seek(edge_offset)?;
        for _ in 0..edge_count {
            let edge_index = r.u32()?;
            let transition = r.u32()?;
            let face_index = (edge_index / 3) as usize;
            let local = (edge_index % 3) as usize;
            let face = faces
                .get_mut(face_index)
                .ok_or(BwmError::InvalidEdgeIndex {
                    index: edge_index,
                    face_count: face_count as usize,
                })?;
            if transition != INVALID_INDEX {
                face.trans[local] = Some(transition);
            }
        }

        wok.faces = faces;
        Ok(wok)
    }

    pub fn from_file(path: &Path, offset: usize, size: usize) -> BwmResult<Walkmesh> {
        let data = fs::read(path)?;
        BwmBinaryReader::new(&data, offset, size)?.load()
    }
}

/// Every table of the file, in file order, already serialized
struct Tables {
    vertex_count: usize,
    face_count: usize,
    aabb_count: usize,
    adjacency_count: usize,
    edge_count: usize,
    perimeter_count: usize,
    vertices: ByteBuffer,
    indices: ByteBuffer,
    materials: ByteBuffer,
    normals: ByteBuffer,
    distances: ByteBuffer,
    aabbs: ByteBuffer,
    adjacencies: ByteBuffer,
    edges: ByteBuffer,
    perimeters: ByteBuffer,
}

pub struct BwmBinaryWriter<'a> {
    wok: &'a Walkmesh,
}

impl<'a> BwmBinaryWriter<'a> {
    pub fn new(wok: &'a Walkmesh) -> Self {
        Self { wok }
    }

    /// Face indices in file order: walkable faces first, then the rest,
    /// each group keeping its relative order.
    fn file_order(&self) -> (Vec<usize>, Vec<u32>) {
        let mut order = self.wok.walkable_faces();
        order.extend(self.wok.unwalkable_faces());
        let mut remap = vec![0u32; order.len()];
        for (position, &face) in order.iter().enumerate() {
            remap[face] = position as u32;
        }
        (order, remap)
    }

    fn build_tables(&self) -> BwmResult<Tables> {
        let wok = self.wok;
        let (vertices, corner_indices) = wok.indexed_vertices();
        let (order, remap) = self.file_order();
        let adjacency_table = wok.adjacency_table();
        let edges = wok.edges();
        let perimeters = perimeters_of(&edges);
        let aabbs = wok.aabbs()?;

        let mut vertex_data = ByteBuffer::with_capacity(vertices.len() * VERTEX_SIZE);
        for vertex in &vertices {
            let [x, y, z] = vertex.to_f32();
            vertex_data.write_vector3(x, y, z);
        }

        let face_count = order.len();
        let mut indices = ByteBuffer::with_capacity(face_count * INDEX_SIZE);
        let mut materials = ByteBuffer::with_capacity(face_count * MATERIAL_SIZE);
        let mut normals = ByteBuffer::with_capacity(face_count * NORMAL_SIZE);
        let mut distances = ByteBuffer::with_capacity(face_count * DISTANCE_SIZE);
        for &face_idx in &order {
            let face = &wok.faces[face_idx];
            for corner in corner_indices[face_idx] {
                indices.write_u32(corner as u32);
            }
            materials.write_u32(face.material.id());
            let [x, y, z] = face.normal().to_f32();
            normals.write_vector3(x, y, z);
            distances.write_f32(face.planar_distance() as f32);
        }

        let mut aabb_data = ByteBuffer::with_capacity(aabbs.len() * AABB_SIZE);
        let child = |idx: Option<usize>| idx.map_or(INVALID_INDEX, |i| i as u32 + 1);
        for node in &aabbs {
            let [x, y, z] = node.bb_min.to_f32();
            aabb_data.write_vector3(x, y, z);
            let [x, y, z] = node.bb_max.to_f32();
            aabb_data.write_vector3(x, y, z);
            aabb_data.write_u32(node.face.map_or(INVALID_INDEX, |f| remap[f]));
            aabb_data.write_u32(AABB_UNKNOWN);
            aabb_data.write_i32(node.sigplane.id());
            aabb_data.write_u32(child(node.left));
            aabb_data.write_u32(child(node.right));
        }

        let mut adjacency_data = ByteBuffer::with_capacity(adjacency_table.len() * ADJACENCY_SIZE);
        for slots in &adjacency_table {
            for slot in slots {
                let value = match slot {
                    Some(adj) => (remap[adj.face] * 3) as i32 + adj.edge as i32,
                    None => -1,
                };
                adjacency_data.write_i32(value);
            }
        }

        let mut edge_data = ByteBuffer::with_capacity(edges.len() * EDGE_SIZE);
        for edge in &edges {
            if edge.transition == Some(INVALID_INDEX) {
                return Err(BwmError::ReservedTransition {
                    face: edge.face,
                    edge: edge.index,
                });
            }
            edge_data.write_u32(remap[edge.face] * 3 + edge.index as u32);
            edge_data.write_i32(edge.transition.map_or(-1, |t| t as i32));
        }

        let mut perimeter_data = ByteBuffer::with_capacity(perimeters.len() * PERIMETER_SIZE);
        for &perimeter in &perimeters {
            perimeter_data.write_u32(perimeter as u32);
        }

        Ok(Tables {
            vertex_count: vertices.len(),
            face_count,
            aabb_count: aabbs.len(),
            adjacency_count: adjacency_table.len(),
            edge_count: edges.len(),
            perimeter_count: perimeters.len(),
            vertices: vertex_data,
            indices,
            materials,
            normals,
            distances,
            aabbs: aabb_data,
            adjacencies: adjacency_data,
            edges: edge_data,
            perimeters: perimeter_data,
        })
    }

    pub fn write<W: Write>(&self, out: &mut W) -> BwmResult<()> {
        let t = self.build_tables()?;

        debug_assert_eq!(t.vertices.size(), t.vertex_count * VERTEX_SIZE);
        debug_assert_eq!(t.indices.size(), t.face_count * INDEX_SIZE);
        debug_assert_eq!(t.aabbs.size(), t.aabb_count * AABB_SIZE);
        debug_assert_eq!(t.adjacencies.size(), t.adjacency_count * ADJACENCY_SIZE);
        debug_assert_eq!(t.edges.size(), t.edge_count * EDGE_SIZE);
        debug_assert_eq!(t.perimeters.size(), t.perimeter_count * PERIMETER_SIZE);

        let vertex_offset = HEADER_SIZE;
        let indices_offset = vertex_offset + t.vertices.size();
        let materials_offset = indices_offset + t.indices.size();
        let normals_offset = materials_offset + t.materials.size();
        let distances_offset = normals_offset + t.normals.size();
        let aabb_offset = distances_offset + t.distances.size();
        let adjacency_offset = aabb_offset + t.aabbs.size();
        let edge_offset = adjacency_offset + t.adjacencies.size();
        let perimeter_offset = edge_offset + t.edges.size();

        debug!(
            "Writing BWM: vertices={} faces={} aabbs={} adjacencies={} edges={} perimeters={}",
            t.vertex_count, t.face_count, t.aabb_count, t.adjacency_count, t.edge_count, t.perimeter_count
        );

        let wok = self.wok;
        out.write_all(BWM_MAGIC)?;
        out.write_all(BWM_VERSION)?;
        out.write_u32::<LittleEndian>(wok.walkmesh_type.id())?;
        for hook in [
            wok.relative_hook1,
            wok.relative_hook2,
            wok.absolute_hook1,
            wok.absolute_hook2,
            wok.position,
        ] {
            write_vector3(out, hook)?;
        }

        for value in [
            t.vertex_count,
            vertex_offset,
            t.face_count,
            indices_offset,
            materials_offset,
            normals_offset,
            distances_offset,
            t.aabb_count,
            aabb_offset,
            0,
            t.adjacency_count,
            adjacency_offset,
            t.edge_count,
            edge_offset,
            t.perimeter_count,
            perimeter_offset,
        ] {
            out.write_u32::<LittleEndian>(value as u32)?;
        }

        for table in [
            &t.vertices,
            &t.indices,
            &t.materials,
            &t.normals,
            &t.distances,
            &t.aabbs,
            &t.adjacencies,
            &t.edges,
            &t.perimeters,
        ] {
            out.write_all(table.contents())?;
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> BwmResult<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }
}

fn write_vector3<W: Write>(writer: &mut W, v: Vector3) -> BwmResult<()> {
    let [x, y, z] = v.to_f32();
    writer.write_f32::<LittleEndian>(x)?;
    writer.write_f32::<LittleEndian>(y)?;
    writer.write_f32::<LittleEndian>(z)?;
    Ok(())
}

/// Decode a complete BWM file held in memory
pub fn read_bwm(data: &[u8]) -> BwmResult<Walkmesh> {
    BwmBinaryReader::new(data, 0, 0)?.load()
}

/// Encode a walkmesh into a complete BWM file
pub fn bytes_bwm(wok: &Walkmesh) -> BwmResult<Vec<u8>> {
    BwmBinaryWriter::new(wok).to_bytes()
}

/// Encode a walkmesh and write it to `path`
pub fn write_bwm(wok: &Walkmesh, path: &Path) -> BwmResult<()> {
    let bytes = bytes_bwm(wok)?;
    fs::write(path, bytes)?;
    Ok(())
}

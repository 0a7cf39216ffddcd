// error.rs - error types for walkmesh decoding and derivation

use thiserror::Error;

/// Result type for walkmesh operations.
pub type BwmResult<T> = Result<T, BwmError>;

#[derive(Debug, Error)]
pub enum BwmError {
    /// The first four bytes are not `"BWM "`.
    #[error("not a walkmesh file: magic {found:?}")]
    InvalidMagic { found: [u8; 4] },

    /// The file is a walkmesh of a version other than `"V1.0"`.
    #[error("unsupported walkmesh version {found:?}")]
    UnsupportedVersion { found: String },

    /// A read ran past the end of the data.
    #[error("corrupt or truncated walkmesh: read past end at byte {position}")]
    Truncated { position: usize },

    /// The requested offset/size window does not fit inside the source.
    #[error("walkmesh window {offset}+{size} exceeds source of {len} bytes")]
    InvalidWindow { offset: usize, size: usize, len: usize },

    #[error("corrupt walkmesh: face {face} references vertex {index} of {vertex_count}")]
    InvalidVertexIndex {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("corrupt walkmesh: face {face} has unknown material {id}")]
    UnknownMaterial { face: usize, id: u32 },

    #[error("corrupt walkmesh: unknown walkmesh type {id}")]
    UnknownWalkmeshType { id: u32 },

    #[error("corrupt walkmesh: edge index {index} outside {face_count} faces")]
    InvalidEdgeIndex { index: u32, face_count: usize },

    /// `0xFFFFFFFF` marks "no transition" on disk and cannot be stored as one.
    #[error("face {face} edge {edge} uses the reserved transition 0xFFFFFFFF")]
    ReservedTransition { face: usize, edge: usize },

    /// AABB construction was asked to bound nothing.
    #[error("degenerate mesh: cannot build a bounding volume over zero faces")]
    EmptyFaceSet,

    #[error("degenerate mesh: AABB tree deeper than {depth} levels")]
    TreeTooDeep { depth: usize },

    /// Every face landed on one side of the split plane.
    #[error("degenerate mesh: {faces} faces cannot be split on axis {axis}")]
    DegenerateTree { faces: usize, axis: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BwmError {
    /// Problems with the bytes themselves: wrong file, wrong version, corruption.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidMagic { .. }
                | Self::UnsupportedVersion { .. }
                | Self::Truncated { .. }
                | Self::InvalidWindow { .. }
                | Self::InvalidVertexIndex { .. }
                | Self::UnknownMaterial { .. }
                | Self::UnknownWalkmeshType { .. }
                | Self::InvalidEdgeIndex { .. }
        )
    }

    /// Problems with the geometry: the mesh decodes but cannot be partitioned.
    pub fn is_structural_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyFaceSet | Self::TreeTooDeep { .. } | Self::DegenerateTree { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(BwmError::InvalidMagic { found: *b"GFF " }.is_format_error());
        assert!(BwmError::Truncated { position: 10 }.is_format_error());
        assert!(!BwmError::EmptyFaceSet.is_format_error());
        assert!(BwmError::DegenerateTree { faces: 2, axis: 0 }.is_structural_error());
        let io = BwmError::from(std::io::Error::other("disk"));
        assert!(!io.is_format_error() && !io.is_structural_error());
    }

    #[test]
    fn test_messages_are_actionable() {
        let msg = BwmError::UnsupportedVersion { found: "V2.0".into() }.to_string();
        assert!(msg.contains("V2.0"));
        let msg = BwmError::InvalidMagic { found: *b"GFF " }.to_string();
        assert!(msg.starts_with("not a walkmesh file"));
    }
}

// BWM tools - Shared Library
// Ambient components used by the walkmesh library and the bwmtool binary

pub mod config;
pub mod log;
pub mod util;

/// Size in bytes of one little-endian f32 vector (x, y, z) on disk
pub const VECTOR3_SIZE: usize = 12;

/// Sentinel written for "no index" in u32 tables
pub const INVALID_INDEX: u32 = 0xFFFF_FFFF;

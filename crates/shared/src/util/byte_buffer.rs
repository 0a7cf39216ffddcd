// ByteBuffer - little-endian table serialization/deserialization
// Used by the BWM codec to build each table separately and to read from a windowed slice

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Error, ErrorKind};

/// A byte buffer for reading/writing little-endian binary tables.
/// Writes always append; reads advance an independent read position.
#[derive(Debug, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
    read_pos: usize,
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn past_end(pos: usize, wanted: usize) -> Error {
    Error::new(
        ErrorKind::UnexpectedEof,
        format!("ByteBuffer read of {} bytes at {} runs past end", wanted, pos),
    )
}

impl ByteBuffer {
    /// Create a new empty ByteBuffer
    pub fn new() -> Self {
        ByteBuffer {
            data: Vec::new(),
            read_pos: 0,
        }
    }

    /// Create with a pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        ByteBuffer {
            data: Vec::with_capacity(capacity),
            read_pos: 0,
        }
    }

    /// Wrap existing bytes for reading
    pub fn from_vec(data: Vec<u8>) -> Self {
        ByteBuffer { data, read_pos: 0 }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    pub fn contents(&self) -> &[u8] {
        &self.data
    }

    /// Move the read position. Seeking past the end is an error, seeking to the end is not.
    pub fn seek(&mut self, pos: usize) -> Result<(), Error> {
        if pos > self.data.len() {
            return Err(past_end(pos, 0));
        }
        self.read_pos = pos;
        Ok(())
    }

    // ---- Write operations (append) ----

    pub fn write_u32(&mut self, val: u32) {
        self.data.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_i32(&mut self, val: i32) {
        self.data.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_f32(&mut self, val: f32) {
        self.data.extend_from_slice(&val.to_le_bytes());
    }

    /// Write three f32 components
    pub fn write_vector3(&mut self, x: f32, y: f32, z: f32) {
        self.write_f32(x);
        self.write_f32(y);
        self.write_f32(z);
    }

    // ---- Read operations ----

    fn remaining(&self, wanted: usize) -> Result<&[u8], Error> {
        let end = self
            .read_pos
            .checked_add(wanted)
            .ok_or_else(|| past_end(self.read_pos, wanted))?;
        if end > self.data.len() {
            return Err(past_end(self.read_pos, wanted));
        }
        Ok(&self.data[self.read_pos..end])
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        let val = Cursor::new(self.remaining(4)?).read_u32::<LittleEndian>()?;
        self.read_pos += 4;
        Ok(val)
    }

    pub fn read_f32(&mut self) -> Result<f32, Error> {
        let val = Cursor::new(self.remaining(4)?).read_f32::<LittleEndian>()?;
        self.read_pos += 4;
        Ok(val)
    }

    /// Read three f32 components
    pub fn read_vector3(&mut self) -> Result<[f32; 3], Error> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    /// Read exactly N bytes
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, Error> {
        let bytes = self.remaining(count)?.to_vec();
        self.read_pos += count;
        Ok(bytes)
    }

    /// Skip N bytes in the read position
    pub fn read_skip(&mut self, count: usize) -> Result<(), Error> {
        self.remaining(count)?;
        self.read_pos += count;
        Ok(())
    }
}

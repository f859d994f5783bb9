//! Binary format definitions for keyline timeline archives.

use std::io::{self, Read, Write};

use crate::schema::InterpolationKind;

/// Magic bytes identifying a timeline archive.
pub const ARCHIVE_MAGIC: &[u8; 4] = b"KTLN";

/// Current format version.
pub const ARCHIVE_VERSION: u16 = 1;

/// Compression type for the point block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CompressionType {
    /// No compression (raw f64 records).
    #[default]
    None = 0,
    /// LZ4 fast compression.
    Lz4 = 1,
}

impl CompressionType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(CompressionType::None),
            1 => Some(CompressionType::Lz4),
            _ => None,
        }
    }

    /// Compression that will actually be written with the enabled features.
    pub fn effective(self) -> Self {
        if cfg!(feature = "lz4") {
            self
        } else {
            CompressionType::None
        }
    }
}

/// Archive header flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveFlags {
    /// Compression type (lower 4 bits).
    pub compression: CompressionType,
    /// A lower limit vector follows the kind table.
    pub has_lower_limit: bool,
    /// An upper limit vector follows the kind table.
    pub has_upper_limit: bool,
}

impl ArchiveFlags {
    pub fn to_u16(self) -> u16 {
        let mut flags = self.compression as u16;
        if self.has_lower_limit {
            flags |= 1 << 4;
        }
        if self.has_upper_limit {
            flags |= 1 << 5;
        }
        flags
    }

    pub fn from_u16(v: u16) -> io::Result<Self> {
        let compression = CompressionType::from_u8((v & 0x0F) as u8).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unknown KTLN compression type: {}", v & 0x0F),
            )
        })?;
        Ok(Self {
            compression,
            has_lower_limit: (v & (1 << 4)) != 0,
            has_upper_limit: (v & (1 << 5)) != 0,
        })
    }
}

/// File header for timeline archives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHeader {
    /// Components per value.
    pub dimensions: u32,
    /// Number of point records.
    pub point_count: u64,
    pub flags: ArchiveFlags,
}

impl ArchiveHeader {
    /// Size of header in bytes.
    /// Magic(4) + Version(2) + Flags(2) + Dimensions(4) + PointCount(8) +
    /// Reserved(12) = 32
    pub const SIZE: usize = 32;

    /// Size of one uncompressed point record in bytes.
    pub fn record_size(&self) -> usize {
        record_size(self.dimensions as usize)
    }

    /// Write header to output.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(ARCHIVE_MAGIC)?;
        w.write_all(&ARCHIVE_VERSION.to_le_bytes())?;
        w.write_all(&self.flags.to_u16().to_le_bytes())?;
        w.write_all(&self.dimensions.to_le_bytes())?;
        w.write_all(&self.point_count.to_le_bytes())?;
        // Reserved bytes
        w.write_all(&[0u8; 12])?;
        Ok(())
    }

    /// Read header from input.
    pub fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != ARCHIVE_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Invalid KTLN magic bytes",
            ));
        }

        let mut buf2 = [0u8; 2];
        let mut buf4 = [0u8; 4];
        let mut buf8 = [0u8; 8];

        r.read_exact(&mut buf2)?;
        let version = u16::from_le_bytes(buf2);
        if version != ARCHIVE_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unsupported KTLN version: {}", version),
            ));
        }

        r.read_exact(&mut buf2)?;
        let flags = ArchiveFlags::from_u16(u16::from_le_bytes(buf2))?;

        r.read_exact(&mut buf4)?;
        let dimensions = u32::from_le_bytes(buf4);

        r.read_exact(&mut buf8)?;
        let point_count = u64::from_le_bytes(buf8);

        // Skip reserved bytes
        let mut reserved = [0u8; 12];
        r.read_exact(&mut reserved)?;

        Ok(Self {
            dimensions,
            point_count,
            flags,
        })
    }
}

/// Bytes per point record: kind(1) + time(8) + value and tangent (8 each
/// per component).
pub fn record_size(dimensions: usize) -> usize {
    1 + 8 + 16 * dimensions
}

/// Write the interpolation kind table. Record kind bytes index into it.
pub fn write_kind_table<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(&[InterpolationKind::ALL.len() as u8])?;
    for kind in InterpolationKind::ALL {
        let name = kind.persistent_name().as_bytes();
        w.write_all(&[name.len() as u8])?;
        w.write_all(name)?;
    }
    Ok(())
}

/// Read a kind table. Unknown names decode as `Linear`.
pub fn read_kind_table<R: Read>(r: &mut R) -> io::Result<Vec<InterpolationKind>> {
    let mut buf1 = [0u8; 1];
    r.read_exact(&mut buf1)?;
    let count = buf1[0] as usize;

    let mut table = Vec::with_capacity(count);
    let mut name = Vec::new();
    for _ in 0..count {
        r.read_exact(&mut buf1)?;
        name.resize(buf1[0] as usize, 0);
        r.read_exact(&mut name)?;
        let name = std::str::from_utf8(&name)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        table.push(InterpolationKind::from_persistent_name(name));
    }
    Ok(table)
}

/// Table index of `kind` as written by [`write_kind_table`].
pub fn kind_index(kind: InterpolationKind) -> u8 {
    InterpolationKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or_default() as u8
}

/// Append f64 values to a byte buffer.
pub fn encode_f64s(data: &[f64], out: &mut Vec<u8>) {
    for &v in data {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

/// Decode bytes into `output`.
pub fn decode_f64s(bytes: &[u8], output: &mut [f64]) -> io::Result<()> {
    if bytes.len() != output.len() * 8 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Vector size mismatch: {} bytes vs {} floats",
                bytes.len(),
                output.len()
            ),
        ));
    }
    for (v, b) in output.iter_mut().zip(bytes.chunks_exact(8)) {
        let mut buf8 = [0u8; 8];
        buf8.copy_from_slice(b);
        *v = f64::from_le_bytes(buf8);
    }
    Ok(())
}

/// Compress data using LZ4.
#[cfg(feature = "lz4")]
pub fn compress_lz4(data: &[u8]) -> Vec<u8> {
    lz4_flex::compress_prepend_size(data)
}

/// Decompress LZ4 data.
#[cfg(feature = "lz4")]
pub fn decompress_lz4(data: &[u8]) -> io::Result<Vec<u8>> {
    lz4_flex::decompress_size_prepended(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Fallback when LZ4 is not available.
#[cfg(not(feature = "lz4"))]
pub fn compress_lz4(data: &[u8]) -> Vec<u8> {
    data.to_vec()
}

#[cfg(not(feature = "lz4"))]
pub fn decompress_lz4(_data: &[u8]) -> io::Result<Vec<u8>> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "KTLN archive is LZ4 compressed but the lz4 feature is disabled",
    ))
}

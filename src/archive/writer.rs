//! Archive writer.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::format::{
    ArchiveFlags, ArchiveHeader, CompressionType, compress_lz4, encode_f64s, kind_index,
    record_size, write_kind_table,
};
use crate::compute::Timeline;

/// Statistics from writing an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveStats {
    pub point_count: u64,
    /// Bytes written, header included.
    pub total_bytes: u64,
    /// Size of the point block as stored.
    pub block_bytes: u64,
    /// Compression actually used.
    pub compression: CompressionType,
}

/// Serialize `timeline` to `w`.
///
/// LZ4 is only used when the `lz4` feature is enabled; otherwise the point
/// block is stored uncompressed.
pub fn write_timeline<W: Write>(
    w: &mut W,
    timeline: &Timeline,
    compression: CompressionType,
) -> io::Result<ArchiveStats> {
    let compression = compression.effective();
    let dimensions = timeline.dimensions();
    let dimensions_u32 = u32::try_from(dimensions).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Too many dimensions for KTLN archive: {}", dimensions),
        )
    })?;

    let header = ArchiveHeader {
        dimensions: dimensions_u32,
        point_count: timeline.len() as u64,
        flags: ArchiveFlags {
            compression,
            has_lower_limit: timeline.lower_limit().is_some(),
            has_upper_limit: timeline.upper_limit().is_some(),
        },
    };

    let mut prefix = Vec::with_capacity(ArchiveHeader::SIZE + 128);
    header.write_to(&mut prefix)?;
    write_kind_table(&mut prefix)?;
    for limit in [timeline.lower_limit(), timeline.upper_limit()]
        .into_iter()
        .flatten()
    {
        encode_f64s(limit, &mut prefix);
    }

    let mut records = Vec::with_capacity(timeline.len() * record_size(dimensions));
    for point in timeline.points() {
        records.push(kind_index(point.kind));
        records.extend_from_slice(&point.time.to_le_bytes());
        encode_f64s(&point.value, &mut records);
        encode_f64s(&point.tangent, &mut records);
    }

    let block = match compression {
        CompressionType::None => records,
        CompressionType::Lz4 => compress_lz4(&records),
    };

    w.write_all(&prefix)?;
    w.write_all(&(block.len() as u64).to_le_bytes())?;
    w.write_all(&block)?;

    let stats = ArchiveStats {
        point_count: header.point_count,
        total_bytes: (prefix.len() + 8 + block.len()) as u64,
        block_bytes: block.len() as u64,
        compression,
    };
    log::debug!(
        "Wrote KTLN archive: {} point(s), {} bytes ({:?})",
        stats.point_count,
        stats.total_bytes,
        stats.compression
    );
    Ok(stats)
}

/// Write `timeline` to a file at `path`.
pub fn save_file<P: AsRef<Path>>(
    path: P,
    timeline: &Timeline,
    compression: CompressionType,
) -> io::Result<ArchiveStats> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let stats = write_timeline(&mut writer, timeline, compression)?;
    writer.flush()?;
    Ok(stats)
}

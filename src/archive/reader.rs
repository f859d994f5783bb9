//! Archive reader.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use super::format::{
    ArchiveHeader, CompressionType, decode_f64s, decompress_lz4, read_kind_table,
};
use crate::compute::{Point, Timeline, ValueVector};

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

fn read_exact_len<R: Read>(r: &mut R, len: u64, what: &str) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    r.by_ref().take(len).read_to_end(&mut bytes)?;
    if bytes.len() as u64 != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("Truncated KTLN {}: {} of {} bytes", what, bytes.len(), len),
        ));
    }
    Ok(bytes)
}

fn read_vector<R: Read>(r: &mut R, dimensions: usize) -> io::Result<ValueVector> {
    let bytes = read_exact_len(r, dimensions as u64 * 8, "limit vector")?;
    let mut v = ValueVector::zeros(dimensions);
    decode_f64s(&bytes, &mut v)?;
    Ok(v)
}

/// Deserialize a timeline from `r`.
///
/// Records are inserted with their stored tangents. A record whose time is
/// already occupied is skipped with a warning; the earlier record wins.
pub fn read_timeline<R: Read>(r: &mut R) -> io::Result<Timeline> {
    let header = ArchiveHeader::read_from(r)?;
    let dimensions = header.dimensions as usize;
    let kinds = read_kind_table(r)?;

    let mut timeline = Timeline::new(dimensions);
    if header.flags.has_lower_limit {
        let lower = read_vector(r, dimensions)?;
        timeline
            .set_lower_limit(lower)
            .map_err(|e| invalid(e.to_string()))?;
    }
    if header.flags.has_upper_limit {
        let upper = read_vector(r, dimensions)?;
        timeline
            .set_upper_limit(upper)
            .map_err(|e| invalid(e.to_string()))?;
    }

    let mut buf8 = [0u8; 8];
    r.read_exact(&mut buf8)?;
    let block_len = u64::from_le_bytes(buf8);

    let block = read_exact_len(r, block_len, "point block")?;

    let records = match header.flags.compression {
        CompressionType::None => block,
        CompressionType::Lz4 => decompress_lz4(&block)?,
    };

    let record_size = header.record_size();
    let expected = (header.point_count as usize).checked_mul(record_size);
    if expected != Some(records.len()) {
        return Err(invalid(format!(
            "KTLN point block holds {} bytes, expected {} records of {} bytes",
            records.len(),
            header.point_count,
            record_size
        )));
    }

    let mut skipped = 0usize;
    for record in records.chunks_exact(record_size) {
        let kind = *kinds
            .get(record[0] as usize)
            .ok_or_else(|| invalid(format!("Unknown KTLN kind index: {}", record[0])))?;

        let mut time = [0.0];
        decode_f64s(&record[1..9], &mut time)?;
        if !time[0].is_finite() {
            return Err(invalid(format!("Non-finite KTLN record time: {}", time[0])));
        }
        let mut value = ValueVector::zeros(dimensions);
        decode_f64s(&record[9..9 + dimensions * 8], &mut value)?;
        let mut tangent = ValueVector::zeros(dimensions);
        decode_f64s(&record[9 + dimensions * 8..], &mut tangent)?;

        let point = Point {
            time: time[0],
            value,
            tangent,
            kind,
        };
        if timeline.add_point(point).is_none() {
            log::warn!("Skipping duplicate KTLN record at {}s", time[0]);
            skipped += 1;
        }
    }

    log::debug!(
        "Read KTLN archive: {} point(s), {} skipped, {} dimension(s)",
        timeline.len(),
        skipped,
        dimensions
    );
    Ok(timeline)
}

/// Read a timeline archive from `path`.
pub fn load_file<P: AsRef<Path>>(path: P) -> io::Result<Timeline> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    read_timeline(&mut reader)
}

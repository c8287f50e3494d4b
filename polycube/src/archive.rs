//! On-disk polycube archive ("pcube") and legacy per-tier cache (spec.md §6).

use crate::error::{Error, Result};
use crate::grid::Identifier;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression as GzLevel;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

const MAGIC: [u8; 4] = [0xCB, 0xEC, 0xCB, 0xEC];

/// Whether stored identifiers are the raw canonical bytes, or have additionally
/// been re-oriented to their bitwise-highest rotation on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Identifiers are stored exactly as computed.
    Unsorted = 0,
    /// Identifiers were rotated to their lexicographically-maximum form before
    /// writing. Every identifier this crate produces already is that maximum
    /// (spec.md §4.4), so in practice `Unsorted` and `Oriented` archives from
    /// this implementation are byte-identical; both are accepted on read.
    Oriented = 1,
}

/// Whether the payload is stored raw or gzip-compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Payload follows the header uncompressed.
    None = 0,
    /// Payload is a single gzip stream whose decompressed content is the
    /// record concatenation.
    Gzip = 1,
}

fn leb128_write(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

fn leb128_read(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0u32;
    for (i, &byte) in bytes.iter().enumerate() {
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
        if shift >= 64 {
            return Err(Error::ArchiveCorrupt("LEB128 count overflowed 64 bits".into()));
        }
    }
    Err(Error::ArchiveCorrupt("truncated LEB128 count".into()))
}

/// Serializes `identifiers` into the pcube binary format and writes it to
/// `writer`.
///
/// # Errors
///
/// Returns [`Error::IoFailure`] on a write failure.
pub fn write_pcube(
    writer: &mut impl Write,
    identifiers: &[Identifier],
    orientation: Orientation,
    compression: Compression,
) -> Result<()> {
    writer.write_all(&MAGIC)?;
    writer.write_all(&[orientation as u8, compression as u8])?;

    let mut count_buf = Vec::new();
    // A real tier is never empty in practice (n >= 1), but guard the `0` count
    // sentinel anyway: an empty archive still round-trips correctly since the
    // reader's "read until EOF" path produces zero records from zero bytes.
    leb128_write(identifiers.len() as u64, &mut count_buf);
    writer.write_all(&count_buf)?;

    let mut payload = Vec::new();
    for id in identifiers {
        payload.extend_from_slice(id.as_bytes());
    }

    match compression {
        Compression::None => writer.write_all(&payload)?,
        Compression::Gzip => {
            let mut encoder = GzEncoder::new(writer, GzLevel::default());
            encoder.write_all(&payload)?;
            encoder.finish()?;
        }
    }
    Ok(())
}

/// Reads a pcube archive from `reader`.
///
/// # Errors
///
/// Returns [`Error::ArchiveCorrupt`] for a bad magic, an unknown orientation or
/// compression byte, a gzip decode failure, or a truncated record.
pub fn read_pcube(reader: &mut impl Read) -> Result<(Orientation, Vec<Identifier>)> {
    let mut header = [0u8; 6];
    reader.read_exact(&mut header).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Error::ArchiveCorrupt("archive shorter than the fixed header".into())
        } else {
            Error::IoFailure(e)
        }
    })?;
    if header[0..4] != MAGIC {
        return Err(Error::ArchiveCorrupt("bad magic".into()));
    }
    let orientation = match header[4] {
        0 => Orientation::Unsorted,
        1 => Orientation::Oriented,
        other => {
            return Err(Error::ArchiveCorrupt(format!(
                "unknown orientation flag {other}"
            )))
        }
    };
    let compression = match header[5] {
        0 => Compression::None,
        1 => Compression::Gzip,
        other => {
            return Err(Error::ArchiveCorrupt(format!(
                "unknown compression flag {other}"
            )))
        }
    };

    let mut rest = Vec::new();
    reader.read_to_end(&mut rest)?;
    let (count, leb_len) = leb128_read(&rest)?;
    let body = &rest[leb_len..];

    let payload = match compression {
        Compression::None => body.to_vec(),
        Compression::Gzip => {
            let mut decoder = GzDecoder::new(body);
            let mut out = Vec::new();
            decoder
                .read_to_end(&mut out)
                .map_err(|e| Error::ArchiveCorrupt(format!("gzip decode failed: {e}")))?;
            out
        }
    };

    let identifiers = parse_records(&payload, count)?;
    Ok((orientation, identifiers))
}

/// `count == 0` is the "read until EOF" sentinel (spec.md §6); otherwise reads
/// exactly `count` records and rejects leftover trailing bytes.
fn parse_records(payload: &[u8], count: u64) -> Result<Vec<Identifier>> {
    let mut out = Vec::new();
    let mut offset = 0usize;
    while offset < payload.len() {
        if count != 0 && out.len() as u64 >= count {
            break;
        }
        if offset + 3 > payload.len() {
            return Err(Error::ArchiveCorrupt("truncated record header".into()));
        }
        let (dx, dy, dz) = (payload[offset], payload[offset + 1], payload[offset + 2]);
        if dx == 0 || dy == 0 || dz == 0 {
            return Err(Error::ArchiveCorrupt(format!(
                "record declares a zero dimension ({dx}, {dy}, {dz})"
            )));
        }
        let body_len = (dx as usize * dy as usize * dz as usize).div_ceil(8);
        let end = offset + 3 + body_len;
        if end > payload.len() {
            return Err(Error::ArchiveCorrupt("truncated record body".into()));
        }
        out.push(Identifier::from_raw(payload[offset..end].to_vec()));
        offset = end;
    }
    if count != 0 && out.len() as u64 != count {
        return Err(Error::ArchiveCorrupt(format!(
            "archive declared {count} records but only {} were present",
            out.len()
        )));
    }
    Ok(out)
}

/// Writes `identifiers` to `path` atomically: the archive is built in a
/// sibling temp file, then renamed into place, so a failed write never leaves
/// a corrupt file at `path` (spec.md §7).
///
/// # Errors
///
/// Returns [`Error::IoFailure`] if the temp file can't be created, written, or
/// renamed.
pub fn write_pcube_atomic(
    path: &Path,
    identifiers: &[Identifier],
    orientation: Orientation,
    compression: Compression,
) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;
    let tmp_path = dir.join(format!(
        ".{}.tmp",
        path.file_name().and_then(|s| s.to_str()).unwrap_or("archive")
    ));
    {
        let mut f = File::create(&tmp_path)?;
        write_pcube(&mut f, identifiers, orientation, compression)?;
        f.flush()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Reads a pcube archive from `path`.
///
/// # Errors
///
/// See [`read_pcube`].
pub fn read_pcube_file(path: &Path) -> Result<Vec<Identifier>> {
    let mut f = File::open(path)?;
    let (_, identifiers) = read_pcube(&mut f)?;
    Ok(identifiers)
}

/// Path of the on-disk cache entry for tier `n`, under `dir`.
///
/// The legacy Python cache used a `cubes_{n}.npy`-style filename; this crate
/// keeps the naming convention but reuses the pcube codec as its one
/// consistent on-disk representation (spec.md §6 permits either).
#[must_use]
pub fn cache_path(dir: &Path, n: u32) -> PathBuf {
    dir.join(format!("cubes_{n}.pcube"))
}

/// Whether a cache entry for tier `n` already exists under `dir`.
#[must_use]
pub fn cache_exists(dir: &Path, n: u32) -> bool {
    cache_path(dir, n).is_file()
}

/// Persists tier `n`'s identifiers to the cache, uncompressed (cache reads are
/// on the hot path of every subsequent tier, so skip the gzip cost there).
///
/// # Errors
///
/// Returns [`Error::IoFailure`] on a write failure.
pub fn save_cache(dir: &Path, n: u32, identifiers: &[Identifier]) -> Result<()> {
    write_pcube_atomic(
        &cache_path(dir, n),
        identifiers,
        Orientation::Oriented,
        Compression::None,
    )
}

/// Loads tier `n`'s identifiers from the cache.
///
/// # Errors
///
/// See [`read_pcube_file`].
pub fn load_cache(dir: &Path, n: u32) -> Result<Vec<Identifier>> {
    read_pcube_file(&cache_path(dir, n))
}

/// Re-exports a cache entry as a (optionally gzip-compressed) shareable pcube
/// archive at an arbitrary destination path. Mirrors `converter.py` in the
/// original implementation; not wired to a CLI flag since spec.md's CLI
/// surface doesn't call for one.
///
/// # Errors
///
/// Returns an error if the cache entry doesn't exist or the destination can't
/// be written.
pub fn convert_cache_to_pcube(
    cache_dir: &Path,
    n: u32,
    dest: &Path,
    compression: Compression,
) -> Result<()> {
    let identifiers = load_cache(cache_dir, n)?;
    write_pcube_atomic(dest, &identifiers, Orientation::Oriented, compression)
}

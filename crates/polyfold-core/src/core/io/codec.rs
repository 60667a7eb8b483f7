//! The structure codec: one record schema, two wire encodings.
//!
//! Text records are line-delimited (`STRUCT` .. `END`); binary records
//! open with the `\xB5SR1` magic and carry fixed-width little-endian
//! fields. The leading byte of a record identifies its encoding, so the
//! two may be freely mixed within one container.

use super::options::Encoding;
use super::record::{ResidueEntry, StructureRecord};
use crate::core::chemistry::{self, TypeSet};
use crate::core::models::metadata::{Metadata, MetadataError};
use crate::core::models::pose::Pose;
use crate::core::models::residue::{Residue, ResidueKind};
use nalgebra::Point3;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Leading bytes of a binary record. The first byte is outside ASCII so a
/// binary record can never be confused with a `STRUCT` text header.
pub const BINARY_MAGIC: [u8; 4] = [0xB5, b'S', b'R', b'1'];

const BINARY_VERSION: u8 = 1;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Record tag '{tag}' is not usable: {source}")]
    InvalidTag {
        tag: String,
        #[source]
        source: MetadataError,
    },

    #[error("Record truncated by end of file")]
    Truncated,

    #[error("Malformed record: {0}")]
    Malformed(#[from] MalformedKind),
}

#[derive(Debug, Error)]
pub enum MalformedKind {
    #[error("Expected a '{expected}' line, found '{found}'")]
    UnexpectedLine {
        expected: &'static str,
        found: String,
    },
    #[error("Invalid {field} field (value: '{value}')")]
    InvalidField { field: &'static str, value: String },
    #[error("Header declares {declared} residues but the record carries {found}")]
    ResidueCountMismatch { declared: usize, found: usize },
    #[error("{kind} entry carries {found} atoms but its template expects {expected}")]
    AtomCountMismatch {
        kind: ResidueKind,
        expected: usize,
        found: usize,
    },
    #[error("Unknown residue kind code {0}")]
    UnknownKindCode(u8),
    #[error("Unknown residue name '{0}'")]
    UnknownKindName(String),
    #[error("Unknown type set '{0}'")]
    UnknownTypeSet(String),
    #[error("Unknown type set code {0}")]
    UnknownTypeSetCode(u8),
    #[error("Unknown residue flag bits {0:#04b}")]
    UnknownFlagBits(u8),
    #[error("Bad record magic {0:02x?}")]
    BadMagic([u8; 4]),
    #[error("Unsupported binary record version {0}")]
    UnsupportedVersion(u8),
    #[error("{0} field is not valid UTF-8")]
    InvalidUtf8(&'static str),
}

/// Snapshots a pose into a structure record.
///
/// Geometry is captured in residue order; `extra_scalars` is copied
/// verbatim. The record tag is exactly `tag`; the pose's own metadata tag
/// is deliberately not consulted, so the caller decides what identifies
/// the record. The pose is never mutated.
pub fn encode_pose(
    pose: &Pose,
    tag: &str,
    extra_scalars: &BTreeMap<String, f64>,
) -> StructureRecord {
    let entries = pose
        .residues()
        .map(|residue| ResidueEntry {
            kind: residue.kind,
            lower_terminus: residue.lower_terminus,
            upper_terminus: residue.upper_terminus,
            phi: residue.phi,
            psi: residue.psi,
            omega: residue.omega,
            coordinates: residue.atoms().iter().map(|atom| atom.position).collect(),
        })
        .collect();
    StructureRecord {
        tag: tag.to_string(),
        type_set: representation_of(pose),
        entries,
        scalars: extra_scalars.clone(),
    }
}

/// The CEN pseudo-atom occurs only in centroid templates, so its presence
/// identifies the representation family a pose was built in.
fn representation_of(pose: &Pose) -> TypeSet {
    let mut residues = pose.residues();
    if residues.any(|residue| residue.atom_by_name("CEN").is_some()) {
        TypeSet::Centroid
    } else {
        TypeSet::FaStandard
    }
}

/// Rebuilds a pose from a structure record.
///
/// Residues are re-instantiated from the record's kind codes and terminus
/// flags through the chemistry templates, then coordinates and torsions
/// are applied. The resulting pose carries fresh metadata whose tag is the
/// record tag.
///
/// # Errors
///
/// Fails with [`MalformedKind::AtomCountMismatch`] when an entry's
/// coordinate count disagrees with its template, and with
/// [`CodecError::InvalidTag`] when the record tag violates the tag rules.
pub fn decode_pose(record: &StructureRecord) -> Result<Pose, CodecError> {
    let mut pose = Pose::new();
    for entry in &record.entries {
        let mut atoms = chemistry::instantiate(
            entry.kind,
            record.type_set,
            entry.lower_terminus,
            entry.upper_terminus,
        );
        if atoms.len() != entry.coordinates.len() {
            return Err(MalformedKind::AtomCountMismatch {
                kind: entry.kind,
                expected: atoms.len(),
                found: entry.coordinates.len(),
            }
            .into());
        }
        for (atom, &position) in atoms.iter_mut().zip(&entry.coordinates) {
            atom.position = position;
        }
        let mut residue = Residue::new(entry.kind, atoms);
        residue.phi = entry.phi;
        residue.psi = entry.psi;
        residue.omega = entry.omega;
        residue.lower_terminus = entry.lower_terminus;
        residue.upper_terminus = entry.upper_terminus;
        pose.push_residue(residue);
    }

    let metadata =
        Metadata::new(&record.tag, pose.residue_count()).map_err(|source| CodecError::InvalidTag {
            tag: record.tag.clone(),
            source,
        })?;
    pose.set_metadata(metadata)
        .expect("metadata was sized to the residue count");
    Ok(pose)
}

/// Serializes one record in the requested encoding.
pub fn write_record(
    record: &StructureRecord,
    encoding: Encoding,
    writer: &mut impl Write,
) -> Result<(), CodecError> {
    Metadata::validate_tag(&record.tag).map_err(|source| CodecError::InvalidTag {
        tag: record.tag.clone(),
        source,
    })?;
    for key in record.scalars.keys() {
        if key.is_empty() || key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(MalformedKind::InvalidField {
                field: "scalar key",
                value: key.clone(),
            }
            .into());
        }
    }
    match encoding {
        Encoding::Text => write_text(record, writer),
        Encoding::Binary => write_binary(record, writer),
    }
}

fn write_text(record: &StructureRecord, writer: &mut impl Write) -> Result<(), CodecError> {
    writeln!(writer, "STRUCT {} {}", record.tag, record.type_set)?;
    writeln!(writer, "NRES {}", record.entries.len())?;
    for entry in &record.entries {
        writeln!(
            writer,
            "RES {} {} {} {} {} {}",
            entry.kind.name(),
            entry.flag_bits(),
            entry.phi,
            entry.psi,
            entry.omega,
            entry.coordinates.len()
        )?;
        for point in &entry.coordinates {
            writeln!(writer, "XYZ {} {} {}", point.x, point.y, point.z)?;
        }
    }
    for (key, value) in &record.scalars {
        writeln!(writer, "SCORE {} {}", key, value)?;
    }
    writeln!(writer, "END")?;
    Ok(())
}

fn write_binary(record: &StructureRecord, writer: &mut impl Write) -> Result<(), CodecError> {
    writer.write_all(&BINARY_MAGIC)?;
    writer.write_all(&[BINARY_VERSION, record.type_set.code()])?;

    let tag = record.tag.as_bytes();
    writer.write_all(&(tag.len() as u16).to_le_bytes())?;
    writer.write_all(tag)?;

    writer.write_all(&(record.entries.len() as u32).to_le_bytes())?;
    for entry in &record.entries {
        if entry.coordinates.len() > usize::from(u16::MAX) {
            return Err(MalformedKind::InvalidField {
                field: "atom count",
                value: entry.coordinates.len().to_string(),
            }
            .into());
        }
        writer.write_all(&[entry.kind.code(), entry.flag_bits()])?;
        writer.write_all(&entry.phi.to_le_bytes())?;
        writer.write_all(&entry.psi.to_le_bytes())?;
        writer.write_all(&entry.omega.to_le_bytes())?;
        writer.write_all(&(entry.coordinates.len() as u16).to_le_bytes())?;
        for point in &entry.coordinates {
            writer.write_all(&point.x.to_le_bytes())?;
            writer.write_all(&point.y.to_le_bytes())?;
            writer.write_all(&point.z.to_le_bytes())?;
        }
    }

    writer.write_all(&(record.scalars.len() as u16).to_le_bytes())?;
    for (key, value) in &record.scalars {
        let key_bytes = key.as_bytes();
        writer.write_all(&(key_bytes.len() as u16).to_le_bytes())?;
        writer.write_all(key_bytes)?;
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Reads the next record from the stream, detecting its encoding from the
/// leading byte. Returns `Ok(None)` at a clean end of input (only blank
/// lines remain).
///
/// # Errors
///
/// Fails with [`CodecError::Truncated`] when input ends inside a record
/// and with [`CodecError::Malformed`] on anything that parses wrong.
pub fn read_record(reader: &mut impl BufRead) -> Result<Option<StructureRecord>, CodecError> {
    if !skip_blank_lines(reader)? {
        return Ok(None);
    }
    let first = reader.fill_buf()?[0];
    if first == BINARY_MAGIC[0] {
        read_binary(reader).map(Some)
    } else {
        read_text(reader).map(Some)
    }
}

/// Consumes inter-record blank lines; `Ok(false)` means end of input.
fn skip_blank_lines(reader: &mut impl BufRead) -> Result<bool, CodecError> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(false);
        }
        if buf[0] == b'\n' || buf[0] == b'\r' {
            reader.consume(1);
        } else {
            return Ok(true);
        }
    }
}

fn read_line_or_truncated(reader: &mut impl BufRead) -> Result<String, CodecError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(CodecError::Truncated);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

fn parse_token<T: std::str::FromStr>(
    field: &'static str,
    token: Option<&str>,
) -> Result<T, CodecError> {
    let token = token.ok_or(MalformedKind::InvalidField {
        field,
        value: String::new(),
    })?;
    token.parse().map_err(|_| {
        CodecError::from(MalformedKind::InvalidField {
            field,
            value: token.to_string(),
        })
    })
}

fn read_text(reader: &mut impl BufRead) -> Result<StructureRecord, CodecError> {
    let header = read_line_or_truncated(reader)?;
    let mut tokens = header.split_whitespace();
    if tokens.next() != Some("STRUCT") {
        return Err(MalformedKind::UnexpectedLine {
            expected: "STRUCT",
            found: header.clone(),
        }
        .into());
    }
    let tag: String = parse_token("tag", tokens.next())?;
    let type_set_name: String = parse_token("type set", tokens.next())?;
    let type_set: TypeSet = type_set_name
        .parse()
        .map_err(|_| MalformedKind::UnknownTypeSet(type_set_name.clone()))?;

    let count_line = read_line_or_truncated(reader)?;
    let mut tokens = count_line.split_whitespace();
    if tokens.next() != Some("NRES") {
        return Err(MalformedKind::UnexpectedLine {
            expected: "NRES",
            found: count_line.clone(),
        }
        .into());
    }
    let declared: usize = parse_token("residue count", tokens.next())?;

    let mut entries = Vec::with_capacity(declared);
    for found in 0..declared {
        let line = read_line_or_truncated(reader)?;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("RES") => {}
            Some("END") => {
                return Err(MalformedKind::ResidueCountMismatch { declared, found }.into());
            }
            _ => {
                return Err(MalformedKind::UnexpectedLine {
                    expected: "RES",
                    found: line.clone(),
                }
                .into());
            }
        }
        let name: String = parse_token("residue name", tokens.next())?;
        let kind: ResidueKind = name
            .parse()
            .map_err(|_| MalformedKind::UnknownKindName(name.clone()))?;
        let flag_bits: u8 = parse_token("flags", tokens.next())?;
        let (lower_terminus, upper_terminus) = ResidueEntry::flags_from_bits(flag_bits)
            .ok_or(MalformedKind::UnknownFlagBits(flag_bits))?;
        let phi: f64 = parse_token("phi", tokens.next())?;
        let psi: f64 = parse_token("psi", tokens.next())?;
        let omega: f64 = parse_token("omega", tokens.next())?;
        let atom_count: usize = parse_token("atom count", tokens.next())?;

        let mut coordinates = Vec::with_capacity(atom_count);
        for _ in 0..atom_count {
            let line = read_line_or_truncated(reader)?;
            let mut tokens = line.split_whitespace();
            if tokens.next() != Some("XYZ") {
                return Err(MalformedKind::UnexpectedLine {
                    expected: "XYZ",
                    found: line.clone(),
                }
                .into());
            }
            let x: f64 = parse_token("x", tokens.next())?;
            let y: f64 = parse_token("y", tokens.next())?;
            let z: f64 = parse_token("z", tokens.next())?;
            coordinates.push(Point3::new(x, y, z));
        }

        entries.push(ResidueEntry {
            kind,
            lower_terminus,
            upper_terminus,
            phi,
            psi,
            omega,
            coordinates,
        });
    }

    let mut scalars = BTreeMap::new();
    loop {
        let line = read_line_or_truncated(reader)?;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("END") => break,
            Some("SCORE") => {
                let key: String = parse_token("score key", tokens.next())?;
                let value: f64 = parse_token("score value", tokens.next())?;
                scalars.insert(key, value);
            }
            Some("RES") => {
                return Err(MalformedKind::ResidueCountMismatch {
                    declared,
                    found: declared + 1,
                }
                .into());
            }
            _ => {
                return Err(MalformedKind::UnexpectedLine {
                    expected: "SCORE or END",
                    found: line.clone(),
                }
                .into());
            }
        }
    }

    Ok(StructureRecord {
        tag,
        type_set,
        entries,
        scalars,
    })
}

fn read_exact_or_truncated(reader: &mut impl BufRead, buf: &mut [u8]) -> Result<(), CodecError> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            CodecError::Truncated
        } else {
            CodecError::Io(e)
        }
    })
}

fn read_u16(reader: &mut impl BufRead) -> Result<u16, CodecError> {
    let mut buf = [0u8; 2];
    read_exact_or_truncated(reader, &mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32(reader: &mut impl BufRead) -> Result<u32, CodecError> {
    let mut buf = [0u8; 4];
    read_exact_or_truncated(reader, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f64(reader: &mut impl BufRead) -> Result<f64, CodecError> {
    let mut buf = [0u8; 8];
    read_exact_or_truncated(reader, &mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

fn read_string(
    reader: &mut impl BufRead,
    len: usize,
    field: &'static str,
) -> Result<String, CodecError> {
    let mut buf = vec![0u8; len];
    read_exact_or_truncated(reader, &mut buf)?;
    String::from_utf8(buf).map_err(|_| MalformedKind::InvalidUtf8(field).into())
}

fn read_binary(reader: &mut impl BufRead) -> Result<StructureRecord, CodecError> {
    let mut magic = [0u8; 4];
    read_exact_or_truncated(reader, &mut magic)?;
    if magic != BINARY_MAGIC {
        return Err(MalformedKind::BadMagic(magic).into());
    }
    let mut header = [0u8; 2];
    read_exact_or_truncated(reader, &mut header)?;
    let [version, type_set_code] = header;
    if version != BINARY_VERSION {
        return Err(MalformedKind::UnsupportedVersion(version).into());
    }
    let type_set = TypeSet::from_code(type_set_code)
        .ok_or(MalformedKind::UnknownTypeSetCode(type_set_code))?;

    let tag_len = read_u16(reader)? as usize;
    let tag = read_string(reader, tag_len, "tag")?;

    let residue_count = read_u32(reader)? as usize;
    let mut entries = Vec::with_capacity(residue_count);
    for _ in 0..residue_count {
        let mut head = [0u8; 2];
        read_exact_or_truncated(reader, &mut head)?;
        let [kind_code, flag_bits] = head;
        let kind =
            ResidueKind::from_code(kind_code).ok_or(MalformedKind::UnknownKindCode(kind_code))?;
        let (lower_terminus, upper_terminus) = ResidueEntry::flags_from_bits(flag_bits)
            .ok_or(MalformedKind::UnknownFlagBits(flag_bits))?;
        let phi = read_f64(reader)?;
        let psi = read_f64(reader)?;
        let omega = read_f64(reader)?;
        let atom_count = read_u16(reader)? as usize;
        let mut coordinates = Vec::with_capacity(atom_count);
        for _ in 0..atom_count {
            let x = read_f64(reader)?;
            let y = read_f64(reader)?;
            let z = read_f64(reader)?;
            coordinates.push(Point3::new(x, y, z));
        }
        entries.push(ResidueEntry {
            kind,
            lower_terminus,
            upper_terminus,
            phi,
            psi,
            omega,
            coordinates,
        });
    }

    let scalar_count = read_u16(reader)? as usize;
    let mut scalars = BTreeMap::new();
    for _ in 0..scalar_count {
        let key_len = read_u16(reader)? as usize;
        let key = read_string(reader, key_len, "scalar key")?;
        let value = read_f64(reader)?;
        scalars.insert(key, value);
    }

    Ok(StructureRecord {
        tag,
        type_set,
        entries,
        scalars,
    })
}

use crate::core::chemistry::TypeSet;
use crate::core::models::residue::ResidueKind;
use nalgebra::Point3;
use std::collections::BTreeMap;

const LOWER_TERMINUS_BIT: u8 = 0b01;
const UPPER_TERMINUS_BIT: u8 = 0b10;

/// Geometry of one residue inside a structure record: typing, terminus
/// flags, backbone torsions, and one coordinate per canonical atom.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueEntry {
    pub kind: ResidueKind,
    pub lower_terminus: bool,
    pub upper_terminus: bool,
    pub phi: f64,
    pub psi: f64,
    pub omega: f64,
    pub coordinates: Vec<Point3<f64>>,
}

impl ResidueEntry {
    /// Packs the terminus flags into the wire flag byte.
    pub fn flag_bits(&self) -> u8 {
        let mut bits = 0;
        if self.lower_terminus {
            bits |= LOWER_TERMINUS_BIT;
        }
        if self.upper_terminus {
            bits |= UPPER_TERMINUS_BIT;
        }
        bits
    }

    /// Unpacks the wire flag byte; `None` if unknown bits are set.
    pub fn flags_from_bits(bits: u8) -> Option<(bool, bool)> {
        if bits & !(LOWER_TERMINUS_BIT | UPPER_TERMINUS_BIT) != 0 {
            return None;
        }
        Some((
            bits & LOWER_TERMINUS_BIT != 0,
            bits & UPPER_TERMINUS_BIT != 0,
        ))
    }
}

/// The serialized form of exactly one pose.
///
/// A record is a value type: it shares no state with the pose that produced
/// it or the pose it will populate. Scalar fields are kept in a `BTreeMap`
/// so encoded output is deterministic in key order.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureRecord {
    pub tag: String,
    /// Representation family the geometry was captured in; decoding expands
    /// atom templates from this family.
    pub type_set: TypeSet,
    pub entries: Vec<ResidueEntry>,
    /// Free-form auxiliary scalars keyed by name (e.g. external scores).
    pub scalars: BTreeMap<String, f64>,
}

impl StructureRecord {
    pub fn residue_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_flags(lower: bool, upper: bool) -> ResidueEntry {
        ResidueEntry {
            kind: ResidueKind::Alanine,
            lower_terminus: lower,
            upper_terminus: upper,
            phi: 0.0,
            psi: 0.0,
            omega: 0.0,
            coordinates: Vec::new(),
        }
    }

    #[test]
    fn flag_bits_round_trip() {
        for (lower, upper) in [(false, false), (true, false), (false, true), (true, true)] {
            let bits = entry_with_flags(lower, upper).flag_bits();
            assert_eq!(ResidueEntry::flags_from_bits(bits), Some((lower, upper)));
        }
    }

    #[test]
    fn unknown_flag_bits_are_rejected() {
        assert_eq!(ResidueEntry::flags_from_bits(0b100), None);
        assert_eq!(ResidueEntry::flags_from_bits(0xFF), None);
    }
}

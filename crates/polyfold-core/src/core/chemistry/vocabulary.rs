use crate::core::models::atom::{Atom, Element};
use crate::core::models::residue::ResidueKind;
use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Representation family a pose is built in.
///
/// `FaStandard` carries heavy atoms plus the backbone amide hydrogen;
/// `Centroid` reduces each side chain to a single `CEN` pseudo-atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeSet {
    #[default]
    FaStandard,
    Centroid,
}

impl TypeSet {
    /// Stable numeric code used by the binary wire encoding.
    pub fn code(&self) -> u8 {
        match self {
            TypeSet::FaStandard => 0,
            TypeSet::Centroid => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<TypeSet> {
        match code {
            0 => Some(TypeSet::FaStandard),
            1 => Some(TypeSet::Centroid),
            _ => None,
        }
    }
}

impl FromStr for TypeSet {
    type Err = VocabularyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fa_standard" => Ok(TypeSet::FaStandard),
            "centroid" => Ok(TypeSet::Centroid),
            other => Err(VocabularyError::UnknownResidueType {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeSet::FaStandard => "fa_standard",
            TypeSet::Centroid => "centroid",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("Unrecognized residue letter '{letter}' at sequence position {position}")]
    UnknownResidueLetter { letter: char, position: usize },

    #[error("Unknown residue type identifier '{name}'")]
    UnknownResidueType { name: String },
}

static ONE_LETTER_CODES: Map<char, &'static str> = phf_map! {
    'A' => "ALA", 'R' => "ARG", 'N' => "ASN", 'D' => "ASP", 'C' => "CYS",
    'E' => "GLU", 'Q' => "GLN", 'G' => "GLY", 'H' => "HIS", 'I' => "ILE",
    'L' => "LEU", 'K' => "LYS", 'M' => "MET", 'F' => "PHE", 'P' => "PRO",
    'S' => "SER", 'T' => "THR", 'W' => "TRP", 'Y' => "TYR", 'V' => "VAL",
};

static SIDECHAIN_HEAVY_ATOMS: Map<&'static str, &'static [&'static str]> = phf_map! {
    "ALA" => &["CB"],
    "ARG" => &["CB", "CG", "CD", "NE", "CZ", "NH1", "NH2"],
    "ASN" => &["CB", "CG", "OD1", "ND2"],
    "ASP" => &["CB", "CG", "OD1", "OD2"],
    "CYS" => &["CB", "SG"],
    "GLU" => &["CB", "CG", "CD", "OE1", "OE2"],
    "GLN" => &["CB", "CG", "CD", "OE1", "NE2"],
    "GLY" => &[],
    "HIS" => &["CB", "CG", "ND1", "CD2", "CE1", "NE2"],
    "ILE" => &["CB", "CG1", "CG2", "CD1"],
    "LEU" => &["CB", "CG", "CD1", "CD2"],
    "LYS" => &["CB", "CG", "CD", "CE", "NZ"],
    "MET" => &["CB", "CG", "SD", "CE"],
    "PHE" => &["CB", "CG", "CD1", "CD2", "CE1", "CE2", "CZ"],
    "PRO" => &["CB", "CG", "CD"],
    "SER" => &["CB", "OG"],
    "THR" => &["CB", "OG1", "CG2"],
    "TRP" => &["CB", "CG", "CD1", "CD2", "NE1", "CE2", "CE3", "CZ2", "CZ3", "CH2"],
    "TYR" => &["CB", "CG", "CD1", "CD2", "CE1", "CE2", "CZ", "OH"],
    "VAL" => &["CB", "CG1", "CG2"],
    // N-methylglycine: the methyl carbon sits on the backbone nitrogen.
    "SAR" => &["CA1"],
    // beta-D-glucopyranose: ring carbons, ring oxygen, hydroxyl oxygens.
    "GLC" => &["C1", "C2", "C3", "C4", "C5", "C6", "O1", "O2", "O3", "O4", "O5", "O6"],
};

/// Resolves a one-letter sequence code to a residue kind.
///
/// The one-letter alphabet is shared by both representation families; the
/// family only changes which atom template [`instantiate`] expands to.
/// `position` (1-based) is carried into the error for diagnosis.
pub fn kind_from_letter(letter: char, position: usize) -> Result<ResidueKind, VocabularyError> {
    let name = ONE_LETTER_CODES
        .get(&letter.to_ascii_uppercase())
        .ok_or(VocabularyError::UnknownResidueLetter { letter, position })?;
    Ok(name.parse().expect("one-letter table only names known kinds"))
}

/// Resolves an explicit residue type name (e.g. "ALA", "SAR") to a kind.
pub fn kind_from_name(name: &str) -> Result<ResidueKind, VocabularyError> {
    name.parse()
        .map_err(|_| VocabularyError::UnknownResidueType {
            name: name.to_string(),
        })
}

/// Infers the element of a canonical atom name.
pub fn element_of(name: &str) -> Element {
    if name == "CEN" {
        return Element::Virtual;
    }
    match name.chars().next() {
        Some('C') => Element::Carbon,
        Some('N') => Element::Nitrogen,
        Some('O') => Element::Oxygen,
        Some('S') => Element::Sulfur,
        Some('H') => Element::Hydrogen,
        _ => Element::Virtual,
    }
}

fn sidechain_of(kind: ResidueKind) -> &'static [&'static str] {
    SIDECHAIN_HEAVY_ATOMS
        .get(kind.name())
        .expect("every kind in the closed vocabulary has a template")
}

/// Whether the kind carries a backbone amide hydrogen.
fn has_amide_hydrogen(kind: ResidueKind) -> bool {
    // Proline's nitrogen is part of the ring; sarcosine's is methylated.
    !matches!(kind, ResidueKind::Proline | ResidueKind::Sarcosine)
}

/// Expands a residue kind into its canonical ordered atom set.
///
/// The result is a deterministic function of `(kind, set, lower, upper)`:
/// backbone atoms first, then the representation-dependent side chain, then
/// the terminus patch. Carbohydrates ignore the terminus flags and the
/// representation family (they have a single template).
pub fn instantiate(kind: ResidueKind, set: TypeSet, lower: bool, upper: bool) -> Vec<Atom> {
    let mut names: Vec<&str> = Vec::new();

    if kind.is_carbohydrate() {
        names.extend_from_slice(sidechain_of(kind));
        return names
            .into_iter()
            .map(|name| Atom::new(name, element_of(name)))
            .collect();
    }

    names.push("N");
    if has_amide_hydrogen(kind) && !lower {
        names.push("H");
    }
    if lower {
        names.extend_from_slice(&["H1", "H2", "H3"]);
    }
    names.extend_from_slice(&["CA", "C", "O"]);

    match set {
        TypeSet::FaStandard => {
            names.extend_from_slice(sidechain_of(kind));
        }
        TypeSet::Centroid => {
            if kind != ResidueKind::Glycine {
                names.push("CB");
            }
            names.push("CEN");
        }
    }

    if upper {
        names.push("OXT");
    }

    names
        .into_iter()
        .map(|name| Atom::new(name, element_of(name)))
        .collect()
}

/// Atom count [`instantiate`] would produce, without allocating atoms.
pub fn template_len(kind: ResidueKind, set: TypeSet, lower: bool, upper: bool) -> usize {
    if kind.is_carbohydrate() {
        return sidechain_of(kind).len();
    }
    let backbone = 4; // N, CA, C, O
    let hydrogens = if lower {
        3
    } else if has_amide_hydrogen(kind) {
        1
    } else {
        0
    };
    let sidechain = match set {
        TypeSet::FaStandard => sidechain_of(kind).len(),
        TypeSet::Centroid => {
            if kind == ResidueKind::Glycine {
                1
            } else {
                2
            }
        }
    };
    backbone + hydrogens + sidechain + usize::from(upper)
}

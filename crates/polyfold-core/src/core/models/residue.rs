use super::atom::Atom;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed residue-type vocabulary.
///
/// Besides the twenty standard amino acids, the vocabulary carries one
/// peptoid (sarcosine) and one carbohydrate (glucopyranose) so that
/// non-protein polymer chemistry survives a round trip through the
/// structure codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResidueKind {
    // --- Aliphatic, Nonpolar ---
    Alanine,    // ALA / A
    Glycine,    // GLY / G
    Isoleucine, // ILE / I
    Leucine,    // LEU / L
    Proline,    // PRO / P
    Valine,     // VAL / V

    // --- Aromatic ---
    Phenylalanine, // PHE / F
    Tryptophan,    // TRP / W
    Tyrosine,      // TYR / Y

    // --- Polar, Uncharged ---
    Asparagine, // ASN / N
    Cysteine,   // CYS / C
    Glutamine,  // GLN / Q
    Methionine, // MET / M
    Serine,     // SER / S
    Threonine,  // THR / T

    // --- Charged ---
    Arginine,     // ARG / R
    Histidine,    // HIS / H
    Lysine,       // LYS / K
    AsparticAcid, // ASP / D
    GlutamicAcid, // GLU / E

    // --- Non-protein polymers ---
    Sarcosine, // SAR - N-methylglycine, the simplest peptoid monomer
    Glucose,   // GLC - beta-D-glucopyranose
}

impl ResidueKind {
    /// Every kind, in wire-code order.
    pub const ALL: [ResidueKind; 22] = [
        ResidueKind::Alanine,
        ResidueKind::Arginine,
        ResidueKind::Asparagine,
        ResidueKind::AsparticAcid,
        ResidueKind::Cysteine,
        ResidueKind::GlutamicAcid,
        ResidueKind::Glutamine,
        ResidueKind::Glycine,
        ResidueKind::Histidine,
        ResidueKind::Isoleucine,
        ResidueKind::Leucine,
        ResidueKind::Lysine,
        ResidueKind::Methionine,
        ResidueKind::Phenylalanine,
        ResidueKind::Proline,
        ResidueKind::Serine,
        ResidueKind::Threonine,
        ResidueKind::Tryptophan,
        ResidueKind::Tyrosine,
        ResidueKind::Valine,
        ResidueKind::Sarcosine,
        ResidueKind::Glucose,
    ];

    /// Three-letter residue name (e.g. "ALA").
    pub fn name(&self) -> &'static str {
        match self {
            ResidueKind::Alanine => "ALA",
            ResidueKind::Arginine => "ARG",
            ResidueKind::Asparagine => "ASN",
            ResidueKind::AsparticAcid => "ASP",
            ResidueKind::Cysteine => "CYS",
            ResidueKind::GlutamicAcid => "GLU",
            ResidueKind::Glutamine => "GLN",
            ResidueKind::Glycine => "GLY",
            ResidueKind::Histidine => "HIS",
            ResidueKind::Isoleucine => "ILE",
            ResidueKind::Leucine => "LEU",
            ResidueKind::Lysine => "LYS",
            ResidueKind::Methionine => "MET",
            ResidueKind::Phenylalanine => "PHE",
            ResidueKind::Proline => "PRO",
            ResidueKind::Serine => "SER",
            ResidueKind::Threonine => "THR",
            ResidueKind::Tryptophan => "TRP",
            ResidueKind::Tyrosine => "TYR",
            ResidueKind::Valine => "VAL",
            ResidueKind::Sarcosine => "SAR",
            ResidueKind::Glucose => "GLC",
        }
    }

    /// Stable numeric code used by the binary wire encoding.
    pub fn code(&self) -> u8 {
        Self::ALL
            .iter()
            .position(|kind| kind == self)
            .expect("every kind is listed in ALL") as u8
    }

    /// Inverse of [`ResidueKind::code`].
    pub fn from_code(code: u8) -> Option<ResidueKind> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn is_protein(&self) -> bool {
        !matches!(self, ResidueKind::Sarcosine | ResidueKind::Glucose)
    }

    pub fn is_peptoid(&self) -> bool {
        matches!(self, ResidueKind::Sarcosine)
    }

    pub fn is_carbohydrate(&self) -> bool {
        matches!(self, ResidueKind::Glucose)
    }

    /// Whether this kind has a polymer backbone that takes terminus patches.
    pub fn is_polymer_backbone(&self) -> bool {
        self.is_protein() || self.is_peptoid()
    }
}

#[derive(Debug, Error)]
#[error("Unknown residue type name '{0}'")]
pub struct ParseResidueKindError(pub String);

impl FromStr for ResidueKind {
    type Err = ParseResidueKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_uppercase();
        ResidueKind::ALL
            .iter()
            .find(|kind| kind.name() == name)
            .copied()
            .ok_or_else(|| ParseResidueKindError(s.to_string()))
    }
}

impl fmt::Display for ResidueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One monomer unit of a pose: an ordered, fixed-topology set of atoms with
/// backbone torsion angles and polymer role flags.
///
/// Atom count and naming are fully determined by `(kind, lower_terminus,
/// upper_terminus)` through the chemistry tables; residues are only
/// constructed by the sequence builder and the structure codec, so no
/// partially-built residue is observable outside those components.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    /// Residue type drawn from the closed vocabulary.
    pub kind: ResidueKind,
    /// Ordered canonical atom set.
    pub(crate) atoms: Vec<Atom>,
    /// Backbone torsions in degrees.
    pub phi: f64,
    pub psi: f64,
    pub omega: f64,
    /// Chain-terminus flags set by the terminus patches.
    pub lower_terminus: bool,
    pub upper_terminus: bool,
}

impl Residue {
    pub(crate) fn new(kind: ResidueKind, atoms: Vec<Atom>) -> Self {
        Self {
            kind,
            atoms,
            phi: 0.0,
            psi: 0.0,
            omega: 0.0,
            lower_terminus: false,
            upper_terminus: false,
        }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    pub fn atom_by_name(&self, name: &str) -> Option<&Atom> {
        self.atoms.iter().find(|atom| atom.name == name)
    }

    pub fn is_protein(&self) -> bool {
        self.kind.is_protein()
    }

    pub fn is_peptoid(&self) -> bool {
        self.kind.is_peptoid()
    }

    pub fn is_carbohydrate(&self) -> bool {
        self.kind.is_carbohydrate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Element;

    #[test]
    fn kind_codes_round_trip() {
        for kind in ResidueKind::ALL {
            assert_eq!(ResidueKind::from_code(kind.code()), Some(kind));
        }
    }

    #[test]
    fn from_code_rejects_out_of_range_codes() {
        assert_eq!(ResidueKind::from_code(ResidueKind::ALL.len() as u8), None);
        assert_eq!(ResidueKind::from_code(u8::MAX), None);
    }

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in ResidueKind::ALL {
            assert_eq!(kind.name().parse::<ResidueKind>().unwrap(), kind);
        }
    }

    #[test]
    fn from_str_is_case_insensitive_and_trims() {
        assert_eq!(" ala ".parse::<ResidueKind>().unwrap(), ResidueKind::Alanine);
        assert_eq!("Gly".parse::<ResidueKind>().unwrap(), ResidueKind::Glycine);
    }

    #[test]
    fn from_str_rejects_unknown_names() {
        assert!("XYZ".parse::<ResidueKind>().is_err());
        assert!("".parse::<ResidueKind>().is_err());
    }

    #[test]
    fn role_flags_follow_kind() {
        assert!(ResidueKind::Alanine.is_protein());
        assert!(!ResidueKind::Alanine.is_peptoid());
        assert!(ResidueKind::Sarcosine.is_peptoid());
        assert!(!ResidueKind::Sarcosine.is_protein());
        assert!(ResidueKind::Sarcosine.is_polymer_backbone());
        assert!(ResidueKind::Glucose.is_carbohydrate());
        assert!(!ResidueKind::Glucose.is_polymer_backbone());
    }

    #[test]
    fn new_residue_has_untouched_flags_and_torsions() {
        let atoms = vec![Atom::new("N", Element::Nitrogen)];
        let residue = Residue::new(ResidueKind::Glycine, atoms);
        assert_eq!(residue.phi, 0.0);
        assert_eq!(residue.psi, 0.0);
        assert_eq!(residue.omega, 0.0);
        assert!(!residue.lower_terminus);
        assert!(!residue.upper_terminus);
        assert_eq!(residue.atoms().len(), 1);
    }

    #[test]
    fn atom_by_name_finds_atoms() {
        let atoms = vec![
            Atom::new("N", Element::Nitrogen),
            Atom::new("CA", Element::Carbon),
        ];
        let residue = Residue::new(ResidueKind::Glycine, atoms);
        assert!(residue.atom_by_name("CA").is_some());
        assert!(residue.atom_by_name("CB").is_none());
    }
}

use nalgebra::Point3;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Chemical element of an atom, restricted to the elements that occur in
/// the residue vocabulary.
///
/// `Virtual` covers pseudo-atoms such as the centroid representation's
/// `CEN` site, which carries a coordinate but no chemistry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Carbon,
    Hydrogen,
    Nitrogen,
    Oxygen,
    Sulfur,
    Virtual,
}

#[derive(Debug, Error)]
#[error("Invalid element symbol '{0}'")]
pub struct ParseElementError(pub String);

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "C" => Ok(Element::Carbon),
            "H" => Ok(Element::Hydrogen),
            "N" => Ok(Element::Nitrogen),
            "O" => Ok(Element::Oxygen),
            "S" => Ok(Element::Sulfur),
            "X" => Ok(Element::Virtual),
            other => Err(ParseElementError(other.to_string())),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Element::Carbon => "C",
            Element::Hydrogen => "H",
            Element::Nitrogen => "N",
            Element::Oxygen => "O",
            Element::Sulfur => "S",
            Element::Virtual => "X",
        };
        write!(f, "{}", symbol)
    }
}

/// An atom within a residue.
///
/// Identity (name and element) is fixed at construction and fully determined
/// by the owning residue's type; only the coordinate is mutated by geometry
/// operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Canonical atom name within its residue (e.g. "CA", "N", "OXT").
    pub name: String,
    /// Chemical element.
    pub element: Element,
    /// 3D coordinates in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new atom at the origin.
    ///
    /// Template instantiation places every atom at the origin; callers apply
    /// real coordinates afterwards.
    pub fn new(name: &str, element: Element) -> Self {
        Self {
            name: name.to_string(),
            element,
            position: Point3::origin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_starts_at_origin() {
        let atom = Atom::new("CA", Element::Carbon);
        assert_eq!(atom.name, "CA");
        assert_eq!(atom.element, Element::Carbon);
        assert_eq!(atom.position, Point3::origin());
    }

    #[test]
    fn element_round_trips_through_display_and_from_str() {
        for element in [
            Element::Carbon,
            Element::Hydrogen,
            Element::Nitrogen,
            Element::Oxygen,
            Element::Sulfur,
            Element::Virtual,
        ] {
            let symbol = element.to_string();
            assert_eq!(Element::from_str(&symbol).unwrap(), element);
        }
    }

    #[test]
    fn from_str_rejects_unknown_symbols() {
        assert!(Element::from_str("Q").is_err());
        assert!(Element::from_str("").is_err());
        assert!(Element::from_str("Fe").is_err());
    }

    #[test]
    fn from_str_trims_whitespace() {
        assert_eq!(Element::from_str(" C ").unwrap(), Element::Carbon);
    }
}

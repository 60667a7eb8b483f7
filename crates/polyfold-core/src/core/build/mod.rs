//! Deterministic pose construction from one-letter residue sequences.

use crate::core::chemistry::{self, TypeSet, VocabularyError};
use crate::core::models::metadata::Metadata;
use crate::core::models::pose::Pose;
use crate::core::models::residue::Residue;
use thiserror::Error;

/// Default backbone torsion applied to every standard protein residue: the
/// fully extended (all-trans) conformation. Not a physically relaxed
/// structure; callers needing realistic geometry must post-process.
const EXTENDED_TORSION_DEGREES: f64 = 180.0;

/// Number of leading sequence characters used as the metadata tag.
const TAG_PREFIX_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Cannot build a pose from an empty sequence")]
    EmptySequence,

    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
}

/// Builds a pose from a one-letter residue sequence.
///
/// Residues are instantiated in sequence order with default extended
/// backbone geometry (phi = psi = omega = 180 degrees); residues whose role
/// flags indicate non-standard polymer chemistry keep whatever geometry
/// their type table provides. With `auto_termini`, the first and last
/// residues receive the lower/upper terminus patches. The attached metadata
/// carries one descriptor slot per residue and a tag made of the first
/// eight sequence characters.
///
/// `pose_from_sequence` is a pure function of its three arguments: equal
/// inputs produce bit-identical poses.
///
/// # Errors
///
/// Fails with [`BuildError::EmptySequence`] on a zero-length sequence and
/// with [`VocabularyError::UnknownResidueLetter`] on a character outside
/// the one-letter alphabet.
pub fn pose_from_sequence(
    sequence: &str,
    type_set: TypeSet,
    auto_termini: bool,
) -> Result<Pose, BuildError> {
    if sequence.is_empty() {
        return Err(BuildError::EmptySequence);
    }

    let mut kinds = Vec::with_capacity(sequence.len());
    for (i, letter) in sequence.chars().enumerate() {
        kinds.push(chemistry::kind_from_letter(letter, i + 1)?);
    }

    let last = kinds.len() - 1;
    let mut pose = Pose::new();
    for (i, &kind) in kinds.iter().enumerate() {
        let lower = auto_termini && i == 0 && kind.is_polymer_backbone();
        let upper = auto_termini && i == last && kind.is_polymer_backbone();
        let atoms = chemistry::instantiate(kind, type_set, lower, upper);
        let mut residue = Residue::new(kind, atoms);
        residue.lower_terminus = lower;
        residue.upper_terminus = upper;
        if kind.is_protein() && !kind.is_peptoid() && !kind.is_carbohydrate() {
            residue.phi = EXTENDED_TORSION_DEGREES;
            residue.psi = EXTENDED_TORSION_DEGREES;
            residue.omega = EXTENDED_TORSION_DEGREES;
        }
        pose.push_residue(residue);
    }

    let tag: String = sequence.chars().take(TAG_PREFIX_LEN).collect();
    let metadata = Metadata::new(&tag, pose.residue_count())
        .expect("sequence letters are valid tag characters");
    pose.set_metadata(metadata)
        .expect("metadata was sized to the residue count");

    Ok(pose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::ResidueKind;

    const ALL_TWENTY: &str = "ARNDCEQGHILKMFPSTWYV";

    #[test]
    fn builds_one_residue_per_sequence_letter() {
        let pose = pose_from_sequence(ALL_TWENTY, TypeSet::FaStandard, true).unwrap();
        assert_eq!(pose.residue_count(), ALL_TWENTY.len());
    }

    #[test]
    fn full_alphabet_scenario_matches_contract() {
        let pose = pose_from_sequence(ALL_TWENTY, TypeSet::FaStandard, true).unwrap();

        assert_eq!(pose.tag(), Some("ARNDCEQG"));
        assert!(pose.residue(1).unwrap().lower_terminus);
        assert!(pose.residue(20).unwrap().upper_terminus);
        assert!(!pose.residue(2).unwrap().lower_terminus);
        assert!(!pose.residue(19).unwrap().upper_terminus);

        for residue in pose.residues() {
            assert_eq!(residue.phi, 180.0);
            assert_eq!(residue.psi, 180.0);
            assert_eq!(residue.omega, 180.0);
        }
    }

    #[test]
    fn empty_sequence_is_rejected() {
        assert!(matches!(
            pose_from_sequence("", TypeSet::FaStandard, true),
            Err(BuildError::EmptySequence)
        ));
    }

    #[test]
    fn unknown_letter_reports_its_position() {
        let err = pose_from_sequence("AAXA", TypeSet::FaStandard, true).unwrap_err();
        match err {
            BuildError::Vocabulary(VocabularyError::UnknownResidueLetter { letter, position }) => {
                assert_eq!(letter, 'X');
                assert_eq!(position, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_sequences_use_the_whole_string_as_tag() {
        let pose = pose_from_sequence("GAV", TypeSet::FaStandard, true).unwrap();
        assert_eq!(pose.tag(), Some("GAV"));
    }

    #[test]
    fn tag_truncates_at_eight_characters() {
        let pose = pose_from_sequence("GAVLIFPMW", TypeSet::FaStandard, false).unwrap();
        assert_eq!(pose.tag(), Some("GAVLIFPM"));
    }

    #[test]
    fn without_auto_termini_no_patches_are_applied() {
        let pose = pose_from_sequence("GA", TypeSet::FaStandard, false).unwrap();
        let first = pose.residue(1).unwrap();
        let last = pose.residue(2).unwrap();
        assert!(!first.lower_terminus);
        assert!(!last.upper_terminus);
        assert!(first.atom_by_name("H").is_some());
        assert!(first.atom_by_name("H1").is_none());
        assert!(last.atom_by_name("OXT").is_none());
    }

    #[test]
    fn auto_termini_patches_first_and_last_atom_sets() {
        let pose = pose_from_sequence("GA", TypeSet::FaStandard, true).unwrap();
        let first = pose.residue(1).unwrap();
        let last = pose.residue(2).unwrap();
        assert!(first.atom_by_name("H1").is_some());
        assert!(first.atom_by_name("H").is_none());
        assert!(last.atom_by_name("OXT").is_some());
    }

    #[test]
    fn single_residue_gets_both_terminus_patches() {
        let pose = pose_from_sequence("A", TypeSet::FaStandard, true).unwrap();
        let residue = pose.residue(1).unwrap();
        assert!(residue.lower_terminus);
        assert!(residue.upper_terminus);
        assert!(residue.atom_by_name("H1").is_some());
        assert!(residue.atom_by_name("OXT").is_some());
    }

    #[test]
    fn centroid_family_builds_reduced_residues() {
        let pose = pose_from_sequence("WA", TypeSet::Centroid, false).unwrap();
        assert!(pose.residue(1).unwrap().atom_by_name("CEN").is_some());
        assert!(pose.residue(1).unwrap().atom_by_name("CG").is_none());
    }

    #[test]
    fn build_is_deterministic() {
        let a = pose_from_sequence(ALL_TWENTY, TypeSet::FaStandard, true).unwrap();
        let b = pose_from_sequence(ALL_TWENTY, TypeSet::FaStandard, true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn metadata_descriptors_cover_every_residue() {
        let pose = pose_from_sequence("GAVL", TypeSet::FaStandard, true).unwrap();
        let metadata = pose.metadata().unwrap();
        assert_eq!(metadata.descriptor_count(), 4);
        let numbers: Vec<isize> = metadata.descriptors().iter().map(|d| d.number).collect();
        assert_eq!(numbers, [1, 2, 3, 4]);
        assert!(metadata.descriptors().iter().all(|d| d.chain == 'A'));
    }

    #[test]
    fn lowercase_sequences_build_like_uppercase() {
        let lower = pose_from_sequence("gav", TypeSet::FaStandard, true).unwrap();
        let upper = pose_from_sequence("GAV", TypeSet::FaStandard, true).unwrap();
        assert_eq!(lower.residue_count(), upper.residue_count());
        assert_eq!(
            lower.residue(1).unwrap().kind,
            ResidueKind::Glycine
        );
        // Tags differ (the tag is the raw sequence prefix), geometry does not.
        assert_eq!(lower.residue(2).unwrap().atoms(), upper.residue(2).unwrap().atoms());
    }
}

use super::metadata::Metadata;
use super::residue::Residue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoseError {
    #[error("Residue index {index} out of range [1, {count}]")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Metadata has {descriptors} descriptor slots but the pose has {residues} residues")]
    MetadataSizeMismatch { residues: usize, descriptors: usize },
}

/// An ordered, 1-indexed sequence of residues representing one molecular
/// conformation, with optional per-structure metadata.
///
/// The pose owns its residues exclusively. When metadata is attached it
/// carries exactly one descriptor slot per residue, and every mutation
/// method maintains that invariant: deleting residue `i` removes
/// descriptor slot `i` in the same call. Callers can therefore never
/// observe a pose whose metadata disagrees with its residue count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    residues: Vec<Residue>,
    metadata: Option<Metadata>,
}

impl Pose {
    /// Creates an empty pose with no metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of residues; residue indices run from 1 to this value.
    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    /// The i-th residue (1-indexed).
    ///
    /// # Errors
    ///
    /// Fails with [`PoseError::IndexOutOfRange`] for `i` outside
    /// `[1, residue_count()]`.
    pub fn residue(&self, i: usize) -> Result<&Residue, PoseError> {
        self.check_index(i)?;
        Ok(&self.residues[i - 1])
    }

    /// Mutable access to the i-th residue (1-indexed).
    pub fn residue_mut(&mut self, i: usize) -> Result<&mut Residue, PoseError> {
        self.check_index(i)?;
        Ok(&mut self.residues[i - 1])
    }

    /// Iterates residues in order.
    pub fn residues(&self) -> impl Iterator<Item = &Residue> {
        self.residues.iter()
    }

    pub fn set_phi(&mut self, i: usize, degrees: f64) -> Result<(), PoseError> {
        self.residue_mut(i)?.phi = degrees;
        Ok(())
    }

    pub fn set_psi(&mut self, i: usize, degrees: f64) -> Result<(), PoseError> {
        self.residue_mut(i)?.psi = degrees;
        Ok(())
    }

    pub fn set_omega(&mut self, i: usize, degrees: f64) -> Result<(), PoseError> {
        self.residue_mut(i)?.omega = degrees;
        Ok(())
    }

    /// Appends a residue, growing the metadata descriptor list in lock-step
    /// when metadata is attached.
    pub(crate) fn push_residue(&mut self, residue: Residue) {
        self.residues.push(residue);
        let count = self.residues.len();
        if let Some(metadata) = &mut self.metadata {
            metadata
                .descriptors
                .push(super::metadata::ResidueDescriptor::default_at(count));
        }
    }

    /// Removes residue `i` (1-indexed), re-indexing subsequent residues
    /// downward by one and shrinking the metadata descriptor list by the
    /// corresponding slot.
    ///
    /// # Errors
    ///
    /// Fails with [`PoseError::IndexOutOfRange`] for `i` outside
    /// `[1, residue_count()]`.
    pub fn delete_residue(&mut self, i: usize) -> Result<Residue, PoseError> {
        self.check_index(i)?;
        let removed = self.residues.remove(i - 1);
        if let Some(metadata) = &mut self.metadata {
            metadata.descriptors.remove(i - 1);
        }
        Ok(removed)
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn metadata_mut(&mut self) -> Option<&mut Metadata> {
        self.metadata.as_mut()
    }

    /// Replaces the metadata wholesale.
    ///
    /// # Errors
    ///
    /// Fails with [`PoseError::MetadataSizeMismatch`] if the descriptor
    /// count does not equal the residue count.
    pub fn set_metadata(&mut self, metadata: Metadata) -> Result<(), PoseError> {
        if metadata.descriptor_count() != self.residue_count() {
            return Err(PoseError::MetadataSizeMismatch {
                residues: self.residue_count(),
                descriptors: metadata.descriptor_count(),
            });
        }
        self.metadata = Some(metadata);
        Ok(())
    }

    /// Detaches the metadata; a pose without metadata is a valid state.
    pub fn clear_metadata(&mut self) -> Option<Metadata> {
        self.metadata.take()
    }

    /// The metadata tag, when metadata is attached.
    pub fn tag(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.tag())
    }

    fn check_index(&self, i: usize) -> Result<(), PoseError> {
        if i == 0 || i > self.residues.len() {
            return Err(PoseError::IndexOutOfRange {
                index: i,
                count: self.residues.len(),
            });
        }
        Ok(())
    }
}

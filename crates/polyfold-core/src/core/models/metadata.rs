use thiserror::Error;

/// Longest tag the container format will display; also the bound enforced
/// on construction.
pub const MAX_TAG_LEN: usize = 64;

/// Per-residue descriptor carried alongside the geometry.
///
/// The fields mirror what an external structure file records about a
/// residue's placement; their interpretation is owned by that subsystem,
/// so they are plain values here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueDescriptor {
    /// Chain identifier (e.g. 'A').
    pub chain: char,
    /// Residue sequence number within its chain.
    pub number: isize,
    /// Insertion code, `' '` when absent.
    pub insertion_code: char,
}

impl ResidueDescriptor {
    /// Default descriptor for position `index` (1-based) on chain 'A'.
    pub fn default_at(index: usize) -> Self {
        Self {
            chain: 'A',
            number: index as isize,
            insertion_code: ' ',
        }
    }
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Tag is empty")]
    TagEmpty,
    #[error("Tag '{tag}' contains whitespace or control characters")]
    TagHasDelimiters { tag: String },
    #[error("Tag of {len} characters exceeds the {MAX_TAG_LEN}-character bound")]
    TagTooLong { len: usize },
}

/// Per-structure metadata: a display tag and one descriptor per residue.
///
/// The descriptor list length is kept equal to the owning pose's residue
/// count by the pose's own mutation methods; `Metadata` itself only
/// guarantees a well-formed tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    tag: String,
    pub(crate) descriptors: Vec<ResidueDescriptor>,
}

impl Metadata {
    /// Creates metadata with `residue_count` default descriptor slots.
    ///
    /// # Errors
    ///
    /// Fails if the tag embeds whitespace or control characters (the text
    /// wire format's delimiters) or exceeds [`MAX_TAG_LEN`].
    pub fn new(tag: &str, residue_count: usize) -> Result<Self, MetadataError> {
        Self::validate_tag(tag)?;
        Ok(Self {
            tag: tag.to_string(),
            descriptors: (1..=residue_count).map(ResidueDescriptor::default_at).collect(),
        })
    }

    pub(crate) fn validate_tag(tag: &str) -> Result<(), MetadataError> {
        if tag.is_empty() {
            return Err(MetadataError::TagEmpty);
        }
        if tag.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(MetadataError::TagHasDelimiters {
                tag: tag.to_string(),
            });
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(MetadataError::TagTooLong {
                len: tag.chars().count(),
            });
        }
        Ok(())
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: &str) -> Result<(), MetadataError> {
        Self::validate_tag(tag)?;
        self.tag = tag.to_string();
        Ok(())
    }

    pub fn descriptor_count(&self) -> usize {
        self.descriptors.len()
    }

    pub fn descriptors(&self) -> &[ResidueDescriptor] {
        &self.descriptors
    }

    pub fn descriptors_mut(&mut self) -> &mut [ResidueDescriptor] {
        &mut self.descriptors
    }
}

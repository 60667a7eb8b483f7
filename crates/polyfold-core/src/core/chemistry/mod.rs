//! The residue-type vocabulary: canonical atom sets, role flags, and
//! terminus patches.
//!
//! This is reference chemistry data, not derived structure: atom count and
//! naming for a residue are a deterministic function of its kind, the
//! representation family, and the terminus flags.

mod vocabulary;

pub use vocabulary::{
    TypeSet, VocabularyError, element_of, instantiate, kind_from_letter, kind_from_name,
    template_len,
};

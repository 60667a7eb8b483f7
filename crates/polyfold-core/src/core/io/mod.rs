//! Silent-file I/O: the structure codec and the tagged container format.
//!
//! A silent file is a flat sequence of self-delimiting structure records,
//! each carrying a tag, per-residue typing and geometry, and an optional
//! scalar-field block. There is no global header, which is what makes the
//! format pure-append: independently written files concatenate into a
//! valid container.

pub mod codec;
pub mod container;
pub mod index;
pub mod options;
pub mod record;

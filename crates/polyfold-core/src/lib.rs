//! # polyfold Core Library
//!
//! A library for constructing canonical in-memory molecular structures
//! ("poses") from residue sequences and for exchanging them through an
//! append-only, tagged container format ("silent files").
//!
//! ## Architectural Philosophy
//!
//! The library is organized leaf-first under a single [`core`] module:
//!
//! - **`core::models`: The Data Model.** Owned, invariant-enforcing value
//!   types: [`core::models::pose::Pose`] and its residues, atoms, and
//!   metadata. A pose with metadata always carries exactly one descriptor
//!   slot per residue; the mutation methods maintain this, not the caller.
//!
//! - **`core::chemistry`: The Vocabulary.** The closed residue-type table:
//!   one-letter codes, canonical atom sets, role flags, terminus patches.
//!
//! - **`core::build`: The Sequence Builder.** Deterministic construction of
//!   a pose from a one-letter sequence string with default extended
//!   backbone geometry.
//!
//! - **`core::io`: The File-Format Boundary.** The structure codec (one
//!   record schema, text and binary wire encodings) and the silent-file
//!   container (merge-append write, lazy restartable streaming read).

pub mod core;

//! Data models for molecular structures.
//!
//! This module contains the owned value types a pose is made of: atoms with
//! 3D coordinates, residues with backbone torsions and role flags, and the
//! pose itself with its optional per-structure metadata.

pub mod atom;
pub mod metadata;
pub mod pose;
pub mod residue;

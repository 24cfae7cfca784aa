//! HPO terms are the building blocks of every phenopacket
//!
//! This module only contains the strongly typed [`HpoTermId`] and the
//! [`TermGroup`] collection. Names and hierarchy of the terms live in the
//! [`Ontology`](crate::Ontology) and are accessed through the
//! [`OntologyResolver`](crate::OntologyResolver) trait.

mod group;
mod hpotermid;

pub use group::{TermGroup, TermIds};
pub use hpotermid::HpoTermId;

/// The root term of the ontology `HP:0000001 | All`
pub const ROOT: HpoTermId = HpoTermId::from_u32(1);

/// `HP:0000118 | Phenotypic abnormality`, the parent of all phenotype terms
pub const PHENOTYPIC_ABNORMALITY: HpoTermId = HpoTermId::from_u32(118);

//! Diseases and genes are linked to HPO terms through annotations
//!
//! This module contains the records that are read from the HPO
//! annotation files:
//!
//! - [`DiseaseRecord`]s with their ordered [`PhenotypeAnnotation`]s, read
//!   from `phenotype.hpoa`
//! - the [`FrequencyDescriptor`] of each annotation
//! - gene-to-disease associations and HGNC gene records that are used to
//!   attach [`GeneAssociation`]s to phenopackets
//! - ClinVar variants that are attached as [`VariantAssociation`]s
//!
//! All records are immutable once loaded. They are created by the
//! [`parser`](crate::parser) module and stored in the
//! [`AnnotationIndex`](crate::AnnotationIndex).

mod disease;
mod frequency;
mod gene;
mod phenotype;
mod variant;

pub use disease::{DiseaseId, DiseaseNamespace, DiseaseRecord};
pub use frequency::FrequencyDescriptor;
pub use gene::{
    AssociationProvenance, AssociationType, GeneAssociation, GeneMapping, GeneToDisease,
    HgncData, HgncRecord,
};
pub use phenotype::{Modifiers, PhenotypeAnnotation};
pub use variant::{
    ClinicalSignificance, ClinvarVariant, GenomeAssembly, VariantAssociation, VariantFilter,
    VariantSummary,
};

//! Phenopackets describe the phenotypes of a single (synthetic) patient
//!
//! A [`PhenopacketRecord`] is created by the [`PhenopacketBuilder`] either
//! from all annotations of a disease ([`BuildMode::Convert`]) or from the
//! sampled phenotypes of a synthetic patient ([`BuildMode::Create`]).
//! Records are written as Phenopacket schema v2 JSON files, the serde
//! model of the JSON format lives in [`schema`].
use crate::annotations::{DiseaseId, GeneAssociation, VariantAssociation};
use crate::sampling::PhenotypeSelection;
use crate::HpoTermId;

mod builder;
mod io;
pub mod schema;

pub use builder::PhenopacketBuilder;
pub use io::{read_phenopacket, write_phenopacket};
pub use schema::{MetaData, Resource};

/// Version of the Phenopacket schema
pub const SCHEMA_VERSION: &str = "2.0";

/// Which kind of phenopacket to build
#[derive(Debug, Clone, Copy)]
pub enum BuildMode<'a> {
    /// One phenopacket with all annotations of the disease
    Convert,
    /// One phenopacket per synthetic patient
    Create {
        /// the sampled phenotypes of the patient
        selection: &'a PhenotypeSelection,
        /// 0-based index of the patient
        patient_index: usize,
    },
}

/// An HPO term together with its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledTerm {
    /// the term ID
    pub id: HpoTermId,
    /// the name of the term
    pub label: String,
}

/// A phenotype of the patient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhenotypicFeature {
    /// The phenotype
    pub term: LabeledTerm,
    /// `true` if the phenotype is explicitly absent
    pub excluded: bool,
    /// Age of onset
    pub onset: Option<LabeledTerm>,
    /// Clinical modifiers, e.g. severity
    pub modifiers: Vec<LabeledTerm>,
    /// The annotated frequency, as written in the annotation file
    pub frequency: Option<String>,
}

/// A single phenopacket
///
/// Gene and variant associations are the only parts that change after
/// the record is built, see [`GeneAnnotator`](crate::genes::GeneAnnotator)
/// and [`VariantAnnotator`](crate::variants::VariantAnnotator).
#[derive(Debug, Clone, PartialEq)]
pub struct PhenopacketRecord {
    id: String,
    subject_id: String,
    disease: DiseaseId,
    disease_label: String,
    features: Vec<PhenotypicFeature>,
    genes: Vec<GeneAssociation>,
    variants: Vec<VariantAssociation>,
    meta_data: MetaData,
}

impl PhenopacketRecord {
    pub(crate) fn new(
        id: String,
        subject_id: String,
        disease: DiseaseId,
        disease_label: String,
        features: Vec<PhenotypicFeature>,
        meta_data: MetaData,
    ) -> Self {
        Self {
            id,
            subject_id,
            disease,
            disease_label,
            features,
            genes: Vec::new(),
            variants: Vec::new(),
            meta_data,
        }
    }

    /// The phenopacket ID, also used as file name, e.g. `OMIM_612567_patient1`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The ID of the (synthetic) patient
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// The disease of the patient
    pub fn disease(&self) -> &DiseaseId {
        &self.disease
    }

    /// The name of the disease
    pub fn disease_label(&self) -> &str {
        &self.disease_label
    }

    /// The phenotypes of the patient
    pub fn features(&self) -> &[PhenotypicFeature] {
        &self.features
    }

    /// Genes associated with the disease
    pub fn genes(&self) -> &[GeneAssociation] {
        &self.genes
    }

    /// ClinVar variants reported for the disease
    pub fn variants(&self) -> &[VariantAssociation] {
        &self.variants
    }

    /// Metadata of the phenopacket
    pub fn meta_data(&self) -> &MetaData {
        &self.meta_data
    }

    pub(crate) fn meta_data_mut(&mut self) -> &mut MetaData {
        &mut self.meta_data
    }

    /// Replaces all gene associations
    pub(crate) fn replace_genes(&mut self, genes: Vec<GeneAssociation>) {
        self.genes = genes;
    }

    /// Replaces all variant associations
    pub(crate) fn replace_variants(&mut self, variants: Vec<VariantAssociation>) {
        self.variants = variants;
    }

    /// The file name of the JSON output
    pub fn file_name(&self) -> String {
        format!("{}.json", self.id)
    }
}

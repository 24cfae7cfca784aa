#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
use core::fmt::Debug;
use std::num::ParseIntError;
use thiserror::Error;

pub mod annotations;
pub mod genes;
pub mod index;
pub mod ontology;
pub mod parser;
pub mod phenopacket;
pub mod pipeline;
pub mod sampling;
pub mod term;
pub mod variants;

pub use annotations::{DiseaseId, DiseaseRecord, FrequencyDescriptor, PhenotypeAnnotation};
pub use genes::GeneAnnotator;
pub use index::{AnnotationIndex, DiseaseSelection};
pub use ontology::{Ontology, OntologyResolver};
pub use phenopacket::{BuildMode, PhenopacketBuilder, PhenopacketRecord};
pub use pipeline::{Diagnostics, Pipeline, RunSummary};
pub use sampling::{NoiseConfig, SynthesisConfig};
pub use term::{HpoTermId, TermGroup};
pub use variants::VariantAnnotator;

/// Name written into the `createdBy` field of every phenopacket
pub const CREATED_BY: &str = "phenotype2phenopacket";

/// Seed used for synthetic patients unless the caller provides one
pub const DEFAULT_SEED: u64 = 42;

/// Number of synthetic patients generated per disease by default
pub const DEFAULT_PATIENTS_PER_DISEASE: usize = 1;

const DEFAULT_NUM_MODIFIERS: usize = 2;

/// Main Error type for this crate
///
/// The first group of variants are data-quality issues of a single row,
/// disease or gene. They are recoverable: the affected unit is skipped,
/// the issue is recorded in [`Diagnostics`] and processing continues.
/// All other variants abort the run.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PhenopacketError {
    /// The frequency column of an annotation cannot be interpreted
    #[error("malformed frequency `{0}`")]
    MalformedFrequency(String),
    /// A disease has no usable phenotype annotations
    #[error("no phenotype annotations for {0}")]
    EmptyDiseaseAnnotations(String),
    /// A term ID is not part of the ontology
    #[error("unresolved phenotype term {term} for {disease}")]
    UnresolvedPhenotypeTerm {
        /// the disease the term was annotated to
        disease: String,
        /// the term ID as written in the source
        term: String,
    },
    /// A gene symbol is neither an approved nor a previous HGNC symbol
    #[error("unresolved gene symbol {symbol} for {disease}")]
    UnresolvedGeneSymbol {
        /// the disease the gene is associated with
        disease: String,
        /// the gene symbol from the gene-to-disease mapping
        symbol: String,
    },
    /// A requested disease is not part of the annotation index
    #[error("could not find any phenotype entries for {0}")]
    DiseaseNotFound(String),
    /// Source file not present or can't be opened
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
    /// Failed to parse an integer value
    #[error("unable to parse Integer")]
    ParseIntError,
    /// Input data is malformed
    #[error("invalid input data: {0}")]
    InvalidInput(String),
    /// Noise probabilities outside of `[0, 1]`
    #[error("invalid noise configuration: {0}")]
    InvalidNoiseConfig(String),
    /// Reading or writing files failed
    #[error("I/O error: {0}")]
    Io(String),
    /// Phenopacket JSON could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(String),
}

impl PhenopacketError {
    /// Returns `true` if the error only affects a single annotation,
    /// disease or gene and processing can continue
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PhenopacketError::MalformedFrequency(_)
                | PhenopacketError::EmptyDiseaseAnnotations(_)
                | PhenopacketError::UnresolvedPhenotypeTerm { .. }
                | PhenopacketError::UnresolvedGeneSymbol { .. }
                | PhenopacketError::DiseaseNotFound(_)
        )
    }
}

impl From<ParseIntError> for PhenopacketError {
    fn from(_: ParseIntError) -> Self {
        PhenopacketError::ParseIntError
    }
}

impl From<std::io::Error> for PhenopacketError {
    fn from(err: std::io::Error) -> Self {
        PhenopacketError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PhenopacketError {
    fn from(err: serde_json::Error) -> Self {
        PhenopacketError::Json(err.to_string())
    }
}

/// Shortcut for `Result<T, PhenopacketError>`
pub type PhenopacketResult<T> = Result<T, PhenopacketError>;

//! Synthetic patients are sampled from the phenotype annotations of a disease
//!
//! Sampling happens in two steps:
//!
//! 1. The [`FrequencySampler`] decides for every annotation whether the
//!    patient shows the phenotype, weighted by its annotated frequency
//! 2. The [`NoiseInjector`] perturbs the selection to mimic real clinical
//!    data: phenotypes are missed, recorded imprecisely or wrongly added
//!
//! The [`PatientSampler`] combines both steps for a single patient, using
//! a random number generator that is derived from the run seed, the
//! disease and the patient index. The same input always produces the same
//! patients, independent of the order in which they are generated.
//!
//! # Examples
//!
//! ```
//! use phenotype2phenopacket::sampling::PatientSampler;
//! use phenotype2phenopacket::{
//!     DiseaseId, DiseaseRecord, FrequencyDescriptor, HpoTermId, Ontology,
//!     PhenotypeAnnotation, SynthesisConfig,
//! };
//!
//! let ontology = Ontology::from_obo("tests/small.obo").unwrap();
//!
//! let mut disease = DiseaseRecord::new(DiseaseId::omim(100100), "Alpha syndrome");
//! disease.add_annotation(PhenotypeAnnotation::new(
//!     HpoTermId::try_from("HP:0000252").unwrap(),
//!     FrequencyDescriptor::Obligate,
//! ));
//!
//! let config = SynthesisConfig::default();
//! let sampler = PatientSampler::new(&ontology, &config);
//!
//! let patient = sampler.sample(&disease, 0).unwrap();
//! assert!(!patient.is_empty());
//! assert_eq!(patient, sampler.sample(&disease, 0).unwrap());
//! ```
use crate::{PhenopacketError, PhenopacketResult, DEFAULT_PATIENTS_PER_DISEASE, DEFAULT_SEED};

mod frequency;
mod noise;
mod patient;

pub use frequency::FrequencySampler;
pub use noise::NoiseInjector;
pub use patient::{PatientSampler, PhenotypeOrigin, PhenotypeSelection, SelectedPhenotype};

/// Probabilities of the different noise types
///
/// All probabilities are in `[0, 1]`, which is validated by [`NoiseConfig::new`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseConfig {
    deletion: f64,
    imprecision: f64,
    addition: f64,
    max_imprecision_levels: usize,
}

impl NoiseConfig {
    /// Constructs a new `NoiseConfig`
    ///
    /// - `deletion`: probability that a sampled phenotype is missed
    /// - `imprecision`: probability that a phenotype is replaced by a more
    ///   general ancestor term
    /// - `addition`: probability that one unrelated phenotype is added
    /// - `max_imprecision_levels`: how far up the hierarchy imprecise
    ///   terms may be chosen
    ///
    /// # Errors
    ///
    /// [`PhenopacketError::InvalidNoiseConfig`] if a probability is outside
    /// of `[0, 1]` or `max_imprecision_levels` is `0`
    ///
    /// # Examples
    ///
    /// ```
    /// use phenotype2phenopacket::NoiseConfig;
    ///
    /// assert!(NoiseConfig::new(0.1, 0.2, 0.1, 1).is_ok());
    /// assert!(NoiseConfig::new(1.5, 0.2, 0.1, 1).is_err());
    /// ```
    pub fn new(
        deletion: f64,
        imprecision: f64,
        addition: f64,
        max_imprecision_levels: usize,
    ) -> PhenopacketResult<Self> {
        for (name, value) in [
            ("deletion", deletion),
            ("imprecision", imprecision),
            ("addition", addition),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PhenopacketError::InvalidNoiseConfig(format!(
                    "{name} probability must be between 0 and 1, got {value}"
                )));
            }
        }
        if max_imprecision_levels == 0 {
            return Err(PhenopacketError::InvalidNoiseConfig(
                "max_imprecision_levels must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            deletion,
            imprecision,
            addition,
            max_imprecision_levels,
        })
    }

    /// A configuration that does not change the sampled phenotypes
    pub fn none() -> Self {
        Self {
            deletion: 0.0,
            imprecision: 0.0,
            addition: 0.0,
            max_imprecision_levels: 1,
        }
    }

    /// Probability that a non-obligate phenotype is removed
    pub fn deletion(&self) -> f64 {
        self.deletion
    }

    /// Probability that a phenotype is replaced by an ancestor
    pub fn imprecision(&self) -> f64 {
        self.imprecision
    }

    /// Probability that one false positive phenotype is added
    pub fn addition(&self) -> f64 {
        self.addition
    }

    /// Maximum number of levels above a term for imprecise replacements
    pub fn max_imprecision_levels(&self) -> usize {
        self.max_imprecision_levels
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            deletion: 0.1,
            imprecision: 0.2,
            addition: 0.1,
            max_imprecision_levels: 1,
        }
    }
}

/// Settings for the creation of synthetic patients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisConfig {
    /// Seed of the run, all patients are derived from it
    pub seed: u64,
    /// Number of synthetic patients per disease
    pub patients_per_disease: usize,
    /// Noise applied to every patient
    pub noise: NoiseConfig,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            patients_per_disease: DEFAULT_PATIENTS_PER_DISEASE,
            noise: NoiseConfig::default(),
        }
    }
}

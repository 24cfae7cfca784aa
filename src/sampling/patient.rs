use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::annotations::{DiseaseId, DiseaseRecord, PhenotypeAnnotation};
use crate::ontology::OntologyResolver;
use crate::sampling::{FrequencySampler, NoiseInjector, SynthesisConfig};
use crate::{HpoTermId, PhenopacketResult};

/// Why a phenotype is part of a synthetic patient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhenotypeOrigin {
    /// The annotation at the given index of the disease
    Annotated(usize),
    /// An ancestor of an annotated term
    Imprecise {
        /// index of the annotation
        annotation: usize,
        /// the annotated term that was replaced
        original: HpoTermId,
    },
    /// A random phenotype that is not annotated to the disease
    FalsePositive,
}

/// A single phenotype of a synthetic patient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedPhenotype {
    term: HpoTermId,
    origin: PhenotypeOrigin,
}

impl SelectedPhenotype {
    /// A phenotype as annotated
    pub fn annotated(term: HpoTermId, annotation: usize) -> Self {
        Self {
            term,
            origin: PhenotypeOrigin::Annotated(annotation),
        }
    }

    /// An ancestor that replaces the annotated term
    pub fn imprecise(term: HpoTermId, annotation: usize, original: HpoTermId) -> Self {
        Self {
            term,
            origin: PhenotypeOrigin::Imprecise {
                annotation,
                original,
            },
        }
    }

    /// A phenotype that is not annotated to the disease
    pub fn false_positive(term: HpoTermId) -> Self {
        Self {
            term,
            origin: PhenotypeOrigin::FalsePositive,
        }
    }

    /// The term that the patient shows
    pub fn term(&self) -> HpoTermId {
        self.term
    }

    /// Where the term comes from
    pub fn origin(&self) -> PhenotypeOrigin {
        self.origin
    }

    /// The index of the underlying annotation, `None` for false positives
    pub fn annotation_index(&self) -> Option<usize> {
        match self.origin {
            PhenotypeOrigin::Annotated(idx) => Some(idx),
            PhenotypeOrigin::Imprecise { annotation, .. } => Some(annotation),
            PhenotypeOrigin::FalsePositive => None,
        }
    }

    /// The underlying annotation of the disease, `None` for false positives
    pub fn annotation<'a>(&self, disease: &'a DiseaseRecord) -> Option<&'a PhenotypeAnnotation> {
        self.annotation_index()
            .and_then(|idx| disease.annotations().get(idx))
    }
}

/// The phenotypes of one synthetic patient
///
/// The selection keeps the order of insertion and never contains a
/// term twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhenotypeSelection {
    phenotypes: Vec<SelectedPhenotype>,
}

impl PhenotypeSelection {
    /// Constructs a new, empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a new, empty selection with capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            phenotypes: Vec::with_capacity(capacity),
        }
    }

    /// Adds the phenotype, unless its term is already selected
    ///
    /// Returns `true` if the phenotype was added
    pub fn push(&mut self, phenotype: SelectedPhenotype) -> bool {
        if self.contains(phenotype.term) {
            false
        } else {
            self.phenotypes.push(phenotype);
            true
        }
    }

    /// Returns `true` if the term is selected
    pub fn contains(&self, term: HpoTermId) -> bool {
        self.phenotypes.iter().any(|p| p.term == term)
    }

    /// Returns the number of selected phenotypes
    pub fn len(&self) -> usize {
        self.phenotypes.len()
    }

    /// Returns `true` if no phenotype is selected
    pub fn is_empty(&self) -> bool {
        self.phenotypes.is_empty()
    }

    /// Returns an iterator of the selected phenotypes
    pub fn iter(&self) -> std::slice::Iter<'_, SelectedPhenotype> {
        self.phenotypes.iter()
    }
}

impl<'a> IntoIterator for &'a PhenotypeSelection {
    type Item = &'a SelectedPhenotype;
    type IntoIter = std::slice::Iter<'a, SelectedPhenotype>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Samples the phenotypes of synthetic patients
///
/// Every `(disease, patient_index)` pair uses its own random number
/// generator, derived from the run seed. Patients can be created in
/// any order, or re-created individually, with identical results.
pub struct PatientSampler<'a, O: OntologyResolver> {
    injector: NoiseInjector<'a, O>,
    seed: u64,
}

impl<'a, O: OntologyResolver> PatientSampler<'a, O> {
    /// Constructs a new `PatientSampler`
    pub fn new(resolver: &'a O, config: &'a SynthesisConfig) -> Self {
        Self {
            injector: NoiseInjector::new(resolver, &config.noise),
            seed: config.seed,
        }
    }

    /// Returns the random number generator of a single patient
    pub fn rng(&self, disease: &DiseaseId, patient_index: usize) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(mix(self.seed, disease));
        rng.set_stream(patient_index as u64);
        rng
    }

    /// Samples the phenotypes of the synthetic patient `patient_index`
    ///
    /// Obligate phenotypes are always selected, all other non-excluded
    /// phenotypes according to their frequency. Noise is applied
    /// afterwards.
    ///
    /// # Errors
    ///
    /// [`PhenopacketError::MalformedFrequency`](crate::PhenopacketError::MalformedFrequency)
    /// if an annotation has an invalid frequency. Diseases loaded through the
    /// [`AnnotationIndex`](crate::AnnotationIndex) never contain those.
    pub fn sample(
        &self,
        disease: &DiseaseRecord,
        patient_index: usize,
    ) -> PhenopacketResult<PhenotypeSelection> {
        let mut rng = self.rng(disease.id(), patient_index);
        let mut selection = PhenotypeSelection::with_capacity(disease.annotations().len());

        for (idx, annotation) in disease.annotations().iter().enumerate() {
            if annotation.is_excluded() {
                continue;
            }
            if annotation.is_obligate() {
                selection.push(SelectedPhenotype::annotated(annotation.term(), idx));
                continue;
            }
            let probability = FrequencySampler::resolve_probability(annotation.frequency())?;
            if FrequencySampler::draw(probability, &mut rng) {
                selection.push(SelectedPhenotype::annotated(annotation.term(), idx));
            }
        }
        trace!(
            "Sampled {} phenotypes for {} patient {}",
            selection.len(),
            disease.id(),
            patient_index
        );

        Ok(self.injector.apply(selection, disease, &mut rng))
    }
}

/// Derives the seed of a disease from the run seed (splitmix64 finalizer)
fn mix(seed: u64, disease: &DiseaseId) -> u64 {
    let key = ((disease.namespace() as u64) << 32) | u64::from(disease.as_u32());
    let mut z = seed ^ key.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

use smallvec::SmallVec;

use crate::annotations::FrequencyDescriptor;
use crate::{HpoTermId, DEFAULT_NUM_MODIFIERS};

/// Clinical modifier terms of an annotation, e.g. `HP:0012828 | Severe`
pub type Modifiers = SmallVec<[HpoTermId; DEFAULT_NUM_MODIFIERS]>;

/// The HPO term ID of `Obligate (100%)` in the frequency sub-ontology
const OBLIGATE_FREQUENCY: HpoTermId = HpoTermId::from_u32(40280);

/// A single phenotype of a disease, one row of `phenotype.hpoa`
#[derive(Debug, Clone, PartialEq)]
pub struct PhenotypeAnnotation {
    term: HpoTermId,
    frequency: FrequencyDescriptor,
    frequency_text: String,
    onset: Option<HpoTermId>,
    modifiers: Modifiers,
    excluded: bool,
}

impl PhenotypeAnnotation {
    /// Creates a new annotation without onset and modifiers
    ///
    /// The frequency text defaults to the notation of `frequency`, use
    /// [`PhenotypeAnnotation::with_frequency_text`] to keep the text of
    /// the annotation file.
    pub fn new(term: HpoTermId, frequency: FrequencyDescriptor) -> Self {
        Self {
            term,
            frequency_text: frequency.to_string(),
            frequency,
            onset: None,
            modifiers: Modifiers::new(),
            excluded: false,
        }
    }

    /// Sets the onset term
    #[must_use]
    pub fn with_onset(mut self, onset: HpoTermId) -> Self {
        self.onset = Some(onset);
        self
    }

    /// Sets the frequency as written in the annotation file
    #[must_use]
    pub fn with_frequency_text(mut self, text: &str) -> Self {
        self.frequency_text = text.trim().to_string();
        self
    }

    /// Sets the clinical modifier terms
    #[must_use]
    pub fn with_modifiers<I: IntoIterator<Item = HpoTermId>>(mut self, modifiers: I) -> Self {
        self.modifiers = modifiers.into_iter().collect();
        self
    }

    /// Marks the phenotype as explicitly absent (`NOT` qualifier)
    #[must_use]
    pub fn excluded(mut self) -> Self {
        self.excluded = true;
        self
    }

    /// The annotated phenotype term
    pub fn term(&self) -> HpoTermId {
        self.term
    }

    /// How often the phenotype occurs
    pub fn frequency(&self) -> &FrequencyDescriptor {
        &self.frequency
    }

    /// The frequency as written in the annotation file, empty for
    /// obligate phenotypes without frequency
    pub fn frequency_text(&self) -> &str {
        &self.frequency_text
    }

    /// The age of onset, if annotated
    pub fn onset(&self) -> Option<HpoTermId> {
        self.onset
    }

    /// Clinical modifier terms
    pub fn modifiers(&self) -> &[HpoTermId] {
        &self.modifiers
    }

    /// `true` if the phenotype is asserted to be absent in the disease
    pub fn is_excluded(&self) -> bool {
        self.excluded
    }

    /// `true` if the phenotype is always present in the disease
    ///
    /// That is the case for annotations without frequency and for the
    /// `HP:0040280 | Obligate` frequency term. Excluded phenotypes are
    /// never obligate.
    pub fn is_obligate(&self) -> bool {
        if self.excluded {
            return false;
        }
        match self.frequency {
            FrequencyDescriptor::Obligate => true,
            FrequencyDescriptor::Qualitative(term) => term == OBLIGATE_FREQUENCY,
            _ => false,
        }
    }
}

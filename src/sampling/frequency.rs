use rand::Rng;

use crate::annotations::FrequencyDescriptor;
use crate::{HpoTermId, PhenopacketError, PhenopacketResult};

/// Terms of the HPO frequency sub-ontology and the midpoint of their range
const QUALITATIVE_FREQUENCIES: [(HpoTermId, f64); 6] = [
    (HpoTermId::from_u32(40280), 1.0),   // Obligate, 100%
    (HpoTermId::from_u32(40281), 0.895), // Very frequent, 80-99%
    (HpoTermId::from_u32(40282), 0.545), // Frequent, 30-79%
    (HpoTermId::from_u32(40283), 0.17),  // Occasional, 5-29%
    (HpoTermId::from_u32(40284), 0.025), // Very rare, 1-4%
    (HpoTermId::from_u32(40285), 0.0),   // Excluded, 0%
];

/// Converts annotated frequencies into probabilities and draws from them
///
/// # Examples
///
/// ```
/// use phenotype2phenopacket::sampling::FrequencySampler;
/// use phenotype2phenopacket::FrequencyDescriptor;
///
/// let frequent = FrequencyDescriptor::try_from("HP:0040282").unwrap();
/// assert_eq!(FrequencySampler::resolve_probability(&frequent).unwrap(), 0.545);
///
/// let range = FrequencyDescriptor::try_from("5-29%").unwrap();
/// assert_eq!(FrequencySampler::resolve_probability(&range).unwrap(), 0.17);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencySampler;

impl FrequencySampler {
    /// Returns the probability, in `[0, 1]`, that a patient shows the phenotype
    ///
    /// # Errors
    ///
    /// [`PhenopacketError::MalformedFrequency`] if the descriptor is a
    /// term outside of the frequency sub-ontology or a fraction with a
    /// zero denominator
    pub fn resolve_probability(descriptor: &FrequencyDescriptor) -> PhenopacketResult<f64> {
        match descriptor {
            FrequencyDescriptor::Obligate => Ok(1.0),
            FrequencyDescriptor::Fraction {
                numerator,
                denominator,
            } => {
                if *denominator == 0 {
                    return Err(PhenopacketError::MalformedFrequency(descriptor.to_string()));
                }
                Ok((f64::from(*numerator) / f64::from(*denominator)).clamp(0.0, 1.0))
            }
            FrequencyDescriptor::Qualitative(term) => QUALITATIVE_FREQUENCIES
                .iter()
                .find(|(id, _)| id == term)
                .map(|(_, probability)| *probability)
                .ok_or_else(|| PhenopacketError::MalformedFrequency(term.to_string())),
            FrequencyDescriptor::PercentageRange { low, high } => {
                Ok(((low + high) / 200.0).clamp(0.0, 1.0))
            }
        }
    }

    /// Performs a single weighted coin flip
    ///
    /// A probability of `0` or less never succeeds, `1` or more always
    /// succeeds without using the random number generator.
    pub fn draw<R: Rng + ?Sized>(probability: f64, rng: &mut R) -> bool {
        if probability <= 0.0 {
            false
        } else if probability >= 1.0 {
            true
        } else {
            rng.gen::<f64>() < probability
        }
    }
}

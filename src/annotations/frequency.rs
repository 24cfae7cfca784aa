use std::fmt::Display;

use crate::{HpoTermId, PhenopacketError, PhenopacketResult};

/// How often a phenotype is observed in patients with a disease
///
/// The `frequency` column of `phenotype.hpoa` uses three different
/// notations, an empty column means the phenotype is always present.
///
/// | Source text | Variant |
/// | --- | --- |
/// | *(empty)* | [`FrequencyDescriptor::Obligate`] |
/// | `3/7` | [`FrequencyDescriptor::Fraction`] |
/// | `HP:0040282` | [`FrequencyDescriptor::Qualitative`] |
/// | `25%`, `5-29%`, `30%-50%` | [`FrequencyDescriptor::PercentageRange`] |
/// | `0.25` | [`FrequencyDescriptor::PercentageRange`] (25% - 25%) |
///
/// Converting the descriptor into a probability is the job of the
/// [`FrequencySampler`](crate::sampling::FrequencySampler). The
/// descriptor does not keep the source text, the annotation does
/// (see [`PhenotypeAnnotation::frequency_text`](crate::PhenotypeAnnotation::frequency_text)).
#[derive(Debug, Clone, PartialEq)]
pub enum FrequencyDescriptor {
    /// `numerator` out of `denominator` patients show the phenotype
    Fraction {
        /// patients with the phenotype
        numerator: u32,
        /// all patients
        denominator: u32,
    },
    /// A term of the HPO frequency sub-ontology, e.g. `HP:0040282 | Frequent`
    Qualitative(HpoTermId),
    /// A percentage or a range of percentages
    PercentageRange {
        /// lower bound in percent
        low: f64,
        /// upper bound in percent
        high: f64,
    },
    /// No frequency given, the phenotype is always present
    Obligate,
}

impl FrequencyDescriptor {
    fn malformed(value: &str) -> PhenopacketError {
        PhenopacketError::MalformedFrequency(value.to_string())
    }

    fn parse_percentage(value: &str, number: &str) -> PhenopacketResult<f64> {
        let number = number.trim();
        let percent = number
            .strip_suffix('%')
            .unwrap_or(number)
            .trim_end()
            .parse::<f64>()
            .map_err(|_| Self::malformed(value))?;
        if (0.0..=100.0).contains(&percent) {
            Ok(percent)
        } else {
            Err(Self::malformed(value))
        }
    }
}

impl TryFrom<&str> for FrequencyDescriptor {
    type Error = PhenopacketError;

    /// Parses the `frequency` column of `phenotype.hpoa`
    ///
    /// # Errors
    ///
    /// [`PhenopacketError::MalformedFrequency`] if the value does not
    /// match any of the supported notations
    ///
    /// # Examples
    ///
    /// ```
    /// use phenotype2phenopacket::FrequencyDescriptor;
    ///
    /// assert_eq!(
    ///     FrequencyDescriptor::try_from("1/2").unwrap(),
    ///     FrequencyDescriptor::Fraction { numerator: 1, denominator: 2 }
    /// );
    /// assert_eq!(
    ///     FrequencyDescriptor::try_from("").unwrap(),
    ///     FrequencyDescriptor::Obligate
    /// );
    /// assert!(FrequencyDescriptor::try_from("often").is_err());
    /// ```
    fn try_from(value: &str) -> PhenopacketResult<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(FrequencyDescriptor::Obligate);
        }

        if trimmed.starts_with("HP:") {
            return HpoTermId::try_from(trimmed)
                .map(FrequencyDescriptor::Qualitative)
                .map_err(|_| Self::malformed(value));
        }

        if let Some((numerator, denominator)) = trimmed.split_once('/') {
            let numerator = numerator
                .trim()
                .parse::<u32>()
                .map_err(|_| Self::malformed(value))?;
            let denominator = denominator
                .trim()
                .parse::<u32>()
                .map_err(|_| Self::malformed(value))?;
            if denominator == 0 {
                return Err(Self::malformed(value));
            }
            return Ok(FrequencyDescriptor::Fraction {
                numerator,
                denominator,
            });
        }

        if let Some(percentage) = trimmed.strip_suffix('%') {
            let (low, high) = match percentage.split_once('-') {
                Some((low, high)) => (
                    Self::parse_percentage(value, low)?,
                    Self::parse_percentage(value, high)?,
                ),
                None => {
                    let exact = Self::parse_percentage(value, percentage)?;
                    (exact, exact)
                }
            };
            if low > high {
                return Err(Self::malformed(value));
            }
            return Ok(FrequencyDescriptor::PercentageRange { low, high });
        }

        match trimmed.parse::<f64>() {
            Ok(fraction) if (0.0..=1.0).contains(&fraction) => {
                Ok(FrequencyDescriptor::PercentageRange {
                    low: fraction * 100.0,
                    high: fraction * 100.0,
                })
            }
            _ => Err(Self::malformed(value)),
        }
    }
}

impl Display for FrequencyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrequencyDescriptor::Fraction {
                numerator,
                denominator,
            } => write!(f, "{numerator}/{denominator}"),
            FrequencyDescriptor::Qualitative(term) => write!(f, "{term}"),
            FrequencyDescriptor::PercentageRange { low, high } if low == high => {
                write!(f, "{low}%")
            }
            FrequencyDescriptor::PercentageRange { low, high } => write!(f, "{low}-{high}%"),
            FrequencyDescriptor::Obligate => Ok(()),
        }
    }
}

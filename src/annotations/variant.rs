use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::str::FromStr;

use crate::annotations::DiseaseId;
use crate::{PhenopacketError, PhenopacketResult};

/// Clinical significance of a ClinVar variant
///
/// The variants are ordered from least to most pathogenic, so that a
/// minimum significance can be compared with `>=`.
///
/// # Examples
///
/// ```
/// use phenotype2phenopacket::annotations::ClinicalSignificance;
///
/// let significance = ClinicalSignificance::try_from("Likely pathogenic").unwrap();
/// assert!(significance >= ClinicalSignificance::UncertainSignificance);
/// assert!(significance < ClinicalSignificance::Pathogenic);
///
/// // levels of the command line filter
/// assert_eq!("5".parse::<ClinicalSignificance>().unwrap(), ClinicalSignificance::Pathogenic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ClinicalSignificance {
    /// No classification provided
    #[default]
    NotProvided,
    /// Benign
    Benign,
    /// Likely benign
    LikelyBenign,
    /// Uncertain significance (VUS)
    UncertainSignificance,
    /// Likely pathogenic
    LikelyPathogenic,
    /// Pathogenic
    Pathogenic,
}

impl ClinicalSignificance {
    /// The numeric level, `0` (not provided) to `5` (pathogenic)
    pub fn level(&self) -> u8 {
        match self {
            ClinicalSignificance::NotProvided => 0,
            ClinicalSignificance::Benign => 1,
            ClinicalSignificance::LikelyBenign => 2,
            ClinicalSignificance::UncertainSignificance => 3,
            ClinicalSignificance::LikelyPathogenic => 4,
            ClinicalSignificance::Pathogenic => 5,
        }
    }
}

impl TryFrom<u8> for ClinicalSignificance {
    type Error = PhenopacketError;
    fn try_from(level: u8) -> PhenopacketResult<Self> {
        match level {
            0 => Ok(ClinicalSignificance::NotProvided),
            1 => Ok(ClinicalSignificance::Benign),
            2 => Ok(ClinicalSignificance::LikelyBenign),
            3 => Ok(ClinicalSignificance::UncertainSignificance),
            4 => Ok(ClinicalSignificance::LikelyPathogenic),
            5 => Ok(ClinicalSignificance::Pathogenic),
            _ => Err(PhenopacketError::InvalidInput(format!(
                "clinical significance level must be 0-5, got {level}"
            ))),
        }
    }
}

impl TryFrom<&str> for ClinicalSignificance {
    type Error = PhenopacketError;

    /// Parses the `ClinicalSignificance` column of ClinVar
    ///
    /// Combined classifications such as `Pathogenic/Likely pathogenic`
    /// or `Conflicting interpretations of pathogenicity` are rejected.
    fn try_from(value: &str) -> PhenopacketResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pathogenic" => Ok(ClinicalSignificance::Pathogenic),
            "likely pathogenic" => Ok(ClinicalSignificance::LikelyPathogenic),
            "uncertain significance" => Ok(ClinicalSignificance::UncertainSignificance),
            "likely benign" => Ok(ClinicalSignificance::LikelyBenign),
            "benign" => Ok(ClinicalSignificance::Benign),
            "not provided" => Ok(ClinicalSignificance::NotProvided),
            _ => Err(PhenopacketError::InvalidInput(format!(
                "unsupported clinical significance `{value}`"
            ))),
        }
    }
}

impl FromStr for ClinicalSignificance {
    type Err = PhenopacketError;

    /// Accepts the numeric level (`0`-`5`) or the ClinVar text
    fn from_str(value: &str) -> PhenopacketResult<Self> {
        match value.trim().parse::<u8>() {
            Ok(level) => Self::try_from(level),
            Err(_) => Self::try_from(value),
        }
    }
}

impl Display for ClinicalSignificance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ClinicalSignificance::NotProvided => "not provided",
            ClinicalSignificance::Benign => "Benign",
            ClinicalSignificance::LikelyBenign => "Likely benign",
            ClinicalSignificance::UncertainSignificance => "Uncertain significance",
            ClinicalSignificance::LikelyPathogenic => "Likely pathogenic",
            ClinicalSignificance::Pathogenic => "Pathogenic",
        };
        f.write_str(text)
    }
}

/// Reference genome of a variant position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenomeAssembly {
    /// GRCh37 / hg19
    GRCh37,
    /// GRCh38 / hg38
    GRCh38,
}

impl GenomeAssembly {
    /// The name used by ClinVar
    pub fn as_str(&self) -> &'static str {
        match self {
            GenomeAssembly::GRCh37 => "GRCh37",
            GenomeAssembly::GRCh38 => "GRCh38",
        }
    }
}

impl FromStr for GenomeAssembly {
    type Err = PhenopacketError;
    fn from_str(value: &str) -> PhenopacketResult<Self> {
        match value.trim() {
            "GRCh37" => Ok(GenomeAssembly::GRCh37),
            "GRCh38" => Ok(GenomeAssembly::GRCh38),
            other => Err(PhenopacketError::InvalidInput(format!(
                "unsupported genome assembly `{other}`"
            ))),
        }
    }
}

impl Display for GenomeAssembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects the ClinVar variants that are attached to phenopackets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantFilter {
    /// Variants below this significance are ignored
    pub min_significance: ClinicalSignificance,
    /// Only positions on this assembly are used
    pub assembly: GenomeAssembly,
}

impl VariantFilter {
    /// Constructs a new `VariantFilter`
    pub fn new(min_significance: ClinicalSignificance, assembly: GenomeAssembly) -> Self {
        Self {
            min_significance,
            assembly,
        }
    }

    /// Returns `true` if a variant with the significance and assembly
    /// passes the filter
    pub fn accepts(&self, significance: ClinicalSignificance, assembly: &str) -> bool {
        significance >= self.min_significance && assembly == self.assembly.as_str()
    }
}

/// A single row of ClinVar's `variant_summary.txt`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinvarVariant {
    /// ClinVar variation ID
    pub variation_id: u64,
    /// The gene symbol, if the variant is located in a gene
    pub gene_symbol: Option<String>,
    /// The HGNC ID of the gene, e.g. `HGNC:5`
    pub hgnc_id: Option<String>,
    /// The clinical significance
    pub significance: ClinicalSignificance,
    /// Reference genome of the position
    pub assembly: GenomeAssembly,
    /// Chromosome name, e.g. `17`
    pub chromosome: String,
    /// 1-based start position
    pub position: u64,
    /// Reference allele
    pub reference: String,
    /// Alternate allele
    pub alternate: String,
    /// Diseases the variant is reported for
    pub diseases: Vec<DiseaseId>,
}

/// The ClinVar variants of all diseases
///
/// Only variants that passed the [`VariantFilter`] while parsing are
/// part of the summary.
#[derive(Debug, Default, Clone)]
pub struct VariantSummary {
    variants: Vec<ClinvarVariant>,
    by_disease: HashMap<DiseaseId, Vec<usize>>,
}

impl VariantSummary {
    /// Constructs a new, empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variant
    pub fn insert(&mut self, variant: ClinvarVariant) {
        let idx = self.variants.len();
        let diseases: HashSet<DiseaseId> = variant.diseases.iter().copied().collect();
        for disease in diseases {
            self.by_disease.entry(disease).or_default().push(idx);
        }
        self.variants.push(variant);
    }

    /// All variants of the disease, in file order
    pub fn variants<'a>(
        &'a self,
        disease: &DiseaseId,
    ) -> impl Iterator<Item = &'a ClinvarVariant> + 'a {
        self.by_disease
            .get(disease)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|idx| &self.variants[*idx])
    }

    /// The number of variants
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Returns `true` if there are no variants
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// The number of diseases with at least one variant
    pub fn diseases(&self) -> usize {
        self.by_disease.len()
    }
}

/// A variant that is attached to a phenopacket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantAssociation {
    /// ID of the variant, e.g. `clinvar:12345`
    pub id: String,
    /// The approved gene symbol
    pub gene_symbol: Option<String>,
    /// The HGNC ID of the gene
    pub hgnc_id: Option<String>,
    /// ACMG classification
    pub significance: ClinicalSignificance,
    /// Reference genome, e.g. `GRCh38`
    pub assembly: String,
    /// Chromosome name
    pub chromosome: String,
    /// 1-based position
    pub position: u64,
    /// Reference allele
    pub reference: String,
    /// Alternate allele
    pub alternate: String,
}

impl From<&ClinvarVariant> for VariantAssociation {
    fn from(variant: &ClinvarVariant) -> Self {
        Self {
            id: format!("clinvar:{}", variant.variation_id),
            gene_symbol: variant.gene_symbol.clone(),
            hgnc_id: variant.hgnc_id.clone(),
            significance: variant.significance,
            assembly: variant.assembly.to_string(),
            chromosome: variant.chromosome.clone(),
            position: variant.position,
            reference: variant.reference.clone(),
            alternate: variant.alternate.clone(),
        }
    }
}

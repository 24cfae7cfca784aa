//! Serde model of the Phenopacket schema v2 JSON format
//!
//! Only the messages that are created by this crate are modelled.
//! Field names follow the protobuf JSON mapping (`camelCase`) and empty
//! or default values are omitted.
use serde::{Deserialize, Serialize};

fn is_false(value: &bool) -> bool {
    !value
}

/// `uint64` fields are strings in the protobuf JSON mapping, but plain
/// numbers are accepted when reading
mod uint64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}

/// The root message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phenopacket {
    /// Unique ID of the phenopacket
    pub id: String,
    /// The patient
    pub subject: Individual,
    /// Phenotypes of the patient
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phenotypic_features: Vec<PhenotypicFeature>,
    /// Genetic diagnosis
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interpretations: Vec<Interpretation>,
    /// Diseases of the patient
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diseases: Vec<Disease>,
    /// Versions of the used resources
    pub meta_data: MetaData,
}

/// The subject of a phenopacket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Individual {
    /// ID of the patient
    pub id: String,
}

/// A term of an ontology
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologyClass {
    /// CURIE, e.g. `HP:0001250`
    pub id: String,
    /// Name of the term
    #[serde(default)]
    pub label: String,
}

/// A phenotype
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhenotypicFeature {
    /// Free text, used for the annotated frequency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The phenotype term
    #[serde(rename = "type")]
    pub term: OntologyClass,
    /// `true` if the phenotype was looked for, but is absent
    #[serde(default, skip_serializing_if = "is_false")]
    pub excluded: bool,
    /// Clinical modifiers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<OntologyClass>,
    /// Age of onset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onset: Option<TimeElement>,
}

/// A point in time, only the ontology class variant is used
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeElement {
    /// Onset term, e.g. `HP:0003593 | Infantile onset`
    pub ontology_class: OntologyClass,
}

/// A disease diagnosis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disease {
    /// The disease, e.g. `OMIM:612567`
    pub term: OntologyClass,
}

/// Progress of an interpretation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProgressStatus {
    /// Unknown
    #[default]
    UnknownProgress,
    /// Still ongoing
    InProgress,
    /// Finished
    Completed,
    /// Solved case
    Solved,
    /// Unsolved case
    Unsolved,
}

/// Interpretation of a genomic finding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterpretationStatus {
    /// Unknown
    #[default]
    UnknownStatus,
    /// Ruled out
    Rejected,
    /// Possible cause
    Candidate,
    /// Contributes to the disease
    Contributory,
    /// Causes the disease
    Causative,
}

/// An interpretation of the case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpretation {
    /// ID of the interpretation
    pub id: String,
    /// Progress of the interpretation
    #[serde(default)]
    pub progress_status: ProgressStatus,
    /// The diagnosis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<Diagnosis>,
}

/// A diagnosis with the genomic findings that support it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    /// The diagnosed disease
    pub disease: OntologyClass,
    /// Genes that explain the disease
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genomic_interpretations: Vec<GenomicInterpretation>,
}

/// A single genomic finding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenomicInterpretation {
    /// The patient or biosample
    pub subject_or_biosample_id: String,
    /// Contribution to the disease
    #[serde(default)]
    pub interpretation_status: InterpretationStatus,
    /// The affected gene
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene: Option<GeneDescriptor>,
    /// The variant, used instead of `gene`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_interpretation: Option<VariantInterpretation>,
}

/// ACMG classification of a variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcmgPathogenicityClassification {
    /// Not classified
    #[default]
    NotProvided,
    /// Benign
    Benign,
    /// Likely benign
    LikelyBenign,
    /// Variant of uncertain significance
    UncertainSignificance,
    /// Likely pathogenic
    LikelyPathogenic,
    /// Pathogenic
    Pathogenic,
}

/// A variant and its classification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInterpretation {
    /// ACMG class
    #[serde(default)]
    pub acmg_pathogenicity_classification: AcmgPathogenicityClassification,
    /// The variant
    pub variation_descriptor: VariationDescriptor,
}

/// Description of a variant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariationDescriptor {
    /// ID of the variant, e.g. `clinvar:12345`
    pub id: String,
    /// The gene the variant is located in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_context: Option<GeneDescriptor>,
    /// Position and alleles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcf_record: Option<VcfRecord>,
}

/// A variant in VCF notation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VcfRecord {
    /// Reference genome, e.g. `GRCh38`
    pub genome_assembly: String,
    /// Chromosome
    pub chrom: String,
    /// 1-based position
    #[serde(with = "uint64")]
    pub pos: u64,
    /// Reference allele
    #[serde(rename = "ref")]
    pub reference: String,
    /// Alternate allele
    pub alt: String,
}

/// Identifiers of a gene
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneDescriptor {
    /// The HGNC ID, e.g. `HGNC:5`
    pub value_id: String,
    /// The approved gene symbol
    pub symbol: String,
    /// Ensembl and NCBI gene IDs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternate_ids: Vec<String>,
}

/// Information about the creation of the phenopacket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaData {
    /// RFC 3339 timestamp
    pub created: String,
    /// Tool or person that created the phenopacket
    pub created_by: String,
    /// Ontologies and databases used
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Version of the phenopacket schema
    pub phenopacket_schema_version: String,
}

/// An ontology or database and its version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Short ID, e.g. `hp`
    pub id: String,
    /// Full name
    pub name: String,
    /// Homepage or download URL
    pub url: String,
    /// Release version
    pub version: String,
    /// Prefix used in CURIEs, e.g. `HP`
    pub namespace_prefix: String,
    /// IRI prefix that turns a CURIE into a URL
    pub iri_prefix: String,
}

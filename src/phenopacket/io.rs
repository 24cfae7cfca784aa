use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::annotations::{
    AssociationProvenance, AssociationType, ClinicalSignificance, DiseaseId, GeneAssociation,
    VariantAssociation,
};
use crate::phenopacket::schema::{
    self, AcmgPathogenicityClassification, Diagnosis, Disease, GeneDescriptor,
    GenomicInterpretation, Individual, Interpretation, InterpretationStatus, OntologyClass,
    Phenopacket, ProgressStatus, TimeElement, VariantInterpretation, VariationDescriptor,
    VcfRecord,
};
use crate::phenopacket::{LabeledTerm, PhenopacketRecord, PhenotypicFeature};
use crate::{HpoTermId, PhenopacketError, PhenopacketResult};

const NCBI_GENE_PREFIX: &str = "NCBIGene:";
const ENSEMBL_GENE_PREFIX: &str = "ENSG";

impl From<&LabeledTerm> for OntologyClass {
    fn from(term: &LabeledTerm) -> Self {
        OntologyClass {
            id: term.id.to_string(),
            label: term.label.clone(),
        }
    }
}

impl TryFrom<&OntologyClass> for LabeledTerm {
    type Error = PhenopacketError;
    fn try_from(class: &OntologyClass) -> PhenopacketResult<Self> {
        Ok(LabeledTerm {
            id: HpoTermId::try_from(class.id.as_str())?,
            label: class.label.clone(),
        })
    }
}

impl From<AssociationType> for InterpretationStatus {
    fn from(association: AssociationType) -> Self {
        match association {
            AssociationType::Mendelian => InterpretationStatus::Causative,
            AssociationType::Polygenic => InterpretationStatus::Contributory,
            AssociationType::Unknown => InterpretationStatus::UnknownStatus,
        }
    }
}

impl From<InterpretationStatus> for AssociationType {
    fn from(status: InterpretationStatus) -> Self {
        match status {
            InterpretationStatus::Causative => AssociationType::Mendelian,
            InterpretationStatus::Contributory => AssociationType::Polygenic,
            _ => AssociationType::Unknown,
        }
    }
}

impl From<ClinicalSignificance> for AcmgPathogenicityClassification {
    fn from(significance: ClinicalSignificance) -> Self {
        match significance {
            ClinicalSignificance::NotProvided => AcmgPathogenicityClassification::NotProvided,
            ClinicalSignificance::Benign => AcmgPathogenicityClassification::Benign,
            ClinicalSignificance::LikelyBenign => AcmgPathogenicityClassification::LikelyBenign,
            ClinicalSignificance::UncertainSignificance => {
                AcmgPathogenicityClassification::UncertainSignificance
            }
            ClinicalSignificance::LikelyPathogenic => {
                AcmgPathogenicityClassification::LikelyPathogenic
            }
            ClinicalSignificance::Pathogenic => AcmgPathogenicityClassification::Pathogenic,
        }
    }
}

impl From<AcmgPathogenicityClassification> for ClinicalSignificance {
    fn from(class: AcmgPathogenicityClassification) -> Self {
        match class {
            AcmgPathogenicityClassification::NotProvided => ClinicalSignificance::NotProvided,
            AcmgPathogenicityClassification::Benign => ClinicalSignificance::Benign,
            AcmgPathogenicityClassification::LikelyBenign => ClinicalSignificance::LikelyBenign,
            AcmgPathogenicityClassification::UncertainSignificance => {
                ClinicalSignificance::UncertainSignificance
            }
            AcmgPathogenicityClassification::LikelyPathogenic => {
                ClinicalSignificance::LikelyPathogenic
            }
            AcmgPathogenicityClassification::Pathogenic => ClinicalSignificance::Pathogenic,
        }
    }
}

fn feature_message(feature: &PhenotypicFeature) -> schema::PhenotypicFeature {
    schema::PhenotypicFeature {
        description: feature.frequency.clone(),
        term: OntologyClass::from(&feature.term),
        excluded: feature.excluded,
        modifiers: feature.modifiers.iter().map(OntologyClass::from).collect(),
        onset: feature.onset.as_ref().map(|onset| TimeElement {
            ontology_class: OntologyClass::from(onset),
        }),
    }
}

fn gene_message(gene: &GeneAssociation, subject: &str) -> GenomicInterpretation {
    let alternate_ids = [gene.ensembl_gene_id.as_ref(), gene.ncbi_gene_id.as_ref()]
        .into_iter()
        .flatten()
        .cloned()
        .collect();
    GenomicInterpretation {
        subject_or_biosample_id: subject.to_string(),
        interpretation_status: gene.provenance.association_type.into(),
        gene: Some(GeneDescriptor {
            value_id: gene.hgnc_id.clone(),
            symbol: gene.symbol.clone(),
            alternate_ids,
        }),
        variant_interpretation: None,
    }
}

fn variant_message(variant: &VariantAssociation, subject: &str) -> GenomicInterpretation {
    let gene_context = match (&variant.hgnc_id, &variant.gene_symbol) {
        (None, None) => None,
        (hgnc_id, symbol) => Some(GeneDescriptor {
            value_id: hgnc_id.clone().unwrap_or_default(),
            symbol: symbol.clone().unwrap_or_default(),
            alternate_ids: Vec::new(),
        }),
    };
    GenomicInterpretation {
        subject_or_biosample_id: subject.to_string(),
        interpretation_status: InterpretationStatus::UnknownStatus,
        gene: None,
        variant_interpretation: Some(VariantInterpretation {
            acmg_pathogenicity_classification: variant.significance.into(),
            variation_descriptor: VariationDescriptor {
                id: variant.id.clone(),
                gene_context,
                vcf_record: Some(VcfRecord {
                    genome_assembly: variant.assembly.clone(),
                    chrom: variant.chromosome.clone(),
                    pos: variant.position,
                    reference: variant.reference.clone(),
                    alt: variant.alternate.clone(),
                }),
            },
        }),
    }
}

impl From<&PhenopacketRecord> for Phenopacket {
    fn from(record: &PhenopacketRecord) -> Self {
        let disease = OntologyClass {
            id: record.disease().to_string(),
            label: record.disease_label().to_string(),
        };
        let interpretations = if record.genes().is_empty() && record.variants().is_empty() {
            Vec::new()
        } else {
            vec![Interpretation {
                id: format!("{}-interpretation", record.disease_label()),
                progress_status: ProgressStatus::UnknownProgress,
                diagnosis: Some(Diagnosis {
                    disease: disease.clone(),
                    genomic_interpretations: record
                        .genes()
                        .iter()
                        .map(|gene| gene_message(gene, record.subject_id()))
                        .chain(
                            record
                                .variants()
                                .iter()
                                .map(|variant| variant_message(variant, record.subject_id())),
                        )
                        .collect(),
                }),
            }]
        };
        Phenopacket {
            id: record.id().to_string(),
            subject: Individual {
                id: record.subject_id().to_string(),
            },
            phenotypic_features: record.features().iter().map(feature_message).collect(),
            interpretations,
            diseases: vec![Disease { term: disease }],
            meta_data: record.meta_data().clone(),
        }
    }
}

fn feature_from_message(
    message: &schema::PhenotypicFeature,
) -> PhenopacketResult<PhenotypicFeature> {
    Ok(PhenotypicFeature {
        term: LabeledTerm::try_from(&message.term)?,
        excluded: message.excluded,
        onset: message
            .onset
            .as_ref()
            .map(|onset| LabeledTerm::try_from(&onset.ontology_class))
            .transpose()?,
        modifiers: message
            .modifiers
            .iter()
            .map(LabeledTerm::try_from)
            .collect::<PhenopacketResult<_>>()?,
        frequency: message.description.clone(),
    })
}

fn gene_from_message(gene: &GeneDescriptor, status: InterpretationStatus) -> GeneAssociation {
    let find = |prefix: &str| {
        gene.alternate_ids
            .iter()
            .find(|id| id.starts_with(prefix))
            .cloned()
    };
    GeneAssociation {
        symbol: gene.symbol.clone(),
        hgnc_id: gene.value_id.clone(),
        ensembl_gene_id: find(ENSEMBL_GENE_PREFIX),
        ncbi_gene_id: find(NCBI_GENE_PREFIX),
        provenance: AssociationProvenance {
            association_type: status.into(),
            source: String::new(),
        },
    }
}

/// Variants without a VCF record can't be placed and are skipped
fn variant_from_message(message: &VariantInterpretation) -> Option<VariantAssociation> {
    let descriptor = &message.variation_descriptor;
    let vcf = descriptor.vcf_record.as_ref()?;
    let non_empty = |value: &str| Some(value.to_string()).filter(|value| !value.is_empty());
    Some(VariantAssociation {
        id: descriptor.id.clone(),
        gene_symbol: descriptor
            .gene_context
            .as_ref()
            .and_then(|gene| non_empty(&gene.symbol)),
        hgnc_id: descriptor
            .gene_context
            .as_ref()
            .and_then(|gene| non_empty(&gene.value_id)),
        significance: message.acmg_pathogenicity_classification.into(),
        assembly: vcf.genome_assembly.clone(),
        chromosome: vcf.chrom.clone(),
        position: vcf.pos,
        reference: vcf.reference.clone(),
        alternate: vcf.alt.clone(),
    })
}

impl TryFrom<Phenopacket> for PhenopacketRecord {
    type Error = PhenopacketError;

    /// Converts a phenopacket message into a record
    ///
    /// # Errors
    ///
    /// [`PhenopacketError::InvalidInput`] if the phenopacket has no disease
    /// or contains invalid term IDs
    fn try_from(message: Phenopacket) -> PhenopacketResult<Self> {
        let Some(disease) = message.diseases.first() else {
            return Err(PhenopacketError::InvalidInput(format!(
                "phenopacket {} has no disease",
                message.id
            )));
        };
        let disease_id = DiseaseId::try_from(disease.term.id.as_str())?;

        let features = message
            .phenotypic_features
            .iter()
            .map(feature_from_message)
            .collect::<PhenopacketResult<Vec<_>>>()?;

        let genomic_interpretations = || {
            message
                .interpretations
                .iter()
                .filter_map(|interpretation| interpretation.diagnosis.as_ref())
                .flat_map(|diagnosis| diagnosis.genomic_interpretations.iter())
        };
        let genes = genomic_interpretations()
            .filter_map(|genomic| {
                genomic
                    .gene
                    .as_ref()
                    .map(|gene| gene_from_message(gene, genomic.interpretation_status))
            })
            .collect();
        let variants = genomic_interpretations()
            .filter_map(|genomic| genomic.variant_interpretation.as_ref())
            .filter_map(variant_from_message)
            .collect();

        let mut record = PhenopacketRecord::new(
            message.id,
            message.subject.id,
            disease_id,
            disease.term.label.clone(),
            features,
            message.meta_data,
        );
        record.replace_genes(genes);
        record.replace_variants(variants);
        Ok(record)
    }
}

/// Writes the record as JSON into `directory`
///
/// The file is named after the phenopacket ID, the path of the
/// created file is returned.
///
/// # Errors
///
/// - [`PhenopacketError::CannotOpenFile`]: the file cannot be created
/// - [`PhenopacketError::Json`]: the record cannot be serialized
pub fn write_phenopacket<P: AsRef<Path>>(
    record: &PhenopacketRecord,
    directory: P,
) -> PhenopacketResult<PathBuf> {
    let path = directory.as_ref().join(record.file_name());
    let file = File::create(&path)
        .map_err(|_| PhenopacketError::CannotOpenFile(path.display().to_string()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &Phenopacket::from(record))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

/// Reads a phenopacket JSON file
///
/// # Errors
///
/// - [`PhenopacketError::CannotOpenFile`]: the file cannot be read
/// - [`PhenopacketError::Json`]: the file is not a valid phenopacket
/// - [`PhenopacketError::InvalidInput`]: the phenopacket has no disease
pub fn read_phenopacket<P: AsRef<Path>>(file: P) -> PhenopacketResult<PhenopacketRecord> {
    let path = file.as_ref();
    let reader = File::open(path)
        .map(BufReader::new)
        .map_err(|_| PhenopacketError::CannotOpenFile(path.display().to_string()))?;
    let message: Phenopacket = serde_json::from_reader(reader)?;
    PhenopacketRecord::try_from(message)
}

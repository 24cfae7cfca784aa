use tracing::debug;

use crate::annotations::{DiseaseRecord, PhenotypeAnnotation};
use crate::ontology::OntologyResolver;
use crate::phenopacket::{
    BuildMode, LabeledTerm, MetaData, PhenopacketRecord, PhenotypicFeature, Resource,
    SCHEMA_VERSION,
};
use crate::sampling::PhenotypeSelection;
use crate::{HpoTermId, PhenopacketError, PhenopacketResult, CREATED_BY};

const UNKNOWN_VERSION: &str = "unknown";

/// Assembles [`PhenopacketRecord`]s
///
/// The builder never reads the system clock, the creation timestamp is
/// provided once for the whole run.
///
/// # Examples
///
/// ```
/// use phenotype2phenopacket::{
///     BuildMode, DiseaseId, DiseaseRecord, FrequencyDescriptor, HpoTermId, Ontology,
///     PhenopacketBuilder, PhenotypeAnnotation,
/// };
///
/// let ontology = Ontology::from_obo("tests/small.obo").unwrap();
/// let builder = PhenopacketBuilder::new(&ontology, "2023-04-05T00:00:00Z", Some("2023-04-05"));
///
/// let mut disease = DiseaseRecord::new(DiseaseId::omim(612567), "Foo syndrome");
/// disease.add_annotation(PhenotypeAnnotation::new(
///     HpoTermId::try_from("HP:0001250").unwrap(),
///     FrequencyDescriptor::try_from("1/2").unwrap(),
/// ));
///
/// let record = builder.build(&disease, BuildMode::Convert).unwrap();
/// assert_eq!(record.id(), "OMIM_612567");
/// assert_eq!(record.features()[0].term.label, "Seizure");
/// assert_eq!(record.features()[0].frequency.as_deref(), Some("1/2"));
/// ```
pub struct PhenopacketBuilder<'a, O: OntologyResolver> {
    resolver: &'a O,
    meta_data: MetaData,
}

impl<'a, O: OntologyResolver> PhenopacketBuilder<'a, O> {
    /// Constructs a new `PhenopacketBuilder`
    ///
    /// - `created`: RFC 3339 timestamp of the run
    /// - `annotation_version`: release of `phenotype.hpoa`
    pub fn new(resolver: &'a O, created: &str, annotation_version: Option<&str>) -> Self {
        let hp_version = resolver
            .version()
            .or(annotation_version)
            .unwrap_or(UNKNOWN_VERSION);
        let omim_version = annotation_version.unwrap_or(UNKNOWN_VERSION);
        Self {
            resolver,
            meta_data: MetaData {
                created: created.to_string(),
                created_by: CREATED_BY.to_string(),
                resources: vec![hp_resource(hp_version), omim_resource(omim_version)],
                phenopacket_schema_version: SCHEMA_VERSION.to_string(),
            },
        }
    }

    /// Builds the phenopacket of a disease
    ///
    /// # Errors
    ///
    /// [`PhenopacketError::EmptyDiseaseAnnotations`] if the disease has no
    /// annotations or the patient has no phenotypes
    pub fn build(
        &self,
        disease: &DiseaseRecord,
        mode: BuildMode<'_>,
    ) -> PhenopacketResult<PhenopacketRecord> {
        if disease.is_empty() {
            return Err(PhenopacketError::EmptyDiseaseAnnotations(
                disease.id().to_string(),
            ));
        }

        let stem = disease.id().file_stem();
        let (id, subject_id, features) = match mode {
            BuildMode::Convert => {
                let features = disease
                    .annotations()
                    .iter()
                    .map(|annotation| self.annotated_feature(annotation))
                    .collect();
                (stem.clone(), format!("{stem}_patient1"), features)
            }
            BuildMode::Create {
                selection,
                patient_index,
            } => {
                if selection.is_empty() {
                    return Err(PhenopacketError::EmptyDiseaseAnnotations(
                        disease.id().to_string(),
                    ));
                }
                let id = format!("{stem}_patient{}", patient_index + 1);
                (id.clone(), id, self.sampled_features(disease, selection))
            }
        };
        debug!("Built phenopacket {id} with {} features", features.len());

        Ok(PhenopacketRecord::new(
            id,
            subject_id,
            *disease.id(),
            disease.name().to_string(),
            features,
            self.meta_data.clone(),
        ))
    }

    fn labeled(&self, id: HpoTermId) -> LabeledTerm {
        LabeledTerm {
            id,
            label: self.resolver.label(id).unwrap_or_default().to_string(),
        }
    }

    fn annotated_feature(&self, annotation: &PhenotypeAnnotation) -> PhenotypicFeature {
        let frequency = annotation.frequency_text();
        PhenotypicFeature {
            term: self.labeled(annotation.term()),
            excluded: annotation.is_excluded(),
            onset: annotation.onset().map(|onset| self.labeled(onset)),
            modifiers: self.modifiers(annotation),
            frequency: Some(frequency.to_string()).filter(|freq| !freq.is_empty()),
        }
    }

    fn sampled_features(
        &self,
        disease: &DiseaseRecord,
        selection: &PhenotypeSelection,
    ) -> Vec<PhenotypicFeature> {
        selection
            .iter()
            .map(|phenotype| {
                let annotation = phenotype.annotation(disease);
                PhenotypicFeature {
                    term: self.labeled(phenotype.term()),
                    excluded: false,
                    onset: annotation
                        .and_then(PhenotypeAnnotation::onset)
                        .map(|onset| self.labeled(onset)),
                    modifiers: annotation
                        .map(|annotation| self.modifiers(annotation))
                        .unwrap_or_default(),
                    frequency: None,
                }
            })
            .collect()
    }

    fn modifiers(&self, annotation: &PhenotypeAnnotation) -> Vec<LabeledTerm> {
        annotation
            .modifiers()
            .iter()
            .map(|modifier| self.labeled(*modifier))
            .collect()
    }
}

fn hp_resource(version: &str) -> Resource {
    Resource {
        id: "hp".to_string(),
        name: "human phenotype ontology".to_string(),
        url: "http://purl.obolibrary.org/obo/hp.owl".to_string(),
        version: version.to_string(),
        namespace_prefix: "HP".to_string(),
        iri_prefix: "http://purl.obolibrary.org/obo/HP_".to_string(),
    }
}

fn omim_resource(version: &str) -> Resource {
    Resource {
        id: "omim".to_string(),
        name: "Online Mendelian Inheritance in Man".to_string(),
        url: "https://www.omim.org".to_string(),
        version: version.to_string(),
        namespace_prefix: "OMIM".to_string(),
        iri_prefix: "https://omim.org/entry/".to_string(),
    }
}

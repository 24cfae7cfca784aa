//! Runs the conversion of diseases into phenopackets
//!
//! The [`Pipeline`] selects diseases from the [`AnnotationIndex`], builds
//! phenopackets, optionally adds genes and hands every finished record
//! to a sink, usually [`write_phenopacket`].
//!
//! Existing phenopacket directories can be annotated with genes
//! ([`add_genes_to_directory`]) or ClinVar variants
//! ([`add_variants_to_directory`]).
//!
//! Data quality issues of single annotations, diseases or genes do not
//! stop the run. They are collected in [`Diagnostics`] and reported in
//! the [`RunSummary`].
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::genes::GeneAnnotator;
use crate::index::{AnnotationIndex, DiseaseSelection};
use crate::ontology::OntologyResolver;
use crate::phenopacket::{
    read_phenopacket, write_phenopacket, BuildMode, PhenopacketBuilder, PhenopacketRecord,
};
use crate::sampling::{PatientSampler, SynthesisConfig};
use crate::variants::VariantAnnotator;
use crate::{PhenopacketError, PhenopacketResult};

/// Recoverable issues that occurred during a run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Diagnostics {
    warnings: Vec<PhenopacketError>,
}

impl Diagnostics {
    /// Constructs new, empty `Diagnostics`
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs and records an issue
    pub fn record(&mut self, warning: PhenopacketError) {
        warn!("{warning}");
        self.warnings.push(warning);
    }

    /// All recorded issues, in order of occurrence
    pub fn warnings(&self) -> &[PhenopacketError] {
        &self.warnings
    }

    /// Returns the number of recorded issues
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Returns `true` if no issue was recorded
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Adds all issues of `other`
    pub fn extend(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }
}

/// Result of a pipeline run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    /// Number of records passed to the sink
    pub records: usize,
    /// Issues that occurred during the run
    pub diagnostics: Diagnostics,
}

/// Records recoverable errors, returns fatal ones
fn recover(err: PhenopacketError, diagnostics: &mut Diagnostics) -> PhenopacketResult<()> {
    if err.is_recoverable() {
        diagnostics.record(err);
        Ok(())
    } else {
        Err(err)
    }
}

/// Converts diseases of an [`AnnotationIndex`] into phenopackets
///
/// # Examples
///
/// ```
/// use phenotype2phenopacket::{
///     AnnotationIndex, Diagnostics, DiseaseSelection, Ontology, Pipeline,
/// };
///
/// let ontology = Ontology::from_obo("tests/small.obo").unwrap();
/// let mut diagnostics = Diagnostics::default();
/// let index = AnnotationIndex::from_hpoa("tests/phenotype.hpoa", &ontology, &mut diagnostics)
///     .unwrap();
///
/// let pipeline = Pipeline::new(&index, &ontology, "2023-04-05T00:00:00Z");
///
/// let mut ids = Vec::new();
/// let summary = pipeline
///     .convert(&DiseaseSelection::First(2), |record| {
///         ids.push(record.id().to_string());
///         Ok(())
///     })
///     .unwrap();
///
/// assert_eq!(summary.records, 2);
/// assert_eq!(ids, vec!["OMIM_100100", "OMIM_200200"]);
/// ```
pub struct Pipeline<'a, O: OntologyResolver> {
    index: &'a AnnotationIndex,
    resolver: &'a O,
    genes: Option<&'a GeneAnnotator>,
    created: String,
}

impl<'a, O: OntologyResolver> Pipeline<'a, O> {
    /// Constructs a new `Pipeline`
    ///
    /// `created` is the RFC 3339 timestamp written into every phenopacket
    pub fn new(index: &'a AnnotationIndex, resolver: &'a O, created: &str) -> Self {
        Self {
            index,
            resolver,
            genes: None,
            created: created.to_string(),
        }
    }

    /// Adds gene associations to every phenopacket
    #[must_use]
    pub fn with_genes(mut self, genes: &'a GeneAnnotator) -> Self {
        self.genes = Some(genes);
        self
    }

    fn builder(&self) -> PhenopacketBuilder<'a, O> {
        PhenopacketBuilder::new(self.resolver, &self.created, self.index.version())
    }

    fn finish<F>(
        &self,
        record: PhenopacketRecord,
        sink: &mut F,
        summary: &mut RunSummary,
    ) -> PhenopacketResult<()>
    where
        F: FnMut(PhenopacketRecord) -> PhenopacketResult<()>,
    {
        let record = match self.genes {
            Some(genes) => genes.annotate(record, &mut summary.diagnostics),
            None => record,
        };
        sink(record)?;
        summary.records += 1;
        Ok(())
    }

    /// Creates one phenopacket with all annotations per disease
    ///
    /// # Errors
    ///
    /// Only fatal errors are returned, e.g. if `sink` fails. Recoverable
    /// issues are part of the [`RunSummary`].
    pub fn convert<F>(
        &self,
        selection: &DiseaseSelection,
        mut sink: F,
    ) -> PhenopacketResult<RunSummary>
    where
        F: FnMut(PhenopacketRecord) -> PhenopacketResult<()>,
    {
        let mut summary = RunSummary::default();
        let builder = self.builder();

        for disease in self.index.select(selection, &mut summary.diagnostics) {
            match builder.build(disease, BuildMode::Convert) {
                Ok(record) => self.finish(record, &mut sink, &mut summary)?,
                Err(err) => recover(err, &mut summary.diagnostics)?,
            }
        }
        info!("Converted {} diseases", summary.records);
        Ok(summary)
    }

    /// Creates `patients_per_disease` synthetic patients per disease
    ///
    /// # Errors
    ///
    /// Only fatal errors are returned, e.g. if `sink` fails. Recoverable
    /// issues are part of the [`RunSummary`].
    pub fn create<F>(
        &self,
        selection: &DiseaseSelection,
        config: &SynthesisConfig,
        mut sink: F,
    ) -> PhenopacketResult<RunSummary>
    where
        F: FnMut(PhenopacketRecord) -> PhenopacketResult<()>,
    {
        let mut summary = RunSummary::default();
        let builder = self.builder();
        let sampler = PatientSampler::new(self.resolver, config);

        let items = self.index.work_items(
            selection,
            config.patients_per_disease,
            &mut summary.diagnostics,
        );
        for (disease, patient_index) in items {
            if disease.is_empty() {
                if patient_index == 0 {
                    summary.diagnostics.record(PhenopacketError::EmptyDiseaseAnnotations(
                        disease.id().to_string(),
                    ));
                }
                continue;
            }
            let phenotypes = match sampler.sample(disease, patient_index) {
                Ok(phenotypes) => phenotypes,
                Err(err) => {
                    recover(err, &mut summary.diagnostics)?;
                    continue;
                }
            };
            let mode = BuildMode::Create {
                selection: &phenotypes,
                patient_index,
            };
            match builder.build(disease, mode) {
                Ok(record) => self.finish(record, &mut sink, &mut summary)?,
                Err(err) => recover(err, &mut summary.diagnostics)?,
            }
        }
        info!("Created {} synthetic patients", summary.records);
        Ok(summary)
    }
}

/// Returns all `*.json` files of a directory, sorted by name
fn json_files(directory: &Path) -> PhenopacketResult<Vec<PathBuf>> {
    let entries = fs::read_dir(directory)
        .map_err(|_| PhenopacketError::CannotOpenFile(directory.display().to_string()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Reads every phenopacket of `input`, annotates it and writes the
/// records that `annotate` keeps to `output`
fn annotate_directory<F>(
    input: &Path,
    output: &Path,
    mut annotate: F,
) -> PhenopacketResult<RunSummary>
where
    F: FnMut(PhenopacketRecord, &mut Diagnostics) -> Option<PhenopacketRecord>,
{
    let mut summary = RunSummary::default();
    for path in json_files(input)? {
        let Some(record) = annotate(read_phenopacket(&path)?, &mut summary.diagnostics) else {
            continue;
        };
        debug!("Writing annotated {}", path.display());
        write_phenopacket(&record, output)?;
        summary.records += 1;
    }
    Ok(summary)
}

/// Adds genes to all phenopackets of a directory
///
/// Every phenopacket of `input` with at least one validated gene is
/// written to `output`. Phenopackets of diseases without genes are not
/// written.
///
/// # Errors
///
/// - [`PhenopacketError::CannotOpenFile`]: a directory or file can't be accessed
/// - [`PhenopacketError::Json`]: a file is not a valid phenopacket
pub fn add_genes_to_directory<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    genes: &GeneAnnotator,
) -> PhenopacketResult<RunSummary> {
    let summary = annotate_directory(input.as_ref(), output.as_ref(), |record, diagnostics| {
        let record = genes.annotate(record, diagnostics);
        if record.genes().is_empty() {
            info!("No gene associations for {}, skipping", record.disease());
            return None;
        }
        debug!("Adding {} genes to {}", record.genes().len(), record.id());
        Some(record)
    })?;
    info!("Added genes to {} phenopackets", summary.records);
    Ok(summary)
}

/// Adds ClinVar variants to all phenopackets of a directory
///
/// Every phenopacket of `input` with at least one variant that passed
/// the filter of the [`VariantAnnotator`] is written to `output`.
/// Phenopackets of diseases without variants are not written.
///
/// # Errors
///
/// - [`PhenopacketError::CannotOpenFile`]: a directory or file can't be accessed
/// - [`PhenopacketError::Json`]: a file is not a valid phenopacket
pub fn add_variants_to_directory<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    variants: &VariantAnnotator,
) -> PhenopacketResult<RunSummary> {
    let summary = annotate_directory(input.as_ref(), output.as_ref(), |record, diagnostics| {
        let record = variants.annotate(record, diagnostics);
        if record.variants().is_empty() {
            info!("No variants for {}, skipping", record.disease());
            return None;
        }
        debug!("Adding {} variants to {}", record.variants().len(), record.id());
        Some(record)
    })?;
    info!("Added variants to {} phenopackets", summary.records);
    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::annotations::DiseaseId;
    use crate::ontology::Ontology;
    use crate::sampling::NoiseConfig;

    fn setup() -> (Ontology, AnnotationIndex) {
        let ontology = Ontology::from_obo("tests/small.obo").expect("small.obo is valid");
        let mut diagnostics = Diagnostics::default();
        let index = AnnotationIndex::from_hpoa("tests/phenotype.hpoa", &ontology, &mut diagnostics)
            .expect("phenotype.hpoa is valid");
        (ontology, index)
    }

    fn collect<O: OntologyResolver>(
        pipeline: &Pipeline<'_, O>,
        selection: &DiseaseSelection,
        config: Option<&SynthesisConfig>,
    ) -> (Vec<PhenopacketRecord>, RunSummary) {
        let mut records = Vec::new();
        let sink = |record: PhenopacketRecord| -> PhenopacketResult<()> {
            records.push(record);
            Ok(())
        };
        let summary = match config {
            Some(config) => pipeline.create(selection, config, sink),
            None => pipeline.convert(selection, sink),
        }
        .expect("no fatal errors");
        (records, summary)
    }

    #[test]
    fn convert_all() {
        let (ontology, index) = setup();
        let pipeline = Pipeline::new(&index, &ontology, "2023-04-05T00:00:00Z");
        let (records, summary) = collect(&pipeline, &DiseaseSelection::All, None);

        // OMIM:400400 has no usable annotations
        assert_eq!(records.len(), 3);
        assert_eq!(summary.records, 3);
        assert_eq!(
            summary.diagnostics.warnings(),
            &[PhenopacketError::EmptyDiseaseAnnotations(
                "OMIM:400400".to_string()
            )]
        );
        assert_eq!(records[0].features().len(), 4);
    }

    #[test]
    fn convert_with_cap() {
        let (ontology, index) = setup();
        let pipeline = Pipeline::new(&index, &ontology, "2023-04-05T00:00:00Z");
        let (records, _) = collect(&pipeline, &DiseaseSelection::First(2), None);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn unknown_ids() {
        let (ontology, index) = setup();
        let pipeline = Pipeline::new(&index, &ontology, "2023-04-05T00:00:00Z");
        let selection = DiseaseSelection::Ids(vec![DiseaseId::omim(1), DiseaseId::omim(2)]);
        let (records, summary) = collect(&pipeline, &selection, None);
        assert!(records.is_empty());
        assert_eq!(summary.diagnostics.len(), 2);
    }

    #[test]
    fn create_patients() {
        let (ontology, index) = setup();
        let pipeline = Pipeline::new(&index, &ontology, "2023-04-05T00:00:00Z");
        let config = SynthesisConfig {
            seed: 1,
            patients_per_disease: 3,
            noise: NoiseConfig::default(),
        };
        let (records, summary) = collect(&pipeline, &DiseaseSelection::All, Some(&config));

        assert_eq!(records.len(), 9);
        assert_eq!(records[0].id(), "OMIM_100100_patient1");
        assert_eq!(records[2].id(), "OMIM_100100_patient3");
        assert_eq!(records[3].id(), "OMIM_200200_patient1");
        assert!(records.iter().all(|record| !record.features().is_empty()));
        assert!(records
            .iter()
            .flat_map(|record| record.features())
            .all(|feature| !feature.excluded && feature.frequency.is_none()));
        // the empty disease is reported once
        assert_eq!(summary.diagnostics.len(), 1);
    }

    #[test]
    fn create_is_reproducible() {
        let (ontology, index) = setup();
        let pipeline = Pipeline::new(&index, &ontology, "2023-04-05T00:00:00Z");
        let config = SynthesisConfig {
            seed: 7,
            patients_per_disease: 5,
            noise: NoiseConfig::default(),
        };
        let (first, _) = collect(&pipeline, &DiseaseSelection::All, Some(&config));
        let (second, _) = collect(
            &pipeline,
            &DiseaseSelection::Ids(vec![DiseaseId::omim(300300), DiseaseId::omim(100100)]),
            Some(&config),
        );
        assert_eq!(first[..5], second[5..]);
        assert_eq!(first[10..15], second[..5]);
    }

    #[test]
    fn sink_errors_are_fatal() {
        let (ontology, index) = setup();
        let pipeline = Pipeline::new(&index, &ontology, "2023-04-05T00:00:00Z");
        let res = pipeline.convert(&DiseaseSelection::All, |_| {
            Err(PhenopacketError::Io("disk full".to_string()))
        });
        assert_eq!(res, Err(PhenopacketError::Io("disk full".to_string())));
    }

    #[test]
    fn convert_with_genes() {
        let (ontology, index) = setup();
        let genes =
            GeneAnnotator::from_files("tests/genes_to_disease.txt", "tests/hgnc_complete_set.txt")
                .expect("fixtures are valid");
        let pipeline = Pipeline::new(&index, &ontology, "2023-04-05T00:00:00Z").with_genes(&genes);
        let (records, summary) = collect(&pipeline, &DiseaseSelection::First(3), None);

        assert_eq!(records[0].genes().len(), 2);
        assert_eq!(records[1].genes().len(), 1);
        assert!(records[2].genes().is_empty());
        assert_eq!(summary.diagnostics.len(), 1);
    }

    #[test]
    fn add_genes_to_files() {
        let (ontology, index) = setup();
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let pipeline = Pipeline::new(&index, &ontology, "2023-04-05T00:00:00Z");
        pipeline
            .convert(&DiseaseSelection::All, |record| {
                write_phenopacket(&record, input.path()).map(|_| ())
            })
            .unwrap();

        let genes =
            GeneAnnotator::from_files("tests/genes_to_disease.txt", "tests/hgnc_complete_set.txt")
                .unwrap();
        let summary = add_genes_to_directory(input.path(), output.path(), &genes).unwrap();
        assert_eq!(summary.records, 2);

        let record = read_phenopacket(output.path().join("OMIM_200200.json")).unwrap();
        assert_eq!(record.genes()[0].symbol, "GHI3");
        assert!(!output.path().join("OMIM_300300.json").exists());
    }

    #[test]
    fn add_variants_to_files() {
        use crate::annotations::{ClinicalSignificance, GenomeAssembly, VariantFilter};

        let (ontology, index) = setup();
        let input = tempfile::tempdir().unwrap();
        let with_genes = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let pipeline = Pipeline::new(&index, &ontology, "2023-04-05T00:00:00Z");
        pipeline
            .convert(&DiseaseSelection::All, |record| {
                write_phenopacket(&record, input.path()).map(|_| ())
            })
            .unwrap();
        let genes =
            GeneAnnotator::from_files("tests/genes_to_disease.txt", "tests/hgnc_complete_set.txt")
                .unwrap();
        add_genes_to_directory(input.path(), with_genes.path(), &genes).unwrap();

        let filter = VariantFilter::new(ClinicalSignificance::Pathogenic, GenomeAssembly::GRCh38);
        let variants = VariantAnnotator::from_file("tests/variant_summary.txt", &filter).unwrap();
        let summary =
            add_variants_to_directory(with_genes.path(), output.path(), &variants).unwrap();
        assert_eq!(summary.records, 2);

        let record = read_phenopacket(output.path().join("OMIM_100100.json")).unwrap();
        assert_eq!(record.genes().len(), 2);
        // the likely pathogenic variant 102 is below the filter
        let ids: Vec<&str> = record.variants().iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["clinvar:101"]);
        assert!(record
            .meta_data()
            .resources
            .iter()
            .any(|resource| resource.id == "clinvar"));
        assert!(!output.path().join("OMIM_300300.json").exists());
    }
}

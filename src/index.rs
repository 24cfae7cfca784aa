//! The [`AnnotationIndex`] holds all diseases and their phenotype annotations
use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, info, trace};

use crate::annotations::{
    DiseaseId, DiseaseNamespace, DiseaseRecord, FrequencyDescriptor, PhenotypeAnnotation,
};
use crate::ontology::OntologyResolver;
use crate::parser::phenotype_hpoa::{self, HpoaRow};
use crate::pipeline::Diagnostics;
use crate::sampling::FrequencySampler;
use crate::{HpoTermId, PhenopacketError, PhenopacketResult};

/// The `aspect` of phenotypic abnormality annotations
const PHENOTYPE_ASPECT: &str = "P";

/// Which diseases should be processed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DiseaseSelection {
    /// All diseases, in file order
    #[default]
    All,
    /// The first `k` diseases in file order, `0` means all
    First(usize),
    /// The listed diseases, in the order of the list
    ///
    /// IDs that are listed more than once are only used once.
    Ids(Vec<DiseaseId>),
}

/// All diseases of `phenotype.hpoa` with validated annotations
///
/// Diseases keep the order in which they appear in the source file.
/// Every annotation of the index has a resolvable phenotype term and
/// a valid frequency.
///
/// # Examples
///
/// ```
/// use phenotype2phenopacket::{AnnotationIndex, Diagnostics, DiseaseId, Ontology};
///
/// let ontology = Ontology::from_obo("tests/small.obo").unwrap();
/// let mut diagnostics = Diagnostics::default();
/// let index = AnnotationIndex::from_hpoa("tests/phenotype.hpoa", &ontology, &mut diagnostics)
///     .unwrap();
///
/// let disease = index.get(&DiseaseId::omim(100100)).unwrap();
/// assert_eq!(disease.name(), "Alpha syndrome");
/// ```
#[derive(Debug, Default, Clone)]
pub struct AnnotationIndex {
    diseases: Vec<DiseaseRecord>,
    positions: HashMap<DiseaseId, usize>,
    version: Option<String>,
}

impl AnnotationIndex {
    /// Loads all OMIM diseases from `phenotype.hpoa`
    ///
    /// Annotations that can't be used are skipped and recorded in `diagnostics`
    ///
    /// # Errors
    ///
    /// - [`PhenopacketError::CannotOpenFile`]: the file cannot be read
    /// - [`PhenopacketError::InvalidInput`]: a row is malformed
    pub fn from_hpoa<P: AsRef<Path>, O: OntologyResolver>(
        file: P,
        resolver: &O,
        diagnostics: &mut Diagnostics,
    ) -> PhenopacketResult<Self> {
        Self::from_hpoa_with_namespaces(file, resolver, &[DiseaseNamespace::Omim], diagnostics)
    }

    /// Loads all diseases of the given namespaces from `phenotype.hpoa`
    ///
    /// # Errors
    ///
    /// - [`PhenopacketError::CannotOpenFile`]: the file cannot be read
    /// - [`PhenopacketError::InvalidInput`]: a row is malformed
    pub fn from_hpoa_with_namespaces<P: AsRef<Path>, O: OntologyResolver>(
        file: P,
        resolver: &O,
        namespaces: &[DiseaseNamespace],
        diagnostics: &mut Diagnostics,
    ) -> PhenopacketResult<Self> {
        let mut index = AnnotationIndex::default();
        let version = phenotype_hpoa::parse(file, |row| {
            if namespaces.contains(&row.disease.namespace()) {
                index.add_row(row, resolver, diagnostics);
            }
            Ok(())
        })?;
        index.version = version;
        info!(
            "Loaded {} diseases from phenotype annotations",
            index.diseases.len()
        );
        Ok(index)
    }

    fn add_row<O: OntologyResolver>(
        &mut self,
        row: HpoaRow<'_>,
        resolver: &O,
        diagnostics: &mut Diagnostics,
    ) {
        if row.aspect != PHENOTYPE_ASPECT {
            trace!("Ignoring {} annotation {} of {}", row.aspect, row.hpo_id, row.disease);
            return;
        }
        let disease_id = row.disease;
        let disease = self.entry(disease_id, row.disease_name);

        let unresolved = |term: &str| PhenopacketError::UnresolvedPhenotypeTerm {
            disease: disease_id.to_string(),
            term: term.to_string(),
        };
        let resolve = |term: &str| {
            HpoTermId::try_from(term)
                .ok()
                .and_then(|id| resolver.resolve(id))
        };

        let Some(term) = resolve(row.hpo_id) else {
            diagnostics.record(unresolved(row.hpo_id));
            return;
        };

        let frequency = match FrequencyDescriptor::try_from(row.frequency).and_then(|freq| {
            FrequencySampler::resolve_probability(&freq)?;
            Ok(freq)
        }) {
            Ok(freq) => freq,
            Err(err) => {
                debug!("Skipping {} of {}", row.hpo_id, disease_id);
                diagnostics.record(err);
                return;
            }
        };

        let mut annotation =
            PhenotypeAnnotation::new(term, frequency).with_frequency_text(row.frequency);
        if let Some(onset) = row.onset {
            match resolve(onset) {
                Some(id) => annotation = annotation.with_onset(id),
                None => diagnostics.record(unresolved(onset)),
            }
        }
        let mut modifiers = Vec::with_capacity(row.modifiers.len());
        for modifier in row.modifiers {
            match resolve(modifier) {
                Some(id) => modifiers.push(id),
                None => diagnostics.record(unresolved(modifier)),
            }
        }
        annotation = annotation.with_modifiers(modifiers);
        if row.excluded {
            annotation = annotation.excluded();
        }
        disease.add_annotation(annotation);
    }

    fn entry(&mut self, id: DiseaseId, name: &str) -> &mut DiseaseRecord {
        let idx = match self.positions.get(&id) {
            Some(idx) => *idx,
            None => {
                self.diseases.push(DiseaseRecord::new(id, name));
                self.positions.insert(id, self.diseases.len() - 1);
                self.diseases.len() - 1
            }
        };
        &mut self.diseases[idx]
    }

    /// Adds a disease to the end of the index
    ///
    /// An existing disease with the same ID is replaced in place.
    pub fn insert(&mut self, disease: DiseaseRecord) {
        match self.positions.get(disease.id()) {
            Some(idx) => self.diseases[*idx] = disease,
            None => {
                self.positions.insert(*disease.id(), self.diseases.len());
                self.diseases.push(disease);
            }
        }
    }

    /// Returns the disease with the given ID
    pub fn get(&self, id: &DiseaseId) -> Option<&DiseaseRecord> {
        self.positions.get(id).map(|idx| &self.diseases[*idx])
    }

    /// Returns an iterator of all diseases, in file order
    pub fn iter(&self) -> std::slice::Iter<'_, DiseaseRecord> {
        self.diseases.iter()
    }

    /// The number of diseases
    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    /// Returns `true` if the index does not contain any diseases
    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }

    /// The release version of `phenotype.hpoa`, e.g. `2023-04-05`
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the diseases of the selection
    ///
    /// Requested IDs that are not part of the index are recorded as
    /// [`PhenopacketError::DiseaseNotFound`].
    pub fn select(
        &self,
        selection: &DiseaseSelection,
        diagnostics: &mut Diagnostics,
    ) -> Vec<&DiseaseRecord> {
        match selection {
            DiseaseSelection::All | DiseaseSelection::First(0) => self.diseases.iter().collect(),
            DiseaseSelection::First(k) => self.diseases.iter().take(*k).collect(),
            DiseaseSelection::Ids(ids) => {
                let mut seen = HashSet::with_capacity(ids.len());
                ids.iter()
                    .filter(|id| {
                        let first = seen.insert(**id);
                        if !first {
                            debug!("Ignoring duplicate disease {id}");
                        }
                        first
                    })
                    .filter_map(|id| {
                        let disease = self.get(id);
                        if disease.is_none() {
                            diagnostics.record(PhenopacketError::DiseaseNotFound(id.to_string()));
                        }
                        disease
                    })
                    .collect()
            }
        }
    }

    /// Returns all `(disease, patient_index)` pairs of the selection
    ///
    /// All patients of a disease are yielded before the next disease.
    pub fn work_items(
        &self,
        selection: &DiseaseSelection,
        patients: usize,
        diagnostics: &mut Diagnostics,
    ) -> WorkItems<'_> {
        WorkItems::new(self.select(selection, diagnostics), patients)
    }
}

impl<'a> IntoIterator for &'a AnnotationIndex {
    type Item = &'a DiseaseRecord;
    type IntoIter = std::slice::Iter<'a, DiseaseRecord>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Returns the `(disease, patient_index)` pairs of a single disease
pub fn work_items_for(disease: &DiseaseRecord, patients: usize) -> WorkItems<'_> {
    WorkItems::new(vec![disease], patients)
}

/// Iterator of `(disease, patient_index)` pairs
///
/// The pairs are created on demand.
pub struct WorkItems<'a> {
    diseases: std::vec::IntoIter<&'a DiseaseRecord>,
    current: Option<&'a DiseaseRecord>,
    patient: usize,
    patients: usize,
}

impl<'a> WorkItems<'a> {
    fn new(diseases: Vec<&'a DiseaseRecord>, patients: usize) -> Self {
        let mut diseases = diseases.into_iter();
        let current = if patients == 0 {
            None
        } else {
            diseases.next()
        };
        Self {
            diseases,
            current,
            patient: 0,
            patients,
        }
    }
}

impl<'a> Iterator for WorkItems<'a> {
    type Item = (&'a DiseaseRecord, usize);
    fn next(&mut self) -> Option<Self::Item> {
        let disease = self.current?;
        let item = (disease, self.patient);
        self.patient += 1;
        if self.patient == self.patients {
            self.patient = 0;
            self.current = self.diseases.next();
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.current.is_none() {
            return (0, Some(0));
        }
        let remaining = self.diseases.len() * self.patients + (self.patients - self.patient);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for WorkItems<'_> {}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ontology::Ontology;

    fn index() -> (AnnotationIndex, Diagnostics) {
        let ontology = Ontology::from_obo("tests/small.obo").expect("small.obo is valid");
        let mut diagnostics = Diagnostics::default();
        let index = AnnotationIndex::from_hpoa("tests/phenotype.hpoa", &ontology, &mut diagnostics)
            .expect("phenotype.hpoa is valid");
        (index, diagnostics)
    }

    fn ids(diseases: &[&DiseaseRecord]) -> Vec<DiseaseId> {
        diseases.iter().map(|d| *d.id()).collect()
    }

    #[test]
    fn file_order() {
        let (index, _) = index();
        assert_eq!(index.version(), Some("2023-04-05"));
        let order: Vec<DiseaseId> = index.iter().map(|d| *d.id()).collect();
        assert_eq!(
            order,
            vec![
                DiseaseId::omim(100100),
                DiseaseId::omim(200200),
                DiseaseId::omim(300300),
                DiseaseId::omim(400400)
            ]
        );
    }

    #[test]
    fn only_phenotype_aspect() {
        let (index, _) = index();
        let disease = index.get(&DiseaseId::omim(100100)).unwrap();
        // the inheritance row is ignored
        assert!(!disease
            .annotations()
            .iter()
            .any(|anno| anno.term() == HpoTermId::from(7u32)));
        assert_eq!(disease.annotations().len(), 4);
    }

    #[test]
    fn annotation_details() {
        let (index, _) = index();
        let disease = index.get(&DiseaseId::omim(100100)).unwrap();
        let seizure = &disease.annotations()[0];
        assert_eq!(seizure.term(), HpoTermId::from(1250u32));
        assert_eq!(seizure.onset(), Some(HpoTermId::from(3593u32)));
        assert_eq!(
            seizure.frequency(),
            &FrequencyDescriptor::Qualitative(40282u32.into())
        );
        assert_eq!(seizure.modifiers(), &[HpoTermId::from(12828u32)]);

        let excluded = &disease.annotations()[3];
        assert_eq!(excluded.term(), HpoTermId::from(505u32));
        assert!(excluded.is_excluded());
    }

    #[test]
    fn obsolete_and_alt_ids_resolve() {
        let (index, _) = index();
        let disease = index.get(&DiseaseId::omim(200200)).unwrap();
        let terms: Vec<HpoTermId> = disease.annotations().iter().map(|a| a.term()).collect();
        // HP:0002279 is an alt_id of HP:0001250, HP:0000030 is replaced by HP:0000252
        assert_eq!(
            terms,
            vec![
                HpoTermId::from(1263u32),
                HpoTermId::from(505u32),
                HpoTermId::from(1250u32),
                HpoTermId::from(252u32)
            ]
        );
    }

    #[test]
    fn invalid_rows_are_skipped() {
        let (index, diagnostics) = index();
        let disease = index.get(&DiseaseId::omim(300300)).unwrap();
        assert_eq!(disease.annotations().len(), 1);
        assert_eq!(disease.annotations()[0].term(), HpoTermId::from(1250u32));

        assert!(diagnostics
            .warnings()
            .contains(&PhenopacketError::MalformedFrequency("foo".to_string())));
        assert!(diagnostics
            .warnings()
            .contains(&PhenopacketError::UnresolvedPhenotypeTerm {
                disease: "OMIM:300300".to_string(),
                term: "HP:9999999".to_string()
            }));
    }

    #[test]
    fn unresolved_onset_keeps_annotation() {
        let (index, diagnostics) = index();
        let disease = index.get(&DiseaseId::omim(300300)).unwrap();
        assert!(disease.annotations()[0].onset().is_none());
        assert!(diagnostics
            .warnings()
            .contains(&PhenopacketError::UnresolvedPhenotypeTerm {
                disease: "OMIM:300300".to_string(),
                term: "HP:8888888".to_string()
            }));
    }

    #[test]
    fn empty_disease_is_kept() {
        let (index, _) = index();
        let disease = index.get(&DiseaseId::omim(400400)).unwrap();
        assert!(disease.is_empty());
    }

    #[test]
    fn orpha_only_on_request() {
        let (index, _) = index();
        assert!(index.get(&"ORPHA:500500".try_into().unwrap()).is_none());

        let ontology = Ontology::from_obo("tests/small.obo").unwrap();
        let mut diagnostics = Diagnostics::default();
        let index = AnnotationIndex::from_hpoa_with_namespaces(
            "tests/phenotype.hpoa",
            &ontology,
            &[DiseaseNamespace::Orpha],
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.get(&"ORPHA:500500".try_into().unwrap()).is_some());
    }

    #[test]
    fn select_diseases() {
        let (index, _) = index();
        let mut diagnostics = Diagnostics::default();

        assert_eq!(index.select(&DiseaseSelection::All, &mut diagnostics).len(), 4);
        assert_eq!(index.select(&DiseaseSelection::First(0), &mut diagnostics).len(), 4);
        assert_eq!(
            ids(&index.select(&DiseaseSelection::First(2), &mut diagnostics)),
            vec![DiseaseId::omim(100100), DiseaseId::omim(200200)]
        );
        assert_eq!(index.select(&DiseaseSelection::First(10), &mut diagnostics).len(), 4);
        assert!(diagnostics.is_empty());

        let selection = DiseaseSelection::Ids(vec![
            DiseaseId::omim(200200),
            DiseaseId::omim(999999),
            DiseaseId::omim(100100),
        ]);
        assert_eq!(
            ids(&index.select(&selection, &mut diagnostics)),
            vec![DiseaseId::omim(200200), DiseaseId::omim(100100)]
        );
        assert_eq!(
            diagnostics.warnings(),
            &[PhenopacketError::DiseaseNotFound("OMIM:999999".to_string())]
        );
    }

    #[test]
    fn duplicate_ids_are_selected_once() {
        let (index, _) = index();
        let mut diagnostics = Diagnostics::default();
        let selection = DiseaseSelection::Ids(vec![
            DiseaseId::omim(200200),
            DiseaseId::omim(100100),
            DiseaseId::omim(200200),
            DiseaseId::omim(999999),
            DiseaseId::omim(999999),
        ]);
        assert_eq!(
            ids(&index.select(&selection, &mut diagnostics)),
            vec![DiseaseId::omim(200200), DiseaseId::omim(100100)]
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(index.work_items(&selection, 2, &mut diagnostics).len(), 4);
    }

    #[test]
    fn frequency_text_is_verbatim() {
        let ontology = Ontology::from_obo("tests/small.obo").unwrap();
        let mut index = AnnotationIndex::default();
        let mut diagnostics = Diagnostics::default();
        for (hpo_id, frequency) in [("HP:0001250", "0.07"), ("HP:0000252", " 30%-50% ")] {
            let row = HpoaRow {
                disease: DiseaseId::omim(612567),
                disease_name: "Foo syndrome",
                excluded: false,
                hpo_id,
                onset: None,
                frequency,
                modifiers: vec![],
                aspect: "P",
            };
            index.add_row(row, &ontology, &mut diagnostics);
        }
        assert!(diagnostics.is_empty());

        let disease = index.get(&DiseaseId::omim(612567)).unwrap();
        let texts: Vec<&str> = disease
            .annotations()
            .iter()
            .map(PhenotypeAnnotation::frequency_text)
            .collect();
        assert_eq!(texts, vec!["0.07", "30%-50%"]);
        assert_eq!(
            disease.annotations()[1].frequency(),
            &FrequencyDescriptor::PercentageRange {
                low: 30.0,
                high: 50.0
            }
        );
    }

    #[test]
    fn work_item_order() {
        let (index, _) = index();
        let mut diagnostics = Diagnostics::default();
        let items: Vec<(DiseaseId, usize)> = index
            .work_items(&DiseaseSelection::First(2), 3, &mut diagnostics)
            .map(|(disease, patient)| (*disease.id(), patient))
            .collect();
        assert_eq!(
            items,
            vec![
                (DiseaseId::omim(100100), 0),
                (DiseaseId::omim(100100), 1),
                (DiseaseId::omim(100100), 2),
                (DiseaseId::omim(200200), 0),
                (DiseaseId::omim(200200), 1),
                (DiseaseId::omim(200200), 2),
            ]
        );
    }

    #[test]
    fn work_items_size() {
        let (index, _) = index();
        let mut diagnostics = Diagnostics::default();
        let mut items = index.work_items(&DiseaseSelection::All, 2, &mut diagnostics);
        assert_eq!(items.len(), 8);
        items.next();
        assert_eq!(items.len(), 7);

        assert_eq!(
            index
                .work_items(&DiseaseSelection::All, 0, &mut diagnostics)
                .count(),
            0
        );
    }

    #[test]
    fn work_items_of_single_disease() {
        let (index, _) = index();
        let disease = index.get(&DiseaseId::omim(200200)).unwrap();
        let patients: Vec<usize> = work_items_for(disease, 4).map(|(_, idx)| idx).collect();
        assert_eq!(patients, vec![0, 1, 2, 3]);
    }
}

//! The HPO hierarchy, loaded from `hp.obo`
use core::fmt::Debug;
use std::collections::{HashMap, VecDeque};
use std::path::Path;

use tracing::debug;

use crate::parser;
use crate::term::{TermGroup, PHENOTYPIC_ABNORMALITY, ROOT};
use crate::{HpoTermId, PhenopacketError, PhenopacketResult};

mod termarena;
pub use termarena::OntologyTerm;
use termarena::Arena;

/// Obsolete terms can be replaced by other obsolete terms. This limits
/// how many replacements are followed.
const MAX_REPLACEMENT_CHAIN: usize = 8;

/// Answers the ontology questions that phenopacket creation needs
///
/// The sampling and building steps never access the [`Ontology`]
/// directly but only through this trait, so that tests can provide
/// a tiny hand-written hierarchy.
pub trait OntologyResolver {
    /// Returns the primary ID of a term
    ///
    /// Alternative IDs and obsolete terms with a replacement resolve
    /// to the primary term. Returns `None` if the term is unknown.
    fn resolve(&self, id: HpoTermId) -> Option<HpoTermId>;

    /// Returns the name of a term
    fn label(&self, id: HpoTermId) -> Option<&str>;

    /// Returns all ancestors of the term that are at most `max_levels`
    /// `is_a` steps above it
    ///
    /// The term itself and the very general terms `HP:0000001 | All` and
    /// `HP:0000118 | Phenotypic abnormality` are never part of the result.
    fn ancestors(&self, id: HpoTermId, max_levels: usize) -> TermGroup;

    /// All terms that can be used as random phenotypes, i.e. all
    /// descendants of `HP:0000118 | Phenotypic abnormality`
    fn phenotype_pool(&self) -> &[HpoTermId];

    /// The release version of the ontology, if known
    fn version(&self) -> Option<&str> {
        None
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// `Ontology` holds the HPO terms and their hierarchy
///
/// It is loaded from `hp.obo` and implements [`OntologyResolver`].
///
/// # Examples
///
/// ```
/// use phenotype2phenopacket::{HpoTermId, Ontology, OntologyResolver};
///
/// let ontology = Ontology::from_obo("tests/small.obo").unwrap();
///
/// let seizure = HpoTermId::try_from("HP:0001250").unwrap();
/// assert_eq!(ontology.label(seizure), Some("Seizure"));
///
/// // `HP:0002279` is an alternative ID of `Seizure`
/// let alt_id = HpoTermId::try_from("HP:0002279").unwrap();
/// assert_eq!(ontology.resolve(alt_id), Some(seizure));
///
/// let absent_term = HpoTermId::try_from("HP:9999999").unwrap();
/// assert!(ontology.resolve(absent_term).is_none());
/// ```
///
/// # Layout
///
/// Terms are connected to their parents in an `is_a` relationship.
/// Only the phenotype branch is used for sampling, the other
/// sub-ontologies provide frequency, onset and modifier terms.
///
/// ```mermaid
/// graph TD
///     ALL["HP:0000001 | All"]
///     PA["HP:0000118 | Phenotypic abnormality"]
///     FREQ["HP:0040279 | Frequency"]
///     ONSET["HP:0003674 | Onset"]
///     MOD["HP:0012823 | Clinical modifier"]
///     PA --> ALL
///     FREQ --> ALL
///     ONSET --> ALL
///     MOD --> ALL
/// ```
#[derive(Default)]
pub struct Ontology {
    terms: Arena,
    alt_ids: HashMap<HpoTermId, HpoTermId>,
    version: Option<String>,
    pool: TermGroup,
}

impl Debug for Ontology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Ontology with {} terms", self.terms.len())
    }
}

/// Public API of the Ontology
impl Ontology {
    /// Loads the ontology from an `hp.obo` file
    ///
    /// # Errors
    ///
    /// - [`PhenopacketError::CannotOpenFile`]: the file cannot be read
    /// - [`PhenopacketError::InvalidInput`]: a term stanza is malformed
    pub fn from_obo<P: AsRef<Path>>(filename: P) -> PhenopacketResult<Self> {
        let mut ontology = Ontology::default();
        parser::hp_obo::read_obo_file(filename, &mut ontology)?;
        Ok(ontology)
    }

    /// Returns the number of terms, including obsolete ones
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if the ontology does not contain any terms
    pub fn is_empty(&self) -> bool {
        self.terms.len() == 0
    }

    /// Returns the term with the given ID
    ///
    /// This does not follow alternative IDs, use [`OntologyResolver::resolve`]
    /// first if needed.
    pub fn term(&self, id: HpoTermId) -> Option<&OntologyTerm> {
        self.terms.get(id)
    }
}

/// Methods to build the ontology
///
/// They are used by the `hp.obo` parser and should rarely be needed
/// elsewhere.
impl Ontology {
    /// Creates and inserts a new term
    ///
    /// This method does not link the term to its parents
    ///
    /// # Examples
    ///
    /// ```
    /// use phenotype2phenopacket::Ontology;
    ///
    /// let mut ontology = Ontology::default();
    /// ontology.insert_term("FooBar".into(), 1u32);
    ///
    /// assert_eq!(ontology.len(), 1);
    /// ```
    pub fn insert_term<I: Into<HpoTermId>>(&mut self, name: String, id: I) {
        self.terms.insert(OntologyTerm::new(id.into(), name));
    }

    /// Adds a connection from a term to its parent
    ///
    /// # Errors
    ///
    /// [`PhenopacketError::InvalidInput`] if either term is not present
    pub fn add_parent<I: Into<HpoTermId>, J: Into<HpoTermId>>(
        &mut self,
        parent_id: I,
        child_id: J,
    ) -> PhenopacketResult<()> {
        let parent_id = parent_id.into();
        let child_id = child_id.into();
        if !self.terms.contains(child_id) {
            return Err(PhenopacketError::InvalidInput(format!(
                "unknown term {child_id}"
            )));
        }
        let Some(parent) = self.terms.get_mut(parent_id) else {
            return Err(PhenopacketError::InvalidInput(format!(
                "unknown parent term {parent_id} of {child_id}"
            )));
        };
        parent.add_child(child_id);
        if let Some(child) = self.terms.get_mut(child_id) {
            child.add_parent(parent_id);
        }
        Ok(())
    }

    /// Registers an alternative ID for a term
    pub fn add_alt_id<I: Into<HpoTermId>, J: Into<HpoTermId>>(&mut self, alt_id: I, primary: J) {
        self.alt_ids.insert(alt_id.into(), primary.into());
    }

    /// Marks a term as obsolete, optionally with its replacement
    ///
    /// # Errors
    ///
    /// [`PhenopacketError::InvalidInput`] if the term is not present
    pub fn set_obsolete<I: Into<HpoTermId>>(
        &mut self,
        id: I,
        replaced_by: Option<HpoTermId>,
    ) -> PhenopacketResult<()> {
        let id = id.into();
        self.terms
            .get_mut(id)
            .ok_or_else(|| PhenopacketError::InvalidInput(format!("unknown term {id}")))?
            .set_obsolete(replaced_by);
        Ok(())
    }

    /// Sets the release version, e.g. `hp/releases/2023-04-05`
    pub fn set_version(&mut self, version: &str) {
        self.version = Some(version.to_string());
    }

    /// Collects the phenotype pool
    ///
    /// This method must be called once after all terms and parents
    /// are added.
    pub fn create_cache(&mut self) {
        let mut pool = TermGroup::new();
        let mut queue: VecDeque<HpoTermId> = VecDeque::new();
        queue.push_back(PHENOTYPIC_ABNORMALITY);

        while let Some(id) = queue.pop_front() {
            let Some(term) = self.terms.get(id) else {
                continue;
            };
            for child in term.children() {
                let is_active = self.terms.get(child).map_or(false, |t| !t.is_obsolete());
                if is_active && pool.insert(child) {
                    queue.push_back(child);
                }
            }
        }
        debug!("Phenotype pool contains {} terms", pool.len());
        self.pool = pool;
    }
}

impl OntologyResolver for Ontology {
    fn resolve(&self, id: HpoTermId) -> Option<HpoTermId> {
        let mut current = self.alt_ids.get(&id).copied().unwrap_or(id);
        for _ in 0..MAX_REPLACEMENT_CHAIN {
            let term = self.terms.get(current)?;
            if !term.is_obsolete() {
                return Some(current);
            }
            current = term.replaced_by()?;
        }
        None
    }

    fn label(&self, id: HpoTermId) -> Option<&str> {
        self.terms.get(id).map(OntologyTerm::name)
    }

    fn ancestors(&self, id: HpoTermId, max_levels: usize) -> TermGroup {
        let mut result = TermGroup::new();
        let mut level: Vec<HpoTermId> = vec![id];

        for _ in 0..max_levels {
            let mut next_level = Vec::new();
            for term_id in level {
                let Some(term) = self.terms.get(term_id) else {
                    continue;
                };
                for parent in term.parents() {
                    if parent == ROOT || parent == PHENOTYPIC_ABNORMALITY || parent == id {
                        continue;
                    }
                    if result.insert(parent) {
                        next_level.push(parent);
                    }
                }
            }
            if next_level.is_empty() {
                break;
            }
            level = next_level;
        }
        result
    }

    fn phenotype_pool(&self) -> &[HpoTermId] {
        self.pool.as_slice()
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

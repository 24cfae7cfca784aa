use std::collections::HashMap;

use crate::term::TermGroup;
use crate::HpoTermId;

/// A single term of the [`Ontology`](crate::Ontology)
#[derive(Debug, Clone)]
pub struct OntologyTerm {
    id: HpoTermId,
    name: String,
    parents: TermGroup,
    children: TermGroup,
    obsolete: bool,
    replaced_by: Option<HpoTermId>,
}

impl OntologyTerm {
    pub(crate) fn new(id: HpoTermId, name: String) -> Self {
        Self {
            id,
            name,
            parents: TermGroup::new(),
            children: TermGroup::new(),
            obsolete: false,
            replaced_by: None,
        }
    }

    /// The term ID
    pub fn id(&self) -> HpoTermId {
        self.id
    }

    /// The term name (label)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct `is_a` parents
    pub fn parents(&self) -> &TermGroup {
        &self.parents
    }

    /// Direct children
    pub fn children(&self) -> &TermGroup {
        &self.children
    }

    /// `true` if the term is marked `is_obsolete`
    pub fn is_obsolete(&self) -> bool {
        self.obsolete
    }

    /// The term that replaces an obsolete term
    pub fn replaced_by(&self) -> Option<HpoTermId> {
        self.replaced_by
    }

    pub(crate) fn add_parent(&mut self, parent: HpoTermId) {
        self.parents.insert(parent);
    }

    pub(crate) fn add_child(&mut self, child: HpoTermId) {
        self.children.insert(child);
    }

    pub(crate) fn set_obsolete(&mut self, replaced_by: Option<HpoTermId>) {
        self.obsolete = true;
        self.replaced_by = replaced_by;
    }
}

#[derive(Debug)]
pub(crate) struct Arena {
    terms: HashMap<HpoTermId, OntologyTerm>,
}

impl Arena {
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn insert(&mut self, term: OntologyTerm) {
        self.terms.insert(term.id(), term);
    }

    pub fn get(&self, id: HpoTermId) -> Option<&OntologyTerm> {
        self.terms.get(&id)
    }

    pub fn get_mut(&mut self, id: HpoTermId) -> Option<&mut OntologyTerm> {
        self.terms.get_mut(&id)
    }

    pub fn contains(&self, id: HpoTermId) -> bool {
        self.terms.contains_key(&id)
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            terms: HashMap::with_capacity(20_000),
        }
    }
}

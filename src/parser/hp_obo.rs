//! ```text
//! format-version: 1.2
//! data-version: hp/releases/2023-04-05
//!
//! [Term]
//! id: HP:0001250
//! name: Seizure
//! alt_id: HP:0002279
//! is_a: HP:0012638 ! Abnormal nervous system physiology
//! ```
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::parser::open;
use crate::{HpoTermId, Ontology, PhenopacketError, PhenopacketResult};

#[derive(Default)]
struct RawTerm {
    id: Option<HpoTermId>,
    name: Option<String>,
    alt_ids: Vec<HpoTermId>,
    parents: Vec<HpoTermId>,
    obsolete: bool,
    replaced_by: Option<HpoTermId>,
}

impl RawTerm {
    fn is_empty(&self) -> bool {
        self.id.is_none() && self.name.is_none()
    }

    fn add_line(&mut self, line: &str) -> PhenopacketResult<()> {
        let Some((key, value)) = line.split_once(": ") else {
            trace!("Ignoring: {}", line);
            return Ok(());
        };
        match key {
            "id" => self.id = Some(HpoTermId::try_from(value)?),
            "name" => self.name = Some(value.to_string()),
            "alt_id" => self.alt_ids.push(HpoTermId::try_from(value)?),
            "is_a" => self.parents.push(HpoTermId::try_from(strip_comment(value))?),
            "is_obsolete" => self.obsolete = value.trim() == "true",
            "replaced_by" => self.replaced_by = Some(HpoTermId::try_from(value)?),
            _ => (),
        }
        Ok(())
    }
}

/// Removes the trailing `! name` comment of a reference
fn strip_comment(value: &str) -> &str {
    value.split_once(' ').map_or(value, |(id, _)| id)
}

/// Parses the OBO file line by line and builds the ontology
pub(crate) fn read_obo_file<P: AsRef<Path>>(
    filename: P,
    ontology: &mut Ontology,
) -> PhenopacketResult<()> {
    let reader = open(filename)?;
    let mut terms: Vec<RawTerm> = Vec::new();
    let mut current: Option<RawTerm> = None;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end();

        if line.starts_with('[') {
            if let Some(term) = current.take() {
                terms.push(term);
            }
            if line == "[Term]" {
                current = Some(RawTerm::default());
            }
            continue;
        }

        match current.as_mut() {
            Some(term) => term.add_line(line)?,
            None => {
                if let Some(version) = line.strip_prefix("data-version: ") {
                    ontology.set_version(version.trim());
                }
            }
        }
    }
    if let Some(term) = current.take() {
        terms.push(term);
    }

    add_terms(terms, ontology)?;
    ontology.create_cache();
    debug!("Loaded {} terms from OBO file", ontology.len());
    Ok(())
}

fn add_terms(terms: Vec<RawTerm>, ontology: &mut Ontology) -> PhenopacketResult<()> {
    let mut connections: Vec<(HpoTermId, HpoTermId)> = Vec::new();

    for term in terms {
        if term.is_empty() {
            continue;
        }
        let (Some(id), Some(name)) = (term.id, term.name) else {
            return Err(PhenopacketError::InvalidInput(
                "OBO term stanza without id or name".to_string(),
            ));
        };
        ontology.insert_term(name, id);
        for alt_id in term.alt_ids {
            ontology.add_alt_id(alt_id, id);
        }
        if term.obsolete {
            ontology.set_obsolete(id, term.replaced_by)?;
        }
        for parent in term.parents {
            connections.push((id, parent));
        }
    }

    for (child, parent) in connections {
        if let Err(err) = ontology.add_parent(parent, child) {
            warn!("Unable to connect {} to {}: {}", child, parent, err);
        }
    }
    Ok(())
}

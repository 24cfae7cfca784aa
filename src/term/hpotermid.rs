use core::fmt::Debug;
use std::fmt::Display;

use crate::{PhenopacketError, PhenopacketResult};

/// The ID of an HPO term, e.g. `HP:0000118`
///
/// Only the numerical part is stored. Parsing is strict about the `HP:`
/// prefix so that disease IDs or free text in the wrong column are
/// not mistaken for term IDs.
#[derive(Copy, Clone, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct HpoTermId {
    inner: u32,
}

impl HpoTermId {
    /// Constructs a term ID from its integer part
    pub const fn from_u32(inner: u32) -> Self {
        Self { inner }
    }

    /// Returns the integer part of the ID
    pub fn as_u32(&self) -> u32 {
        self.inner
    }
}

impl TryFrom<&str> for HpoTermId {
    type Error = PhenopacketError;
    /// Parses `HP:0000118` into an [`HpoTermId`]
    ///
    /// # Errors
    ///
    /// - [`PhenopacketError::InvalidInput`]: The `HP:` prefix is missing
    /// - [`PhenopacketError::ParseIntError`]: The numerical part is invalid
    ///
    /// # Examples
    ///
    /// ```
    /// use phenotype2phenopacket::HpoTermId;
    ///
    /// let id = HpoTermId::try_from("HP:0000118").unwrap();
    /// assert_eq!(id.as_u32(), 118);
    /// assert!(HpoTermId::try_from("OMIM:100100").is_err());
    /// ```
    fn try_from(s: &str) -> PhenopacketResult<Self> {
        let Some(number) = s.trim().strip_prefix("HP:") else {
            return Err(PhenopacketError::InvalidInput(format!(
                "{s} is not an HPO term ID"
            )));
        };
        Ok(HpoTermId {
            inner: number.parse::<u32>()?,
        })
    }
}

impl From<u32> for HpoTermId {
    fn from(inner: u32) -> Self {
        Self { inner }
    }
}

impl Debug for HpoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HpoTermId({self})")
    }
}

impl Display for HpoTermId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HP:{:07}", self.inner)
    }
}

impl PartialEq<str> for HpoTermId {
    fn eq(&self, other: &str) -> bool {
        HpoTermId::try_from(other).map_or(false, |other| *self == other)
    }
}

impl PartialEq<&str> for HpoTermId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

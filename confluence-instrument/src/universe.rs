use crate::{
    Keyed,
    error::InstrumentError,
    security::{BondCategory, Security, SecurityKind, name::SecurityName},
};
use derive_more::Constructor;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Constructor,
)]
pub struct SecurityIndex(pub usize);

impl SecurityIndex {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SecurityIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecurityIndex({})", self.0)
    }
}

/// Indexed collection of [`Security`]s, sorted by [`SecurityName`].
///
/// Sorting on construction gives every downstream fold over the universe the same order
/// regardless of how the securities were supplied, which keeps composite output reproducible.
///
/// Note that once a `Universe` has been constructed, it cannot be mutated (this could invalidate
/// existing [`SecurityIndex`] lookups).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Universe {
    securities: Vec<Keyed<SecurityIndex, Security>>,
}

impl Universe {
    /// Initialises a new `Universe` from an iterator of [`Security`]s.
    ///
    /// # Returns
    /// * `Ok(Universe)` - every security name is unique.
    /// * `Err(InstrumentError::DuplicateSecurity)` - a name was provided more than once.
    pub fn new<Iter>(securities: Iter) -> Result<Self, InstrumentError>
    where
        Iter: IntoIterator<Item = Security>,
    {
        let mut securities = securities.into_iter().collect::<Vec<_>>();
        securities.sort_by(|a, b| a.name.cmp(&b.name));

        if let Some(pair) = securities
            .windows(2)
            .find(|pair| pair[0].name == pair[1].name)
        {
            return Err(InstrumentError::DuplicateSecurity(pair[0].name.clone()));
        }

        Ok(Self {
            securities: securities
                .into_iter()
                .enumerate()
                .map(|(index, security)| Keyed::new(SecurityIndex(index), security))
                .collect(),
        })
    }

    /// Returns a reference to the [`SecurityIndex`] <--> [`Security`] associations.
    pub fn securities(&self) -> &[Keyed<SecurityIndex, Security>] {
        &self.securities
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }

    /// Finds the [`SecurityIndex`] associated with the provided [`SecurityName`].
    pub fn find_security_index(
        &self,
        name: &SecurityName,
    ) -> Result<SecurityIndex, InstrumentError> {
        self.securities
            .binary_search_by(|keyed| keyed.value.name.cmp(name))
            .map(SecurityIndex)
            .map_err(|_| InstrumentError::SecurityNotFound(name.clone()))
    }

    /// Finds the [`Security`] associated with the provided [`SecurityName`].
    pub fn find(&self, name: &SecurityName) -> Result<&Security, InstrumentError> {
        self.find_security_index(name).map(|index| self.security(index))
    }

    pub fn security(&self, index: SecurityIndex) -> &Security {
        &self.securities[index.index()].value
    }

    /// Iterator over every [`Security`] in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Security> + '_ {
        self.securities.iter().map(|keyed| &keyed.value)
    }

    /// Iterator over every [`Security`] whose kind satisfies the provided predicate.
    pub fn filter<'a, F>(&'a self, predicate: F) -> impl Iterator<Item = &'a Security> + 'a
    where
        F: Fn(&SecurityKind) -> bool + 'a,
    {
        self.iter().filter(move |security| predicate(&security.kind))
    }

    pub fn equities(&self) -> impl Iterator<Item = &Security> + '_ {
        self.filter(|kind| *kind == SecurityKind::Equity)
    }

    pub fn bonds(&self, category: BondCategory) -> impl Iterator<Item = &Security> + '_ {
        self.filter(move |kind| *kind == SecurityKind::Bond(category))
    }

    pub fn cohorts(&self) -> impl Iterator<Item = &Security> + '_ {
        self.filter(|kind| matches!(kind, SecurityKind::Cohort(_)))
    }

    /// First [`SecurityKind::Benchmark`] security in name order, if any.
    pub fn benchmark(&self) -> Option<&Security> {
        self.filter(|kind| *kind == SecurityKind::Benchmark).next()
    }
}

//! Attribute handle lookup for a single link
//!
//! The GATT table is walked once per link. After that a handle is either
//! present or known to be missing, and nothing is enumerated again until
//! the cache is cleared.

/// Result of looking a handle up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<C> {
    /// The table has not been walked yet
    Unresolved,
    Found(C),
    Missing,
}

#[derive(Debug)]
pub struct HandleCache<C> {
    entries: Option<Vec<(u16, C)>>,
}

impl<C> Default for HandleCache<C> {
    fn default() -> Self {
        Self { entries: None }
    }
}

impl<C: Clone> HandleCache<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resolved(&self) -> bool {
        self.entries.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn lookup(&self, handle: u16) -> Lookup<C> {
        match &self.entries {
            None => Lookup::Unresolved,
            Some(entries) => entries
                .iter()
                .find(|(h, _)| *h == handle)
                .map_or(Lookup::Missing, |(_, c)| Lookup::Found(c.clone())),
        }
    }

    /// Replace the whole table with a fresh walk
    pub fn fill(&mut self, entries: Vec<(u16, C)>) {
        self.entries = Some(entries);
    }

    pub fn clear(&mut self) {
        self.entries = None;
    }
}

//! In-memory graph with the lookups the ACL engine needs.

mod term;

pub use term::{Literal, Term, Triple};

/// A set of triples parsed from one document.
///
/// Lookups are linear scans; ACL, group and profile documents are small.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    triples: Vec<Triple>,
}

impl Graph {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            triples: Vec::new(),
        }
    }

    /// Adds a triple unless the graph already contains it.
    pub fn insert(&mut self, triple: Triple) {
        if !self.triples.contains(&triple) {
            self.triples.push(triple);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Objects of every `(subject, predicate, ?)` triple.
    pub fn objects<'a>(
        &'a self,
        subject: &Term,
        predicate: &str,
    ) -> impl Iterator<Item = &'a Term> {
        self.triples
            .iter()
            .filter(move |t| &t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// Subjects of every `(?, predicate, object)` triple.
    pub fn subjects<'a>(
        &'a self,
        predicate: &str,
        object: &Term,
    ) -> impl Iterator<Item = &'a Term> {
        self.triples
            .iter()
            .filter(move |t| t.predicate == predicate && &t.object == object)
            .map(|t| &t.subject)
    }

    /// Distinct subjects that carry `predicate`, in document order.
    #[must_use]
    pub fn subjects_with(&self, predicate: &str) -> Vec<&Term> {
        self.subjects_with_any(&[predicate])
    }

    /// Distinct subjects that carry any of the given predicates, in document order.
    #[must_use]
    pub fn subjects_with_any(&self, predicates: &[&str]) -> Vec<&Term> {
        let mut subjects: Vec<&Term> = Vec::new();
        for triple in &self.triples {
            if predicates.contains(&triple.predicate.as_str()) && !subjects.contains(&&triple.subject)
            {
                subjects.push(&triple.subject);
            }
        }
        subjects
    }

    /// First object of `(subject, predicate, ?)`, if any.
    #[must_use]
    pub fn object<'a>(&'a self, subject: &Term, predicate: &str) -> Option<&'a Term> {
        self.objects(subject, predicate).next()
    }

    #[must_use]
    pub fn contains(&self, subject: &Term, predicate: &str, object: &Term) -> bool {
        self.triples
            .iter()
            .any(|t| &t.subject == subject && t.predicate == predicate && &t.object == object)
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Self::new();
        for triple in iter {
            graph.insert(triple);
        }
        graph
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

use crate::pattern::FilterPattern;

/// Any-of collection of identifier patterns.
///
/// An identifier passes when at least one pattern matches. An empty set
/// passes everything, so callers can hold a `FilterSet` unconditionally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    patterns: Vec<FilterPattern>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pattern: FilterPattern) {
        self.patterns.push(pattern);
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterPattern> {
        self.patterns.iter()
    }

    /// Returns true if the set is empty or any pattern matches `id`.
    pub fn matches(&self, id: u32) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(id))
    }
}

impl FromIterator<FilterPattern> for FilterSet {
    fn from_iter<I: IntoIterator<Item = FilterPattern>>(iter: I) -> Self {
        Self {
            patterns: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for FilterSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(FilterPattern::compile).collect()
    }
}

impl Extend<FilterPattern> for FilterSet {
    fn extend<I: IntoIterator<Item = FilterPattern>>(&mut self, iter: I) {
        self.patterns.extend(iter);
    }
}

//! Majority vote over stop type labels.

/// Vote counts kept in first-occurrence order.
///
/// Ties resolve to the label that was recorded first, so the outcome never
/// depends on hash ordering.
///
/// # Examples
/// ```
/// use moca_scorer::VoteTally;
///
/// let mut tally = VoteTally::new();
/// for label in ["A", "B", "A", "B"] {
///     tally.record(label);
/// }
/// assert_eq!(tally.winner(), Some("A"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteTally<'a> {
    counts: Vec<(&'a str, usize)>,
}

impl<'a> VoteTally<'a> {
    /// Create an empty tally.
    #[must_use]
    pub const fn new() -> Self {
        Self { counts: Vec::new() }
    }

    /// Record one vote for `label`.
    pub fn record(&mut self, label: &'a str) {
        match self.counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count = count.saturating_add(1),
            None => self.counts.push((label, 1)),
        }
    }

    /// Most frequent label, or `None` when no votes were cast.
    #[must_use]
    pub fn winner(&self) -> Option<&'a str> {
        let mut best: Option<(&'a str, usize)> = None;
        for &(label, count) in &self.counts {
            // Strictly greater keeps the earliest label on ties.
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label)
    }

    /// Total number of votes cast.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Report whether no votes were cast.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for VoteTally<'a> {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tally = Self::new();
        for label in iter {
            tally.record(label);
        }
        tally
    }
}

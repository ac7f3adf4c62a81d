//! Recently used product search queries.

use serde::{Deserialize, Serialize};

/// Bounded, most-recent-first list of search queries.
///
/// Queries are trimmed, blank ones are ignored, and repeating a query moves
/// it to the front instead of storing it twice.
///
/// ```
/// use shopsphere_core::RecentSearches;
///
/// let mut recent = RecentSearches::default();
/// recent.record("laptop");
/// recent.record("phone");
/// recent.record("laptop");
/// assert_eq!(recent.as_slice(), ["laptop", "phone"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RecentSearches(Vec<String>);

impl RecentSearches {
    /// Maximum number of queries kept.
    pub const CAPACITY: usize = 5;

    /// Record a query as the most recent one.
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        self.0.retain(|q| q != query);
        self.0.insert(0, query.to_owned());
        self.0.truncate(Self::CAPACITY);
    }

    /// Remove every stored query.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Stored queries, most recent first.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for RecentSearches {
    fn from(queries: Vec<String>) -> Self {
        // Storage may have been edited by hand, so re-apply the rules.
        let mut recent = Self::default();
        for query in queries.iter().rev() {
            recent.record(query);
        }
        recent
    }
}

impl From<RecentSearches> for Vec<String> {
    fn from(recent: RecentSearches) -> Self {
        recent.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_bounded() {
        let mut recent = RecentSearches::default();
        for q in ["a", "b", "c", "d", "e", "f", "g"] {
            recent.record(q);
        }
        assert_eq!(recent.len(), RecentSearches::CAPACITY);
        assert_eq!(recent.as_slice(), ["g", "f", "e", "d", "c"]);
    }

    #[test]
    fn test_blank_queries_ignored() {
        let mut recent = RecentSearches::default();
        recent.record("   ");
        recent.record("");
        assert!(recent.is_empty());
    }

    #[test]
    fn test_deserialize_reapplies_rules() {
        let recent: RecentSearches =
            serde_json::from_str(r#"["x", "y", "x", " ", "a", "b", "c", "d"]"#).unwrap();
        assert_eq!(recent.as_slice(), ["x", "y", "a", "b", "c"]);
    }
}

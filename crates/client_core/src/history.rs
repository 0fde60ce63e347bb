//! Append-only history of issued search URLs and the recent-search view
//! derived from it.

use anyhow::{anyhow, Result};
use url::Url;

/// Collapsed window inspected for the recent-search view; the final entry
/// (the currently active term) is dropped before display.
const RECENT_WINDOW: usize = 6;

#[derive(Debug, Clone)]
pub struct SearchHistory {
    base: Url,
    urls: Vec<Url>,
}

impl SearchHistory {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            urls: Vec::new(),
        }
    }

    /// Builds the request URL for `(term, page)` and appends it. Entries are
    /// never mutated or removed for the lifetime of the session.
    pub fn push(&mut self, term: &str, page: u32) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("search base URL cannot serve as a base"))?
            .push("search");
        url.query_pairs_mut()
            .append_pair("query", term)
            .append_pair("page", &page.to_string());
        self.urls.push(url.clone());
        Ok(url)
    }

    pub fn latest(&self) -> Option<&Url> {
        self.urls.last()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Term encoded in the most recent URL.
    pub fn current_term(&self) -> Option<String> {
        self.urls.last().map(extract_term)
    }

    /// Previously submitted terms, oldest first. Immediately repeated terms
    /// (re-pagination of the same search) collapse to one entry; non-adjacent
    /// repeats are kept. The window holds the last six collapsed entries and
    /// the final one is dropped, since that term is already visible in the
    /// search box.
    pub fn recent_searches(&self) -> Vec<String> {
        let mut collapsed: Vec<String> = Vec::new();
        for url in &self.urls {
            let term = extract_term(url);
            if collapsed.last() != Some(&term) {
                collapsed.push(term);
            }
        }

        let start = collapsed.len().saturating_sub(RECENT_WINDOW);
        let mut window = collapsed.split_off(start);
        window.pop();
        window
    }
}

/// Inverse of [`SearchHistory::push`]: reads the term back out of a
/// constructed request URL.
pub fn extract_term(url: &Url) -> String {
    url.query_pairs()
        .find(|(name, _)| name == "query")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> SearchHistory {
        SearchHistory::new(Url::parse("https://hn.algolia.com/api/v1").expect("base url"))
    }

    fn push_terms(history: &mut SearchHistory, terms: &[&str]) {
        for term in terms {
            history.push(term, 0).expect("push");
        }
    }

    #[test]
    fn push_constructs_query_and_page_pairs() {
        let mut history = history();
        let url = history.push("React", 2).expect("push");

        assert_eq!(url.path(), "/api/v1/search");
        assert_eq!(extract_term(&url), "React");
        assert!(url.query_pairs().any(|(k, v)| k == "page" && v == "2"));
    }

    #[test]
    fn push_and_extract_round_trip_terms_needing_encoding() {
        let mut history = history();
        let url = history.push("rust async runtime", 0).expect("push");

        assert_eq!(extract_term(&url), "rust async runtime");
        assert_eq!(history.current_term().as_deref(), Some("rust async runtime"));
    }

    #[test]
    fn recent_searches_collapses_consecutive_terms_and_drops_current() {
        let mut history = history();
        push_terms(&mut history, &["A", "A", "B", "B", "B", "C"]);

        assert_eq!(history.recent_searches(), vec!["A", "B"]);
    }

    #[test]
    fn non_adjacent_repeats_are_kept() {
        let mut history = history();
        push_terms(&mut history, &["A", "B", "A", "C"]);

        assert_eq!(history.recent_searches(), vec!["A", "B", "A"]);
    }

    #[test]
    fn empty_history_yields_no_recent_searches() {
        assert!(history().recent_searches().is_empty());
    }

    #[test]
    fn single_entry_history_yields_no_recent_searches() {
        let mut history = history();
        push_terms(&mut history, &["React"]);

        assert!(history.recent_searches().is_empty());
    }

    #[test]
    fn window_shows_at_most_five_previous_terms() {
        let mut history = history();
        push_terms(&mut history, &["A", "B", "C", "D", "E", "F", "G", "H"]);

        assert_eq!(history.recent_searches(), vec!["C", "D", "E", "F", "G"]);
    }
}

use crate::config::CrawlMode;
use crate::crawler::parser::internal_links;
use crate::sources::seed_urls;
use crate::ConnectorError;
use reqwest::Client;
use scraper::Html;
use std::collections::HashSet;
use url::Url;

/// URLs waiting to be crawled plus every URL already taken
///
/// `to_visit` is a stack and may hold duplicates; `pop` skips anything
/// already visited, so each URL is handed out at most once per run.
#[derive(Debug, Default)]
pub struct Frontier {
    to_visit: Vec<String>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a frontier holding `seeds`, pushed in order
    pub fn from_seeds<I>(seeds: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut frontier = Self::new();
        for seed in seeds {
            frontier.push(seed);
        }
        frontier
    }

    /// Builds the initial frontier for `mode`
    pub async fn seed(
        mode: CrawlMode,
        base_url: &str,
        client: &Client,
    ) -> Result<Self, ConnectorError> {
        let seeds = seed_urls(mode, base_url, client).await?;
        Ok(Self::from_seeds(seeds))
    }

    /// Queues a URL unless it was already visited
    pub fn push(&mut self, url: String) -> bool {
        if self.visited.contains(&url) {
            return false;
        }
        self.to_visit.push(url);
        true
    }

    /// Takes the most recently queued unvisited URL and marks it visited
    pub fn pop(&mut self) -> Option<String> {
        while let Some(url) = self.to_visit.pop() {
            if self.visited.insert(url.clone()) {
                return Some(url);
            }
        }
        None
    }

    /// Marks a URL visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &str) -> bool {
        if self.visited.contains(url) {
            return false;
        }
        self.visited.insert(url.to_string());
        true
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Queues the internal links of a page; returns how many were queued
    pub fn discover(&mut self, base: &str, current: &Url, document: &Html) -> usize {
        let mut queued = 0;
        for link in internal_links(base, current, document) {
            if self.push(link) {
                queued += 1;
            }
        }
        if queued > 0 {
            tracing::debug!("Queued {} links from {}", queued, current);
        }
        queued
    }

    pub fn pending(&self) -> usize {
        self.to_visit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_visit.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds(urls: &[&str]) -> Frontier {
        Frontier::from_seeds(urls.iter().map(|u| u.to_string()))
    }

    #[test]
    fn test_pop_is_lifo() {
        let mut frontier = seeds(&["https://a.com/1", "https://a.com/2", "https://a.com/3"]);
        assert_eq!(frontier.pop().as_deref(), Some("https://a.com/3"));
        assert_eq!(frontier.pop().as_deref(), Some("https://a.com/2"));
        assert_eq!(frontier.pop().as_deref(), Some("https://a.com/1"));
        assert_eq!(frontier.pop(), None);
    }

    #[test]
    fn test_pop_skips_visited_duplicates() {
        let mut frontier = seeds(&["https://a.com/x", "https://a.com/y", "https://a.com/x"]);
        assert_eq!(frontier.pop().as_deref(), Some("https://a.com/x"));
        assert_eq!(frontier.pop().as_deref(), Some("https://a.com/y"));
        assert_eq!(frontier.pop(), None);
        assert!(frontier.is_visited("https://a.com/x"));
        assert!(frontier.is_visited("https://a.com/y"));
    }

    #[test]
    fn test_push_after_visit_rejected() {
        let mut frontier = seeds(&["https://a.com/"]);
        frontier.pop();
        assert!(!frontier.push("https://a.com/".to_string()));
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_mark_visited_idempotent() {
        let mut frontier = Frontier::new();
        assert!(frontier.mark_visited("https://a.com/final"));
        assert!(!frontier.mark_visited("https://a.com/final"));
        assert!(frontier.is_visited("https://a.com/final"));
    }

    #[test]
    fn test_discover_skips_visited_links() {
        let mut frontier = seeds(&["https://a.com/"]);
        let current = Url::parse(&frontier.pop().unwrap()).unwrap();
        let html = Html::parse_document(
            r#"<a href="/">Home</a><a href="/b">B</a><a href="https://c.com/">C</a>"#,
        );

        assert_eq!(frontier.discover("https://a.com/", &current, &html), 1);
        assert_eq!(frontier.pop().as_deref(), Some("https://a.com/b"));
        assert_eq!(frontier.pop(), None);
    }
}

//! Free-text and tag filtering over a profile snapshot.
//!
//! A query is split on whitespace. Tokens starting with `#` are tag filters
//! (exact, case-insensitive); every other token must appear as a
//! case-insensitive substring of the name, host, username or description.
//! All tokens must match. There is no scoring: results keep store order.

use crate::domain::models::Profile;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<String>,
    tags: Vec<String>,
}

impl SearchQuery {
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();
        for token in query.split_whitespace() {
            match token.strip_prefix('#') {
                Some("") => {}
                Some(tag) => parsed.tags.push(tag.to_lowercase()),
                None => parsed.terms.push(token.to_lowercase()),
            }
        }
        parsed
    }

    /// Add explicit tag filters on top of any `#tag` tokens
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags.extend(
            tags.into_iter()
                .map(|t| t.as_ref().trim().trim_start_matches('#').to_lowercase())
                .filter(|t| !t.is_empty()),
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.tags.is_empty()
    }

    pub fn matches(&self, profile: &Profile) -> bool {
        self.tags.iter().all(|tag| profile.has_tag(tag))
            && self.terms.iter().all(|term| Self::text_matches(profile, term))
    }

    fn text_matches(profile: &Profile, term: &str) -> bool {
        let contains = |field: &str| field.to_lowercase().contains(term);
        contains(&profile.name)
            || contains(&profile.host)
            || contains(&profile.username)
            || profile.description.as_deref().is_some_and(contains)
    }
}

/// Lazily yield the profiles matching `query` and every entry of `tag_filter`
pub fn search<'a>(
    profiles: &'a [Profile],
    query: &str,
    tag_filter: &[String],
) -> impl Iterator<Item = &'a Profile> + 'a {
    let query = SearchQuery::parse(query).with_tags(tag_filter);
    profiles.iter().filter(move |profile| query.matches(profile))
}

/// Names where either side contains the other, case-insensitively
pub fn suggest_similar(profiles: &[Profile], name: &str) -> Vec<String> {
    let needle = name.to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    profiles
        .iter()
        .filter(|p| {
            let candidate = p.name.to_lowercase();
            candidate.contains(&needle) || needle.contains(&candidate)
        })
        .map(|p| p.name.clone())
        .collect()
}

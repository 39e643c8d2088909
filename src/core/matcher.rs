use crate::core::catalog::VehicleCatalog;
use crate::domain::model::VehicleRecord;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, Validate};
use serde::{Deserialize, Serialize};

/// Ranking knobs. The defaults reproduce the calculator's historical ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Added when the make+model text starts with a token.
    pub prefix_score: u32,
    /// Added when the make+model text contains a token (prefix hits get both).
    pub substring_score: u32,
    pub max_results: usize,
    pub min_query_len: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            prefix_score: 15,
            substring_score: 8,
            max_results: 10,
            min_query_len: 2,
        }
    }
}

impl Validate for MatcherConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("matcher.max_results", self.max_results, 1)?;
        validate_positive_number("matcher.min_query_len", self.min_query_len, 1)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMatch<'a> {
    pub record: &'a VehicleRecord,
    pub score: u32,
}

#[derive(Debug, Clone, Default)]
pub struct VehicleMatcher {
    config: MatcherConfig,
}

impl VehicleMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn search<'a>(&self, query: &str, catalog: &'a VehicleCatalog) -> Vec<&'a VehicleRecord> {
        self.search_scored(query, catalog)
            .into_iter()
            .map(|m| m.record)
            .collect()
    }

    /// Every token must occur in the entry; ties keep catalog order.
    pub fn search_scored<'a>(
        &self,
        query: &str,
        catalog: &'a VehicleCatalog,
    ) -> Vec<ScoredMatch<'a>> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < self.config.min_query_len {
            return Vec::new();
        }

        let tokens = tokenize(&query);
        let mut matches: Vec<ScoredMatch<'a>> = catalog
            .entries()
            .iter()
            .filter(|entry| tokens.iter().all(|t| entry.search_text.contains(t.as_str())))
            .map(|entry| ScoredMatch {
                record: &entry.record,
                score: self.score(&entry.search_text, &tokens),
            })
            .collect();

        // sort_by is stable
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches.truncate(self.config.max_results);

        tracing::trace!(query = %query, hits = matches.len(), "vehicle search");
        matches
    }

    /// Saturates at `u32::MAX` so oversized configured weights cannot overflow.
    fn score(&self, search_text: &str, tokens: &[String]) -> u32 {
        tokens.iter().fold(0u32, |total, token| {
            let mut score = total;
            if search_text.starts_with(token.as_str()) {
                score = score.saturating_add(self.config.prefix_score);
            }
            if search_text.contains(token.as_str()) {
                score = score.saturating_add(self.config.substring_score);
            }
            score
        })
    }
}

/// Whitespace tokens, each kept once, in first-seen order.
fn tokenize(query: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in query.split_whitespace() {
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Searches with the default ranking.
pub fn search<'a>(query: &str, catalog: &'a VehicleCatalog) -> Vec<&'a VehicleRecord> {
    VehicleMatcher::default().search(query, catalog)
}

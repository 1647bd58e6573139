use std::collections::HashSet;

use crate::model::{Article, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleStats {
    pub total_articles: usize,
    pub high_priority_count: usize,
    pub medium_priority_count: usize,
    pub distinct_source_count: usize,
}

/// Summarizes `articles`. Returns `None` for an empty slice: there is
/// nothing to display.
pub fn compute_statistics(articles: &[Article]) -> Option<ArticleStats> {
    if articles.is_empty() {
        return None;
    }

    let count = |p: Priority| articles.iter().filter(|a| a.priority() == p).count();
    let sources: HashSet<&str> = articles.iter().map(|a| a.source.as_str()).collect();

    Some(ArticleStats {
        total_articles: articles.len(),
        high_priority_count: count(Priority::High),
        medium_priority_count: count(Priority::Medium),
        distinct_source_count: sources.len(),
    })
}

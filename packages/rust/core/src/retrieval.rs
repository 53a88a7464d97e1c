//! Keyword scoring of stored documents against a repair question.
//!
//! The scorer is the only retrieval surface: answer composition happens
//! in an external layer. Scores are weighted substring hits: document
//! keywords against the raw query, query tokens against the summary and
//! steps.

use std::cmp::Ordering;

use repairkb_shared::StructuredDocument;

/// Score for a document keyword appearing in the query.
const KEYWORD_WEIGHT: f64 = 2.0;

/// Score for any query token appearing in the summary.
const SUMMARY_WEIGHT: f64 = 1.0;

/// Score per step containing any query token.
const STEP_WEIGHT: f64 = 1.5;

/// One ranked match.
#[derive(Debug, Clone)]
pub struct RetrievalResult<'a> {
    /// The matched document.
    pub document: &'a StructuredDocument,
    /// Accumulated keyword/summary/step score.
    pub score: f64,
}

/// Rank `knowledge_base` against `query`, returning at most `top_k`
/// results with positive scores, best first. The sort is stable, so tied
/// documents keep the knowledge base's order.
pub fn search<'a>(
    query: &str,
    knowledge_base: &'a [StructuredDocument],
    top_k: usize,
) -> Vec<RetrievalResult<'a>> {
    let query_lower = query.to_lowercase();
    let tokens: Vec<&str> = query_lower.split_whitespace().collect();

    let mut results: Vec<RetrievalResult<'a>> = knowledge_base
        .iter()
        .filter_map(|document| {
            let score = score_document(document, &query_lower, &tokens);
            (score > 0.0).then_some(RetrievalResult { document, score })
        })
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    results.truncate(top_k);
    results
}

/// Weighted substring score for one document.
fn score_document(document: &StructuredDocument, query_lower: &str, tokens: &[&str]) -> f64 {
    let mut score = 0.0;

    // Document keywords found in the raw (un-split) query.
    for keyword in &document.keywords {
        if query_lower.contains(&keyword.to_lowercase()) {
            score += KEYWORD_WEIGHT;
        }
    }

    // Any query token in the summary counts once.
    let summary_lower = document.summary.to_lowercase();
    if tokens.iter().any(|token| summary_lower.contains(token)) {
        score += SUMMARY_WEIGHT;
    }

    // Each step containing any query token counts.
    for step in &document.steps {
        let step_lower = step.to_lowercase();
        if tokens.iter().any(|token| step_lower.contains(token)) {
            score += STEP_WEIGHT;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(url: &str, keywords: &[&str], summary: &str, steps: &[&str]) -> StructuredDocument {
        StructuredDocument {
            url: url.into(),
            title: String::new(),
            raw_content: summary.into(),
            steps: steps.iter().map(|s| s.to_string()).collect(),
            tools: Vec::new(),
            warnings: Vec::new(),
            parts: Vec::new(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            summary: summary.into(),
        }
    }

    #[test]
    fn keyword_hits_score_two_each() {
        let kb = vec![document(
            "u1",
            &["battery", "repair"],
            "unrelated summary",
            &[],
        )];
        let results = search("battery repair cost", &kb, 3);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 4.0);
    }

    #[test]
    fn summary_hit_scores_once_regardless_of_token_count() {
        let kb = vec![document(
            "u1",
            &[],
            "replace the cracked screen assembly",
            &[],
        )];
        let results = search("screen assembly", &kb, 3);
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn each_matching_step_scores() {
        let kb = vec![document(
            "u1",
            &[],
            "no token here",
            &[
                "Step 1: remove the battery cover",
                "Step 2: disconnect the battery cable",
                "Step 3: clean the frame",
            ],
        )];
        let results = search("battery", &kb, 3);
        assert_eq!(results[0].score, 3.0);
    }

    #[test]
    fn zero_score_documents_are_excluded() {
        let kb = vec![
            document("u1", &["repair"], "fix the phone", &[]),
            document("u2", &[], "totally unrelated", &[]),
        ];
        let results = search("repair", &kb, 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.url, "u1");
    }

    // Scoring monotonicity: same document, one extra matching keyword.
    #[test]
    fn adding_a_query_keyword_strictly_increases_score() {
        let without = vec![document("u1", &["repair"], "summary", &[])];
        let with = vec![document("u1", &["repair", "电池"], "summary", &[])];

        let query = "电池 repair";
        let base = search(query, &without, 1)[0].score;
        let boosted = search(query, &with, 1)[0].score;
        assert!(boosted > base);
    }

    #[test]
    fn results_sorted_descending_with_stable_ties() {
        let kb = vec![
            document("low", &[], "screen info", &[]),
            document("tie-a", &["screen"], "no match", &[]),
            document("tie-b", &["screen"], "no match", &[]),
            document("high", &["screen"], "screen summary", &["screen step"]),
        ];

        let results = search("screen", &kb, 10);
        let urls: Vec<&str> = results.iter().map(|r| r.document.url.as_str()).collect();
        // high = 2+1+1.5, ties = 2 each in KB order, low = 1
        assert_eq!(urls, vec!["high", "tie-a", "tie-b", "low"]);
    }

    #[test]
    fn top_k_truncates() {
        let kb: Vec<StructuredDocument> = (0..6)
            .map(|i| document(&format!("u{i}"), &["fix"], "fix it", &[]))
            .collect();
        let results = search("fix", &kb, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.url, "u0");
        assert_eq!(results[1].document.url, "u1");
    }

    #[test]
    fn chinese_query_matches_keywords() {
        let kb = vec![document("u1", &["更换", "电池"], "更换电池指南", &[])];
        let results = search("怎么更换电池", &kb, 3);
        // Both keywords substring-match the raw query; the summary gets no
        // token hit because the query is one unbroken token ("怎么更换电池"
        // is not a substring of the summary).
        assert_eq!(results[0].score, 4.0);
    }
}

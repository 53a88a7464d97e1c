//! Structured-record extraction from cleaned guide text.
//!
//! Every extractor is a fixed rule chain or vocabulary: step boundaries
//! are tried pattern-by-pattern with the first productive pattern
//! winning, tools/parts/keywords are bilingual membership tests, and
//! warnings collect labeled caution lines. Length caps are applied here,
//! at construction, and nowhere else.

use std::sync::LazyLock;

use regex::Regex;

use repairkb_shared::{
    CleanDocument, MAX_STEPS, MAX_WARNINGS, SUMMARY_CHARS, StructuredDocument,
};

/// Step captures at or under this many bytes are discarded as labels
/// without bodies.
const MIN_STEP_LEN: usize = 10;

/// Step-boundary patterns, most specific first. The first pattern that
/// matches anywhere in the content segments the whole text.
static STEP_BOUNDARIES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"步骤\s*\d+[：:]", r"(?i)Step\s*\d+[：:]", r"\d+[.、]"]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
});

/// Labeled caution-line patterns, capturing the rest of the line.
static WARNING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"注意[：:]([^\n]+)",
        r"小心[：:]([^\n]+)",
        r"(?i)Be careful([^\n]+)",
        r"(?i)Don't([^\n]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Bilingual repair-tool vocabulary.
const TOOL_VOCAB: &[&str] = &[
    "screwdriver",
    "spudger",
    "tweezers",
    "opening pick",
    "suction handle",
    "螺丝刀",
    "撬棒",
    "镊子",
    "撬片",
    "吸盘",
    "热风枪",
    "heat gun",
    "hair dryer",
];

/// Bilingual device-part vocabulary.
const PART_VOCAB: &[&str] = &[
    "battery",
    "screen",
    "camera",
    "speaker",
    "antenna",
    "microphone",
    "电池",
    "屏幕",
    "摄像头",
    "扬声器",
    "天线",
    "麦克风",
    "后盖",
    "充电口",
];

/// Bilingual repair-action vocabulary.
const KEYWORD_VOCAB: &[&str] = &[
    "replacement",
    "repair",
    "fix",
    "install",
    "remove",
    "disconnect",
    "更换",
    "维修",
    "修理",
    "安装",
    "移除",
    "断开",
    "连接",
    "拆解",
];

/// Build the structured record for one cleaned document.
pub fn structure_document(doc: &CleanDocument) -> StructuredDocument {
    let content_lower = doc.content.to_lowercase();

    StructuredDocument {
        url: doc.url.clone(),
        title: doc.title.clone(),
        raw_content: doc.content.clone(),
        steps: extract_steps(&doc.content),
        tools: match_vocabulary(&content_lower, TOOL_VOCAB),
        warnings: extract_warnings(&doc.content),
        parts: match_vocabulary(&content_lower, PART_VOCAB),
        keywords: match_vocabulary(&content_lower, KEYWORD_VOCAB),
        summary: summarize(&doc.content),
    }
}

/// Segment content into repair steps.
///
/// The first boundary pattern that matches wins; each step runs from its
/// boundary to the next, so the step keeps its label.
pub(crate) fn extract_steps(content: &str) -> Vec<String> {
    for pattern in STEP_BOUNDARIES.iter() {
        let starts: Vec<usize> = pattern.find_iter(content).map(|m| m.start()).collect();
        if starts.is_empty() {
            continue;
        }

        let mut steps = Vec::new();
        for (i, &start) in starts.iter().enumerate() {
            if steps.len() == MAX_STEPS {
                break;
            }
            let end = starts.get(i + 1).copied().unwrap_or(content.len());
            let segment = content[start..end].trim();
            if segment.len() > MIN_STEP_LEN {
                steps.push(segment.to_string());
            }
        }
        return steps;
    }

    Vec::new()
}

/// Collect labeled caution lines, in pattern-chain order, capped at
/// [`MAX_WARNINGS`].
pub(crate) fn extract_warnings(content: &str) -> Vec<String> {
    let mut warnings = Vec::new();

    for pattern in WARNING_PATTERNS.iter() {
        for caps in pattern.captures_iter(content) {
            warnings.push(caps[1].trim().to_string());
        }
    }

    warnings.truncate(MAX_WARNINGS);
    warnings
}

/// Vocabulary membership against lower-cased content. Deduplicated by
/// construction; result order follows the vocabulary.
fn match_vocabulary(content_lower: &str, vocab: &[&str]) -> Vec<String> {
    vocab
        .iter()
        .filter(|term| content_lower.contains(&term.to_lowercase()))
        .map(|term| term.to_string())
        .collect()
}

/// Leading excerpt of the content, `...`-terminated when truncated.
fn summarize(content: &str) -> String {
    if content.chars().count() > SUMMARY_CHARS {
        let head: String = content.chars().take(SUMMARY_CHARS).collect();
        format!("{head}...")
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> CleanDocument {
        CleanDocument {
            url: "https://zh.ifixit.com/Guide/1?lang=zh".into(),
            title: "测试指南".into(),
            content: content.into(),
        }
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    #[test]
    fn chinese_step_labels_segment_content() {
        let steps = extract_steps("步骤 1: 关机\n步骤 2: 开盖");
        assert_eq!(steps.len(), 2);
        assert!(steps[0].starts_with("步骤 1:"));
        assert!(steps[1].starts_with("步骤 2:"));
        assert!(steps[0].contains("关机"));
    }

    #[test]
    fn english_steps_used_when_no_chinese_labels() {
        let steps = extract_steps("Step 1: power down the phone\nStep 2: pry the back cover");
        assert_eq!(steps.len(), 2);
        assert!(steps[0].starts_with("Step 1:"));
    }

    #[test]
    fn first_matching_pattern_wins_over_later_ones() {
        // Both 步骤 labels and bare numbered items appear; only the 步骤
        // segmentation is used.
        let content = "步骤 1: 拧下底部螺丝并收好\n1. this numbered line is ignored as a boundary";
        let steps = extract_steps(content);
        assert!(steps[0].starts_with("步骤 1:"));
    }

    #[test]
    fn short_captures_are_discarded() {
        // "步骤 1:" alone carries no body worth keeping.
        let steps = extract_steps("步骤 1:\n步骤 2: 使用撬棒打开后盖并断开排线");
        assert_eq!(steps.len(), 1);
        assert!(steps[0].starts_with("步骤 2:"));
    }

    #[test]
    fn steps_capped_at_ten() {
        let content = (1..=14)
            .map(|i| format!("步骤 {i}: 这是第{i}步的详细操作说明"))
            .collect::<Vec<_>>()
            .join("\n");
        let steps = extract_steps(&content);
        assert_eq!(steps.len(), MAX_STEPS);
        assert!(steps[9].starts_with("步骤 10:"));
    }

    #[test]
    fn no_boundary_yields_no_steps() {
        assert!(extract_steps("这段文字没有任何分步标记。").is_empty());
    }

    // -----------------------------------------------------------------------
    // Warnings
    // -----------------------------------------------------------------------

    #[test]
    fn labeled_warnings_are_captured() {
        let content = "注意: 先断开电池\n小心：排线很脆弱\nDon't pry near the camera";
        let warnings = extract_warnings(content);
        assert_eq!(warnings.len(), 3);
        assert_eq!(warnings[0], "先断开电池");
        assert_eq!(warnings[1], "排线很脆弱");
        assert_eq!(warnings[2], "pry near the camera");
    }

    #[test]
    fn warnings_capped_at_five() {
        let content = (0..8)
            .map(|i| format!("注意: 警告内容{i}"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(extract_warnings(&content).len(), MAX_WARNINGS);
    }

    // -----------------------------------------------------------------------
    // Vocabularies and summary
    // -----------------------------------------------------------------------

    #[test]
    fn bilingual_vocabulary_matches() {
        let content = "use a screwdriver, then 用撬棒 pry, heat with a HEAT GUN";
        let tools = match_vocabulary(&content.to_lowercase(), TOOL_VOCAB);
        assert_eq!(tools, vec!["screwdriver", "撬棒", "heat gun"]);
    }

    #[test]
    fn vocabulary_result_is_deduplicated() {
        let content = "battery battery battery 电池";
        let parts = match_vocabulary(&content.to_lowercase(), PART_VOCAB);
        assert_eq!(parts, vec!["battery", "电池"]);
    }

    #[test]
    fn summary_truncates_long_content() {
        let content = "换".repeat(450);
        let summary = summarize(&content);
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), SUMMARY_CHARS + 3);
    }

    #[test]
    fn summary_keeps_short_content_unchanged() {
        let content = "短内容保持原样。";
        assert_eq!(summarize(content), content);
    }

    // -----------------------------------------------------------------------
    // Whole-document structuring
    // -----------------------------------------------------------------------

    #[test]
    fn structure_document_fills_all_fields() {
        let content = "\
本指南介绍如何更换华为手机的电池。\n\
步骤 1: 用热风枪加热后盖边缘，软化胶水\n\
步骤 2: 用吸盘和撬棒分离后盖，断开电池排线\n\
注意: 电池弯折可能起火";
        let structured = structure_document(&doc(content));

        assert_eq!(structured.url, "https://zh.ifixit.com/Guide/1?lang=zh");
        assert_eq!(structured.title, "测试指南");
        assert_eq!(structured.raw_content, content);
        assert_eq!(structured.steps.len(), 2);
        assert_eq!(structured.warnings, vec!["电池弯折可能起火"]);
        assert!(structured.tools.contains(&"撬棒".to_string()));
        assert!(structured.tools.contains(&"吸盘".to_string()));
        assert!(structured.parts.contains(&"电池".to_string()));
        assert!(structured.keywords.contains(&"更换".to_string()));
        assert_eq!(structured.summary, content);
    }
}

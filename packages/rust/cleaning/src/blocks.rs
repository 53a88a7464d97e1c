//! Second-pass filter for assembled content.
//!
//! Runs over already-cleaned, newline-joined content right before
//! persistence and drops leftover UI controls the line-level pass does
//! not target: edit/comment affordances, pagination, and image-size
//! captions. Kept separate from [`crate::noise`] on purpose; the two
//! rule sets only partially overlap.

use std::sync::LazyLock;

use regex::Regex;

/// UI-control phrases; a line containing any of them is dropped.
const UI_KEYWORDS: &[&str] = &[
    "编辑",
    "添加一条评论",
    "编辑指南",
    "显示更多",
    "上一页",
    "下一页",
    "小——",
    "中——",
    "大——",
];

/// Image-size captions like `小—120 像素`.
static PIXEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[小中大][—\-–—]{1,2}\s*\d{2,4}\s*像素").expect("valid regex"));

/// True when a content line is a leftover UI control or size caption.
pub fn is_ui_block(line: &str) -> bool {
    UI_KEYWORDS.iter().any(|kw| line.contains(kw)) || PIXEL_RE.is_match(line)
}

/// Drop UI-block lines from assembled content, rejoin, and trim.
pub fn strip_ui_blocks(content: &str) -> String {
    content
        .lines()
        .filter(|line| !is_ui_block(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

//! Line-level noise classification for extracted page text.
//!
//! A line is noise when any rule in the chain matches: exact phrases,
//! case-insensitive partial keywords, the regex set, or the minimum
//! length. Rules are checked in that order; first match wins.

use std::sync::LazyLock;

use regex::Regex;

/// Lines dropped on exact match: site chrome and guide-page furniture,
/// in the site's locale plus the English strings it mixes in.
const EXACT_PHRASES: &[&str] = &[
    "由衷感谢以下译者：",
    "修复你的物品",
    "跳转到主内容",
    "社区",
    "商店",
    "翻译",
    "回复",
    "添加评论",
    "取消",
    "发帖评论",
    "编辑",
    "历史",
    "工具",
    "零件",
    "难度",
    "步骤",
    "时间要求",
    "iPhone",
    "Android",
    "Mac",
    "PC",
];

/// Case-insensitive substrings marking author/reputation/community
/// boilerplate, including the multilingual thanks variants.
const PARTIAL_KEYWORDS: &[&str] = &[
    "作者",
    "与",
    "的会员",
    "团队",
    "徽章",
    "创作了",
    "声望",
    "注册",
    "名成员",
    "Author",
    "Registered on",
    "reputation",
    "Created",
    "guides",
    "Badges",
    "more badges",
    "Team",
    "member of",
    "Community",
    "members",
    "Thanks",
    "thank you",
    "Grazie",
    "grandissimo lavoro",
    "special thanks",
];

/// Ordered regex rules: view statistics, time-window labels, bare
/// numeric/percentage lines, language-code lines, date stamps,
/// registration dates, reputation counts, guide counts, badge counts,
/// member counts.
static NOISE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"浏览统计数据[:：]?$",
        r"过去\s*(24\s*小时|7\s*天|30\s*天)[：:]?$",
        r"^总计[：:]?$",
        r"(过去\s?\d+\s?[天小时]+|总计)\s?[：:]\s?[\d,]+",
        r"^\s*[\d,]+\s*$",
        r"^\s*\d+%?\s*$",
        r"(?i)^\s*(en|zh)\s*$",
        r"^\d{4}[年/-]\d{1,2}[月/-]\d{1,2}",
        r"^\w+\s+\w+\s*-\s*\d{4}",
        r"于\d{1,2}/\d{1,2}/\d{2,4}注册",
        r"\d{1,3}(,\d{3})*\s*声望",
        r"(?i)\d{1,3}(,\d{3})*\s*reputation",
        r"创作了\d+\s*篇指南",
        r"(?i)Created\s+\d+\s+guides",
        r"\+?\s*\d+\s*更多徽章",
        r"(?i)Badges[:：]?\s*\+?\d+\s+more",
        r"\d+\s*名成员",
        r"(?i)\d+\s*members",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Minimum line length in characters; anything shorter is noise.
const MIN_LINE_CHARS: usize = 3;

/// Classify a single extracted line as site chrome/boilerplate.
pub fn is_noise(line: &str) -> bool {
    if EXACT_PHRASES.contains(&line) {
        return true;
    }

    let line_lower = line.to_lowercase();
    if PARTIAL_KEYWORDS
        .iter()
        .any(|kw| line_lower.contains(&kw.to_lowercase()))
    {
        return true;
    }

    if NOISE_PATTERNS.iter().any(|re| re.is_match(line)) {
        return true;
    }

    line.chars().count() < MIN_LINE_CHARS
}

/// Filter a line sequence through [`is_noise`], preserving order.
pub fn clean_lines<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter(|line| !is_noise(line.as_ref()))
        .map(|line| line.as_ref().to_string())
        .collect()
}

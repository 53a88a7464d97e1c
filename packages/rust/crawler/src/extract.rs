//! Title and main-content extraction from fetched pages.
//!
//! Selector chains are tried in order, first hit wins. Boilerplate
//! subtrees (navigation, footers, ads, comments) are skipped during the
//! text walk rather than mutated out of the tree.

use scraper::{ElementRef, Html, Node, Selector};

/// Title candidates, most specific first.
const TITLE_SELECTORS: &[&str] = &["h1.pagetitle", "h1", "title"];

/// Main-content containers, most specific first. `body` is the fallback.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    ".guide-content",
    ".wiki-content",
    "main",
    "#main-content",
    ".content",
];

/// Tags whose entire subtree is boilerplate.
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "footer", "nav", "aside"];

/// Class names marking a boilerplate subtree.
const SKIP_CLASSES: &[&str] = &[
    "advertisement",
    "ads",
    "social-share",
    "comments",
    "breadcrumb",
    "sidebar",
    "header",
    "navigation",
];

/// Title and raw text lines pulled from one page.
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// First non-empty title candidate; empty when none matched.
    pub title: String,
    /// Text-node lines from the main content area, trimmed, in document
    /// order, empties dropped. Noise filtering happens downstream.
    pub lines: Vec<String>,
}

/// Extract title and main-content lines from an HTML document.
pub fn extract_page(html: &str) -> ExtractedPage {
    let doc = Html::parse_document(html);

    ExtractedPage {
        title: extract_title(&doc),
        lines: extract_lines(&doc),
    }
}

/// Resolve the page title through the selector chain.
fn extract_title(doc: &Html) -> String {
    for sel_str in TITLE_SELECTORS {
        let sel = Selector::parse(sel_str).expect("valid selector");
        if let Some(el) = doc.select(&sel).next() {
            let title = el.text().collect::<String>().trim().to_string();
            if !title.is_empty() {
                return title;
            }
        }
    }
    String::new()
}

/// Pick the main content container and collect its text lines.
fn extract_lines(doc: &Html) -> Vec<String> {
    let root = main_content(doc);

    let mut lines = Vec::new();
    if let Some(el) = root {
        collect_lines(el, &mut lines);
    }
    lines
}

/// First matching content container, else the document body.
fn main_content(doc: &Html) -> Option<ElementRef<'_>> {
    for sel_str in CONTENT_SELECTORS {
        let sel = Selector::parse(sel_str).expect("valid selector");
        if let Some(el) = doc.select(&sel).next() {
            return Some(el);
        }
    }

    let body = Selector::parse("body").expect("valid selector");
    doc.select(&body).next()
}

/// Walk the subtree in document order, skipping boilerplate elements and
/// pushing each trimmed non-empty text node as one line.
fn collect_lines(el: ElementRef<'_>, out: &mut Vec<String>) {
    for child in el.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if !is_boilerplate(child_el) {
                collect_lines(child_el, out);
            }
        } else if let Node::Text(text) = child.value() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        }
    }
}

/// True when an element roots a known boilerplate subtree.
fn is_boilerplate(el: ElementRef<'_>) -> bool {
    let value = el.value();
    if SKIP_TAGS.contains(&value.name()) {
        return true;
    }
    value
        .classes()
        .any(|class| SKIP_CLASSES.contains(&class))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    #[test]
    fn title_prefers_pagetitle_class() {
        let html = r#"
            <html><head><title>Doc Title</title></head>
            <body><h1 class="pagetitle">华为 P30 电池更换</h1><h1>Other</h1></body></html>
        "#;
        let page = extract_page(html);
        assert_eq!(page.title, "华为 P30 电池更换");
    }

    #[test]
    fn title_falls_back_to_h1_then_title() {
        let html = r#"<html><head><title>Fallback</title></head><body><p>no headings</p></body></html>"#;
        let page = extract_page(html);
        assert_eq!(page.title, "Fallback");

        let html = r#"<html><body><h1>Heading</h1></body></html>"#;
        let page = extract_page(html);
        assert_eq!(page.title, "Heading");
    }

    #[test]
    fn empty_title_candidates_are_skipped() {
        let html = r#"
            <html><head><title>From Title Tag</title></head>
            <body><h1 class="pagetitle">  </h1></body></html>
        "#;
        let page = extract_page(html);
        assert_eq!(page.title, "From Title Tag");
    }

    #[test]
    fn content_prefers_article_over_body() {
        let html = r#"
            <html><body>
              <nav>site nav</nav>
              <article><p>第一步：关闭电源。</p><p>第二步：拆下后盖。</p></article>
              <footer>footer text</footer>
            </body></html>
        "#;
        let page = extract_page(html);
        assert_eq!(page.lines, vec!["第一步：关闭电源。", "第二步：拆下后盖。"]);
    }

    #[test]
    fn boilerplate_subtrees_are_skipped() {
        let html = r#"
            <html><body>
              <div class="guide-content">
                <div class="breadcrumb">首页 > 指南</div>
                <p>拧下两颗螺丝。</p>
                <aside>related links</aside>
                <div class="comments">网友评论</div>
                <script>analytics();</script>
                <p>断开电池排线。</p>
              </div>
            </body></html>
        "#;
        let page = extract_page(html);
        assert_eq!(page.lines, vec!["拧下两颗螺丝。", "断开电池排线。"]);
    }

    #[test]
    fn falls_back_to_body_when_no_container_matches() {
        let html = r#"<html><body><p>plain page text</p></body></html>"#;
        let page = extract_page(html);
        assert_eq!(page.lines, vec!["plain page text"]);
    }

    #[test]
    fn guide_fixture_extracts_steps() {
        let page = extract_page(&load_fixture("guide.html"));
        assert_eq!(page.title, "华为 P30 Pro 电池更换");
        let content = page.lines.join("\n");
        assert!(content.contains("步骤 1"));
        assert!(content.contains("撬棒"));
        // Chrome containers must not leak into the content
        assert!(!content.contains("面包屑"));
        assert!(!content.contains("广告位"));
    }

    #[test]
    fn device_fixture_skips_nav_chrome() {
        let page = extract_page(&load_fixture("device.html"));
        let content = page.lines.join("\n");
        assert!(content.contains("维修概述"));
        assert!(!content.contains("站点导航"));
    }
}

//! 候选元素选择器
//!
//! 按标签白名单粗选可能承载文本的元素。这里故意选得宽：精确判定交给
//! [`classifier`](super::classifier)，在元素进入视口时才做。

use markup5ever_rcdom::Handle;

use super::element::Element;
use crate::parsers::html::descendant_elements;

/// 可能直接承载文本的标签
pub const CANDIDATE_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "span", "a", "button", "blockquote",
    "figcaption", "td", "th", "div", "section", "article", "header", "footer", "main", "body",
];

/// 元素是否命中白名单
pub fn matches_candidate(element: &Element) -> bool {
    CANDIDATE_TAGS.contains(&element.tag_name())
}

/// 按文档顺序列出 `root` 子树中（不含 `root` 本身）所有命中白名单的元素
pub fn select_candidates(root: &Handle) -> Vec<Element> {
    descendant_elements(root)
        .into_iter()
        .filter_map(Element::new)
        .filter(matches_candidate)
        .collect()
}

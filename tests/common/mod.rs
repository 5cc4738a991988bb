// 集成测试公共模块
//
// HTML 夹具、DOM 查找与快照记录

use std::cell::RefCell;
use std::rc::Rc;

use markup5ever_rcdom::{Handle, RcDom};

use wordwise::monitor::{Element, MutationSource, TextMonitor, VisibilitySource};
use wordwise::parsers::html::{descendant_elements, get_node_attr, html_to_dom};

/// 一篇带包装层、列表与混合内容的文章
pub const ARTICLE_HTML: &str = r#"<html><head><title>学习</title><style>p { color: red; }</style></head><body>
<h1 id="title">学习中文</h1>
<div id="wrapper"><p id="intro">我很乐意提供帮助。</p></div>
<ul id="list"><li id="item">第一项</li></ul>
<p id="mixed">前言<span id="inner">内嵌</span></p>
</body></html>"#;

/// 由 `count` 个单行段落组成的长页面，段落 id 为 `p0`、`p1`……
pub fn long_page(count: usize) -> String {
    let mut html = String::from("<html><body>");
    for i in 0..count {
        html.push_str(&format!("<p id=\"p{i}\">段落{i}</p>"));
    }
    html.push_str("</body></html>");
    html
}

pub fn parse(html: &str) -> RcDom {
    html_to_dom(html.as_bytes(), "utf-8")
}

/// 按 id 查找元素
pub fn element_by_id(document: &Handle, id: &str) -> Element {
    descendant_elements(document)
        .into_iter()
        .find(|node| get_node_attr(node, "id").as_deref() == Some(id))
        .and_then(Element::new)
        .unwrap_or_else(|| panic!("no element with id {id}"))
}

/// 元素的 id（没有 id 时退回标签名）
pub fn ids(elements: &[Element]) -> Vec<String> {
    elements
        .iter()
        .map(|e| e.attr("id").unwrap_or_else(|| e.tag_name().to_string()))
        .collect()
}

/// 记录每次回调收到的快照
#[derive(Clone, Default)]
pub struct SnapshotRecorder {
    snapshots: Rc<RefCell<Vec<Vec<String>>>>,
}

impl SnapshotRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback(&self) -> impl FnMut(&[Element]) + 'static {
        let snapshots = self.snapshots.clone();
        move |snapshot: &[Element]| snapshots.borrow_mut().push(ids(snapshot))
    }

    pub fn count(&self) -> usize {
        self.snapshots.borrow().len()
    }

    pub fn last(&self) -> Option<Vec<String>> {
        self.snapshots.borrow().last().cloned()
    }

    pub fn all(&self) -> Vec<Vec<String>> {
        self.snapshots.borrow().clone()
    }
}

/// 可见集合必须是观察集合的子集
pub fn assert_visible_subset<V: VisibilitySource, M: MutationSource>(monitor: &TextMonitor<V, M>) {
    let observed = monitor.observation_set();
    for element in monitor.get_visible_elements() {
        assert!(
            observed.contains(&element),
            "visible element <{}> is not observed",
            element.tag_name()
        );
    }
}

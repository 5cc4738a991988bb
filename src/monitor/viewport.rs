//! 无头流式布局视口
//!
//! 没有真实渲染引擎时用来驱动监控器的 [`VisibilitySource`]。按文档顺序
//! 遍历 DOM，文本节点按折行数推进纵向游标，每个元素得到一个
//! `[top, bottom)` 盒子；视口是 `[scroll_top, scroll_top + height)`，
//! 有任意重叠即视为相交。
//!
//! 句柄可以 `Clone`：监控器持有一份作为事件源，宿主持有另一份负责滚动。

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use markup5ever_rcdom::{Handle, NodeData};

use super::element::Element;
use super::source::{IntersectionEntry, VisibilitySource};
use crate::parsers::html::{get_node_name, is_blank, trim_text};

/// 不参与布局的标签
const NON_RENDERED_TAGS: &[&str] = &["head", "script", "style", "template", "noscript"];

/// 视口参数（像素）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportConfig {
    pub height: usize,
    pub line_height: usize,
    pub chars_per_line: usize,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            height: 800,
            line_height: 24,
            chars_per_line: 40,
        }
    }
}

/// 元素盒子的纵向范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutBox {
    pub top: usize,
    pub bottom: usize,
}

impl LayoutBox {
    fn intersects(&self, view_top: usize, view_bottom: usize) -> bool {
        if self.top == self.bottom {
            return self.top >= view_top && self.top < view_bottom;
        }
        self.top < view_bottom && self.bottom > view_top
    }
}

struct ViewportState {
    config: ViewportConfig,
    root: Handle,
    scroll_top: usize,
    observed: Vec<Element>,
    members: HashSet<Element>,
    last_reported: HashMap<Element, bool>,
}

/// 流式布局视口
#[derive(Clone)]
pub struct FlowViewport {
    state: Rc<RefCell<ViewportState>>,
}

impl FlowViewport {
    pub fn new(document: &Handle, config: ViewportConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(ViewportState {
                config,
                root: document.clone(),
                scroll_top: 0,
                observed: Vec::new(),
                members: HashSet::new(),
                last_reported: HashMap::new(),
            })),
        }
    }

    pub fn config(&self) -> ViewportConfig {
        self.state.borrow().config
    }

    pub fn scroll_top(&self) -> usize {
        self.state.borrow().scroll_top
    }

    /// 整个文档的估算高度
    pub fn document_height(&self) -> usize {
        let state = self.state.borrow();
        let mut layout = Layout::new(state.config);
        layout.walk(&state.root);
        layout.cursor
    }

    /// 元素当前的盒子；未挂在文档上或不参与布局时为 `None`
    pub fn box_of(&self, element: &Element) -> Option<LayoutBox> {
        let state = self.state.borrow();
        let mut layout = Layout::new(state.config);
        layout.walk(&state.root);
        layout.boxes.get(element).copied()
    }

    /// 滚动到指定位置并返回状态变化
    pub fn scroll_to(&self, top: usize) -> Vec<IntersectionEntry> {
        self.state.borrow_mut().scroll_top = top;
        self.evaluate()
    }

    pub fn scroll_by(&self, delta: usize) -> Vec<IntersectionEntry> {
        let top = self.scroll_top().saturating_add(delta);
        self.scroll_to(top)
    }

    /// 重新计算布局
    ///
    /// 为新观察的元素报告一次初始状态，为相交状态发生变化的元素报告新状态，
    /// 其余元素不产生事件。
    pub fn evaluate(&self) -> Vec<IntersectionEntry> {
        let mut state = self.state.borrow_mut();
        let mut layout = Layout::new(state.config);
        layout.walk(&state.root);

        let view_top = state.scroll_top;
        let view_bottom = view_top + state.config.height;

        let mut entries = Vec::new();
        let observed = state.observed.clone();
        for element in observed {
            let intersecting = element.is_connected()
                && layout
                    .boxes
                    .get(&element)
                    .is_some_and(|b| b.intersects(view_top, view_bottom));

            if state.last_reported.get(&element) != Some(&intersecting) {
                state.last_reported.insert(element.clone(), intersecting);
                entries.push(IntersectionEntry::new(element, intersecting));
            }
        }

        tracing::trace!(
            "视口 [{}, {}) 评估完成，{} 个状态变化",
            view_top,
            view_bottom,
            entries.len()
        );
        entries
    }

    pub fn observed_count(&self) -> usize {
        self.state.borrow().observed.len()
    }
}

impl VisibilitySource for FlowViewport {
    fn observe(&mut self, element: &Element) {
        let mut state = self.state.borrow_mut();
        if state.members.insert(element.clone()) {
            state.observed.push(element.clone());
        }
    }

    fn unobserve(&mut self, element: &Element) {
        let mut state = self.state.borrow_mut();
        if state.members.remove(element) {
            state.observed.retain(|e| e != element);
        }
        state.last_reported.remove(element);
    }

    fn disconnect(&mut self) {
        let mut state = self.state.borrow_mut();
        state.observed.clear();
        state.members.clear();
        state.last_reported.clear();
    }
}

struct Layout {
    config: ViewportConfig,
    cursor: usize,
    boxes: HashMap<Element, LayoutBox>,
}

impl Layout {
    fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            cursor: 0,
            boxes: HashMap::new(),
        }
    }

    fn walk(&mut self, node: &Handle) {
        match &node.data {
            NodeData::Text { contents } => {
                let text = contents.borrow();
                if is_blank(&text) {
                    return;
                }
                let chars = trim_text(&text).chars().count();
                let per_line = self.config.chars_per_line.max(1);
                let lines = chars.div_ceil(per_line);
                self.cursor += lines * self.config.line_height;
            }
            NodeData::Element { .. } => {
                if get_node_name(node).is_some_and(|name| NON_RENDERED_TAGS.contains(&name)) {
                    return;
                }
                let top = self.cursor;
                self.walk_children(node);
                if let Some(element) = Element::new(node.clone()) {
                    self.boxes.insert(
                        element,
                        LayoutBox {
                            top,
                            bottom: self.cursor,
                        },
                    );
                }
            }
            NodeData::Document => self.walk_children(node),
            _ => {}
        }
    }

    fn walk_children(&mut self, node: &Handle) {
        for child in node.children.borrow().iter() {
            self.walk(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{detach_node, find_nodes, html_to_dom};

    fn config() -> ViewportConfig {
        ViewportConfig {
            height: 100,
            line_height: 20,
            chars_per_line: 10,
        }
    }

    fn paragraphs(dom: &markup5ever_rcdom::RcDom) -> Vec<Element> {
        find_nodes(&dom.document, &["p"])
            .into_iter()
            .filter_map(Element::new)
            .collect()
    }

    #[test]
    fn test_layout_boxes() {
        // 每段 15 个字符 => 2 行 => 40px
        let dom = html_to_dom(
            b"<p>aaaaaaaaaaaaaaa</p><p>bbbbbbbbbbbbbbb</p><p>ccccccccccccccc</p>",
            "utf-8",
        );
        let viewport = FlowViewport::new(&dom.document, config());
        let ps = paragraphs(&dom);

        assert_eq!(viewport.box_of(&ps[0]), Some(LayoutBox { top: 0, bottom: 40 }));
        assert_eq!(viewport.box_of(&ps[2]), Some(LayoutBox { top: 80, bottom: 120 }));
        assert_eq!(viewport.document_height(), 120);
    }

    #[test]
    fn test_initial_report_then_changes_only() {
        let dom = html_to_dom(
            b"<p>aaaaaaaaaaaaaaa</p><p>bbbbbbbbbbbbbbb</p><p>ccccccccccccccc</p>",
            "utf-8",
        );
        let mut viewport = FlowViewport::new(&dom.document, config());
        let ps = paragraphs(&dom);
        for p in &ps {
            viewport.observe(p);
        }

        let entries = viewport.evaluate();
        let states: Vec<bool> = entries.iter().map(|e| e.is_intersecting).collect();
        assert_eq!(states, vec![true, true, true]);

        assert!(viewport.evaluate().is_empty());

        // 视口 [60, 160)：第一段 [0, 40) 离开
        let entries = viewport.scroll_to(60);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target, ps[0]);
        assert!(!entries[0].is_intersecting);
    }

    #[test]
    fn test_observe_is_idempotent() {
        let dom = html_to_dom(b"<p>aaaa</p><p>bbbb</p>", "utf-8");
        let mut viewport = FlowViewport::new(&dom.document, config());
        let ps = paragraphs(&dom);

        viewport.observe(&ps[0]);
        viewport.observe(&ps[0]);
        viewport.observe(&ps[1]);
        assert_eq!(viewport.observed_count(), 2);
        assert_eq!(viewport.evaluate().len(), 2);

        viewport.unobserve(&ps[0]);
        viewport.unobserve(&ps[0]);
        assert_eq!(viewport.observed_count(), 1);

        // 重新观察后再次报告初始状态
        viewport.observe(&ps[0]);
        let entries = viewport.evaluate();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target, ps[0]);
    }

    #[test]
    fn test_detached_element_is_not_intersecting() {
        let dom = html_to_dom(b"<p>aaaa</p>", "utf-8");
        let mut viewport = FlowViewport::new(&dom.document, config());
        let p = paragraphs(&dom).remove(0);
        viewport.observe(&p);
        assert!(viewport.evaluate()[0].is_intersecting);

        detach_node(p.handle());
        let entries = viewport.evaluate();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_intersecting);
    }

    #[test]
    fn test_script_and_style_take_no_space() {
        let dom = html_to_dom(
            b"<style>p { color: red }</style><script>var x = 1;</script><p>aaaa</p>",
            "utf-8",
        );
        let viewport = FlowViewport::new(&dom.document, config());
        let p = paragraphs(&dom).remove(0);
        assert_eq!(viewport.box_of(&p), Some(LayoutBox { top: 0, bottom: 20 }));
    }
}

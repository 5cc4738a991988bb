//! 结构变更跟踪
//!
//! 新插入的白名单元素（及其白名单后代）只登记到可见性跟踪器，不做同步
//! 可见性判定，等事件源下一轮评估时再决定是否进入可见集合。被移除的
//! 节点及其后代立即退出观察并从可见集合删除。

use markup5ever_rcdom::Handle;

use super::element::Element;
use super::selector::matches_candidate;
use super::source::{MutationRecord, MutationSource, VisibilitySource};
use super::visibility::VisibilityTracker;
use super::visible_set::VisibleSet;

/// 结构变更处理结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MutationOutcome {
    pub changed: bool,
    pub registered: usize,
    pub unregistered: usize,
}

/// 结构变更跟踪器
pub struct MutationTracker<M> {
    source: M,
    connected: bool,
}

impl<M: MutationSource> MutationTracker<M> {
    pub fn new(source: M) -> Self {
        Self {
            source,
            connected: false,
        }
    }

    /// 开始观察 `root` 子树，已连接时无副作用
    pub fn connect(&mut self, root: &Handle) {
        if self.connected {
            return;
        }
        self.source.observe(root);
        self.connected = true;
    }

    pub fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        self.source.disconnect();
        self.connected = false;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn source(&self) -> &M {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut M {
        &mut self.source
    }

    /// 处理一批结构变更
    pub fn apply_batch<V: VisibilitySource>(
        &self,
        records: &[MutationRecord],
        visibility: &mut VisibilityTracker<V>,
        visible: &mut VisibleSet,
    ) -> MutationOutcome {
        let mut outcome = MutationOutcome::default();

        for record in records {
            for node in &record.added_nodes {
                let Some(element) = Element::new(node.clone()) else {
                    continue;
                };

                let candidates = std::iter::once(element.clone())
                    .chain(element.descendants())
                    .filter(matches_candidate);
                for candidate in candidates {
                    if visibility.observe(&candidate) {
                        outcome.registered += 1;
                    }
                }
            }

            for node in &record.removed_nodes {
                let Some(element) = Element::new(node.clone()) else {
                    continue;
                };

                for removed in std::iter::once(element.clone()).chain(element.descendants()) {
                    if visibility.unobserve(&removed) {
                        outcome.unregistered += 1;
                    }
                    if visible.delete(&removed) {
                        outcome.changed = true;
                    }
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{find_nodes, html_to_dom};

    #[derive(Default)]
    struct NullVisibility;

    impl VisibilitySource for NullVisibility {
        fn observe(&mut self, _element: &Element) {}
        fn unobserve(&mut self, _element: &Element) {}
        fn disconnect(&mut self) {}
    }

    #[derive(Default)]
    struct NullMutations {
        observes: usize,
        disconnects: usize,
    }

    impl MutationSource for NullMutations {
        fn observe(&mut self, _root: &Handle) {
            self.observes += 1;
        }
        fn disconnect(&mut self) {
            self.disconnects += 1;
        }
    }

    #[test]
    fn test_connect_is_idempotent() {
        let dom = html_to_dom(b"<p>a</p>", "utf-8");
        let mut tracker = MutationTracker::new(NullMutations::default());
        tracker.connect(&dom.document);
        tracker.connect(&dom.document);
        assert_eq!(tracker.source().observes, 1);

        tracker.disconnect();
        tracker.disconnect();
        assert_eq!(tracker.source().disconnects, 1);
        assert!(!tracker.is_connected());
    }

    #[test]
    fn test_added_subtree_registers_candidates_only() {
        let dom = html_to_dom(b"<section><p>a</p><em>b</em><span>c</span></section>", "utf-8");
        let section = find_nodes(&dom.document, &["section"]).remove(0);

        let tracker = MutationTracker::new(NullMutations::default());
        let mut visibility = VisibilityTracker::new(NullVisibility);
        let mut visible = VisibleSet::new();

        let record = MutationRecord {
            target: dom.document.clone(),
            added_nodes: vec![section.clone()],
            removed_nodes: vec![],
        };
        let outcome = tracker.apply_batch(&[record], &mut visibility, &mut visible);

        // section、p、span；em 不在白名单
        assert_eq!(outcome.registered, 3);
        assert!(!outcome.changed);
        assert!(visible.is_empty());
    }

    #[test]
    fn test_removed_subtree_leaves_visible_set() {
        let dom = html_to_dom(b"<div><p>a</p><p>b</p></div>", "utf-8");
        let div = find_nodes(&dom.document, &["div"]).remove(0);
        let ps: Vec<Element> = find_nodes(&dom.document, &["p"])
            .into_iter()
            .filter_map(Element::new)
            .collect();

        let tracker = MutationTracker::new(NullMutations::default());
        let mut visibility = VisibilityTracker::new(NullVisibility);
        let mut visible = VisibleSet::new();
        for p in &ps {
            visibility.observe(p);
            visible.add(p);
        }

        let record = MutationRecord {
            target: dom.document.clone(),
            added_nodes: vec![],
            removed_nodes: vec![div],
        };
        let outcome = tracker.apply_batch(&[record], &mut visibility, &mut visible);

        assert!(outcome.changed);
        assert_eq!(outcome.unregistered, 2);
        assert!(visible.is_empty());
        assert!(visibility.observation_set().is_empty());
    }
}

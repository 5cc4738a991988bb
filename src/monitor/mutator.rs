//! 可记录的 DOM 变更源
//!
//! 所有对页面结构的修改都经过 [`DomMutator`]，连接期间落在观察根子树内
//! 的子节点增删会被记成 [`MutationRecord`]，由宿主用 `take_records()`
//! 取出一批交给监控器。

use std::cell::RefCell;
use std::rc::Rc;

use markup5ever_rcdom::Handle;

use super::source::{MutationRecord, MutationSource};
use crate::parsers::html::{append_child, create_text_node, detach_node, get_parent_node};

#[derive(Default)]
struct MutatorState {
    root: Option<Handle>,
    records: Vec<MutationRecord>,
}

/// DOM 变更执行器与记录器
#[derive(Clone, Default)]
pub struct DomMutator {
    state: Rc<RefCell<MutatorState>>,
}

impl DomMutator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 把 `child` 追加到 `parent` 末尾；若 `child` 原来有父节点，同时记录一次移除
    pub fn append_child(&self, parent: &Handle, child: &Handle) {
        let old_parent = get_parent_node(child);
        append_child(parent, child);

        if let Some(old_parent) = old_parent {
            self.record(&old_parent, Vec::new(), vec![child.clone()]);
        }
        self.record(parent, vec![child.clone()], Vec::new());
    }

    /// 创建文本节点并追加到 `parent`
    pub fn append_text(&self, parent: &Handle, text: &str) -> Handle {
        let node = create_text_node(text);
        self.append_child(parent, &node);
        node
    }

    /// 把节点从文档中摘下，返回原父节点
    pub fn remove(&self, node: &Handle) -> Option<Handle> {
        let parent = detach_node(node)?;
        self.record(&parent, Vec::new(), vec![node.clone()]);
        Some(parent)
    }

    /// 从 `parent` 移除 `child`；`child` 不是 `parent` 的子节点时返回 `false`
    pub fn remove_child(&self, parent: &Handle, child: &Handle) -> bool {
        let is_child = get_parent_node(child).is_some_and(|p| Rc::ptr_eq(&p, parent));
        if !is_child {
            return false;
        }
        self.remove(child).is_some()
    }

    /// 取出目前积累的全部记录
    pub fn take_records(&self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.state.borrow_mut().records)
    }

    pub fn pending_records(&self) -> usize {
        self.state.borrow().records.len()
    }

    pub fn is_observing(&self) -> bool {
        self.state.borrow().root.is_some()
    }

    fn record(&self, target: &Handle, added_nodes: Vec<Handle>, removed_nodes: Vec<Handle>) {
        let mut state = self.state.borrow_mut();
        let Some(root) = state.root.as_ref() else {
            return;
        };
        if !is_inclusive_descendant(target, root) {
            return;
        }
        state.records.push(MutationRecord {
            target: target.clone(),
            added_nodes,
            removed_nodes,
        });
    }
}

impl MutationSource for DomMutator {
    fn observe(&mut self, root: &Handle) {
        self.state.borrow_mut().root = Some(root.clone());
    }

    fn disconnect(&mut self) {
        let mut state = self.state.borrow_mut();
        state.root = None;
        state.records.clear();
    }
}

fn is_inclusive_descendant(node: &Handle, root: &Handle) -> bool {
    let mut current = node.clone();
    loop {
        if Rc::ptr_eq(&current, root) {
            return true;
        }
        match get_parent_node(&current) {
            Some(parent) => current = parent,
            None => return false,
        }
    }
}

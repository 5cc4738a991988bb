//! 可见元素集合
//!
//! 监控器唯一的对外状态。保持集合语义（无重复），快照按插入顺序输出，
//! 不保证与文档顺序一致。

use std::collections::HashSet;

use super::element::Element;

/// 当前可见且直接承载文本的元素
#[derive(Debug, Default)]
pub struct VisibleSet {
    order: Vec<Element>,
    members: HashSet<Element>,
}

impl VisibleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入元素，已存在时返回 `false`
    pub fn add(&mut self, element: &Element) -> bool {
        if !self.members.insert(element.clone()) {
            return false;
        }
        self.order.push(element.clone());
        true
    }

    /// 移除元素，不存在时返回 `false`
    pub fn delete(&mut self, element: &Element) -> bool {
        if !self.members.remove(element) {
            return false;
        }
        self.order.retain(|e| e != element);
        true
    }

    pub fn has(&self, element: &Element) -> bool {
        self.members.contains(element)
    }

    /// 清空集合，返回清空前是否非空
    pub fn clear(&mut self) -> bool {
        let had_members = !self.order.is_empty();
        self.order.clear();
        self.members.clear();
        had_members
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 按插入顺序复制出当前成员
    pub fn snapshot(&self) -> Vec<Element> {
        self.order.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.order.iter()
    }
}

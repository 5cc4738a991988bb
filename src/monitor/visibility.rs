//! 可见性跟踪
//!
//! 包装一个 [`VisibilitySource`]，同时维护观察集合（ObservationSet）。
//! 每批相交事件先做直接文本判定，再更新可见集合；整批处理完后只报告一次
//! 是否发生了变化，由控制器决定是否通知外部。

use std::collections::HashSet;

use super::classifier::is_direct_text_container;
use super::element::Element;
use super::source::{IntersectionEntry, VisibilitySource};
use super::visible_set::VisibleSet;

/// 相交事件处理结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionOutcome {
    /// 可见集合是否真的发生了变化
    pub changed: bool,
    /// 因不含直接文本而被永久移出观察的元素数
    pub retired: usize,
    /// 针对已不在观察集合中的元素的过期事件数
    pub stale: usize,
}

/// 可见性跟踪器
pub struct VisibilityTracker<V> {
    source: V,
    observed: HashSet<Element>,
    order: Vec<Element>,
}

impl<V: VisibilitySource> VisibilityTracker<V> {
    pub fn new(source: V) -> Self {
        Self {
            source,
            observed: HashSet::new(),
            order: Vec::new(),
        }
    }

    /// 开始观察元素，已在观察中时返回 `false`
    pub fn observe(&mut self, element: &Element) -> bool {
        if !self.observed.insert(element.clone()) {
            return false;
        }
        self.order.push(element.clone());
        self.source.observe(element);
        true
    }

    /// 停止观察元素，未在观察中时返回 `false`
    pub fn unobserve(&mut self, element: &Element) -> bool {
        if !self.observed.remove(element) {
            return false;
        }
        self.order.retain(|e| e != element);
        self.source.unobserve(element);
        true
    }

    /// 停止观察全部元素
    pub fn disconnect(&mut self) {
        self.source.disconnect();
        self.observed.clear();
        self.order.clear();
    }

    pub fn is_observed(&self, element: &Element) -> bool {
        self.observed.contains(element)
    }

    /// 当前观察集合
    pub fn observation_set(&self) -> &HashSet<Element> {
        &self.observed
    }

    /// 按开始观察的先后顺序列出观察集合
    pub fn observed_elements(&self) -> &[Element] {
        &self.order
    }

    pub fn source(&self) -> &V {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut V {
        &mut self.source
    }

    /// 处理一批相交事件
    ///
    /// 判定失败的元素被永久移出观察，即使之后文本发生变化也不会再被考察；
    /// 若它当时还在可见集合中，也一并移除，保证可见集合始终是观察集合的子集。
    pub fn apply_batch(
        &mut self,
        entries: &[IntersectionEntry],
        visible: &mut VisibleSet,
    ) -> IntersectionOutcome {
        let mut outcome = IntersectionOutcome::default();

        for entry in entries {
            let element = &entry.target;

            // 已排队但在 unobserve/disconnect/reset 之后才送达的事件
            if !self.is_observed(element) {
                outcome.stale += 1;
                continue;
            }

            if !is_direct_text_container(element) {
                self.unobserve(element);
                outcome.retired += 1;
                if visible.delete(element) {
                    outcome.changed = true;
                }
                continue;
            }

            let changed = if entry.is_intersecting {
                visible.add(element)
            } else {
                visible.delete(element)
            };
            outcome.changed |= changed;
        }

        if outcome.stale > 0 {
            tracing::debug!("忽略 {} 个过期的相交事件", outcome.stale);
        }

        outcome
    }
}

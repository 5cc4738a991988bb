//! 事件源接口
//!
//! 监控器不直接依赖浏览器 API，而是依赖两种能力：
//! 视口相交事件源与 DOM 结构变更事件源。宿主（浏览器绑定、无头布局、
//! 测试桩）各自实现这两个 trait，并把批量事件交给监控器处理。

use std::fmt;

use markup5ever_rcdom::Handle;

use super::element::Element;
use crate::parsers::html::get_node_name;

/// 单个元素的相交状态变化
#[derive(Debug, Clone)]
pub struct IntersectionEntry {
    pub target: Element,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    pub fn new(target: Element, is_intersecting: bool) -> Self {
        Self {
            target,
            is_intersecting,
        }
    }
}

/// 一次子节点列表变更
///
/// 与浏览器的 `MutationRecord` 一样，新增/移除的可能是文本节点。
#[derive(Clone)]
pub struct MutationRecord {
    pub target: Handle,
    pub added_nodes: Vec<Handle>,
    pub removed_nodes: Vec<Handle>,
}

impl fmt::Debug for MutationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationRecord")
            .field("target", &get_node_name(&self.target))
            .field("added_nodes", &self.added_nodes.len())
            .field("removed_nodes", &self.removed_nodes.len())
            .finish()
    }
}

/// 视口相交事件源
///
/// 语义对应根为视口、margin 为 0、阈值接近 0 的相交观察器：
/// 元素与视口有任意重叠即视为相交。新观察的元素应在下一次评估时
/// 报告一次初始状态。
pub trait VisibilitySource {
    /// 开始观察；重复观察同一元素无副作用
    fn observe(&mut self, element: &Element);

    /// 停止观察；元素未被观察时无副作用
    fn unobserve(&mut self, element: &Element);

    /// 一次性停止观察全部元素
    fn disconnect(&mut self);
}

/// DOM 结构变更事件源（子树内的子节点列表变化）
pub trait MutationSource {
    fn observe(&mut self, root: &Handle);

    fn disconnect(&mut self);
}

/// 监控器事件
///
/// 宿主可以把两个事件源与控制指令汇入同一个通道，由
/// [`TextMonitor::run`](super::TextMonitor::run) 顺序消费。
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    Intersections(Vec<IntersectionEntry>),
    Mutations(Vec<MutationRecord>),
    Start,
    Pause,
    Reset,
    /// 客户端路由切换（pushState / replaceState / popstate / hashchange）
    RouteChange { url: String },
}

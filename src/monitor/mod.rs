//! 可见性驱动的直接文本监控
//!
//! 随着用户滚动和页面变化，持续给出“当前在视口内、并且直接承载文本”
//! 的元素集合：
//!
//! - [`selector`] 构造时按标签白名单粗选候选元素
//! - [`classifier`] 判定元素是否有非空白的直接文本子节点
//! - [`visibility`] / [`mutation`] 分别处理相交事件批次与结构变更批次
//! - [`visible_set`] 保存唯一的对外状态
//! - [`controller`] 对外的启动 / 暂停 / 重置状态机
//!
//! 浏览器能力被抽象成 [`VisibilitySource`] 与 [`MutationSource`]；
//! [`FlowViewport`] 与 [`DomMutator`] 是基于 rcdom 的无头实现。

pub mod classifier;
pub mod controller;
pub mod element;
pub mod mutation;
pub mod mutator;
pub mod selector;
pub mod source;
pub mod viewport;
pub mod visibility;
pub mod visible_set;

pub use classifier::is_direct_text_container;
pub use controller::{MonitorState, MonitorStats, SnapshotCallback, TextMonitor};
pub use element::Element;
pub use mutation::{MutationOutcome, MutationTracker};
pub use mutator::DomMutator;
pub use selector::{matches_candidate, select_candidates, CANDIDATE_TAGS};
pub use source::{IntersectionEntry, MonitorEvent, MutationRecord, MutationSource, VisibilitySource};
pub use viewport::{FlowViewport, LayoutBox, ViewportConfig};
pub use visibility::{IntersectionOutcome, VisibilityTracker};
pub use visible_set::VisibleSet;

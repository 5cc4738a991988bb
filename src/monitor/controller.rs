//! 监控控制器
//!
//! 对外的状态机（Stopped / Running / Paused），独占观察集合、可见集合与
//! 两个跟踪器。所有处理都在单线程事件循环上进行：一批事件完全应用之后
//! 才会触发一次回调，消费者永远看不到半更新的集合。

use std::collections::HashSet;

use markup5ever_rcdom::Handle;
use tokio::sync::mpsc;

use super::element::Element;
use super::mutation::MutationTracker;
use super::selector::select_candidates;
use super::source::{IntersectionEntry, MonitorEvent, MutationRecord, MutationSource, VisibilitySource};
use super::visibility::VisibilityTracker;
use super::visible_set::VisibleSet;
use crate::parsers::html::find_nodes;

/// 可见集合变化时的回调，参数为当前快照
pub type SnapshotCallback = Box<dyn FnMut(&[Element])>;

/// 监控状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorState {
    #[default]
    Stopped,
    Running,
    Paused,
}

/// 运行统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MonitorStats {
    pub intersection_batches: usize,
    pub mutation_batches: usize,
    pub dropped_batches: usize,
    pub notifications: usize,
    pub retired_elements: usize,
}

/// 直接文本可见性监控器
pub struct TextMonitor<V, M> {
    state: MonitorState,
    visibility: VisibilityTracker<V>,
    mutation: MutationTracker<M>,
    visible: VisibleSet,
    initial_candidates: Vec<Element>,
    suspended: Option<Vec<Element>>,
    mutation_root: Handle,
    callback: SnapshotCallback,
    stats: MonitorStats,
}

impl<V: VisibilitySource, M: MutationSource> TextMonitor<V, M> {
    /// 创建监控器
    ///
    /// 构造时一次性从 `document` 中选出候选元素；结构变更观察挂在 body 上，
    /// 没有 body 时退回到整个文档。
    pub fn new<F>(document: &Handle, visibility_source: V, mutation_source: M, callback: F) -> Self
    where
        F: FnMut(&[Element]) + 'static,
    {
        let initial_candidates = select_candidates(document);
        let mutation_root = find_nodes(document, &["html", "body"])
            .into_iter()
            .next()
            .unwrap_or_else(|| document.clone());

        Self {
            state: MonitorState::Stopped,
            visibility: VisibilityTracker::new(visibility_source),
            mutation: MutationTracker::new(mutation_source),
            visible: VisibleSet::new(),
            initial_candidates,
            suspended: None,
            mutation_root,
            callback: Box::new(callback),
            stats: MonitorStats::default(),
        }
    }

    /// 开始监控；运行中重复调用无副作用
    ///
    /// 从暂停恢复时重新观察暂停前的整个观察集合（包括运行期间动态登记的
    /// 元素），已判定失败的元素不会回来；否则观察最初的候选元素。
    pub fn start(&mut self) {
        if self.state == MonitorState::Running {
            return;
        }

        let targets = self
            .suspended
            .take()
            .unwrap_or_else(|| self.initial_candidates.clone());
        for element in &targets {
            self.visibility.observe(element);
        }
        self.mutation.connect(&self.mutation_root);

        self.state = MonitorState::Running;
        tracing::info!("直接文本监控已启动，观察 {} 个元素", targets.len());
    }

    /// 暂停监控：断开两个跟踪器，保留可见集合
    pub fn pause(&mut self) {
        if self.state != MonitorState::Running {
            return;
        }

        self.suspended = Some(self.visibility.observed_elements().to_vec());
        self.visibility.disconnect();
        self.mutation.disconnect();

        self.state = MonitorState::Paused;
        tracing::info!("直接文本监控已暂停");
    }

    /// 清除上一个视图残留的状态
    ///
    /// 清空可见集合并断开可见性跟踪器；运行中会重新观察最初的候选元素
    /// （不含运行期间动态发现的元素），非运行状态下留待下次 `start()`。
    /// 无论集合此前是否为空，都会以空快照通知一次。
    pub fn reset(&mut self) {
        self.visible.clear();
        self.visibility.disconnect();
        self.suspended = None;

        if self.state == MonitorState::Running {
            for element in &self.initial_candidates {
                self.visibility.observe(element);
            }
        }

        tracing::info!("直接文本监控状态已重置 ({:?})", self.state);
        self.notify();
    }

    /// 处理一批相交事件
    pub fn handle_intersections(&mut self, entries: &[IntersectionEntry]) {
        if self.state != MonitorState::Running {
            self.stats.dropped_batches += 1;
            tracing::debug!("监控未运行，丢弃 {} 个相交事件", entries.len());
            return;
        }

        self.stats.intersection_batches += 1;
        let outcome = self.visibility.apply_batch(entries, &mut self.visible);
        self.stats.retired_elements += outcome.retired;

        tracing::debug!(
            "相交批次: {} 个事件，移出观察 {} 个，可见 {} 个",
            entries.len(),
            outcome.retired,
            self.visible.len()
        );

        if outcome.changed {
            self.notify();
        }
    }

    /// 处理一批结构变更
    pub fn handle_mutations(&mut self, records: &[MutationRecord]) {
        if self.state != MonitorState::Running {
            self.stats.dropped_batches += 1;
            tracing::debug!("监控未运行，丢弃 {} 条变更记录", records.len());
            return;
        }

        self.stats.mutation_batches += 1;
        let outcome = self
            .mutation
            .apply_batch(records, &mut self.visibility, &mut self.visible);

        tracing::debug!(
            "变更批次: {} 条记录，新登记 {} 个，注销 {} 个",
            records.len(),
            outcome.registered,
            outcome.unregistered
        );

        if outcome.changed {
            self.notify();
        }
    }

    /// 处理单个事件
    pub fn dispatch(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::Intersections(entries) => self.handle_intersections(&entries),
            MonitorEvent::Mutations(records) => self.handle_mutations(&records),
            MonitorEvent::Start => self.start(),
            MonitorEvent::Pause => self.pause(),
            MonitorEvent::Reset => self.reset(),
            MonitorEvent::RouteChange { url } => {
                tracing::info!("路由切换: {}", url);
                self.reset();
            }
        }
    }

    /// 顺序消费事件通道，直到所有发送端关闭
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<MonitorEvent>) {
        while let Some(event) = events.recv().await {
            self.dispatch(event);
        }
        tracing::debug!("监控事件通道已关闭");
    }

    /// 当前可见元素快照
    pub fn get_visible_elements(&self) -> Vec<Element> {
        self.visible.snapshot()
    }

    pub fn get_visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn is_monitoring(&self) -> bool {
        self.state == MonitorState::Running
    }

    /// 当前观察集合
    pub fn observation_set(&self) -> &HashSet<Element> {
        self.visibility.observation_set()
    }

    pub fn initial_candidates(&self) -> &[Element] {
        &self.initial_candidates
    }

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    pub fn visibility_source(&self) -> &V {
        self.visibility.source()
    }

    pub fn visibility_source_mut(&mut self) -> &mut V {
        self.visibility.source_mut()
    }

    pub fn mutation_source(&self) -> &M {
        self.mutation.source()
    }

    pub fn mutation_source_mut(&mut self) -> &mut M {
        self.mutation.source_mut()
    }

    fn notify(&mut self) {
        self.stats.notifications += 1;
        let snapshot = self.visible.snapshot();
        (self.callback)(&snapshot);
    }
}

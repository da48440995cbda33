//! 文档变更监听模块
//!
//! 首次处理完成后，新插入的内容通过这里重新进入调度器。
//! 一个去抖窗口内的变更合并为一次发现过程。

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use markup5ever_rcdom::Handle;
use tokio::sync::mpsc::UnboundedReceiver;

use super::batch::{ChunkedScheduler, RunSummary};
use super::collector::{CollectionStats, TextUnit, TextUnits};
use super::filters::NodeFilter;
use crate::parsers::html::dom::{contains, is_connected};

/// 文档结构变更记录
#[derive(Debug, Clone)]
pub enum MutationRecord {
    /// 子节点变更
    ChildList { target: Handle, added: Vec<Handle> },
    /// 属性变更
    Attributes { target: Handle, name: String },
}

impl MutationRecord {
    pub fn child_list(target: &Handle, added: Vec<Handle>) -> Self {
        MutationRecord::ChildList {
            target: target.clone(),
            added,
        }
    }

    pub fn attributes(target: &Handle, name: &str) -> Self {
        MutationRecord::Attributes {
            target: target.clone(),
            name: name.to_string(),
        }
    }
}

/// 去抖状态
#[derive(Debug)]
pub enum DebounceState<T> {
    Idle,
    Pending { items: Vec<T>, deadline: Instant },
}

/// 去抖器
///
/// 每次 `push` 都把截止时间推迟到 `now + window`；
/// 截止时间到达且期间没有新输入时，`poll` 交出累积的全部条目，回到空闲状态。
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    state: DebounceState<T>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: DebounceState::Idle,
        }
    }

    pub fn push(&mut self, new_items: impl IntoIterator<Item = T>, now: Instant) {
        let deadline = now + self.window;
        match &mut self.state {
            DebounceState::Idle => {
                self.state = DebounceState::Pending {
                    items: new_items.into_iter().collect(),
                    deadline,
                };
            }
            DebounceState::Pending {
                items,
                deadline: current,
            } => {
                items.extend(new_items);
                *current = deadline;
            }
        }
    }

    pub fn poll(&mut self, now: Instant) -> Option<Vec<T>> {
        match &self.state {
            DebounceState::Pending { deadline, .. } if *deadline <= now => self.flush(),
            _ => None,
        }
    }

    /// 不等截止时间直接交出
    pub fn flush(&mut self) -> Option<Vec<T>> {
        match std::mem::replace(&mut self.state, DebounceState::Idle) {
            DebounceState::Pending { items, .. } => Some(items),
            DebounceState::Idle => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            DebounceState::Pending { deadline, .. } => Some(*deadline),
            DebounceState::Idle => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }
}

/// 监听统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatcherStats {
    pub records_received: usize,
    pub ignored_attributes: usize,
    pub ignored_targets: usize,
    pub ignored_detached: usize,
    pub nodes_coalesced: usize,
    pub discovery_passes: usize,
    pub units_fed: usize,
}

/// 变更监听器
pub struct MutationWatcher {
    filter: NodeFilter,
    scheduler: Rc<ChunkedScheduler>,
    debouncer: RefCell<Debouncer<MutationRecord>>,
    stats: RefCell<WatcherStats>,
    collection: RefCell<CollectionStats>,
}

impl MutationWatcher {
    pub fn new(filter: NodeFilter, scheduler: Rc<ChunkedScheduler>, window: Duration) -> Self {
        Self {
            filter,
            scheduler,
            debouncer: RefCell::new(Debouncer::new(window)),
            stats: RefCell::new(WatcherStats::default()),
            collection: RefCell::new(CollectionStats::default()),
        }
    }

    pub fn get_stats(&self) -> WatcherStats {
        self.stats.borrow().clone()
    }

    pub fn collection_stats(&self) -> CollectionStats {
        self.collection.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.borrow().is_pending()
    }

    /// 接收一组变更记录
    pub fn observe(&self, records: Vec<MutationRecord>) {
        self.stats.borrow_mut().records_received += records.len();
        let now = self.scheduler.host().now();
        self.debouncer.borrow_mut().push(records, now);
    }

    /// 去抖窗口已过时执行一次发现并交给调度器
    ///
    /// 调度器正在运行时保留待处理的变更，下次再试。
    pub async fn flush_due(&self) -> Option<RunSummary> {
        if self.scheduler.is_running() {
            return None;
        }

        let now = self.scheduler.host().now();
        let records = self.debouncer.borrow_mut().poll(now)?;
        Some(self.process(records).await)
    }

    async fn flush_all(&self) -> Option<RunSummary> {
        if !self.is_pending() {
            return None;
        }
        self.scheduler.wait_idle().await;
        let records = self.debouncer.borrow_mut().flush()?;
        Some(self.process(records).await)
    }

    async fn process(&self, records: Vec<MutationRecord>) -> RunSummary {
        let units = self.discover(records);
        self.stats.borrow_mut().units_fed += units.len();
        self.scheduler.run(units).await
    }

    /// 从变更记录中找出新增的文本单元
    pub fn discover(&self, records: Vec<MutationRecord>) -> Vec<TextUnit> {
        let mut stats = self.stats.borrow_mut();
        stats.discovery_passes += 1;

        let mut roots: Vec<Handle> = Vec::new();
        for record in records {
            match record {
                MutationRecord::Attributes { .. } => stats.ignored_attributes += 1,
                MutationRecord::ChildList { target, added } => {
                    if self.filter.is_ignored_target(&target) {
                        stats.ignored_targets += 1;
                        continue;
                    }
                    for node in added {
                        if !is_connected(&node) {
                            stats.ignored_detached += 1;
                        } else if roots.iter().any(|root| Rc::ptr_eq(root, &node)) {
                            stats.nodes_coalesced += 1;
                        } else {
                            roots.push(node);
                        }
                    }
                }
            }
        }

        // 只保留最外层的新增节点
        let outermost: Vec<Handle> = roots
            .iter()
            .filter(|node| {
                !roots
                    .iter()
                    .any(|other| !Rc::ptr_eq(other, node) && contains(other, node))
            })
            .cloned()
            .collect();
        stats.nodes_coalesced += roots.len() - outermost.len();

        let mut collection = self.collection.borrow_mut();
        let mut units = Vec::new();
        for root in &outermost {
            let mut iter = TextUnits::new(root, &self.filter);
            units.extend(iter.by_ref());
            collection.merge(iter.stats());
        }

        tracing::debug!(
            "变更发现: {} 个新增子树，{} 个文本单元",
            outermost.len(),
            units.len()
        );

        units
    }

    /// 持续监听变更，直到通道关闭
    ///
    /// 调度器运行期间不轮询，等它空闲后再检查去抖截止时间。
    /// 通道关闭时仍在等待的变更会立即处理。
    pub async fn watch(&self, mut receiver: UnboundedReceiver<Vec<MutationRecord>>) {
        tracing::info!("开始监听文档变更");

        loop {
            let deadline = self.debouncer.borrow().deadline();

            let Some(deadline) = deadline else {
                match receiver.recv().await {
                    Some(records) => self.observe(records),
                    None => break,
                }
                continue;
            };

            if self.scheduler.is_running() {
                tokio::select! {
                    received = receiver.recv() => match received {
                        Some(records) => self.observe(records),
                        None => break,
                    },
                    _ = self.scheduler.wait_idle() => {}
                }
                continue;
            }

            let host = self.scheduler.host().clone();
            let remaining = deadline.saturating_duration_since(host.now());

            tokio::select! {
                received = receiver.recv() => match received {
                    Some(records) => self.observe(records),
                    None => break,
                },
                _ = host.sleep(remaining) => {
                    if let Some(summary) = self.flush_due().await {
                        tracing::debug!("变更处理完成: {:?}", summary.outcome);
                    }
                }
            }
        }

        if let Some(summary) = self.flush_all().await {
            tracing::debug!("变更处理完成: {:?}", summary.outcome);
        }

        tracing::info!("变更监听结束");
    }
}

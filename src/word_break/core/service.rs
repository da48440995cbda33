//! 分词换行服务核心实现
//!
//! 本模块把节点选择、分块调度、DOM修改和变更监听串成完整的处理流程，
//! 是分词换行功能的主要入口点。
//!
//! ## 处理流程
//!
//! 1. **初始化**: 等待分词器就绪，失败时记录日志并放弃，不修改文档
//! 2. **首次处理**: 在目标容器内收集文本单元，交给分块调度器
//! 3. **持续监听**: 新插入的内容经去抖后重新进入同一调度器
//!
//! 所有运行共享一个调度器，因此同一时间最多只有一次运行在修改文档。
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use rwb::word_break::{ScriptTokenizer, Tokenizer, WordBreakConfig, WordBreakService};
//! use rwb::word_break::host::TokioHost;
//! use rwb::word_break::pipeline::TracingProgress;
//!
//! # async fn example(dom: markup5ever_rcdom::RcDom) {
//! let tokenizer = async {
//!     let tokenizer: Rc<dyn Tokenizer> = Rc::new(ScriptTokenizer::new()?);
//!     Ok::<_, rwb::word_break::WordBreakError>(tokenizer)
//! };
//!
//! if let Some(service) = WordBreakService::bootstrap(
//!     WordBreakConfig::default(),
//!     tokenizer,
//!     Rc::new(TokioHost),
//!     Rc::new(TracingProgress),
//! )
//! .await
//! {
//!     let summary = service.process_document(&dom).await;
//!     println!("处理了 {} 个文本单元", summary.processed);
//! }
//! # }
//! ```

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use markup5ever_rcdom::{Handle, RcDom};
use tokio::sync::mpsc::UnboundedReceiver;

use super::segmenter::{SegmentStats, Segmenter};
use super::tokenizer::Tokenizer;
use crate::parsers::html::parser::{find_targets, parse_selector_list, SimpleSelector};
use crate::word_break::config::WordBreakConfig;
use crate::word_break::error::{helpers, WordBreakResult};
use crate::word_break::host::Host;
use crate::word_break::pipeline::batch::{
    ChunkedScheduler, ProgressReporter, RunOutcome, RunSummary, SchedulerConfig,
};
use crate::word_break::pipeline::collector::{CollectionStats, TextCollector};
use crate::word_break::pipeline::filters::NodeFilter;
use crate::word_break::pipeline::watcher::{MutationRecord, MutationWatcher, WatcherStats};
use crate::word_break::processor::MutatorStats;

/// 分词换行服务
///
/// 持有处理流程的全部组件：
///
/// - **目标选择器**: 限定处理范围的容器
/// - **文本收集器**: 首次处理时发现文本单元
/// - **分词器**: 文本到词组的纯函数
/// - **分块调度器**: 分批处理、让帧、进度和超时
/// - **变更监听器**: 处理首次运行之后插入的内容
///
/// 所有组件只在单线程内使用，节点句柄是 `Rc`。
pub struct WordBreakService {
    config: WordBreakConfig,
    targets: Vec<SimpleSelector>,
    collector: RefCell<TextCollector>,
    segmenter: Rc<Segmenter>,
    scheduler: Rc<ChunkedScheduler>,
    watcher: MutationWatcher,
}

impl WordBreakService {
    /// 初始化服务
    ///
    /// `tokenizer` 是分词器的异步初始化过程。配置无效或分词器初始化失败时
    /// 只记录错误日志并返回 `None`，此时文档不会被修改。
    pub async fn bootstrap<F>(
        config: WordBreakConfig,
        tokenizer: F,
        host: Rc<dyn Host>,
        progress: Rc<dyn ProgressReporter>,
    ) -> Option<Self>
    where
        F: Future<Output = WordBreakResult<Rc<dyn Tokenizer>>>,
    {
        if let Err(e) = config.validate() {
            helpers::log_error(&e);
            return None;
        }

        let tokenizer = match tokenizer.await {
            Ok(tokenizer) => tokenizer,
            Err(e) => {
                tracing::error!("分词器初始化失败，放弃分词换行: {}", e);
                return None;
            }
        };

        let segmenter = match Segmenter::new(tokenizer, &config) {
            Ok(segmenter) => Rc::new(segmenter),
            Err(e) => {
                helpers::log_error(&e);
                return None;
            }
        };

        let targets = parse_selector_list(&config.target_selectors);
        if targets.is_empty() {
            tracing::warn!("没有可用的目标选择器: {}", config.target_selectors);
        }

        let filter = NodeFilter::new(&config);
        let scheduler = Rc::new(ChunkedScheduler::new(
            SchedulerConfig::from(&config),
            Rc::clone(&segmenter),
            host,
            progress,
        ));
        let watcher = MutationWatcher::new(filter.clone(), Rc::clone(&scheduler), config.debounce());

        tracing::info!("分词换行服务已就绪");

        Some(Self {
            config,
            targets,
            collector: RefCell::new(TextCollector::new(filter)),
            segmenter,
            scheduler,
            watcher,
        })
    }

    pub fn config(&self) -> &WordBreakConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &ChunkedScheduler {
        &self.scheduler
    }

    pub fn watcher(&self) -> &MutationWatcher {
        &self.watcher
    }

    /// 文档中匹配目标选择器的最外层容器
    pub fn target_roots(&self, dom: &RcDom) -> Vec<Handle> {
        find_targets(&dom.document, &self.targets)
    }

    /// 首次处理整个文档
    pub async fn process_document(&self, dom: &RcDom) -> RunSummary {
        let roots = self.target_roots(dom);
        if roots.is_empty() {
            tracing::info!("文档中没有匹配 {} 的容器", self.config.target_selectors);
        }

        let units = self.collector.borrow_mut().collect_units(&roots);
        let summary = self.scheduler.run(units).await;

        if summary.outcome == RunOutcome::TimedOut {
            tracing::warn!(
                "首次处理未完成: {}/{} 个单元",
                summary.completed,
                summary.total
            );
        }

        summary
    }

    /// 接收宿主推送的变更记录
    pub fn observe(&self, records: Vec<MutationRecord>) {
        self.watcher.observe(records);
    }

    /// 去抖窗口已过时处理累积的变更
    pub async fn flush_mutations(&self) -> Option<RunSummary> {
        self.watcher.flush_due().await
    }

    /// 监听变更直到通道关闭
    pub async fn watch(&self, receiver: UnboundedReceiver<Vec<MutationRecord>>) {
        self.watcher.watch(receiver).await;
    }

    /// 统计快照
    pub fn get_stats(&self) -> ServiceStats {
        let mut collection = self.collector.borrow().get_stats().clone();
        collection.merge(&self.watcher.collection_stats());

        ServiceStats {
            collection,
            segment: self.segmenter.get_stats(),
            mutator: self.scheduler.mutator_stats(),
            watcher: self.watcher.get_stats(),
        }
    }
}

/// 服务统计快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// 首次处理和变更发现的节点遍历统计
    pub collection: CollectionStats,
    /// 分词路径统计
    pub segment: SegmentStats,
    /// DOM修改统计
    pub mutator: MutatorStats,
    /// 变更监听统计
    pub watcher: WatcherStats,
}

//! 分块调度器模块
//!
//! 把文本单元按固定大小分批处理，批次之间把控制权交还宿主，
//! 避免长时间占用渲染线程。
//!
//! ## 处理流程
//!
//! 1. 同一时间只允许一次运行，重入调用直接返回 `AlreadyRunning`
//! 2. 每批开始前检查总耗时，超出预算时提前结束
//! 3. 批内逐个处理：重新校验、超长跳过、分词、替换
//! 4. 单个单元失败只记录日志，不影响同批其它单元
//! 5. 每批结束后上报进度并让帧，非最后一批再等待固定延迟
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use rwb::word_break::pipeline::batch::{ChunkedScheduler, SchedulerConfig, TracingProgress};
//! use rwb::word_break::host::TokioHost;
//! # async fn example(segmenter: Rc<rwb::word_break::core::Segmenter>, units: Vec<rwb::word_break::pipeline::TextUnit>) {
//! let scheduler = ChunkedScheduler::new(
//!     SchedulerConfig::default(),
//!     segmenter,
//!     Rc::new(TokioHost),
//!     Rc::new(TracingProgress),
//! );
//! let summary = scheduler.run(units).await;
//! println!("处理了 {} / {} 个单元", summary.processed, summary.total);
//! # }
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::word_break::config::{constants, WordBreakConfig};
use crate::word_break::core::segmenter::Segmenter;
use crate::word_break::error::{helpers, WordBreakError, WordBreakResult};
use crate::word_break::host::Host;
use crate::word_break::pipeline::collector::TextUnit;
use crate::word_break::processor::{Mutator, MutatorStats};

/// 调度配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub max_text_length: usize,
    pub timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: constants::DEFAULT_BATCH_SIZE,
            batch_delay: constants::DEFAULT_BATCH_DELAY,
            max_text_length: constants::DEFAULT_MAX_TEXT_LENGTH,
            timeout: constants::DEFAULT_TIMEOUT,
        }
    }
}

impl From<&WordBreakConfig> for SchedulerConfig {
    fn from(config: &WordBreakConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            batch_delay: config.batch_delay(),
            max_text_length: config.max_text_length,
            timeout: config.timeout(),
        }
    }
}

/// 进度状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    pub total: usize,
    pub completed: usize,
}

impl ProgressState {
    /// 完成百分比（0-100）
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// 运行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    TimedOut,
    AlreadyRunning,
}

/// 单次运行摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    pub processed: usize,
    pub skipped_detached: usize,
    pub skipped_oversize: usize,
    pub failed: usize,
    pub batches: usize,
    pub elapsed: Duration,
    pub outcome: RunOutcome,
}

impl RunSummary {
    fn new(total: usize, outcome: RunOutcome) -> Self {
        Self {
            total,
            completed: 0,
            processed: 0,
            skipped_detached: 0,
            skipped_oversize: 0,
            failed: 0,
            batches: 0,
            elapsed: Duration::ZERO,
            outcome,
        }
    }
}

/// 进度上报
pub trait ProgressReporter {
    /// 每批结束后调用，取值 0-100
    fn report(&self, percent: f64);

    /// 进度到达 100 后调用一次
    fn finished(&self, _summary: &RunSummary) {}
}

/// 通过 tracing 记录进度
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&self, percent: f64) {
        tracing::debug!("分词换行进度: {:.1}%", percent);
    }

    fn finished(&self, summary: &RunSummary) {
        tracing::info!(
            "分词换行完成: {} 个单元, 处理 {}, 失败 {}, 耗时 {:?}",
            summary.total,
            summary.processed,
            summary.failed,
            summary.elapsed
        );
    }
}

/// 丢弃进度
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _percent: f64) {}
}

// 运行标志，离开作用域时复位并唤醒等待空闲的一方
struct RunGuard<'a> {
    flag: &'a Cell<bool>,
    idle: &'a Notify,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a Cell<bool>, idle: &'a Notify) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self { flag, idle })
        }
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
        self.idle.notify_waiters();
    }
}

enum UnitOutcome {
    Processed,
    Detached,
    Oversize,
}

/// 分块调度器
pub struct ChunkedScheduler {
    config: SchedulerConfig,
    segmenter: Rc<Segmenter>,
    mutator: RefCell<Mutator>,
    host: Rc<dyn Host>,
    progress: Rc<dyn ProgressReporter>,
    running: Cell<bool>,
    idle: Notify,
    state: Cell<ProgressState>,
}

impl ChunkedScheduler {
    /// 创建调度器，批大小至少为 1
    pub fn new(
        mut config: SchedulerConfig,
        segmenter: Rc<Segmenter>,
        host: Rc<dyn Host>,
        progress: Rc<dyn ProgressReporter>,
    ) -> Self {
        config.batch_size = config.batch_size.max(1);
        Self {
            config,
            segmenter,
            mutator: RefCell::new(Mutator::new()),
            host,
            progress,
            running: Cell::new(false),
            idle: Notify::new(),
            state: Cell::new(ProgressState::default()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// 等待当前运行结束，空闲时立即返回
    pub async fn wait_idle(&self) {
        let idle = self.idle.notified();
        if !self.is_running() {
            return;
        }
        idle.await;
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// 当前（或最近一次）运行的进度
    pub fn progress(&self) -> ProgressState {
        self.state.get()
    }

    pub fn mutator_stats(&self) -> MutatorStats {
        self.mutator.borrow().get_stats()
    }

    pub fn host(&self) -> &Rc<dyn Host> {
        &self.host
    }

    /// 分批处理文本单元
    pub async fn run(&self, units: Vec<TextUnit>) -> RunSummary {
        let total = units.len();

        let Some(_guard) = RunGuard::acquire(&self.running, &self.idle) else {
            tracing::debug!("已有运行在进行中，忽略 {} 个单元", total);
            return RunSummary::new(total, RunOutcome::AlreadyRunning);
        };

        let start = self.host.now();
        let mut summary = RunSummary::new(total, RunOutcome::Completed);
        let mut state = ProgressState { total, completed: 0 };
        self.state.set(state);

        if total == 0 {
            self.progress.report(100.0);
            self.progress.finished(&summary);
            return summary;
        }

        tracing::info!(
            "开始分词换行: {} 个单元，每批 {} 个",
            total,
            self.config.batch_size
        );

        let batch_count = total.div_ceil(self.config.batch_size);

        for (index, batch) in units.chunks(self.config.batch_size).enumerate() {
            let elapsed = self.host.now().saturating_duration_since(start);
            if elapsed >= self.config.timeout {
                helpers::log_error(&WordBreakError::TimeoutError(format!(
                    "超过 {:?}，已完成 {}/{} 个单元",
                    self.config.timeout, state.completed, total
                )));
                summary.outcome = RunOutcome::TimedOut;
                break;
            }

            for unit in batch {
                match self.process_unit(unit) {
                    Ok(UnitOutcome::Processed) => summary.processed += 1,
                    Ok(UnitOutcome::Detached) => summary.skipped_detached += 1,
                    Ok(UnitOutcome::Oversize) => summary.skipped_oversize += 1,
                    Err(e) => {
                        summary.failed += 1;
                        let preview: String = unit.text.chars().take(32).collect();
                        helpers::log_error(&e.with_context(preview));
                    }
                }
            }

            state.completed += batch.len();
            summary.completed = state.completed;
            summary.batches += 1;
            self.state.set(state);
            self.progress.report(state.percent());

            tracing::debug!(
                "批次 {}/{} 完成，进度 {}/{}",
                index + 1,
                batch_count,
                state.completed,
                total
            );

            self.host.next_frame().await;
            if index + 1 < batch_count {
                self.host.sleep(self.config.batch_delay).await;
            }
        }

        summary.elapsed = self.host.now().saturating_duration_since(start);

        if summary.outcome == RunOutcome::Completed {
            self.progress.finished(&summary);
        }

        summary
    }

    fn process_unit(&self, unit: &TextUnit) -> WordBreakResult<UnitOutcome> {
        let Some(text) = unit.revalidate() else {
            return Ok(UnitOutcome::Detached);
        };

        let mut mutator = self.mutator.borrow_mut();

        if text.chars().count() > self.config.max_text_length {
            tracing::debug!("文本过长（{} 字符），直接标记为已处理", text.chars().count());
            mutator.mark_processed(&unit.container);
            return Ok(UnitOutcome::Oversize);
        }

        let fragments = self.segmenter.segment(&text)?;
        mutator.apply(unit, &fragments)?;

        Ok(UnitOutcome::Processed)
    }
}

//! 分词换行管道模块
//!
//! 提供文本处理管道，包括过滤、收集、分块调度和变更监听

pub mod batch;
pub mod collector;
pub mod filters;
pub mod watcher;

// 重新导出主要类型
pub use batch::{
    ChunkedScheduler, NoProgress, ProgressReporter, ProgressState, RunOutcome, RunSummary,
    SchedulerConfig, TracingProgress,
};
pub use collector::{collect_units, CollectionStats, TextCollector, TextUnit, TextUnits};
pub use filters::{NodeClass, NodeFilter, Rejection};
pub use watcher::{Debouncer, MutationRecord, MutationWatcher, WatcherStats};

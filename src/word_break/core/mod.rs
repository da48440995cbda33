//! 分词换行核心模块
//!
//! 核心模块采用分层设计：
//!
//! - **服务层** (`service.rs`): 协调节点选择、调度、修改和监听
//! - **引擎层** (`segmenter.rs`): 文本到词组的纯函数
//! - **能力层** (`tokenizer.rs`): 外部分词器的调用约定
//!
//! ## 模块依赖关系
//!
//! ```text
//! WordBreakService (service.rs)
//!     ├── TextCollector (pipeline/collector.rs)
//!     ├── ChunkedScheduler (pipeline/batch.rs)
//!     │       ├── Segmenter (segmenter.rs)
//!     │       │       └── Tokenizer (tokenizer.rs)
//!     │       └── Mutator (processor.rs)
//!     └── MutationWatcher (pipeline/watcher.rs)
//! ```

pub mod segmenter;
pub mod service;
pub mod tokenizer;

/// 分词引擎
pub use segmenter::{plain_text, render_html, Fragment, SegmentStats, Segmenter};

/// 分词换行服务 - 主要的对外接口
pub use service::{ServiceStats, WordBreakService};

/// 分词器接口和后备实现
pub use tokenizer::{ScriptTokenizer, Token, Tokenizer};

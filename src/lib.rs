//! # RWB Library
//!
//! 为日文/拉丁混排的网页文本插入按词换行的机会：把每个词（连同其后附的助词）
//! 包进行内 `<span>`，窄屏排版时行只在词与词之间断开。
//!
//! ## 模块组织
//!
//! - `core` - 命令行使用的文档级处理入口
//! - `env` - 环境变量定义
//! - `parsers` - HTML解析、DOM操作和序列化
//! - `word_break` - 分词、分块调度、DOM修改和变更监听

pub mod core;
pub mod env;
pub mod parsers;
pub mod word_break;

// Re-export commonly used items for convenience
pub use self::core::*;
pub use parsers::*;
pub use word_break::{process_dom, segment_to_html, WordBreakConfig, WordBreakService};

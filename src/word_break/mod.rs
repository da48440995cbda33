//! 分词换行模块
//!
//! 在日文/拉丁混排文本中按词插入换行机会，采用清晰的模块化架构：
//! - **core**: 分词器接口、分词引擎和服务
//! - **pipeline**: 文本处理管道（过滤、收集、分块调度、变更监听）
//! - **processor**: 把分词结果写回DOM
//! - **host**: 宿主调度能力（让帧、计时）
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use rwb::parsers::html::html_to_dom;
//! use rwb::word_break::{process_dom, ScriptTokenizer, WordBreakConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dom = html_to_dom("<p>吾輩は猫である。</p>".as_bytes(), "utf-8");
//! let summary = process_dom(&dom, WordBreakConfig::default(), ScriptTokenizer::new()?).await;
//! assert_eq!(summary.map(|s| s.processed), Some(1));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 配置管理模块 - 处理批次、范围和分词相关的所有配置
pub mod config;

/// 核心模块 - 分词器、分词引擎和服务
pub mod core;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// 宿主调度能力
pub mod host;

/// 文本处理管道模块
pub mod pipeline;

/// DOM修改模块
pub mod processor;

// ============================================================================
// 核心API导出
// ============================================================================

pub use config::{constants, ConfigManager, WordBreakConfig};
pub use self::core::{
    Fragment, ScriptTokenizer, Segmenter, ServiceStats, Token, Tokenizer, WordBreakService,
};
pub use error::{ErrorCategory, ErrorSeverity, WordBreakError, WordBreakResult};
pub use host::{Host, ManualHost, TokioHost};
pub use pipeline::{MutationRecord, RunOutcome, RunSummary};
pub use processor::Mutator;

// ============================================================================
// 便利函数导出
// ============================================================================

use std::rc::Rc;

use markup5ever_rcdom::RcDom;

/// 用给定分词器处理整个DOM（一次性，不监听变更）
///
/// 分词器初始化失败或配置无效时返回 `None`，DOM保持不变。
pub async fn process_dom<T>(dom: &RcDom, config: WordBreakConfig, tokenizer: T) -> Option<RunSummary>
where
    T: Tokenizer + 'static,
{
    let tokenizer: Rc<dyn Tokenizer> = Rc::new(tokenizer);
    let service = WordBreakService::bootstrap(
        config,
        async move { Ok::<_, WordBreakError>(tokenizer) },
        Rc::new(TokioHost),
        Rc::new(pipeline::TracingProgress),
    )
    .await?;

    Some(service.process_document(dom).await)
}

/// 切分单段文本并渲染为HTML
pub fn segment_to_html(text: &str, config: &WordBreakConfig) -> WordBreakResult<String> {
    let segmenter = Segmenter::new(Rc::new(ScriptTokenizer::new()?), config)?;
    Ok(self::core::render_html(&segmenter.segment(text)?))
}

/// 生成示例配置文件
pub fn generate_example_config(path: &str) -> WordBreakResult<()> {
    ConfigManager::generate_example_config(path)?;
    tracing::info!("已生成示例配置文件: {}", path);
    Ok(())
}

// ============================================================================
// 模块信息
// ============================================================================

/// 模块版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MODULE_NAME: &str = "word_break";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_to_bit_exact_html() {
        let html = segment_to_html("Hello World", &WordBreakConfig::default()).unwrap();
        assert_eq!(
            html,
            r#"<span class="word-wrapper">Hello </span><span class="word-wrapper">World</span>"#
        );
    }

    #[tokio::test]
    async fn process_dom_runs_one_pass() {
        let dom = crate::parsers::html::html_to_dom("<p>猫です</p><p>犬です</p>".as_bytes(), "utf-8");
        let summary = process_dom(&dom, WordBreakConfig::default(), ScriptTokenizer::new().unwrap())
            .await
            .unwrap();

        assert_eq!(summary.outcome, RunOutcome::Completed);
        assert_eq!(summary.processed, 2);
    }
}

//! 分词换行配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, WordBreakConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 标记约定（输出的HTML依赖这两个字面值做幂等检测，不可更改）
    pub const PROCESSED_MARKER: &str = "data-rwb-processed";
    pub const PROCESSED_MARKER_VALUE: &str = "true";
    pub const WORD_CLASS: &str = "word-wrapper";

    // 批次处理相关
    pub const DEFAULT_BATCH_SIZE: usize = 10;
    pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(10);
    pub const DEFAULT_MAX_TEXT_LENGTH: usize = 1000;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    // 变更监听
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

    // 默认处理范围
    pub const DEFAULT_TARGET_SELECTORS: &str = "body";

    // 跳过的元素（整棵子树）
    pub const EXCLUDED_TAGS: &[&str] = &[
        "script", "style", "code", "pre", "title", "head", "noscript", "template", "textarea",
        "svg", "math",
    ];

    // 文档根元素，直接位于其下的文本不处理
    pub const DOCUMENT_ROOT_TAGS: &[&str] = &["html", "head"];

    // 开发者工具标识
    pub const TOOLING_ID_MARKERS: &[&str] = &["__debug"];
    pub const TOOLING_CLASS_MARKERS: &[&str] = &["debug"];

    // 附属词性：助词、助动词、符号、补助符号、句号、逗号
    pub const PARTICLE_CATEGORIES: &[&str] = &[
        "助詞",
        "助動詞",
        "記号",
        "補助記号",
        "句点",
        "読点",
        "particle",
        "auxiliary",
        "auxiliary verb",
        "symbol",
        "sub-symbol",
        "terminal punctuation",
        "medial punctuation",
    ];

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "rwb.toml",
        ".rwb.toml",
        "rwb.json",
        "~/.config/rwb/config.toml",
        "/etc/rwb/config.toml",
    ];
}

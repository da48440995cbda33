use encoding_rs::Encoding;
use markup5ever_rcdom::RcDom;
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::env::core::NoColor;
use crate::env::EnvVar;
use crate::parsers::html::{get_charset, html_to_dom, serialize_document};
use crate::word_break::host::TokioHost;
use crate::word_break::pipeline::{RunSummary, TracingProgress};
use crate::word_break::{Tokenizer, WordBreakConfig, WordBreakError, WordBreakService};

/// Represents errors that can occur while processing a document
///
/// Wraps library errors into a single message suitable for the command line.
#[derive(Debug)]
pub struct RwbError {
    details: String,
}

impl RwbError {
    /// Creates a new RwbError with the given message
    pub fn new(msg: &str) -> RwbError {
        RwbError {
            details: msg.to_string(),
        }
    }
}

impl fmt::Display for RwbError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl Error for RwbError {
    fn description(&self) -> &str {
        &self.details
    }
}

impl From<WordBreakError> for RwbError {
    fn from(error: WordBreakError) -> Self {
        RwbError::new(&error.to_string())
    }
}

/// Command line overrides applied on top of the loaded configuration
#[derive(Default, Clone, Debug)]
pub struct RwbOptions {
    pub encoding: Option<String>,
    pub target_selectors: Option<String>,
    pub batch_size: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub silent: bool,
}

impl RwbOptions {
    /// 把命令行参数写入配置，命令行优先级最高
    pub fn apply(&self, config: &mut WordBreakConfig) {
        if let Some(selectors) = &self.target_selectors {
            config.target_selectors = selectors.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
    }
}

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";
const DEFAULT_OUTPUT_DIR: &str = "out";

/// 解析文档并确定其字符集
///
/// 未指定编码时先按 UTF-8 解析，若文档自身声明了其他受支持的字符集则重新解析。
pub fn decode_document(data: &[u8], encoding: Option<&str>) -> (RcDom, String) {
    if let Some(label) = encoding {
        return (html_to_dom(data, label), label.to_string());
    }

    let dom = html_to_dom(data, "utf-8");
    match get_charset(&dom.document) {
        Some(charset) => match Encoding::for_label(charset.as_bytes()) {
            Some(declared) if declared != encoding_rs::UTF_8 => {
                tracing::debug!("按文档声明的字符集重新解析: {}", charset);
                (html_to_dom(data, &charset), charset)
            }
            _ => (dom, "utf-8".to_string()),
        },
        None => (dom, "utf-8".to_string()),
    }
}

/// 对整个HTML文档插入换行机会
///
/// 返回序列化后的文档（保持原字符集）和本次运行的汇总。
/// 配置无效时返回错误，输入文档不会被输出。
pub async fn process_html(
    data: &[u8],
    encoding: Option<&str>,
    config: WordBreakConfig,
    tokenizer: Rc<dyn Tokenizer>,
) -> Result<(Vec<u8>, RunSummary), RwbError> {
    let (dom, charset) = decode_document(data, encoding);

    let service = WordBreakService::bootstrap(
        config,
        async move { Ok::<_, WordBreakError>(tokenizer) },
        Rc::new(TokioHost),
        Rc::new(TracingProgress),
    )
    .await
    .ok_or_else(|| RwbError::new("Word break service failed to start"))?;

    let summary = service.process_document(&dom).await;
    drop(service);

    let output = serialize_document(dom, &charset)?;
    Ok((output, summary))
}

/// Parses Content-Type header value into media type and charset
pub fn parse_content_type(content_type: &str) -> (String, String) {
    let mut parts = content_type.split(';');
    let media_type = parts.next().unwrap_or_default().trim().to_lowercase();
    let mut charset = String::new();

    for part in parts {
        let part = part.trim();
        if let Some(value) = part
            .get(..8)
            .filter(|key| key.eq_ignore_ascii_case("charset="))
            .and_then(|_| part.get(8..))
        {
            charset = value.trim_matches('"').to_string();
        }
    }

    (media_type, charset)
}

/// Builds the default output path for an input file
///
/// `-` (stdin) maps to `out/stdin.html`, anything else keeps its file name under `out/`.
pub fn format_output_path(input: &str) -> PathBuf {
    let file_name = if input == "-" {
        "stdin.html".to_string()
    } else {
        Path::new(input)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output.html".to_string())
    };

    Path::new(DEFAULT_OUTPUT_DIR).join(file_name)
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    if NoColor::get_or_default(false) {
        eprintln!("{msg}");
    } else {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    }
}

/// Prints an info message to stdout
pub fn print_info_message(msg: &str) {
    println!("{msg}");
}

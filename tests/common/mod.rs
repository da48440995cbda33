// 集成测试公共模块
//
// 提供测试辅助工具和共享功能

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use markup5ever_rcdom::{Handle, RcDom};

use rwb::parsers::html::dom::{get_child_node_by_name, html_to_dom};
use rwb::parsers::html::serializer::serialize_node;
use rwb::word_break::pipeline::{ProgressReporter, RunSummary};
use rwb::word_break::{ScriptTokenizer, Token, Tokenizer, WordBreakConfig, WordBreakResult};

/// HTML测试辅助工具
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    /// 把 body 内容包装成完整文档并解析
    pub fn create_test_dom(body: &str) -> RcDom {
        let html = format!(
            "<!DOCTYPE html><html><head><title>テスト</title></head><body>{}</body></html>",
            body
        );
        html_to_dom(html.as_bytes(), "utf-8")
    }

    pub fn body(dom: &RcDom) -> Handle {
        let html = get_child_node_by_name(&dom.document, "html").expect("缺少 html 元素");
        get_child_node_by_name(&html, "body").expect("缺少 body 元素")
    }

    /// 序列化 body 的内部HTML
    pub fn body_html(dom: &RcDom) -> String {
        let body = Self::body(dom);
        let children: Vec<Handle> = body.children.borrow().iter().cloned().collect();
        children
            .iter()
            .map(|child| serialize_node(child).expect("序列化失败"))
            .collect()
    }

    /// 统计输出中的词组数量
    pub fn count_words(html: &str) -> usize {
        html.matches(r#"<span class="word-wrapper">"#).count()
    }
}

/// 测试用分词器
pub struct TokenizerFixture;

impl TokenizerFixture {
    pub fn script() -> Rc<dyn Tokenizer> {
        Rc::new(ScriptTokenizer::new().expect("后备分词器初始化失败"))
    }

    /// 按预设词典逐段返回固定词性，未知字符按单字符名词处理
    pub fn dictionary(entries: &'static [(&'static str, &'static str)]) -> Rc<dyn Tokenizer> {
        Rc::new(move |text: &str| -> WordBreakResult<Vec<Token>> {
            let mut tokens = Vec::new();
            let mut rest = text;
            while !rest.is_empty() {
                if let Some((surface, category)) =
                    entries.iter().find(|(surface, _)| rest.starts_with(surface))
                {
                    tokens.push(Token::new(*surface, *category));
                    rest = &rest[surface.len()..];
                } else {
                    let ch = rest.chars().next().unwrap_or_default();
                    tokens.push(Token::new(ch.to_string(), "名詞"));
                    rest = &rest[ch.len_utf8()..];
                }
            }
            Ok(tokens)
        })
    }
}

/// 测试配置构建器
pub struct TestConfigBuilder {
    config: WordBreakConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: WordBreakConfig::default(),
        }
    }

    pub fn with_targets(mut self, selectors: &str) -> Self {
        self.config.target_selectors = selectors.to_string();
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    pub fn with_batch_delay_ms(mut self, delay: u64) -> Self {
        self.config.batch_delay_ms = delay;
        self
    }

    pub fn with_timeout_ms(mut self, timeout: u64) -> Self {
        self.config.timeout_ms = timeout;
        self
    }

    pub fn with_max_text_length(mut self, length: usize) -> Self {
        self.config.max_text_length = length;
        self
    }

    pub fn build(self) -> WordBreakConfig {
        self.config
    }
}

/// 记录进度上报的测试实现
#[derive(Default)]
pub struct ProgressRecorder {
    pub reports: RefCell<Vec<f64>>,
    pub finished: Cell<usize>,
}

impl ProgressReporter for ProgressRecorder {
    fn report(&self, percent: f64) {
        self.reports.borrow_mut().push(percent);
    }

    fn finished(&self, _summary: &RunSummary) {
        self.finished.set(self.finished.get() + 1);
    }
}

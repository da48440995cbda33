//! 分词换行引擎
//!
//! 将一段文本切分为不可在内部换行的词组。纯函数，不接触DOM。
//!
//! ## 规则
//!
//! - 全部由拉丁字母、数字、常见标点和空白组成的文本走快速路径，
//!   直接在空白处切分，不调用分词器。
//! - 其余文本交给分词器，助词类词性附着在前一个内容词上，
//!   内嵌的拉丁字母/数字串单独成组。
//! - 空白总是附着在左侧的词组上；左侧没有词组时原样输出。
//! - 所有片段按顺序拼接后与原文完全一致。

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use regex::Regex;

use super::tokenizer::Tokenizer;
use crate::parsers::html::escape_text;
use crate::word_break::config::{constants, WordBreakConfig};
use crate::word_break::error::{WordBreakError, WordBreakResult};

const LATIN_CHARS: &str = r"a-zA-Z0-9.,\-_!@#$%^&*()+=~?";

/// 分词输出片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// 词组，渲染时包裹在 `<span class="word-wrapper">` 中
    Word(String),
    /// 原样输出的文本
    Text(String),
}

impl Fragment {
    pub fn as_str(&self) -> &str {
        match self {
            Fragment::Word(s) | Fragment::Text(s) => s,
        }
    }

    pub fn is_word(&self) -> bool {
        matches!(self, Fragment::Word(_))
    }

    /// 渲染为HTML
    pub fn render_html(&self) -> String {
        match self {
            Fragment::Word(s) => format!(
                r#"<span class="{}">{}</span>"#,
                constants::WORD_CLASS,
                escape_text(s)
            ),
            Fragment::Text(s) => escape_text(s),
        }
    }
}

/// 渲染片段序列
pub fn render_html(fragments: &[Fragment]) -> String {
    fragments.iter().map(Fragment::render_html).collect()
}

/// 去掉包裹后的纯文本
pub fn plain_text(fragments: &[Fragment]) -> String {
    fragments.iter().map(Fragment::as_str).collect()
}

/// 分词统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentStats {
    pub fast_path: usize,
    pub general_path: usize,
    pub skipped: usize,
    pub word_groups: usize,
}

/// 分词器
pub struct Segmenter {
    tokenizer: Rc<dyn Tokenizer>,
    particle_categories: HashSet<String>,
    min_segment_chars: usize,
    latin_token: Regex,
    latin_text: Regex,
    stats: Cell<SegmentStats>,
}

impl Segmenter {
    pub fn new(tokenizer: Rc<dyn Tokenizer>, config: &WordBreakConfig) -> WordBreakResult<Self> {
        let build = |pattern: String| {
            Regex::new(&pattern).map_err(|e| WordBreakError::InternalError(e.to_string()))
        };

        Ok(Self {
            tokenizer,
            particle_categories: config.particle_categories.iter().cloned().collect(),
            min_segment_chars: config.min_segment_chars,
            latin_token: build(format!("^[{}]+$", LATIN_CHARS))?,
            latin_text: build(format!(r"^[{}\s]+$", LATIN_CHARS))?,
            stats: Cell::new(SegmentStats::default()),
        })
    }

    pub fn get_stats(&self) -> SegmentStats {
        self.stats.get()
    }

    pub fn is_particle(&self, category: &str) -> bool {
        self.particle_categories.contains(category)
    }

    /// 切分一段文本
    pub fn segment(&self, text: &str) -> WordBreakResult<Vec<Fragment>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut stats = self.stats.get();

        if self.min_segment_chars > 0 && text.trim().chars().count() < self.min_segment_chars {
            stats.skipped += 1;
            self.stats.set(stats);
            return Ok(vec![Fragment::Text(text.to_string())]);
        }

        let fragments = if self.latin_text.is_match(text) {
            stats.fast_path += 1;
            let mut out = Vec::new();
            push_latin_run(text, &mut out);
            out
        } else {
            stats.general_path += 1;
            self.segment_tokens(text)?
        };

        stats.word_groups += fragments.iter().filter(|f| f.is_word()).count();
        self.stats.set(stats);

        Ok(fragments)
    }

    fn segment_tokens(&self, text: &str) -> WordBreakResult<Vec<Fragment>> {
        let tokens = self.tokenizer.tokenize(text)?;

        let joined: String = tokens.iter().map(|t| t.surface.as_str()).collect();
        if joined != text {
            return Err(WordBreakError::TokenizeError(format!(
                "分词结果与原文不一致: {:?}",
                text
            )));
        }

        let mut out = Vec::new();
        let mut group = String::new();
        let mut latin = String::new();

        for token in &tokens {
            let surface = token.surface.as_str();
            if surface.is_empty() {
                continue;
            }

            if self.latin_token.is_match(surface) {
                flush_group(&mut group, &mut out);
                latin.push_str(surface);
            } else if surface.chars().all(char::is_whitespace) {
                if !latin.is_empty() {
                    latin.push_str(surface);
                } else if !group.is_empty() {
                    group.push_str(surface);
                } else {
                    out.push(Fragment::Text(surface.to_string()));
                }
            } else {
                flush_latin(&mut latin, &mut out);
                if !self.is_particle(&token.category) {
                    flush_group(&mut group, &mut out);
                }
                group.push_str(surface);
            }
        }

        flush_latin(&mut latin, &mut out);
        flush_group(&mut group, &mut out);

        Ok(out)
    }
}

fn flush_group(group: &mut String, out: &mut Vec<Fragment>) {
    if !group.is_empty() {
        out.push(Fragment::Word(std::mem::take(group)));
    }
}

fn flush_latin(latin: &mut String, out: &mut Vec<Fragment>) {
    if !latin.is_empty() {
        push_latin_run(latin, out);
        latin.clear();
    }
}

// 在空白处切分拉丁串，每个词带上其后的空白
fn push_latin_run(run: &str, out: &mut Vec<Fragment>) {
    let mut rest = run;

    let leading = rest.len() - rest.trim_start().len();
    if leading > 0 {
        out.push(Fragment::Text(rest[..leading].to_string()));
        rest = &rest[leading..];
    }

    while !rest.is_empty() {
        let word_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let after = &rest[word_end..];
        let end = word_end + (after.len() - after.trim_start().len());
        out.push(Fragment::Word(rest[..end].to_string()));
        rest = &rest[end..];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word_break::core::tokenizer::{ScriptTokenizer, Token};

    fn fixed(tokens: Vec<(&'static str, &'static str)>) -> Rc<dyn Tokenizer> {
        Rc::new(move |_: &str| -> WordBreakResult<Vec<Token>> {
            Ok(tokens.iter().map(|(s, c)| Token::new(*s, *c)).collect())
        })
    }

    fn segmenter(tokenizer: Rc<dyn Tokenizer>) -> Segmenter {
        Segmenter::new(tokenizer, &WordBreakConfig::default()).unwrap()
    }

    fn words(fragments: &[Fragment]) -> Vec<&str> {
        fragments
            .iter()
            .filter(|f| f.is_word())
            .map(Fragment::as_str)
            .collect()
    }

    #[test]
    fn particles_attach_to_preceding_word() {
        let seg = segmenter(fixed(vec![("走る", "verb"), ("の", "particle"), ("だ", "auxiliary")]));
        let out = seg.segment("走るのだ").unwrap();

        assert_eq!(out, vec![Fragment::Word("走るのだ".to_string())]);
    }

    #[test]
    fn latin_text_uses_fast_path() {
        let seg = segmenter(fixed(vec![]));
        let out = seg.segment("Hello World 123").unwrap();

        assert_eq!(words(&out), vec!["Hello ", "World ", "123"]);
        assert_eq!(seg.get_stats().fast_path, 1);
        assert_eq!(seg.get_stats().general_path, 0);
    }

    #[test]
    fn leading_whitespace_passes_through() {
        let seg = segmenter(fixed(vec![]));
        let out = seg.segment("  a b").unwrap();

        assert_eq!(out[0], Fragment::Text("  ".to_string()));
        assert_eq!(words(&out), vec!["a ", "b"]);
    }

    #[test]
    fn mixed_script_boundary() {
        let seg = segmenter(fixed(vec![
            ("これ", "名詞"),
            ("は", "助詞"),
            ("test", "名詞"),
            ("123", "名詞"),
            ("です", "助動詞"),
        ]));
        let out = seg.segment("これはtest123です").unwrap();

        assert_eq!(words(&out), vec!["これは", "test123", "です"]);
        assert_eq!(plain_text(&out), "これはtest123です");
    }

    #[test]
    fn whitespace_attaches_left_on_general_path() {
        let seg = segmenter(fixed(vec![
            ("日本", "名詞"),
            (" ", "記号"),
            ("Hello", "名詞"),
            (" ", "記号"),
            ("World", "名詞"),
            (" ", "記号"),
            ("語", "名詞"),
        ]));
        let out = seg.segment("日本 Hello World 語").unwrap();

        assert_eq!(words(&out), vec!["日本 ", "Hello ", "World ", "語"]);
    }

    #[test]
    fn whitespace_without_group_is_unwrapped() {
        let seg = segmenter(fixed(vec![(" ", "記号"), ("猫", "名詞")]));
        let out = seg.segment(" 猫").unwrap();

        assert_eq!(
            out,
            vec![Fragment::Text(" ".to_string()), Fragment::Word("猫".to_string())]
        );
    }

    #[test]
    fn mismatched_tokens_are_rejected() {
        let seg = segmenter(fixed(vec![("猫", "名詞")]));
        let err = seg.segment("犬").unwrap_err();

        assert!(matches!(err, WordBreakError::TokenizeError(_)));
    }

    #[test]
    fn empty_input_yields_nothing() {
        let seg = segmenter(fixed(vec![]));
        assert!(seg.segment("").unwrap().is_empty());
    }

    #[test]
    fn short_text_is_skipped_when_threshold_set() {
        let config = WordBreakConfig {
            min_segment_chars: 3,
            ..Default::default()
        };
        let seg = Segmenter::new(fixed(vec![]), &config).unwrap();
        let out = seg.segment(" 猫 ").unwrap();

        assert_eq!(out, vec![Fragment::Text(" 猫 ".to_string())]);
        assert_eq!(seg.get_stats().skipped, 1);
    }

    #[test]
    fn reconstruction_is_lossless() {
        let tokenizer: Rc<dyn Tokenizer> = Rc::new(ScriptTokenizer::new().unwrap());
        let seg = segmenter(tokenizer);

        for input in [
            "吾輩は猫である。名前はまだ無い。",
            "  先頭と末尾の空白  ",
            "これはtest123です",
            "ＡＢＣ全角とカタカナ、ひらがな。",
            "Rust 1.75 で async fn in trait が安定化",
            "改行\nと\tタブ",
            "<script>&amp;</script>",
        ] {
            let out = seg.segment(input).unwrap();
            assert_eq!(plain_text(&out), input, "lost characters in {:?}", input);
        }
    }

    #[test]
    fn renders_bit_exact_markup() {
        let html = render_html(&[
            Fragment::Word("a<b ".to_string()),
            Fragment::Text(" ".to_string()),
        ]);
        assert_eq!(html, r#"<span class="word-wrapper">a&lt;b </span> "#);
    }
}

//! 分词器接口
//!
//! 形态素分析器是外部能力，这里只定义调用约定，并提供一个不依赖词典的
//! 按文字种类切分的后备实现。

use regex::Regex;

use crate::word_break::error::{WordBreakError, WordBreakResult};

/// 分词结果中的单个词
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// 表层文本
    pub surface: String,
    /// 词性
    pub category: String,
}

impl Token {
    pub fn new(surface: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            surface: surface.into(),
            category: category.into(),
        }
    }
}

/// 分词能力
///
/// 返回的词序列按原文顺序排列，表层文本拼接后应与输入一致。
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> WordBreakResult<Vec<Token>>;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> WordBreakResult<Vec<Token>>,
{
    fn tokenize(&self, text: &str) -> WordBreakResult<Vec<Token>> {
        self(text)
    }
}

// 文字种类，按匹配优先级排列
const SCRIPT_PATTERN: &str = concat!(
    r"(?P<kanji>[\x{3400}-\x{4DBF}\x{4E00}-\x{9FFF}\x{F900}-\x{FAFF}々〆ヶ]+)",
    r"|(?P<hiragana>[\x{3041}-\x{309F}]+)",
    r"|(?P<katakana>[\x{30A1}-\x{30FA}\x{30FC}-\x{30FF}\x{31F0}-\x{31FF}\x{FF66}-\x{FF9F}]+)",
    r"|(?P<latin>[a-zA-Z0-9.,\-_!@#$%^&*()+=~?]+)",
    r"|(?P<fullwidth>[\x{FF10}-\x{FF19}\x{FF21}-\x{FF3A}\x{FF41}-\x{FF5A}]+)",
    r"|(?P<space>[ \t\r\n\x{0C}\x{A0}\x{3000}]+)",
    r"|(?P<punct>[\x{3001}-\x{303F}\x{30FB}\x{FF01}-\x{FF0F}\x{FF1A}-\x{FF20}\x{FF3B}-\x{FF40}\x{FF5B}-\x{FF65}])",
    r"|(?s:.)"
);

/// 按文字种类切分的后备分词器
///
/// 汉字、片假名和拉丁字母段视为名词，平假名段视为助词，
/// 日文标点为补助记号，其余字符为记号。
pub struct ScriptTokenizer {
    pattern: Regex,
}

impl ScriptTokenizer {
    pub fn new() -> WordBreakResult<Self> {
        let pattern = Regex::new(SCRIPT_PATTERN)
            .map_err(|e| WordBreakError::TokenizerInitError(e.to_string()))?;
        Ok(Self { pattern })
    }
}

impl Tokenizer for ScriptTokenizer {
    fn tokenize(&self, text: &str) -> WordBreakResult<Vec<Token>> {
        let tokens = self
            .pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let category = if caps.name("kanji").is_some()
                    || caps.name("katakana").is_some()
                    || caps.name("latin").is_some()
                    || caps.name("fullwidth").is_some()
                {
                    "名詞"
                } else if caps.name("hiragana").is_some() {
                    "助詞"
                } else if caps.name("punct").is_some() {
                    "補助記号"
                } else {
                    "記号"
                };
                Some(Token::new(whole.as_str(), category))
            })
            .collect();

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surfaces(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.surface.as_str()).collect()
    }

    #[test]
    fn splits_by_script() {
        let tokenizer = ScriptTokenizer::new().unwrap();
        let tokens = tokenizer.tokenize("日本語のテキストとtest123です。").unwrap();

        assert_eq!(
            surfaces(&tokens),
            vec!["日本語", "の", "テキスト", "と", "test123", "です", "。"]
        );
        assert_eq!(tokens[0].category, "名詞");
        assert_eq!(tokens[1].category, "助詞");
        assert_eq!(tokens[6].category, "補助記号");
    }

    #[test]
    fn surfaces_cover_input() {
        let tokenizer = ScriptTokenizer::new().unwrap();
        let input = "  Ünïcode 混在、テスト　ｆｕｌｌ１２ 🎉";
        let tokens = tokenizer.tokenize(input).unwrap();

        let joined: String = tokens.iter().map(|t| t.surface.as_str()).collect();
        assert_eq!(joined, input);
    }

    #[test]
    fn closures_are_tokenizers() {
        let fixed = |text: &str| -> WordBreakResult<Vec<Token>> { Ok(vec![Token::new(text, "名詞")]) };
        assert_eq!(fixed.tokenize("abc").unwrap(), vec![Token::new("abc", "名詞")]);
    }
}

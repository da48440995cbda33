//! DOM修改模块
//!
//! 把分词结果写回文档：一次结构修改替换原文本节点，并给容器打上已处理标记

use markup5ever_rcdom::Handle;

use crate::parsers::html::dom::{
    append_child, create_element, create_text, get_parent_node, replace_child, set_node_attr,
    text_of,
};
use crate::word_break::config::constants;
use crate::word_break::core::segmenter::{plain_text, Fragment};
use crate::word_break::error::{WordBreakError, WordBreakResult};
use crate::word_break::pipeline::collector::TextUnit;

/// 修改统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutatorStats {
    pub units_replaced: usize,
    pub containers_marked: usize,
    pub word_spans: usize,
}

/// DOM修改器
#[derive(Debug, Default)]
pub struct Mutator {
    stats: MutatorStats,
}

impl Mutator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_stats(&self) -> MutatorStats {
        self.stats
    }

    /// 用分词结果替换文本单元
    ///
    /// 替换块内容必须与当前文本完全一致，否则不做任何修改。
    pub fn apply(&mut self, unit: &TextUnit, fragments: &[Fragment]) -> WordBreakResult<Handle> {
        let current = text_of(&unit.node)
            .ok_or_else(|| WordBreakError::MutationError("目标不是文本节点".to_string()))?;

        if plain_text(fragments) != current {
            return Err(WordBreakError::MutationError(
                "替换内容与原文不一致".to_string(),
            ));
        }

        let parent = get_parent_node(&unit.node)
            .ok_or_else(|| WordBreakError::MutationError("文本节点已脱离文档".to_string()))?;
        if !std::rc::Rc::ptr_eq(&parent, &unit.container) {
            return Err(WordBreakError::MutationError("文本节点已被移动".to_string()));
        }

        let block = self.build_block(fragments);
        if !replace_child(&unit.container, &unit.node, block.clone()) {
            return Err(WordBreakError::MutationError("替换文本节点失败".to_string()));
        }

        self.mark_processed(&unit.container);
        self.stats.units_replaced += 1;

        Ok(block)
    }

    /// 给容器打上已处理标记
    pub fn mark_processed(&mut self, container: &Handle) {
        set_node_attr(
            container,
            constants::PROCESSED_MARKER,
            Some(constants::PROCESSED_MARKER_VALUE.to_string()),
        );
        self.stats.containers_marked += 1;
    }

    fn build_block(&mut self, fragments: &[Fragment]) -> Handle {
        let block = create_element(
            "span",
            &[(constants::PROCESSED_MARKER, constants::PROCESSED_MARKER_VALUE)],
        );

        for fragment in fragments {
            match fragment {
                Fragment::Word(text) => {
                    let word = create_element("span", &[("class", constants::WORD_CLASS)]);
                    append_child(&word, create_text(text));
                    append_child(&block, word);
                    self.stats.word_spans += 1;
                }
                Fragment::Text(text) => append_child(&block, create_text(text)),
            }
        }

        block
    }
}

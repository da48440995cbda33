//! 文本收集器模块
//!
//! 惰性遍历DOM子树，产出需要分词的文本单元

use std::rc::Rc;

use markup5ever_rcdom::{Handle, NodeData};

use super::filters::{NodeClass, NodeFilter, Rejection};
use crate::parsers::html::dom::{ancestors, get_parent_node, is_connected, text_of};

/// 待处理的文本单元
#[derive(Debug, Clone)]
pub struct TextUnit {
    /// 文本节点
    pub node: Handle,
    /// 直接容器
    pub container: Handle,
    /// 发现时的文本
    pub text: String,
}

impl TextUnit {
    /// 处理前重新校验，返回当前文本
    ///
    /// 节点已脱离文档、被移到别处或变为空白时返回 `None`。
    pub fn revalidate(&self) -> Option<String> {
        if !is_connected(&self.node) {
            return None;
        }

        let parent = get_parent_node(&self.node)?;
        if !Rc::ptr_eq(&parent, &self.container) {
            return None;
        }

        text_of(&self.node).filter(|text| !text.trim().is_empty())
    }
}

/// 收集统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub nodes_visited: usize,
    pub subtrees_pruned: usize,
    pub text_nodes_found: usize,
    pub units_accepted: usize,
    pub rejected_blank: usize,
    pub rejected_container: usize,
    pub rejected_attribute: usize,
}

impl CollectionStats {
    pub fn merge(&mut self, other: &CollectionStats) {
        self.nodes_visited += other.nodes_visited;
        self.subtrees_pruned += other.subtrees_pruned;
        self.text_nodes_found += other.text_nodes_found;
        self.units_accepted += other.units_accepted;
        self.rejected_blank += other.rejected_blank;
        self.rejected_container += other.rejected_container;
        self.rejected_attribute += other.rejected_attribute;
    }

    pub fn rejected(&self) -> usize {
        self.rejected_blank + self.rejected_container + self.rejected_attribute
    }
}

/// 文本单元迭代器
///
/// 按文档顺序深度优先遍历，遇到非内容元素时整棵子树跳过。
/// 只能消费一次，需要重新遍历时重新创建。
pub struct TextUnits<'a> {
    filter: &'a NodeFilter,
    stack: Vec<Handle>,
    stats: CollectionStats,
}

impl<'a> TextUnits<'a> {
    pub fn new(root: &Handle, filter: &'a NodeFilter) -> Self {
        let mut stats = CollectionStats::default();

        // 根节点位于排除区域内时不产出任何单元
        let blocked = ancestors(root)
            .iter()
            .any(|ancestor| filter.classify(ancestor) != NodeClass::Content);

        let stack = if blocked {
            stats.subtrees_pruned += 1;
            Vec::new()
        } else {
            vec![root.clone()]
        };

        Self {
            filter,
            stack,
            stats,
        }
    }

    pub fn stats(&self) -> &CollectionStats {
        &self.stats
    }

    fn accept_text(&mut self, node: &Handle) -> Option<TextUnit> {
        self.stats.text_nodes_found += 1;

        let text = text_of(node)?;
        let Some(container) = get_parent_node(node) else {
            self.stats.rejected_container += 1;
            return None;
        };

        match self.filter.check_text(&text, &container) {
            Ok(()) => {
                self.stats.units_accepted += 1;
                Some(TextUnit {
                    node: node.clone(),
                    container,
                    text,
                })
            }
            Err(Rejection::Blank) => {
                self.stats.rejected_blank += 1;
                None
            }
            Err(Rejection::Container) => {
                self.stats.rejected_container += 1;
                None
            }
            Err(Rejection::MirrorsAttribute) => {
                self.stats.rejected_attribute += 1;
                None
            }
        }
    }
}

impl Iterator for TextUnits<'_> {
    type Item = TextUnit;

    fn next(&mut self) -> Option<TextUnit> {
        while let Some(node) = self.stack.pop() {
            self.stats.nodes_visited += 1;

            match &node.data {
                NodeData::Text { .. } => {
                    if let Some(unit) = self.accept_text(&node) {
                        return Some(unit);
                    }
                }
                NodeData::Element { .. } | NodeData::Document => {
                    if self.filter.classify(&node) != NodeClass::Content {
                        self.stats.subtrees_pruned += 1;
                        continue;
                    }
                    self.stack
                        .extend(node.children.borrow().iter().rev().cloned());
                }
                _ => {}
            }
        }

        None
    }
}

/// 文本收集器
pub struct TextCollector {
    filter: NodeFilter,
    stats: CollectionStats,
}

impl TextCollector {
    pub fn new(filter: NodeFilter) -> Self {
        Self {
            filter,
            stats: CollectionStats::default(),
        }
    }

    pub fn filter(&self) -> &NodeFilter {
        &self.filter
    }

    /// 惰性遍历单个子树
    pub fn iter<'a>(&'a self, root: &Handle) -> TextUnits<'a> {
        TextUnits::new(root, &self.filter)
    }

    /// 按顺序收集多个子树中的文本单元，并累计统计
    pub fn collect_units(&mut self, roots: &[Handle]) -> Vec<TextUnit> {
        let mut units = Vec::new();

        for root in roots {
            let mut iter = TextUnits::new(root, &self.filter);
            units.extend(iter.by_ref());
            self.stats.merge(iter.stats());
        }

        tracing::debug!(
            "收集到 {} 个文本单元（访问 {} 个节点，跳过 {} 棵子树）",
            units.len(),
            self.stats.nodes_visited,
            self.stats.subtrees_pruned
        );

        units
    }

    pub fn get_stats(&self) -> &CollectionStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CollectionStats::default();
    }
}

/// 便利函数：收集单个子树中的文本单元
pub fn collect_units(root: &Handle, filter: &NodeFilter) -> Vec<TextUnit> {
    TextUnits::new(root, filter).collect()
}

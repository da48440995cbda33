//! 节点过滤器模块
//!
//! 判断元素及其中的文本是否需要处理

use std::collections::HashSet;

use markup5ever_rcdom::{Handle, NodeData};

use crate::parsers::html::dom::{get_node_attr, get_node_attr_values, get_node_name};
use crate::word_break::config::{constants, WordBreakConfig};

/// 元素分类
///
/// 只有 `Content` 的子树会被继续遍历。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    /// 普通内容
    Content,
    /// 排除的元素（script、style 等）
    Excluded,
    /// 开发者工具注入的元素
    Tooling,
    /// 已处理过的容器
    Processed,
}

/// 文本被拒绝的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// 空白文本
    Blank,
    /// 容器不是元素，或是文档根元素/head
    Container,
    /// 与容器某个属性值相同
    MirrorsAttribute,
}

/// 节点过滤器
#[derive(Debug, Clone)]
pub struct NodeFilter {
    excluded_tags: HashSet<String>,
    tooling_id_markers: Vec<String>,
    tooling_class_markers: Vec<String>,
}

impl Default for NodeFilter {
    fn default() -> Self {
        Self::new(&WordBreakConfig::default())
    }
}

impl NodeFilter {
    pub fn new(config: &WordBreakConfig) -> Self {
        Self {
            excluded_tags: config
                .excluded_tags
                .iter()
                .map(|tag| tag.to_ascii_lowercase())
                .collect(),
            tooling_id_markers: config.tooling_id_markers.clone(),
            tooling_class_markers: config.tooling_class_markers.clone(),
        }
    }

    /// 对节点分类，非元素节点一律视为内容
    pub fn classify(&self, node: &Handle) -> NodeClass {
        let Some(name) = get_node_name(node) else {
            return NodeClass::Content;
        };

        if is_processed(node) {
            NodeClass::Processed
        } else if self.excluded_tags.contains(&name.to_ascii_lowercase()) {
            NodeClass::Excluded
        } else if self.is_tooling(node) {
            NodeClass::Tooling
        } else {
            NodeClass::Content
        }
    }

    /// 是否为开发者工具的元素
    pub fn is_tooling(&self, node: &Handle) -> bool {
        let id_match = get_node_attr(node, "id").is_some_and(|id| {
            self.tooling_id_markers
                .iter()
                .any(|marker| id.contains(marker.as_str()))
        });

        id_match
            || get_node_attr(node, "class").is_some_and(|class| {
                self.tooling_class_markers
                    .iter()
                    .any(|marker| class.contains(marker.as_str()))
            })
    }

    /// 变更目标是否应被忽略（工具、文档根元素、已处理容器）
    pub fn is_ignored_target(&self, node: &Handle) -> bool {
        is_document_root(node) || self.classify(node) != NodeClass::Content
    }

    /// 检查文本及其直接容器
    pub fn check_text(&self, text: &str, container: &Handle) -> Result<(), Rejection> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Rejection::Blank);
        }

        if !matches!(container.data, NodeData::Element { .. })
            || is_document_root(container)
            || self.classify(container) != NodeClass::Content
        {
            return Err(Rejection::Container);
        }

        if get_node_attr_values(container)
            .iter()
            .any(|value| value == text)
        {
            return Err(Rejection::MirrorsAttribute);
        }

        Ok(())
    }
}

/// 容器是否带有已处理标记
///
/// 只看属性是否存在，不比较属性值。
pub fn is_processed(node: &Handle) -> bool {
    get_node_attr(node, constants::PROCESSED_MARKER).is_some()
}

/// 是否为 `<html>` 或 `<head>`
pub fn is_document_root(node: &Handle) -> bool {
    get_node_name(node).is_some_and(|name| {
        constants::DOCUMENT_ROOT_TAGS
            .iter()
            .any(|tag| name.eq_ignore_ascii_case(tag))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::create_element;

    #[test]
    fn classifies_elements() {
        let filter = NodeFilter::default();

        assert_eq!(filter.classify(&create_element("p", &[])), NodeClass::Content);
        assert_eq!(filter.classify(&create_element("SCRIPT", &[])), NodeClass::Excluded);
        assert_eq!(
            filter.classify(&create_element("div", &[("id", "x__debug_panel")])),
            NodeClass::Tooling
        );
        assert_eq!(
            filter.classify(&create_element("div", &[("class", "vue-debugger")])),
            NodeClass::Tooling
        );
        assert_eq!(
            filter.classify(&create_element("p", &[("data-rwb-processed", "true")])),
            NodeClass::Processed
        );
    }

    #[test]
    fn rejects_blank_and_mirrored_text() {
        let filter = NodeFilter::default();
        let link = create_element("a", &[("title", "ホーム")]);

        assert_eq!(filter.check_text(" \n ", &link), Err(Rejection::Blank));
        assert_eq!(
            filter.check_text("ホーム", &link),
            Err(Rejection::MirrorsAttribute)
        );
        assert_eq!(filter.check_text("トップへ", &link), Ok(()));
    }

    #[test]
    fn attribute_mirror_requires_exact_text() {
        let filter = NodeFilter::default();
        let link = create_element("a", &[("title", "ホーム")]);

        // 带空白的文本与属性值不完全相同
        assert_eq!(filter.check_text(" ホーム ", &link), Ok(()));
        assert_eq!(filter.check_text("ホーム\n", &link), Ok(()));
    }

    #[test]
    fn any_marker_value_counts_as_processed() {
        let filter = NodeFilter::default();

        for value in ["", "1", "false", "true"] {
            let node = create_element("p", &[("data-rwb-processed", value)]);
            assert!(is_processed(&node), "value {:?}", value);
            assert_eq!(filter.classify(&node), NodeClass::Processed);
        }
        assert!(!is_processed(&create_element("p", &[("data-rwb", "true")])));
    }

    #[test]
    fn document_root_is_not_a_container() {
        let filter = NodeFilter::default();

        assert_eq!(
            filter.check_text("stray", &create_element("html", &[])),
            Err(Rejection::Container)
        );
        assert!(filter.is_ignored_target(&create_element("head", &[])));
        assert!(!filter.is_ignored_target(&create_element("section", &[])));
    }
}

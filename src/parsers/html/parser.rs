//! 目标选择器解析模块
//!
//! 解析用于限定处理范围的简单 CSS 选择器列表，并在 DOM 中查找匹配元素。
//!
//! ## 支持的语法
//!
//! - 标签选择器：`article`
//! - 类选择器：`.entry-content`
//! - ID 选择器：`#main`
//! - 复合选择器：`div.post-content#body`
//! - 逗号分隔的选择器列表：`.entry-content, .post-content, article`
//!
//! 后代、子代等组合器不在支持范围内，遇到时整条选择器被忽略。
//!
//! ```rust
//! use rwb::parsers::html::parser::parse_selector_list;
//!
//! let selectors = parse_selector_list(".entry-content, article");
//! assert_eq!(selectors.len(), 2);
//! assert_eq!(selectors[1].tag.as_deref(), Some("article"));
//! ```

use markup5ever_rcdom::{Handle, NodeData};

use super::dom::{get_node_attr, get_node_name};
use super::utils::WHITESPACES;

/// 单个复合选择器
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleSelector {
    /// 标签名（小写），`None` 或 `*` 表示任意标签
    pub tag: Option<String>,
    /// ID
    pub id: Option<String>,
    /// 需要同时具备的类名
    pub classes: Vec<String>,
}

impl SimpleSelector {
    /// 元素是否匹配该选择器
    pub fn matches(&self, node: &Handle) -> bool {
        let Some(name) = get_node_name(node) else {
            return false;
        };

        if let Some(tag) = &self.tag {
            if !name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if get_node_attr(node, "id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let class_attr = get_node_attr(node, "class").unwrap_or_default();
            let node_classes: Vec<&str> = class_attr.split(WHITESPACES).collect();
            if !self
                .classes
                .iter()
                .all(|class| node_classes.contains(&class.as_str()))
            {
                return false;
            }
        }

        true
    }
}

/// 解析单个复合选择器
///
/// 含有组合器或无法识别字符时返回 `None`。
pub fn parse_selector(input: &str) -> Option<SimpleSelector> {
    let input = input.trim();
    if input.is_empty() || input.contains(WHITESPACES) || input.contains(['>', '+', '~', '[', ':']) {
        return None;
    }

    let mut selector = SimpleSelector::default();
    let mut rest = input;

    // 开头的标签名
    let tag_end = rest.find(['.', '#']).unwrap_or(rest.len());
    if tag_end > 0 {
        let tag = &rest[..tag_end];
        if tag != "*" {
            selector.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[tag_end..];
    }

    while !rest.is_empty() {
        let marker = rest.as_bytes()[0];
        let body = &rest[1..];
        let end = body.find(['.', '#']).unwrap_or(body.len());
        let value = &body[..end];
        if value.is_empty() {
            return None;
        }

        match marker {
            b'.' => selector.classes.push(value.to_string()),
            b'#' => selector.id = Some(value.to_string()),
            _ => return None,
        }

        rest = &body[end..];
    }

    Some(selector)
}

/// 解析逗号分隔的选择器列表，无效项被忽略
pub fn parse_selector_list(selectors: &str) -> Vec<SimpleSelector> {
    selectors
        .split(',')
        .filter_map(|partial| {
            let parsed = parse_selector(partial);
            if parsed.is_none() && !partial.trim().is_empty() {
                tracing::warn!("忽略不支持的选择器: {}", partial.trim());
            }
            parsed
        })
        .collect()
}

/// 查找匹配任一选择器的最外层元素
///
/// 已匹配元素的子树不再继续搜索，避免嵌套目标被重复遍历。
pub fn find_targets(root: &Handle, selectors: &[SimpleSelector]) -> Vec<Handle> {
    let mut found = Vec::new();
    find_targets_recursive(root, selectors, &mut found);
    found
}

fn find_targets_recursive(node: &Handle, selectors: &[SimpleSelector], found: &mut Vec<Handle>) {
    if let NodeData::Element { .. } = node.data {
        if selectors.iter().any(|selector| selector.matches(node)) {
            found.push(node.clone());
            return;
        }
    }

    for child in node.children.borrow().iter() {
        find_targets_recursive(child, selectors, found);
    }
}

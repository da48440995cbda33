//! HTML解析和处理模块
//!
//! - `utils`: 基础工具函数和常量
//! - `parser`: 目标选择器解析
//! - `dom`: 基础DOM操作
//! - `serializer`: 序列化功能

pub mod dom;
pub mod parser;
pub mod serializer;
pub mod utils;

pub use dom::{
    append_child, create_element, create_text, get_charset, get_child_node_by_name, get_node_attr,
    get_node_name, get_parent_node, html_to_dom, is_connected, parse_fragment, replace_child,
    set_node_attr, text_content,
};
pub use parser::{find_targets, parse_selector_list, SimpleSelector};
pub use serializer::{serialize_document, serialize_node};
pub use utils::{escape_text, WHITESPACES};

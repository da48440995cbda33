use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{Handle, RcDom, SerializableHandle};

use crate::word_break::error::{WordBreakError, WordBreakResult};

/// 序列化文档
pub fn serialize_document(dom: RcDom, document_encoding: &str) -> WordBreakResult<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = dom.document.into();
    serialize(&mut buf, &serializable, SerializeOpts::default())
        .map_err(|e| WordBreakError::SerializationError(format!("无法序列化DOM: {}", e)))?;

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            if encoding != encoding_rs::UTF_8 {
                let s: &str = &String::from_utf8_lossy(&buf);
                let (data, _, _) = encoding.encode(s);
                buf = data.to_vec();
            }
        }
    }

    Ok(buf)
}

/// 序列化单个节点（含自身）为 HTML 字符串
pub fn serialize_node(node: &Handle) -> WordBreakResult<String> {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    let opts = SerializeOpts {
        traversal_scope: html5ever::serialize::TraversalScope::IncludeNode,
        ..Default::default()
    };

    serialize(&mut buf, &serializable, opts)
        .map_err(|e| WordBreakError::SerializationError(format!("无法序列化节点: {}", e)))?;

    String::from_utf8(buf)
        .map_err(|e| WordBreakError::SerializationError(format!("非UTF-8输出: {}", e)))
}

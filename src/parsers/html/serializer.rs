use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{RcDom, SerializableHandle};

use crate::translation::error::{TranslationError, TranslationResult};

/// 序列化文档
///
/// `document_encoding` 为空或无法识别时输出 UTF-8。
pub fn serialize_document(dom: RcDom, document_encoding: &str) -> TranslationResult<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = dom.document.into();
    serialize(&mut buf, &serializable, SerializeOpts::default()).map_err(|e| {
        TranslationError::SerializationError(format!("无法序列化DOM: {}", e))
    })?;

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            let s: &str = &String::from_utf8_lossy(&buf);
            let (data, _, _) = encoding.encode(s);
            buf = data.to_vec();
        }
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{find_nodes, html_to_dom, set_node_attr};

    #[test]
    fn test_serialize_keeps_annotation_attr() {
        let dom = html_to_dom("<p>你好</p>".as_bytes(), "utf-8");
        let p = find_nodes(&dom.document, &["p"]).remove(0);
        set_node_attr(&p, "data-ww-translated", Some("true".to_string()));

        let out = serialize_document(dom, "utf-8").unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.contains(r#"<p data-ww-translated="true">你好</p>"#));
    }
}

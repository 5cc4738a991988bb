//! 直接文本判定
//!
//! 只有“自己的子节点里就有非空白文本”的元素才算文本容器；仅通过后代
//! 间接含有文本的祖先元素不算，避免同一句话在多层 DOM 上重复上报。

use markup5ever_rcdom::NodeData;

use super::element::Element;
use crate::parsers::html::is_blank;

/// 判断元素是否至少有一个去掉首尾空白后非空的直接文本子节点
pub fn is_direct_text_container(element: &Element) -> bool {
    element
        .handle()
        .children
        .borrow()
        .iter()
        .any(|child| match &child.data {
            NodeData::Text { contents } => !is_blank(&contents.borrow()),
            _ => false,
        })
}

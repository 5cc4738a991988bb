//! 元素身份
//!
//! 监控器只跟踪元素、不拥有元素：DOM 树归页面所有，这里持有的句柄
//! 在节点被摘下后依然有效，比较与哈希一律按节点身份（指针）进行。

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use markup5ever_rcdom::{Handle, NodeData};

use crate::parsers::html::{
    descendant_elements, get_node_attr, get_node_name, is_connected, set_node_attr, text_content,
};

/// DOM 元素引用
#[derive(Clone)]
pub struct Element(Handle);

impl Element {
    /// 包装元素节点；文本、注释等非元素节点返回 `None`
    pub fn new(handle: Handle) -> Option<Self> {
        match handle.data {
            NodeData::Element { .. } => Some(Self(handle)),
            _ => None,
        }
    }

    pub fn handle(&self) -> &Handle {
        &self.0
    }

    /// 小写标签名
    pub fn tag_name(&self) -> &str {
        get_node_name(&self.0).unwrap_or_default()
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        get_node_attr(&self.0, name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn set_attr(&self, name: &str, value: &str) {
        set_node_attr(&self.0, name, Some(value.to_string()));
    }

    /// 所有后代文本
    pub fn text_content(&self) -> String {
        text_content(&self.0)
    }

    /// 是否仍在文档中
    pub fn is_connected(&self) -> bool {
        is_connected(&self.0)
    }

    /// 按文档顺序返回所有后代元素
    pub fn descendants(&self) -> Vec<Element> {
        descendant_elements(&self.0)
            .into_iter()
            .filter_map(Element::new)
            .collect()
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag_name())?;
        if let Some(id) = self.attr("id") {
            write!(f, " id=\"{}\"", id)?;
        }
        write!(f, "@{:p}>", Rc::as_ptr(&self.0))
    }
}

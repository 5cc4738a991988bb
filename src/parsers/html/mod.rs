//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作、树结构变更
//! - `serializer`: 序列化功能

pub mod dom;
pub mod serializer;

pub use dom::{
    append_child, create_element, create_text_node, descendant_elements, detach_node, find_nodes,
    get_body, get_child_node_by_name, get_node_attr, get_node_name, get_parent_node, get_text,
    html_to_dom, is_blank, is_connected, is_element, set_node_attr, text_content, trim_text,
};
pub use serializer::serialize_document;

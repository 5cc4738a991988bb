//! # 解析器模块
//!
//! 网页文档的解析、遍历与序列化：
//!
//! - `html` - HTML文档解析、DOM查询与变更、序列化

pub mod html;

// Re-export commonly used items for convenience
pub use html::{html_to_dom, serialize_document};

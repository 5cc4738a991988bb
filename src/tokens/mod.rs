//! 分词桥接
//!
//! - **token**: 分词单元与最长匹配归约
//! - **segmenter**: 分词 / 词对齐服务客户端

pub mod segmenter;
pub mod token;

pub use segmenter::{HttpSegmenter, WordSegmenter, DEFAULT_SEGMENTER_URL};
pub use token::{longest_match, tokens_from_words, Token};

//! CEFR 词汇提取提示词

use crate::config::CefrLevel;

/// 系统提示词：按学习者等级及高一级提取词汇，输出 JSON 数组
pub const VOCABULARY_SYSTEM_PROMPT: &str = r#"The user will provide Chinese text and their CEFR level. Please extract the words that match the user's CEFR level and CEFR level + 1, and provide a context-appropriate translation, along with the corresponding CEFR level, a brief but helpful explanation, and the Chinese meaning of the explanation. Output the translation in JSON format.

Example Input:

Chinese: 我很乐意提供帮助. CEFR: A2.

Example JSON output (e.g., ... indicates omission; the actual response should be returned as required):

[
{
"original_text": "乐意",
"translation": "to be willing; to be happy to",
"CEFR_level": "B1",
"explanation": "Expresses a strong willingness or pleasure in doing something.",
"explanation_translation": "表示对做某事有强烈意愿或乐于去做。"
},
{
"original_text": "提供",
"translation": "to offer; to provide; to supply",
"CEFR_level": "A2",
...
},
{
...
}
]"#;

/// 用户提示词
pub fn vocabulary_user_prompt(text: &str, cefr: CefrLevel) -> String {
    format!("Chinese: {} CEFR: {}", text, cefr)
}

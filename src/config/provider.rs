//! 大模型厂商目录
//!
//! 收录提供 OpenAI 兼容 chat-completion 接口的主要厂商。

/// 模型厂商
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmProvider {
    pub company: &'static str,
    /// OpenAI 兼容的 base URL（通常以 `/v1` 结尾）
    pub base_url: &'static str,
    pub models: &'static [&'static str],
}

pub const MAJOR_LLM_PROVIDERS: &[LlmProvider] = &[
    LlmProvider {
        company: "OpenAI",
        base_url: "https://api.openai.com/v1",
        models: &["gpt-4o", "gpt-4o-mini", "gpt-4-turbo", "gpt-3.5-turbo"],
    },
    LlmProvider {
        company: "Anthropic",
        base_url: "https://api.anthropic.com/v1",
        models: &[
            "claude-3-opus-20240229",
            "claude-3-sonnet-20240229",
            "claude-3.5-sonnet",
        ],
    },
    LlmProvider {
        company: "Moonshot AI (Kimi)",
        base_url: "https://api.moonshot.cn/v1",
        models: &["kimi-k2-turbo-preview", "kimi-k1.5", "moonshot-v1-128k"],
    },
    LlmProvider {
        company: "DeepSeek AI",
        base_url: "https://api.deepseek.com",
        models: &["deepseek-chat", "deepseek-reasoner"],
    },
    LlmProvider {
        company: "Google (Gemini - OpenAI Compatible)",
        base_url: "https://generativelanguage.googleapis.com/v1beta/openai/",
        models: &["gemini-2.5-pro", "gemini-2.5-flash", "gemini-2.0-flash"],
    },
    LlmProvider {
        company: "Mistral AI",
        base_url: "https://api.mistral.ai/v1",
        models: &[
            "mistral-large-2402",
            "mistral-medium-2312",
            "mixtral-8x7b-instruct-v0.1",
        ],
    },
];

/// 按厂商名查找（忽略大小写）
pub fn find_provider(company: &str) -> Option<&'static LlmProvider> {
    let company = company.trim();
    MAJOR_LLM_PROVIDERS
        .iter()
        .find(|provider| provider.company.eq_ignore_ascii_case(company))
}

/// 查找提供某个模型的厂商
pub fn provider_for_model(model: &str) -> Option<&'static LlmProvider> {
    MAJOR_LLM_PROVIDERS
        .iter()
        .find(|provider| provider.models.contains(&model))
}

//! 限速、分段的翻译客户端

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::translation::backend::{GoogleTranslateBackend, TranslateBackend};
use crate::translation::config::TranslatorConfig;
use crate::translation::error::{ErrorStats, TranslationResult};
use crate::translation::segment::segment_long_text;

/// 单次翻译的语言选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOptions {
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslateOptions {
    pub fn new(source_lang: &str, target_lang: &str) -> Self {
        Self {
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        }
    }
}

impl From<&TranslatorConfig> for TranslateOptions {
    fn from(config: &TranslatorConfig) -> Self {
        Self::new(&config.source_lang, &config.target_lang)
    }
}

/// 翻译统计
#[derive(Debug, Clone, Default)]
pub struct TranslatorStats {
    pub calls: usize,
    pub segments: usize,
    pub throttled: usize,
    pub errors: ErrorStats,
}

/// 机器翻译客户端
///
/// 每次调用后端之前都会等到距上一次成功调用满 `rate_limit_delay`；
/// 超过 `max_segment_length` 的文本按句界切段，逐段调用并按顺序拼接。
/// 任意一段失败则整体失败，已得到的部分译文被丢弃。
pub struct Translator {
    backend: Arc<dyn TranslateBackend>,
    config: TranslatorConfig,
    last_call: Mutex<Option<Instant>>,
    stats: std::sync::Mutex<TranslatorStats>,
}

impl Translator {
    pub fn new(backend: Arc<dyn TranslateBackend>, config: TranslatorConfig) -> Self {
        Self {
            backend,
            config,
            last_call: Mutex::new(None),
            stats: std::sync::Mutex::new(TranslatorStats::default()),
        }
    }

    /// 使用 Google 后端创建
    pub fn google(config: TranslatorConfig) -> TranslationResult<Self> {
        config.validate()?;
        let backend = GoogleTranslateBackend::new(&config.api_url, config.timeout())?;
        Ok(Self::new(Arc::new(backend), config))
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// 使用配置中的默认语言翻译
    pub async fn translate_default(&self, text: &str) -> TranslationResult<String> {
        let options = TranslateOptions::from(&self.config);
        self.translate(text, &options).await
    }

    /// 翻译文本
    pub async fn translate(&self, text: &str, options: &TranslateOptions) -> TranslationResult<String> {
        let max = self.config.max_segment_length;
        let segments = if text.chars().count() > max {
            tracing::debug!("文本过长，切段翻译");
            segment_long_text(text, max)
        } else {
            vec![text.to_string()]
        };

        self.update_stats(|stats| {
            stats.calls += 1;
            stats.segments += segments.len();
        });

        let mut translated = Vec::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            match self.fetch_throttled(segment, options).await {
                Ok(text) => translated.push(text),
                Err(error) => {
                    tracing::error!("第 {} 段翻译失败: {}", index + 1, error);
                    self.update_stats(|stats| stats.errors.record_error(&error));
                    return Err(error.with_context(format!("Failed to translate segment {}", index + 1)));
                }
            }
        }

        Ok(translated.concat())
    }

    pub fn stats(&self) -> TranslatorStats {
        self.stats
            .lock()
            .map(|stats| stats.clone())
            .unwrap_or_default()
    }

    /// 持锁完成“等待 + 调用 + 记录时间”，并发调用之间同样保持间隔
    async fn fetch_throttled(&self, text: &str, options: &TranslateOptions) -> TranslationResult<String> {
        let mut last_call = self.last_call.lock().await;

        if let Some(last) = *last_call {
            let elapsed = last.elapsed();
            if elapsed < self.config.rate_limit_delay {
                let wait = self.config.rate_limit_delay - elapsed;
                tracing::debug!("接近速率限制，等待 {:?}", wait);
                self.update_stats(|stats| stats.throttled += 1);
                sleep(wait).await;
            }
        }

        let result = self
            .backend
            .fetch_translation(text, &options.source_lang, &options.target_lang)
            .await;

        if result.is_ok() {
            *last_call = Some(Instant::now());
        }
        result
    }

    fn update_stats<F: FnOnce(&mut TranslatorStats)>(&self, f: F) {
        if let Ok(mut stats) = self.stats.lock() {
            f(&mut stats);
        }
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::error::TranslationError;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// 记录每次调用时间的后端
    #[derive(Default)]
    struct RecordingBackend {
        calls: StdMutex<Vec<(Instant, String)>>,
        fail_on: Option<usize>,
    }

    #[async_trait]
    impl TranslateBackend for RecordingBackend {
        async fn fetch_translation(
            &self,
            text: &str,
            _source_lang: &str,
            _target_lang: &str,
        ) -> TranslationResult<String> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((Instant::now(), text.to_string()));
            if self.fail_on == Some(calls.len()) {
                return Err(TranslationError::NetworkError("status 500".to_string()));
            }
            Ok(format!("<{}>", text.chars().count()))
        }
    }

    fn translator(backend: Arc<RecordingBackend>) -> Translator {
        Translator::new(backend, TranslatorConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_calls_are_spaced() {
        let backend = Arc::new(RecordingBackend::default());
        let translator = translator(backend.clone());
        let options = TranslateOptions::new("auto", "en");

        translator.translate("一", &options).await.unwrap();
        translator.translate("二", &options).await.unwrap();

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].0 - calls[0].0 >= Duration::from_millis(200));
        assert_eq!(translator.stats().throttled, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_delay_elapsed() {
        let backend = Arc::new(RecordingBackend::default());
        let translator = translator(backend.clone());
        let options = TranslateOptions::new("auto", "en");

        translator.translate("一", &options).await.unwrap();
        sleep(Duration::from_millis(500)).await;
        translator.translate("二", &options).await.unwrap();

        assert_eq!(translator.stats().throttled, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_text_is_segmented_and_joined() {
        let backend = Arc::new(RecordingBackend::default());
        let translator = translator(backend.clone());

        let text = format!("{}. {}", "a".repeat(999), "b".repeat(500));
        let result = translator.translate_default(&text).await.unwrap();

        assert_eq!(result, "<1000><500>");
        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].0 - calls[0].0 >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_segment_failure_discards_partial_result() {
        let backend = Arc::new(RecordingBackend {
            fail_on: Some(2),
            ..Default::default()
        });
        let translator = translator(backend.clone());

        let text = "字".repeat(1500);
        let error = translator.translate_default(&text).await.unwrap_err();

        assert!(error.to_string().contains("Failed to translate segment 2"));
        assert_eq!(translator.stats().errors.total_errors, 1);
    }
}

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt;
use tokio::sync::watch;

use crate::config::CefrLevel;
use crate::llm::{parse_vocabulary, vocabulary_user_prompt, LlmCaller, EMPTY_RESPONSE};
use crate::monitor::{DomMutator, Element, FlowViewport, TextMonitor, ViewportConfig};
use crate::parsers::html::{html_to_dom, serialize_document, trim_text};
use crate::translation::error::{helpers, ErrorStats, TranslationError, TranslationResult};
use crate::translation::{TranslateOptions, Translator};

/// 已处理标记：带这个属性的元素不会再次进入注释流程
pub const TRANSLATED_ATTR: &str = "data-ww-translated";

/// 注释结果写入的属性（JSON）
pub const ANNOTATION_ATTR: &str = "data-ww-annotation";

/// Represents errors that can occur while annotating a document
#[derive(Debug)]
pub struct WordwiseError {
    details: String,
}

impl WordwiseError {
    pub fn new(msg: &str) -> WordwiseError {
        WordwiseError {
            details: msg.to_string(),
        }
    }
}

impl fmt::Display for WordwiseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl Error for WordwiseError {}

impl From<TranslationError> for WordwiseError {
    fn from(error: TranslationError) -> Self {
        WordwiseError::new(&error.to_string())
    }
}

/// 注释方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationMode {
    /// 按 CEFR 等级提取词汇（大模型）
    #[default]
    Vocabulary,
    /// 整段机器翻译
    Translate,
}

impl std::str::FromStr for AnnotationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vocabulary" | "vocab" => Ok(AnnotationMode::Vocabulary),
            "translate" | "translation" => Ok(AnnotationMode::Translate),
            other => Err(format!("未知的注释方式: {}", other)),
        }
    }
}

/// 文档注释选项
#[derive(Clone, Debug)]
pub struct AnnotateOptions {
    pub encoding: String,
    pub viewport: ViewportConfig,
    /// 最多滚动多少步；`None` 表示滚到底
    pub max_scroll_steps: Option<usize>,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            encoding: "utf-8".to_string(),
            viewport: ViewportConfig::default(),
            max_scroll_steps: None,
        }
    }
}

/// 等待注释的文本
#[derive(Clone, Debug)]
pub struct PendingText {
    pub element: Element,
    pub text: String,
}

enum Engine {
    Vocabulary { caller: LlmCaller, cefr: CefrLevel },
    Translate { translator: Translator, options: TranslateOptions },
}

/// 消费监控快照的注释器
pub struct Annotator {
    engine: Engine,
}

impl Annotator {
    pub fn vocabulary(caller: LlmCaller, cefr: CefrLevel) -> Self {
        Self {
            engine: Engine::Vocabulary { caller, cefr },
        }
    }

    pub fn translate(translator: Translator, options: TranslateOptions) -> Self {
        Self {
            engine: Engine::Translate {
                translator,
                options,
            },
        }
    }

    pub fn mode(&self) -> AnnotationMode {
        match self.engine {
            Engine::Vocabulary { .. } => AnnotationMode::Vocabulary,
            Engine::Translate { .. } => AnnotationMode::Translate,
        }
    }

    /// 从快照中挑出尚未处理的元素并打上标记
    pub fn collect_pending(&self, snapshot: &[Element]) -> Vec<PendingText> {
        let mut pending = Vec::new();
        for element in snapshot {
            if element.has_attr(TRANSLATED_ATTR) {
                continue;
            }
            element.set_attr(TRANSLATED_ATTR, "true");

            let text = trim_text(&element.text_content()).to_string();
            if text.is_empty() {
                continue;
            }
            pending.push(PendingText {
                element: element.clone(),
                text,
            });
        }
        pending
    }

    /// 生成一段文本的注释（JSON）
    pub async fn annotate_text(&self, text: &str) -> TranslationResult<String> {
        match &self.engine {
            Engine::Vocabulary { caller, cefr } => {
                let response = caller.call(&vocabulary_user_prompt(text, *cefr)).await?;
                if response == EMPTY_RESPONSE {
                    return Err(TranslationError::ModelError(response));
                }

                let entries: Vec<_> = parse_vocabulary(&response)?
                    .into_iter()
                    .filter(|entry| entry.within_reach(*cefr))
                    .collect();
                Ok(serde_json::to_string(&entries)?)
            }
            Engine::Translate {
                translator,
                options,
            } => {
                let translation = translator.translate(text, options).await?;
                Ok(serde_json::to_string(&serde_json::json!({
                    "translation": translation
                }))?)
            }
        }
    }

    /// 处理一批待注释元素，返回成功数量
    ///
    /// 单个元素失败只记录日志并计入 `errors`，然后跳过，不影响其他元素。
    pub async fn annotate(&self, pending: &[PendingText], errors: &mut ErrorStats) -> usize {
        let mut annotated = 0;
        for item in pending {
            match self.annotate_text(&item.text).await {
                Ok(annotation) => {
                    item.element.set_attr(ANNOTATION_ATTR, &annotation);
                    annotated += 1;
                }
                Err(e) => {
                    let e = e.with_context(format!("<{}> 已跳过", item.element.tag_name()));
                    helpers::report(&e);
                    errors.record_error(&e);
                }
            }
        }
        annotated
    }
}

/// 一次文档注释的统计
#[derive(Clone, Debug, Default, Serialize)]
pub struct AnnotationReport {
    pub mode: AnnotationMode,
    pub scroll_steps: usize,
    pub visible: usize,
    pub annotated: usize,
    pub skipped: usize,
    pub generated_at: String,
    #[serde(skip)]
    pub errors: ErrorStats,
}

/// 注释整篇文档
///
/// 用流式布局视口驱动监控器，从顶部按视口高度逐屏滚到底；每一屏的最新快照
/// 经 `watch` 通道交给注释器（只保留最新的一份）。
pub async fn annotate_document(
    input_data: &[u8],
    options: &AnnotateOptions,
    annotator: &Annotator,
) -> Result<(Vec<u8>, AnnotationReport), WordwiseError> {
    check_viewport(options)?;

    let dom = html_to_dom(input_data, &options.encoding);
    let document = dom.document.clone();
    let viewport = FlowViewport::new(&document, options.viewport);

    let (snapshot_tx, mut snapshot_rx) = watch::channel(Vec::<Element>::new());
    let mut monitor = TextMonitor::new(
        &document,
        viewport.clone(),
        DomMutator::new(),
        move |snapshot: &[Element]| {
            snapshot_tx.send_replace(snapshot.to_vec());
        },
    );

    let mut report = AnnotationReport {
        mode: annotator.mode(),
        ..AnnotationReport::default()
    };

    monitor.start();
    monitor.handle_intersections(&viewport.evaluate());

    loop {
        if snapshot_rx.has_changed().unwrap_or(false) {
            let snapshot = snapshot_rx.borrow_and_update().clone();
            let pending = annotator.collect_pending(&snapshot);
            let annotated = annotator.annotate(&pending, &mut report.errors).await;

            report.visible += pending.len();
            report.annotated += annotated;
            report.skipped += pending.len() - annotated;
        }

        if scroll_finished(&viewport, options, report.scroll_steps) {
            break;
        }

        report.scroll_steps += 1;
        let entries = viewport.scroll_by(options.viewport.height);
        tracing::debug!(
            "滚动到 {}，{} 个相交变化",
            viewport.scroll_top(),
            entries.len()
        );
        monitor.handle_intersections(&entries);
    }

    monitor.pause();
    drop(monitor);

    report.generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    tracing::info!(
        "注释完成: 可见 {}，成功 {}，跳过 {}",
        report.visible,
        report.annotated,
        report.skipped
    );

    let output = serialize_document(dom, &options.encoding)?;
    Ok((output, report))
}

fn check_viewport(options: &AnnotateOptions) -> Result<(), WordwiseError> {
    if options.viewport.height == 0 {
        return Err(WordwiseError::new("Viewport height must be greater than zero"));
    }
    Ok(())
}

/// 视口底边到达文档末尾，或已达到滚动步数上限
fn scroll_finished(viewport: &FlowViewport, options: &AnnotateOptions, steps: usize) -> bool {
    let bottom = viewport.scroll_top() + options.viewport.height;
    bottom >= viewport.document_height() || options.max_scroll_steps.is_some_and(|max| steps >= max)
}

/// 一个可见的直接文本元素
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VisibleText {
    pub tag: String,
    pub text: String,
}

/// 某一屏的可见集合
#[derive(Clone, Debug, Serialize)]
pub struct ScanStep {
    pub step: usize,
    pub scroll_top: usize,
    pub visible: Vec<VisibleText>,
}

/// 逐屏滚动文档，记录每一屏可见的直接文本元素（不做注释）
pub fn scan_document(
    input_data: &[u8],
    options: &AnnotateOptions,
) -> Result<Vec<ScanStep>, WordwiseError> {
    check_viewport(options)?;

    let dom = html_to_dom(input_data, &options.encoding);
    let viewport = FlowViewport::new(&dom.document, options.viewport);
    let mut monitor = TextMonitor::new(&dom.document, viewport.clone(), DomMutator::new(), |_: &[Element]| {});

    monitor.start();
    monitor.handle_intersections(&viewport.evaluate());

    let mut steps = Vec::new();
    loop {
        steps.push(ScanStep {
            step: steps.len(),
            scroll_top: viewport.scroll_top(),
            visible: monitor
                .get_visible_elements()
                .iter()
                .map(|element| VisibleText {
                    tag: element.tag_name().to_string(),
                    text: trim_text(&element.text_content()).to_string(),
                })
                .collect(),
        });

        if scroll_finished(&viewport, options, steps.len() - 1) {
            break;
        }
        monitor.handle_intersections(&viewport.scroll_by(options.viewport.height));
    }

    monitor.pause();
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::select_candidates;
    use crate::translation::{ErrorCategory, TranslateBackend, TranslatorConfig};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoBackend;

    #[async_trait]
    impl TranslateBackend for EchoBackend {
        async fn fetch_translation(
            &self,
            text: &str,
            _source_lang: &str,
            _target_lang: &str,
        ) -> TranslationResult<String> {
            if text.contains("坏") {
                return Err(TranslationError::NetworkError("boom".to_string()));
            }
            Ok(format!("<{}>", text))
        }
    }

    fn echo_annotator() -> Annotator {
        let translator = Translator::new(Arc::new(EchoBackend), TranslatorConfig::default());
        Annotator::translate(translator, TranslateOptions::new("zh", "en"))
    }

    #[test]
    fn test_annotation_mode_from_str() {
        assert_eq!("Translate".parse::<AnnotationMode>(), Ok(AnnotationMode::Translate));
        assert_eq!("vocab".parse::<AnnotationMode>(), Ok(AnnotationMode::Vocabulary));
        assert!("poetry".parse::<AnnotationMode>().is_err());
    }

    #[test]
    fn test_wordwise_error_from_translation_error() {
        let error: WordwiseError = TranslationError::ConfigError("bad".to_string()).into();
        assert_eq!(error.to_string(), "配置错误: bad");
    }

    #[test]
    fn test_collect_pending_marks_once() {
        let dom = html_to_dom(b"<p>hello</p><p>  </p>", "utf-8");
        let annotator = echo_annotator();
        let snapshot: Vec<Element> = select_candidates(&dom.document)
            .into_iter()
            .filter(|e| e.tag_name() == "p")
            .collect();

        let pending = annotator.collect_pending(&snapshot);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].text, "hello");
        assert!(snapshot.iter().all(|e| e.has_attr(TRANSLATED_ATTR)));

        assert!(annotator.collect_pending(&snapshot).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_annotate_records_skipped_failures() {
        let dom = html_to_dom("<p>好</p><p>坏</p><p>也坏</p>".as_bytes(), "utf-8");
        let annotator = echo_annotator();
        let snapshot: Vec<Element> = select_candidates(&dom.document)
            .into_iter()
            .filter(|e| e.tag_name() == "p")
            .collect();
        let pending = annotator.collect_pending(&snapshot);

        let mut errors = ErrorStats::default();
        assert_eq!(annotator.annotate(&pending, &mut errors).await, 1);
        assert_eq!(errors.total_errors, 2);
        assert_eq!(errors.retryable_errors, 2);
        assert!(snapshot[0].has_attr(ANNOTATION_ATTR));
        assert!(!snapshot[1].has_attr(ANNOTATION_ATTR));
    }

    #[tokio::test(start_paused = true)]
    async fn test_annotate_document_translate_mode() {
        let html = "<html><body><p>你好</p><div><span>坏</span></div></body></html>";
        let (output, report) =
            annotate_document(html.as_bytes(), &AnnotateOptions::default(), &echo_annotator())
                .await
                .unwrap();
        let output = String::from_utf8(output).unwrap();

        assert_eq!(report.mode, AnnotationMode::Translate);
        assert_eq!(report.visible, 2);
        assert_eq!(report.annotated, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors.total_errors, 1);
        assert_eq!(report.errors.by_category.get(&ErrorCategory::Network), Some(&1));
        assert!(output.contains("data-ww-annotation=\"{&quot;translation&quot;:&quot;<你好>&quot;}\""));
        assert!(!report.generated_at.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_annotate_document_scrolls_in_viewport_steps() {
        let mut html = String::from("<html><body>");
        for i in 0..30 {
            html.push_str(&format!("<p>段落{}</p>", i));
        }
        html.push_str("</body></html>");

        let options = AnnotateOptions {
            viewport: ViewportConfig {
                height: 240,
                line_height: 24,
                chars_per_line: 40,
            },
            ..AnnotateOptions::default()
        };
        let (_, report) = annotate_document(html.as_bytes(), &options, &echo_annotator())
            .await
            .unwrap();

        assert_eq!(report.scroll_steps, 2);
        assert_eq!(report.visible, 30);
        assert_eq!(report.annotated, 30);
    }

    #[test]
    fn test_scan_document_reports_each_screen() {
        let html = "<html><body><h1>标题</h1><p>第一段</p><p>第二段</p><p>第三段</p></body></html>";
        let options = AnnotateOptions {
            viewport: ViewportConfig {
                height: 48,
                line_height: 24,
                chars_per_line: 40,
            },
            ..AnnotateOptions::default()
        };
        let steps = scan_document(html.as_bytes(), &options).unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].scroll_top, 0);
        let first: Vec<&str> = steps[0].visible.iter().map(|v| v.text.as_str()).collect();
        assert_eq!(first, vec!["标题", "第一段"]);
        let second: Vec<&str> = steps[1].visible.iter().map(|v| v.text.as_str()).collect();
        assert_eq!(second, vec!["第二段", "第三段"]);
    }

    #[tokio::test]
    async fn test_zero_height_viewport_is_rejected() {
        let options = AnnotateOptions {
            viewport: ViewportConfig {
                height: 0,
                ..ViewportConfig::default()
            },
            ..AnnotateOptions::default()
        };
        assert!(annotate_document(b"<p>x</p>", &options, &echo_annotator())
            .await
            .is_err());
    }
}

//! Per-comment analysis.
//!
//! `CommentAnalyzer::analyze` runs normalize → detect language → maybe translate →
//! sentiment → emotion → keywords → comment type. It returns a complete
//! [`AnalysisResult`] or an [`AnalysisFailure`] naming the stage that broke, never anything
//! in between. Stages run one after another because the backend may be a single,
//! non-reentrant model server.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::classify::classify_comment_type;
use crate::error::{AnalysisFailure, Stage};
use crate::ml::NlpBackend;
use crate::models::{AnalysisResult, Scored};
use crate::text::normalize;

pub const MAX_KEYWORDS: usize = 5;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Languages whose comments are translated before classification.
    pub translate_languages: HashSet<String>,
    /// Used when detection cannot decide.
    pub default_language: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            translate_languages: ["hi", "ur"].iter().map(|s| s.to_string()).collect(),
            default_language: "en".to_string(),
        }
    }
}

/// Rounds a confidence to 3 decimals inside [0, 1].
pub fn round_score(score: f64) -> f64 {
    if !score.is_finite() {
        return 0.0;
    }
    (score.clamp(0.0, 1.0) * 1000.0).round() / 1000.0
}

/// Translates text whose language is in the configured set. Otherwise the text is returned
/// unchanged.
pub struct Translator {
    backend: Arc<dyn NlpBackend>,
    languages: HashSet<String>,
}

impl Translator {
    pub fn new(backend: Arc<dyn NlpBackend>, languages: HashSet<String>) -> Self {
        Self { backend, languages }
    }

    pub fn needs_translation(&self, lang: &str) -> bool {
        self.languages.contains(lang)
    }

    pub async fn maybe_translate(&self, text: &str, lang: &str) -> anyhow::Result<String> {
        if !self.needs_translation(lang) {
            return Ok(text.to_string());
        }
        self.backend.translate(text, lang).await
    }
}

pub struct CommentAnalyzer {
    backend: Arc<dyn NlpBackend>,
    translator: Translator,
    default_language: String,
}

impl CommentAnalyzer {
    pub fn new(backend: Arc<dyn NlpBackend>, config: PipelineConfig) -> Self {
        let translator = Translator::new(backend.clone(), config.translate_languages);
        Self {
            backend,
            translator,
            default_language: config.default_language,
        }
    }

    /// Detection problems are never fatal: they resolve to the default language.
    pub async fn detect_language(&self, text: &str) -> String {
        match self.backend.detect_language(text).await {
            Ok(Some(lang)) => lang,
            Ok(None) => {
                debug!(fallback = %self.default_language, "language undecidable");
                self.default_language.clone()
            }
            Err(e) => {
                debug!(fallback = %self.default_language, error = %e, "language detection failed");
                self.default_language.clone()
            }
        }
    }

    pub async fn analyze(&self, raw_text: &str) -> Result<AnalysisResult, AnalysisFailure> {
        let cleaned = normalize(raw_text);
        let language = self.detect_language(&cleaned).await;

        let working = self
            .translator
            .maybe_translate(&cleaned, &language)
            .await
            .map_err(|e| AnalysisFailure::new(Stage::Translation, e))?;

        let sentiment = self
            .backend
            .sentiment(&working)
            .await
            .map_err(|e| AnalysisFailure::new(Stage::Sentiment, e))?;

        let emotion = self
            .backend
            .emotion(&working)
            .await
            .map_err(|e| AnalysisFailure::new(Stage::Emotion, e))?;

        let mut keywords = self
            .backend
            .keywords(&working, MAX_KEYWORDS)
            .await
            .map_err(|e| AnalysisFailure::new(Stage::Keywords, e))?;
        keywords.truncate(MAX_KEYWORDS);

        let comment_type = classify_comment_type(&working);

        let Scored {
            label: sentiment_label,
            score: sentiment_score,
        } = sentiment;
        let Scored {
            label: emotion_label,
            score: emotion_score,
        } = emotion;

        Ok(AnalysisResult {
            language,
            cleaned_text: cleaned,
            translated_text: working,
            sentiment_label,
            sentiment_score: round_score(sentiment_score),
            emotion_label,
            emotion_score: round_score(emotion_score),
            keywords,
            comment_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::LexiconBackend;
    use crate::models::CommentType;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend with canned answers that records which texts it translated.
    #[derive(Default)]
    struct ScriptedBackend {
        language: Option<String>,
        fail_detection: bool,
        fail_emotion: bool,
        translated: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl NlpBackend for ScriptedBackend {
        async fn detect_language(&self, _text: &str) -> anyhow::Result<Option<String>> {
            if self.fail_detection {
                return Err(anyhow!("language service unreachable"));
            }
            Ok(self.language.clone())
        }

        async fn translate(&self, text: &str, source_lang: &str) -> anyhow::Result<String> {
            self.translated
                .lock()
                .unwrap()
                .push((text.to_string(), source_lang.to_string()));
            Ok("brother the video was great, please make one on thumbnails".to_string())
        }

        async fn sentiment(&self, _text: &str) -> anyhow::Result<Scored> {
            Ok(Scored {
                label: "positive".to_string(),
                score: 0.98765,
            })
        }

        async fn emotion(&self, _text: &str) -> anyhow::Result<Scored> {
            if self.fail_emotion {
                return Err(anyhow!("emotion model crashed"));
            }
            Ok(Scored {
                label: "joy".to_string(),
                score: 1.2,
            })
        }

        async fn keywords(&self, _text: &str, _top_n: usize) -> anyhow::Result<Vec<String>> {
            Ok((0..8).map(|i| format!("kw{i}")).collect())
        }
    }

    fn analyzer(backend: ScriptedBackend) -> (Arc<ScriptedBackend>, CommentAnalyzer) {
        let backend = Arc::new(backend);
        let analyzer = CommentAnalyzer::new(backend.clone(), PipelineConfig::default());
        (backend, analyzer)
    }

    #[tokio::test]
    async fn test_translates_configured_language() {
        let (backend, analyzer) = analyzer(ScriptedBackend {
            language: Some("hi".to_string()),
            ..Default::default()
        });

        let result = analyzer
            .analyze("Bhai video mast tha yaar 😍 please make one on thumbnail editing too!")
            .await
            .unwrap();

        assert_eq!(result.language, "hi");
        assert!(result.translated_text.starts_with("brother"));
        assert_eq!(result.comment_type, CommentType::Suggestion);
        let translated = backend.translated.lock().unwrap();
        assert_eq!(translated.len(), 1);
        assert_eq!(translated[0].0, result.cleaned_text);
    }

    #[tokio::test]
    async fn test_other_languages_pass_through() {
        let (backend, analyzer) = analyzer(ScriptedBackend {
            language: Some("es".to_string()),
            ..Default::default()
        });
        let result = analyzer.analyze("Muy bueno!!!").await.unwrap();
        assert_eq!(result.translated_text, "muy bueno!!");
        assert!(backend.translated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undecided_language_falls_back_to_default() {
        let (_, analyzer) = analyzer(ScriptedBackend::default());
        let result = analyzer.analyze("ok").await.unwrap();
        assert_eq!(result.language, "en");
    }

    #[tokio::test]
    async fn test_detection_error_falls_back_to_default() {
        let (backend, analyzer) = analyzer(ScriptedBackend {
            language: Some("hi".to_string()),
            fail_detection: true,
            ..Default::default()
        });
        let result = analyzer.analyze("bahut accha video").await.unwrap();
        assert_eq!(result.language, "en");
        assert_eq!(result.translated_text, result.cleaned_text);
        assert!(backend.translated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scores_rounded_and_keywords_capped() {
        let (_, analyzer) = analyzer(ScriptedBackend::default());
        let result = analyzer.analyze("nice one").await.unwrap();
        assert_eq!(result.sentiment_score, 0.988);
        assert_eq!(result.emotion_score, 1.0);
        assert_eq!(result.keywords.len(), MAX_KEYWORDS);
        assert_eq!(result.comment_type, CommentType::Praise);
    }

    #[tokio::test]
    async fn test_stage_failure_is_reported_with_stage() {
        let (_, analyzer) = analyzer(ScriptedBackend {
            fail_emotion: true,
            ..Default::default()
        });
        let err = analyzer.analyze("anything").await.unwrap_err();
        assert_eq!(err.stage, Stage::Emotion);
        assert!(err.to_string().contains("emotion model crashed"));
    }

    #[tokio::test]
    async fn test_lexicon_backend_untranslatable_comment_fails_translation() {
        let backend: Arc<dyn NlpBackend> = Arc::new(LexiconBackend::new());
        let config = PipelineConfig {
            translate_languages: ["en".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let analyzer = CommentAnalyzer::new(backend, config);
        let err = analyzer
            .analyze("this is a perfectly ordinary english sentence about a cooking video")
            .await
            .unwrap_err();
        assert_eq!(err.stage, Stage::Translation);
    }

    #[test]
    fn test_round_score_bounds() {
        assert_eq!(round_score(0.12345), 0.123);
        assert_eq!(round_score(-0.2), 0.0);
        assert_eq!(round_score(7.0), 1.0);
        assert_eq!(round_score(f64::NAN), 0.0);
    }
}

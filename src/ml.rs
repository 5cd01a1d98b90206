//! Inference capabilities used by the analysis pipeline.
//!
//! [`NlpBackend`] is the seam between the pipeline and the models. [`SidecarBackend`] calls the
//! Python model server (transformers + KeyBERT) over HTTP; `crate::lexicon` provides an
//! offline implementation. Adapters hand back fixed shapes, so the pipeline never inspects
//! raw model output.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::Scored;

#[async_trait]
pub trait NlpBackend: Send + Sync {
    /// ISO 639-1 code, or `None` when the text is too short or ambiguous to decide.
    async fn detect_language(&self, text: &str) -> Result<Option<String>>;

    /// Translates `text` from `source_lang` into the working language.
    async fn translate(&self, text: &str, source_lang: &str) -> Result<String>;

    async fn sentiment(&self, text: &str) -> Result<Scored>;

    /// Top-1 emotion.
    async fn emotion(&self, text: &str) -> Result<Scored>;

    /// Up to `top_n` 1-2 token keyphrases, most relevant first.
    async fn keywords(&self, text: &str, top_n: usize) -> Result<Vec<String>>;
}

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    source: &'a str,
}

#[derive(Debug, Serialize)]
struct KeywordsRequest<'a> {
    text: &'a str,
    top_n: usize,
}

#[derive(Debug, Deserialize)]
struct LanguageResponse {
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translation_text: String,
}

#[derive(Debug, Deserialize)]
struct KeywordsResponse {
    keywords: Vec<KeywordEntry>,
}

/// KeyBERT yields `(phrase, score)` pairs; some sidecar versions send bare phrases.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KeywordEntry {
    Phrase(String),
    Ranked(String, f64),
}

/// Classification output as a transformers pipeline emits it. With `top_k` set the
/// pipeline nests one ranked list per input; without it, it returns a flat list or a
/// single object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ClassifierOutput {
    Nested(Vec<Vec<Scored>>),
    Flat(Vec<Scored>),
    Single(Scored),
}

impl ClassifierOutput {
    /// Picks the top-ranked label regardless of shape.
    pub fn into_top(self) -> Option<Scored> {
        match self {
            ClassifierOutput::Nested(lists) => lists.into_iter().next()?.into_iter().next(),
            ClassifierOutput::Flat(items) => items.into_iter().next(),
            ClassifierOutput::Single(item) => Some(item),
        }
    }
}

/// HTTP client for the local model sidecar.
#[derive(Debug, Clone)]
pub struct SidecarBackend {
    client: reqwest::Client,
    base_url: String,
}

impl SidecarBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("building sidecar HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("sidecar unreachable at {url}. Is the model server running?"))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("sidecar {path} returned {status}: {detail}"));
        }

        response
            .json::<R>()
            .await
            .with_context(|| format!("parsing sidecar {path} response"))
    }

    async fn classify(&self, path: &str, text: &str) -> Result<Scored> {
        let output: ClassifierOutput = self.post(path, &TextRequest { text }).await?;
        output
            .into_top()
            .ok_or_else(|| anyhow!("sidecar {path} returned no labels"))
    }
}

#[async_trait]
impl NlpBackend for SidecarBackend {
    async fn detect_language(&self, text: &str) -> Result<Option<String>> {
        let res: LanguageResponse = self.post("/ml/language", &TextRequest { text }).await?;
        Ok(res.language.filter(|l| !l.is_empty()))
    }

    async fn translate(&self, text: &str, source_lang: &str) -> Result<String> {
        let res: TranslateResponse = self
            .post(
                "/ml/translate",
                &TranslateRequest {
                    text,
                    source: source_lang,
                },
            )
            .await?;
        Ok(res.translation_text)
    }

    async fn sentiment(&self, text: &str) -> Result<Scored> {
        self.classify("/ml/sentiment", text).await
    }

    async fn emotion(&self, text: &str) -> Result<Scored> {
        self.classify("/ml/emotion", text).await
    }

    async fn keywords(&self, text: &str, top_n: usize) -> Result<Vec<String>> {
        let res: KeywordsResponse = self
            .post("/ml/keywords", &KeywordsRequest { text, top_n })
            .await?;
        Ok(res
            .keywords
            .into_iter()
            .map(|entry| match entry {
                KeywordEntry::Phrase(phrase) | KeywordEntry::Ranked(phrase, _) => phrase,
            })
            .take(top_n)
            .collect())
    }
}

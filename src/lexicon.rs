//! Offline word-list backend.
//!
//! Lets the service run without the model sidecar. Sentiment and emotion come from keyword
//! lists, language from `whatlang`, and keyphrases from stopword-filtered n-gram frequency.
//! It cannot translate.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use whatlang::Lang;

use crate::ml::NlpBackend;
use crate::models::Scored;

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "good", "great", "excellent", "amazing", "wonderful", "fantastic", "superb",
        "outstanding", "brilliant", "love", "loved", "loving", "best", "better", "nice",
        "happy", "joy", "beautiful", "perfect", "awesome", "incredible", "helpful",
        "thanks", "thank", "cool", "fun", "funny", "recommend", "impressive", "mast",
        "enjoyed", "enjoy", "favorite", "favourite", "useful", "informative", "wow",
        "legend", "masterpiece", "underrated", "fire", "gem", "smiling", "heart",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "bad", "terrible", "awful", "horrible", "poor", "worst", "worse", "hate",
        "hated", "dislike", "disappointing", "disappointed", "boring", "sad", "angry",
        "annoying", "annoyed", "frustrating", "problem", "issue", "broken", "wrong",
        "useless", "waste", "scam", "fake", "clickbait", "slow", "confusing", "trash",
        "garbage", "cringe", "pathetic", "mediocre", "unsubscribed", "crying",
    ]
    .into_iter()
    .collect()
});

static EMOTION_WORDS: Lazy<Vec<(&'static str, HashSet<&'static str>)>> = Lazy::new(|| {
    vec![
        ("joy", ["love", "happy", "glad", "awesome", "great", "amazing", "fun", "enjoyed", "laughing", "smiling", "joy", "mast"].into_iter().collect()),
        ("sadness", ["sad", "miss", "crying", "cry", "tears", "lonely", "depressed", "unfortunately", "rip"].into_iter().collect()),
        ("anger", ["angry", "hate", "furious", "annoying", "annoyed", "stupid", "worst", "rage", "mad"].into_iter().collect()),
        ("fear", ["scared", "afraid", "fear", "scary", "terrifying", "worried", "nervous", "anxious"].into_iter().collect()),
        ("surprise", ["wow", "omg", "unbelievable", "shocked", "surprised", "unexpected", "whoa", "insane"].into_iter().collect()),
        ("disgust", ["disgusting", "gross", "cringe", "nasty", "eww", "yuck", "vomiting"].into_iter().collect()),
    ]
});

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "don",
        "down", "during", "each", "even", "every", "few", "for", "from", "further", "get",
        "got", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
        "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
        "let", "like", "me", "more", "most", "much", "my", "myself", "no", "nor", "not", "now",
        "of", "off", "on", "once", "one", "only", "or", "other", "our", "ours", "ourselves",
        "out", "over", "own", "please", "really", "same", "she", "should", "so", "some",
        "still", "such", "than", "that", "the", "their", "theirs", "them", "themselves",
        "then", "there", "these", "they", "this", "those", "through", "to", "too", "under",
        "until", "up", "very", "was", "we", "well", "were", "what", "when", "where", "which",
        "while", "who", "whom", "why", "will", "with", "would", "yeah", "yes", "you", "your",
        "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Word-list implementation of [`NlpBackend`].
#[derive(Debug, Default, Clone)]
pub struct LexiconBackend;

impl LexiconBackend {
    pub fn new() -> Self {
        Self
    }
}

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Maps whatlang's ISO 639-3 languages to the two-letter codes used in storage.
fn iso_639_1(lang: Lang) -> String {
    let code = match lang {
        Lang::Eng => "en",
        Lang::Hin => "hi",
        Lang::Urd => "ur",
        Lang::Spa => "es",
        Lang::Por => "pt",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Rus => "ru",
        Lang::Ara => "ar",
        Lang::Ben => "bn",
        Lang::Ind => "id",
        Lang::Tur => "tr",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh",
        Lang::Nld => "nl",
        Lang::Vie => "vi",
        Lang::Tha => "th",
        Lang::Tam => "ta",
        Lang::Tel => "te",
        Lang::Mar => "mr",
        Lang::Pan => "pa",
        other => return other.code().to_string(),
    };
    code.to_string()
}

/// Score a sentiment label from the positive share of matched words.
fn score_sentiment(text: &str) -> Scored {
    let words = words(text);
    let positive = words.iter().filter(|w| POSITIVE_WORDS.contains(w.as_str())).count();
    let negative = words.iter().filter(|w| NEGATIVE_WORDS.contains(w.as_str())).count();
    let total = positive + negative;

    if total == 0 {
        return Scored {
            label: "neutral".to_string(),
            score: 0.5,
        };
    }

    let positive_ratio = positive as f64 / total as f64;
    let (label, score) = if positive_ratio > 0.6 {
        ("positive", positive_ratio)
    } else if positive_ratio < 0.4 {
        ("negative", 1.0 - positive_ratio)
    } else {
        ("neutral", 0.5 + (positive_ratio - 0.5).abs())
    };

    Scored {
        label: label.to_string(),
        score,
    }
}

fn score_emotion(text: &str) -> Scored {
    let words = words(text);
    if words.is_empty() {
        return Scored {
            label: "neutral".to_string(),
            score: 1.0,
        };
    }

    let mut best: Option<(&str, usize)> = None;
    for (label, cues) in EMOTION_WORDS.iter() {
        let hits = words.iter().filter(|w| cues.contains(w.as_str())).count();
        if hits > 0 && best.map_or(true, |(_, b)| hits > b) {
            best = Some((*label, hits));
        }
    }

    match best {
        Some((label, hits)) => Scored {
            label: label.to_string(),
            score: (hits as f64 / words.len() as f64 * 2.0).min(1.0),
        },
        None => Scored {
            label: "neutral".to_string(),
            score: 0.5,
        },
    }
}

/// Ranks stopword-free unigrams and bigrams by occurrence count; ties keep first appearance.
fn extract_keyphrases(text: &str, top_n: usize) -> Vec<String> {
    let tokens: Vec<String> = words(text)
        .into_iter()
        .filter(|w| w.len() > 1 && !STOP_WORDS.contains(w.as_str()))
        .collect();

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut bump = |phrase: String| {
        let count = counts.entry(phrase.clone()).or_insert(0);
        if *count == 0 {
            order.push(phrase);
        }
        *count += 1;
    };

    for (i, token) in tokens.iter().enumerate() {
        bump(token.clone());
        if let Some(next) = tokens.get(i + 1) {
            bump(format!("{token} {next}"));
        }
    }

    let mut ranked: Vec<(usize, &String)> = order.iter().enumerate().collect();
    // Stable sort keeps first-seen order among equal counts.
    ranked.sort_by(|(_, a), (_, b)| counts[*b].cmp(&counts[*a]));
    ranked
        .into_iter()
        .take(top_n)
        .map(|(_, phrase)| phrase.clone())
        .collect()
}

#[async_trait]
impl NlpBackend for LexiconBackend {
    async fn detect_language(&self, text: &str) -> Result<Option<String>> {
        Ok(whatlang::detect(text)
            .filter(|info| info.is_reliable())
            .map(|info| iso_639_1(info.lang())))
    }

    async fn translate(&self, _text: &str, source_lang: &str) -> Result<String> {
        Err(anyhow!(
            "lexicon backend cannot translate from '{source_lang}'; configure the model sidecar"
        ))
    }

    async fn sentiment(&self, text: &str) -> Result<Scored> {
        Ok(score_sentiment(text))
    }

    async fn emotion(&self, text: &str) -> Result<Scored> {
        Ok(score_emotion(text))
    }

    async fn keywords(&self, text: &str, top_n: usize) -> Result<Vec<String>> {
        Ok(extract_keyphrases(text, top_n))
    }
}

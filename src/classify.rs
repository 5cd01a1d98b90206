//! Rule-based comment categorization. Rules are checked in priority order and the first
//! match wins.

use crate::models::CommentType;

const SUGGESTION_CUES: &[&str] = &["please", "suggest", "can you", "should i"];
const PRAISE_CUES: &[&str] = &["love", "awesome", "great", "amazing", "thanks", "thank you", "nice"];
const CRITICISM_CUES: &[&str] = &["bad", "worst", "hate", "terrible", "dislike", "boring"];
const PROMOTION_CUES: &[&str] = &["subscribe", "channel", "follow", "check my"];

static RULES: &[(&[&str], CommentType)] = &[
    (&["?"], CommentType::Question),
    (SUGGESTION_CUES, CommentType::Suggestion),
    (PRAISE_CUES, CommentType::Praise),
    (CRITICISM_CUES, CommentType::Criticism),
    (PROMOTION_CUES, CommentType::SpamPromotion),
];

/// Categorizes working text by case-insensitive substring containment.
pub fn classify_comment_type(text: &str) -> CommentType {
    let text = text.to_lowercase();
    RULES
        .iter()
        .find(|(cues, _)| cues.iter().any(|cue| text.contains(cue)))
        .map(|(_, ty)| *ty)
        .unwrap_or(CommentType::General)
}

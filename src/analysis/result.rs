//! Structured analysis result and its UI-facing projection
//!
//! The rubric scores 25 sub-criteria across six categories, each category
//! carrying its own 1-10 `overall_score`. Validation happens before a result
//! is accepted anywhere; the top-level `overall_score` is the only field that
//! may be backfilled (mean of the 25 sub-scores, one decimal place).

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisError;

/// Voice and sound delivery scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceAndSound {
    pub volume: u8,
    pub pace: u8,
    pub pitch_variation: u8,
    pub clarity: u8,
    pub pause_usage: u8,
    pub overall_score: u8,
}

/// Word choice scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordChoice {
    pub vocabulary_range: u8,
    pub precision: u8,
    pub vividness: u8,
    pub appropriateness: u8,
    pub overall_score: u8,
}

/// Sentence construction scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceStructure {
    pub completeness: u8,
    pub conciseness: u8,
    pub variety: u8,
    pub grammatical_accuracy: u8,
    pub overall_score: u8,
}

/// Conversational manner scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationalStyle {
    pub engagement: u8,
    pub naturalness: u8,
    pub confidence: u8,
    pub empathy: u8,
    pub overall_score: u8,
}

/// Non-verbal delivery scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonverbalCommunication {
    pub eye_contact: u8,
    pub facial_expression: u8,
    pub posture: u8,
    pub gestures: u8,
    pub overall_score: u8,
}

/// Overall impression scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallImpression {
    pub persuasiveness: u8,
    pub memorability: u8,
    pub authenticity: u8,
    pub delivery: u8,
    pub overall_score: u8,
}

/// A filler word and how often it occurred
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillerWord {
    pub word: String,
    pub count: u32,
}

/// A repeated phrase and how often it occurred
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatedPhrase {
    pub phrase: String,
    pub count: u32,
}

/// Disfluency report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Disfluencies {
    #[serde(default)]
    pub filler_words: Vec<FillerWord>,
    #[serde(default)]
    pub repeated_phrases: Vec<RepeatedPhrase>,
}

/// Structured output of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub video_id: String,
    pub voice_and_sound: VoiceAndSound,
    pub word_choice: WordChoice,
    pub sentence_structure: SentenceStructure,
    pub conversational_style: ConversationalStyle,
    pub nonverbal_communication: NonverbalCommunication,
    pub overall_impression: OverallImpression,
    #[serde(default)]
    pub disfluencies: Disfluencies,
    pub summary: String,
    /// Rolled-up score; backfilled from the sub-scores when the model omits it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
}

/// Category labels in rubric order
pub const CATEGORY_LABELS: [&str; 6] = [
    "Voice & sound",
    "Word choice",
    "Sentence structure",
    "Conversational style",
    "Non-verbal communication",
    "Overall impression",
];

impl AnalysisResult {
    /// All 25 named sub-scores in rubric order
    pub fn sub_scores(&self) -> Vec<(&'static str, u8)> {
        let v = &self.voice_and_sound;
        let w = &self.word_choice;
        let s = &self.sentence_structure;
        let c = &self.conversational_style;
        let n = &self.nonverbal_communication;
        let o = &self.overall_impression;

        vec![
            ("voice_and_sound.volume", v.volume),
            ("voice_and_sound.pace", v.pace),
            ("voice_and_sound.pitch_variation", v.pitch_variation),
            ("voice_and_sound.clarity", v.clarity),
            ("voice_and_sound.pause_usage", v.pause_usage),
            ("word_choice.vocabulary_range", w.vocabulary_range),
            ("word_choice.precision", w.precision),
            ("word_choice.vividness", w.vividness),
            ("word_choice.appropriateness", w.appropriateness),
            ("sentence_structure.completeness", s.completeness),
            ("sentence_structure.conciseness", s.conciseness),
            ("sentence_structure.variety", s.variety),
            ("sentence_structure.grammatical_accuracy", s.grammatical_accuracy),
            ("conversational_style.engagement", c.engagement),
            ("conversational_style.naturalness", c.naturalness),
            ("conversational_style.confidence", c.confidence),
            ("conversational_style.empathy", c.empathy),
            ("nonverbal_communication.eye_contact", n.eye_contact),
            ("nonverbal_communication.facial_expression", n.facial_expression),
            ("nonverbal_communication.posture", n.posture),
            ("nonverbal_communication.gestures", n.gestures),
            ("overall_impression.persuasiveness", o.persuasiveness),
            ("overall_impression.memorability", o.memorability),
            ("overall_impression.authenticity", o.authenticity),
            ("overall_impression.delivery", o.delivery),
        ]
    }

    /// Per-category overall scores in rubric order
    pub fn category_scores(&self) -> [(&'static str, u8); 6] {
        [
            (CATEGORY_LABELS[0], self.voice_and_sound.overall_score),
            (CATEGORY_LABELS[1], self.word_choice.overall_score),
            (CATEGORY_LABELS[2], self.sentence_structure.overall_score),
            (CATEGORY_LABELS[3], self.conversational_style.overall_score),
            (CATEGORY_LABELS[4], self.nonverbal_communication.overall_score),
            (CATEGORY_LABELS[5], self.overall_impression.overall_score),
        ]
    }

    /// Check that every score is in [1, 10]
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for (name, score) in self.sub_scores() {
            if !(1..=10).contains(&score) {
                return Err(AnalysisError::Schema(format!(
                    "{} = {} is outside 1-10",
                    name, score
                )));
            }
        }

        for (name, score) in self.category_scores() {
            if !(1..=10).contains(&score) {
                return Err(AnalysisError::Schema(format!(
                    "{} overall_score = {} is outside 1-10",
                    name, score
                )));
            }
        }

        if let Some(overall) = self.overall_score {
            if !(1.0..=10.0).contains(&overall) {
                return Err(AnalysisError::Schema(format!(
                    "overall_score = {} is outside 1-10",
                    overall
                )));
            }
        }

        Ok(())
    }

    /// Mean of the 25 sub-scores, rounded to one decimal place
    pub fn mean_sub_score(&self) -> f64 {
        let scores = self.sub_scores();
        let sum: u32 = scores.iter().map(|(_, s)| u32::from(*s)).sum();
        let mean = f64::from(sum) / scores.len() as f64;
        (mean * 10.0).round() / 10.0
    }

    /// Stamp the owning recording id and backfill a missing overall score.
    ///
    /// The model sometimes echoes its own placeholder id and sometimes omits
    /// `overall_score`; both are normalized here, never on parse failure.
    pub fn finalize(&mut self, recording_id: &str) {
        self.video_id = recording_id.to_string();
        if self.overall_score.is_none() {
            self.overall_score = Some(self.mean_sub_score());
        }
    }
}

/// UI-facing projection of an analysis result
///
/// Pure, deterministic mapping; computed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachingReport {
    pub summary: String,
    pub overall_score: f64,
    pub strengths: Vec<String>,
    pub opportunities: Vec<String>,
    pub delivery_note: String,
    pub pace_note: String,
    pub filler_note: String,
}

impl CoachingReport {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let categories = result.category_scores();

        let strengths: Vec<String> = categories
            .iter()
            .filter(|(_, score)| *score >= 8)
            .map(|(label, score)| format!("{} ({}/10)", label, score))
            .collect();

        // Two weakest categories, rubric order breaking ties.
        let mut ranked: Vec<(usize, &'static str, u8)> = categories
            .iter()
            .enumerate()
            .map(|(i, (label, score))| (i, *label, *score))
            .collect();
        ranked.sort_by_key(|(i, _, score)| (*score, *i));
        let opportunities: Vec<String> = ranked
            .iter()
            .take(2)
            .map(|(_, label, score)| format!("{} ({}/10)", label, score))
            .collect();

        let delivery_note = match result.conversational_style.overall_score {
            8..=10 => "Your delivery comes across natural and engaging.",
            5..=7 => "Your delivery is solid; work on sounding more conversational.",
            _ => "Your delivery feels scripted; practice speaking off the cuff.",
        }
        .to_string();

        let pace_note = match result.voice_and_sound.pace {
            8..=10 => "Pacing is comfortable and easy to follow.",
            5..=7 => "Pacing is acceptable but uneven in places.",
            _ => "Slow down; listeners need more room between ideas.",
        }
        .to_string();

        let filler_total: u32 = result
            .disfluencies
            .filler_words
            .iter()
            .map(|f| f.count)
            .sum();
        let filler_note = if filler_total == 0 {
            "No filler words detected.".to_string()
        } else {
            format!("{} filler words detected; pause instead of filling.", filler_total)
        };

        Self {
            summary: result.summary.clone(),
            overall_score: result.overall_score.unwrap_or_else(|| result.mean_sub_score()),
            strengths,
            opportunities,
            delivery_note,
            pace_note,
            filler_note,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::uniform_result;
    use super::*;

    #[test]
    fn counts_twenty_five_sub_scores() {
        let result = uniform_result(7);
        assert_eq!(result.sub_scores().len(), 25);
    }

    #[test]
    fn validate_accepts_scores_in_range() {
        assert!(uniform_result(1).validate().is_ok());
        assert!(uniform_result(10).validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_sub_score() {
        let mut result = uniform_result(7);
        result.word_choice.precision = 11;
        let err = result.validate().unwrap_err();
        assert!(err.to_string().contains("word_choice.precision"));

        result.word_choice.precision = 0;
        assert!(result.validate().is_err());
    }

    #[test]
    fn missing_required_category_fails_to_parse() {
        let mut value = serde_json::to_value(uniform_result(6)).unwrap();
        value.as_object_mut().unwrap().remove("word_choice");
        assert!(serde_json::from_value::<AnalysisResult>(value).is_err());
    }

    #[test]
    fn finalize_backfills_overall_score_as_mean() {
        let mut result = uniform_result(8);
        result.finalize("rec-123");
        assert_eq!(result.video_id, "rec-123");
        assert_eq!(result.overall_score, Some(8.0));
    }

    #[test]
    fn finalize_keeps_model_provided_overall_score() {
        let mut result = uniform_result(8);
        result.overall_score = Some(7.5);
        result.finalize("rec-123");
        assert_eq!(result.overall_score, Some(7.5));
    }

    #[test]
    fn mean_rounds_to_one_decimal() {
        let mut result = uniform_result(7);
        result.voice_and_sound.volume = 8;
        // 24 sevens and one eight: 176/25 = 7.04 -> 7.0
        assert_eq!(result.mean_sub_score(), 7.0);
    }

    #[test]
    fn report_is_deterministic_and_ranks_weakest_categories() {
        let mut result = uniform_result(7);
        result.nonverbal_communication.overall_score = 4;
        result.word_choice.overall_score = 9;
        result.finalize("rec-123");

        let report = CoachingReport::from_result(&result);
        assert_eq!(report, CoachingReport::from_result(&result));
        assert_eq!(report.strengths, vec!["Word choice (9/10)".to_string()]);
        assert_eq!(report.opportunities[0], "Non-verbal communication (4/10)");
    }
}

//! Fixed evaluation rubric and structured-output schema
//!
//! The rubric is static application data sent as system instructions with
//! every analysis request; it is not user-configurable. The schema mirrors
//! [`crate::analysis::AnalysisResult`] field for field so the model cannot
//! omit a category.

use serde_json::{json, Value};

/// System instructions defining the six categories and their 1-10 anchors
pub const RUBRIC: &str = "\
You are an experienced speech coach evaluating one short practice video. \
Watch and listen to the entire video, then score the speaker against the \
rubric below. Every score is an integer from 1 to 10, where 1-2 means the \
skill is absent or actively undermines the message, 3-4 means it appears \
inconsistently and distracts the listener, 5-6 means it is adequate but \
unremarkable, 7-8 means it is consistently effective, and 9-10 means it \
is polished enough to model for other speakers. Judge only what is in the \
video; never reward or punish the topic itself.

1. VOICE AND SOUND
- volume: loud enough to be effortless to hear without shouting; 10 means \
steady projection with intentional emphasis, 1 means inaudible or blasting.
- pace: words per minute and variation; 10 means unhurried with deliberate \
speed changes for emphasis, 1 means racing or dragging throughout.
- pitch_variation: melodic range; 10 means expressive rises and falls that \
carry meaning, 1 means monotone.
- clarity: articulation of consonants and vowel endings; 10 means every word \
lands cleanly, 1 means frequent mumbling or swallowed syllables.
- pause_usage: silence as punctuation; 10 means pauses frame key ideas, 1 \
means no pauses or pauses filled with noise.
- overall_score: holistic rating of the vocal delivery.

2. WORD CHOICE
- vocabulary_range: breadth without showing off; 10 means varied and exact, \
1 means the same few words recycled.
- precision: saying exactly what is meant; 10 means no vague qualifiers, 1 \
means constant 'stuff', 'things', 'kind of'.
- vividness: concrete images and examples; 10 means the listener can picture \
it, 1 means pure abstraction.
- appropriateness: register fits the audience and occasion; 10 means pitch- \
perfect formality, 1 means jarring slang or stiffness.
- overall_score: holistic rating of the language used.

3. SENTENCE STRUCTURE
- completeness: sentences that finish; 10 means every thought closes, 1 \
means trailing fragments.
- conciseness: no scaffolding words; 10 means lean sentences, 1 means long \
wind-ups before every point.
- variety: mixed lengths and shapes; 10 means rhythm between short and long, \
1 means one repeated pattern.
- grammatical_accuracy: agreement and tense under pressure; 10 means clean \
throughout, 1 means errors that obscure meaning.
- overall_score: holistic rating of sentence construction.

4. CONVERSATIONAL STYLE
- engagement: energy directed at the listener; 10 means it feels addressed \
to me, 1 means recited into the void.
- naturalness: sounds like talking, not reading; 10 means spontaneous, 1 \
means robotic recitation.
- confidence: steadiness without arrogance; 10 means settled and assured, 1 \
means audibly anxious or apologetic.
- empathy: awareness of how the message lands; 10 means anticipates the \
listener's questions, 1 means oblivious.
- overall_score: holistic rating of the conversational manner.

5. NONVERBAL COMMUNICATION
- eye_contact: looking into the lens; 10 means steady warm contact, 1 means \
eyes down or darting.
- facial_expression: face matches content; 10 means expressive and congruent, \
1 means flat or mismatched.
- posture: grounded and open; 10 means still, upright, relaxed, 1 means \
slouched or swaying.
- gestures: hands support the words; 10 means purposeful illustration, 1 \
means fidgeting or frozen.
- overall_score: holistic rating of non-verbal delivery.

6. OVERALL IMPRESSION
- persuasiveness: would the listener act or agree; 10 means compelling case, \
1 means no discernible point.
- memorability: what sticks afterwards; 10 means a clear takeaway phrase or \
image, 1 means instantly forgettable.
- authenticity: the speaker's own voice; 10 means genuine and specific, 1 \
means generic borrowed phrasing.
- delivery: the performance as a whole; 10 means start-to-finish command, 1 \
means the delivery fought the message.
- overall_score: holistic rating of the total impression.

DISFLUENCIES: list every filler word (um, uh, like, you know, so, actually, \
basically, and similar) with its exact occurrence count, and every phrase of \
two or more words repeated verbatim more than once with its count. Report \
empty lists rather than omitting the arrays.

SUMMARY: one paragraph, 3 to 5 sentences, written to the speaker in second \
person: lead with the strongest aspect of the performance, name the one \
change that would most improve the next take, and end with a concrete \
practice suggestion.

Return only JSON conforming exactly to the response schema. Use integer \
scores, never strings, never null.";

/// Short per-request instruction accompanying the video reference
pub const ANALYSIS_INSTRUCTION: &str =
    "Evaluate this speech-practice video against the rubric and return the scored JSON.";

fn integer_score() -> Value {
    json!({ "type": "INTEGER" })
}

fn category(sub_scores: &[&str]) -> Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();

    for name in sub_scores {
        properties.insert((*name).to_string(), integer_score());
        required.push(json!(name));
    }
    properties.insert("overall_score".to_string(), integer_score());
    required.push(json!("overall_score"));

    json!({
        "type": "OBJECT",
        "properties": Value::Object(properties),
        "required": required,
    })
}

/// Strict output schema attached to every generation request
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "video_id": { "type": "STRING" },
            "voice_and_sound": category(&[
                "volume", "pace", "pitch_variation", "clarity", "pause_usage",
            ]),
            "word_choice": category(&[
                "vocabulary_range", "precision", "vividness", "appropriateness",
            ]),
            "sentence_structure": category(&[
                "completeness", "conciseness", "variety", "grammatical_accuracy",
            ]),
            "conversational_style": category(&[
                "engagement", "naturalness", "confidence", "empathy",
            ]),
            "nonverbal_communication": category(&[
                "eye_contact", "facial_expression", "posture", "gestures",
            ]),
            "overall_impression": category(&[
                "persuasiveness", "memorability", "authenticity", "delivery",
            ]),
            "disfluencies": {
                "type": "OBJECT",
                "properties": {
                    "filler_words": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "word": { "type": "STRING" },
                                "count": { "type": "INTEGER" },
                            },
                            "required": ["word", "count"],
                        },
                    },
                    "repeated_phrases": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "phrase": { "type": "STRING" },
                                "count": { "type": "INTEGER" },
                            },
                            "required": ["phrase", "count"],
                        },
                    },
                },
                "required": ["filler_words", "repeated_phrases"],
            },
            "summary": { "type": "STRING" },
        },
        "required": [
            "video_id",
            "voice_and_sound",
            "word_choice",
            "sentence_structure",
            "conversational_style",
            "nonverbal_communication",
            "overall_impression",
            "disfluencies",
            "summary",
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_every_category() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();

        for field in [
            "voice_and_sound",
            "word_choice",
            "sentence_structure",
            "conversational_style",
            "nonverbal_communication",
            "overall_impression",
            "disfluencies",
            "summary",
            "video_id",
        ] {
            assert!(required.contains(&field), "schema must require {}", field);
        }
    }

    #[test]
    fn schema_requires_category_overall_scores() {
        let schema = response_schema();
        let required = schema["properties"]["voice_and_sound"]["required"]
            .as_array()
            .unwrap();
        assert!(required.contains(&serde_json::json!("overall_score")));
        assert_eq!(required.len(), 6);
    }

    #[test]
    fn rubric_names_all_six_categories() {
        for heading in [
            "VOICE AND SOUND",
            "WORD CHOICE",
            "SENTENCE STRUCTURE",
            "CONVERSATIONAL STYLE",
            "NONVERBAL COMMUNICATION",
            "OVERALL IMPRESSION",
        ] {
            assert!(RUBRIC.contains(heading));
        }
    }
}

//! Prompt Builder — maps task kinds and user text to instruction strings.
//!
//! Every builder here is pure. Templates use `{text}` placeholders filled with `str::replace`,
//! and the user text is always the last substitution so it is never re-scanned.

use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::tasks::kind::TaskKind;

const DESCRIBE_TEMPLATE: &str = r#"In a neutral and analytical tone, provide a brief description of the following text's meaning and intent.
Text: "{text}""#;

const CORRECT_GRAMMAR_TEMPLATE: &str = r#"Correct any grammatical errors in the following text. Only return the corrected text, nothing else.
Original Text: "{text}""#;

const REPHRASE_FLUENTLY_TEMPLATE: &str = r#"Rephrase the following text to make it sound more fluent and natural for a native speaker. Return only the rephrased text.
Original Text: "{text}""#;

const PRONOUNCE_TEMPLATE: &str = r#"Provide a simple, phonetic pronunciation guide for the following text.
Text: "{text}""#;

const EXPLAIN_THIS_TEMPLATE: &str = r#"Explain the meaning and context of the following phrase or sentence as if you were explaining it to a beginner.
Text: "{text}""#;

const TRANSLATE_TO_BENGALI_TEMPLATE: &str = r#"Translate the following English text to Bengali. Return only the Bengali translation.
English Text: "{text}""#;

const EXPLAIN_VOCABULARY_TEMPLATE: &str = r#"Identify and explain the key vocabulary words in the following text. For each word, provide a simple definition.
Text: "{text}""#;

const IMPROVE_SENTENCE_TEMPLATE: &str = r#"Analyze the following sentence for clarity, conciseness, and impact. Provide an improved version.
Original Sentence: "{text}""#;

const GENERAL_ASSISTANT_TEMPLATE: &str =
    r#"Act as a helpful general assistant and respond to the following text: "{text}""#;

/// Conversation mode, used when no task is selected.
const CONVERSATION_TEMPLATE: &str = r#"SYSTEM BEHAVIOR:
You are an AI English language conversation partner. Your ONLY goal is to have a simple, friendly conversation in English to help the user practice.
- DO NOT answer general knowledge questions (like "what is the news today?" or "who is the president?").
- If the user asks a non-conversational question, politely decline and steer the conversation back to English practice. For example, say "My role is just to help you practice conversation. Let's talk about something else! How was your day?".
- Keep your responses short and natural.

USER INPUT: "{text}"

YOUR RESPONSE (as a simple conversational partner):"#;

/// Multi-task mode. Replace `{schema}` first, then `{text}`.
const AGGREGATED_TEMPLATE: &str = r#"You are an advanced English learning assistant. Analyze the following user input:
USER INPUT: "{text}"

Based on the user's request, perform the following tasks and provide your response as a single, minified JSON object.
The JSON object should only contain the keys for the tasks requested. The required keys and their formats are:
{{schema}
}
{json_only}"#;

/// Builds the single-task instruction for `kind`, embedding `text` verbatim.
pub fn build_prompt(kind: &TaskKind, text: &str) -> String {
    let template = match kind {
        TaskKind::Describe => DESCRIBE_TEMPLATE,
        TaskKind::CorrectGrammar => CORRECT_GRAMMAR_TEMPLATE,
        TaskKind::RephraseFluently => REPHRASE_FLUENTLY_TEMPLATE,
        TaskKind::Pronounce => PRONOUNCE_TEMPLATE,
        TaskKind::ExplainThis => EXPLAIN_THIS_TEMPLATE,
        TaskKind::TranslateToBengali => TRANSLATE_TO_BENGALI_TEMPLATE,
        TaskKind::ExplainVocabulary => EXPLAIN_VOCABULARY_TEMPLATE,
        TaskKind::ImproveSentence => IMPROVE_SENTENCE_TEMPLATE,
        TaskKind::Other(_) => GENERAL_ASSISTANT_TEMPLATE,
    };
    template.replace("{text}", text)
}

/// The JSON key and value shape the model must produce for `kind`.
pub fn schema_fragment(kind: &TaskKind) -> Option<&'static str> {
    let fragment = match kind {
        TaskKind::CorrectGrammar => {
            r#"  "correction": {
    "hasError": boolean, // true if you found a grammatical error, false otherwise
    "correctedText": "string" // The corrected version of the user's sentence.
  }"#
        }
        TaskKind::RephraseFluently => {
            r#"  "rephrasing": {
    "original": "string", // The original user text
    "fluentVersion": "string" // A more fluent, natural-sounding version.
  }"#
        }
        TaskKind::ExplainThis => {
            r#"  "explanation": {
    "title": "Brief summary of the sentence's meaning",
    "breakdown": "A simple step-by-step explanation of the sentence structure and meaning."
  }"#
        }
        TaskKind::TranslateToBengali => {
            r#"  "translation": {
    "language": "Bengali",
    "translatedText": "string" // The text translated into Bengali.
  }"#
        }
        TaskKind::ExplainVocabulary => {
            r#"  "vocabulary": [
    {
      "word": "string", // The vocabulary word
      "definition": "string", // Its definition in simple English
      "example": "string" // An example sentence using the word.
    }
  ]"#
        }
        TaskKind::ImproveSentence => {
            r#"  "improvements": [
    {
      "suggestion": "string", // A suggested better version of the sentence.
      "reason": "string" // The reason why this version is an improvement.
    }
  ]"#
        }
        TaskKind::Describe => {
            r#"  "description": "A short, simple description of the subject mentioned in the text.""#
        }
        TaskKind::Pronounce => {
            r#"  "pronunciation": {
    "text": "string", // The original text
    "ipa": "string", // International Phonetic Alphabet (IPA) transcription
    "simple": "string" // A simple phonetic guide like 'pro-nun-see-AY-shun'
  }"#
        }
        TaskKind::Other(_) => return None,
    };
    Some(fragment)
}

/// Builds one combined instruction for all `tasks`.
///
/// An empty list switches to conversation mode instead of asking for JSON.
pub fn build_aggregated_prompt(text: &str, tasks: &[TaskKind]) -> String {
    if tasks.is_empty() {
        return CONVERSATION_TEMPLATE.replace("{text}", text);
    }

    let schema = tasks
        .iter()
        .filter_map(schema_fragment)
        .collect::<Vec<_>>()
        .join(",\n");

    AGGREGATED_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{schema}", &format!("\n{schema}"))
        .replace("{text}", text)
}

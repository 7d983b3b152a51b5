//! Best-guess extraction of the policy text and the suggestions from a chat
//! transcript.
//!
//! This is a heuristic. The longest assistant message is assumed to hold the
//! suggestions and the longest user message is assumed to hold the policy.
//! Neither assumption is checked: a long assistant reply that is not a list of
//! suggestions, or a policy pasted in a shorter message than some other user
//! turn, is picked up wrongly.

use crate::message::{Message, Role};

/// Trailing conversational prompts cut from the suggestions, in order.
const SUGGESTION_TAIL_MARKERS: [&str; 2] = ["Would you like", "I have created"];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedConversation {
    pub suggestions_text: String,
    pub policy_text: String,
}

/// Derives the suggestions and the policy text from `messages`.
///
/// Only user and assistant turns with non-blank content are considered.
/// Never fails; either field may come back empty.
pub fn extract_conversation(messages: &[Message]) -> ExtractedConversation {
    let relevant: Vec<&Message> = messages
        .iter()
        .filter(|m| matches!(m.role, Role::User | Role::Assistant) && !m.text().trim().is_empty())
        .collect();

    let mut suggestions_text = longest_content(&relevant, Role::Assistant).to_string();
    for marker in SUGGESTION_TAIL_MARKERS {
        if let Some(idx) = suggestions_text.find(marker) {
            suggestions_text = suggestions_text[..idx].trim().to_string();
        }
    }

    let mut policy_text = longest_content(&relevant, Role::User).to_string();
    if let Some(idx) = policy_text.find(':')
        && idx + 1 < policy_text.len()
    {
        policy_text = policy_text[idx + 1..].trim().to_string();
    }

    ExtractedConversation {
        suggestions_text,
        policy_text,
    }
}

/// Content of the longest message with `role`; the earliest one wins ties.
///
/// Length is counted in UTF-16 code units so ordering matches what the web
/// client sees for the same transcript.
fn longest_content<'a>(messages: &[&'a Message], role: Role) -> &'a str {
    let mut best: Option<(&'a str, usize)> = None;
    for message in messages.iter().filter(|m| m.role == role) {
        let text = message.text();
        let len = text.encode_utf16().count();
        if best.is_none_or(|(_, best_len)| len > best_len) {
            best = Some((text, len));
        }
    }
    best.map(|(text, _)| text).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_transcript_yields_empty_strings() {
        assert_eq!(extract_conversation(&[]), ExtractedConversation::default());
    }

    #[test]
    fn selects_longest_assistant_message_as_suggestions() {
        let extracted = extract_conversation(&[
            Message::assistant("short"),
            Message::assistant("this is the longest suggestion list with detail"),
        ]);
        assert_eq!(
            extracted.suggestions_text,
            "this is the longest suggestion list with detail"
        );
    }

    #[test]
    fn first_of_equal_length_messages_wins() {
        let extracted = extract_conversation(&[
            Message::assistant("aaaa"),
            Message::assistant("bbbb"),
            Message::user("one1"),
            Message::user("two2"),
        ]);
        assert_eq!(extracted.suggestions_text, "aaaa");
        assert_eq!(extracted.policy_text, "one1");
    }

    #[test]
    fn trailing_question_is_cut_from_suggestions() {
        let extracted = extract_conversation(&[Message::assistant(
            "- add a KYC clause\n- define limits\n...done. Would you like any further changes?",
        )]);
        assert_eq!(
            extracted.suggestions_text,
            "- add a KYC clause\n- define limits\n...done."
        );
    }

    #[test]
    fn earliest_marker_wins_when_both_are_present() {
        let extracted = extract_conversation(&[Message::assistant(
            "Tighten section 2. I have created a draft. Would you like to see it?",
        )]);
        assert_eq!(extracted.suggestions_text, "Tighten section 2.");
    }

    #[test]
    fn suggestions_without_marker_are_left_untrimmed() {
        let extracted = extract_conversation(&[Message::assistant("  keep spacing  ")]);
        assert_eq!(extracted.suggestions_text, "  keep spacing  ");
    }

    #[test]
    fn policy_text_is_taken_after_first_colon() {
        let extracted =
            extract_conversation(&[Message::user("Please review: Section 1 must comply with KYC.")]);
        assert_eq!(extracted.policy_text, "Section 1 must comply with KYC.");
    }

    #[test]
    fn only_first_colon_splits_the_policy() {
        let extracted = extract_conversation(&[Message::user("Review: Note: keep this")]);
        assert_eq!(extracted.policy_text, "Note: keep this");
    }

    #[test]
    fn policy_without_colon_is_unchanged() {
        let extracted = extract_conversation(&[Message::user("Section 1 must comply with KYC.")]);
        assert_eq!(extracted.policy_text, "Section 1 must comply with KYC.");
    }

    #[test]
    fn trailing_colon_leaves_policy_unchanged() {
        let extracted = extract_conversation(&[Message::user("Here is my policy:")]);
        assert_eq!(extracted.policy_text, "Here is my policy:");
    }

    #[test]
    fn system_and_blank_messages_are_ignored() {
        let extracted = extract_conversation(&[
            Message::system("a very long system prompt that must never be chosen as policy"),
            Message::user("   \n\t   "),
            Message {
                role: Role::Assistant,
                content: None,
            },
            Message::user("Policy: short"),
        ]);
        assert_eq!(extracted.policy_text, "short");
        assert_eq!(extracted.suggestions_text, "");
    }

    #[test]
    fn length_is_measured_in_utf16_units() {
        // "𝔸" is one char, 4 UTF-8 bytes and 2 UTF-16 units.
        let by_bytes = extract_conversation(&[Message::user("𝔸𝔸"), Message::user("abcde")]);
        assert_eq!(by_bytes.policy_text, "abcde");
        let by_chars = extract_conversation(&[Message::user("abcde"), Message::user("𝔸𝔸𝔸")]);
        assert_eq!(by_chars.policy_text, "𝔸𝔸𝔸");
    }
}

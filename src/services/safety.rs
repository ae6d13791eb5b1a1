//! Crisis detection. Safety-critical configuration: the keyword list is the
//! single source of truth for the crisis short-circuit and is reviewed
//! independently of the rest of the chat flow.
//!
//! Matching is deliberately blunt: lower-cased substring containment, no
//! stemming. False positives are accepted; widening or narrowing the list is
//! a product decision, not an engineering one.

/// High-risk phrases that bypass every provider and return the canned safety
/// message. All entries must be lower case.
const CRISIS_KEYWORDS: &[&str] = &[
    "suicide",
    "suicidal",
    "kill myself",
    "end my life",
    "want to die",
    "self harm",
    "self-harm",
    "hurt myself",
    "overdose",
    "emergency",
    "call 911",
    "can't breathe",
    "cannot breathe",
    "chest pain",
    "stroke",
    "unbearable pain",
    "worst pain of my life",
];

/// Canned safety message. Must never depend on a network call.
pub const CRISIS_RESPONSE: &str = "It sounds like you may be going through a medical or mental \
health emergency. Please don't wait: call 911 (or your local emergency number) right away, or go \
to the nearest emergency room. If you are in the US and need someone to talk to, call or text 988 \
to reach the Suicide & Crisis Lifeline, any time, day or night. Severe sickle cell pain, chest \
pain, or trouble breathing always deserves immediate medical attention. You are not alone, and \
help is available right now.";

/// True if the message contains any crisis keyword, case-insensitively.
pub fn is_crisis(message: &str) -> bool {
    let lowered = message.to_lowercase();
    CRISIS_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_crisis_any_case() {
        assert!(is_crisis("I have CHEST PAIN and can't breathe"));
        assert!(is_crisis("thinking about suicide"));
        assert!(is_crisis("This is an Emergency"));
    }

    #[test]
    fn test_casual_message_is_clean() {
        assert!(!is_crisis("what foods help with hydration?"));
        assert!(!is_crisis("tell me about sickle cell trait"));
    }

    #[test]
    fn test_substring_match_is_accepted_tradeoff() {
        // "emergency" used casually still trips the detector; that is the
        // documented safety-first behavior.
        assert!(is_crisis("where is the emergency exit on this website"));
    }

    #[test]
    fn test_keywords_are_lower_case() {
        for kw in CRISIS_KEYWORDS {
            assert_eq!(*kw, kw.to_lowercase());
        }
    }

    #[test]
    fn test_crisis_response_names_crisis_line() {
        assert!(CRISIS_RESPONSE.contains("911"));
        assert!(CRISIS_RESPONSE.contains("988"));
    }
}

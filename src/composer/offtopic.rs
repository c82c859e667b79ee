//! Canned replies for off-topic queries.

/// Keyword groups and their reply, checked in order.
pub static OFF_TOPIC_REPLIES: &[(&[&str], &str)] = &[
    (
        &["weather", "temperature", "rain", "sunny"],
        "I'm a lipstick expert, not a weather app! Tell me if it's humid where you are, though, and I'll point you to formulas that won't melt.",
    ),
    (
        &["code", "python", "javascript", "programming", "script"],
        "The only Python I know is snake print on a makeup bag. Beauty questions are my thing, got one?",
    ),
    (
        &["food", "cook", "recipe", "eat", "dinner", "lunch"],
        "My expertise ends at lip colours, not lunch. I can find you a bold red for dinner though!",
    ),
    (
        &["math", "calculate", "equation", "solve"],
        "The only numbers I crunch are undertones and SPF ratings. Got a beauty question?",
    ),
];

pub const DEFAULT_OFF_TOPIC_REPLY: &str =
    "That's outside my glam zone! Ask me anything about makeup, skincare or hair.";

/// Picks the canned reply for an off-topic `query`.
pub fn canned_reply(query: &str) -> &'static str {
    let query = query.to_lowercase();
    OFF_TOPIC_REPLIES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| query.contains(k)))
        .map(|(_, reply)| *reply)
        .unwrap_or(DEFAULT_OFF_TOPIC_REPLY)
}

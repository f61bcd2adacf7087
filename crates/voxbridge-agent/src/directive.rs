//! System directive assembly: loaded persona text plus fixed boilerplate
//! and tone parameters.

use voxbridge_core::ConversationConfig;

/// Build the system directive for one conversation.
pub fn build_directive(conversation: &ConversationConfig) -> String {
    let mut parts = Vec::new();

    parts.push(conversation.directive.clone());

    parts.push(format!(
        "You are {}, speaking with the caller over a live voice channel. \
         Keep replies short and in a spoken register; they will be \
         synthesized to speech.",
        conversation.persona_label
    ));

    parts.push(format!("Personality type: {}", conversation.tone.personality));
    parts.push(format!("Empathy level: {}/10", conversation.tone.empathy_level));

    parts.push(
        "Be natural in conversation, stay on topic, and ask follow-up \
         questions when details are missing."
            .to_string(),
    );

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxbridge_core::ToneParameters;

    #[test]
    fn test_directive_contains_persona_and_tone() {
        let conversation = ConversationConfig {
            directive: "You are a cautious cardiologist.".into(),
            persona_label: "Dr. Lane".into(),
            tone: ToneParameters {
                personality: "skeptical".into(),
                empathy_level: 3,
            },
        };

        let directive = build_directive(&conversation);
        assert!(directive.starts_with("You are a cautious cardiologist."));
        assert!(directive.contains("Dr. Lane"));
        assert!(directive.contains("Personality type: skeptical"));
        assert!(directive.contains("Empathy level: 3/10"));
    }

    #[test]
    fn test_default_config_builds_usable_directive() {
        let directive = build_directive(&ConversationConfig::default());
        assert!(directive.contains("Personality type: rational"));
        assert!(directive.contains("Empathy level: 5/10"));
    }
}

//! Prompt construction for the completion call.
//!
//! The instruction template is fixed; the only variable part is the
//! caller's text, embedded verbatim inside a quoted block at the end.  The
//! text is treated as opaque data and is deliberately not escaped or
//! sanitized: a hostile input could try to override the instructions, and
//! that residual risk is accepted rather than papered over with an ad-hoc
//! escaping scheme (see DESIGN.md).

/// System message sent alongside every prompt.
pub const SYSTEM_PROMPT: &str = "You are a psychology expert who analyzes text for \
manipulation tactics. Always respond with valid JSON only.";

/// Render the analysis prompt for one piece of text.  Deterministic: the
/// same input yields a byte-identical prompt.
pub fn build_prompt(text: &str) -> String {
    format!(
        r#"You are a psychology expert specializing in identifying manipulation tactics in conversations. Analyze the following text for psychological manipulation patterns.

Respond with a JSON object containing:
1. overallRisk: "high", "medium", or "low" based on the severity of manipulation detected
2. tacticsDetected: Array of manipulation tactics found, each with:
   - name: The name of the tactic (e.g., "Gaslighting", "Guilt-Tripping")
   - description: Brief explanation of what this tactic does
   - riskLevel: "high", "medium", or "low"
   - examples: Array of specific phrases/sentences from the text that demonstrate this tactic
   - copingStrategy: Advice on how to respond to this tactic
   - category: Type of manipulation (e.g., "emotional", "psychological", "control")
3. summary: Brief overall assessment of the manipulation patterns
4. suggestedResponses: Array of example responses that would be healthy/appropriate
5. recommendsProfessionalHelp: Boolean indicating if the situation warrants professional intervention

Common manipulation tactics to look for:
- Gaslighting (making someone question reality)
- Guilt-tripping (using guilt to control)
- Love bombing (excessive affection to manipulate)
- Emotional blackmail (threatening consequences for boundaries)
- Silent treatment (withdrawing to punish)
- Triangulation (involving third parties inappropriately)
- Moving goalposts (changing standards constantly)
- Isolation tactics (cutting off support systems)
- Victim playing (acting like the victim to avoid accountability)
- Projection (accusing others of their own behavior)

Text to analyze:
"{text}"

Respond only with valid JSON."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_deterministic() {
        let text = "You're imagining things again.";
        assert_eq!(build_prompt(text), build_prompt(text));
    }

    #[test]
    fn prompt_embeds_text_verbatim_in_quoted_block() {
        let text = "line one\nline \"two\" with quotes";
        let prompt = build_prompt(text);
        // No escaping beyond the surrounding quote characters.
        assert!(prompt.contains(&format!("Text to analyze:\n\"{text}\"")));
    }

    #[test]
    fn prompt_lists_all_canonical_tactics() {
        let prompt = build_prompt("x");
        for tactic in [
            "Gaslighting",
            "Guilt-tripping",
            "Love bombing",
            "Emotional blackmail",
            "Silent treatment",
            "Triangulation",
            "Moving goalposts",
            "Isolation tactics",
            "Victim playing",
            "Projection",
        ] {
            assert!(prompt.contains(tactic), "missing tactic: {tactic}");
        }
    }

    #[test]
    fn prompt_names_every_required_response_field() {
        let prompt = build_prompt("x");
        for field in [
            "overallRisk",
            "tacticsDetected",
            "summary",
            "suggestedResponses",
            "recommendsProfessionalHelp",
        ] {
            assert!(prompt.contains(field), "missing field: {field}");
        }
    }

    #[test]
    fn prompt_closes_with_json_only_instruction() {
        assert!(build_prompt("x").ends_with("Respond only with valid JSON."));
    }
}

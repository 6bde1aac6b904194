//! tests/classifier_tests.rs
//! Pruebas del clasificador por palabras clave.

#[cfg(test)]
mod tests {
    use crate::config::keyword_config::KeywordSets;
    use crate::models::classification_model::{FollowUpAction, Outcome};
    use crate::services::classifier_service::OutcomeClassifier;

    fn classifier() -> OutcomeClassifier {
        OutcomeClassifier::new(KeywordSets::default())
    }

    #[test]
    fn short_transcripts_are_no_response() {
        let c = classifier();
        for text in ["", "   ", "yes!", "demo yes", "  sure   ", "no thanks"] {
            let result = c.classify(text);
            assert_eq!(result.outcome, Outcome::NoResponse, "input: {:?}", text);
            assert!(!result.qualified);
            assert_eq!(result.action, FollowUpAction::FollowUp);
            assert_eq!(result.confidence, Some(0.0));
        }
    }

    #[test]
    fn classification_is_deterministic() {
        let c = classifier();
        let text = "Maybe later, I'm not sure, call back next week";
        let first = c.classify(text);
        for _ in 0..10 {
            assert_eq!(c.classify(text), first);
        }
    }

    #[test]
    fn interested_lead_is_qualified() {
        let result = classifier().classify("Agent: Hi, interested in a demo? Lead: Yes, sounds good!");
        assert_eq!(result.outcome, Outcome::Interested);
        assert!(result.qualified);
        assert_eq!(result.action, FollowUpAction::ScheduleMeeting);
        assert_eq!(result.confidence, Some(1.0));
    }

    #[test]
    fn rejection_goes_to_blocklist() {
        let result = classifier().classify("No thanks, please remove me, unsubscribe");
        assert_eq!(result.outcome, Outcome::NotInterested);
        assert!(!result.qualified);
        assert_eq!(result.action, FollowUpAction::Blocklist);
    }

    #[test]
    fn callback_wins_over_equal_or_fewer_negatives() {
        let c = classifier();
        let result = c.classify("I'm busy, call back later next week");
        assert_eq!(result.outcome, Outcome::Callback);
        assert_eq!(result.action, FollowUpAction::ScheduleCallback);
        assert!(!result.qualified);

        // busy (negativo) + call back, later, next week (callback)
        let scores = c.score("I'm busy, call back later next week");
        assert_eq!((scores.positive, scores.negative, scores.callback), (0, 1, 3));
        assert_eq!(result.confidence, Some(0.75));
    }

    #[test]
    fn text_without_keywords_is_unclear() {
        let result = classifier().classify("The weather is quite pleasant today");
        assert_eq!(result.outcome, Outcome::Unclear);
        assert!(!result.qualified);
        assert_eq!(result.action, FollowUpAction::FollowUp);
    }

    #[test]
    fn keywords_match_case_insensitively() {
        let c = OutcomeClassifier::new(KeywordSets {
            positive: vec!["ABSOLUTELY".to_string()],
            negative: vec![],
            callback: vec![],
        });
        assert_eq!(c.keywords().positive, vec!["absolutely".to_string()]);
        assert_eq!(
            c.classify("Absolutely, go ahead with it").outcome,
            Outcome::Interested
        );
    }

    #[test]
    fn simple_variant_has_no_confidence() {
        let result = OutcomeClassifier::classify_simple("Sure, schedule it for tomorrow");
        assert_eq!(result.outcome, Outcome::Interested);
        assert_eq!(result.confidence, None);

        let result = OutcomeClassifier::classify_simple("Please stop calling me");
        assert_eq!(result.outcome, Outcome::NotInterested);

        let result = OutcomeClassifier::classify_simple("I'm busy right now");
        assert_eq!(result.outcome, Outcome::Callback);

        let result = OutcomeClassifier::classify_simple("Who is this?");
        assert_eq!(result.outcome, Outcome::NoResponse);
        assert!(!result.qualified);
    }
}

//! Severity classification of scan-result text.
//!
//! The classifier never fails: transport errors, undecodable answers and
//! unknown severities all collapse into [`Classification::fallback`].

use std::sync::Arc;

use veille_core::classification::{parse_verdict, Classification};

use crate::config::ClassifierConfig;
use crate::generation::TextGenerator;

pub struct SeverityClassifier {
    generator: Arc<dyn TextGenerator>,
    config: ClassifierConfig,
}

impl SeverityClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>, config: ClassifierConfig) -> Self {
        Self { generator, config }
    }

    /// Classify `text` into a severity with recommendations.
    pub async fn classify(&self, text: &str) -> Classification {
        let prompt = build_prompt(&self.config, text);

        let answer = match self.generator.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "Text generation failed, using fallback verdict");
                return Classification::fallback();
            }
        };

        match parse_verdict(&answer) {
            Some(verdict) => verdict,
            None => {
                tracing::warn!(
                    answer_len = answer.len(),
                    "Unrecognized classifier answer, using fallback verdict",
                );
                Classification::fallback()
            }
        }
    }
}

/// The role-primed classification prompt.
pub fn build_prompt(config: &ClassifierConfig, text: &str) -> String {
    format!(
        "You are a cybersecurity professional working in {organisation}.\n\
         The following was picked up from a site:\n\n\
         {text}\n\n\
         Provide security recommendations for it considering it's for a bank system.\n\
         Recommendations should be short, 2-5 items, each like:\n\
         'Strengthen passwords: change old passwords to stronger ones...'\n\n\
         Also, classify severity as none, low, medium, high based on relevance \
         and risk to the bank's systems.\n\n\
         Respond in JSON like this:\n\
         {{\n\
         \x20   \"severity\": \"low\" | \"medium\" | \"high\" | \"none\",\n\
         \x20   \"recommendations\": [\"Recommendation 1\", \"Recommendation 2\", ...]\n\
         }}\n\n\
         Respond in {language}.\n\n\
         Please don't translate the severity to the target language. Leave it in English \
         (no matter the language, severity should either be none, high, medium or low). \
         Don't give any recommendations if severity is none.\n",
        organisation = config.organisation,
        language = config.language,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use veille_core::classification::Recommendations;
    use veille_core::severity::Severity;

    /// Replays a canned answer and records the prompts it was given.
    struct ScriptedGenerator {
        answer: Result<String, ()>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn answering(answer: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(answer.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                answer: Err(()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer
                .clone()
                .map_err(|_| GenerationError::UnexpectedShape("scripted failure".into()))
        }
    }

    fn classifier(generator: Arc<ScriptedGenerator>) -> SeverityClassifier {
        SeverityClassifier::new(generator, ClassifierConfig::default())
    }

    #[tokio::test]
    async fn high_verdict_with_recommendations() {
        let generator = ScriptedGenerator::answering(
            "```json\n{\"severity\":\"high\",\"recommendations\":[\"Rotate credentials\",\"Patch CVE\"]}\n```",
        );
        let verdict = classifier(generator.clone()).classify("leaked bank credentials").await;

        assert_eq!(verdict.severity, Severity::High);
        assert!(!verdict.fallback);
        assert_eq!(
            verdict.recommendations.to_alert_text(),
            "Rotate credentials, Patch CVE"
        );
        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("leaked bank credentials"));
    }

    #[tokio::test]
    async fn transport_failure_is_fallback_none() {
        let verdict = classifier(ScriptedGenerator::failing()).classify("x").await;
        assert_eq!(verdict, Classification::fallback());
    }

    #[tokio::test]
    async fn prose_answer_is_fallback_none() {
        let verdict = classifier(ScriptedGenerator::answering("I cannot help with that."))
            .classify("x")
            .await;
        assert_eq!(verdict.severity, Severity::None);
        assert!(verdict.fallback);
    }

    #[tokio::test]
    async fn unknown_severity_is_fallback_none() {
        let verdict = classifier(ScriptedGenerator::answering(r#"{"severity":"critical"}"#))
            .classify("x")
            .await;
        assert!(verdict.fallback);
    }

    #[tokio::test]
    async fn genuine_none_is_not_a_fallback() {
        let verdict = classifier(ScriptedGenerator::answering(
            r#"{"severity":"none","recommendations":[]}"#,
        ))
        .classify("weather report")
        .await;
        assert_eq!(verdict.severity, Severity::None);
        assert!(!verdict.fallback);
    }

    #[tokio::test]
    async fn french_label_maps_to_english_tier() {
        let verdict = classifier(ScriptedGenerator::answering(
            r#"{"severity":"élevé","recommendations":"Changer les mots de passe"}"#,
        ))
        .classify("x")
        .await;
        assert_eq!(verdict.severity, Severity::High);
        assert_eq!(
            verdict.recommendations,
            Recommendations::Text("Changer les mots de passe".into())
        );
    }

    #[test]
    fn prompt_names_organisation_and_language() {
        let prompt = build_prompt(
            &ClassifierConfig {
                language: "en".into(),
                organisation: "a regional bank".into(),
            },
            "some text",
        );
        assert!(prompt.contains("working in a regional bank."));
        assert!(prompt.contains("Respond in en."));
        assert!(prompt.contains("\"severity\": \"low\" | \"medium\" | \"high\" | \"none\""));
    }
}

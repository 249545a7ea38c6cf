//! Pipeline tests with scripted capabilities

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use crate::logic::ai_bridge::{GenerationError, TextGenerator};

    /// Replays canned responses and records every prompt it was given
    pub struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<String, GenerationError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        pub fn prompt_count(&self) -> usize {
            self.prompts.lock().len()
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().push(prompt.to_string());
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::Transport("script exhausted".to_string())))
        }
    }
}

#[cfg(test)]
mod pipeline_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::fakes::ScriptedGenerator;
    use crate::logic::ai_bridge::{normalize_rows, Embedder, GenerationError, HashingEmbedder};
    use crate::logic::index::{PolicyStore, SearchHit};
    use crate::logic::rag::{
        chunk_text, compute_confidence, dedupe_candidates, ingest_policy_text, ComplianceStatus, GroundingIssue,
        RagPipeline, RetrievedChunk, NO_CONTEXT_FOUND,
    };
    use crate::logic::risk::RiskLevel;

    const DIM: usize = 128;

    fn store_with(dir: &tempfile::TempDir, texts: &[&str]) -> Arc<PolicyStore> {
        let store = PolicyStore::empty(dir.path(), DIM);
        if !texts.is_empty() {
            let chunks: Vec<String> = texts.iter().map(|t| t.to_string()).collect();
            let mut embeddings = HashingEmbedder::new(DIM).embed(&chunks).unwrap();
            normalize_rows(&mut embeddings);
            store.add_and_persist(embeddings.view(), &chunks).unwrap();
        }
        Arc::new(store)
    }

    fn pipeline(store: Arc<PolicyStore>, generator: Arc<ScriptedGenerator>) -> RagPipeline {
        RagPipeline::new(Arc::new(HashingEmbedder::new(DIM)), generator, store)
    }

    fn hit(offset: usize, chunk: &str, similarity: f32) -> SearchHit {
        SearchHit { offset, chunk: chunk.to_string(), similarity }
    }

    #[test]
    fn test_empty_index_prompts_without_context() {
        let dir = tempfile::tempdir().unwrap();
        let generator = Arc::new(ScriptedGenerator::replying(r#"{"compliance_status": "Unknown"}"#));
        let result = pipeline(store_with(&dir, &[]), generator.clone())
            .answer("Can PHI be logged?", 5)
            .unwrap();

        assert!(result.retrieved.is_empty());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.risk.review_priority.score, 100.0);
        assert_eq!(result.compliance_status(), ComplianceStatus::Unknown);
        assert!(generator.prompts.lock()[0].contains(NO_CONTEXT_FOUND));
    }

    #[test]
    fn test_duplicates_collapse_and_ids_stay_contiguous() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(
            &dir,
            &[
                "Access to PHI is restricted to authorized workforce.",
                "  Access to PHI is restricted to authorized workforce.  ",
                "Disclosures of PHI are recorded.",
            ],
        );
        let generator = Arc::new(ScriptedGenerator::replying("{}"));
        let result = pipeline(store, generator)
            .answer("Access to PHI is restricted to authorized workforce.", 5)
            .unwrap();

        assert_eq!(result.citation_ids(), vec!["C1", "C2"]);
        assert_eq!(result.retrieved[0].text, "Access to PHI is restricted to authorized workforce.");
        assert!((result.retrieved[0].similarity - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_dedupe_law() {
        let candidates = vec![
            hit(0, "alpha", 0.9),
            hit(4, " alpha ", 0.9),
            hit(1, "beta", 0.8),
            hit(2, "alpha\n", 0.7),
            hit(3, "gamma", 0.6),
        ];
        let kept = dedupe_candidates(candidates.clone(), 5);
        let texts: Vec<&str> = kept.iter().map(|c| c.text.as_str()).collect();
        let ids: Vec<&str> = kept.iter().map(|c| c.citation_id.as_str()).collect();
        assert_eq!(texts, vec!["alpha", "beta", "gamma"]);
        assert_eq!(ids, vec!["C1", "C2", "C3"]);

        assert_eq!(dedupe_candidates(candidates, 2).len(), 2);
    }

    #[test]
    fn test_confidence_is_mean_of_top_three() {
        let chunk = |s: f32| RetrievedChunk { citation_id: "C".into(), text: String::new(), similarity: s };
        let c = compute_confidence(&[chunk(0.9), chunk(0.6), chunk(0.3), chunk(0.0)]);
        assert!((c - 0.6).abs() < 1e-6);
        assert_eq!(compute_confidence(&[chunk(-0.4)]), 0.0);
        assert_eq!(compute_confidence(&[]), 0.0);
    }

    #[test]
    fn test_generation_failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &["Audit logs must not contain PHI."]);
        let generator = Arc::new(ScriptedGenerator::new(vec![Err(GenerationError::Timeout(Duration::from_secs(120)))]));

        let result = pipeline(store, generator).answer("Can audit logs contain PHI?", 5).unwrap();
        assert!(result.generation_error.as_deref().unwrap().contains("timed out"));
        assert!(result.raw_generation_text.is_none());
        assert!(result.structured_output.is_none());
        assert!(result.parse_error.is_none());
        assert_eq!(result.retrieved.len(), 1);
        assert!(result.confidence > 0.0);
        assert_eq!(result.risk.inputs.sensitivity, 5);
    }

    #[test]
    fn test_parse_failure_keeps_raw_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &["Audit logs must not contain PHI."]);
        let generator = Arc::new(ScriptedGenerator::replying("Compliance status: Unknown"));

        let result = pipeline(store, generator).answer("Is logging PHI allowed?", 5).unwrap();
        assert_eq!(result.raw_generation_text.as_deref(), Some("Compliance status: Unknown"));
        assert!(result.structured_output.is_none());
        assert!(result.extracted_json.is_none());
        assert!(result.parse_error.is_some());
    }

    #[test]
    fn test_fenced_answer_is_grounded() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &["Audit logs must not contain PHI. Logs are retained six years."]);
        let raw = r#"```json
{
  "compliance_status": "Non-compliant",
  "explanation": ["Policy forbids PHI in audit logs"],
  "evidence": [
    {"quote": "Audit logs must not contain PHI.", "citation": "[C1]"},
    {"quote": "PHI may be logged when encrypted.", "citation": "C1"},
    {"quote": "Logs are retained six years.", "citation": "C3"}
  ],
  "recommended_mitigation": ["Redact identifiers before logging"],
  "missing_information": []
}
```"#;
        let generator = Arc::new(ScriptedGenerator::replying(raw));

        let result = pipeline(store, generator.clone())
            .answer("Can we store PHI in audit logs?", 5)
            .unwrap();

        let answer = result.structured_output.as_ref().unwrap();
        assert_eq!(answer.compliance_status, ComplianceStatus::NonCompliant);
        assert_eq!(answer.evidence.len(), 1);
        assert_eq!(answer.evidence[0].citation, "C1");
        assert_eq!(result.grounding_issues.len(), 2);
        assert!(matches!(result.grounding_issues[1], GroundingIssue::UnknownCitation { .. }));
        assert!(result.extracted_json.as_deref().unwrap().starts_with('{'));
        assert!(result.parse_error.is_none());

        assert_eq!(result.risk.inputs.severity, 5);
        assert_eq!(result.risk.compliance_risk.level, RiskLevel::High);
        assert_eq!(generator.prompt_count(), 1);
    }

    #[test]
    fn test_chunk_text_windows() {
        let text = "abcdefghij".repeat(3);
        let chunks = chunk_text(&text, 12, 2);
        assert_eq!(chunks[0].chars().count(), 12);
        // Consecutive windows overlap by 2 chars
        assert_eq!(&chunks[0][10..], &chunks[1][..2]);
        assert!(chunks.last().unwrap().ends_with('j'));

        assert_eq!(chunk_text("  a \n\n b  ", 1200, 200), vec!["a b".to_string()]);
        assert!(chunk_text("   ", 1200, 200).is_empty());
        assert!(chunk_text("abc", 0, 0).is_empty());
        // Overlap >= size still terminates
        assert_eq!(chunk_text("abcd", 2, 5).len(), 3);
    }

    #[test]
    fn test_ingest_then_retrieve() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(PolicyStore::empty(dir.path(), DIM));
        let embedder = HashingEmbedder::new(DIM);

        let policy = "Minimum necessary standard applies to all uses of PHI. ".repeat(40);
        let added = ingest_policy_text(&policy, &embedder, &store).unwrap();
        assert!(added > 1);
        assert_eq!(store.len(), added);

        let reopened = PolicyStore::open(dir.path()).unwrap();
        assert_eq!(reopened.len(), added);

        let generator = Arc::new(ScriptedGenerator::replying("{}"));
        let result = pipeline(store, generator).answer("minimum necessary PHI", 3).unwrap();
        // Windows of a repeated sentence collapse only when identical after trimming
        assert!(!result.retrieved.is_empty());
        assert!(result.retrieved.len() <= 3);
    }
}

//! RAG Pipeline - retrieve, prompt, generate, parse, ground, score
//!
//! Embedding and index failures abort the query. Generation and parse
//! failures are normal outcomes and land on the result.

use std::collections::HashSet;
use std::sync::Arc;

use super::grounding::check_grounding;
use super::parse::parse_answer;
use super::prompt::build_prompt;
use super::types::{PipelineError, PipelineResult, RetrievedChunk};
use crate::logic::ai_bridge::{embed_one, Embedder, TextGenerator};
use crate::logic::index::{PolicyStore, SearchHit};
use crate::logic::math::{clamp_or_min, round_to};
use crate::logic::risk::{synthesize, RiskKeywordRules};

/// Candidates fetched per kept chunk, for de-duplication headroom
const CANDIDATE_FACTOR: usize = 3;

/// Chunks averaged into the confidence score
const CONFIDENCE_WINDOW: usize = 3;

pub struct RagPipeline {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn TextGenerator>,
    store: Arc<PolicyStore>,
    risk_rules: RiskKeywordRules,
}

impl RagPipeline {
    pub fn new(embedder: Arc<dyn Embedder>, generator: Arc<dyn TextGenerator>, store: Arc<PolicyStore>) -> Self {
        Self {
            embedder,
            generator,
            store,
            risk_rules: RiskKeywordRules::default(),
        }
    }

    pub fn with_risk_rules(mut self, rules: RiskKeywordRules) -> Self {
        self.risk_rules = rules;
        self
    }

    pub fn store(&self) -> &PolicyStore {
        &self.store
    }

    /// Embed, search 3×top_k, de-duplicate, assign C1..Ck
    pub fn retrieve(&self, question: &str, top_k: usize) -> Result<Vec<RetrievedChunk>, PipelineError> {
        let query = embed_one(self.embedder.as_ref(), question)?;
        let candidates = self.store.search(&query, top_k.saturating_mul(CANDIDATE_FACTOR))?;
        Ok(dedupe_candidates(candidates, top_k))
    }

    pub fn answer(&self, question: &str, top_k: usize) -> Result<PipelineResult, PipelineError> {
        let retrieved = self.retrieve(question, top_k)?;

        let confidence = compute_confidence(&retrieved);
        let risk = synthesize(self.risk_rules.infer(question, confidence));

        let mut result = PipelineResult {
            question: question.to_string(),
            top_k,
            confidence: round_to(confidence, 3),
            risk,
            retrieved,
            raw_generation_text: None,
            extracted_json: None,
            structured_output: None,
            parse_error: None,
            generation_error: None,
            grounding_issues: Vec::new(),
        };

        let prompt = build_prompt(question, &result.retrieved);
        let raw = match self.generator.generate(&prompt) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Generation failed: {}", e);
                result.generation_error = Some(e.to_string());
                return Ok(result);
            }
        };

        match parse_answer(&raw) {
            Ok(parsed) => {
                let mut answer = parsed.answer;
                result.grounding_issues = check_grounding(&mut answer, &result.retrieved);
                result.extracted_json = Some(parsed.extracted_json);
                result.structured_output = Some(answer);
            }
            Err(e) => {
                log::warn!("Model output not parseable: {}", e);
                result.parse_error = Some(e.to_string());
            }
        }
        result.raw_generation_text = Some(raw);

        Ok(result)
    }
}

/// Keep the first occurrence of each trimmed text, up to `top_k`
pub fn dedupe_candidates(candidates: Vec<SearchHit>, top_k: usize) -> Vec<RetrievedChunk> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|hit| seen.insert(hit.chunk.trim().to_string()))
        .take(top_k)
        .enumerate()
        .map(|(i, hit)| RetrievedChunk {
            citation_id: format!("C{}", i + 1),
            text: hit.chunk,
            similarity: hit.similarity,
        })
        .collect()
}

/// Mean similarity of the first three kept chunks, clamped to [0, 1]
pub fn compute_confidence(retrieved: &[RetrievedChunk]) -> f64 {
    let window: Vec<f64> = retrieved
        .iter()
        .take(CONFIDENCE_WINDOW)
        .map(|c| c.similarity as f64)
        .collect();
    if window.is_empty() {
        return 0.0;
    }
    clamp_or_min(window.iter().sum::<f64>() / window.len() as f64, 0.0, 1.0)
}

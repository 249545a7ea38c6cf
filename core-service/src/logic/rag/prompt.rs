//! Prompt construction for grounded compliance answers

use super::types::RetrievedChunk;

/// Context placeholder when nothing was retrieved
pub const NO_CONTEXT_FOUND: &str = "NO_CONTEXT_FOUND";

/// "[C1] (similarity=0.812) text" blocks separated by blank lines
pub fn render_context(chunks: &[RetrievedChunk]) -> String {
    if chunks.is_empty() {
        return NO_CONTEXT_FOUND.to_string();
    }
    chunks
        .iter()
        .map(|c| format!("[{}] (similarity={:.3}) {}", c.citation_id, c.similarity, c.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn citation_range(k: usize) -> String {
    match k {
        0 => "no citations (there is no context)".to_string(),
        1 => "[C1]".to_string(),
        _ => format!("[C1]..[C{k}]"),
    }
}

pub fn build_prompt(question: &str, chunks: &[RetrievedChunk]) -> String {
    let context = render_context(chunks);
    let range = citation_range(chunks.len());

    format!(
        r#"You are a compliance assistant for GRC and audit support.
STRICT RULES (must follow):
1) Use ONLY the provided Policy Context. Do not use outside knowledge.
2) Be conservative:
   - If the context does NOT explicitly address the specific practice asked about, set compliance_status = Unknown.
   - Only set Non-compliant if the context explicitly indicates the practice violates a requirement.
   - Only set Compliant if the context explicitly allows the practice with conditions.
3) Evidence:
   - Include 2-4 evidence items if Policy Context is present.
   - Each quote MUST be copied verbatim from the Policy Context (no paraphrasing).
   - Each evidence item MUST carry an exact citation such as "C1".
4) Do NOT invent quotes. Do NOT use placeholders like [C#]. Only use {range}.
5) Citations are ONLY allowed in the evidence section, never in explanation or recommended_mitigation.

Policy Context:
{context}

Question: {question}

Return ONLY valid JSON in this exact schema:

{{
  "compliance_status": "Compliant | Non-compliant | Unknown",
  "explanation": ["bullet point 1", "bullet point 2"],
  "evidence": [{{"quote": "direct quote from context", "citation": "C1"}}],
  "recommended_mitigation": ["mitigation step 1", "mitigation step 2"],
  "missing_information": ["what additional policy detail is needed"]
}}"#
    )
}

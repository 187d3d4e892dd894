//! Question → candidate SQL translation.
//!
//! Builds the generation prompt from the question and the dataset schema,
//! invokes the model service, and normalizes the raw text into a candidate
//! query string. Normalization is purely textual (stripping whitespace and
//! markdown code fences) and never parses or validates the query; that is
//! the guard's job.

use std::sync::Arc;

use tracing::debug;

use crate::dataset::Schema;
use crate::error::LlmError;
use crate::llm::CompletionClient;

pub struct QueryTranslator {
    client: Arc<dyn CompletionClient>,
}

impl QueryTranslator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Produce a candidate query for the question. The returned string is
    /// untrusted until it passes the guard.
    pub async fn translate(&self, question: &str, schema: &Schema) -> Result<String, LlmError> {
        let prompt = build_prompt(question, schema);
        let raw = self.client.complete(&prompt).await?;
        let candidate = normalize(&raw);
        debug!(sql = %candidate, "candidate query received");
        Ok(candidate)
    }
}

fn build_prompt(question: &str, schema: &Schema) -> String {
    format!(
        "You are a senior data analyst answering questions over a SQLite table \
built from an uploaded dataset. You MUST respond with ONLY a single valid \
SQLite SELECT query that can be executed directly, and NOTHING else.\n\
\n\
RULES:\n\
- Output ONLY the final SQL query.\n\
- Do NOT include explanations, comments, markdown, backticks, or extra text.\n\
- The query must begin with the keyword SELECT.\n\
- Produce exactly one single-statement query.\n\
- Reference only the table and columns listed below.\n\
\n\
Table name: {table}\n\
Columns: {columns}\n\
\n\
User question: {question}\n\
\n\
Remember: reply with ONLY the final SQL query, nothing else.",
        table = schema.table_name,
        columns = schema.column_list(),
        question = question,
    )
}

/// Strip surrounding whitespace and, if present, a fenced code block marker
/// with an optional language tag, leaving only the query body.
fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    // Drop the opening fence line (which may carry a language tag).
    let body = match rest.find('\n') {
        Some(i) => &rest[i + 1..],
        None => rest.trim_start_matches("sql").trim_start(),
    };
    let body = body.trim_end().strip_suffix("```").unwrap_or(body);
    body.trim().to_string()
}

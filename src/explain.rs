//! Result summarization.
//!
//! Builds the second generation request of a question's pipeline run: the
//! original question, the executed SQL, and a bounded rendering of the
//! result rows. The service's reply is returned verbatim as the explanation.

use std::sync::Arc;

use tracing::debug;

use crate::db::ResultSet;
use crate::error::LlmError;
use crate::guard::ValidatedQuery;
use crate::llm::CompletionClient;
use crate::render;

pub struct ResultExplainer {
    client: Arc<dyn CompletionClient>,
    /// Maximum rows rendered into the prompt. The total row count is always
    /// stated, so the model can summarize a truncated result honestly.
    row_limit: usize,
}

impl ResultExplainer {
    pub fn new(client: Arc<dyn CompletionClient>, row_limit: usize) -> Self {
        Self { client, row_limit }
    }

    pub async fn explain(
        &self,
        question: &str,
        query: &ValidatedQuery,
        result: &ResultSet,
    ) -> Result<String, LlmError> {
        let prompt = build_prompt(question, query.as_str(), result, self.row_limit);
        let explanation = self.client.complete(&prompt).await?;
        debug!(chars = explanation.len(), "explanation received");
        Ok(explanation.trim().to_string())
    }
}

fn build_prompt(question: &str, sql: &str, result: &ResultSet, row_limit: usize) -> String {
    let mut prompt = String::from(
        "You are a helpful data analyst. You get the original user question, \
the SQL query that was executed, and the tabular result.\n\
\n\
Your job:\n\
- Explain the answer in clear, concise language.\n\
- If relevant, highlight trends, outliers, or interesting insights.\n\
- If there are many rows, summarize instead of listing everything.\n",
    );

    if result.is_empty() {
        prompt.push_str(
            "\nThe query returned ZERO rows. State clearly that no matching rows \
were found, do not summarize or invent any data, and suggest how the user \
could rephrase or broaden the question.\n",
        );
    }

    prompt.push_str(&format!(
        "\nUser question: {question}\n\
SQL query: {sql}\n\
Result ({rows} rows):\n\
{table}\n\
Now give a clear explanation to the user, in simple English.",
        question = question,
        sql = sql,
        rows = result.row_count(),
        table = render::result_table(result, row_limit),
    ));

    prompt
}

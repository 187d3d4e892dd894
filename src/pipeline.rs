//! Per-question orchestration.
//!
//! Each question runs translate → guard → execute → explain, strictly
//! forward. A failing stage short-circuits everything after it and surfaces
//! as one [`PipelineError`] tagged with the stage; the caller gets either a
//! complete [`Answer`] or that single failure, never a partial result. No
//! stage output is cached or reused across questions.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::dataset::{Dataset, Schema};
use crate::db::{DataStore, ResultSet};
use crate::error::{ExecutionError, PipelineError};
use crate::explain::ResultExplainer;
use crate::guard;
use crate::llm::CompletionClient;
use crate::translate::QueryTranslator;

/// Everything the presentation side needs to render a successful question.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// The validated SQL that was executed.
    pub sql: String,
    pub result: ResultSet,
    pub explanation: String,
}

/// One session's pipeline: the store holding the current dataset plus the
/// two model-backed stages sharing one service client.
pub struct Pipeline {
    store: DataStore,
    schema: Option<Schema>,
    translator: QueryTranslator,
    explainer: ResultExplainer,
}

impl Pipeline {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        explain_row_limit: usize,
    ) -> Result<Self, ExecutionError> {
        Ok(Self {
            store: DataStore::new()?,
            schema: None,
            translator: QueryTranslator::new(client.clone()),
            explainer: ResultExplainer::new(client, explain_row_limit),
        })
    }

    /// Load a dataset, replacing any previous one, and recompute the schema.
    /// Must complete before questions are answered; it is the session's sole
    /// writer.
    pub fn load(&mut self, dataset: &Dataset) -> Result<&Schema, ExecutionError> {
        self.store.load(dataset)?;
        Ok(self.schema.insert(Schema::of(dataset)))
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Answer one question against the loaded dataset.
    pub async fn answer(&self, question: &str) -> Result<Answer, PipelineError> {
        let schema = self.schema.as_ref().ok_or(PipelineError::NoDataset)?;

        let candidate = self
            .translator
            .translate(question, schema)
            .await
            .map_err(PipelineError::Translation)?;

        let query = guard::validate(&candidate).map_err(PipelineError::Guard)?;

        let result = self
            .store
            .execute(&query)
            .map_err(PipelineError::Execution)?;

        let explanation = self
            .explainer
            .explain(question, &query, &result)
            .await
            .map_err(PipelineError::Explanation)?;

        info!(rows = result.row_count(), "question answered");
        Ok(Answer {
            sql: query.into_inner(),
            result,
            explanation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Value;
    use crate::error::Stage;
    use crate::llm::testing::ScriptedClient;

    fn sample() -> Dataset {
        Dataset {
            columns: vec!["name".into(), "score".into()],
            rows: vec![
                vec![Value::Text("A".into()), Value::Integer(10)],
                vec![Value::Text("B".into()), Value::Integer(20)],
            ],
        }
    }

    async fn pipeline_with(
        replies: Vec<Result<&'static str, &'static str>>,
    ) -> (Pipeline, Arc<ScriptedClient>) {
        let client = Arc::new(ScriptedClient::new(replies));
        let mut pipeline = Pipeline::new(client.clone(), 50).unwrap();
        pipeline.load(&sample()).unwrap();
        (pipeline, client)
    }

    #[tokio::test]
    async fn test_average_score_end_to_end() {
        let (pipeline, client) = pipeline_with(vec![
            Ok("```sql\nSELECT AVG(score) FROM data\n```"),
            Ok("The average score is 15."),
        ])
        .await;

        let answer = pipeline.answer("what is the average score").await.unwrap();
        assert_eq!(answer.sql, "SELECT AVG(score) FROM data");
        assert_eq!(answer.result.row_count(), 1);
        assert_eq!(answer.result.columns.len(), 1);
        match &answer.result.rows[0][0] {
            Value::Real(v) => assert!((v - 15.0).abs() < f64::EPSILON),
            other => panic!("expected real average, got {:?}", other),
        }
        assert!(answer.explanation.contains("15"));
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_translation_failure_short_circuits() {
        let (pipeline, client) = pipeline_with(vec![Err("service unreachable")]).await;

        let err = pipeline.answer("anything").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Translate));
        // Guard, executor and explainer never ran: the service was called
        // exactly once, for translation.
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_guard_failure_stops_before_execution() {
        let (pipeline, client) =
            pipeline_with(vec![Ok("DROP TABLE data")]).await;

        let err = pipeline.answer("delete everything").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Guard));
        // Only the translation call happened; the explainer never ran.
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_execution_failure_stops_before_explanation() {
        let (pipeline, client) =
            pipeline_with(vec![Ok("SELECT missing_column FROM data")]).await;

        let err = pipeline.answer("q").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Execute));
        assert!(err.to_string().contains("missing_column"));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_explanation_failure_is_tagged() {
        let (pipeline, _client) = pipeline_with(vec![
            Ok("SELECT name FROM data"),
            Err("service unreachable"),
        ])
        .await;

        let err = pipeline.answer("names?").await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Explain));
    }

    #[tokio::test]
    async fn test_question_before_load_is_rejected() {
        let client = Arc::new(ScriptedClient::new([Ok("SELECT 1")]));
        let pipeline = Pipeline::new(client.clone(), 50).unwrap();

        let err = pipeline.answer("q").await.unwrap_err();
        assert!(matches!(err, PipelineError::NoDataset));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_reload_replaces_schema() {
        let (mut pipeline, _client) = pipeline_with(vec![]).await;
        assert_eq!(
            pipeline.schema().unwrap().columns,
            vec!["name", "score"]
        );

        let other = Dataset {
            columns: vec!["city".into()],
            rows: vec![vec![Value::Text("Oslo".into())]],
        };
        pipeline.load(&other).unwrap();
        assert_eq!(pipeline.schema().unwrap().columns, vec!["city"]);
    }
}

//! The analyst: decide, generate, execute, reply.

use anygraph_common::{render_history, ColumnInfo, ConversationTurn};
use anygraph_llm::{
    analysis_code_prompt, decision_prompt, parse_decision, strip_code_fences, Decision,
    GenerationOptions, LlmResult, TextGenerator,
};
use anygraph_sandbox::{Artifact, ExecutionGateway, ExecutionRequest, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// One reply to one user query, ready to persist as a conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystReply {
    /// Text shown to the user (analysis output, direct answer, or error)
    pub response_text: String,

    /// The generated code, when the query needed an execution
    pub code: Option<String>,

    /// Full execution record, when the query needed an execution
    pub execution: Option<ExecutionResult>,

    /// Chart images lifted from the output, stored separately from the text
    pub images: Vec<Artifact>,
}

impl AnalystReply {
    fn direct(response_text: String) -> Self {
        Self {
            response_text,
            code: None,
            execution: None,
            images: Vec::new(),
        }
    }
}

/// Answers user queries over a dataset by either replying from context or
/// generating and sandboxing analysis code.
///
/// Holds its collaborators by handle - no global state, construct one and
/// pass it wherever queries arrive. Calls are independent and may run
/// concurrently.
pub struct Analyst {
    generator: Arc<dyn TextGenerator>,
    gateway: ExecutionGateway,
    code_timeout: Duration,
}

impl Analyst {
    pub fn new(generator: Arc<dyn TextGenerator>, gateway: ExecutionGateway) -> Self {
        Self {
            generator,
            gateway,
            code_timeout: Duration::from_secs(60),
        }
    }

    /// Wall-clock budget granted to each generated snippet.
    pub fn with_code_timeout(mut self, timeout: Duration) -> Self {
        self.code_timeout = timeout;
        self
    }

    /// Answer one query against a dataset.
    ///
    /// LLM transport failures propagate as errors - without a completion
    /// there is nothing to reply with. Execution failures do NOT: they come
    /// back as a reply whose text carries the error, the way a chat user
    /// expects to see it.
    pub async fn answer(
        &self,
        query: &str,
        dataset_url: &str,
        columns: &[ColumnInfo],
        history: &[ConversationTurn],
    ) -> LlmResult<AnalystReply> {
        let history_block = render_history(history);

        let decision_raw = self
            .generator
            .generate(
                &decision_prompt(query, columns, &history_block),
                GenerationOptions::decision(),
            )
            .await?;

        match parse_decision(&decision_raw) {
            Decision::Direct { response } => {
                tracing::info!(query_len = query.len(), "Answered from conversation context");
                Ok(AnalystReply::direct(response))
            }
            Decision::NeedsCode => {
                self.answer_with_code(query, dataset_url, columns, &history_block)
                    .await
            }
        }
    }

    async fn answer_with_code(
        &self,
        query: &str,
        dataset_url: &str,
        columns: &[ColumnInfo],
        history_block: &str,
    ) -> LlmResult<AnalystReply> {
        let raw = self
            .generator
            .generate(
                &analysis_code_prompt(query, columns, dataset_url, history_block),
                GenerationOptions::analysis_code(),
            )
            .await?;
        let code = strip_code_fences(&raw);

        let execution = self
            .gateway
            .execute(ExecutionRequest::new(code.clone()).with_timeout(self.code_timeout))
            .await;

        let (response_text, images) = if execution.success {
            (
                execution.stdout_text.clone(),
                execution.extracted_artifacts.clone(),
            )
        } else {
            let error = execution
                .error_text
                .clone()
                .unwrap_or_else(|| "execution failed".to_string());
            (format!("Error: {error}"), Vec::new())
        };

        Ok(AnalystReply {
            response_text,
            code: Some(code),
            execution: Some(execution),
            images,
        })
    }
}

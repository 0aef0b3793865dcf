//! Request handler tying validation, prompt composition and the remote call together

use crate::error::Result;
use crate::llm::client::ReadyClient;
use crate::llm::inference::GenerativeModel;
use crate::llm::prompts::compose_prompt;
use crate::output::report::EvaluationResult;
use crate::processing::EvaluationRequest;
use crate::rules::RuleSet;
use log::{debug, info};

/// Validates and composes without contacting the model.
pub fn preview_prompt(rules: &RuleSet, request: &EvaluationRequest) -> Result<String> {
    request.validate()?;
    Ok(compose_prompt(
        rules,
        &request.job_description,
        &request.about_text,
        &request.resume_text,
    ))
}

pub struct Evaluator<M> {
    rules: RuleSet,
    client: ReadyClient<M>,
}

impl<M: GenerativeModel> Evaluator<M> {
    pub fn new(rules: RuleSet, client: ReadyClient<M>) -> Self {
        Self { rules, client }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn model_name(&self) -> String {
        self.client.model_name()
    }

    /// One request, at most one remote call. Invalid requests never reach the model.
    pub async fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationResult> {
        let prompt = preview_prompt(&self.rules, request)?;
        debug!("Composed prompt of {} characters", prompt.len());

        info!(
            "Evaluating candidate against {} ICP rules with {}",
            self.rules.len(),
            self.client.model_name()
        );
        self.client.evaluate(&prompt).await
    }
}

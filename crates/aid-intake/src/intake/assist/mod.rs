//! Optional AI help for the narrative fields on the situation step.
//!
//! The user's current text seeds the prompt. Suggestions are returned to the
//! caller and only reach the form through [`AssistSuggestion::apply_to`].

mod client;

pub use client::{ChatCompletionsClient, Credential};

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{NarrativeField, Step3Form};

pub const ASSIST_TIMEOUT: Duration = Duration::from_secs(15);

pub const SYSTEM_PROMPT: &str =
    "You help citizens write clear, compassionate descriptions for assistance applications.";

/// Instruction placed ahead of the user's text for each narrative field.
pub const fn prompt_template(field: NarrativeField) -> &'static str {
    match field {
        NarrativeField::CurrentFinancialSituation => {
            "Describe current financial situation to support assistance request."
        }
        NarrativeField::EmploymentCircumstances => {
            "Describe current employment circumstances, including unemployment or reduced hours."
        }
        NarrativeField::ReasonForApplying => {
            "Explain reasons for applying for financial assistance and hardship context."
        }
    }
}

pub fn build_prompt(field: NarrativeField, current_text: &str) -> String {
    format!(
        "{} Here's what the user wrote: \"{}\"",
        prompt_template(field),
        current_text
    )
}

/// Messages sent to the text-generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("missing API credential in ${0}")]
    MissingCredential(String),
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("No content returned")]
    EmptyResponse,
}

/// External text-generation endpoint.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssistError {
    #[error("Please write something in \"{}\" field first before using AI assistance", .0.label())]
    Empty(NarrativeField),
    #[error("{reason}")]
    RequestFailed { reason: String },
    #[error("a suggestion for \"{}\" is already being generated", .0.label())]
    InFlight(NarrativeField),
}

/// Generated text waiting for the user to accept or discard it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistSuggestion {
    pub field: NarrativeField,
    pub text: String,
}

impl AssistSuggestion {
    /// Accept: overwrite the field with the suggestion.
    pub fn apply_to(self, form: &mut Step3Form) {
        form.set_field(self.field, self.text);
    }
}

/// Issues at most one generation per narrative field at a time.
pub struct AssistRequester {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
    in_flight: Arc<Mutex<HashSet<NarrativeField>>>,
}

impl std::fmt::Debug for AssistRequester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistRequester")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AssistRequester {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self::with_timeout(generator, ASSIST_TIMEOUT)
    }

    pub fn with_timeout(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self {
            generator,
            timeout,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn is_pending(&self, field: NarrativeField) -> bool {
        self.in_flight
            .lock()
            .map(|guard| guard.contains(&field))
            .unwrap_or(false)
    }

    pub async fn suggest(
        &self,
        field: NarrativeField,
        current_text: &str,
    ) -> Result<AssistSuggestion, AssistError> {
        if current_text.trim().is_empty() {
            return Err(AssistError::Empty(field));
        }

        let _slot = InFlightSlot::claim(&self.in_flight, field)?;

        let request = GenerationRequest {
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(field, current_text),
        };

        let outcome = tokio::time::timeout(self.timeout, self.generator.generate(&request)).await;
        let text = match outcome {
            Err(_) => Err("Request timed out".to_string()),
            Ok(Err(err)) => Err(err.to_string()),
            Ok(Ok(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Err(GenerationError::EmptyResponse.to_string())
                } else {
                    Ok(trimmed.to_string())
                }
            }
        };

        match text {
            Ok(text) => {
                info!(field = field.key(), "assist suggestion ready");
                Ok(AssistSuggestion { field, text })
            }
            Err(reason) => {
                warn!(field = field.key(), %reason, "assist request failed");
                Err(AssistError::RequestFailed { reason })
            }
        }
    }
}

/// Marks a field busy until dropped, including when the request future is
/// cancelled.
struct InFlightSlot<'a> {
    fields: &'a Mutex<HashSet<NarrativeField>>,
    field: NarrativeField,
}

impl<'a> InFlightSlot<'a> {
    fn claim(
        fields: &'a Mutex<HashSet<NarrativeField>>,
        field: NarrativeField,
    ) -> Result<Self, AssistError> {
        let mut guard = fields.lock().map_err(|_| AssistError::RequestFailed {
            reason: "assist state unavailable".to_string(),
        })?;
        if !guard.insert(field) {
            return Err(AssistError::InFlight(field));
        }
        Ok(Self { fields, field })
    }
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.fields.lock() {
            guard.remove(&self.field);
        }
    }
}

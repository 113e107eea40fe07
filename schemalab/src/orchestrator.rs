//! Generation orchestration.
//!
//! One generation runs these stages, recording every failure on the
//! generation record instead of returning it:
//!
//! 1. resolve a fetch input into a new text input
//! 2. check there is non-blank input text
//! 3. commit or reuse the input and generator versions
//! 4. estimate tokens and cost, validate the schema text, guard the context
//!    window
//! 5. insert a `Loading` record
//! 6. call the model and store the value, usage and actual cost
//!
//! Stages 2 to 5 run synchronously under the workbench lock ([`Orchestrator::begin`]);
//! stage 6 runs without it ([`Orchestrator::complete`]).

use crate::output::{GenerationRecord, GenerationReference};
use crate::state::SharedWorkbench;
use schemalab_core::{CardId, GenerationError, LabError, LabResult, RecordId, TokenUsage};
use schemalab_fetch::{BoxedHttpClient, FetchError, FetchRequestConfig};
use schemalab_models::{
    calculate_actual_cost, estimate_cost, estimate_output_tokens, BoxedModel,
    BoxedPricingOracle, CostInfo, ExtractionRequest, ModelCatalog, TokenBreakdown,
};
use schemalab_schema::validate_schema_text;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A generation that passed every local check and awaits the model.
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    /// The `Loading` record.
    pub record_id: RecordId,
    /// Request to send.
    pub request: ExtractionRequest,
    /// Estimated prompt tokens.
    pub expected_input_tokens: u64,
}

/// Outcome of [`Orchestrator::begin`].
#[derive(Debug, Clone)]
pub enum Launch {
    /// Ready for [`Orchestrator::complete`].
    Pending(PendingGeneration),
    /// Rejected locally; the record is already failed.
    Rejected(RecordId),
}

impl Launch {
    /// Id of the record either way.
    #[must_use]
    pub fn record_id(&self) -> &RecordId {
        match self {
            Self::Pending(pending) => &pending.record_id,
            Self::Rejected(id) => id,
        }
    }
}

/// Runs generations against a shared workbench.
#[derive(Clone)]
pub struct Orchestrator {
    workbench: SharedWorkbench,
    model: BoxedModel,
    pricing: BoxedPricingOracle,
    http: BoxedHttpClient,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("model", &self.model.name())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create an orchestrator with the OpenAI pricing table and the HTTP
    /// client described by the workbench config.
    pub fn new(workbench: SharedWorkbench, model: BoxedModel) -> Self {
        let http = workbench.read().config().http_client();
        Self {
            workbench,
            model,
            pricing: Arc::new(ModelCatalog::default()),
            http,
        }
    }

    /// Use a different pricing oracle.
    #[must_use]
    pub fn with_pricing(mut self, pricing: BoxedPricingOracle) -> Self {
        self.pricing = pricing;
        self
    }

    /// Use a different HTTP client for fetch inputs.
    #[must_use]
    pub fn with_http_client(mut self, http: BoxedHttpClient) -> Self {
        self.http = http;
        self
    }

    /// The workbench this orchestrator writes to.
    #[must_use]
    pub fn workbench(&self) -> &SharedWorkbench {
        &self.workbench
    }

    /// Run one generation for `generator_id` against the active input.
    ///
    /// Returns the id of the record, which is terminal on return.
    ///
    /// # Errors
    ///
    /// Only [`LabError::CardNotFound`] for an unknown generator. Every other
    /// failure is stored on the record.
    pub async fn generate(&self, generator_id: &CardId) -> LabResult<RecordId> {
        self.ensure_generator(generator_id)?;

        if let Err(error) = self.resolve_active_fetch().await {
            let record = GenerationRecord::failed(generator_id.clone(), error);
            let record_id = self.workbench.write().insert_record(record);
            warn!(target: "schemalab::orchestrator", generator = %generator_id, record = %record_id, "fetch input could not be resolved");
            return Ok(record_id);
        }

        match self.begin(generator_id)? {
            Launch::Pending(pending) => Ok(self.complete(pending).await),
            Launch::Rejected(record_id) => Ok(record_id),
        }
    }

    /// Run [`generate`](Self::generate) on the tokio runtime.
    pub fn spawn_generate(&self, generator_id: CardId) -> JoinHandle<LabResult<RecordId>> {
        let this = self.clone();
        tokio::spawn(async move { this.generate(&generator_id).await })
    }

    /// Resolve a fetch input into a new active text input labelled
    /// `"<label> response"`.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`], [`LabError::InputKindMismatch`] for a
    /// text input, or [`LabError::FetchFailed`].
    pub async fn execute_fetch(&self, input_id: &CardId) -> LabResult<CardId> {
        let (label, config) = {
            let wb = self.workbench.read();
            let card = wb.input(input_id).ok_or_else(|| LabError::card_not_found(input_id))?;
            let config = card.fetch_config().cloned().ok_or_else(|| LabError::InputKindMismatch {
                card_id: input_id.to_string(),
                expected: "fetch",
            })?;
            (card.label().to_string(), config)
        };
        self.fetch_into_input(&label, config)
            .await
            .map_err(|e| LabError::FetchFailed(e.to_string()))
    }

    /// Run the local stages of a generation: input checks, version
    /// commits, estimates and the schema and context-window gates. On
    /// success a `Loading` record exists when this returns.
    ///
    /// A fetch input is treated as having no text; resolve it first with
    /// [`execute_fetch`](Self::execute_fetch).
    ///
    /// # Errors
    ///
    /// Only [`LabError::CardNotFound`] for an unknown generator.
    pub fn begin(&self, generator_id: &CardId) -> LabResult<Launch> {
        let mut wb = self.workbench.write();
        if wb.generator(generator_id).is_none() {
            return Err(LabError::card_not_found(generator_id));
        }

        let input = match wb.active_input_mut() {
            None => Err(GenerationError::NoActiveInput),
            Some(card) => {
                let data = card.text().unwrap_or_default().to_string();
                if data.trim().is_empty() {
                    Err(GenerationError::EmptyInput)
                } else {
                    Ok((card.id().clone(), card.commit_or_reuse(), data))
                }
            }
        };
        let (input_card_id, input_version, input_data) = match input {
            Ok(input) => input,
            Err(error) => {
                debug!(target: "schemalab::orchestrator", generator = %generator_id, %error, "rejected before estimate");
                let record = GenerationRecord::failed(generator_id.clone(), error);
                return Ok(Launch::Rejected(wb.insert_record(record)));
            }
        };

        let generator = wb.generator_mut(generator_id)?;
        let generator_version = generator.commit_or_reuse();
        let config = generator.draft().clone();
        let schema_text = config.schema_text();

        let breakdown = TokenBreakdown::compute(&input_data, &config.system_message, &schema_text);
        let output_tokens = estimate_output_tokens(breakdown.total, config.has_schema());
        let estimate = estimate_cost(self.pricing.as_ref(), breakdown.total, output_tokens, &config.model);

        let request = ExtractionRequest::new(&config.model, &input_data)
            .with_system_instruction(&config.system_message)
            .with_schema_text(&schema_text);

        let mut record = GenerationRecord::loading(generator_id.clone())
            .with_reference(GenerationReference {
                input_card_id,
                input_version,
                generator_card_id: generator_id.clone(),
                generator_version,
                input_data,
                generator_config: config,
            })
            .with_token_breakdown(breakdown)
            .with_token_usage(TokenUsage::estimated(breakdown.total))
            .with_cost_info(CostInfo::from_estimate(&estimate));

        let rejection = if let Err(e) = validate_schema_text(&schema_text) {
            Some(GenerationError::schema_text(e.to_string()))
        } else if estimate.exceeds_max_tokens {
            Some(GenerationError::ExceedsContextWindow {
                estimated_tokens: breakdown.total,
                max_context_tokens: estimate.max_context_tokens.unwrap_or_default(),
                suggested_alternatives: estimate.suggested_alternatives.clone(),
            })
        } else {
            None
        };
        if let Some(error) = rejection {
            warn!(target: "schemalab::orchestrator", generator = %generator_id, %error, "generation rejected");
            record.fail(error);
            return Ok(Launch::Rejected(wb.insert_record(record)));
        }

        let record_id = wb.insert_record(record);
        info!(
            target: "schemalab::orchestrator",
            generator = %generator_id,
            record = %record_id,
            model = %request.model_id,
            input_version,
            generator_version,
            expected_tokens = breakdown.total,
            "generation started"
        );
        Ok(Launch::Pending(PendingGeneration {
            record_id,
            request,
            expected_input_tokens: breakdown.total,
        }))
    }

    /// Call the model for a pending generation and store the outcome.
    pub async fn complete(&self, pending: PendingGeneration) -> RecordId {
        let PendingGeneration {
            record_id,
            request,
            expected_input_tokens,
        } = pending;

        let started = Instant::now();
        let result = self.model.extract(&request).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let mut wb = self.workbench.write();
        let record = match wb.record_mut(&record_id) {
            Ok(record) => record,
            Err(_) => {
                warn!(target: "schemalab::orchestrator", record = %record_id, "record vanished before completion");
                return record_id;
            }
        };
        record.generation_time_ms = Some(elapsed_ms);

        let spent = match result {
            Ok(response) => {
                let usage = TokenUsage::from_reported(expected_input_tokens, response.usage.as_ref());
                let actual = calculate_actual_cost(self.pricing.as_ref(), &usage, &request.model_id);
                if record.succeed(response.object) {
                    record.token_usage = usage;
                    record.cost_info = std::mem::take(&mut record.cost_info).with_actual(actual.as_ref());
                    info!(
                        target: "schemalab::orchestrator",
                        record = %record_id,
                        elapsed_ms,
                        actual_cost = actual.map(|a| a.total_cost),
                        "generation succeeded"
                    );
                    actual.map(|a| a.total_cost)
                } else {
                    None
                }
            }
            Err(e) => {
                let error = e.into_generation_error();
                warn!(target: "schemalab::orchestrator", record = %record_id, elapsed_ms, %error, "generation failed");
                record.fail(error);
                None
            }
        };
        if let Some(cost) = spent {
            wb.add_spend(cost);
        }
        record_id
    }

    fn ensure_generator(&self, generator_id: &CardId) -> LabResult<()> {
        if self.workbench.read().generator(generator_id).is_none() {
            return Err(LabError::card_not_found(generator_id));
        }
        Ok(())
    }

    /// When the active input is a fetch input, replace it with its response.
    async fn resolve_active_fetch(&self) -> Result<(), GenerationError> {
        let pending = {
            let wb = self.workbench.read();
            wb.active_input()
                .and_then(|card| card.fetch_config().map(|c| (card.label().to_string(), c.clone())))
        };
        let Some((label, config)) = pending else {
            return Ok(());
        };
        self.fetch_into_input(&label, config)
            .await
            .map(|_| ())
            .map_err(|e| GenerationError::fetch(e.to_string(), e.is_timeout()))
    }

    async fn fetch_into_input(
        &self,
        label: &str,
        mut config: FetchRequestConfig,
    ) -> Result<CardId, FetchError> {
        let default_timeout = self.workbench.read().config().fetch_timeout_ms;
        config.timeout_ms.get_or_insert(default_timeout);

        debug!(target: "schemalab::orchestrator", url = %config.url, method = config.method.as_str(), "resolving fetch input");
        let body = self.http.request(&config).await?;

        let card = self
            .workbench
            .write()
            .add_text_input_with(format!("{label} response"), body);
        info!(target: "schemalab::orchestrator", card = %card, "fetch response stored as input");
        Ok(card)
    }
}

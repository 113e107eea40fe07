//! Application state of the workbench.
//!
//! [`Workbench`] owns every input card, generator card and generation
//! record, plus the running spend total. All lists are kept newest first.
//! Share it between tasks as a [`SharedWorkbench`]; hold the lock only for
//! synchronous mutations.

use crate::assist::ConfigDraft;
use crate::config::WorkbenchConfig;
use crate::output::GenerationRecord;
use parking_lot::RwLock;
use schemalab_cards::{GeneratorCard, GeneratorConfig, InputCard, InputKind, VersionPointer};
use schemalab_core::{CardId, LabError, LabResult, RecordId};
use schemalab_fetch::FetchRequestConfig;
use schemalab_schema::{validate_schema_text, SchemaField};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// A workbench shared between tasks.
pub type SharedWorkbench = Arc<RwLock<Workbench>>;

/// Label of the initial input card.
pub const INITIAL_INPUT_LABEL: &str = "input";
/// Label of the initial generator.
pub const INITIAL_GENERATOR_LABEL: &str = "Default Extractor";

/// Input cards, generator cards and generation records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workbench {
    config: WorkbenchConfig,
    inputs: Vec<InputCard>,
    active_input_id: Option<CardId>,
    generators: Vec<GeneratorCard>,
    records: Vec<GenerationRecord>,
    next_generator_number: u32,
    total_spent: f64,
}

impl Default for Workbench {
    fn default() -> Self {
        Self::new(WorkbenchConfig::default())
    }
}

impl Workbench {
    /// Create a workbench with one sample text input and one default
    /// generator.
    pub fn new(config: WorkbenchConfig) -> Self {
        let input = InputCard::new_text(INITIAL_INPUT_LABEL, config.sample_input.clone());
        let generator = GeneratorCard::new(GeneratorConfig::new(
            INITIAL_GENERATOR_LABEL,
            config.default_model.clone(),
            config.default_system_message.clone(),
        ));
        Self {
            active_input_id: Some(input.id().clone()),
            inputs: vec![input],
            generators: vec![generator],
            records: Vec::new(),
            next_generator_number: 2,
            total_spent: 0.0,
            config,
        }
    }

    /// Wrap into a [`SharedWorkbench`].
    pub fn into_shared(self) -> SharedWorkbench {
        Arc::new(RwLock::new(self))
    }

    /// Configuration the workbench was created with.
    #[must_use]
    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    /// Input cards, newest first.
    #[must_use]
    pub fn inputs(&self) -> &[InputCard] {
        &self.inputs
    }

    /// An input card by id.
    #[must_use]
    pub fn input(&self, id: &CardId) -> Option<&InputCard> {
        self.inputs.iter().find(|c| c.id() == id)
    }

    fn input_mut(&mut self, id: &CardId) -> LabResult<&mut InputCard> {
        self.inputs
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| LabError::card_not_found(id))
    }

    fn push_input(&mut self, card: InputCard) -> CardId {
        let id = card.id().clone();
        debug!(target: "schemalab::state", card = %id, label = card.label(), kind = %card.kind(), "added input");
        self.inputs.insert(0, card);
        self.active_input_id = Some(id.clone());
        id
    }

    /// Add an empty text input labelled `input N` and make it active.
    pub fn add_text_input(&mut self) -> CardId {
        let label = format!("input {}", self.inputs.len() + 1);
        self.push_input(InputCard::new_text(label, ""))
    }

    /// Add a text input with the given label and text and make it active.
    pub fn add_text_input_with(&mut self, label: impl Into<String>, data: impl Into<String>) -> CardId {
        self.push_input(InputCard::new_text(label, data))
    }

    /// Add a fetch input labelled `fetch N` with the default request and
    /// make it active.
    pub fn add_fetch_input(&mut self) -> CardId {
        let fetch_count = self
            .inputs
            .iter()
            .filter(|c| c.kind() == InputKind::Fetch)
            .count();
        let label = format!("fetch {}", fetch_count + 1);
        let request = self.config.default_fetch_request();
        self.push_input(InputCard::new_fetch(label, request))
    }

    /// Delete an input card. The active input moves to the first remaining
    /// card when the deleted card was active.
    ///
    /// # Errors
    ///
    /// [`LabError::LastInputCard`] when it is the only card,
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn delete_input(&mut self, id: &CardId) -> LabResult<()> {
        let index = self
            .inputs
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| LabError::card_not_found(id))?;
        if self.inputs.len() <= 1 {
            return Err(LabError::LastInputCard);
        }
        self.inputs.remove(index);
        if self.active_input_id.as_ref() == Some(id) {
            self.active_input_id = self.inputs.first().map(|c| c.id().clone());
        }
        debug!(target: "schemalab::state", card = %id, "deleted input");
        Ok(())
    }

    /// Select the input used by generations.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn set_active_input(&mut self, id: &CardId) -> LabResult<()> {
        if self.input(id).is_none() {
            return Err(LabError::card_not_found(id));
        }
        self.active_input_id = Some(id.clone());
        Ok(())
    }

    /// Id of the active input.
    #[must_use]
    pub fn active_input_id(&self) -> Option<&CardId> {
        self.active_input_id.as_ref()
    }

    /// The active input card.
    #[must_use]
    pub fn active_input(&self) -> Option<&InputCard> {
        self.active_input_id.as_ref().and_then(|id| self.input(id))
    }

    pub(crate) fn active_input_mut(&mut self) -> Option<&mut InputCard> {
        let id = self.active_input_id.clone()?;
        self.inputs.iter_mut().find(|c| *c.id() == id)
    }

    /// Replace the text of a text input.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`], or [`LabError::InputKindMismatch`] on a
    /// fetch input.
    pub fn update_input_text(&mut self, id: &CardId, text: impl Into<String>) -> LabResult<()> {
        self.input_mut(id)?.set_text(text)
    }

    /// Replace the request of a fetch input.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`], or [`LabError::InputKindMismatch`] on a
    /// text input.
    pub fn update_fetch_config(&mut self, id: &CardId, config: FetchRequestConfig) -> LabResult<()> {
        self.input_mut(id)?.set_fetch_config(config)
    }

    /// Rename an input.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn set_input_label(&mut self, id: &CardId, label: impl Into<String>) -> LabResult<()> {
        self.input_mut(id)?.set_label(label);
        Ok(())
    }

    /// Snapshot an input's draft. Returns the new version.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn commit_input(&mut self, id: &CardId) -> LabResult<u32> {
        Ok(self.input_mut(id)?.commit())
    }

    /// Load an input snapshot into the draft.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] or [`LabError::VersionNotFound`].
    pub fn switch_input_version(&mut self, id: &CardId, version: u32) -> LabResult<()> {
        self.input_mut(id)?.switch_to_version(version)
    }

    /// Unpin an input from its snapshot.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn switch_input_to_working(&mut self, id: &CardId) -> LabResult<()> {
        self.input_mut(id)?.switch_to_working();
        Ok(())
    }

    /// Discard input edits by loading its newest snapshot.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] or [`LabError::VersionNotFound`].
    pub fn revert_input_to_latest(&mut self, id: &CardId) -> LabResult<u32> {
        self.input_mut(id)?.revert_to_latest()
    }

    /// Where an input's pointer is.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn input_version(&self, id: &CardId) -> LabResult<VersionPointer> {
        self.input(id)
            .map(InputCard::current)
            .ok_or_else(|| LabError::card_not_found(id))
    }

    // ------------------------------------------------------------------
    // Generators
    // ------------------------------------------------------------------

    /// Generator cards, newest first.
    #[must_use]
    pub fn generators(&self) -> &[GeneratorCard] {
        &self.generators
    }

    /// A generator card by id.
    #[must_use]
    pub fn generator(&self, id: &CardId) -> Option<&GeneratorCard> {
        self.generators.iter().find(|c| c.id() == id)
    }

    pub(crate) fn generator_mut(&mut self, id: &CardId) -> LabResult<&mut GeneratorCard> {
        self.generators
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| LabError::card_not_found(id))
    }

    /// Add a generator labelled `Generator N` with the default schema.
    pub fn add_generator(&mut self) -> CardId {
        let label = format!("Generator {}", self.next_generator_number);
        self.next_generator_number += 1;
        let card = GeneratorCard::new(GeneratorConfig::new(
            label,
            self.config.default_model.clone(),
            self.config.new_generator_system_message.clone(),
        ));
        let id = card.id().clone();
        debug!(target: "schemalab::state", card = %id, label = card.label(), "added generator");
        self.generators.insert(0, card);
        id
    }

    /// Delete a generator. Its records stay as audit copies; see
    /// [`is_orphaned`](Self::is_orphaned).
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn delete_generator(&mut self, id: &CardId) -> LabResult<()> {
        let index = self
            .generators
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| LabError::card_not_found(id))?;
        self.generators.remove(index);
        debug!(target: "schemalab::state", card = %id, "deleted generator");
        Ok(())
    }

    /// Edit a generator's draft in place.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn update_generator<R>(
        &mut self,
        id: &CardId,
        f: impl FnOnce(&mut GeneratorConfig) -> R,
    ) -> LabResult<R> {
        self.generator_mut(id)?.edit(f)
    }

    /// Use builder fields as a generator's schema.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn set_generator_schema_fields(&mut self, id: &CardId, fields: Vec<SchemaField>) -> LabResult<()> {
        self.generator_mut(id)?.set_schema_fields(fields);
        Ok(())
    }

    /// Use schema text as a generator's schema, unchecked.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn set_generator_raw_schema(&mut self, id: &CardId, text: impl Into<String>) -> LabResult<()> {
        self.generator_mut(id)?.set_raw_schema(text);
        Ok(())
    }

    /// Remove a generator's schema.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn clear_generator_schema(&mut self, id: &CardId) -> LabResult<()> {
        self.generator_mut(id)?.clear_schema();
        Ok(())
    }

    /// Validate schema text, then store it as the generator's raw schema.
    ///
    /// # Errors
    ///
    /// [`LabError::InvalidSchema`] when the validator rejects the text,
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn import_schema(&mut self, id: &CardId, text: &str) -> LabResult<()> {
        validate_schema_text(text).map_err(|e| LabError::InvalidSchema(e.to_string()))?;
        self.set_generator_raw_schema(id, text.trim())
    }

    /// Apply an assistant draft: system message and raw schema.
    ///
    /// # Errors
    ///
    /// [`LabError::InvalidSchema`] or [`LabError::CardNotFound`].
    pub fn apply_draft(&mut self, id: &CardId, draft: &ConfigDraft) -> LabResult<()> {
        validate_schema_text(&draft.schema).map_err(|e| LabError::InvalidSchema(e.to_string()))?;
        let card = self.generator_mut(id)?;
        card.set_system_message(draft.system_message.clone());
        card.set_raw_schema(draft.schema.trim());
        Ok(())
    }

    /// Snapshot a generator's draft. Returns the new version.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn commit_generator(&mut self, id: &CardId) -> LabResult<u32> {
        Ok(self.generator_mut(id)?.commit())
    }

    /// Load a generator snapshot into the draft.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] or [`LabError::VersionNotFound`].
    pub fn switch_generator_version(&mut self, id: &CardId, version: u32) -> LabResult<()> {
        self.generator_mut(id)?.switch_to_version(version)
    }

    /// Unpin a generator from its snapshot.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn switch_generator_to_working(&mut self, id: &CardId) -> LabResult<()> {
        self.generator_mut(id)?.switch_to_working();
        Ok(())
    }

    /// Discard generator edits by loading its newest snapshot.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] or [`LabError::VersionNotFound`].
    pub fn revert_generator_to_latest(&mut self, id: &CardId) -> LabResult<u32> {
        self.generator_mut(id)?.revert_to_latest()
    }

    /// Where a generator's pointer is.
    ///
    /// # Errors
    ///
    /// [`LabError::CardNotFound`] for an unknown id.
    pub fn generator_version(&self, id: &CardId) -> LabResult<VersionPointer> {
        self.generator(id)
            .map(GeneratorCard::current)
            .ok_or_else(|| LabError::card_not_found(id))
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    /// Add a record at the front.
    pub fn insert_record(&mut self, record: GenerationRecord) -> RecordId {
        let id = record.id.clone();
        self.records.insert(0, record);
        id
    }

    /// A record by id.
    #[must_use]
    pub fn record(&self, id: &RecordId) -> Option<&GenerationRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub(crate) fn record_mut(&mut self, id: &RecordId) -> LabResult<&mut GenerationRecord> {
        self.records
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| LabError::RecordNotFound(id.to_string()))
    }

    /// All records, newest first.
    #[must_use]
    pub fn records(&self) -> &[GenerationRecord] {
        &self.records
    }

    /// Records of one generator, newest first.
    pub fn records_for_generator<'a>(
        &'a self,
        generator_id: &'a CardId,
    ) -> impl Iterator<Item = &'a GenerationRecord> + 'a {
        self.records.iter().filter(move |r| &r.generator_id == generator_id)
    }

    /// Whether the record's generator has been deleted.
    ///
    /// # Errors
    ///
    /// [`LabError::RecordNotFound`] for an unknown id.
    pub fn is_orphaned(&self, id: &RecordId) -> LabResult<bool> {
        let record = self
            .record(id)
            .ok_or_else(|| LabError::RecordNotFound(id.to_string()))?;
        Ok(self.generator(&record.generator_id).is_none())
    }

    /// Copy a successful result into a new active text input, as
    /// pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// [`LabError::RecordNotFound`], or [`LabError::NoResult`] when the
    /// record did not succeed.
    pub fn promote_output_to_input(&mut self, id: &RecordId) -> LabResult<CardId> {
        let record = self
            .record(id)
            .ok_or_else(|| LabError::RecordNotFound(id.to_string()))?;
        let value = record
            .value()
            .ok_or_else(|| LabError::NoResult(id.to_string()))?;
        let data = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        let label = format!("input {}", self.inputs.len() + 1);
        let card = self.add_text_input_with(label, data);
        info!(target: "schemalab::state", record = %id, card = %card, "promoted output to input");
        Ok(card)
    }

    /// Total actual cost of all successful generations.
    #[must_use]
    pub fn total_spent(&self) -> f64 {
        self.total_spent
    }

    pub(crate) fn add_spend(&mut self, cost: f64) {
        self.total_spent += cost;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_FETCH_URL, NEW_GENERATOR_SYSTEM_MESSAGE, SAMPLE_INPUT};
    use crate::output::GenerationRecord;
    use pretty_assertions::assert_eq;
    use schemalab_core::GenerationError;
    use serde_json::json;

    fn workbench() -> Workbench {
        Workbench::default()
    }

    #[test]
    fn test_initial_state() {
        let wb = workbench();
        assert_eq!(wb.inputs().len(), 1);
        let active = wb.active_input().unwrap();
        assert_eq!(active.label(), "input");
        assert_eq!(active.text(), Some(SAMPLE_INPUT));

        assert_eq!(wb.generators().len(), 1);
        let generator = &wb.generators()[0];
        assert_eq!(generator.label(), "Default Extractor");
        assert_eq!(generator.model(), "gpt-4.1-nano");
        assert!(generator.draft().has_schema());
        assert_eq!(wb.total_spent(), 0.0);
    }

    #[test]
    fn test_add_inputs_newest_first_and_active() {
        let mut wb = workbench();
        let text = wb.add_text_input();
        let fetch = wb.add_fetch_input();

        assert_eq!(wb.inputs()[0].id(), &fetch);
        assert_eq!(wb.inputs()[1].id(), &text);
        assert_eq!(wb.active_input_id(), Some(&fetch));
        assert_eq!(wb.input(&text).unwrap().label(), "input 2");

        let card = wb.input(&fetch).unwrap();
        assert_eq!(card.label(), "fetch 1");
        let config = card.fetch_config().unwrap();
        assert_eq!(config.url, DEFAULT_FETCH_URL);
        assert_eq!(config.timeout_ms, Some(10_000));
    }

    #[test]
    fn test_delete_last_input_refused() {
        let mut wb = workbench();
        let only = wb.inputs()[0].id().clone();
        assert_eq!(wb.delete_input(&only), Err(LabError::LastInputCard));
        assert_eq!(wb.inputs().len(), 1);
    }

    #[test]
    fn test_delete_unknown_input_on_single_card_workbench() {
        let mut wb = workbench();
        let missing = CardId::from("card_missing");
        assert_eq!(
            wb.delete_input(&missing),
            Err(LabError::card_not_found("card_missing"))
        );
        assert_eq!(wb.inputs().len(), 1);
    }

    #[test]
    fn test_delete_active_input_repoints() {
        let mut wb = workbench();
        let original = wb.inputs()[0].id().clone();
        let first = wb.add_text_input();
        let second = wb.add_text_input();

        wb.delete_input(&second).unwrap();
        assert_eq!(wb.active_input_id(), Some(&first));

        wb.set_active_input(&original).unwrap();
        wb.delete_input(&first).unwrap();
        assert_eq!(wb.active_input_id(), Some(&original));
    }

    #[test]
    fn test_input_kind_mismatch() {
        let mut wb = workbench();
        let fetch = wb.add_fetch_input();
        let err = wb.update_input_text(&fetch, "hello").unwrap_err();
        assert!(matches!(err, LabError::InputKindMismatch { expected: "text", .. }));
    }

    #[test]
    fn test_input_versioning_round_trip() {
        let mut wb = workbench();
        let id = wb.inputs()[0].id().clone();

        wb.update_input_text(&id, "edited").unwrap();
        assert_eq!(wb.commit_input(&id).unwrap(), 2);
        assert_eq!(wb.input_version(&id).unwrap(), VersionPointer::At(2));

        wb.switch_input_version(&id, 1).unwrap();
        assert_eq!(wb.input(&id).unwrap().text(), Some(SAMPLE_INPUT));

        wb.switch_input_to_working(&id).unwrap();
        assert_eq!(wb.input_version(&id).unwrap(), VersionPointer::Working);

        assert_eq!(wb.revert_input_to_latest(&id).unwrap(), 2);
        assert_eq!(wb.input(&id).unwrap().text(), Some("edited"));

        assert!(matches!(
            wb.switch_input_version(&id, 9),
            Err(LabError::VersionNotFound { version: 9, .. })
        ));
    }

    #[test]
    fn test_add_generator_numbering() {
        let mut wb = workbench();
        let a = wb.add_generator();
        let b = wb.add_generator();
        assert_eq!(wb.generators()[0].id(), &b);
        assert_eq!(wb.generator(&a).unwrap().label(), "Generator 2");
        assert_eq!(wb.generator(&b).unwrap().label(), "Generator 3");
        assert_eq!(
            wb.generator(&a).unwrap().draft().system_message,
            NEW_GENERATOR_SYSTEM_MESSAGE
        );
    }

    #[test]
    fn test_update_generator_marks_dirty() {
        let mut wb = workbench();
        let id = wb.generators()[0].id().clone();
        wb.update_generator(&id, |cfg| cfg.model = "gpt-4o".to_string()).unwrap();
        assert!(wb.generator(&id).unwrap().has_unsaved_changes());
        assert_eq!(wb.commit_generator(&id).unwrap(), 2);
        wb.switch_generator_version(&id, 1).unwrap();
        assert_eq!(wb.generator(&id).unwrap().model(), "gpt-4.1-nano");
        assert_eq!(wb.generator_version(&id).unwrap(), VersionPointer::At(1));
    }

    #[test]
    fn test_import_schema() {
        let mut wb = workbench();
        let id = wb.generators()[0].id().clone();

        let err = wb.import_schema(&id, "z.object({ name: z.string().max(5) })").unwrap_err();
        assert!(matches!(err, LabError::InvalidSchema(_)));

        wb.import_schema(&id, "z.object({ name: z.string() })").unwrap();
        assert_eq!(
            wb.generator(&id).unwrap().draft().raw_schema(),
            Some("z.object({ name: z.string() })")
        );

        wb.clear_generator_schema(&id).unwrap();
        assert!(!wb.generator(&id).unwrap().draft().has_schema());
    }

    #[test]
    fn test_apply_draft() {
        let mut wb = workbench();
        let id = wb.generators()[0].id().clone();
        let draft = ConfigDraft {
            system_message: "Extract recipes.".to_string(),
            schema: "z.object({ title: z.string() })".to_string(),
        };
        wb.apply_draft(&id, &draft).unwrap();
        let config = wb.generator(&id).unwrap().draft();
        assert_eq!(config.system_message, "Extract recipes.");
        assert_eq!(config.raw_schema(), Some("z.object({ title: z.string() })"));
    }

    #[test]
    fn test_deleting_generator_keeps_records() {
        let mut wb = workbench();
        let id = wb.generators()[0].id().clone();
        let record = wb.insert_record(GenerationRecord::failed(id.clone(), GenerationError::EmptyInput));

        assert_eq!(wb.is_orphaned(&record), Ok(false));
        wb.delete_generator(&id).unwrap();
        assert!(wb.record(&record).is_some());
        assert_eq!(wb.is_orphaned(&record), Ok(true));
        assert_eq!(wb.records_for_generator(&id).count(), 1);
    }

    #[test]
    fn test_promote_output_to_input() {
        let mut wb = workbench();
        let generator = wb.generators()[0].id().clone();

        let mut ok = GenerationRecord::loading(generator.clone());
        ok.succeed(json!({ "summary": "short" }));
        let ok = wb.insert_record(ok);
        let failed = wb.insert_record(GenerationRecord::failed(generator, GenerationError::EmptyInput));

        assert!(matches!(wb.promote_output_to_input(&failed), Err(LabError::NoResult(_))));

        let card = wb.promote_output_to_input(&ok).unwrap();
        assert_eq!(wb.active_input_id(), Some(&card));
        assert_eq!(
            wb.input(&card).unwrap().text(),
            Some("{\n  \"summary\": \"short\"\n}")
        );
    }

    #[test]
    fn test_unknown_ids() {
        let mut wb = workbench();
        let missing = CardId::from("card_missing");
        assert!(matches!(wb.set_active_input(&missing), Err(LabError::CardNotFound(_))));
        assert!(matches!(wb.delete_generator(&missing), Err(LabError::CardNotFound(_))));
        assert!(matches!(
            wb.is_orphaned(&RecordId::from("out_missing")),
            Err(LabError::RecordNotFound(_))
        ));
    }
}

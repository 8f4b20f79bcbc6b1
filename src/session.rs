// fitagent — Session context and command handlers

use crate::document::{DocumentExporter, ExportedDocument};
use crate::profile::{
    Goal, NutritionTargets, PersonalInfo, ProfileDocument, ProfileError, ProfileStore, StoreError,
};
use crate::prompt::{self, Persona};
use crate::provider::{CompletionClient, CompletionError};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error("question is empty")]
    EmptyQuestion,
}

// ---------------------------------------------------------------------------
// AgentResponseSet
// ---------------------------------------------------------------------------

/// Latest response per persona, in the order personas first answered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentResponseSet {
    entries: Vec<(String, String)>,
}

impl AgentResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `text` for `name`, replacing any earlier response in place.
    pub fn record(&mut self, name: impl Into<String>, text: impl Into<String>) {
        let name = name.into();
        let text = text.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((name, text)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sections for the document exporter.
    pub fn as_sections(&self) -> &[(String, String)] {
        &self.entries
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Everything one interactive user session works on. Created at session
/// start, dropped at session end.
pub struct Session {
    id: uuid::Uuid,
    store: ProfileStore,
    profile: ProfileDocument,
    client: Arc<dyn CompletionClient>,
    exporter: DocumentExporter,
    export_title: String,
    revision_temperature: f64,
    responses: AgentResponseSet,
    started_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    /// Start a session: the profile is loaded once, here.
    pub fn start(
        store: ProfileStore,
        client: Arc<dyn CompletionClient>,
        exporter: DocumentExporter,
    ) -> Result<Self, SessionError> {
        let profile = store.load()?;
        let id = uuid::Uuid::new_v4();
        tracing::info!(session = %id, store = %store.path().display(), "Session started");

        Ok(Self {
            id,
            store,
            profile,
            client,
            exporter,
            export_title: crate::config::ExportConfig::default().title,
            revision_temperature: 0.5,
            responses: AgentResponseSet::new(),
            started_at: chrono::Utc::now(),
        })
    }

    pub fn with_export_title(mut self, title: impl Into<String>) -> Self {
        self.export_title = title.into();
        self
    }

    pub fn with_revision_temperature(mut self, temperature: f64) -> Self {
        self.revision_temperature = temperature;
        self
    }

    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn started_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.started_at
    }

    pub fn profile(&self) -> &ProfileDocument {
        &self.profile
    }

    pub fn responses(&self) -> &AgentResponseSet {
        &self.responses
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    // -----------------------------------------------------------------------
    // Profile handlers
    // -----------------------------------------------------------------------

    pub fn save_profile(&mut self, input: PersonalInfo) -> Result<&ProfileDocument, SessionError> {
        input.validate()?;
        self.profile.personal = input;
        self.persist()?;
        tracing::info!(session = %self.id, "Profile saved");
        Ok(&self.profile)
    }

    pub fn save_goals(&mut self, goals: Vec<Goal>) -> Result<&ProfileDocument, SessionError> {
        self.profile.set_goals(goals);
        self.persist()?;
        tracing::info!(session = %self.id, goals = self.profile.goals.len(), "Goals saved");
        Ok(&self.profile)
    }

    /// Replace the nutrition targets. The last generated plan is kept.
    pub fn save_nutrition(
        &mut self,
        targets: NutritionTargets,
    ) -> Result<&ProfileDocument, SessionError> {
        targets.validate()?;
        self.profile.nutrition = targets;
        self.persist()?;
        tracing::info!(session = %self.id, "Nutrition targets saved");
        Ok(&self.profile)
    }

    pub fn add_note(&mut self, text: &str) -> Result<usize, SessionError> {
        let index = self.profile.add_note(text.trim())?;
        self.persist()?;
        Ok(index)
    }

    pub fn edit_note(&mut self, index: usize, text: &str) -> Result<(), SessionError> {
        if text.trim().is_empty() {
            return Err(ProfileError::EmptyNote.into());
        }
        self.profile.edit_note(index, text.trim())?;
        self.persist()?;
        Ok(())
    }

    pub fn delete_note(&mut self, index: usize) -> Result<String, SessionError> {
        let removed = self.profile.delete_note(index)?;
        self.persist()?;
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Completion handlers
    // -----------------------------------------------------------------------

    /// Ask `persona` a question with the saved goals.
    pub async fn request_completion(
        &mut self,
        persona: Persona,
        question: &str,
    ) -> Result<String, SessionError> {
        let goals = self.profile.goals.clone();
        self.request_completion_with_goals(persona, &goals, question)
            .await
    }

    /// Ask `persona` a question. On success the answer replaces the
    /// persona's previous response.
    pub async fn request_completion_with_goals(
        &mut self,
        persona: Persona,
        goals: &[Goal],
        question: &str,
    ) -> Result<String, SessionError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        let prompt = prompt::build(persona, &self.profile, goals, question);
        tracing::info!(session = %self.id, persona = %persona, "Requesting completion");

        let response = self.client.complete(&prompt).await?;
        self.responses.record(persona.title(), response.clone());
        Ok(response)
    }

    /// Generate a meal plan from the profile and store it.
    pub async fn generate_nutrition_plan(&mut self) -> Result<String, SessionError> {
        let prompt = prompt::meal_plan(&self.profile, &self.profile.goals);
        tracing::info!(session = %self.id, "Generating nutrition plan");

        let plan = self.client.complete(&prompt).await?;
        self.store_plan(plan)
    }

    /// Ask for a new plan following the user's change request.
    pub async fn revise_nutrition_plan(&mut self, feedback: &str) -> Result<String, SessionError> {
        if feedback.trim().is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        let prompt = prompt::plan_revision(&self.profile, feedback);
        tracing::info!(session = %self.id, "Revising nutrition plan");

        let plan = self
            .client
            .complete_with(&prompt, Some(self.revision_temperature))
            .await?;
        self.store_plan(plan)
    }

    fn store_plan(&mut self, plan: String) -> Result<String, SessionError> {
        self.profile.nutrition_plan = Some(plan.clone());
        self.persist()?;
        Ok(plan)
    }

    // -----------------------------------------------------------------------
    // Export / reset
    // -----------------------------------------------------------------------

    pub fn export_responses(&self) -> ExportedDocument {
        self.exporter
            .render(&self.export_title, self.responses.as_sections())
    }

    /// Delete the store and forget everything in memory.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.store.reset()?;
        self.profile = ProfileDocument::default();
        self.responses.clear();
        tracing::info!(session = %self.id, "Session data reset");
        Ok(())
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.store.save(&self.profile)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let elapsed = chrono::Utc::now() - self.started_at;
        tracing::debug!(
            session = %self.id,
            responses = self.responses.len(),
            secs = elapsed.num_seconds(),
            "Session ended"
        );
    }
}

use crate::backend::BackendClient;
use crate::error::{Step, WorkflowError};
use crate::profile::ProfileData;
use crate::prompts;
use crate::session::{self, SessionStore};
use crate::state::{StageProgress, WorkflowState};
use serde::Serialize;

/// A single accepted CV. Immutable once validated.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub media_type: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn is_pdf(&self) -> bool {
        self.media_type.eq_ignore_ascii_case("application/pdf")
    }
}

/// Drives the upload → extract → review → analyze sequence against the
/// backend. One instance per session; the state is owned here and mutated
/// only through these methods.
pub struct UploadWorkflow {
    backend: Box<dyn BackendClient>,
    store: Box<dyn SessionStore>,
    state: WorkflowState,
    progress: StageProgress,
    file: Option<UploadedFile>,
    extracted_text: Option<String>,
    profile: Option<ProfileData>,
    questions: Option<Vec<String>>,
    recommendation: Option<String>,
    failed_step: Option<Step>,
    last_error: Option<String>,
}

impl UploadWorkflow {
    pub fn new(backend: Box<dyn BackendClient>, store: Box<dyn SessionStore>) -> Self {
        let mut workflow = Self {
            backend,
            store,
            state: WorkflowState::Idle,
            progress: StageProgress::default(),
            file: None,
            extracted_text: None,
            profile: None,
            questions: None,
            recommendation: None,
            failed_step: None,
            last_error: None,
        };
        workflow.resume();
        workflow
    }

    /// Picks up a previous session from the store. With extracted text on
    /// hand the workflow re-opens at Review.
    fn resume(&mut self) {
        match self.store.get(session::KEY_EXTRACTED_TEXT) {
            Ok(Some(text)) => self.extracted_text = Some(text),
            Ok(None) => {}
            Err(e) => log::warn!("session read failed: {:#}", e),
        }
        if let Ok(Some(raw)) = self.store.get(session::KEY_PROFILE) {
            match serde_json::from_str(&raw) {
                Ok(data) => self.profile = Some(data),
                Err(e) => log::warn!("ignoring unreadable stored profile: {}", e),
            }
        }
        if let Ok(Some(raw)) = self.store.get(session::KEY_QUESTIONS) {
            match serde_json::from_str(&raw) {
                Ok(questions) => self.questions = Some(questions),
                Err(e) => log::warn!("ignoring unreadable stored questions: {}", e),
            }
        }
        if let Ok(Some(text)) = self.store.get(session::KEY_RECOMMENDATION) {
            self.recommendation = Some(text);
        }
        if self.extracted_text.is_some() {
            self.state = WorkflowState::Review;
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn progress(&self) -> u8 {
        self.progress.get()
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.extracted_text.as_deref()
    }

    pub fn profile(&self) -> Option<&ProfileData> {
        self.profile.as_ref()
    }

    pub fn questions(&self) -> Option<&[String]> {
        self.questions.as_deref()
    }

    pub fn recommendation(&self) -> Option<&str> {
        self.recommendation.as_deref()
    }

    pub fn failed_step(&self) -> Option<Step> {
        self.failed_step
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Accepts a single PDF and moves Idle → Uploading. Any validation
    /// failure leaves the state untouched.
    pub fn select_file(&mut self, file: UploadedFile) -> Result<(), WorkflowError> {
        if self.state != WorkflowState::Idle {
            return Err(WorkflowError::Validation(
                "a workflow is already in progress; start over to upload another CV".to_string(),
            ));
        }
        if file.name.is_empty() || file.content.is_empty() {
            return Err(WorkflowError::Validation("no file selected".to_string()));
        }
        if !file.is_pdf() {
            return Err(WorkflowError::Validation(
                "Only PDF files are supported.".to_string(),
            ));
        }

        self.transition(WorkflowState::Uploading)?;
        self.progress.reset();
        self.file = Some(file);
        Ok(())
    }

    /// Runs Uploading → Extracting → Review: text extraction on the backend,
    /// then best-effort structured profile extraction. Callable again from
    /// Failed to retry whichever half failed; a profile-extraction retry does
    /// not re-upload the file.
    pub async fn upload_and_extract(&mut self) -> Result<(), WorkflowError> {
        let skip_upload = match self.state {
            WorkflowState::Uploading => false,
            WorkflowState::Failed => match self.failed_step {
                Some(Step::Upload) => false,
                Some(Step::ProfileExtraction) if self.extracted_text.is_some() => true,
                _ => {
                    return Err(WorkflowError::Validation(
                        "nothing to retry here; select a file first".to_string(),
                    ))
                }
            },
            _ => {
                return Err(WorkflowError::Validation(
                    "select a file before uploading".to_string(),
                ))
            }
        };

        self.failed_step = None;
        self.last_error = None;

        if skip_upload {
            self.transition(WorkflowState::Extracting)?;
        } else {
            if self.state == WorkflowState::Failed {
                self.transition(WorkflowState::Uploading)?;
            }
            self.progress.reset();
            self.progress.set(10);

            let (name, content) = match &self.file {
                Some(file) => (file.name.clone(), file.content.clone()),
                None => {
                    return Err(WorkflowError::Validation("no file selected".to_string()))
                }
            };

            match self.backend.extract_text(&name, content).await {
                Ok(text) => {
                    self.progress.set(50);
                    self.transition(WorkflowState::Extracting)?;
                    self.persist(session::KEY_EXTRACTED_TEXT, &text);
                    self.extracted_text = Some(text);
                }
                Err(e) => return Err(self.fail(Step::Upload, e)),
            }
        }

        let text = match &self.extracted_text {
            Some(text) => text.clone(),
            None => {
                return Err(WorkflowError::Validation(
                    "no extracted text to analyze".to_string(),
                ))
            }
        };

        self.progress.set(60);
        let instruction = prompts::profile_extraction_instruction(&text);
        match self.backend.chat(&instruction).await {
            Ok(raw) => {
                // Parse failure is non-fatal; the raw text is kept either way.
                let data = ProfileData::from_response(&raw);
                self.persist_json(session::KEY_PROFILE, &data);
                self.profile = Some(data);
                self.progress.set(100);
                self.transition(WorkflowState::Review)?;
                Ok(())
            }
            Err(e) => Err(self.fail(Step::ProfileExtraction, e)),
        }
    }

    /// Generates interview questions from the extracted text.
    pub async fn generate_questions(&mut self) -> Result<(), WorkflowError> {
        let text = self.require_extracted_text()?;
        self.transition(WorkflowState::Analyzing)?;
        self.failed_step = None;
        self.last_error = None;
        self.progress.reset();
        self.progress.set(10);

        let instruction = prompts::interview_questions_instruction(&text);
        match self.backend.chat(&instruction).await {
            Ok(raw) => {
                let questions = prompts::parse_question_list(&raw);
                self.persist_json(session::KEY_QUESTIONS, &questions);
                self.questions = Some(questions);
                self.progress.set(100);
                self.transition(WorkflowState::Complete)?;
                Ok(())
            }
            Err(e) => Err(self.fail(Step::QuestionGeneration, e)),
        }
    }

    /// Requests a career-path recommendation from the extracted text.
    pub async fn recommend_career(&mut self) -> Result<(), WorkflowError> {
        let text = self.require_extracted_text()?;
        self.transition(WorkflowState::Generating)?;
        self.failed_step = None;
        self.last_error = None;
        self.progress.reset();
        self.progress.set(10);

        match self.backend.career_recommendation(&text).await {
            Ok(recommendation) => {
                self.persist(session::KEY_RECOMMENDATION, &recommendation);
                self.recommendation = Some(recommendation);
                self.progress.set(100);
                self.transition(WorkflowState::Complete)?;
                Ok(())
            }
            Err(e) => Err(self.fail(Step::CareerRecommendation, e)),
        }
    }

    /// Fork-join over question generation and career recommendation. Both
    /// branches depend only on the extracted text, so they run concurrently;
    /// the combined action completes only after both resolve. If one branch
    /// fails the other's result is still persisted.
    pub async fn analyze_all(&mut self) -> Result<(), WorkflowError> {
        let text = self.require_extracted_text()?;
        self.transition(WorkflowState::Analyzing)?;
        self.failed_step = None;
        self.last_error = None;
        self.progress.reset();
        self.progress.set(10);

        let questions_instruction = prompts::interview_questions_instruction(&text);
        let backend = &self.backend;
        let (questions_res, recommendation_res) = tokio::join!(
            backend.chat(&questions_instruction),
            backend.career_recommendation(&text)
        );
        self.progress.set(90);

        let questions_err = match questions_res {
            Ok(raw) => {
                let questions = prompts::parse_question_list(&raw);
                self.persist_json(session::KEY_QUESTIONS, &questions);
                self.questions = Some(questions);
                None
            }
            Err(e) => Some(e),
        };
        let recommendation_err = match recommendation_res {
            Ok(recommendation) => {
                self.persist(session::KEY_RECOMMENDATION, &recommendation);
                self.recommendation = Some(recommendation);
                None
            }
            Err(e) => Some(e),
        };

        if let Some(e) = questions_err {
            return Err(self.fail(Step::QuestionGeneration, e));
        }
        if let Some(e) = recommendation_err {
            return Err(self.fail(Step::CareerRecommendation, e));
        }

        self.progress.set(100);
        self.transition(WorkflowState::Complete)?;
        Ok(())
    }

    /// Explicit start-over: clears every session key and returns to Idle.
    pub fn restart(&mut self) -> Result<(), WorkflowError> {
        if self.state.is_busy() {
            return Err(WorkflowError::Validation(
                "cannot start over while a request is in flight".to_string(),
            ));
        }
        if let Err(e) = self.store.clear() {
            log::warn!("failed to clear session storage: {:#}", e);
        }
        self.state = WorkflowState::Idle;
        self.progress.reset();
        self.file = None;
        self.extracted_text = None;
        self.profile = None;
        self.questions = None;
        self.recommendation = None;
        self.failed_step = None;
        self.last_error = None;
        Ok(())
    }

    fn require_extracted_text(&self) -> Result<String, WorkflowError> {
        self.extracted_text.clone().ok_or_else(|| {
            WorkflowError::Validation("no extracted text; upload a CV first".to_string())
        })
    }

    fn transition(&mut self, next: WorkflowState) -> Result<(), WorkflowError> {
        if !self.state.can_transition_to(next) {
            return Err(WorkflowError::Validation(format!(
                "cannot move from {:?} to {:?}",
                self.state, next
            )));
        }
        log::debug!("workflow: {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn fail(&mut self, step: Step, err: anyhow::Error) -> WorkflowError {
        let message = format!("{:#}", err);
        log::error!("{} failed: {}", step, message);
        self.state = WorkflowState::Failed;
        self.failed_step = Some(step);
        self.progress.reset();
        self.last_error = Some(message.clone());
        WorkflowError::Backend { step, message }
    }

    // Session writes are best effort; losing a cached value never blocks the
    // workflow itself.
    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.put(key, value) {
            log::warn!("failed to persist session key '{}': {:#}", key, e);
        }
    }

    fn persist_json<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => self.persist(key, &json),
            Err(e) => log::warn!("failed to serialize session key '{}': {}", key, e),
        }
    }
}

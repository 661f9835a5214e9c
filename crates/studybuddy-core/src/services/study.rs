//! The study service ties retrieval, prompt construction, and chat
//! providers together.
//!
//! Explain and summarize answers stream as prose; quiz and flashcard
//! answers go through the single-shot JSON path and are validated against
//! their schemas before they reach the caller. Single-shot calls retry
//! transient provider failures; streams are attempted once.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::Result;
use crate::llm::{with_retry, ChatClient, ChatRequest, CompletionStream, LlmError, RetryPolicy};
use crate::models::{FlashcardDeck, Quiz};
use crate::prompts::{build_system_prompt, Difficulty, TaskType};
use crate::rag::RagService;

/// Most recent task runs kept per service instance
pub const MAX_HISTORY_ENTRIES: usize = 5;

/// One completed (or started, for streams) task run
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub task: TaskType,
    pub difficulty: Difficulty,
    pub topic: String,
    pub at: DateTime<Utc>,
}

/// Orchestrates study tasks for one chat provider.
pub struct StudyService {
    rag: RagService,
    chat: Arc<dyn ChatClient>,
    retry: RetryPolicy,
    history: Mutex<Vec<HistoryEntry>>,
}

impl StudyService {
    pub fn new(rag: RagService, chat: Arc<dyn ChatClient>) -> Self {
        Self {
            rag,
            chat,
            retry: RetryPolicy::default(),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Use a non-default retry policy for single-shot calls
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Index `text` as the session's study notes, replacing any previous
    /// notes. Returns the number of chunks indexed.
    pub async fn index_notes(&self, session_id: &str, text: &str) -> Result<usize> {
        self.rag.index_document(session_id, text).await
    }

    /// True iff the session has indexed notes
    pub fn has_notes(&self, session_id: &str) -> bool {
        self.rag.has_documents(session_id)
    }

    /// Stream a prose response for an explain or summarize task.
    ///
    /// JSON tasks have no streaming path; use [`Self::generate_quiz`] or
    /// [`Self::generate_flashcards`] for those.
    pub async fn stream_task(
        &self,
        session_id: &str,
        task: TaskType,
        difficulty: Difficulty,
        topic: &str,
        top_k: usize,
    ) -> Result<CompletionStream> {
        if task.requires_json() {
            return Err(crate::error::StudyBuddyError::validation(
                "task",
                &format!("{task} responses are structured and cannot be streamed"),
            ));
        }

        let request = self
            .prepare_request(session_id, task, difficulty, topic, top_k)
            .await?;
        let stream = self.chat.stream(request).await?;
        self.record(task, difficulty, topic);
        Ok(stream)
    }

    /// Generate and validate a five-question multiple-choice quiz
    pub async fn generate_quiz(
        &self,
        session_id: &str,
        topic: &str,
        difficulty: Difficulty,
        top_k: usize,
    ) -> Result<Quiz> {
        let text = self
            .complete_task(session_id, TaskType::Quiz, difficulty, topic, top_k)
            .await?;
        let quiz = Quiz::parse(&text)?;
        self.record(TaskType::Quiz, difficulty, topic);
        Ok(quiz)
    }

    /// Generate and validate a ten-card flashcard deck
    pub async fn generate_flashcards(
        &self,
        session_id: &str,
        topic: &str,
        difficulty: Difficulty,
        top_k: usize,
    ) -> Result<FlashcardDeck> {
        let text = self
            .complete_task(session_id, TaskType::Flashcards, difficulty, topic, top_k)
            .await?;
        let deck = FlashcardDeck::parse(&text)?;
        self.record(TaskType::Flashcards, difficulty, topic);
        Ok(deck)
    }

    /// The most recent task runs, newest first
    pub fn history(&self) -> Vec<HistoryEntry> {
        let entries = self.history.lock().expect("history lock poisoned");
        entries.iter().rev().cloned().collect()
    }

    /// Build the chat request for a task, retrieving context when the
    /// session has indexed notes
    async fn prepare_request(
        &self,
        session_id: &str,
        task: TaskType,
        difficulty: Difficulty,
        topic: &str,
        top_k: usize,
    ) -> Result<ChatRequest> {
        let context = if self.rag.has_documents(session_id) {
            self.rag.retrieve_context(session_id, topic, top_k).await?
        } else {
            Vec::new()
        };

        let system_prompt = build_system_prompt(task, difficulty, &context);
        info!(
            session_id,
            %task,
            %difficulty,
            context_chunks = context.len(),
            provider = %self.chat.provider(),
            "running study task"
        );
        Ok(ChatRequest::new(system_prompt, topic).with_json_mode(task.requires_json()))
    }

    async fn complete_task(
        &self,
        session_id: &str,
        task: TaskType,
        difficulty: Difficulty,
        topic: &str,
        top_k: usize,
    ) -> Result<String> {
        let request = self
            .prepare_request(session_id, task, difficulty, topic, top_k)
            .await?;

        let response = with_retry(&self.retry, LlmError::is_retryable, || {
            self.chat.complete(request.clone())
        })
        .await?;
        Ok(response.text)
    }

    fn record(&self, task: TaskType, difficulty: Difficulty, topic: &str) {
        let mut entries = self.history.lock().expect("history lock poisoned");
        entries.push(HistoryEntry {
            task,
            difficulty,
            topic: topic.to_string(),
            at: Utc::now(),
        });
        if entries.len() > MAX_HISTORY_ENTRIES {
            let excess = entries.len() - MAX_HISTORY_ENTRIES;
            entries.drain(..excess);
        }
    }
}

//! Full study flow: index notes, run tasks, validate structured output.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use studybuddy_core::embedding::{Embedder, EmbeddingError, EmbeddingMode};
use studybuddy_core::llm::{
    ChatClient, ChatRequest, ChatResponse, CompletionStream, LlmError,
};
use studybuddy_core::prompts::{Difficulty, TaskType};
use studybuddy_core::provider::Provider;
use studybuddy_core::rag::{RagService, SessionRegistry};
use studybuddy_core::{StudyBuddyError, StudyService};

struct ConstantEmbedder;

#[async_trait]
impl Embedder for ConstantEmbedder {
    async fn embed(&self, _text: &str, _mode: EmbeddingMode) -> Result<Vec<f32>, EmbeddingError> {
        Ok(vec![1.0, 0.0])
    }

    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model_name(&self) -> &str {
        "constant-embedding"
    }
}

/// Returns a canned response and records every request it sees.
struct ScriptedChatClient {
    response: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChatClient {
    fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn last_request(&self) -> ChatRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl ChatClient for ScriptedChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        Ok(ChatResponse {
            text: self.response.clone(),
            model: None,
        })
    }

    async fn stream(&self, request: ChatRequest) -> Result<CompletionStream, LlmError> {
        self.requests.lock().unwrap().push(request);
        let fragments: Vec<Result<String, LlmError>> = self
            .response
            .split_inclusive(' ')
            .map(|s| Ok(s.to_string()))
            .collect();
        Ok(Box::pin(futures::stream::iter(fragments)))
    }

    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

fn quiz_json() -> String {
    let questions: Vec<serde_json::Value> = (0..5)
        .map(|i| {
            serde_json::json!({
                "question": format!("What is fact {i}?"),
                "options": ["One", "Two", "Three", "Four"],
                "answer": "Three"
            })
        })
        .collect();
    serde_json::json!({ "questions": questions }).to_string()
}

fn deck_json() -> String {
    let cards: Vec<serde_json::Value> = (0..10)
        .map(|i| {
            serde_json::json!({
                "question": format!("Term {i}"),
                "answer": format!("Definition {i}")
            })
        })
        .collect();
    serde_json::json!({ "flashcards": cards }).to_string()
}

fn service_with(chat: Arc<ScriptedChatClient>) -> StudyService {
    let rag = RagService::new(SessionRegistry::new(), Arc::new(ConstantEmbedder));
    StudyService::new(rag, chat)
}

#[tokio::test]
async fn test_quiz_flow_with_notes() {
    let chat = Arc::new(ScriptedChatClient::new(quiz_json()));
    let svc = service_with(chat.clone());

    svc.index_notes("s1", "the mitochondria is the powerhouse of the cell")
        .await
        .unwrap();
    let quiz = svc
        .generate_quiz("s1", "cell biology", Difficulty::Advanced, 3)
        .await
        .unwrap();

    assert_eq!(quiz.questions.len(), 5);
    assert!(quiz.questions.iter().all(|q| q.options.len() == 4));

    let request = chat.last_request();
    assert!(request.json_mode);
    assert!(request.system_prompt.contains("RELEVANT CONTEXT FROM UPLOADED NOTES"));
    assert!(request.system_prompt.contains("mitochondria"));
    assert!(request.system_prompt.contains("Difficulty Level: advanced"));
    assert_eq!(request.user_message, "cell biology");
}

#[tokio::test]
async fn test_fenced_flashcards_are_accepted() {
    let fenced = format!("```json\n{}\n```", deck_json());
    let chat = Arc::new(ScriptedChatClient::new(fenced));
    let svc = service_with(chat);

    let deck = svc
        .generate_flashcards("s1", "anatomy", Difficulty::Beginner, 3)
        .await
        .unwrap();
    assert_eq!(deck.flashcards.len(), 10);
}

#[tokio::test]
async fn test_wrong_cardinality_is_malformed_response() {
    let chat = Arc::new(ScriptedChatClient::new(
        r#"{"questions":[{"question":"only one","options":["A","B","C","D"],"answer":"A"}]}"#,
    ));
    let svc = service_with(chat);

    let err = svc
        .generate_quiz("s1", "topic", Difficulty::Beginner, 3)
        .await
        .unwrap_err();
    assert!(matches!(err, StudyBuddyError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_explain_streams_prose_without_json_mode() {
    use futures::StreamExt;

    let chat = Arc::new(ScriptedChatClient::new("Photosynthesis converts light."));
    let svc = service_with(chat.clone());

    let stream = svc
        .stream_task("s1", TaskType::Explain, Difficulty::Beginner, "photosynthesis", 3)
        .await
        .unwrap();
    let parts: Vec<String> = stream.map(|r| r.unwrap()).collect().await;
    assert_eq!(parts.join(""), "Photosynthesis converts light.");

    let request = chat.last_request();
    assert!(!request.json_mode);
    assert!(request.system_prompt.contains("expert tutor"));
}

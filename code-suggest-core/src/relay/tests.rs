use super::*;
use crate::store::{MemoryStore, SuggestionFilter};
use crate::suggestion::{SuggestionStatus, SuggestionType};

fn relay(provider: MockProvider, store: Arc<MemoryStore>) -> ChatRelay {
    ChatRelay::new(Arc::new(provider), store.clone(), store)
}

fn request_with_file(conversation_id: Uuid, repository_id: Uuid) -> RelayRequest {
    RelayRequest {
        repository_id: Some(repository_id),
        open_files: vec![
            OpenFile { path: "app.py".to_string(), content: "def foo():\n  eval(x)".to_string() },
            OpenFile { path: "other.py".to_string(), content: "print('x')".to_string() },
        ],
        ..RelayRequest::new(conversation_id, "Can you look at this?")
    }
}

#[tokio::test]
async fn test_relay_persists_both_sides() {
    let store = Arc::new(MemoryStore::new());
    let provider = MockProvider::with_replies(["Hello there"]);
    let relay = relay(provider.clone(), store.clone());
    let conversation = Uuid::new_v4();

    let response = relay.handle(RelayRequest::new(conversation, "Hi")).await.unwrap();
    assert_eq!(response.reply, "Hello there");
    assert!(response.suggestions.is_empty());

    let history = store.history(conversation).await.unwrap();
    assert_eq!(history, [ChatMessage::user("Hi"), ChatMessage::assistant("Hello there")]);

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].system_prompt, DEFAULT_SYSTEM_PROMPT);
    assert!(calls[0].history.is_empty());
}

#[tokio::test]
async fn test_history_is_forwarded_on_later_turns() {
    let store = Arc::new(MemoryStore::new());
    let provider = MockProvider::with_replies(["first", "second"]);
    let relay = relay(provider.clone(), store);
    let conversation = Uuid::new_v4();

    relay.handle(RelayRequest::new(conversation, "one")).await.unwrap();
    relay.handle(RelayRequest::new(conversation, "two")).await.unwrap();

    let calls = provider.calls();
    assert_eq!(calls[1].history, [ChatMessage::user("one"), ChatMessage::assistant("first")]);
    assert_eq!(calls[1].user_message, "two");
}

#[tokio::test]
async fn test_trigger_runs_extractor_on_first_open_file() {
    let store = Arc::new(MemoryStore::new());
    let provider = MockProvider::with_replies(["I'll review the code for security issues."]);
    let relay = relay(provider, store.clone());
    let repo = Uuid::new_v4();

    let response = relay.handle(request_with_file(Uuid::new_v4(), repo)).await.unwrap();

    assert_eq!(response.analyzed_file.as_deref(), Some("app.py"));
    assert_eq!(response.suggestions.len(), 2);
    assert_eq!(response.suggestions[0].suggestion_type, SuggestionType::Security);
    assert!(response.suggestions.iter().all(|s| s.is_ai_generated && s.file_path == "app.py"));

    let stored = store
        .list(&SuggestionFilter::default().repository(repo).status(SuggestionStatus::Pending))
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_no_trigger_no_analysis() {
    let store = Arc::new(MemoryStore::new());
    let relay = relay(MockProvider::with_replies(["Sure, here you go."]), store.clone());

    let response = relay.handle(request_with_file(Uuid::new_v4(), Uuid::new_v4())).await.unwrap();
    assert!(response.analyzed_file.is_none());
    assert!(store.list(&SuggestionFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_trigger_without_open_file_is_skipped() {
    let store = Arc::new(MemoryStore::new());
    let relay = relay(MockProvider::with_replies(["Let me review that."]), store.clone());

    let request = RelayRequest {
        repository_id: Some(Uuid::new_v4()),
        ..RelayRequest::new(Uuid::new_v4(), "review please")
    };
    let response = relay.handle(request).await.unwrap();
    assert!(response.analyzed_file.is_none());
    assert!(response.suggestions.is_empty());
}

#[tokio::test]
async fn test_custom_trigger_and_code_blocks() {
    let store = Arc::new(MemoryStore::new());
    let reply = "Try this instead:\n```js\nconsole.log(value)\n```\n";
    let relay = relay(MockProvider::with_replies([reply]), store.clone())
        .with_trigger(|reply: &str| reply.contains("```"))
        .with_options(RelayOptions { scan_code_blocks: true, ..RelayOptions::default() });

    let conversation = Uuid::new_v4();
    let repo = Uuid::new_v4();
    let mut request = request_with_file(conversation, repo);
    request.open_files.truncate(1);
    request.open_files[0].content = "x = 1\n".to_string();

    let response = relay.handle(request).await.unwrap();
    let rules: Vec<_> = response.suggestions.iter().filter_map(|s| s.rule_id.as_deref()).collect();
    assert_eq!(rules, ["js-console-log"]);
    assert_eq!(response.suggestions[0].line_number, Some(3));
    assert_eq!(response.suggestions[0].file_path, reply_path(conversation, 1));

    // Nothing from the reply is attributed to the open file
    let in_file = store
        .list(&SuggestionFilter::default().repository(repo).file("app.py"))
        .await
        .unwrap();
    assert!(in_file.is_empty());
}

#[tokio::test]
async fn test_code_block_suggestions_keep_their_own_path() {
    let store = Arc::new(MemoryStore::new());
    let reply = "Please review this.\n\nYou could write:\n\n```js\nconsole.log(value)\n```\n";
    let relay = relay(MockProvider::with_replies(["Hi", reply]), store.clone())
        .with_options(RelayOptions { scan_code_blocks: true, ..RelayOptions::default() });

    let conversation = Uuid::new_v4();
    let repo = Uuid::new_v4();
    relay.handle(RelayRequest::new(conversation, "hello")).await.unwrap();

    let mut request = request_with_file(conversation, repo);
    request.open_files[0].content = "print('x')\n".to_string();
    let response = relay.handle(request).await.unwrap();

    let located: Vec<_> = response
        .suggestions
        .iter()
        .map(|s| (s.rule_id.as_deref(), s.file_path.as_str(), s.line_number))
        .collect();
    let reply_file = reply_path(conversation, 3);
    assert_eq!(
        located,
        [
            (Some("py-print"), "app.py", Some(1)),
            (Some("js-console-log"), reply_file.as_str(), Some(6)),
        ]
    );

    // The stored reply is the fourth message, and line 6 of it holds the match
    let history = store.history(conversation).await.unwrap();
    assert_eq!(history[3].content.lines().nth(5), Some("console.log(value)"));
}

#[tokio::test]
async fn test_provider_error_propagates() {
    let store = Arc::new(MemoryStore::new());
    let provider = MockProvider::new();
    provider.push_error(ChatError::auth("bad key"));
    let relay = relay(provider, store.clone());
    let conversation = Uuid::new_v4();

    let err = relay.handle(RelayRequest::new(conversation, "hello")).await.unwrap_err();
    assert!(matches!(err, RelayError::Chat(ChatError::AuthenticationError { .. })));

    // The user turn is kept even though no reply arrived
    assert_eq!(store.history(conversation).await.unwrap(), [ChatMessage::user("hello")]);
}

#[tokio::test]
async fn test_empty_message_rejected() {
    let relay = relay(MockProvider::new(), Arc::new(MemoryStore::new()));
    let err = relay.handle(RelayRequest::new(Uuid::new_v4(), "   ")).await.unwrap_err();
    assert!(matches!(err, RelayError::InvalidRequest(_)));
}

#[test]
fn test_request_json_contract() {
    let request: RelayRequest = serde_json::from_value(serde_json::json!({
        "conversationId": "6f1c2b1e-8f0a-4c1e-9d55-3f2a1b0c9d8e",
        "message": "hi",
        "openFiles": [{ "path": "a.py", "content": "" }],
        "frameworkHint": "django"
    }))
    .unwrap();

    assert_eq!(request.open_files.len(), 1);
    assert!(request.repository_id.is_none());
    assert_eq!(request.framework_hint.as_deref(), Some("django"));
}

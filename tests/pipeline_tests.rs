// tests/pipeline_tests.rs

mod common;

use std::sync::Arc;

use axum::body::Bytes;
use common::{Reply, ScriptedModel, questions_json};
use examgen::{
    generation::{GenerationError, GenerationPipeline, PdfUpload, pipeline::GenerationRequest},
    llm::QuestionModel,
    store::{ExamStore, MemoryStore},
};

fn pdf(file_name: &str) -> PdfUpload {
    PdfUpload {
        file_name: file_name.to_string(),
        content_type: Some("application/pdf".to_string()),
        bytes: Bytes::from_static(b"%PDF-1.4 fake document"),
    }
}

async fn setup(reply: Reply) -> (GenerationPipeline, Arc<MemoryStore>, Arc<ScriptedModel>, i64) {
    let store = Arc::new(MemoryStore::new());
    let user = store.create_user("alice", "hash").await.unwrap();
    let model = ScriptedModel::new(reply);
    let pipeline = GenerationPipeline::new(
        Some(model.clone() as Arc<dyn QuestionModel>),
        store.clone() as Arc<dyn ExamStore>,
    );
    (pipeline, store, model, user.id)
}

fn request(file: Option<PdfUpload>, settings: Option<&str>) -> GenerationRequest {
    GenerationRequest {
        file,
        settings: settings.map(str::to_string),
    }
}

#[tokio::test]
async fn well_formed_reply_creates_exam() {
    let (pipeline, store, model, user_id) = setup(Reply::Text(questions_json(10))).await;

    let summary = pipeline
        .run(Some(user_id), request(Some(pdf("Cell Biology.pdf")), None))
        .await
        .unwrap();

    assert!(summary.success);
    assert_eq!(summary.question_count, 10);
    assert_eq!(summary.file_name, "Cell Biology.pdf");
    assert_eq!(summary.file_size, b"%PDF-1.4 fake document".len());
    assert_eq!(model.calls(), 1);

    let exam = store.get_exam(summary.exam_id).await.unwrap().unwrap();
    assert_eq!(exam.user_id, user_id);
    assert_eq!(exam.exam_name, "Cell Biology");
    assert_eq!(
        exam.exam_description.as_deref(),
        Some("Generated from Cell Biology.pdf containing 10 questions")
    );

    let first = &exam.question_data.0[0];
    assert_eq!(first.question, "What is 1 + 1?");
    assert_eq!(first.answers, vec!["2", "3", "1", "$\\infty$"]);
    assert_eq!(first.correct_answer, "A");
    assert_eq!(first.explanation, "1 + 1 = 2");
}

#[tokio::test]
async fn default_settings_reach_the_prompt() {
    let (pipeline, _store, model, user_id) = setup(Reply::Text(questions_json(3))).await;

    pipeline
        .run(Some(user_id), request(Some(pdf("a.pdf")), None))
        .await
        .unwrap();

    let instruction = model.last_instruction().unwrap();
    assert!(instruction.contains("generate exactly 10 multiple choice questions"));
    assert!(instruction.contains("MIXED difficulty levels"));
    assert!(instruction.contains("brief, concise explanations"));
}

#[tokio::test]
async fn out_of_range_settings_are_clamped_not_rejected() {
    let (pipeline, _store, model, user_id) = setup(Reply::Text(questions_json(3))).await;

    pipeline
        .run(
            Some(user_id),
            request(
                Some(pdf("a.pdf")),
                Some(r#"{"numberOfQuestions": 50, "difficulty": "easy", "explanation": "nope"}"#),
            ),
        )
        .await
        .unwrap();

    let instruction = model.last_instruction().unwrap();
    assert!(instruction.contains("generate exactly 20 multiple choice questions"));
    assert!(instruction.contains("EASY difficulty level"));
    assert!(instruction.contains("brief, concise explanations"));
}

#[tokio::test]
async fn png_is_rejected_before_the_model_is_called() {
    let (pipeline, store, model, user_id) = setup(Reply::Text(questions_json(10))).await;
    let mut file = pdf("picture.png");
    file.content_type = Some("image/png".to_string());

    let err = pipeline
        .run(Some(user_id), request(Some(file), None))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::InvalidInput("File must be a PDF")));
    assert_eq!(model.calls(), 0);
    assert_eq!(store.exam_count().await, 0);
}

#[tokio::test]
async fn unparseable_reply_persists_nothing() {
    let (pipeline, store, model, user_id) = setup(Reply::Text("not valid json{".to_string())).await;

    let err = pipeline
        .run(Some(user_id), request(Some(pdf("a.pdf")), None))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::GenerationFailed(_)));
    assert!(err.user_message().starts_with("The AI had trouble processing your document"));
    assert_eq!(model.calls(), 1);
    assert_eq!(store.exam_count().await, 0);
}

#[tokio::test]
async fn invalid_question_fails_whole_batch() {
    let reply = r#"[{"question": "ok", "correctAnswer": "A"}, {"question": "bad", "correctAnswer": "Z"}]"#;
    let (pipeline, store, _model, user_id) = setup(Reply::Text(reply.to_string())).await;

    let err = pipeline
        .run(Some(user_id), request(Some(pdf("a.pdf")), None))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::GenerationFailed(_)));
    assert_eq!(store.exam_count().await, 0);
}

#[tokio::test]
async fn unescaped_latex_is_rejected_not_mangled() {
    // Single backslashes: invalid JSON, and YAML would turn `\a` and `\b` into control bytes.
    let reply = r#"[{"question": "Evaluate $\alpha + \beta$", "correctAnswer": "A"}]"#;
    let (pipeline, store, _model, user_id) = setup(Reply::Text(reply.to_string())).await;

    let err = pipeline
        .run(Some(user_id), request(Some(pdf("a.pdf")), None))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::GenerationFailed(_)));
    assert_eq!(store.exam_count().await, 0);
}

#[tokio::test]
async fn fenced_reply_is_accepted() {
    let reply = format!("```json\n{}\n```", questions_json(2));
    let (pipeline, _store, _model, user_id) = setup(Reply::Text(reply)).await;

    let summary = pipeline
        .run(Some(user_id), request(Some(pdf("a.pdf")), None))
        .await
        .unwrap();
    assert_eq!(summary.question_count, 2);
}

#[tokio::test]
async fn empty_array_is_insufficient_content() {
    let (pipeline, store, _model, user_id) = setup(Reply::Text("[]".to_string())).await;

    let err = pipeline
        .run(Some(user_id), request(Some(pdf("a.pdf")), None))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::InsufficientContent));
    assert_eq!(store.exam_count().await, 0);
}

#[tokio::test]
async fn no_session_fails_before_file_checks() {
    let (pipeline, _store, model, _user_id) = setup(Reply::Text(questions_json(1))).await;

    // No file either: the session check must win.
    let err = pipeline.run(None, request(None, None)).await.unwrap_err();

    assert!(matches!(err, GenerationError::Unauthorized));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn empty_model_reply_is_upstream_empty() {
    let (pipeline, _store, _model, user_id) = setup(Reply::Empty).await;

    let err = pipeline
        .run(Some(user_id), request(Some(pdf("a.pdf")), None))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::UpstreamEmpty));
}

#[tokio::test]
async fn upstream_errors_are_terminal() {
    let (pipeline, _store, model, user_id) = setup(Reply::RateLimited).await;

    let err = pipeline
        .run(Some(user_id), request(Some(pdf("a.pdf")), None))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::Upstream(_)));
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn missing_model_is_misconfigured() {
    let store = Arc::new(MemoryStore::new());
    let user = store.create_user("alice", "hash").await.unwrap();
    let pipeline = GenerationPipeline::new(None, store.clone() as Arc<dyn ExamStore>);

    let err = pipeline
        .run(Some(user.id), request(Some(pdf("a.pdf")), None))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Misconfigured));
}

#[tokio::test]
async fn unknown_owner_is_a_save_auth_failure() {
    let (pipeline, store, model, _user_id) = setup(Reply::Text(questions_json(4))).await;

    let err = pipeline
        .run(Some(9_999), request(Some(pdf("a.pdf")), None))
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::PersistenceAuthFailed));
    assert_eq!(err.user_message(), "You must be signed in to save exams.");
    assert_eq!(model.calls(), 1);
    assert_eq!(store.exam_count().await, 0);
}

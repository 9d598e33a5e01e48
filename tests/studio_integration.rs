//! Integration tests for interactive session flows over the fake provider

use std::sync::Arc;
use studymate::prompts::LANGUAGE_DETECTION_INSTRUCTION;
use studymate::providers::{FakeProvider, ImageData};
use studymate::schedule::EventDraft;
use studymate::{Assistant, Locale, Mode, Role, Studio, Translator};

fn studio(fake: &FakeProvider, mode: Mode) -> Studio {
    Studio::new(
        Assistant::new(Arc::new(fake.clone())),
        Translator::new(Locale::En),
        mode,
    )
}

#[tokio::test]
async fn test_first_tutor_turn_detects_language_once_and_opens_one_session() {
    let fake = FakeProvider::new().with_language("English");
    fake.push_chat(["Let's ", "break it down. ", "What is 2 + 1?"]);
    let mut studio = studio(&fake, Mode::Tutor);

    let mut snapshots = Vec::new();
    studio
        .send_tutor_message("2+2?", |history| {
            snapshots.push(history.last().map(|m| m.text.clone()).unwrap_or_default())
        })
        .await
        .unwrap();

    let calls = fake.calls();
    assert_eq!(calls.detect, 1);
    assert_eq!(calls.chat_sessions, 1);
    assert_eq!(calls.chat_messages, 1);

    let history = studio.tutor().history();
    assert_eq!(history.len(), 2);
    assert_eq!(history.messages()[0].role, Role::User);
    assert_eq!(history.messages()[0].text, "2+2?");
    assert_eq!(history.messages()[1].role, Role::Model);
    assert_eq!(
        history.messages()[1].text,
        "Let's break it down. What is 2 + 1?"
    );

    // The reply only ever grows while streaming
    let replies: Vec<_> = snapshots.iter().skip(1).collect();
    for pair in replies.windows(2) {
        assert!(pair[1].starts_with(pair[0].as_str()));
    }
    assert_eq!(snapshots.last().unwrap(), "Let's break it down. What is 2 + 1?");
}

#[tokio::test]
async fn test_second_tutor_turn_reuses_session() {
    let fake = FakeProvider::new();
    fake.push_chat(["First"]).push_chat(["Second"]);
    let mut studio = studio(&fake, Mode::Tutor);

    studio.send_tutor_message("one", |_| {}).await.unwrap();
    studio.send_tutor_message("two", |_| {}).await.unwrap();

    let calls = fake.calls();
    assert_eq!(calls.detect, 1);
    assert_eq!(calls.chat_sessions, 1);
    assert_eq!(calls.chat_messages, 2);
    assert_eq!(studio.tutor().history().len(), 4);
    assert_eq!(fake.messages(), vec!["one", "two"]);
}

#[tokio::test]
async fn test_failed_tutor_stream_keeps_user_message_and_records_error() {
    let fake = FakeProvider::new();
    fake.push_chat_error(["Partial"], "connection reset");
    let mut studio = studio(&fake, Mode::Tutor);

    let result = studio.send_tutor_message("help", |_| {}).await;

    assert!(result.is_err());
    let tutor = studio.tutor();
    assert_eq!(tutor.history().len(), 1);
    assert_eq!(tutor.history().last().unwrap().role, Role::User);
    assert!(tutor.error().unwrap().contains("connection reset"));
}

#[tokio::test]
async fn test_failed_sketch_generation_keeps_previous_sketch() {
    let fake = FakeProvider::new();
    fake.push_image(Some(ImageData::from_bytes("image/jpeg", b"first")))
        .push_image_error("quota exceeded");
    let mut studio = studio(&fake, Mode::Sketcher);

    studio.generate_sketch("a plant cell").await.unwrap();
    let result = studio.generate_sketch("an animal cell").await;

    assert!(result.is_err());
    let sketcher = studio.sketcher();
    assert_eq!(sketcher.sketch.as_ref().unwrap().decode().unwrap(), b"first");
    assert!(sketcher.error.as_ref().unwrap().contains("quota exceeded"));
    assert!(!sketcher.generating);
}

#[tokio::test]
async fn test_sketch_with_no_images_reports_failure() {
    let fake = FakeProvider::new();
    fake.push_image(None);
    let mut studio = studio(&fake, Mode::Sketcher);

    let result = studio.generate_sketch("a plant cell").await;

    assert!(result.is_err());
    assert!(studio.sketcher().sketch.is_none());
    assert!(studio
        .sketcher()
        .error
        .as_ref()
        .unwrap()
        .contains("No images were returned"));
}

#[tokio::test]
async fn test_schedule_generation_then_local_edits() {
    let fake = FakeProvider::new();
    fake.push_structured(
        r#"[{"day":"Monday","events":[{"time":"09:00 AM","title":"Math","description":""}]},
            {"day":"Tuesday","events":[]}]"#,
    );
    let mut studio = studio(&fake, Mode::Scheduler);

    studio.generate_schedule("Math on Monday").await.unwrap();
    let snapshot = studio.scheduler().store.data().unwrap().clone();
    let generated_id = snapshot.day(0).unwrap().events[0].id.clone();
    assert!(generated_id.starts_with("event-"));

    studio
        .add_event(1, EventDraft::new("10:00 AM", "Physics", "Lab"))
        .unwrap();
    studio.delete_event(0, &generated_id).unwrap();

    let data = studio.scheduler().store.data().unwrap();
    assert!(data.day(0).unwrap().events.is_empty());
    assert_eq!(data.day(1).unwrap().events[0].title, "Physics");

    // Earlier snapshots are untouched by later edits
    assert_eq!(snapshot.day(0).unwrap().events.len(), 1);
    assert!(snapshot.day(1).unwrap().events.is_empty());

    // Only the generation reached the provider
    assert_eq!(fake.calls().structured, 1);
}

#[tokio::test]
async fn test_malformed_schedule_reply_leaves_store_empty() {
    let fake = FakeProvider::new();
    fake.push_structured("not json");
    let mut studio = studio(&fake, Mode::Scheduler);

    assert!(studio.generate_schedule("my week").await.is_err());
    assert!(studio.scheduler().store.is_empty());
    assert!(studio.scheduler().error.is_some());
}

#[tokio::test]
async fn test_switching_mode_resets_tutor_conversation() {
    let fake = FakeProvider::new();
    let mut studio = studio(&fake, Mode::Tutor);
    studio.send_tutor_message("hello", |_| {}).await.unwrap();
    assert!(studio.tutor().has_session());

    assert!(studio.set_mode(Mode::Solver));
    assert!(studio.set_mode(Mode::Tutor));

    assert!(studio.tutor().history().is_empty());
    assert!(!studio.tutor().has_session());
}

#[tokio::test]
async fn test_solver_follow_ups_use_current_solution() {
    let fake = FakeProvider::new();
    fake.push_text("x = 2")
        .push_text("Key formula: x = 2")
        .push_text("1. Solve x + 1 = 4");
    let mut studio = studio(&fake, Mode::Solver);

    studio.solve("Solve x + 1 = 3", None).await.unwrap();
    studio.create_cheat_sheet().await.unwrap();
    studio.generate_practice_problems().await.unwrap();

    let solver = studio.solver();
    assert_eq!(solver.solution.value.as_deref(), Some("x = 2"));
    assert_eq!(solver.cheat_sheet.value.as_deref(), Some("Key formula: x = 2"));
    assert_eq!(solver.practice.value.as_deref(), Some("1. Solve x + 1 = 4"));

    let requests: Vec<_> = fake
        .requests()
        .into_iter()
        .filter(|r| r.system_instruction.as_deref() != Some(LANGUAGE_DETECTION_INSTRUCTION))
        .collect();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].prompt.as_deref(), Some("Solve x + 1 = 3"));
    assert_eq!(requests[1].prompt.as_deref(), Some("x = 2"));
    assert!(requests[2]
        .prompt
        .as_deref()
        .unwrap()
        .contains("Solve x + 1 = 3"));
}

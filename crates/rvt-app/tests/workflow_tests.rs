use std::{sync::atomic::Ordering, time::Duration};

use rvt_app::{
    Message, Screen,
    workflow::{
        Notice,
        syllabus::{SyllabusPhase, SyllabusWorkflow},
        topics::TopicsView,
    },
};
use rvt_client::{ApiClient, Gateway, Session, models::NewTopic};
use serde_json::json;
use uuid::Uuid;

use crate::common::{FakeService, Harness, TOPIC_ID};

fn syllabus(shell: &rvt_app::Shell) -> Option<&SyllabusWorkflow> {
    match shell.screen() {
        Screen::Syllabus(view) => Some(view),
        _ => None,
    }
}

#[tokio::test]
async fn test_syllabus_parse_and_commit() {
    let mut harness = Harness::start(Some("T1")).await;
    harness.shell.dispatch(Message::Init);
    harness.shell.dispatch(Message::Navigate("syllabus".to_string()));
    harness
        .shell
        .dispatch(Message::SetSyllabusText("Unit 1: Algebra".to_string()));
    harness.shell.dispatch(Message::ParseSyllabus);

    harness
        .step_until(|shell| {
            syllabus(shell).is_some_and(|view| view.phase() == SyllabusPhase::Previewing)
        })
        .await;

    let expected = NewTopic {
        name: "Algebra".to_string(),
        subject: "Math".to_string(),
        unit: None,
        difficulty: 2,
        importance: 3,
    };
    assert_eq!(syllabus(&harness.shell).unwrap().preview(), &[expected.clone()]);

    harness.shell.dispatch(Message::CommitSyllabus);
    harness
        .step_until(|shell| {
            syllabus(shell).is_some_and(|view| view.phase() == SyllabusPhase::Editing)
        })
        .await;

    let view = syllabus(&harness.shell).unwrap();
    assert!(view.preview().is_empty());
    assert_eq!(view.text(), "");

    let bodies = harness.service.state.bulk_bodies.lock().unwrap().clone();
    assert_eq!(bodies, vec![json!([expected])]);
}

#[tokio::test]
async fn test_failed_commit_keeps_preview_for_retry() {
    let mut harness = Harness::start(Some("T1")).await;
    harness.shell.dispatch(Message::Init);
    harness.shell.dispatch(Message::Navigate("syllabus".to_string()));
    harness
        .shell
        .dispatch(Message::SetSyllabusText("Unit 1: Algebra".to_string()));
    harness.shell.dispatch(Message::ParseSyllabus);
    harness
        .step_until(|shell| {
            syllabus(shell).is_some_and(|view| view.phase() == SyllabusPhase::Previewing)
        })
        .await;
    let before = syllabus(&harness.shell).unwrap().preview().to_vec();

    harness.service.state.fail_bulk.store(true, Ordering::SeqCst);
    harness.shell.dispatch(Message::CommitSyllabus);
    harness
        .step_until(|shell| {
            syllabus(shell).is_some_and(|view| {
                view.phase() == SyllabusPhase::Previewing && view.notice().is_some()
            })
        })
        .await;

    let view = syllabus(&harness.shell).unwrap();
    assert_eq!(view.preview(), before.as_slice());
    assert_eq!(view.text(), "Unit 1: Algebra");
    assert_eq!(
        view.notice(),
        Some(&Notice::Error("Database unavailable".to_string()))
    );

    harness.service.state.fail_bulk.store(false, Ordering::SeqCst);
    harness.shell.dispatch(Message::CommitSyllabus);
    harness
        .step_until(|shell| {
            syllabus(shell).is_some_and(|view| view.phase() == SyllabusPhase::Editing)
        })
        .await;
    assert_eq!(harness.service.state.bulk_bodies.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_parse_shows_detail() {
    let mut harness = Harness::start(Some("T1")).await;
    harness.shell.dispatch(Message::Init);
    harness.shell.dispatch(Message::Navigate("syllabus".to_string()));
    harness
        .shell
        .dispatch(Message::SetSyllabusText("gibberish".to_string()));
    harness.shell.dispatch(Message::ParseSyllabus);

    harness
        .step_until(|shell| syllabus(shell).is_some_and(|view| view.notice().is_some()))
        .await;

    let view = syllabus(&harness.shell).unwrap();
    assert!(view.preview().is_empty());
    assert_eq!(view.notice().unwrap().text(), "No topics could be parsed");
}

#[tokio::test]
async fn test_revision_is_recorded_and_list_reloaded() {
    let mut harness = Harness::start(Some("T1")).await;
    harness.shell.dispatch(Message::Init);
    harness.shell.dispatch(Message::Navigate("topics".to_string()));
    harness
        .step_until(|shell| {
            matches!(shell.screen(), Screen::Topics(view) if !view.is_loading() && !view.topics().is_empty())
        })
        .await;

    harness.shell.dispatch(Message::Revise {
        topic_id: Uuid::parse_str(TOPIC_ID).unwrap(),
        confidence: None,
    });
    harness
        .step_until(|shell| {
            matches!(
                shell.screen(),
                Screen::Topics(view) if view.notice().is_some() && !view.is_loading()
            )
        })
        .await;

    let bodies = harness.service.state.revision_bodies.lock().unwrap().clone();
    assert_eq!(bodies, vec![json!({ "topic_id": TOPIC_ID, "confidence": 3 })]);
    assert_eq!(harness.service.state.topic_loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_controllers_run_without_the_shell() {
    let service = FakeService::start().await;
    let session = Session::in_memory();
    session.set_token("T1").unwrap();
    let client = ApiClient::new(
        Gateway::new(&service.base_url, Duration::from_secs(5)).unwrap(),
        session,
    );

    let mut topics = TopicsView::new();
    topics.load(&client).await;
    assert_eq!(topics.topics().len(), 1);

    let topic_id = topics.topics()[0].id;
    topics.revise(&client, topic_id, None).await.unwrap();
    assert_eq!(service.state.topic_loads.load(Ordering::SeqCst), 2);

    let mut workflow = SyllabusWorkflow::new();
    workflow.set_text("Algebra").unwrap();
    workflow.parse(&client).await.unwrap();
    workflow.commit(&client).await.unwrap();
    assert_eq!(workflow.phase(), SyllabusPhase::Editing);
    assert_eq!(
        workflow.notice(),
        Some(&Notice::Info("Created 1 topics".to_string()))
    );
}

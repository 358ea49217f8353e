use std::sync::Arc;

use quillform_core::{FieldId, TenantId};
use quillform_domain::{
    AnswerKey, FieldDefinition, FieldOption, Item, QuestionnaireDefinition, ResponseStatus, UiType,
};
use serde_json::json;

use crate::questionnaire_ports::{QuestionnaireRepository, RuntimeContextKey};
use crate::test_support::{FakeRepository, header, question, questionnaire};
use crate::version_service::VersionService;

use super::{RunnerService, RunnerSession};

struct Fixture {
    repository: Arc<FakeRepository>,
    service: RunnerService,
    tenant_id: TenantId,
    questionnaire: QuestionnaireDefinition,
    name_item: Item,
    name_field: FieldDefinition,
}

async fn fixture() -> Fixture {
    let repository = Arc::new(FakeRepository::new());
    let versions = VersionService::new(repository.clone());
    let service = RunnerService::new(repository.clone(), versions);
    let tenant_id = TenantId::new();

    let questionnaire = questionnaire();
    assert!(
        repository
            .save_questionnaire(tenant_id, questionnaire.clone())
            .await
            .is_ok()
    );

    let intro = header(questionnaire.id(), "Intro", 0);
    let name_item = question(questionnaire.id(), None, "Name", 1);
    assert!(repository.save_item(tenant_id, intro).await.is_ok());
    assert!(
        repository
            .save_item(tenant_id, name_item.clone())
            .await
            .is_ok()
    );

    let name_field = FieldDefinition::new(
        FieldId::new(),
        name_item.id(),
        UiType::Input,
        Some("Name".to_owned()),
        None,
        None,
        None,
        None,
        None,
        Vec::new(),
        None,
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(
        repository
            .save_field(tenant_id, name_field.clone())
            .await
            .is_ok()
    );

    Fixture {
        repository,
        service,
        tenant_id,
        questionnaire,
        name_item,
        name_field,
    }
}

fn application_key(fixture: &Fixture) -> RuntimeContextKey {
    RuntimeContextKey::Application {
        questionnaire_id: fixture.questionnaire.id(),
        application_id: quillform_core::ApplicationId::new(),
    }
}

#[tokio::test]
async fn load_by_application_creates_in_progress_response() {
    let fixture = fixture().await;

    let payload = fixture
        .service
        .load_context(fixture.tenant_id, application_key(&fixture))
        .await;
    assert!(payload.is_ok());

    let payload = payload.unwrap_or_else(|_| unreachable!());
    assert_eq!(payload.response.status(), ResponseStatus::InProgress);
    assert_eq!(payload.items.len(), 2);
    assert_eq!(payload.fields.len(), 1);
    assert_eq!(payload.outline[0].outline(), "1");
}

#[tokio::test]
async fn load_missing_response_is_not_found() {
    let fixture = fixture().await;

    let result = fixture
        .service
        .load_context(
            fixture.tenant_id,
            RuntimeContextKey::Response(quillform_core::ResponseId::new()),
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn answer_round_trips_through_draft_save() {
    let fixture = fixture().await;
    let key = application_key(&fixture);

    let mut session = RunnerSession::new(fixture.service.clone(), fixture.tenant_id);
    let installed = session.load(key).await;
    assert!(installed.is_ok());

    session.update_answer(
        AnswerKey::Field(fixture.name_field.id()),
        json!("Alice"),
    );
    assert!(session.dirty());

    let saved = session.save(ResponseStatus::InProgress).await;
    assert!(saved.is_ok());
    assert!(!session.dirty());

    // Reload the same context: the answer must read back.
    let mut reloaded = RunnerSession::new(fixture.service.clone(), fixture.tenant_id);
    assert!(reloaded.load(key).await.is_ok());
    assert_eq!(
        reloaded.answers().get(AnswerKey::Field(fixture.name_field.id())),
        Some(&json!("Alice"))
    );
    assert_eq!(
        reloaded
            .payload()
            .map(|payload| payload.response.status()),
        Some(ResponseStatus::InProgress)
    );
}

#[tokio::test]
async fn clearing_an_answer_removes_it_from_persistence() {
    let fixture = fixture().await;
    let key = application_key(&fixture);
    let answer_key = AnswerKey::Field(fixture.name_field.id());

    let mut session = RunnerSession::new(fixture.service.clone(), fixture.tenant_id);
    assert!(session.load(key).await.is_ok());

    session.update_answer(answer_key, json!("Alice"));
    assert!(session.save(ResponseStatus::InProgress).await.is_ok());

    session.update_answer(answer_key, json!(""));
    assert!(session.save(ResponseStatus::InProgress).await.is_ok());

    let mut reloaded = RunnerSession::new(fixture.service.clone(), fixture.tenant_id);
    assert!(reloaded.load(key).await.is_ok());
    assert!(reloaded.answers().get(answer_key).is_none());
    assert_eq!(
        reloaded
            .payload()
            .map(|payload| payload.response.answers().len()),
        Some(0)
    );
}

#[tokio::test]
async fn multiselect_toggles_accumulate_into_outgoing_value() {
    let fixture = fixture().await;

    let colors = FieldDefinition::new(
        FieldId::new(),
        fixture.name_item.id(),
        UiType::Multiselect,
        Some("Colors".to_owned()),
        None,
        None,
        None,
        None,
        None,
        vec![
            FieldOption::new("Red", "r").unwrap_or_else(|_| unreachable!()),
            FieldOption::new("Blue", "b").unwrap_or_else(|_| unreachable!()),
        ],
        None,
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(
        fixture
            .repository
            .save_field(fixture.tenant_id, colors.clone())
            .await
            .is_ok()
    );

    let key = application_key(&fixture);
    let mut session = RunnerSession::new(fixture.service.clone(), fixture.tenant_id);
    assert!(session.load(key).await.is_ok());

    let answer_key = AnswerKey::Field(colors.id());
    session.toggle_choice(answer_key, "r");
    session.toggle_choice(answer_key, "b");
    session.toggle_choice(answer_key, "r");
    assert!(session.save(ResponseStatus::InProgress).await.is_ok());

    let mut reloaded = RunnerSession::new(fixture.service.clone(), fixture.tenant_id);
    assert!(reloaded.load(key).await.is_ok());
    assert_eq!(reloaded.answers().get(answer_key), Some(&json!(["b"])));
}

#[tokio::test]
async fn submit_twice_is_idempotent() {
    let fixture = fixture().await;
    let key = application_key(&fixture);

    let mut session = RunnerSession::new(fixture.service.clone(), fixture.tenant_id);
    assert!(session.load(key).await.is_ok());
    session.update_answer(AnswerKey::Field(fixture.name_field.id()), json!("Alice"));

    assert!(session.save(ResponseStatus::Submitted).await.is_ok());
    let first_submitted_at = session
        .payload()
        .and_then(|payload| payload.response.submitted_at());
    assert!(first_submitted_at.is_some());

    assert!(session.save(ResponseStatus::Submitted).await.is_ok());
    let payload = session.payload();
    assert_eq!(
        payload.map(|payload| payload.response.status()),
        Some(ResponseStatus::Submitted)
    );
    assert_eq!(
        payload.and_then(|payload| payload.response.submitted_at()),
        first_submitted_at
    );
}

#[tokio::test]
async fn failed_save_preserves_dirty_state() {
    let fixture = fixture().await;
    let key = application_key(&fixture);

    let mut session = RunnerSession::new(fixture.service.clone(), fixture.tenant_id);
    assert!(session.load(key).await.is_ok());

    // A key pointing at a field the payload does not know fails the save.
    session.update_answer(AnswerKey::Field(FieldId::new()), json!("lost?"));
    assert!(session.dirty());

    let result = session.save(ResponseStatus::InProgress).await;
    assert!(result.is_err());
    assert!(session.dirty());
}

#[tokio::test]
async fn save_rejects_field_item_mismatch() {
    let fixture = fixture().await;

    let payload = fixture
        .service
        .load_context(fixture.tenant_id, application_key(&fixture))
        .await;
    assert!(payload.is_ok());
    let payload = payload.unwrap_or_else(|_| unreachable!());

    let other_item = question(fixture.questionnaire.id(), None, "Other", 5);
    assert!(
        fixture
            .repository
            .save_item(fixture.tenant_id, other_item.clone())
            .await
            .is_ok()
    );

    let result = fixture
        .service
        .save_answers(
            fixture.tenant_id,
            payload.response.id(),
            vec![quillform_domain::OutgoingAnswer {
                item_id: other_item.id(),
                field_id: Some(fixture.name_field.id()),
                value: json!("Alice"),
            }],
            ResponseStatus::InProgress,
        )
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn stale_load_result_is_discarded() {
    let fixture = fixture().await;
    let key = application_key(&fixture);

    let mut session = RunnerSession::new(fixture.service.clone(), fixture.tenant_id);
    let stale_ticket = session.begin_load();
    let stale_payload = fixture
        .service
        .load_context(fixture.tenant_id, key)
        .await;
    assert!(stale_payload.is_ok());

    // A newer load starts before the first one resolves.
    let fresh_ticket = session.begin_load();
    let fresh_payload = fixture
        .service
        .load_context(fixture.tenant_id, key)
        .await;
    assert!(fresh_payload.is_ok());

    assert!(!session.install_payload(
        stale_ticket,
        stale_payload.unwrap_or_else(|_| unreachable!())
    ));
    assert!(session.payload().is_none());

    assert!(session.install_payload(
        fresh_ticket,
        fresh_payload.unwrap_or_else(|_| unreachable!())
    ));
    assert!(session.payload().is_some());
}

#[tokio::test]
async fn intersection_observer_picks_topmost_visible_section() {
    let fixture = fixture().await;
    let key = application_key(&fixture);

    let mut session = RunnerSession::new(fixture.service.clone(), fixture.tenant_id);
    assert!(session.load(key).await.is_ok());

    let outline_order: Vec<quillform_core::ItemId> = session
        .payload()
        .map(|payload| {
            payload
                .outline
                .iter()
                .map(quillform_domain::OutlineEntry::item_id)
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(outline_order.len(), 2);

    session.observe_intersections(&[outline_order[1], outline_order[0]]);
    assert_eq!(session.active_item(), Some(outline_order[0]));

    // A side-nav click bypasses the observer.
    session.set_active_item(outline_order[1]);
    assert_eq!(session.active_item(), Some(outline_order[1]));

    // Nothing visible keeps the current pointer.
    session.observe_intersections(&[]);
    assert_eq!(session.active_item(), Some(outline_order[1]));
}

use campus_domain::{NotificationRecord, Phase, RequestKind, Role, WorkflowRequest};
use requests::{InMemoryNotificationRepository, InMemoryRequestRepository, NotificationRepository, PersistResult,
               RequestRepository, StoreError};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

fn achievement(subject: &str) -> WorkflowRequest {
  WorkflowRequest::submit(RequestKind::Achievement, subject, json!({"title": "demo"}), Role::Teacher).unwrap()
}

#[test]
fn create_get_roundtrip_and_duplicate_conflict() {
  let repo = InMemoryRequestRepository::new();
  let req = achievement("stu-1");
  let id = repo.create_request(&req).unwrap();
  assert_eq!(id, req.id());

  let loaded = repo.get_request(&id).unwrap();
  assert_eq!(loaded.subject_id(), "stu-1");
  assert_eq!(loaded.version(), 0);
  assert_eq!(loaded.current_approver_role(), Some(Role::Teacher));
  assert!(loaded.history().is_empty());

  // inserting the same id again must conflict
  match repo.create_request(&req) {
    Err(StoreError::Conflict(_)) => {}
    other => panic!("expected conflict on duplicate insert, got {:?}", other),
  }

  match repo.get_request(&Uuid::new_v4()) {
    Err(StoreError::NotFound(_)) => {}
    other => panic!("expected NotFound, got {:?}", other),
  }
}

#[test]
fn worklist_filters_by_role_newest_first() {
  let repo = InMemoryRequestRepository::new();
  let first = achievement("stu-1");
  let second = achievement("stu-2");
  repo.create_request(&first).unwrap();
  repo.create_request(&second).unwrap();

  let teacher_list = repo.list_actionable(Role::Teacher).unwrap();
  assert_eq!(teacher_list.len(), 2);
  // newest first
  assert!(teacher_list[0].created_at() >= teacher_list[1].created_at());

  assert!(repo.list_actionable(Role::Hod).unwrap().is_empty());
}

#[test]
fn persist_transition_respects_version_guard() {
  let repo = InMemoryRequestRepository::new();
  let req = achievement("stu-1");
  repo.create_request(&req).unwrap();

  let mut step = repo.get_request(&req.id()).unwrap();
  step.forward_to(Role::Hod, Role::Teacher, "prof garcia", None, None).unwrap();

  // wrong expected_version -> Conflict, nothing stored
  match repo.persist_transition(&step, 7).unwrap() {
    PersistResult::Conflict => {}
    PersistResult::Ok { .. } => panic!("expected conflict for stale version"),
  }
  assert_eq!(repo.get_request(&req.id()).unwrap().history().len(), 0);

  // correct expected_version -> Ok with bumped version
  match repo.persist_transition(&step, 0).unwrap() {
    PersistResult::Ok { new_version } => assert_eq!(new_version, 1),
    PersistResult::Conflict => panic!("unexpected conflict"),
  }
  let stored = repo.get_request(&req.id()).unwrap();
  assert_eq!(stored.version(), 1);
  assert_eq!(stored.history().len(), 1);
  assert_eq!(stored.current_approver_role(), Some(Role::Hod));
}

#[test]
fn history_must_grow_by_exactly_one() {
  let repo = InMemoryRequestRepository::new();
  let req = achievement("stu-1");
  repo.create_request(&req).unwrap();

  // two local transitions, persisted in one write: the repo refuses it
  let mut step = repo.get_request(&req.id()).unwrap();
  step.forward_to(Role::Hod, Role::Teacher, "prof garcia", None, None).unwrap();
  step.forward_to(Role::Principal, Role::Hod, "dr lopez", None, None).unwrap();
  match repo.persist_transition(&step, 0) {
    Err(StoreError::Conflict(_)) => {}
    other => panic!("expected conflict for double append, got {:?}", other),
  }
}

#[test]
fn command_id_makes_retries_idempotent() {
  let repo = InMemoryRequestRepository::new();
  let req = achievement("stu-1");
  repo.create_request(&req).unwrap();

  let cmd = Uuid::new_v4();
  let mut step = repo.get_request(&req.id()).unwrap();
  step.forward_to(Role::Hod, Role::Teacher, "prof garcia", None, Some(cmd)).unwrap();

  let v1 = match repo.persist_transition(&step, 0).unwrap() {
    PersistResult::Ok { new_version } => new_version,
    PersistResult::Conflict => panic!("unexpected conflict"),
  };

  // a client retry with the last known version is a no-op
  match repo.persist_transition(&step, v1).unwrap() {
    PersistResult::Ok { new_version } => assert_eq!(new_version, v1),
    PersistResult::Conflict => panic!("retry should be idempotent"),
  }
  assert_eq!(repo.get_request(&req.id()).unwrap().history().len(), 1);
}

#[test]
fn racing_writers_produce_one_winner() {
  let repo = Arc::new(InMemoryRequestRepository::new());
  let req = achievement("stu-1");
  repo.create_request(&req).unwrap();

  let mut handles = Vec::new();
  for actor in ["prof garcia", "prof ruiz"] {
    let repo = Arc::clone(&repo);
    let id = req.id();
    handles.push(std::thread::spawn(move || {
      let mut step = repo.get_request(&id).unwrap();
      step.forward_to(Role::Hod, Role::Teacher, actor, None, None).unwrap();
      repo.persist_transition(&step, 0).unwrap()
    }));
  }

  let results: Vec<PersistResult> = handles.into_iter().map(|h| h.join().unwrap()).collect();
  let wins = results.iter().filter(|r| matches!(r, PersistResult::Ok { .. })).count();
  let losses = results.iter().filter(|r| matches!(r, PersistResult::Conflict)).count();
  assert_eq!(wins, 1);
  assert_eq!(losses, 1);
  // exactly one history entry landed
  let stored = repo.get_request(&req.id()).unwrap();
  assert_eq!(stored.history().len(), 1);
  assert_eq!(stored.status().phase(), Phase::Pending);
}

#[test]
fn updated_since_sees_transitions() {
  let repo = InMemoryRequestRepository::new();
  let req = achievement("stu-1");
  repo.create_request(&req).unwrap();
  let cursor = repo.get_request(&req.id()).unwrap().updated_at();

  assert!(repo.list_updated_since(cursor).unwrap().is_empty());

  let mut step = repo.get_request(&req.id()).unwrap();
  step.forward_to(Role::Hod, Role::Teacher, "prof garcia", None, None).unwrap();
  repo.persist_transition(&step, 0).unwrap();

  let changed = repo.list_updated_since(cursor).unwrap();
  assert_eq!(changed.len(), 1);
  assert_eq!(changed[0].id(), req.id());
}

#[test]
fn notification_store_lifecycle() {
  let repo = InMemoryNotificationRepository::new();
  let related = Uuid::new_v4();
  let n1 = NotificationRecord::new("stu-1",
                                   "achievement_forwarded".into(),
                                   "Request forwarded".into(),
                                   "approved and forwarded to hod".into(),
                                   related);
  let n2 = NotificationRecord::new("stu-1",
                                   "achievement_approved".into(),
                                   "Request approved".into(),
                                   "approved".into(),
                                   related);
  repo.append(&n1).unwrap();
  repo.append(&n2).unwrap();

  let list = repo.list_for_subject("stu-1").unwrap();
  assert_eq!(list.len(), 2);
  assert!(list[0].created_at >= list[1].created_at);
  assert!(list.iter().all(|n| !n.read));
  assert!(repo.list_for_subject("stu-2").unwrap().is_empty());

  repo.mark_read(&n1.id).unwrap();
  let list = repo.list_for_subject("stu-1").unwrap();
  assert!(list.iter().find(|n| n.id == n1.id).unwrap().read);

  match repo.mark_read(&Uuid::new_v4()) {
    Err(StoreError::NotFound(_)) => {}
    other => panic!("expected NotFound, got {:?}", other),
  }
}

use campus_domain::{AuditAction, NotificationRecord, Phase, RequestKind, Role};
use campus_workflow::{Actor, ApprovalService, TransitionAction, TransitionCommand, WorkflowError};
use requests::{InMemoryNotificationRepository, InMemoryRequestRepository, NotificationRepository, StoreError};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

type Service = ApprovalService<InMemoryRequestRepository, InMemoryNotificationRepository>;

fn service() -> Service {
  ApprovalService::new(Arc::new(InMemoryRequestRepository::new()),
                       Arc::new(InMemoryNotificationRepository::new()))
}

#[test]
fn achievement_chain_walks_to_terminal() {
  let svc = service();
  let id = svc.create_request(RequestKind::Achievement, "stu-1", json!({"title": "robotics prize"}))
              .expect("create");

  // fresh request sits in the teacher's worklist
  let teacher_list = svc.list_actionable(Role::Teacher).unwrap();
  assert_eq!(teacher_list.len(), 1);
  assert_eq!(teacher_list[0].status().label(), "pending at teacher");

  let after_teacher = svc.approve(id, Role::Teacher, "prof garcia", None).expect("teacher approve");
  assert_eq!(after_teacher.status().label(), "pending at hod");
  assert_eq!(after_teacher.current_approver_role(), Some(Role::Hod));
  // worklist consistency: gone for teacher, visible for hod
  assert!(svc.list_actionable(Role::Teacher).unwrap().is_empty());
  assert_eq!(svc.list_actionable(Role::Hod).unwrap().len(), 1);

  let after_hod = svc.approve(id, Role::Hod, "dr lopez", Some("verified".into())).expect("hod approve");
  assert_eq!(after_hod.status().label(), "pending at principal");

  let done = svc.approve(id, Role::Principal, "principal vega", None).expect("principal approve");
  assert_eq!(done.status().phase(), Phase::Approved);
  assert_eq!(done.status().label(), "approved");
  assert_eq!(done.current_approver_role(), None);
  assert_eq!(done.history().len(), 3);
  assert_eq!(done.history()[0].action, AuditAction::Forwarded);
  assert_eq!(done.history()[1].action, AuditAction::Forwarded);
  assert_eq!(done.history()[2].action, AuditAction::Approved);
  assert!(svc.list_actionable(Role::Principal).unwrap().is_empty());

  // one notification per transition, newest first
  let notes = svc.notifications_for("stu-1").unwrap();
  assert_eq!(notes.len(), 3);
  assert_eq!(notes[0].event, "achievement_approved");
  assert!(notes[1].message.contains("forwarded to principal"));
  assert!(notes.iter().all(|n| n.related_request_id == id));
}

#[test]
fn maintenance_routes_to_category_specialist() {
  let svc = service();
  let id = svc.create_request(RequestKind::Maintenance,
                              "stu-2",
                              json!({"category": "electrical", "description": "lab socket sparks"}))
              .expect("create");

  let routed = svc.approve(id, Role::Clerk, "clerk pia", None).expect("clerk approve");
  assert_eq!(routed.current_approver_role(), Some(Role::ElectricalTechnician));
  assert_eq!(routed.history()[0].forwarded_to, Some(Role::ElectricalTechnician));

  let done = svc.approve(id, Role::ElectricalTechnician, "tech dan", Some("fixed".into())).expect("tech approve");
  assert_eq!(done.status().phase(), Phase::Approved);
  assert_eq!(done.history().len(), 2);
}

#[test]
fn maintenance_unmapped_category_goes_to_registrar() {
  let svc = service();
  let id = svc.create_request(RequestKind::Maintenance, "stu-2", json!({"description": "misc"}))
              .expect("create");
  let routed = svc.approve(id, Role::Clerk, "clerk pia", None).expect("clerk approve");
  assert_eq!(routed.current_approver_role(), Some(Role::Registrar));
}

#[test]
fn reject_mid_chain_records_where_and_why() {
  let svc = service();
  let id = svc.create_request(RequestKind::Achievement, "stu-1", json!({"title": "chess"})).expect("create");
  svc.approve(id, Role::Teacher, "prof garcia", None).expect("teacher approve");

  let rejected = svc.reject(id, Role::Hod, "dr lopez", "insufficient proof").expect("reject");
  assert_eq!(rejected.status().phase(), Phase::Rejected);
  assert_eq!(rejected.status().label(), "rejected at hod");
  assert_eq!(rejected.current_approver_role(), None);
  let last = rejected.history().last().unwrap();
  assert_eq!(last.action, AuditAction::Rejected);
  assert_eq!(last.comment.as_deref(), Some("insufficient proof"));

  let notes = svc.notifications_for("stu-1").unwrap();
  assert!(notes[0].message.contains("rejected by hod: insufficient proof"));
}

#[test]
fn reject_requires_a_reason() {
  let svc = service();
  let id = svc.create_request(RequestKind::Achievement, "stu-1", json!({"title": "chess"})).expect("create");
  let cmd = TransitionCommand { request_id: id,
                                actor: Actor { name: "prof garcia".into(), role: Role::Teacher },
                                action: TransitionAction::Reject,
                                comment: Some("   ".into()),
                                command_id: None };
  match svc.transition(cmd) {
    Err(WorkflowError::Validation(_)) => {}
    other => panic!("expected Validation, got {:?}", other),
  }
  // nothing moved
  let current = svc.get_request(&id).unwrap();
  assert_eq!(current.status().phase(), Phase::Pending);
  assert!(current.history().is_empty());
}

#[test]
fn wrong_approver_never_mutates() {
  let svc = service();
  let id = svc.create_request(RequestKind::Achievement, "stu-1", json!({"title": "chess"})).expect("create");
  svc.approve(id, Role::Teacher, "prof garcia", None).expect("teacher approve");

  // principal tries to jump the hod stage
  match svc.approve(id, Role::Principal, "principal vega", None) {
    Err(WorkflowError::WrongApprover { expected, got }) => {
      assert_eq!(expected, Role::Hod);
      assert_eq!(got, Role::Principal);
    }
    other => panic!("expected WrongApprover, got {:?}", other),
  }
  let unchanged = svc.get_request(&id).unwrap();
  assert_eq!(unchanged.history().len(), 1);
  assert_eq!(unchanged.current_approver_role(), Some(Role::Hod));
}

#[test]
fn terminal_states_absorb_everything() {
  let svc = service();
  let id = svc.create_request(RequestKind::LibraryTiming, "stu-4", json!({"slot": "evening"})).expect("create");
  svc.approve(id, Role::Librarian, "lib ana", None).expect("librarian approve");
  svc.approve(id, Role::Principal, "principal vega", None).expect("principal approve");

  for (role, action) in [(Role::Principal, TransitionAction::Approve), (Role::Librarian, TransitionAction::Reject)] {
    let cmd = TransitionCommand { request_id: id,
                                  actor: Actor { name: "anyone".into(), role },
                                  action,
                                  comment: Some("late".into()),
                                  command_id: None };
    match svc.transition(cmd) {
      Err(WorkflowError::StaleOrTerminal(_)) => {}
      other => panic!("expected StaleOrTerminal, got {:?}", other),
    }
  }
  assert_eq!(svc.get_request(&id).unwrap().history().len(), 2);
}

#[test]
fn history_is_append_only_with_monotonic_timestamps() {
  let svc = service();
  let id = svc.create_request(RequestKind::Certificate, "stu-6", json!({"doc": "transcript"})).expect("create");

  let mut snapshots = Vec::new();
  for (role, name) in [(Role::Clerk, "clerk pia"), (Role::Registrar, "reg omar"), (Role::Principal, "principal vega")] {
    let before = svc.get_request(&id).unwrap().history().to_vec();
    let after = svc.approve(id, role, name, None).expect("approve");
    assert_eq!(after.history().len(), before.len() + 1);
    // prior entries are untouched
    assert_eq!(&after.history()[..before.len()], &before[..]);
    snapshots.push(after.history().to_vec());
  }
  let final_history = snapshots.last().unwrap();
  for pair in final_history.windows(2) {
    assert!(pair[0].at <= pair[1].at);
  }
}

#[test]
fn command_id_replay_returns_confirmed_state() {
  let svc = service();
  let id = svc.create_request(RequestKind::Achievement, "stu-1", json!({"title": "chess"})).expect("create");
  let cmd_id = Uuid::new_v4();
  let cmd = TransitionCommand { request_id: id,
                                actor: Actor { name: "prof garcia".into(), role: Role::Teacher },
                                action: TransitionAction::Approve,
                                comment: None,
                                command_id: Some(cmd_id) };

  let first = svc.transition(cmd.clone()).expect("first");
  assert_eq!(first.current_approver_role(), Some(Role::Hod));

  // the retry neither fails nor appends
  let replay = svc.transition(cmd).expect("replay");
  assert_eq!(replay.history().len(), 1);
  assert_eq!(replay.current_approver_role(), Some(Role::Hod));
  assert_eq!(svc.get_request(&id).unwrap().history().len(), 1);
}

#[test]
fn racing_approvers_produce_one_winner() {
  let repo = Arc::new(InMemoryRequestRepository::new());
  let notes = Arc::new(InMemoryNotificationRepository::new());
  let svc = Arc::new(ApprovalService::new(repo, notes));
  let id = svc.create_request(RequestKind::Achievement, "stu-1", json!({"title": "chess"})).expect("create");
  svc.approve(id, Role::Teacher, "prof garcia", None).expect("teacher approve");

  let mut handles = Vec::new();
  for name in ["dr lopez", "dr imposter"] {
    let svc = Arc::clone(&svc);
    handles.push(std::thread::spawn(move || svc.approve(id, Role::Hod, name, None)));
  }
  let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

  let wins = results.iter().filter(|r| r.is_ok()).count();
  assert_eq!(wins, 1);
  for r in &results {
    match r {
      Ok(req) => assert_eq!(req.current_approver_role(), Some(Role::Principal)),
      // the loser either hit the version guard or re-read too late
      Err(WorkflowError::ConcurrentModification(_)) | Err(WorkflowError::WrongApprover { .. }) => {}
      Err(other) => panic!("unexpected loser error: {:?}", other),
    }
  }
  assert_eq!(svc.get_request(&id).unwrap().history().len(), 2);
}

#[test]
fn create_validates_subject_and_payload() {
  let svc = service();
  match svc.create_request(RequestKind::Achievement, "  ", json!({"title": "x"})) {
    Err(WorkflowError::Domain(_)) => {}
    other => panic!("expected Domain error, got {:?}", other),
  }
  match svc.create_request(RequestKind::Achievement, "stu-1", json!("not an object")) {
    Err(WorkflowError::Domain(_)) => {}
    other => panic!("expected Domain error, got {:?}", other),
  }
}

#[test]
fn transition_on_missing_request_is_not_found() {
  let svc = service();
  match svc.approve(Uuid::new_v4(), Role::Teacher, "prof garcia", None) {
    Err(WorkflowError::Store(StoreError::NotFound(_))) => {}
    other => panic!("expected NotFound, got {:?}", other),
  }
}

// A notification store that always fails, to show the side effect is
// fire-and-forget.
struct BrokenNotificationRepository;

impl NotificationRepository for BrokenNotificationRepository {
  fn append(&self, _record: &NotificationRecord) -> Result<Uuid, StoreError> {
    Err(StoreError::Storage("notification store down".to_string()))
  }

  fn list_for_subject(&self, _subject_id: &str) -> Result<Vec<NotificationRecord>, StoreError> {
    Err(StoreError::Storage("notification store down".to_string()))
  }

  fn mark_read(&self, _notification_id: &Uuid) -> Result<(), StoreError> {
    Err(StoreError::Storage("notification store down".to_string()))
  }
}

#[test]
fn broken_notification_store_does_not_block_transitions() {
  let svc = ApprovalService::new(Arc::new(InMemoryRequestRepository::new()), Arc::new(BrokenNotificationRepository));
  let id = svc.create_request(RequestKind::Achievement, "stu-1", json!({"title": "chess"})).expect("create");
  let moved = svc.approve(id, Role::Teacher, "prof garcia", None).expect("approve despite broken notifier");
  assert_eq!(moved.current_approver_role(), Some(Role::Hod));
}

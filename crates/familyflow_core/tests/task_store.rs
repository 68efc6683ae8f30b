use chrono::NaiveDate;
use familyflow_core::db::open_db_in_memory;
use familyflow_core::repo::task_repo::{AssigneeGuard, ClaimWrite, TaskListQuery};
use familyflow_core::{
    Message, MessageRepository, MessageRole, RepoError, SqliteMessageRepository,
    SqliteTaskRepository, Task, TaskKind, TaskRepository, TaskStatus,
};
use uuid::Uuid;

fn assignable() -> Vec<String> {
    vec!["一般".to_string(), "買い物".to_string()]
}

fn task_at(group: &str, topic: &str, content: &str, created_at: i64) -> Task {
    let mut task = Task::new(group, TaskKind::Task, topic, content);
    task.created_at = created_at;
    task
}

#[test]
fn insert_and_get_roundtrip_keeps_due_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let mut task = Task::new("g1", TaskKind::Task, "京都旅行", "宿を予約する");
    task.due_date = NaiveDate::from_ymd_opt(2026, 11, 3);
    repo.insert_task(&task).unwrap();

    let loaded = repo.get_task(task.id).unwrap().unwrap();
    assert_eq!(loaded, task);
}

#[test]
fn insert_rejects_blank_content() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);

    let task = Task::new("g1", TaskKind::Task, "一般", "  ");
    assert!(matches!(
        repo.insert_task(&task),
        Err(RepoError::InvalidTask(_))
    ));
}

#[test]
fn status_write_only_applies_from_expected_status() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let task = Task::new("g1", TaskKind::Task, "一般", "洗剤を買う");
    repo.insert_task(&task).unwrap();

    let written = repo
        .update_status(task.id, TaskStatus::Pending, TaskStatus::Deleted)
        .unwrap()
        .unwrap();
    assert_eq!(written.id, task.id);
    assert_eq!(written.status, TaskStatus::Deleted);
    assert_eq!(written.content, "洗剤を買う");
    assert!(repo
        .update_status(task.id, TaskStatus::Pending, TaskStatus::Done)
        .unwrap()
        .is_none());
    assert!(repo
        .update_status(task.id, TaskStatus::Done, TaskStatus::Pending)
        .unwrap()
        .is_none());
    assert_eq!(
        repo.get_task(task.id).unwrap().unwrap().status,
        TaskStatus::Deleted
    );
}

#[test]
fn assignee_guards_hold_at_the_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let task = Task::new("g1", TaskKind::Task, "京都旅行", "宿を予約する");
    repo.insert_task(&task).unwrap();

    let picked = repo
        .update_assignee(task.id, AssigneeGuard::Unassigned, Some("母"))
        .unwrap()
        .unwrap();
    assert_eq!(picked.assignee.as_deref(), Some("母"));
    assert!(repo
        .update_assignee(task.id, AssigneeGuard::Unassigned, Some("父"))
        .unwrap()
        .is_none());
    assert!(repo
        .update_assignee(task.id, AssigneeGuard::HeldBy("父"), None)
        .unwrap()
        .is_none());
    let released = repo
        .update_assignee(task.id, AssigneeGuard::HeldBy("母"), None)
        .unwrap()
        .unwrap();
    assert_eq!(released.assignee, None);

    let loaded = repo.get_task(task.id).unwrap().unwrap();
    assert_eq!(loaded.assignee, None);
}

#[test]
fn claim_updates_only_the_latest_pending_task() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let older = task_at("g1", "買い物", "牛乳を買う", 1_000);
    let newer = task_at("g1", "一般", "卵を買う", 2_000);
    let other_group = task_at("g2", "一般", "米を買う", 3_000);
    for task in [&older, &newer, &other_group] {
        repo.insert_task(task).unwrap();
    }

    match repo.claim_latest("g1", "母", &assignable()).unwrap() {
        ClaimWrite::Claimed(task) => {
            assert_eq!(task.id, newer.id);
            assert_eq!(task.assignee.as_deref(), Some("母"));
        }
        other => panic!("unexpected claim result: {other:?}"),
    }
    assert_eq!(repo.get_task(older.id).unwrap().unwrap().assignee, None);
    assert_eq!(repo.get_task(other_group.id).unwrap().unwrap().assignee, None);
}

#[test]
fn claim_on_project_topic_is_ineligible_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let routine = task_at("g1", "一般", "卵を買う", 1_000);
    let project = task_at("g1", "京都旅行", "宿を予約する", 2_000);
    repo.insert_task(&routine).unwrap();
    repo.insert_task(&project).unwrap();

    match repo.claim_latest("g1", "母", &assignable()).unwrap() {
        ClaimWrite::Ineligible(task) => assert_eq!(task.id, project.id),
        other => panic!("unexpected claim result: {other:?}"),
    }
    // The older routine task is not claimed as a fallback.
    assert_eq!(repo.get_task(routine.id).unwrap().unwrap().assignee, None);
    assert_eq!(repo.get_task(project.id).unwrap().unwrap().assignee, None);
}

#[test]
fn claim_skips_finished_tasks_and_reports_empty_group() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let done = task_at("g1", "一般", "卵を買う", 1_000);
    repo.insert_task(&done).unwrap();
    repo.update_status(done.id, TaskStatus::Pending, TaskStatus::Done)
        .unwrap();

    assert_eq!(
        repo.claim_latest("g1", "母", &assignable()).unwrap(),
        ClaimWrite::NoPendingTask
    );
    assert_eq!(
        repo.claim_latest("empty", "母", &assignable()).unwrap(),
        ClaimWrite::NoPendingTask
    );
}

#[test]
fn claim_on_same_millisecond_prefers_later_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let first = task_at("g1", "一般", "卵を買う", 5_000);
    let second = task_at("g1", "一般", "牛乳を買う", 5_000);
    repo.insert_task(&first).unwrap();
    repo.insert_task(&second).unwrap();

    match repo.claim_latest("g1", "父", &assignable()).unwrap() {
        ClaimWrite::Claimed(task) => assert_eq!(task.id, second.id),
        other => panic!("unexpected claim result: {other:?}"),
    }
}

#[test]
fn hard_delete_respects_removable_statuses() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let task = Task::new("g1", TaskKind::Task, "一般", "卵を買う");
    repo.insert_task(&task).unwrap();

    let removable = [TaskStatus::Done, TaskStatus::Deleted];
    assert!(!repo.delete_task(task.id, &removable).unwrap());
    repo.update_status(task.id, TaskStatus::Pending, TaskStatus::Done)
        .unwrap();
    assert!(repo.delete_task(task.id, &removable).unwrap());
    assert!(repo.get_task(task.id).unwrap().is_none());
    assert!(!repo.delete_task(Uuid::new_v4(), &removable).unwrap());
}

#[test]
fn distinct_topics_cover_pending_tasks_most_recent_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    let trip_old = task_at("g1", "京都旅行", "日程を決める", 1_000);
    let errand = task_at("g1", "一般", "卵を買う", 2_000);
    let trip_new = task_at("g1", "京都旅行", "宿を予約する", 3_000);
    let finished = task_at("g1", "誕生日会", "ケーキを予約する", 4_000);
    for task in [&trip_old, &errand, &trip_new, &finished] {
        repo.insert_task(task).unwrap();
    }
    repo.update_status(finished.id, TaskStatus::Pending, TaskStatus::Done)
        .unwrap();

    assert_eq!(
        repo.list_distinct_topics("g1").unwrap(),
        vec!["京都旅行".to_string(), "一般".to_string()]
    );
}

#[test]
fn list_tasks_filters_by_status_and_limit() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTaskRepository::new(&conn);
    for (index, content) in ["a", "b", "c"].iter().enumerate() {
        let task = task_at("g1", "一般", content, 1_000 + index as i64);
        repo.insert_task(&task).unwrap();
        repo.update_status(task.id, TaskStatus::Pending, TaskStatus::Done)
            .unwrap();
    }
    repo.insert_task(&task_at("g1", "一般", "d", 9_000)).unwrap();

    let done = repo
        .list_tasks(&TaskListQuery {
            group_id: "g1".to_string(),
            status: Some(TaskStatus::Done),
            limit: Some(2),
        })
        .unwrap();
    let contents = done.iter().map(|task| task.content.as_str()).collect::<Vec<_>>();
    assert_eq!(contents, vec!["c", "b"]);
}

#[test]
fn message_log_returns_recent_window_oldest_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMessageRepository::new(&conn);
    for (index, text) in ["一", "二", "三", "四"].iter().enumerate() {
        let mut message = Message::new("g1", "母", *text, MessageRole::Human);
        message.created_at = 1_000 + index as i64;
        repo.append_message(&message).unwrap();
    }
    repo.append_message(&Message::new("g2", "父", "別", MessageRole::Human))
        .unwrap();

    let recent = repo.list_recent("g1", 3).unwrap();
    let contents = recent
        .iter()
        .map(|message| message.content.as_str())
        .collect::<Vec<_>>();
    assert_eq!(contents, vec!["二", "三", "四"]);
    assert!(repo.list_recent("g1", 0).unwrap().is_empty());
}

#[test]
fn message_log_rejects_blank_speaker() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteMessageRepository::new(&conn);
    let message = Message::new("g1", " ", "hello", MessageRole::Human);
    assert!(matches!(
        repo.append_message(&message),
        Err(RepoError::InvalidMessage(_))
    ));
}

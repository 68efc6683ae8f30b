//! Chat reply texts.

pub fn task_registered(summary: &str, topic: &str) -> String {
    format!("✅ 登録: {summary}\n(案件: {topic})")
}

pub fn idea_noted(summary: &str, topic: &str) -> String {
    format!("💡 メモ: {summary} (案件: {topic})")
}

pub fn claim_confirmed(assignee: &str, content: &str) -> String {
    format!("🙆‍♀️ {assignee}さんにアサインしました！\n担当: {content}")
}

pub fn task_completed(content: &str) -> String {
    format!("🎉 完了: {content}")
}

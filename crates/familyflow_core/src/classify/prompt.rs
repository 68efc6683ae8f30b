//! Prompt rendering for the contextual classifier.

use super::ClassificationRequest;
use crate::model::message::MessageRole;
use std::fmt::Write;

const DATE_FORMAT: &str = "%Y-%m-%d";

const TOPIC_RULES: &str = "\
### Topic rules
1. If one of the active topics above matches this conversation, copy it exactly, character for character. Never rephrase it (active topic `京都旅行` + \"宿どうする？\" -> topic `京都旅行`, not `京都の宿`).
2. Only when no active topic applies, create a new concrete label for an event, project or outing (e.g. `お父さんの誕生日会`, `新潟旅行`).
3. Abstract category words such as `旅行` or `食事` are forbidden as topics.";

const SUMMARY_RULES: &str = "\
### Summary rules
1. Write an imperative, actionable phrase that ends in a verb (`京都旅行の日程を決める`, `宿を予約する`).
2. Never describe the conversation (`日程について話している` is wrong).";

const CATEGORY_RULES: &str = "\
### Categories
- \"task\": a concrete action, purchase, booking or lookup. Do not choose an assignee.
- \"idea\": a proposal or open consideration with no firm commitment. Summary still ends in a verb (`〜を考える`).
- \"accept\": the speaker takes on the task or proposal raised just before (\"I'll do it\").
- null: acknowledgement, small talk, a completion report, or plain agreement.";

const OUTPUT_FORMAT: &str = "\
### Output (JSON only)
{\"category\": \"task\" | \"idea\" | \"accept\" | null, \"topic\": \"<topic>\", \"summary\": \"<short phrase ending in a verb>\", \"due_date\": \"YYYY-MM-DD\" | null}";

/// Renders the full prompt for one request.
pub fn build_prompt(request: &ClassificationRequest<'_>) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "You extract things to do from a family group chat. Read the conversation and \
         return the category and a concrete task name for the latest message.\n\n",
    );

    let _ = writeln!(prompt, "### Today\n{}\n", request.today.format(DATE_FORMAT));

    prompt.push_str("### Active topics (reuse verbatim)\n");
    if request.active_topics.is_empty() {
        prompt.push_str("(none)\n");
    } else {
        for topic in request.active_topics {
            let _ = writeln!(prompt, "- {topic}");
        }
    }
    prompt.push('\n');

    prompt.push_str(TOPIC_RULES);
    prompt.push_str("\n\n");
    prompt.push_str(SUMMARY_RULES);
    prompt.push_str("\n\n");

    prompt.push_str("### Recent conversation\n");
    for message in request.history {
        let label = match message.role {
            MessageRole::Human => "Family",
            MessageRole::System => "Bot",
        };
        let _ = writeln!(prompt, "- {label}: {}", message.content);
    }
    prompt.push('\n');

    prompt.push_str(CATEGORY_RULES);
    prompt.push_str("\n\n");
    prompt.push_str(OUTPUT_FORMAT);
    let _ = write!(prompt, "\n\nLatest message: {}", request.text);
    prompt
}

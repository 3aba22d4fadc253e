//! Block Kit encoding of a queue display

use lineup_core::domain::{DisplayDocument, QueueAction};
use serde_json::{json, Value};

/// Encode a document as Slack blocks. Member lines, annotation and hint are
/// mrkdwn; actions become buttons whose `action_id` the dispatch layer gets back.
pub fn to_blocks(document: &DisplayDocument) -> Value {
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": { "type": "plain_text", "text": document.title, "emoji": true }
        }),
        json!({
            "type": "section",
            "text": { "type": "mrkdwn", "text": document.lines.join("\n") }
        }),
    ];

    if let Some(note) = &document.annotation {
        blocks.push(json!({
            "type": "context",
            "elements": [{ "type": "mrkdwn", "text": note }]
        }));
    }

    blocks.push(json!({
        "type": "context",
        "elements": [{ "type": "mrkdwn", "text": document.hint }]
    }));

    let buttons: Vec<Value> = document.actions.iter().map(button).collect();
    blocks.push(json!({
        "type": "actions",
        "block_id": "lineup_actions",
        "elements": buttons
    }));

    Value::Array(blocks)
}

fn button(action: &QueueAction) -> Value {
    let mut button = json!({
        "type": "button",
        "text": { "type": "plain_text", "text": action.label() },
        "action_id": action.action_id(),
        "value": action.action_id()
    });
    match action {
        QueueAction::Join => button["style"] = json!("primary"),
        QueueAction::Delete => {
            button["style"] = json!("danger");
            button["confirm"] = json!({
                "title": { "type": "plain_text", "text": "Delete this queue?" },
                "text": { "type": "plain_text", "text": "Everyone in line will be removed." },
                "confirm": { "type": "plain_text", "text": "Delete" },
                "deny": { "type": "plain_text", "text": "Cancel" }
            });
        }
        QueueAction::Leave | QueueAction::Refresh => {}
    }
    button
}

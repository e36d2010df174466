use crate::models::chat::{ ChatMessage, ConversationRequest };

pub const ROLE_STATEMENT: &str =
    "You are a helpful AI assistant embedded on a website. Answer the visitor's questions clearly and concisely.";

pub const ASSISTANT_CUE: &str = "ASSISTANT:";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Role statement, then host context, then response language. Absent or
/// blank entries produce no line at all.
pub fn get_system_instruction(context: Option<&str>, lang: Option<&str>) -> String {
    let lines = [
        Some(ROLE_STATEMENT.to_string()),
        non_blank(context).map(|c| format!("Context from host site: {}", c)),
        non_blank(lang).map(|l| format!("Respond in language code: {}", l)),
    ];

    lines.into_iter().flatten().collect::<Vec<_>>().join("\n")
}

pub fn format_conversation(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str().to_uppercase(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn get_relay_prompt(request: &ConversationRequest) -> String {
    let system = get_system_instruction(request.context.as_deref(), request.lang.as_deref());
    let conversation = format_conversation(&request.messages);

    if conversation.is_empty() {
        format!("{}\n\n{}", system, ASSISTANT_CUE)
    } else {
        format!("{}\n\n{}\n\n{}", system, conversation, ASSISTANT_CUE)
    }
}

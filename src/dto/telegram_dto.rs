use serde::{Deserialize, Serialize};

// Update recibido por getUpdates o por el webhook
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

impl Update {
    /// (chat, remitente, texto) si el update trae un mensaje de texto
    pub fn text_message(&self) -> Option<(i64, Option<i64>, &str)> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref()?;
        Some((message.chat.id, message.from.as_ref().map(|u| u.id), text))
    }
}

// Request de sendMessage
#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
}

// Request de getUpdates
#[derive(Debug, Serialize)]
pub struct GetUpdatesRequest {
    pub offset: Option<i64>,
    pub timeout: u64,
    pub allowed_updates: Vec<String>,
}

// Envoltorio de todas las respuestas de la Bot API
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

// Response de /health
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: String,
    pub sessions: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_with_text() {
        let json = r#"{
            "update_id": 10,
            "message": {
                "message_id": 3,
                "chat": {"id": -100, "type": "group"},
                "from": {"id": 42, "is_bot": false, "first_name": "Ahmad"},
                "date": 1733385600,
                "text": "/ping"
            }
        }"#;

        let update: Update = serde_json::from_str(json).unwrap();
        assert_eq!(update.text_message(), Some((-100, Some(42), "/ping")));
    }

    #[test]
    fn test_update_without_text_is_skipped() {
        let json = r#"{"update_id": 11, "message": {"message_id": 4, "chat": {"id": 1}}}"#;
        let update: Update = serde_json::from_str(json).unwrap();
        assert_eq!(update.text_message(), None);

        let update: Update = serde_json::from_str(r#"{"update_id": 12}"#).unwrap();
        assert!(update.message.is_none());
    }
}

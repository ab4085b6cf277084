use whatsapp_cloud_rs::Client;
use wiremock::MockServer;

// --- CONSTANTS ---
#[allow(dead_code)]
pub const PHONE_ID: &str = "phone_id_222";
#[allow(dead_code)]
pub const ACCESS_TOKEN: &str = "EAAD...";
#[allow(dead_code)]
pub const RECIPIENT_ID: &str = "16505551234";
#[allow(dead_code)]
pub const API_VERSION: &str = "v23.0";

// --- TEST SETUP ---

/// A client pointed at `mock_server` instead of the Graph API.
#[allow(dead_code)]
pub fn client(mock_server: &MockServer) -> Client {
    Client::builder()
        .api_version("23.0")
        .base_url(mock_server.uri())
        .build(ACCESS_TOKEN)
        .unwrap()
}

#[allow(dead_code)]
pub fn messages_path() -> String {
    format!("/{}/{}/messages", API_VERSION, PHONE_ID)
}

#[allow(dead_code)]
pub fn sent(message_id: &str) -> serde_json::Value {
    serde_json::json!({
        "messaging_product": "whatsapp",
        "contacts": [{"input": RECIPIENT_ID, "wa_id": RECIPIENT_ID}],
        "messages": [{"id": message_id}]
    })
}

use axum::Json;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedUserId {
    pub user_id: String,
}

/// `user_{epochMillis}_{9 base-36 chars}`. Anonymous; nothing is stored.
pub fn generate_user_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("user_{}_{suffix}", Utc::now().timestamp_millis())
}

/// POST /api/users/generate-id
pub async fn handle_generate_id() -> Json<GeneratedUserId> {
    Json(GeneratedUserId {
        user_id: generate_user_id(),
    })
}

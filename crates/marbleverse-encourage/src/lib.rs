mod engine;
mod pools;
mod prompt;

pub use pools::{fallback_message, pick_pool_message};

use marbleverse_core::{ai_configured, AiSettings, TonePreference};

/// Produce the celebration line for a crossed milestone.
///
/// With a configured AI provider the line is generated with the fixed style
/// prompt; a failed or empty generation falls back to the deterministic
/// template. Without a provider the hand-written tone pools are used. Either
/// way the caller always gets a message; a celebration never errors out.
pub async fn encouragement(count: u32, tone: TonePreference, settings: &AiSettings) -> String {
    if !ai_configured(settings) {
        return pools::pick_pool_message(count, tone, &mut rand::rng());
    }

    let system = prompt::system_prompt();
    let user_msg = prompt::user_message(count, tone);

    match engine::generate(settings, &system, &user_msg).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            log::warn!("encouragement generation failed: {e}");
            pools::fallback_message(count)
        }
    }
}

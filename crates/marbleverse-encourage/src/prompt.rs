use marbleverse_core::TonePreference;

fn tone_name(tone: TonePreference) -> &'static str {
    match tone {
        TonePreference::Zen => "Zen",
        TonePreference::Poetic => "Poetic",
        TonePreference::Grounded => "Grounded",
    }
}

/// Fixed style prompt for milestone copy. The rules matter more than the
/// model: without them every provider drifts into award-plaque prose.
pub fn system_prompt() -> String {
    "You write one-line celebration messages for Marbleverse, an app where the \
user adds a marble to a jar for small wins (self-care, rest, being kind).\n\n\
CRITICAL TONE RULES:\n\
- NO museum labels. NO luxury brand copy. NO formal cadence.\n\
- NO \"resting in a quiet glow\" or \"testament to presence.\"\n\
- DO NOT use grand metaphors.\n\
- DO use shorter, human sentences.\n\
- DO feel like a quiet smile or a friendly nod, not a seal of approval.\n\
- Slightly imperfect phrasing is good.\n\
- Speak TO the user, not ABOUT the marbles.\n\n\
TONE VARIATIONS:\n\
- Zen: Casual, minimal, peaceful.\n\
- Poetic: Warm, slightly whimsical, very short.\n\
- Grounded: Real, authentic, like a friend talking.\n\n\
Output: Only the message text. No quotes."
        .to_string()
}

pub fn user_message(count: u32, tone: TonePreference) -> String {
    format!(
        "Current milestone: the user just reached {count} marbles.\n\
Requested tone style: {}\n\n\
Examples of direction:\n\
- \"{count} moments. All yours.\"\n\
- \"Look at that. {count}.\"\n\
- \"That adds up, doesn't it?\"\n\
- \"These mattered.\"\n\
- \"You showed up again. Nice.\"\n\
- \"That's a lot of care, actually.\"",
        tone_name(tone)
    )
}

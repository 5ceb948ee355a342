use marbleverse_core::{
    AppState, JarTheme, Marble, MarbleSize, Position, TonePreference, TrackedDate,
};

fn full_marble() -> Marble {
    Marble {
        id: "marble-1".to_string(),
        timestamp: 1_700_000_000_000,
        note: Some("walked it off".to_string()),
        color: "#4ECDC4".to_string(),
        position: Position { x: 42.5, y: 13.0 },
        is_honoring: Some(true),
        category: Some("move".to_string()),
        label: Some("MOVE".to_string()),
        size: Some(MarbleSize::Xl),
        is_milestone: Some(true),
    }
}

fn bare_marble() -> Marble {
    Marble {
        id: "marble-2".to_string(),
        timestamp: 1_700_000_060_000,
        note: None,
        color: "#FFD700".to_string(),
        position: Position { x: 20.0, y: 6.0 },
        is_honoring: None,
        category: None,
        label: None,
        size: None,
        is_milestone: None,
    }
}

#[test]
fn state_roundtrips_through_json() {
    let state = AppState {
        marbles: vec![full_marble(), bare_marble()],
        tone: TonePreference::Poetic,
        theme: JarTheme::Midnight,
        last_check_in: Some(1_700_000_060_000),
        milestones_reached: vec![7, 13],
        sound_enabled: false,
        ambient_enabled: true,
        tracked_dates: vec![TrackedDate { name: "quit".to_string(), start_date: 1_690_000_000_000 }],
        onboarding_complete: true,
    };

    let json = serde_json::to_string_pretty(&state).expect("state should serialize");
    let back: AppState = serde_json::from_str(&json).expect("state should deserialize");
    assert_eq!(back, state);
}

#[test]
fn field_names_match_the_web_client() {
    let state = AppState { marbles: vec![full_marble()], ..AppState::default() };
    let json = serde_json::to_string(&state).expect("state should serialize");

    for key in [
        "\"marbles\"",
        "\"tone\":\"Zen\"",
        "\"theme\":\"Classic\"",
        "\"lastCheckIn\"",
        "\"milestonesReached\"",
        "\"soundEnabled\"",
        "\"isHonoring\"",
        "\"isMilestone\"",
        "\"size\":\"xl\"",
    ] {
        assert!(json.contains(key), "missing {key} in {json}");
    }
}

#[test]
fn optional_marble_fields_are_omitted_when_absent() {
    let json = serde_json::to_string(&bare_marble()).expect("marble should serialize");
    for key in ["note", "isHonoring", "category", "label", "size", "isMilestone"] {
        assert!(!json.contains(key), "unexpected {key} in {json}");
    }
}

#[test]
fn documents_from_older_revisions_still_parse() {
    // No trackedDates / onboardingComplete / ambientEnabled: the shape the
    // first web revision wrote.
    let legacy = r#"{
        "marbles": [],
        "tone": "Grounded",
        "theme": "Ceramic",
        "lastCheckIn": null,
        "milestonesReached": [7],
        "soundEnabled": true
    }"#;

    let state: AppState = serde_json::from_str(legacy).expect("legacy document should parse");
    assert_eq!(state.tone, TonePreference::Grounded);
    assert_eq!(state.theme, JarTheme::Ceramic);
    assert_eq!(state.milestones_reached, vec![7]);
    assert!(state.tracked_dates.is_empty());
    assert!(!state.ambient_enabled);
    assert!(!state.onboarding_complete);
}

#[test]
fn empty_document_falls_back_to_defaults() {
    let state: AppState = serde_json::from_str("{}").expect("empty object should parse");
    assert!(state.marbles.is_empty());
    assert_eq!(state.tone, TonePreference::Zen);
    assert_eq!(state.theme, JarTheme::Classic);
    assert!(state.sound_enabled);
    assert!(state.last_check_in.is_none());
}

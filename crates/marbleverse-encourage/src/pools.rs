//! Hand-written message pools, one per tone per milestone, carried over from
//! the web client's encouragement tables.

use marbleverse_core::TonePreference;
use rand::Rng;

type Pool = (u32, &'static [&'static str]);

const ZEN: &[Pool] = &[
    (7, &["Seven. A week of showing up.", "One week. You're here.", "Seven moments. All yours."]),
    (13, &["Thirteen. Lucky you showed up.", "13 gathered. Keep going.", "A baker's dozen of grace."]),
    (30, &["A whole month of noticing.", "30. That's not nothing.", "Month one. You made it."]),
    (60, &["Two months of small wins.", "60. Look at that.", "Sixty moments of care."]),
    (90, &["90 days. A season of you.", "Quarter year. Still here.", "90. That matters."]),
    (100, &["Triple digits. Wow.", "100. You built this.", "A hundred tiny yeses."]),
    (365, &["A year. A whole year.", "365. You stayed.", "One year of showing up for yourself."]),
];

const POETIC: &[Pool] = &[
    (7, &["Seven stars in your pocket now.", "A week woven, thread by thread.", "Seven seeds, already growing."]),
    (13, &["Thirteen whispers of 'I can.'", "A constellation forming.", "Lucky thirteen, indeed."]),
    (30, &["A moon cycle of kindness to yourself.", "Thirty sunrises you claimed.", "One month, painted in small victories."]),
    (60, &["Sixty pearls on a string of days.", "Two moons of gathering light.", "The jar fills like a poem."]),
    (90, &["A season inscribed in glass.", "Ninety chapters of your story.", "Spring, summer, or fall — you bloomed."]),
    (100, &["A century of small revolutions.", "One hundred acts of quiet courage.", "The hundredth marble catches all the light."]),
    (365, &["A year held in your hands.", "365 days of choosing yourself.", "The jar overflows with a year of you."]),
];

const GROUNDED: &[Pool] = &[
    (7, &["Week one done. Not bad.", "Seven. You actually did it.", "That's a week. Real progress."]),
    (13, &["13 in the jar. Solid.", "You're building something here.", "Thirteen wins. Keep stacking."]),
    (30, &["A month. That's discipline.", "30 days of showing up. Respect.", "Month one complete. Nice work."]),
    (60, &["Two months strong.", "60. You're not messing around.", "Halfway to 90. Keep going."]),
    (90, &["90 days. That's a habit now.", "Three months of work. It shows.", "90. You earned every one."]),
    (100, &["100. That's a real number.", "Triple digits. You built this.", "A hundred wins. Own that."]),
    (365, &["365. A whole damn year.", "You did this for a year. Incredible.", "One year. You showed up 365 times."]),
];

fn pools_for(tone: TonePreference) -> &'static [Pool] {
    match tone {
        TonePreference::Zen => ZEN,
        TonePreference::Poetic => POETIC,
        TonePreference::Grounded => GROUNDED,
    }
}

/// Pick a pool message for a crossed threshold: the exact pool when the
/// catalog knows the count, otherwise the largest one (long-running jars).
pub fn pick_pool_message(count: u32, tone: TonePreference, rng: &mut impl Rng) -> String {
    let pools = pools_for(tone);
    match pools.iter().find(|(m, _)| *m == count).or_else(|| pools.last()) {
        Some((_, messages)) => messages[rng.random_range(0..messages.len())].to_string(),
        None => fallback_message(count),
    }
}

/// Fixed template shown when generation fails. Shown verbatim.
pub fn fallback_message(count: u32) -> String {
    format!("{count} marbles. You're doing it.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use marbleverse_core::MILESTONES;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn every_tone_covers_the_whole_catalog() {
        for tone in [TonePreference::Zen, TonePreference::Poetic, TonePreference::Grounded] {
            let pools = pools_for(tone);
            for m in MILESTONES {
                let pool = pools.iter().find(|(t, _)| *t == m);
                assert!(pool.is_some(), "{tone:?} missing pool for {m}");
                assert!(!pool.unwrap().1.is_empty());
            }
        }
    }

    #[test]
    fn exact_threshold_draws_from_its_own_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let msg = pick_pool_message(7, TonePreference::Grounded, &mut rng);
            assert!(GROUNDED[0].1.contains(&msg.as_str()), "unexpected message: {msg}");
        }
    }

    #[test]
    fn unknown_count_falls_back_to_the_largest_pool() {
        let mut rng = StdRng::seed_from_u64(2);
        let msg = pick_pool_message(500, TonePreference::Zen, &mut rng);
        assert!(ZEN.last().unwrap().1.contains(&msg.as_str()), "unexpected message: {msg}");
    }

    #[test]
    fn fallback_template_is_exact() {
        assert_eq!(fallback_message(7), "7 marbles. You're doing it.");
        assert_eq!(fallback_message(100), "100 marbles. You're doing it.");
    }
}

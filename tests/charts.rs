//! Integration tests for the mingpan chart engines.
//!
//! Uses a fixture calendar provider so no real lunar-calendar library is
//! needed; the engines only ever see pre-resolved stem/branch data.

use mingpan::prelude::*;
use proptest::prelude::*;

// ============================================================
// Fixture calendar provider
// ============================================================

/// Deterministic stub standing in for the external lunar calendar service.
///
/// Returns the reference scenario for 1990-05-15: pillars
/// 甲午 / 辛巳 / 乙丑 / 壬巳 and a 10-entry Da-Yun sequence.
struct FixtureCalendar;

impl LunarCalendarProvider for FixtureCalendar {
    fn resolve(&self, _input: &BirthInput) -> Result<ResolvedBirth> {
        Ok(ResolvedBirth {
            lunar_year: 1990,
            lunar_month: 4,
            lunar_day: 21,
            is_leap_month: false,
            ganzhi: GanZhi {
                year: Pillar::new('甲', '午'),
                month: Pillar::new('辛', '巳'),
                day: Pillar::new('乙', '丑'),
                hour: Pillar::new('壬', '巳'),
            },
        })
    }

    fn da_yun(&self, _input: &BirthInput, gender: Gender) -> Result<Vec<DaYunEntry>> {
        // Direction reversal happens upstream; the stub only varies the
        // starting age by gender to make the dependency observable.
        let first_age = match gender {
            Gender::Male => 3,
            Gender::Female => 7,
        };
        let cycles = [
            "庚辰", "己卯", "戊寅", "丁丑", "丙子", "乙亥", "甲戌", "癸酉", "壬申", "辛未",
        ];
        Ok(cycles
            .iter()
            .enumerate()
            .map(|(i, gz)| DaYunEntry {
                start_age: first_age + (i as u8) * 10,
                end_age: first_age + 9 + (i as u8) * 10,
                start_year: Some(1990 + first_age as i32 + (i as i32) * 10),
                end_year: Some(1999 + first_age as i32 + (i as i32) * 10),
                gan_zhi: gz.to_string(),
            })
            .collect())
    }
}

/// Provider that always fails, for error propagation tests
struct BrokenCalendar;

impl LunarCalendarProvider for BrokenCalendar {
    fn resolve(&self, _input: &BirthInput) -> Result<ResolvedBirth> {
        Err(ChartError::Provider("calendar service unavailable".into()))
    }

    fn da_yun(&self, _input: &BirthInput, _gender: Gender) -> Result<Vec<DaYunEntry>> {
        Err(ChartError::Provider("calendar service unavailable".into()))
    }
}

fn reference_input() -> BirthInput {
    BirthInput {
        year: 1990,
        month: 5,
        day: 15,
        hour: 10,
        gender: Gender::Male,
    }
}

// ============================================================
// End-to-end scenarios
// ============================================================

#[test]
fn test_end_to_end_four_pillars() {
    let engine = ChartEngine::new(FixtureCalendar);
    let result = engine.four_pillars(&reference_input()).unwrap();

    // Day Master 乙: Wood, Yin
    let day_master = result.day_master.unwrap();
    assert_eq!(day_master.as_char(), '乙');
    assert_eq!(day_master.element(), Element::Wood);
    assert_eq!(day_master.polarity(), Polarity::Yin);

    // Stems 甲 and 乙 alone guarantee Wood >= 2
    assert!(result.element_tally.count(Element::Wood) >= 2);
    assert_eq!(result.element_tally.total(), 8);

    // 10 Da-Yun entries -> 8 luck cycles, entry 0 excluded
    assert_eq!(result.luck_cycles.len(), 8);
    assert_eq!(result.luck_cycles[0].age_range, "13-22");
    assert_eq!(result.luck_cycles[0].stem, '己');
    assert_eq!(result.luck_cycles[0].branch, '卯');
}

#[test]
fn test_end_to_end_ziwei() {
    let engine = ChartEngine::new(FixtureCalendar);
    let chart = engine.ziwei_chart(&reference_input()).unwrap();

    // lunar month 4 (index 3), hour 10 (shichen 5)
    assert_eq!(chart.ming_index, (3 + 12 - 5) % 12);
    assert_eq!(chart.shen_index, (3 + 5) % 12);
    assert_eq!(chart.slots.len(), 12);
    assert_eq!(chart.lunar_month, 4);
    assert_eq!(chart.lunar_day, 21);

    // Year stem 甲 drives the Sihua overlay
    assert_eq!(chart.transformations.len(), 4);
    let lu = chart
        .transformations
        .iter()
        .find(|t| t.sihua == Sihua::Lu)
        .unwrap();
    assert_eq!(lu.star, Star::LianZhen);
}

#[test]
fn test_gender_flows_to_da_yun() {
    let engine = ChartEngine::new(FixtureCalendar);

    let male = engine.four_pillars(&reference_input()).unwrap();
    let female = engine
        .four_pillars(&BirthInput {
            gender: Gender::Female,
            ..reference_input()
        })
        .unwrap();

    assert_eq!(male.luck_cycles[0].age_range, "13-22");
    assert_eq!(female.luck_cycles[0].age_range, "17-26");
}

#[test]
fn test_input_validation_precedes_provider() {
    // Out-of-range input is rejected before the provider is consulted,
    // so even the broken provider never reports its own error here.
    let engine = ChartEngine::new(BrokenCalendar);
    let bad = BirthInput {
        hour: 24,
        ..reference_input()
    };
    assert!(matches!(
        engine.four_pillars(&bad),
        Err(ChartError::OutOfRange { field: "hour", .. })
    ));
    assert!(matches!(
        engine.ziwei_chart(&bad),
        Err(ChartError::OutOfRange { field: "hour", .. })
    ));
}

#[test]
fn test_provider_errors_propagate() {
    let engine = ChartEngine::new(BrokenCalendar);
    assert!(matches!(
        engine.four_pillars(&reference_input()),
        Err(ChartError::Provider(_))
    ));
    assert!(matches!(
        engine.ziwei_chart(&reference_input()),
        Err(ChartError::Provider(_))
    ));
}

#[test]
fn test_parallel_batch() {
    let engine = ChartEngine::new(FixtureCalendar);
    let inputs: Vec<BirthInput> = (0..16)
        .map(|i| BirthInput {
            year: 1980 + i,
            month: 5,
            day: 15,
            hour: (i as u8) % 24,
            gender: if i % 2 == 0 { Gender::Male } else { Gender::Female },
        })
        .collect();

    let (bundles, failures) = compute_parallel(&engine, &inputs);
    assert_eq!(bundles.len(), 16);
    assert!(failures.is_empty());

    for bundle in &bundles {
        assert_eq!(bundle.four_pillars.element_tally.total(), 8);
        assert_eq!(bundle.ziwei.slots.len(), 12);
    }
}

#[test]
fn test_parallel_batch_collects_failures() {
    let engine = ChartEngine::new(FixtureCalendar);
    let inputs = vec![
        reference_input(),
        BirthInput {
            month: 13,
            ..reference_input()
        },
    ];

    let (bundles, failures) = compute_parallel(&engine, &inputs);
    assert_eq!(bundles.len(), 1);
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0].error,
        ChartError::OutOfRange { field: "month", .. }
    ));
}

// ============================================================
// Caching/determinism contract
// ============================================================

#[test]
fn test_results_are_byte_identical_across_runs() {
    let engine = ChartEngine::new(FixtureCalendar);
    let input = reference_input();

    let fp_a = serde_json::to_string(&engine.four_pillars(&input).unwrap()).unwrap();
    let fp_b = serde_json::to_string(&engine.four_pillars(&input).unwrap()).unwrap();
    assert_eq!(fp_a, fp_b);

    let zw_a = serde_json::to_string(&engine.ziwei_chart(&input).unwrap()).unwrap();
    let zw_b = serde_json::to_string(&engine.ziwei_chart(&input).unwrap()).unwrap();
    assert_eq!(zw_a, zw_b);
}

#[test]
fn test_json_shape() {
    let engine = ChartEngine::new(FixtureCalendar);
    let chart = engine.ziwei_chart(&reference_input()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&serde_json::to_string(&chart).unwrap()).unwrap();

    assert_eq!(json["slots"].as_array().unwrap().len(), 12);
    assert_eq!(json["slots"][0]["branch"], "子");
    assert!(json["slots"][0]["palace"].is_string());

    // StarRef serializes key/display/cn names plus transform tags
    let with_star = json["slots"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| !s["major_stars"].as_array().unwrap().is_empty())
        .unwrap();
    let star = &with_star["major_stars"][0];
    assert!(star["key"].is_string());
    assert!(star["display_name"].is_string());
    assert!(star["cn_name"].is_string());
    assert!(star["transforms"].is_array());

    // Flattened transformation entries carry type/star_key/star_name
    let hit = &json["transformations"][0];
    assert!(hit["type"].is_string());
    assert!(hit["star_key"].is_string());
    assert!(hit["star_name"].is_string());
}

// ============================================================
// Property tests
// ============================================================

const STEM_CHARS: [char; 10] = ['甲', '乙', '丙', '丁', '戊', '己', '庚', '辛', '壬', '癸'];
const BRANCH_CHARS: [char; 12] = [
    '子', '丑', '寅', '卯', '辰', '巳', '午', '未', '申', '酉', '戌', '亥',
];

fn arb_pillar() -> impl Strategy<Value = Pillar> {
    (0usize..10, 0usize..12).prop_map(|(s, b)| Pillar::new(STEM_CHARS[s], BRANCH_CHARS[b]))
}

fn arb_ganzhi() -> impl Strategy<Value = GanZhi> {
    (arb_pillar(), arb_pillar(), arb_pillar(), arb_pillar()).prop_map(
        |(year, month, day, hour)| GanZhi {
            year,
            month,
            day,
            hour,
        },
    )
}

fn arb_lunar_profile() -> impl Strategy<Value = LunarProfile> {
    (1u8..=12, 1u8..=30, 0u8..=23, arb_ganzhi(), any::<bool>()).prop_map(
        |(lunar_month, lunar_day, birth_hour, ganzhi, is_leap_month)| LunarProfile {
            lunar_year: 2000,
            lunar_month,
            lunar_day,
            is_leap_month,
            birth_hour,
            ganzhi,
        },
    )
}

proptest! {
    #[test]
    fn prop_element_tally_conservation(ganzhi in arb_ganzhi()) {
        let profile = BirthProfile { ganzhi, gender: Gender::Male };
        let result = compute_four_pillars(&profile, &[]);

        // All characters drawn from the known sets: exactly 8 counted
        prop_assert_eq!(result.element_tally.total(), 8);

        let pct_sum: u32 = Element::CYCLE
            .iter()
            .map(|&e| result.element_tally.percentage(e) as u32)
            .sum();
        prop_assert!((97..=103).contains(&pct_sum));
    }

    #[test]
    fn prop_ten_god_scan_total(ganzhi in arb_ganzhi()) {
        let profile = BirthProfile { ganzhi, gender: Gender::Female };
        let result = compute_four_pillars(&profile, &[]);
        // 7 eligible slots x weight 10, all recognized
        prop_assert_eq!(result.ten_god_strengths.total(), 70);
    }

    #[test]
    fn prop_four_pillars_deterministic(ganzhi in arb_ganzhi()) {
        let profile = BirthProfile { ganzhi, gender: Gender::Male };
        let a = compute_four_pillars(&profile, &[]);
        let b = compute_four_pillars(&profile, &[]);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_palace_completeness(profile in arb_lunar_profile()) {
        let chart = compute_ziwei_chart(&profile).unwrap();
        prop_assert_eq!(chart.slots.len(), 12);

        let mut seen = [false; 12];
        for slot in &chart.slots {
            prop_assert!(!seen[slot.palace as usize]);
            seen[slot.palace as usize] = true;
        }
        prop_assert!(seen.iter().all(|&s| s));
        prop_assert_eq!(chart.slots[chart.ming_index].palace, Palace::Ming);
    }

    #[test]
    fn prop_star_uniqueness(profile in arb_lunar_profile()) {
        let chart = compute_ziwei_chart(&profile).unwrap();
        let major_total: usize = chart.slots.iter().map(|s| s.major_stars.len()).sum();
        let minor_total: usize = chart.slots.iter().map(|s| s.minor_stars.len()).sum();
        prop_assert_eq!(major_total, 14);
        prop_assert_eq!(minor_total, 8);

        // No star key appears twice anywhere in the chart
        let mut keys: Vec<&str> = chart
            .slots
            .iter()
            .flat_map(|s| {
                s.major_stars
                    .iter()
                    .chain(s.minor_stars.iter())
                    .map(|r| r.key())
            })
            .collect();
        keys.sort_unstable();
        let before = keys.len();
        keys.dedup();
        prop_assert_eq!(keys.len(), before);
    }

    #[test]
    fn prop_ming_shen_formula(profile in arb_lunar_profile()) {
        let chart = compute_ziwei_chart(&profile).unwrap();
        let m = (profile.lunar_month - 1) as i32;
        let t = (((profile.birth_hour as i32) + 1) / 2) % 12;
        prop_assert_eq!(chart.ming_index as i32, (m - t).rem_euclid(12));
        prop_assert_eq!(chart.shen_index as i32, (m + t) % 12);
    }

    #[test]
    fn prop_lunar_day_mod12_regrouping(
        lunar_month in 1u8..=12,
        lunar_day in 1u8..=18,
        birth_hour in 0u8..=23,
        ganzhi in arb_ganzhi(),
    ) {
        let base = LunarProfile {
            lunar_year: 2000,
            lunar_month,
            lunar_day,
            is_leap_month: false,
            birth_hour,
            ganzhi,
        };
        let shifted = LunarProfile { lunar_day: lunar_day + 12, ..base.clone() };

        let a = compute_ziwei_chart(&base).unwrap();
        let b = compute_ziwei_chart(&shifted).unwrap();
        for star in [Star::ZiWei, Star::TianFu, Star::WenChang] {
            prop_assert_eq!(
                a.find_star(star).unwrap().index,
                b.find_star(star).unwrap().index
            );
        }
    }

    #[test]
    fn prop_ziwei_deterministic(profile in arb_lunar_profile()) {
        let a = compute_ziwei_chart(&profile).unwrap();
        let b = compute_ziwei_chart(&profile).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_sihua_always_four_hits(profile in arb_lunar_profile()) {
        // Every Sihua target in every table row is a star that is always
        // placed, so the flattened list always has exactly four entries
        let chart = compute_ziwei_chart(&profile).unwrap();
        prop_assert_eq!(chart.transformations.len(), 4);
    }
}

//! Four-Pillars (BaZi) engine
//!
//! Assembles the four pillars, tallies the Five Elements across all eight
//! stem/branch characters, accumulates Ten-God strengths against the Day
//! Master, and formats the decade luck-cycle sequence.
//!
//! All inputs arrive pre-resolved from the lunar calendar service; no
//! calendrical computation happens here.

use crate::{DaYunEntry, EarthlyBranch, Element, GanZhi, Gender, HeavenlyStem, TenGod};

/// Strength added per eligible stem/branch occurrence in the Ten-God scan
pub const TEN_GOD_WEIGHT: u32 = 10;

/// Luck cycles reported per chart: Da-Yun entries 1..=8 (index 0 is the
/// pre-adolescence cycle and excluded by convention)
pub const LUCK_CYCLE_COUNT: usize = 8;

// ============================================================
// INPUT
// ============================================================

/// Resolved birth pillars plus gender - the sole input to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BirthProfile {
    pub ganzhi: GanZhi,
    pub gender: Gender,
}

// ============================================================
// ELEMENT TALLY
// ============================================================

/// Five-Element counts over the eight pillar characters, with derived
/// percentages.
///
/// Both arrays are indexed in [`Element::CYCLE`] order and always rebuilt
/// together; percentages are never cached apart from their counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ElementTally {
    counts: [u32; 5],
    percentages: [u8; 5],
}

impl ElementTally {
    /// Build a tally from raw counts, deriving percentages against the
    /// actual total (8, barring unrecognized characters)
    pub fn from_counts(counts: [u32; 5]) -> Self {
        let total: u32 = counts.iter().sum();
        let mut percentages = [0u8; 5];
        if total > 0 {
            for (pct, &count) in percentages.iter_mut().zip(counts.iter()) {
                *pct = ((count as f64) * 100.0 / (total as f64)).round() as u8;
            }
        }
        Self {
            counts,
            percentages,
        }
    }

    #[inline]
    pub fn count(&self, element: Element) -> u32 {
        self.counts[element.index()]
    }

    #[inline]
    pub fn percentage(&self, element: Element) -> u8 {
        self.percentages[element.index()]
    }

    /// Total recognized characters (at most 8)
    #[inline]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}

// ============================================================
// TEN-GOD STRENGTHS
// ============================================================

/// Accumulated Ten-God strengths, indexed in [`TenGod::ALL`] order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TenGodStrengths {
    strengths: [u32; 10],
}

impl TenGodStrengths {
    #[inline]
    pub fn get(&self, god: TenGod) -> u32 {
        self.strengths[god as usize]
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.strengths.iter().sum()
    }

    fn add(&mut self, god: TenGod, weight: u32) {
        self.strengths[god as usize] += weight;
    }
}

// ============================================================
// LUCK CYCLES
// ============================================================

/// One decade luck-cycle entry, oldest-first in the output sequence
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LuckCycle {
    /// "{startAge}-{endAge}"
    pub age_range: String,
    pub stem: char,
    pub branch: char,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

// ============================================================
// RESULT
// ============================================================

/// Complete Four-Pillars computation output; immutable once returned
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FourPillarsResult {
    pub pillars: GanZhi,
    /// The Day pillar's stem; `None` only when the character is unrecognized
    pub day_master: Option<HeavenlyStem>,
    pub element_tally: ElementTally,
    pub ten_god_strengths: TenGodStrengths,
    pub luck_cycles: Vec<LuckCycle>,
}

// ============================================================
// ENGINE
// ============================================================

/// Compute the Four-Pillars profile for a resolved birth.
///
/// Pure and deterministic; unrecognized characters degrade (skipped in the
/// tally and scan) and a short Da-Yun sequence truncates the luck cycles,
/// neither aborts the computation.
pub fn compute_four_pillars(profile: &BirthProfile, da_yun: &[DaYunEntry]) -> FourPillarsResult {
    let ganzhi = profile.ganzhi;

    FourPillarsResult {
        pillars: ganzhi,
        day_master: ganzhi.day.stem_info(),
        element_tally: tally_elements(&ganzhi),
        ten_god_strengths: scan_ten_gods(&ganzhi),
        luck_cycles: format_luck_cycles(da_yun),
    }
}

/// Count elements over all eight stem/branch characters
fn tally_elements(ganzhi: &GanZhi) -> ElementTally {
    let mut counts = [0u32; 5];

    for pillar in ganzhi.pillars() {
        if let Some(stem) = pillar.stem_info() {
            counts[stem.element().index()] += 1;
        }
        if let Some(branch) = pillar.branch_info() {
            counts[branch.element().index()] += 1;
        }
    }

    ElementTally::from_counts(counts)
}

/// Accumulate Ten-God strengths over the 7 eligible slots.
///
/// The Day pillar's stem is the Day Master itself and never compared against
/// itself; its branch still participates via the hidden stem.
fn scan_ten_gods(ganzhi: &GanZhi) -> TenGodStrengths {
    let mut strengths = TenGodStrengths::default();

    let Some(day_master) = ganzhi.day.stem_info() else {
        return strengths;
    };

    let slot_stems = [
        ganzhi.year.stem_info(),
        ganzhi.year.branch_info().map(EarthlyBranch::hidden_stem),
        ganzhi.month.stem_info(),
        ganzhi.month.branch_info().map(EarthlyBranch::hidden_stem),
        ganzhi.day.branch_info().map(EarthlyBranch::hidden_stem),
        ganzhi.hour.stem_info(),
        ganzhi.hour.branch_info().map(EarthlyBranch::hidden_stem),
    ];

    for stem in slot_stems.into_iter().flatten() {
        strengths.add(TenGod::classify(day_master, stem), TEN_GOD_WEIGHT);
    }

    strengths
}

/// Slice Da-Yun entries 1..=8 into display-ready luck cycles.
///
/// Fewer than 9 supplied entries truncates the output instead of failing.
fn format_luck_cycles(da_yun: &[DaYunEntry]) -> Vec<LuckCycle> {
    da_yun
        .iter()
        .skip(1)
        .take(LUCK_CYCLE_COUNT)
        .map(|entry| LuckCycle {
            age_range: format!("{}-{}", entry.start_age, entry.end_age),
            // Malformed ganzhi strings degrade to the replacement character;
            // downstream lookups treat it as unrecognized.
            stem: entry.stem_char().unwrap_or(char::REPLACEMENT_CHARACTER),
            branch: entry.branch_char().unwrap_or(char::REPLACEMENT_CHARACTER),
            start_year: entry.start_year,
            end_year: entry.end_year,
        })
        .collect()
}

// ============================================================
// TESTS
// ============================================================

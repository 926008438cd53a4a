//! # Mingpan - Chinese Astrological Chart Computation
//!
//! Deterministic chart engines for Four Pillars (BaZi) profiles and
//! Zi Wei Dou Shu star charts.
//!
//! The crate deliberately contains no calendrical math: Gregorian-to-lunar
//! conversion and Da-Yun generation are delegated to a
//! [`LunarCalendarProvider`] implementation, so the engines stay pure and
//! testable with fixture data.
//!
//! ## Quick Start
//!
//! ```rust
//! use mingpan::prelude::*;
//!
//! // A stub calendar provider; production code wraps a real lunar library.
//! struct FixedCalendar;
//!
//! impl LunarCalendarProvider for FixedCalendar {
//!     fn resolve(&self, _input: &BirthInput) -> Result<ResolvedBirth> {
//!         Ok(ResolvedBirth {
//!             lunar_year: 1990,
//!             lunar_month: 4,
//!             lunar_day: 21,
//!             is_leap_month: false,
//!             ganzhi: GanZhi {
//!                 year: Pillar::new('甲', '午'),
//!                 month: Pillar::new('辛', '巳'),
//!                 day: Pillar::new('乙', '丑'),
//!                 hour: Pillar::new('壬', '巳'),
//!             },
//!         })
//!     }
//!
//!     fn da_yun(&self, _input: &BirthInput, _gender: Gender) -> Result<Vec<DaYunEntry>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! let engine = ChartEngine::new(FixedCalendar);
//! let input = BirthInput { year: 1990, month: 5, day: 15, hour: 10, gender: Gender::Male };
//!
//! let profile = engine.four_pillars(&input).unwrap();
//! assert_eq!(profile.day_master.map(|s| s.as_char()), Some('乙'));
//!
//! let chart = engine.ziwei_chart(&input).unwrap();
//! assert_eq!(chart.slots.len(), 12);
//! ```

pub mod four_pillars;
pub mod ziwei;

pub mod prelude {
    pub use crate::{
        // Four Pillars engine
        four_pillars::{
            compute_four_pillars, BirthProfile, ElementTally, FourPillarsResult, LuckCycle,
            TenGodStrengths,
        },
        // Zi Wei engine
        ziwei::{
            compute_ziwei_chart, LunarProfile, Palace, PalaceSlot, Sihua, Star, StarRef,
            TransformationHit, ZiWeiChart,
        },
        // Parallel
        compute_parallel,
        // Engine
        BirthInput,
        ChartBundle,
        ChartEngine,
        // Errors
        ChartError,
        ChartFailure,
        DaYunEntry,
        // Core types
        EarthlyBranch,
        Element,
        ElementRelation,
        GanZhi,
        Gender,
        HeavenlyStem,
        LunarCalendarProvider,
        Pillar,
        Polarity,
        ResolvedBirth,
        Result,
        TenGod,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, ChartError>;

/// Errors that can occur while resolving or computing a chart
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChartError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Unrecognized stem/branch character '{0}'")]
    UnrecognizedCharacter(char),

    #[error("Insufficient data: need {need} entries, got {got}")]
    InsufficientData { need: usize, got: usize },

    #[error("Calendar provider error: {0}")]
    Provider(String),
}

// ============================================================
// ELEMENTS AND POLARITY
// ============================================================

/// One of the Five Elements (Wu Xing).
///
/// Variant order is the canonical generation cycle; the discriminant doubles
/// as the cycle index used by [`Element::relation_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Element {
    Wood,
    Fire,
    Earth,
    Metal,
    Water,
}

impl Element {
    /// All elements in generation-cycle order
    pub const CYCLE: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Element::Wood => "Wood",
            Element::Fire => "Fire",
            Element::Earth => "Earth",
            Element::Metal => "Metal",
            Element::Water => "Water",
        }
    }

    pub const fn cn_name(self) -> &'static str {
        match self {
            Element::Wood => "木",
            Element::Fire => "火",
            Element::Earth => "土",
            Element::Metal => "金",
            Element::Water => "水",
        }
    }

    /// Resolve the relation of `self` to `other` on the mod-5 cycle.
    ///
    /// Exactly one branch matches for any two valid elements; the final arm
    /// can only be ControlledBy, asserted in debug builds.
    pub fn relation_to(self, other: Element) -> ElementRelation {
        let a = self as usize;
        let b = other as usize;

        if a == b {
            ElementRelation::Same
        } else if (a + 1) % 5 == b {
            ElementRelation::Generates
        } else if (b + 1) % 5 == a {
            ElementRelation::GeneratedBy
        } else if (a + 2) % 5 == b {
            ElementRelation::Controls
        } else {
            debug_assert_eq!((b + 2) % 5, a);
            ElementRelation::ControlledBy
        }
    }
}

/// Yin/Yang polarity of a stem or branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Polarity {
    Yang,
    Yin,
}

impl Polarity {
    #[inline]
    pub fn is_yang(self) -> bool {
        matches!(self, Polarity::Yang)
    }
}

/// Relation of one element to another on the generation/control cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ElementRelation {
    /// Same element
    Same,
    /// First element generates the second
    Generates,
    /// Second element generates the first
    GeneratedBy,
    /// First element controls the second
    Controls,
    /// Second element controls the first
    ControlledBy,
}

// ============================================================
// HEAVENLY STEMS
// ============================================================

/// One of the 10 Heavenly Stems (天干), ordinal 0..=9
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeavenlyStem {
    Jia,
    Yi,
    Bing,
    Ding,
    Wu,
    Ji,
    Geng,
    Xin,
    Ren,
    Gui,
}

impl HeavenlyStem {
    /// All stems in sexagenary order
    pub const ALL: [HeavenlyStem; 10] = [
        HeavenlyStem::Jia,
        HeavenlyStem::Yi,
        HeavenlyStem::Bing,
        HeavenlyStem::Ding,
        HeavenlyStem::Wu,
        HeavenlyStem::Ji,
        HeavenlyStem::Geng,
        HeavenlyStem::Xin,
        HeavenlyStem::Ren,
        HeavenlyStem::Gui,
    ];

    /// Look up a stem by its traditional character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '甲' => Some(HeavenlyStem::Jia),
            '乙' => Some(HeavenlyStem::Yi),
            '丙' => Some(HeavenlyStem::Bing),
            '丁' => Some(HeavenlyStem::Ding),
            '戊' => Some(HeavenlyStem::Wu),
            '己' => Some(HeavenlyStem::Ji),
            '庚' => Some(HeavenlyStem::Geng),
            '辛' => Some(HeavenlyStem::Xin),
            '壬' => Some(HeavenlyStem::Ren),
            '癸' => Some(HeavenlyStem::Gui),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            HeavenlyStem::Jia => '甲',
            HeavenlyStem::Yi => '乙',
            HeavenlyStem::Bing => '丙',
            HeavenlyStem::Ding => '丁',
            HeavenlyStem::Wu => '戊',
            HeavenlyStem::Ji => '己',
            HeavenlyStem::Geng => '庚',
            HeavenlyStem::Xin => '辛',
            HeavenlyStem::Ren => '壬',
            HeavenlyStem::Gui => '癸',
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stems pair up by element: 甲乙 Wood, 丙丁 Fire, 戊己 Earth, 庚辛 Metal, 壬癸 Water
    pub const fn element(self) -> Element {
        match self {
            HeavenlyStem::Jia | HeavenlyStem::Yi => Element::Wood,
            HeavenlyStem::Bing | HeavenlyStem::Ding => Element::Fire,
            HeavenlyStem::Wu | HeavenlyStem::Ji => Element::Earth,
            HeavenlyStem::Geng | HeavenlyStem::Xin => Element::Metal,
            HeavenlyStem::Ren | HeavenlyStem::Gui => Element::Water,
        }
    }

    /// Even ordinals are Yang, odd are Yin
    #[inline]
    pub const fn polarity(self) -> Polarity {
        if (self as usize) % 2 == 0 {
            Polarity::Yang
        } else {
            Polarity::Yin
        }
    }
}

impl serde::Serialize for HeavenlyStem {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.as_char().serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for HeavenlyStem {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let c = char::deserialize(d)?;
        HeavenlyStem::from_char(c)
            .ok_or_else(|| serde::de::Error::custom(ChartError::UnrecognizedCharacter(c)))
    }
}

// ============================================================
// EARTHLY BRANCHES
// ============================================================

/// One of the 12 Earthly Branches (地支), ordinal 0..=11 in Zi-first order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EarthlyBranch {
    Zi,
    Chou,
    Yin,
    Mao,
    Chen,
    Si,
    Wu,
    Wei,
    Shen,
    You,
    Xu,
    Hai,
}

impl EarthlyBranch {
    /// All branches in the fixed ring order 子丑寅卯辰巳午未申酉戌亥
    pub const ALL: [EarthlyBranch; 12] = [
        EarthlyBranch::Zi,
        EarthlyBranch::Chou,
        EarthlyBranch::Yin,
        EarthlyBranch::Mao,
        EarthlyBranch::Chen,
        EarthlyBranch::Si,
        EarthlyBranch::Wu,
        EarthlyBranch::Wei,
        EarthlyBranch::Shen,
        EarthlyBranch::You,
        EarthlyBranch::Xu,
        EarthlyBranch::Hai,
    ];

    /// Look up a branch by its traditional character
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '子' => Some(EarthlyBranch::Zi),
            '丑' => Some(EarthlyBranch::Chou),
            '寅' => Some(EarthlyBranch::Yin),
            '卯' => Some(EarthlyBranch::Mao),
            '辰' => Some(EarthlyBranch::Chen),
            '巳' => Some(EarthlyBranch::Si),
            '午' => Some(EarthlyBranch::Wu),
            '未' => Some(EarthlyBranch::Wei),
            '申' => Some(EarthlyBranch::Shen),
            '酉' => Some(EarthlyBranch::You),
            '戌' => Some(EarthlyBranch::Xu),
            '亥' => Some(EarthlyBranch::Hai),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            EarthlyBranch::Zi => '子',
            EarthlyBranch::Chou => '丑',
            EarthlyBranch::Yin => '寅',
            EarthlyBranch::Mao => '卯',
            EarthlyBranch::Chen => '辰',
            EarthlyBranch::Si => '巳',
            EarthlyBranch::Wu => '午',
            EarthlyBranch::Wei => '未',
            EarthlyBranch::Shen => '申',
            EarthlyBranch::You => '酉',
            EarthlyBranch::Xu => '戌',
            EarthlyBranch::Hai => '亥',
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn element(self) -> Element {
        match self {
            EarthlyBranch::Zi | EarthlyBranch::Hai => Element::Water,
            EarthlyBranch::Yin | EarthlyBranch::Mao => Element::Wood,
            EarthlyBranch::Si | EarthlyBranch::Wu => Element::Fire,
            EarthlyBranch::Shen | EarthlyBranch::You => Element::Metal,
            EarthlyBranch::Chou | EarthlyBranch::Chen | EarthlyBranch::Wei | EarthlyBranch::Xu => {
                Element::Earth
            }
        }
    }

    /// Even ordinals are Yang, odd are Yin
    #[inline]
    pub const fn polarity(self) -> Polarity {
        if (self as usize) % 2 == 0 {
            Polarity::Yang
        } else {
            Polarity::Yin
        }
    }

    /// The single dominant "hidden" stem hosted by this branch.
    ///
    /// Fixed reference-tradition table; any deviation silently changes
    /// user-visible Ten-God output, so it is preserved verbatim.
    pub const fn hidden_stem(self) -> HeavenlyStem {
        match self {
            EarthlyBranch::Zi => HeavenlyStem::Gui,
            EarthlyBranch::Chou => HeavenlyStem::Ji,
            EarthlyBranch::Yin => HeavenlyStem::Jia,
            EarthlyBranch::Mao => HeavenlyStem::Yi,
            EarthlyBranch::Chen => HeavenlyStem::Wu,
            EarthlyBranch::Si => HeavenlyStem::Bing,
            EarthlyBranch::Wu => HeavenlyStem::Ding,
            EarthlyBranch::Wei => HeavenlyStem::Ji,
            EarthlyBranch::Shen => HeavenlyStem::Geng,
            EarthlyBranch::You => HeavenlyStem::Xin,
            EarthlyBranch::Xu => HeavenlyStem::Wu,
            EarthlyBranch::Hai => HeavenlyStem::Ren,
        }
    }
}

impl serde::Serialize for EarthlyBranch {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.as_char().serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for EarthlyBranch {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let c = char::deserialize(d)?;
        EarthlyBranch::from_char(c)
            .ok_or_else(|| serde::de::Error::custom(ChartError::UnrecognizedCharacter(c)))
    }
}

// ============================================================
// TEN GODS
// ============================================================

/// The ten relation categories of a stem to the Day Master
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TenGod {
    Friend,
    RobWealth,
    EatingGod,
    HurtingOfficer,
    IndirectWealth,
    DirectWealth,
    SevenKillings,
    DirectOfficer,
    IndirectResource,
    DirectResource,
}

impl TenGod {
    pub const ALL: [TenGod; 10] = [
        TenGod::Friend,
        TenGod::RobWealth,
        TenGod::EatingGod,
        TenGod::HurtingOfficer,
        TenGod::IndirectWealth,
        TenGod::DirectWealth,
        TenGod::SevenKillings,
        TenGod::DirectOfficer,
        TenGod::IndirectResource,
        TenGod::DirectResource,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            TenGod::Friend => "Friend",
            TenGod::RobWealth => "Rob Wealth",
            TenGod::EatingGod => "Eating God",
            TenGod::HurtingOfficer => "Hurting Officer",
            TenGod::IndirectWealth => "Indirect Wealth",
            TenGod::DirectWealth => "Direct Wealth",
            TenGod::SevenKillings => "Seven Killings",
            TenGod::DirectOfficer => "Direct Officer",
            TenGod::IndirectResource => "Indirect Resource",
            TenGod::DirectResource => "Direct Resource",
        }
    }

    pub const fn cn_name(self) -> &'static str {
        match self {
            TenGod::Friend => "比肩",
            TenGod::RobWealth => "劫财",
            TenGod::EatingGod => "食神",
            TenGod::HurtingOfficer => "伤官",
            TenGod::IndirectWealth => "偏财",
            TenGod::DirectWealth => "正财",
            TenGod::SevenKillings => "七杀",
            TenGod::DirectOfficer => "正官",
            TenGod::IndirectResource => "偏印",
            TenGod::DirectResource => "正印",
        }
    }

    /// Classify `candidate` relative to the Day Master stem.
    ///
    /// The 5x2 table is exhaustive: element relation picks the row, polarity
    /// equality picks the column. Tie-breaking is solely by polarity.
    pub fn classify(day_master: HeavenlyStem, candidate: HeavenlyStem) -> TenGod {
        let relation = day_master.element().relation_to(candidate.element());
        let same_polarity = day_master.polarity() == candidate.polarity();

        match (relation, same_polarity) {
            (ElementRelation::Same, true) => TenGod::Friend,
            (ElementRelation::Same, false) => TenGod::RobWealth,
            (ElementRelation::Generates, true) => TenGod::EatingGod,
            (ElementRelation::Generates, false) => TenGod::HurtingOfficer,
            (ElementRelation::GeneratedBy, true) => TenGod::IndirectResource,
            (ElementRelation::GeneratedBy, false) => TenGod::DirectResource,
            (ElementRelation::Controls, true) => TenGod::IndirectWealth,
            (ElementRelation::Controls, false) => TenGod::DirectWealth,
            (ElementRelation::ControlledBy, true) => TenGod::SevenKillings,
            (ElementRelation::ControlledBy, false) => TenGod::DirectOfficer,
        }
    }

    /// Char-level classification; `None` when either character is not a
    /// recognized Heavenly Stem.
    pub fn classify_chars(day_master: char, candidate: char) -> Option<TenGod> {
        let dm = HeavenlyStem::from_char(day_master)?;
        let other = HeavenlyStem::from_char(candidate)?;
        Some(TenGod::classify(dm, other))
    }
}

// ============================================================
// PILLARS
// ============================================================

/// A stem+branch pair representing one calendar unit (year/month/day/hour).
///
/// Characters come from the external lunar calendar service and may in
/// principle be outside the known sets; lookups degrade to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Pillar {
    pub stem: char,
    pub branch: char,
}

impl Pillar {
    pub const fn new(stem: char, branch: char) -> Self {
        Self { stem, branch }
    }

    #[inline]
    pub fn stem_info(&self) -> Option<HeavenlyStem> {
        HeavenlyStem::from_char(self.stem)
    }

    #[inline]
    pub fn branch_info(&self) -> Option<EarthlyBranch> {
        EarthlyBranch::from_char(self.branch)
    }
}

/// The four pillars of a resolved birth instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GanZhi {
    pub year: Pillar,
    pub month: Pillar,
    pub day: Pillar,
    pub hour: Pillar,
}

impl GanZhi {
    /// Pillars in year/month/day/hour order
    pub fn pillars(&self) -> [Pillar; 4] {
        [self.year, self.month, self.day, self.hour]
    }
}

/// Birth gender; reverses the Da-Yun cycle direction upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

// ============================================================
// EXTERNAL CALENDAR SEAM
// ============================================================

/// Gregorian birth input as supplied by the HTTP surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BirthInput {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub gender: Gender,
}

impl BirthInput {
    /// Validate input ranges before any engine runs
    pub fn validate(&self) -> Result<()> {
        if !(1..=9999).contains(&self.year) {
            return Err(ChartError::OutOfRange {
                field: "year",
                value: self.year as i64,
                min: 1,
                max: 9999,
            });
        }
        if !(1..=12).contains(&self.month) {
            return Err(ChartError::OutOfRange {
                field: "month",
                value: self.month as i64,
                min: 1,
                max: 12,
            });
        }
        if !(1..=31).contains(&self.day) {
            return Err(ChartError::OutOfRange {
                field: "day",
                value: self.day as i64,
                min: 1,
                max: 31,
            });
        }
        if self.hour > 23 {
            return Err(ChartError::OutOfRange {
                field: "hour",
                value: self.hour as i64,
                min: 0,
                max: 23,
            });
        }
        Ok(())
    }
}

/// Lunar date and pillar characters resolved by the calendar service
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResolvedBirth {
    pub lunar_year: i32,
    pub lunar_month: u8,
    pub lunar_day: u8,
    pub is_leap_month: bool,
    pub ganzhi: GanZhi,
}

/// One externally computed decade luck-cycle entry.
///
/// `gan_zhi` is the 2-character stem+branch string as delivered by the
/// calendar service; years may be absent depending on the upstream library.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DaYunEntry {
    pub start_age: u8,
    pub end_age: u8,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub gan_zhi: String,
}

impl DaYunEntry {
    #[inline]
    pub fn stem_char(&self) -> Option<char> {
        self.gan_zhi.chars().next()
    }

    #[inline]
    pub fn branch_char(&self) -> Option<char> {
        self.gan_zhi.chars().nth(1)
    }
}

/// External lunar calendar collaborator.
///
/// The contract is narrow on purpose: the engines never reimplement solar
/// terms, leap months, or Da-Yun direction logic. Implementations report
/// their own failures through [`ChartError`], typically `Provider`,
/// `InvalidValue` or `InsufficientData`.
pub trait LunarCalendarProvider: Send + Sync {
    /// Resolve a Gregorian birth instant to its lunar date and pillars
    fn resolve(&self, input: &BirthInput) -> Result<ResolvedBirth>;

    /// Ordered Da-Yun sequence for the birth, at least 9 entries when
    /// complete (index 0 is the pre-adolescence cycle)
    fn da_yun(&self, input: &BirthInput, gender: Gender) -> Result<Vec<DaYunEntry>>;
}

// ============================================================
// CHART ENGINE
// ============================================================

/// Facade wiring the calendar provider to both pure engines.
///
/// All computation behind this type is deterministic: identical input always
/// yields identical output, so results are safe to cache verbatim.
pub struct ChartEngine<P: LunarCalendarProvider> {
    provider: P,
}

impl<P: LunarCalendarProvider> ChartEngine<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Compute the Four-Pillars elemental/Ten-God profile with luck cycles
    pub fn four_pillars(&self, input: &BirthInput) -> Result<four_pillars::FourPillarsResult> {
        input.validate()?;
        let resolved = self.provider.resolve(input)?;
        let da_yun = self.provider.da_yun(input, input.gender)?;
        let profile = four_pillars::BirthProfile {
            ganzhi: resolved.ganzhi,
            gender: input.gender,
        };
        Ok(four_pillars::compute_four_pillars(&profile, &da_yun))
    }

    /// Compute the twelve-palace Zi Wei Dou Shu star chart
    pub fn ziwei_chart(&self, input: &BirthInput) -> Result<ziwei::ZiWeiChart> {
        input.validate()?;
        let resolved = self.provider.resolve(input)?;
        let profile = ziwei::LunarProfile::from_resolved(&resolved, input.hour);
        ziwei::compute_ziwei_chart(&profile)
    }
}

// ============================================================
// PARALLEL BATCH COMPUTATION
// ============================================================

use rayon::prelude::*;

/// Both charts for one birth input
#[derive(Debug)]
pub struct ChartBundle {
    pub input: BirthInput,
    pub four_pillars: four_pillars::FourPillarsResult,
    pub ziwei: ziwei::ZiWeiChart,
}

/// Failure for one birth input in a batch
#[derive(Debug)]
pub struct ChartFailure {
    pub input: BirthInput,
    pub error: ChartError,
}

/// Chart a batch of birth inputs in parallel.
///
/// Safe because both engines are pure and the lookup tables are immutable
/// process-wide constants.
pub fn compute_parallel<'a, P, I>(
    engine: &ChartEngine<P>,
    inputs: I,
) -> (Vec<ChartBundle>, Vec<ChartFailure>)
where
    P: LunarCalendarProvider + Sync,
    I: IntoParallelIterator<Item = &'a BirthInput>,
{
    let results: Vec<_> = inputs
        .into_par_iter()
        .map(|input| {
            engine
                .four_pillars(input)
                .and_then(|fp| {
                    engine.ziwei_chart(input).map(|zw| ChartBundle {
                        input: *input,
                        four_pillars: fp,
                        ziwei: zw,
                    })
                })
                .map_err(|error| ChartFailure {
                    input: *input,
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================

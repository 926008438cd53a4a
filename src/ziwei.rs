//! Zi Wei Dou Shu engine
//!
//! Single-pass deterministic placement pipeline: resolve the Ming/Shen and
//! anchor-star indices from the lunar month/day/hour, assign the 12 named
//! palaces around the ring, place the 14 major and 8 minor stars at fixed
//! offsets, then overlay the Four Transformations from the birth-year stem.
//!
//! The offset tables are reproduced verbatim from the reference tradition.
//! They are the authoritative contract: a one-slot deviation silently
//! changes every downstream chart.

use crate::{ChartError, EarthlyBranch, GanZhi, HeavenlyStem, ResolvedBirth, Result};

/// Number of major stars placed per chart
pub const MAJOR_STAR_COUNT: usize = 14;

/// Number of minor stars placed per chart
pub const MINOR_STAR_COUNT: usize = 8;

// ============================================================
// STARS
// ============================================================

/// The 14 major and 8 minor stars of a Zi Wei chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Star {
    // Zi Wei group (6)
    ZiWei,
    TianJi,
    TaiYang,
    WuQu,
    TianTong,
    LianZhen,
    // Tian Fu group (8)
    TianFu,
    TaiYin,
    TanLang,
    JuMen,
    TianXiang,
    TianLiang,
    QiSha,
    PoJun,
    // Minor stars (8)
    WenChang,
    WenQu,
    ZuoFu,
    YouBi,
    HuoXing,
    LingXing,
    TianKui,
    TianYue,
}

impl Star {
    /// Stable ASCII key, unique across all 22 stars
    pub const fn key(self) -> &'static str {
        match self {
            Star::ZiWei => "ziwei",
            Star::TianJi => "tianji",
            Star::TaiYang => "taiyang",
            Star::WuQu => "wuqu",
            Star::TianTong => "tiantong",
            Star::LianZhen => "lianzhen",
            Star::TianFu => "tianfu",
            Star::TaiYin => "taiyin",
            Star::TanLang => "tanlang",
            Star::JuMen => "jumen",
            Star::TianXiang => "tianxiang",
            Star::TianLiang => "tianliang",
            Star::QiSha => "qisha",
            Star::PoJun => "pojun",
            Star::WenChang => "wenchang",
            Star::WenQu => "wenqu",
            Star::ZuoFu => "zuofu",
            Star::YouBi => "youbi",
            Star::HuoXing => "huoxing",
            Star::LingXing => "lingxing",
            Star::TianKui => "tiankui",
            Star::TianYue => "tianyue",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Star::ZiWei => "Zi Wei",
            Star::TianJi => "Tian Ji",
            Star::TaiYang => "Tai Yang",
            Star::WuQu => "Wu Qu",
            Star::TianTong => "Tian Tong",
            Star::LianZhen => "Lian Zhen",
            Star::TianFu => "Tian Fu",
            Star::TaiYin => "Tai Yin",
            Star::TanLang => "Tan Lang",
            Star::JuMen => "Ju Men",
            Star::TianXiang => "Tian Xiang",
            Star::TianLiang => "Tian Liang",
            Star::QiSha => "Qi Sha",
            Star::PoJun => "Po Jun",
            Star::WenChang => "Wen Chang",
            Star::WenQu => "Wen Qu",
            Star::ZuoFu => "Zuo Fu",
            Star::YouBi => "You Bi",
            Star::HuoXing => "Huo Xing",
            Star::LingXing => "Ling Xing",
            Star::TianKui => "Tian Kui",
            Star::TianYue => "Tian Yue",
        }
    }

    pub const fn cn_name(self) -> &'static str {
        match self {
            Star::ZiWei => "紫微",
            Star::TianJi => "天机",
            Star::TaiYang => "太阳",
            Star::WuQu => "武曲",
            Star::TianTong => "天同",
            Star::LianZhen => "廉贞",
            Star::TianFu => "天府",
            Star::TaiYin => "太阴",
            Star::TanLang => "贪狼",
            Star::JuMen => "巨门",
            Star::TianXiang => "天相",
            Star::TianLiang => "天梁",
            Star::QiSha => "七杀",
            Star::PoJun => "破军",
            Star::WenChang => "文昌",
            Star::WenQu => "文曲",
            Star::ZuoFu => "左辅",
            Star::YouBi => "右弼",
            Star::HuoXing => "火星",
            Star::LingXing => "铃星",
            Star::TianKui => "天魁",
            Star::TianYue => "天钺",
        }
    }

    pub const fn is_major(self) -> bool {
        !matches!(
            self,
            Star::WenChang
                | Star::WenQu
                | Star::ZuoFu
                | Star::YouBi
                | Star::HuoXing
                | Star::LingXing
                | Star::TianKui
                | Star::TianYue
        )
    }
}

// ============================================================
// PLACEMENT TABLES
// ============================================================

/// Zi Wei group: offsets from the Zi Wei anchor index
const ZIWEI_GROUP: [(Star, usize); 6] = [
    (Star::ZiWei, 0),
    (Star::TianJi, 1),
    (Star::TaiYang, 3),
    (Star::WuQu, 4),
    (Star::TianTong, 5),
    (Star::LianZhen, 6),
];

/// Tian Fu group: offsets from the Tian Fu anchor index
const TIANFU_GROUP: [(Star, usize); 8] = [
    (Star::TianFu, 0),
    (Star::TaiYin, 1),
    (Star::TanLang, 2),
    (Star::JuMen, 3),
    (Star::TianXiang, 4),
    (Star::TianLiang, 5),
    (Star::QiSha, 6),
    (Star::PoJun, 7),
];

/// Minor stars: offsets from `(lunar_day + time_branch_index) mod 12`
const MINOR_GROUP: [(Star, usize); 8] = [
    (Star::WenChang, 0),
    (Star::WenQu, 4),
    (Star::ZuoFu, 6),
    (Star::YouBi, 10),
    (Star::HuoXing, 2),
    (Star::LingXing, 8),
    (Star::TianKui, 1),
    (Star::TianYue, 7),
];

/// Month-to-branch order: lunar month 1 = 寅, not the natural Zi-first order
const MONTH_BRANCH_ORDER: [EarthlyBranch; 12] = [
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
    EarthlyBranch::Zi,
    EarthlyBranch::Chou,
];

// ============================================================
// PALACES
// ============================================================

/// The 12 named life-domain palaces, in canonical assignment order
/// starting at the Ming slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Palace {
    Ming,
    Brothers,
    Spouse,
    Children,
    Wealth,
    Health,
    Travel,
    Friends,
    Career,
    Property,
    Mental,
    Parents,
}

impl Palace {
    /// Canonical order assigned cyclically from the Ming slot
    pub const ORDER: [Palace; 12] = [
        Palace::Ming,
        Palace::Brothers,
        Palace::Spouse,
        Palace::Children,
        Palace::Wealth,
        Palace::Health,
        Palace::Travel,
        Palace::Friends,
        Palace::Career,
        Palace::Property,
        Palace::Mental,
        Palace::Parents,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Palace::Ming => "Life",
            Palace::Brothers => "Brothers",
            Palace::Spouse => "Spouse",
            Palace::Children => "Children",
            Palace::Wealth => "Wealth",
            Palace::Health => "Health",
            Palace::Travel => "Travel",
            Palace::Friends => "Friends",
            Palace::Career => "Career",
            Palace::Property => "Property",
            Palace::Mental => "Mental",
            Palace::Parents => "Parents",
        }
    }

    pub const fn cn_name(self) -> &'static str {
        match self {
            Palace::Ming => "命宫",
            Palace::Brothers => "兄弟",
            Palace::Spouse => "夫妻",
            Palace::Children => "子女",
            Palace::Wealth => "财帛",
            Palace::Health => "疾厄",
            Palace::Travel => "迁移",
            Palace::Friends => "交友",
            Palace::Career => "官禄",
            Palace::Property => "田宅",
            Palace::Mental => "福德",
            Palace::Parents => "父母",
        }
    }
}

// ============================================================
// FOUR TRANSFORMATIONS
// ============================================================

/// One of the Four Transformations (Sihua)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sihua {
    Lu,
    Quan,
    Ke,
    Ji,
}

impl Sihua {
    pub const fn name(self) -> &'static str {
        match self {
            Sihua::Lu => "lu",
            Sihua::Quan => "quan",
            Sihua::Ke => "ke",
            Sihua::Ji => "ji",
        }
    }

    pub const fn cn_name(self) -> &'static str {
        match self {
            Sihua::Lu => "禄",
            Sihua::Quan => "权",
            Sihua::Ke => "科",
            Sihua::Ji => "忌",
        }
    }
}

/// Sihua targets for one birth-year stem, in (lu, quan, ke, ji) order.
///
/// Fixed 10-row lookup keyed by stem ordinal; preserved verbatim from the
/// reference tradition.
const fn sihua_row(stem: HeavenlyStem) -> [(Sihua, Star); 4] {
    let (lu, quan, ke, ji) = match stem {
        HeavenlyStem::Jia => (Star::LianZhen, Star::PoJun, Star::WuQu, Star::TaiYang),
        HeavenlyStem::Yi => (Star::TianJi, Star::TianLiang, Star::ZiWei, Star::TaiYin),
        HeavenlyStem::Bing => (Star::TianTong, Star::TianJi, Star::WenChang, Star::LianZhen),
        HeavenlyStem::Ding => (Star::TaiYin, Star::TianTong, Star::TianJi, Star::JuMen),
        HeavenlyStem::Wu => (Star::TanLang, Star::TaiYin, Star::YouBi, Star::TianJi),
        HeavenlyStem::Ji => (Star::WuQu, Star::TanLang, Star::TianLiang, Star::WenQu),
        HeavenlyStem::Geng => (Star::TaiYang, Star::WuQu, Star::TaiYin, Star::TianTong),
        HeavenlyStem::Xin => (Star::JuMen, Star::TaiYang, Star::WenQu, Star::WenChang),
        HeavenlyStem::Ren => (Star::TianLiang, Star::ZiWei, Star::ZuoFu, Star::WuQu),
        HeavenlyStem::Gui => (Star::PoJun, Star::JuMen, Star::TaiYin, Star::TanLang),
    };
    [
        (Sihua::Lu, lu),
        (Sihua::Quan, quan),
        (Sihua::Ke, ke),
        (Sihua::Ji, ji),
    ]
}

// ============================================================
// CHART TYPES
// ============================================================

/// A star placed in a palace slot, with any transformation tags it carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarRef {
    pub star: Star,
    pub transforms: Vec<Sihua>,
}

impl StarRef {
    fn new(star: Star) -> Self {
        Self {
            star,
            transforms: Vec::new(),
        }
    }

    #[inline]
    pub fn key(&self) -> &'static str {
        self.star.key()
    }
}

impl serde::Serialize for StarRef {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut st = s.serialize_struct("StarRef", 4)?;
        st.serialize_field("key", self.star.key())?;
        st.serialize_field("display_name", self.star.display_name())?;
        st.serialize_field("cn_name", self.star.cn_name())?;
        st.serialize_field("transforms", &self.transforms)?;
        st.end()
    }
}

/// A transformation attached inside one palace slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTransformation {
    pub sihua: Sihua,
    pub star: Star,
}

impl serde::Serialize for SlotTransformation {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut st = s.serialize_struct("SlotTransformation", 2)?;
        st.serialize_field("type", self.sihua.name())?;
        st.serialize_field("star_key", self.star.key())?;
        st.end()
    }
}

/// A chart-level transformation entry in the flattened list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformationHit {
    pub sihua: Sihua,
    pub star: Star,
}

impl TransformationHit {
    #[inline]
    pub fn star_key(&self) -> &'static str {
        self.star.key()
    }
}

impl serde::Serialize for TransformationHit {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut st = s.serialize_struct("TransformationHit", 3)?;
        st.serialize_field("type", self.sihua.name())?;
        st.serialize_field("star_key", self.star.key())?;
        st.serialize_field("star_name", self.star.display_name())?;
        st.end()
    }
}

/// One of the 12 circular palace positions
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PalaceSlot {
    /// Ring position 0..=11 in Zi-first branch order
    pub index: usize,
    pub branch: EarthlyBranch,
    pub palace: Palace,
    pub major_stars: Vec<StarRef>,
    pub minor_stars: Vec<StarRef>,
    pub transformations: Vec<SlotTransformation>,
}

/// Lunar birth data consumed by the Zi Wei engine
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LunarProfile {
    pub lunar_year: i32,
    pub lunar_month: u8,
    pub lunar_day: u8,
    pub is_leap_month: bool,
    /// Gregorian birth hour 0..=23; mapped to the two-hour shichen internally
    pub birth_hour: u8,
    pub ganzhi: GanZhi,
}

impl LunarProfile {
    pub fn from_resolved(resolved: &ResolvedBirth, birth_hour: u8) -> Self {
        Self {
            lunar_year: resolved.lunar_year,
            lunar_month: resolved.lunar_month,
            lunar_day: resolved.lunar_day,
            is_leap_month: resolved.is_leap_month,
            birth_hour,
            ganzhi: resolved.ganzhi,
        }
    }

    #[inline]
    pub fn year_stem(&self) -> Option<HeavenlyStem> {
        self.ganzhi.year.stem_info()
    }
}

/// Complete Zi Wei Dou Shu chart; immutable once returned
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ZiWeiChart {
    pub ming_index: usize,
    pub shen_index: usize,
    /// The named palace co-located with the Shen position
    pub shen_palace: Palace,
    pub slots: Vec<PalaceSlot>,
    /// Flattened view of every transformation attached anywhere in the chart
    pub transformations: Vec<TransformationHit>,
    // Lunar metadata echo
    pub lunar_year: i32,
    pub lunar_month: u8,
    pub lunar_day: u8,
    pub is_leap_month: bool,
    pub ganzhi: GanZhi,
}

impl ZiWeiChart {
    /// The slot holding the Ming palace
    #[inline]
    pub fn ming_slot(&self) -> &PalaceSlot {
        &self.slots[self.ming_index]
    }

    /// Find the slot a given star was placed in
    pub fn find_star(&self, star: Star) -> Option<&PalaceSlot> {
        self.slots.iter().find(|slot| {
            slot.major_stars
                .iter()
                .chain(slot.minor_stars.iter())
                .any(|s| s.star == star)
        })
    }
}

// ============================================================
// ENGINE
// ============================================================

/// Branch ring index of the lunar month; month 1 = 寅 (index 2 of the ring),
/// but the placement formulas consume the position in the month order table,
/// which is simply `month - 1`.
#[inline]
fn month_branch_index(lunar_month: u8) -> usize {
    (lunar_month - 1) as usize
}

/// Traditional two-hour shichen index; hour 23-0:59 maps to 0 (子)
#[inline]
fn time_branch_index(birth_hour: u8) -> usize {
    ((birth_hour as usize + 1) / 2) % 12
}

/// Compute the twelve-palace Zi Wei Dou Shu chart.
///
/// Rejects out-of-range month/day/hour and an unrecognized year stem up
/// front; past validation the pipeline is a pure, infallible placement pass.
pub fn compute_ziwei_chart(profile: &LunarProfile) -> Result<ZiWeiChart> {
    if !(1..=12).contains(&profile.lunar_month) {
        return Err(ChartError::OutOfRange {
            field: "lunar_month",
            value: profile.lunar_month as i64,
            min: 1,
            max: 12,
        });
    }
    if !(1..=30).contains(&profile.lunar_day) {
        return Err(ChartError::OutOfRange {
            field: "lunar_day",
            value: profile.lunar_day as i64,
            min: 1,
            max: 30,
        });
    }
    if profile.birth_hour > 23 {
        return Err(ChartError::OutOfRange {
            field: "birth_hour",
            value: profile.birth_hour as i64,
            min: 0,
            max: 23,
        });
    }
    let year_stem = profile
        .year_stem()
        .ok_or(ChartError::UnrecognizedCharacter(profile.ganzhi.year.stem))?;

    // Step 1-3: index resolution and anchors
    let month_index = month_branch_index(profile.lunar_month);
    let time_index = time_branch_index(profile.birth_hour);
    let lunar_day = profile.lunar_day as usize;

    let ming_index = (month_index + 12 - time_index) % 12;
    let shen_index = (month_index + time_index) % 12;
    let ziwei_index = (month_index + lunar_day - 1) % 12;
    let tianfu_index = (ziwei_index + 6) % 12;
    let minor_base = (lunar_day + time_index) % 12;

    // Step 4: palace ring, named palaces assigned cyclically from Ming
    let mut slots: Vec<PalaceSlot> = (0..12)
        .map(|i| PalaceSlot {
            index: i,
            branch: EarthlyBranch::ALL[i],
            palace: Palace::ORDER[(i + 12 - ming_index) % 12],
            major_stars: Vec::new(),
            minor_stars: Vec::new(),
            transformations: Vec::new(),
        })
        .collect();

    // Steps 5-6: star placement at fixed offsets
    for (star, offset) in ZIWEI_GROUP {
        slots[(ziwei_index + offset) % 12]
            .major_stars
            .push(StarRef::new(star));
    }
    for (star, offset) in TIANFU_GROUP {
        slots[(tianfu_index + offset) % 12]
            .major_stars
            .push(StarRef::new(star));
    }
    for (star, offset) in MINOR_GROUP {
        slots[(minor_base + offset) % 12]
            .minor_stars
            .push(StarRef::new(star));
    }

    // Step 7: Four Transformations overlay. A star may carry more than one
    // tag if a table row ever repeats a target, so every pair is checked.
    let row = sihua_row(year_stem);
    let mut transformations = Vec::new();
    for slot in &mut slots {
        let mut notes = Vec::new();
        for star_ref in slot
            .major_stars
            .iter_mut()
            .chain(slot.minor_stars.iter_mut())
        {
            for (sihua, target) in row {
                if star_ref.star == target {
                    star_ref.transforms.push(sihua);
                    notes.push(SlotTransformation {
                        sihua,
                        star: star_ref.star,
                    });
                }
            }
        }
        for note in &notes {
            transformations.push(TransformationHit {
                sihua: note.sihua,
                star: note.star,
            });
        }
        slot.transformations = notes;
    }

    // Step 8: assemble
    Ok(ZiWeiChart {
        ming_index,
        shen_index,
        shen_palace: Palace::ORDER[(shen_index + 12 - ming_index) % 12],
        slots,
        transformations,
        lunar_year: profile.lunar_year,
        lunar_month: profile.lunar_month,
        lunar_day: profile.lunar_day,
        is_leap_month: profile.is_leap_month,
        ganzhi: profile.ganzhi,
    })
}

// ============================================================
// TESTS
// ============================================================

//! Pipeline stages and the per-household checkpoint counters.
//!
//! [`Stage`] is the closed list of household sub-models in their one legal
//! execution order.  `Uwsl` (usual work / school location) runs in its own
//! shadow-pricing loop before the household pipeline, but it records a
//! checkpoint like every other stage.

use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    Uwsl,
    Ao,
    Fp,
    Cdap,
    Imtf,
    Imtod,
    Immc,
    Jtf,
    Jtl,
    Jtod,
    Jmc,
    Inmtf,
    Inmtl,
    Inmtod,
    Inmmc,
    Awf,
    Awl,
    Awtod,
    Awmc,
    Stf,
    Stl,
}

impl Stage {
    pub const COUNT: usize = 21;

    pub const ALL: [Stage; Stage::COUNT] = [
        Stage::Uwsl,
        Stage::Ao,
        Stage::Fp,
        Stage::Cdap,
        Stage::Imtf,
        Stage::Imtod,
        Stage::Immc,
        Stage::Jtf,
        Stage::Jtl,
        Stage::Jtod,
        Stage::Jmc,
        Stage::Inmtf,
        Stage::Inmtl,
        Stage::Inmtod,
        Stage::Inmmc,
        Stage::Awf,
        Stage::Awl,
        Stage::Awtod,
        Stage::Awmc,
        Stage::Stf,
        Stage::Stl,
    ];

    /// Everything the household pipeline runs, in order.
    pub fn household_stages() -> &'static [Stage] {
        &Self::ALL[1..]
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The stage that runs immediately before this one, if any.
    pub fn previous(self) -> Option<Stage> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            Stage::Uwsl   => "uwsl",
            Stage::Ao     => "ao",
            Stage::Fp     => "fp",
            Stage::Cdap   => "cdap",
            Stage::Imtf   => "imtf",
            Stage::Imtod  => "imtod",
            Stage::Immc   => "immc",
            Stage::Jtf    => "jtf",
            Stage::Jtl    => "jtl",
            Stage::Jtod   => "jtod",
            Stage::Jmc    => "jmc",
            Stage::Inmtf  => "inmtf",
            Stage::Inmtl  => "inmtl",
            Stage::Inmtod => "inmtod",
            Stage::Inmmc  => "inmmc",
            Stage::Awf    => "awf",
            Stage::Awl    => "awl",
            Stage::Awtod  => "awtod",
            Stage::Awmc   => "awmc",
            Stage::Stf    => "stf",
            Stage::Stl    => "stl",
        }
    }

    pub fn from_abbrev(s: &str) -> Option<Stage> {
        Self::ALL.iter().copied().find(|st| st.abbrev().eq_ignore_ascii_case(s.trim()))
    }

    pub fn description(self) -> &'static str {
        match self {
            Stage::Uwsl   => "usual work and school location choice",
            Stage::Ao     => "auto ownership",
            Stage::Fp     => "free parking eligibility",
            Stage::Cdap   => "coordinated daily activity pattern",
            Stage::Imtf   => "individual mandatory tour frequency",
            Stage::Imtod  => "individual mandatory tour departure and duration",
            Stage::Immc   => "individual mandatory tour mode choice",
            Stage::Jtf    => "joint tour frequency",
            Stage::Jtl    => "joint tour location",
            Stage::Jtod   => "joint tour departure and duration",
            Stage::Jmc    => "joint tour mode choice",
            Stage::Inmtf  => "individual non-mandatory tour frequency",
            Stage::Inmtl  => "individual non-mandatory tour location",
            Stage::Inmtod => "individual non-mandatory tour departure and duration",
            Stage::Inmmc  => "individual non-mandatory tour mode choice",
            Stage::Awf    => "at-work subtour frequency",
            Stage::Awl    => "at-work subtour location",
            Stage::Awtod  => "at-work subtour departure and duration",
            Stage::Awmc   => "at-work subtour mode choice",
            Stage::Stf    => "stop frequency",
            Stage::Stl    => "stop location, trip mode and parking",
        }
    }

    /// Property key of this stage's run flag.
    pub fn run_flag_key(self) -> &'static str {
        match self {
            Stage::Uwsl   => "RunModel.UsualWorkAndSchoolLocationChoice",
            Stage::Ao     => "RunModel.AutoOwnership",
            Stage::Fp     => "RunModel.FreeParking",
            Stage::Cdap   => "RunModel.CoordinatedDailyActivityPattern",
            Stage::Imtf   => "RunModel.IndividualMandatoryTourFrequency",
            Stage::Imtod  => "RunModel.MandatoryTourDepartureTimeAndDuration",
            Stage::Immc   => "RunModel.MandatoryTourModeChoice",
            Stage::Jtf    => "RunModel.JointTourFrequency",
            Stage::Jtl    => "RunModel.JointTourLocationChoice",
            Stage::Jtod   => "RunModel.JointTourDepartureTimeAndDuration",
            Stage::Jmc    => "RunModel.JointTourModeChoice",
            Stage::Inmtf  => "RunModel.IndividualNonMandatoryTourFrequency",
            Stage::Inmtl  => "RunModel.IndividualNonMandatoryTourLocationChoice",
            Stage::Inmtod => "RunModel.IndividualNonMandatoryTourDepartureTimeAndDuration",
            Stage::Inmmc  => "RunModel.IndividualNonMandatoryTourModeChoice",
            Stage::Awf    => "RunModel.AtWorkSubTourFrequency",
            Stage::Awl    => "RunModel.AtWorkSubTourLocationChoice",
            Stage::Awtod  => "RunModel.AtWorkSubTourDepartureTimeAndDuration",
            Stage::Awmc   => "RunModel.AtWorkSubTourModeChoice",
            Stage::Stf    => "RunModel.StopFrequency",
            Stage::Stl    => "RunModel.StopLocation",
        }
    }

    /// Stages that must also be enabled whenever this one is.
    pub fn prerequisites(self) -> &'static [Stage] {
        match self {
            Stage::Imtod  => &[Stage::Imtf],
            Stage::Jtl    => &[Stage::Jtf],
            Stage::Jtod   => &[Stage::Jtf, Stage::Jtl],
            Stage::Inmtl  => &[Stage::Inmtf],
            Stage::Inmtod => &[Stage::Inmtf, Stage::Inmtl],
            Stage::Awl    => &[Stage::Awf],
            Stage::Awtod  => &[Stage::Awf, Stage::Awl],
            _ => &[],
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbrev())
    }
}

// ── Checkpoints ───────────────────────────────────────────────────────────────

/// Random draw count recorded right after each stage finished for one
/// household.  Zero means "not reached".
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Checkpoints([u64; Stage::COUNT]);

impl Checkpoints {
    #[inline]
    pub fn get(&self, stage: Stage) -> u64 {
        self.0[stage.index()]
    }

    #[inline]
    pub fn set(&mut self, stage: Stage, count: u64) {
        self.0[stage.index()] = count;
    }

    /// Zero the counters of `stage` and every stage after it.
    pub fn clear_from(&mut self, stage: Stage) {
        for c in &mut self.0[stage.index()..] {
            *c = 0;
        }
    }

    /// The count the stream must be rewound to before re-running `stage`:
    /// the latest checkpoint of any earlier stage.  Counts only grow along
    /// the pipeline, so that is the largest one.
    pub fn resume_count(&self, stage: Stage) -> u64 {
        self.0[..stage.index()].iter().copied().max().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }
}

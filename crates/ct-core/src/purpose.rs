//! Closed enums for person types, tour categories, tour purposes and the
//! destination-choice size segments.
//!
//! Every string the model files use ("work_low", "othMaint", …) maps to a
//! variant here once, at load time; nothing downstream dispatches on strings.

use std::fmt;

// ── PersonType ────────────────────────────────────────────────────────────────

/// The eight-way person classification used by every household sub-model.
/// Discriminants are the codes found in the population files.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PersonType {
    FullTimeWorker    = 1,
    PartTimeWorker    = 2,
    University        = 3,
    NonWorker         = 4,
    Retired           = 5,
    DrivingStudent    = 6,
    NonDrivingStudent = 7,
    Preschool         = 8,
}

impl PersonType {
    pub const ALL: [PersonType; 8] = [
        PersonType::FullTimeWorker,
        PersonType::PartTimeWorker,
        PersonType::University,
        PersonType::NonWorker,
        PersonType::Retired,
        PersonType::DrivingStudent,
        PersonType::NonDrivingStudent,
        PersonType::Preschool,
    ];

    pub fn from_code(code: u8) -> Option<PersonType> {
        Self::ALL.get((code as usize).checked_sub(1)?).copied()
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_worker(self) -> bool {
        matches!(self, PersonType::FullTimeWorker | PersonType::PartTimeWorker)
    }

    /// University, driving-age and younger students; preschool children count
    /// as students for school-location purposes.
    pub fn is_student(self) -> bool {
        matches!(
            self,
            PersonType::University
                | PersonType::DrivingStudent
                | PersonType::NonDrivingStudent
                | PersonType::Preschool
        )
    }

    pub fn is_child(self) -> bool {
        matches!(
            self,
            PersonType::DrivingStudent | PersonType::NonDrivingStudent | PersonType::Preschool
        )
    }

    pub fn is_adult(self) -> bool {
        !self.is_child()
    }

    pub fn label(self) -> &'static str {
        match self {
            PersonType::FullTimeWorker    => "Full-time worker",
            PersonType::PartTimeWorker    => "Part-time worker",
            PersonType::University        => "University student",
            PersonType::NonWorker         => "Non-worker",
            PersonType::Retired           => "Retired",
            PersonType::DrivingStudent    => "Student of driving age",
            PersonType::NonDrivingStudent => "Student of non-driving age",
            PersonType::Preschool         => "Child too young for school",
        }
    }
}

impl fmt::Display for PersonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── TourCategory / TourPurpose ────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TourCategory {
    Mandatory,
    Joint,
    IndividualNonMandatory,
    AtWork,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TourPurpose {
    Work,
    University,
    School,
    Escort,
    Shopping,
    OthMaint,
    EatOut,
    Social,
    OthDiscr,
    AtWorkEat,
    AtWorkBusiness,
    AtWorkMaint,
}

impl TourPurpose {
    /// Purposes an individual non-mandatory tour can take, in the order the
    /// frequency alternatives list them.
    pub const NON_MANDATORY: [TourPurpose; 6] = [
        TourPurpose::Escort,
        TourPurpose::Shopping,
        TourPurpose::OthMaint,
        TourPurpose::EatOut,
        TourPurpose::Social,
        TourPurpose::OthDiscr,
    ];

    /// Joint tours are never escort tours.
    pub const JOINT: [TourPurpose; 5] = [
        TourPurpose::Shopping,
        TourPurpose::OthMaint,
        TourPurpose::EatOut,
        TourPurpose::Social,
        TourPurpose::OthDiscr,
    ];

    pub fn is_mandatory(self) -> bool {
        matches!(self, TourPurpose::Work | TourPurpose::University | TourPurpose::School)
    }

    pub fn is_at_work(self) -> bool {
        matches!(
            self,
            TourPurpose::AtWorkEat | TourPurpose::AtWorkBusiness | TourPurpose::AtWorkMaint
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            TourPurpose::Work           => "work",
            TourPurpose::University     => "university",
            TourPurpose::School         => "school",
            TourPurpose::Escort         => "escort",
            TourPurpose::Shopping       => "shopping",
            TourPurpose::OthMaint       => "othMaint",
            TourPurpose::EatOut         => "eatOut",
            TourPurpose::Social         => "social",
            TourPurpose::OthDiscr       => "othDiscr",
            TourPurpose::AtWorkEat      => "atwork_eat",
            TourPurpose::AtWorkBusiness => "atwork_business",
            TourPurpose::AtWorkMaint    => "atwork_maint",
        }
    }
}

impl fmt::Display for TourPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── DcPurpose ─────────────────────────────────────────────────────────────────

/// Household income thresholds (dollars, exclusive upper bounds) separating
/// the four work size segments.
pub const INCOME_SEGMENT_LIMITS: [i32; 3] = [30_000, 60_000, 100_000];

/// 0-based income segment (0 = low … 3 = very high).
pub fn income_segment(income: i32) -> usize {
    INCOME_SEGMENT_LIMITS
        .iter()
        .position(|&limit| income < limit)
        .unwrap_or(INCOME_SEGMENT_LIMITS.len())
}

/// A destination-choice size segment.
///
/// The first seven are the mandatory (usual work / school location)
/// segments and the only ones that take part in shadow pricing.  Sample of
/// alternatives pages are numbered `index() + 1` in this order.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DcPurpose {
    WorkLow,
    WorkMed,
    WorkHigh,
    WorkVeryHigh,
    University,
    SchoolHigh,
    SchoolGrade,
    EscortKids,
    EscortNoKids,
    Shopping,
    EatOut,
    OthMaint,
    Social,
    OthDiscr,
    AtWork,
}

impl DcPurpose {
    pub const COUNT: usize = 15;

    pub const ALL: [DcPurpose; DcPurpose::COUNT] = [
        DcPurpose::WorkLow,
        DcPurpose::WorkMed,
        DcPurpose::WorkHigh,
        DcPurpose::WorkVeryHigh,
        DcPurpose::University,
        DcPurpose::SchoolHigh,
        DcPurpose::SchoolGrade,
        DcPurpose::EscortKids,
        DcPurpose::EscortNoKids,
        DcPurpose::Shopping,
        DcPurpose::EatOut,
        DcPurpose::OthMaint,
        DcPurpose::Social,
        DcPurpose::OthDiscr,
        DcPurpose::AtWork,
    ];

    pub const MANDATORY: [DcPurpose; 7] = [
        DcPurpose::WorkLow,
        DcPurpose::WorkMed,
        DcPurpose::WorkHigh,
        DcPurpose::WorkVeryHigh,
        DcPurpose::University,
        DcPurpose::SchoolHigh,
        DcPurpose::SchoolGrade,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn is_mandatory(self) -> bool {
        self.index() < Self::MANDATORY.len()
    }

    pub fn is_work(self) -> bool {
        self.index() < 4
    }

    /// Work segment for a household income.
    pub fn for_work(income: i32) -> DcPurpose {
        Self::ALL[income_segment(income)]
    }

    /// Usual-location segment for a person, if they have one.  Workers take
    /// a work segment even when they also attend school.
    pub fn usual_location(person_type: PersonType, income: i32) -> Option<DcPurpose> {
        match person_type {
            PersonType::FullTimeWorker | PersonType::PartTimeWorker => Some(Self::for_work(income)),
            PersonType::University => Some(DcPurpose::University),
            PersonType::DrivingStudent => Some(DcPurpose::SchoolHigh),
            PersonType::NonDrivingStudent | PersonType::Preschool => Some(DcPurpose::SchoolGrade),
            PersonType::NonWorker | PersonType::Retired => None,
        }
    }

    /// Segment used to locate a non-mandatory, joint or at-work tour.
    pub fn for_tour(purpose: TourPurpose, household_has_kids: bool) -> Option<DcPurpose> {
        Some(match purpose {
            TourPurpose::Escort if household_has_kids => DcPurpose::EscortKids,
            TourPurpose::Escort   => DcPurpose::EscortNoKids,
            TourPurpose::Shopping => DcPurpose::Shopping,
            TourPurpose::EatOut   => DcPurpose::EatOut,
            TourPurpose::OthMaint => DcPurpose::OthMaint,
            TourPurpose::Social   => DcPurpose::Social,
            TourPurpose::OthDiscr => DcPurpose::OthDiscr,
            TourPurpose::AtWorkEat | TourPurpose::AtWorkBusiness | TourPurpose::AtWorkMaint => {
                DcPurpose::AtWork
            }
            TourPurpose::Work | TourPurpose::University | TourPurpose::School => return None,
        })
    }

    /// Page of the final destination choice equations for this segment.
    /// Work income segments share one page; escort segments share another.
    pub fn dc_page(self) -> u16 {
        match self {
            DcPurpose::WorkLow | DcPurpose::WorkMed | DcPurpose::WorkHigh | DcPurpose::WorkVeryHigh => 1,
            DcPurpose::University   => 2,
            DcPurpose::SchoolHigh   => 3,
            DcPurpose::SchoolGrade  => 4,
            DcPurpose::EscortKids   => 5,
            DcPurpose::EscortNoKids => 6,
            DcPurpose::Shopping     => 7,
            DcPurpose::EatOut       => 8,
            DcPurpose::OthMaint     => 9,
            DcPurpose::Social       => 10,
            DcPurpose::OthDiscr     => 11,
            DcPurpose::AtWork       => 12,
        }
    }

    /// Page of the sample-of-alternatives equations for this segment.
    #[inline]
    pub fn soa_page(self) -> u16 {
        self.index() as u16 + 1
    }

    pub fn label(self) -> &'static str {
        match self {
            DcPurpose::WorkLow      => "work_low",
            DcPurpose::WorkMed      => "work_med",
            DcPurpose::WorkHigh     => "work_high",
            DcPurpose::WorkVeryHigh => "work_very high",
            DcPurpose::University   => "university_university",
            DcPurpose::SchoolHigh   => "school_high",
            DcPurpose::SchoolGrade  => "school_grade",
            DcPurpose::EscortKids   => "escort_kids",
            DcPurpose::EscortNoKids => "escort_no kids",
            DcPurpose::Shopping     => "shopping",
            DcPurpose::EatOut       => "eatOut",
            DcPurpose::OthMaint     => "othMaint",
            DcPurpose::Social       => "social",
            DcPurpose::OthDiscr     => "othDiscr",
            DcPurpose::AtWork       => "atwork_atwork",
        }
    }

    pub fn from_label(label: &str) -> Option<DcPurpose> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl fmt::Display for DcPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

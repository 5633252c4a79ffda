//! One output row per person.

use ct_household::{Household, Location, Person};

/// A person's usual locations with the household context they were chosen
/// in.  Missing locations are written as zone 0, sub-zone 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonResultRow {
    pub household_id:        u32,
    pub home_zone:           u32,
    pub home_subzone:        u8,
    pub income:              i32,
    pub person_id:           u32,
    pub person_num:          u8,
    pub person_type:         &'static str,
    pub age:                 u8,
    pub employment_category: u8,
    pub student_category:    u8,
    pub work_zone:           u32,
    pub work_subzone:        u8,
    pub school_zone:         u32,
    pub school_subzone:      u8,
}

impl PersonResultRow {
    pub fn new(household: &Household, person: &Person) -> Self {
        let (work_zone, work_subzone) = split(person.work_location);
        let (school_zone, school_subzone) = split(person.school_location);
        Self {
            household_id: household.id.0,
            home_zone: household.home_zone.0,
            home_subzone: household.home_subzone,
            income: household.income,
            person_id: person.id.0,
            person_num: person.num,
            person_type: person.person_type.label(),
            age: person.age,
            employment_category: person.employment_category,
            student_category: person.student_category,
            work_zone,
            work_subzone,
            school_zone,
            school_subzone,
        }
    }

    /// Rows for every member, in person order.
    pub fn for_household(household: &Household) -> impl Iterator<Item = PersonResultRow> + '_ {
        household.persons.iter().map(move |p| Self::new(household, p))
    }
}

fn split(location: Option<Location>) -> (u32, u8) {
    location.map_or((0, 0), |l| (l.zone.0, l.subzone))
}

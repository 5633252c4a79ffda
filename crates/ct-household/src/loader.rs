//! CSV population loader.
//!
//! # CSV format
//!
//! `households.csv`, one row per household:
//!
//! ```csv
//! HHID,TAZ,walk_subzone,hinc
//! 1001,12,1,45000
//! 1002,7,0,120000
//! ```
//!
//! `persons.csv`, one row per person; persons are numbered 1, 2, … in file
//! order within their household:
//!
//! ```csv
//! HHID,PERID,AGE,ptype,pemploy,pstudent
//! 1001,1,44,1,1,3
//! 1001,2,12,7,3,1
//! ```
//!
//! Households keep file order in the store, so packet ranges and the random
//! stream of each household are stable between runs on the same files.

use std::io::Read;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use ct_core::{HouseholdId, PersonId, PersonType, RandomStreamManager, ZoneId};

use crate::{Household, HouseholdError, HouseholdResult, HouseholdStore, Person};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct HouseholdRecord {
    #[serde(rename = "HHID")]
    hh_id:        u32,
    #[serde(rename = "TAZ")]
    taz:          u32,
    #[serde(default)]
    walk_subzone: u8,
    #[serde(rename = "hinc")]
    income:       i32,
}

#[derive(Deserialize)]
struct PersonRecord {
    #[serde(rename = "HHID")]
    hh_id:     u32,
    #[serde(rename = "PERID")]
    person_id: u32,
    #[serde(rename = "AGE")]
    age:       u8,
    ptype:     u8,
    #[serde(default)]
    pemploy:   u8,
    #[serde(default)]
    pstudent:  u8,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load households and persons from two CSV files.
///
/// Households listed in `debug_ids` get their `debug` flag set.
pub fn load_population_csv(
    households: &Path,
    persons:    &Path,
    streams:    &RandomStreamManager,
    debug_ids:  &[u32],
) -> HouseholdResult<HouseholdStore> {
    let hh_file = std::fs::File::open(households)?;
    let p_file = std::fs::File::open(persons)?;
    let store = load_population_reader(hh_file, p_file, streams, debug_ids)?;
    log::info!(
        "loaded {} households, {} persons from {}",
        store.len(),
        store.person_count(),
        households.display()
    );
    Ok(store)
}

/// Like [`load_population_csv`] but accepts any `Read` sources.
pub fn load_population_reader<H: Read, P: Read>(
    households: H,
    persons:    P,
    streams:    &RandomStreamManager,
    debug_ids:  &[u32],
) -> HouseholdResult<HouseholdStore> {
    // ── Persons grouped by household, file order kept ─────────────────────
    let mut by_household: FxHashMap<u32, Vec<PersonRecord>> = FxHashMap::default();
    for row in csv::Reader::from_reader(persons).deserialize::<PersonRecord>() {
        let row = row?;
        by_household.entry(row.hh_id).or_default().push(row);
    }

    // ── Households ────────────────────────────────────────────────────────
    let mut out = Vec::new();
    for row in csv::Reader::from_reader(households).deserialize::<HouseholdRecord>() {
        let row = row?;
        let id = HouseholdId(row.hh_id);
        let mut hh = Household::new(id, ZoneId(row.taz), row.walk_subzone, row.income, streams);
        hh.debug = debug_ids.contains(&row.hh_id);

        let members = by_household.remove(&row.hh_id).unwrap_or_default();
        if members.is_empty() {
            return Err(HouseholdError::Inconsistent {
                household: id,
                detail:    "household has no persons".into(),
            });
        }
        for (i, p) in members.into_iter().enumerate() {
            let person_type = PersonType::from_code(p.ptype).ok_or_else(|| {
                HouseholdError::Parse(format!("person {}: invalid person type {}", p.person_id, p.ptype))
            })?;
            let mut person = Person::new(PersonId(p.person_id), id, (i + 1) as u8, person_type, p.age);
            person.employment_category = p.pemploy;
            person.student_category = p.pstudent;
            hh.add_person(person)?;
        }
        out.push(hh);
    }

    if let Some(orphan) = by_household.keys().min() {
        return Err(HouseholdError::Parse(format!(
            "{} persons reference households missing from the household file (e.g. HHID {orphan})",
            by_household.values().map(Vec::len).sum::<usize>()
        )));
    }

    Ok(HouseholdStore::new(out))
}

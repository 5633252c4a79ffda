//! A synthetic population in the loader's CSV format.
//!
//! Homes spread over every zone and sub-zone; household sizes, incomes and
//! person types come from one fixed random stream, so the same seed always
//! gives the same files.

use ct_core::{HouseholdId, RandomStream};

/// Households and persons CSV text.
pub struct PopulationCsv {
    pub households: String,
    pub persons:    String,
}

// Person type codes as read by the loader.
const FULL_TIME:     u8 = 1;
const PART_TIME:     u8 = 2;
const UNIVERSITY:    u8 = 3;
const NON_WORKER:    u8 = 4;
const RETIRED:       u8 = 5;
const DRIVING_AGE:   u8 = 6;
const NON_DRIVING:   u8 = 7;
const PRESCHOOL:     u8 = 8;

const INCOMES: [i32; 4] = [22_000, 48_000, 85_000, 140_000];

pub fn generate(households: u32, zones: u32, subzones: u8, seed: u64) -> PopulationCsv {
    let mut rng = RandomStream::new(seed, HouseholdId(0));
    let mut hh_csv = String::from("HHID,TAZ,walk_subzone,hinc\n");
    let mut p_csv = String::from("HHID,PERID,AGE,ptype,pemploy,pstudent\n");
    let mut next_person = 1u32;

    for i in 0..households {
        let id = 1_000 + i;
        let taz = 1 + pick(&mut rng, zones as usize) as u32;
        let subzone = pick(&mut rng, subzones as usize);
        let income = INCOMES[pick(&mut rng, INCOMES.len())];
        hh_csv.push_str(&format!("{id},{taz},{subzone},{income}\n"));

        let size = 1 + pick(&mut rng, 4);
        for member in 0..size {
            let (ptype, age) = person_type(&mut rng, member);
            let employment = match ptype {
                FULL_TIME => 1,
                PART_TIME => 2,
                _ => 3,
            };
            let student = match ptype {
                DRIVING_AGE | NON_DRIVING | PRESCHOOL => 1,
                UNIVERSITY => 2,
                _ => 3,
            };
            p_csv.push_str(&format!("{id},{next_person},{age},{ptype},{employment},{student}\n"));
            next_person += 1;
        }
    }
    PopulationCsv { households: hh_csv, persons: p_csv }
}

/// The first two members are adults; later ones are mostly children.
fn person_type(rng: &mut RandomStream, member: usize) -> (u8, u8) {
    let u = rng.draw();
    if member < 2 {
        match u {
            u if u < 0.45 => (FULL_TIME, 25 + pick(rng, 35) as u8),
            u if u < 0.60 => (PART_TIME, 20 + pick(rng, 45) as u8),
            u if u < 0.70 => (UNIVERSITY, 18 + pick(rng, 8) as u8),
            u if u < 0.85 => (NON_WORKER, 25 + pick(rng, 40) as u8),
            _ => (RETIRED, 65 + pick(rng, 20) as u8),
        }
    } else {
        match u {
            u if u < 0.30 => (NON_DRIVING, 6 + pick(rng, 10) as u8),
            u if u < 0.55 => (DRIVING_AGE, 16 + pick(rng, 3) as u8),
            u if u < 0.75 => (PRESCHOOL, pick(rng, 6) as u8),
            _ => (FULL_TIME, 19 + pick(rng, 10) as u8),
        }
    }
}

fn pick(rng: &mut RandomStream, n: usize) -> usize {
    ((rng.draw() * n as f64) as usize).min(n.saturating_sub(1))
}

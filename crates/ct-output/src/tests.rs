//! Unit tests for ct-output.

use ct_core::{HouseholdId, PersonId, PersonType, RandomStreamManager, ZoneId};
use ct_household::{Household, Location, Person};

fn household(id: u32, members: u8) -> Household {
    let streams = RandomStreamManager::new(1);
    let hh_id = HouseholdId(id);
    let mut hh = Household::new(hh_id, ZoneId(7), 2, 61_500, &streams);
    for num in 1..=members {
        let t = if num == 1 { PersonType::FullTimeWorker } else { PersonType::NonDrivingStudent };
        let mut p = Person::new(PersonId(id * 10 + num as u32), hh_id, num, t, 10 + num);
        if num == 1 {
            p.employment_category = 1;
            p.work_location = Some(Location::new(ZoneId(12), 1));
        } else {
            p.student_category = 1;
            p.school_location = Some(Location::new(ZoneId(3), 0));
        }
        hh.add_person(p).unwrap();
    }
    hh
}

#[cfg(test)]
mod rows {
    use super::*;
    use crate::PersonResultRow;

    #[test]
    fn row_carries_household_context() {
        let hh = household(44, 2);
        let rows: Vec<_> = PersonResultRow::for_household(&hh).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].household_id, 44);
        assert_eq!(rows[0].home_zone, 7);
        assert_eq!(rows[0].home_subzone, 2);
        assert_eq!(rows[0].income, 61_500);
        assert_eq!((rows[0].work_zone, rows[0].work_subzone), (12, 1));
        assert_eq!((rows[0].school_zone, rows[0].school_subzone), (0, 0));
        assert_eq!(rows[1].person_num, 2);
        assert_eq!(rows[1].person_type, "Student of non-driving age");
        assert_eq!((rows[1].school_zone, rows[1].school_subzone), (3, 0));
    }
}

#[cfg(test)]
mod csv_tests {
    use std::path::Path;

    use super::*;
    use crate::{CsvResultWriter, HEADER, ResultWriter, result_path, write_results};

    #[test]
    fn header_and_rows() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("wsloc.csv");
        let households: Vec<_> = (1..=5).map(|i| household(i, 1 + (i as u8 % 3))).collect();
        let persons: usize = households.iter().map(|h| h.persons.len()).sum();

        let mut writer = CsvResultWriter::create(&path).unwrap();
        let written = write_results(&households, &mut writer, 2).unwrap();
        assert_eq!(written, persons as u64);
        assert_eq!(writer.rows(), persons as u64);

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, HEADER);
        let records: Vec<_> = rdr.records().map(Result::unwrap).collect();
        assert_eq!(records.len(), persons);
        assert_eq!(&records[0][0], "1");
        assert_eq!(&records[0][6], "Full-time worker");
        assert_eq!(&records[0][10], "12");
    }

    #[test]
    fn batches_do_not_change_the_file() {
        let households: Vec<_> = (1..=7).map(|i| household(i, 2)).collect();
        let mut outputs = Vec::new();
        for batch in [0, 1, 3, 100] {
            let mut writer = CsvResultWriter::from_writer(Vec::new()).unwrap();
            write_results(&households, &mut writer, batch).unwrap();
            outputs.push(writer.into_inner().unwrap());
        }
        assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn finish_is_idempotent() {
        let mut writer = CsvResultWriter::from_writer(Vec::new()).unwrap();
        writer.finish().unwrap();
        writer.finish().unwrap();
        let bytes = writer.into_inner().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap().trim_end(), HEADER.join(","));
    }

    #[test]
    fn iteration_in_the_file_name() {
        assert_eq!(result_path(Path::new("out/wsloc.csv"), 2), Path::new("out/wsloc_2.csv"));
        assert_eq!(result_path(Path::new("out/wsloc"), 0), Path::new("out/wsloc_0"));
    }
}

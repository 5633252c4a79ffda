//! Unit tests for ct-core primitives.

#[cfg(test)]
mod ids {
    use crate::{HouseholdId, PersonId, ZoneId};

    #[test]
    fn ordering_and_display() {
        assert!(HouseholdId(1) < HouseholdId(2));
        assert_eq!(PersonId(7).to_string(), "PersonId(7)");
    }

    #[test]
    fn parse_from_property_text() {
        assert_eq!(" 1003 ".parse::<HouseholdId>().unwrap(), HouseholdId(1003));
        assert_eq!(ZoneId(12).get(), 12);
        assert!("-4".parse::<HouseholdId>().is_err());
    }

    #[test]
    fn zone_validity() {
        assert!(ZoneId(1).is_valid());
        assert!(!ZoneId(0).is_valid());
        assert!(!ZoneId::INVALID.is_valid());
        assert_eq!(ZoneId::default(), ZoneId::INVALID);
    }
}

#[cfg(test)]
mod rng {
    use crate::{CoreError, HouseholdId, RandomStreamManager};

    #[test]
    fn same_household_same_sequence() {
        let m = RandomStreamManager::new(1234);
        let mut a = m.stream_for(HouseholdId(1001));
        let mut b = m.stream_for(HouseholdId(1001));
        for _ in 0..50 {
            assert_eq!(a.draw().to_bits(), b.draw().to_bits());
        }
        assert_eq!(a.count(), 50);
    }

    #[test]
    fn different_households_differ() {
        let m = RandomStreamManager::new(1);
        let mut a = m.stream_for(HouseholdId(1));
        let mut b = m.stream_for(HouseholdId(2));
        assert_ne!(a.draw(), b.draw());
    }

    #[test]
    fn draws_in_unit_interval() {
        let mut s = RandomStreamManager::new(9).stream_for(HouseholdId(3));
        for _ in 0..1000 {
            let v = s.draw();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn rewind_replays_exactly() {
        let mut s = RandomStreamManager::new(42).stream_for(HouseholdId(77));
        for _ in 0..5 {
            s.draw();
        }
        let after_five: Vec<f64> = (0..4).map(|_| s.draw()).collect();
        s.rewind_to(5).unwrap();
        assert_eq!(s.count(), 5);
        let replay: Vec<f64> = (0..4).map(|_| s.draw()).collect();
        assert_eq!(after_five, replay);
    }

    #[test]
    fn rewind_past_counter_is_error() {
        let mut s = RandomStreamManager::new(42).stream_for(HouseholdId(77));
        s.draw();
        let err = s.rewind_to(3).unwrap_err();
        assert!(matches!(
            err,
            CoreError::RewindPastCounter { requested: 3, current: 1, .. }
        ));
        // The stream is untouched by the failed rewind.
        assert_eq!(s.count(), 1);
    }

    #[test]
    fn restore_forward_matches_live_stream() {
        let m = RandomStreamManager::new(5);
        let mut live = m.stream_for(HouseholdId(10));
        for _ in 0..7 {
            live.draw();
        }
        let mut fresh = m.stream_for(HouseholdId(10));
        fresh.restore_to(7);
        assert_eq!(fresh.count(), 7);
        assert_eq!(fresh.draw().to_bits(), live.draw().to_bits());
    }
}

#[cfg(test)]
mod time {
    use crate::{FIRST_HOUR, LAST_HOUR, NUM_HOURS, TodAlternatives, hour_slot};

    #[test]
    fn standard_set_has_190_alternatives() {
        let alts = TodAlternatives::standard();
        assert_eq!(NUM_HOURS, 19);
        assert_eq!(alts.len(), 190);
        assert_eq!(alts.get(0), Some((FIRST_HOUR, FIRST_HOUR)));
        assert_eq!(alts.get(189), Some((LAST_HOUR, LAST_HOUR)));
        assert_eq!(alts.get(1), Some((5, 6)));
        assert_eq!(alts.index_of(6, 6), Some(19));
    }

    #[test]
    fn slots() {
        assert_eq!(hour_slot(5), Some(0));
        assert_eq!(hour_slot(23), Some(18));
        assert_eq!(hour_slot(4), None);
        assert_eq!(hour_slot(24), None);
    }

    #[test]
    fn from_pairs_drops_invalid() {
        let alts = TodAlternatives::from_pairs([(8, 17), (17, 8), (3, 9), (9, 9)]);
        assert_eq!(alts.len(), 2);
        assert_eq!(alts.starts(), &[8, 9]);
    }
}

#[cfg(test)]
mod purpose {
    use crate::{DcPurpose, PersonType, TourPurpose, income_segment};

    #[test]
    fn person_type_codes() {
        for pt in PersonType::ALL {
            assert_eq!(PersonType::from_code(pt.code()), Some(pt));
        }
        assert_eq!(PersonType::from_code(0), None);
        assert_eq!(PersonType::from_code(9), None);
    }

    #[test]
    fn income_segments() {
        assert_eq!(income_segment(0), 0);
        assert_eq!(income_segment(29_999), 0);
        assert_eq!(income_segment(30_000), 1);
        assert_eq!(income_segment(99_999), 2);
        assert_eq!(income_segment(250_000), 3);
        assert_eq!(DcPurpose::for_work(75_000), DcPurpose::WorkHigh);
    }

    #[test]
    fn usual_location_segments() {
        assert_eq!(
            DcPurpose::usual_location(PersonType::PartTimeWorker, 10_000),
            Some(DcPurpose::WorkLow)
        );
        assert_eq!(
            DcPurpose::usual_location(PersonType::DrivingStudent, 10_000),
            Some(DcPurpose::SchoolHigh)
        );
        assert_eq!(DcPurpose::usual_location(PersonType::Retired, 10_000), None);
    }

    #[test]
    fn pages_and_labels() {
        assert_eq!(DcPurpose::WorkLow.soa_page(), 1);
        assert_eq!(DcPurpose::AtWork.soa_page(), 15);
        assert_eq!(DcPurpose::WorkVeryHigh.dc_page(), 1);
        assert_eq!(DcPurpose::SchoolGrade.dc_page(), 4);
        for p in DcPurpose::ALL {
            assert_eq!(DcPurpose::from_label(p.label()), Some(p));
        }
        assert!(DcPurpose::SchoolGrade.is_mandatory());
        assert!(!DcPurpose::Shopping.is_mandatory());
        assert_eq!(
            DcPurpose::for_tour(TourPurpose::Escort, true),
            Some(DcPurpose::EscortKids)
        );
        assert_eq!(DcPurpose::for_tour(TourPurpose::Work, true), None);
    }
}

#[cfg(test)]
mod stage {
    use crate::{Checkpoints, Stage};

    #[test]
    fn order_and_abbrev() {
        assert_eq!(Stage::household_stages().len(), 20);
        assert_eq!(Stage::household_stages()[0], Stage::Ao);
        assert_eq!(Stage::Stl.index(), Stage::COUNT - 1);
        for st in Stage::ALL {
            assert_eq!(Stage::from_abbrev(st.abbrev()), Some(st));
        }
        assert_eq!(Stage::Ao.previous(), Some(Stage::Uwsl));
        assert_eq!(Stage::Uwsl.previous(), None);
    }

    #[test]
    fn prerequisites_point_backwards() {
        for st in Stage::ALL {
            for p in st.prerequisites() {
                assert!(p < &st, "{p} must precede {st}");
            }
        }
    }

    #[test]
    fn checkpoints_clear_and_resume() {
        let mut c = Checkpoints::default();
        c.set(Stage::Uwsl, 3);
        c.set(Stage::Ao, 4);
        c.set(Stage::Cdap, 6);
        c.set(Stage::Imtf, 8);
        assert_eq!(c.resume_count(Stage::Imtf), 6);
        assert_eq!(c.resume_count(Stage::Fp), 4);
        c.clear_from(Stage::Cdap);
        assert_eq!(c.get(Stage::Cdap), 0);
        assert_eq!(c.get(Stage::Imtf), 0);
        assert_eq!(c.get(Stage::Ao), 4);
    }
}

#[cfg(test)]
mod config {
    use std::io::Cursor;

    use crate::{CoreError, PropertyMap};

    const TEXT: &str = "\
# base scenario
Model.Random.Seed = 1234
RunModel.AutoOwnership = TRUE
Packet.Size: 500
! bang comment
Debug.Choice.Models.HouseholdIds = 5, 9 ,12
Empty.Key =
";

    #[test]
    fn parses_and_types() {
        let p = PropertyMap::from_reader(Cursor::new(TEXT)).unwrap();
        assert_eq!(p.get_u64("Model.Random.Seed", 0).unwrap(), 1234);
        assert!(p.get_bool("RunModel.AutoOwnership", false).unwrap());
        assert_eq!(p.get_usize("Packet.Size", 0).unwrap(), 500);
        assert_eq!(p.get_list::<u32>("Debug.Choice.Models.HouseholdIds").unwrap(), vec![5, 9, 12]);
        assert_eq!(p.get_usize("Missing", 7).unwrap(), 7);
        assert!(!p.contains("Empty.Key"));
    }

    #[test]
    fn bad_values_and_missing_required() {
        let p = PropertyMap::new().with("Packet.Size", "lots");
        assert!(matches!(p.get_usize("Packet.Size", 1), Err(CoreError::BadProperty { .. })));
        assert!(matches!(p.require_usize("Num.Threads"), Err(CoreError::MissingProperty(_))));
    }

    #[test]
    fn malformed_line() {
        let err = PropertyMap::from_reader(Cursor::new("no separator here\n")).unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
    }

    #[test]
    fn from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.properties");
        std::fs::write(&path, TEXT).unwrap();
        let p = PropertyMap::from_path(&path).unwrap();
        assert_eq!(p.get_string("Packet.Size", ""), "500");
    }
}

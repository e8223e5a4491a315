use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use chrono_tz::Tz;
use daybook::daily::{
    DailyLogStateMachine, Exercise, LanguagePractice, Mark, Reading, Reflection, UngatedEntry,
    UngatedField, WeekSummary,
};
use daybook::error::DaybookError;
use daybook::prayer::{
    AsrMadhab, CalculationMethod, GatedField, HygieneKind, Location, PrayerId, PrayerTimeEngine,
};
use daybook::store::{LogStore, MemoryStore, SqliteStore};
use tempfile::tempdir;

const USER: &str = "amina";

fn lagos_engine() -> PrayerTimeEngine {
    PrayerTimeEngine::new(Location::new(
        6.5244,
        3.3792,
        CalculationMethod::MuslimWorldLeague,
        AsrMadhab::Shafi,
        chrono_tz::Africa::Lagos,
    ))
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

/// Ten minutes after `field`'s window opens on the test date.
fn inside(engine: &PrayerTimeEngine, field: GatedField) -> DateTime<Tz> {
    engine.window_for(field, date()).unwrap().opens + Duration::minutes(10)
}

/// One minute after `field`'s window closes on the test date.
fn after(engine: &PrayerTimeEngine, field: GatedField) -> DateTime<Tz> {
    engine.window_for(field, date()).unwrap().closes + Duration::minutes(1)
}

#[test]
fn test_get_or_create_is_idempotent_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("daybook.db");
    let engine = lagos_engine();

    let first_id = {
        let store = SqliteStore::open(&path).unwrap();
        let machine = DailyLogStateMachine::get_or_create(&store, &engine, USER, date()).unwrap();
        let again = DailyLogStateMachine::get_or_create(&store, &engine, USER, date()).unwrap();
        assert_eq!(machine.log().id, again.log().id);
        machine.log().id
    };

    let store = SqliteStore::open(&path).unwrap();
    let machine = DailyLogStateMachine::get_or_create(&store, &engine, USER, date()).unwrap();
    assert_eq!(machine.log().id, first_id);
    assert_eq!(store.find_range(USER, date(), date()).unwrap().len(), 1);
}

#[test]
fn test_concurrent_get_or_create_yields_one_record() {
    let store = SqliteStore::open_in_memory().unwrap();
    let engine = lagos_engine();

    let ids: Vec<i64> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    DailyLogStateMachine::get_or_create(&store, &engine, USER, date())
                        .unwrap()
                        .log()
                        .id
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(store.find_range(USER, date(), date()).unwrap().len(), 1);
}

#[test]
fn test_toggle_round_trip_inside_window() {
    let store = MemoryStore::new();
    let engine = lagos_engine();
    let mut machine = DailyLogStateMachine::get_or_create(&store, &engine, USER, date()).unwrap();

    for field in GatedField::ALL {
        let now = inside(&engine, field);
        let before = machine.log().clone();

        machine.toggle_gated(field, &now).unwrap();
        assert!(machine.log().mark(field).is_done(), "{field} should be done");
        assert_eq!(
            machine.log().mark(field).timestamp(),
            Some(now.with_timezone(&chrono::Utc))
        );

        machine.toggle_gated(field, &now).unwrap();
        assert_eq!(machine.log(), &before, "{field} should round-trip");
    }
}

#[test]
fn test_toggle_after_window_fails_and_changes_nothing() {
    let store = MemoryStore::new();
    let engine = lagos_engine();
    let mut machine = DailyLogStateMachine::get_or_create(&store, &engine, USER, date()).unwrap();

    let field = GatedField::Prayer(PrayerId::Maghrib);
    let late = after(&engine, field);
    let err = machine.toggle_gated(field, &late).unwrap_err();
    assert!(
        err.to_string()
            .starts_with("maghrib can only be checked between")
    );
    assert!(matches!(
        err,
        DaybookError::IneligibleWindow { status, .. } if !status.is_open()
    ));
    assert_eq!(machine.log().prayer_maghrib, Mark::unset());
    let stored = store.find_by_key(USER, date()).unwrap().unwrap();
    assert_eq!(&stored, machine.log());
}

#[test]
fn test_travel_mode_lifts_every_window() {
    let store = MemoryStore::new();
    let engine = lagos_engine();
    let mut machine = DailyLogStateMachine::get_or_create(&store, &engine, USER, date()).unwrap();

    machine.toggle_travel_mode().unwrap();
    assert!(machine.log().travel_mode_active);

    let midnight = chrono_tz::Africa::Lagos
        .with_ymd_and_hms(2024, 6, 15, 0, 5, 0)
        .unwrap();
    for field in GatedField::ALL {
        machine.toggle_gated(field, &midnight).unwrap();
    }
    assert!(GatedField::ALL.iter().all(|f| machine.log().mark(*f).is_done()));

    // Leaving travel mode keeps what was recorded but restores the windows
    machine.toggle_travel_mode().unwrap();
    let hygiene = GatedField::Hygiene(HygieneKind::Morning);
    assert!(matches!(
        machine.toggle_gated(hygiene, &after(&engine, hygiene)),
        Err(DaybookError::IneligibleWindow { .. })
    ));
    assert!(machine.log().hygiene_morning.is_done());
}

#[test]
fn test_ungated_set_and_clear_on_sqlite() {
    let dir = tempdir().unwrap();
    let store = SqliteStore::open(&dir.path().join("daybook.db")).unwrap();
    let engine = lagos_engine();
    let mut machine = DailyLogStateMachine::get_or_create(&store, &engine, USER, date()).unwrap();

    machine
        .set_ungated(UngatedEntry::Exercise(Exercise {
            kind: "Gym".into(),
            duration_minutes: Some(45),
        }))
        .unwrap();
    machine
        .set_ungated(UngatedEntry::Reading(Reading {
            text: "Riyad as-Salihin".into(),
            perspective: Some("patience".into()),
        }))
        .unwrap();
    machine
        .set_ungated(UngatedEntry::Languages(LanguagePractice {
            languages: vec!["Yoruba".into()],
            tool: "Podcast".into(),
            activities: vec!["listening".into()],
        }))
        .unwrap();
    let mut reflection = Reflection::new(inside(&engine, GatedField::Prayer(PrayerId::Isha)).with_timezone(&chrono::Utc));
    reflection.presence = 8;
    reflection.gratitude = "family".into();
    machine
        .set_ungated(UngatedEntry::Reflection(reflection.clone()))
        .unwrap();

    let stored = store.find_by_id(machine.log().id).unwrap().unwrap();
    assert_eq!(&stored, machine.log());
    assert_eq!(stored.reflection, Some(reflection));

    machine.clear_ungated(UngatedField::Exercise).unwrap();
    machine.clear_ungated(UngatedField::Reading).unwrap();
    let stored = store.find_by_id(machine.log().id).unwrap().unwrap();
    assert_eq!(stored.exercise, None);
    assert_eq!(stored.reading, None);
    assert!(stored.languages_done());

    // Clearing an already clear field is a harmless no-op
    machine.clear_ungated(UngatedField::Environment).unwrap();
    assert!(!machine.log().environment_clean());
}

#[test]
fn test_store_outage_surfaces_persistence_error() {
    let store = MemoryStore::new();
    let engine = lagos_engine();
    let mut machine = DailyLogStateMachine::get_or_create(&store, &engine, USER, date()).unwrap();
    let before = machine.log().clone();

    store.set_offline(true);
    let fajr = GatedField::Prayer(PrayerId::Fajr);
    assert!(matches!(
        machine.toggle_gated(fajr, &inside(&engine, fajr)),
        Err(DaybookError::Persistence(_))
    ));
    assert!(matches!(
        machine.clear_ungated(UngatedField::Reflection),
        Err(DaybookError::Persistence(_))
    ));
    assert_eq!(machine.log(), &before);

    store.set_offline(false);
    machine.toggle_gated(fajr, &inside(&engine, fajr)).unwrap();
    assert!(machine.log().prayer_fajr.is_done());
}

#[test]
fn test_week_summary_over_stored_days() {
    let store = MemoryStore::new();
    let engine = lagos_engine();

    // Sunday 2024-06-09 through Tuesday 2024-06-11
    for day in 9..=11 {
        let date = NaiveDate::from_ymd_opt(2024, 6, day).unwrap();
        let mut machine = DailyLogStateMachine::get_or_create(&store, &engine, USER, date).unwrap();
        let fajr = GatedField::Prayer(PrayerId::Fajr);
        let opens = engine.window_for(fajr, date).unwrap().opens;
        machine.toggle_gated(fajr, &opens).unwrap();
        if day == 10 {
            machine
                .set_ungated(UngatedEntry::Environment(Default::default()))
                .unwrap();
        }
    }

    let week = WeekSummary::for_week(&store, USER, date()).unwrap();
    assert_eq!(week.days_logged, 3);
    assert_eq!(week.prayers.to_string(), "3/15");
    assert_eq!(week.hygiene.to_string(), "0/6");
    assert_eq!(week.environment.to_string(), "1/3");
}

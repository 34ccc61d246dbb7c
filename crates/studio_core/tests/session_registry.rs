use chrono::NaiveDate;
use studio_core::{
    headcount, session_status, toggle_half_day, HalfDay, Person, Registration, Role,
    SessionStatus, WorkSession,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Every press sequence of length `len`, encoded as bit patterns.
fn press_sequences(len: u32) -> impl Iterator<Item = Vec<HalfDay>> {
    (0..(1u32 << len)).map(move |mask| {
        (0..len)
            .map(|bit| {
                if mask & (1 << bit) == 0 {
                    HalfDay::Morning
                } else {
                    HalfDay::Afternoon
                }
            })
            .collect()
    })
}

fn xor_fold(presses: &[HalfDay]) -> SessionStatus {
    presses
        .iter()
        .fold(SessionStatus::default(), |mut status, half| {
            match half {
                HalfDay::Morning => status.morning = !status.morning,
                HalfDay::Afternoon => status.afternoon = !status.afternoon,
            }
            status
        })
}

#[test]
fn toggle_sequences_match_xor_fold_and_keep_key_unique() {
    let day = date(2024, 3, 4);
    for len in 0..=6 {
        for presses in press_sequences(len) {
            let mut regs: Vec<Registration> = Vec::new();
            for half in &presses {
                regs = toggle_half_day(&regs, "B", day, *half, "B", false);
            }

            assert_eq!(
                session_status(&regs, "B", day),
                xor_fold(&presses),
                "presses {presses:?}"
            );
            let records = regs.iter().filter(|reg| reg.matches("B", day)).count();
            assert!(records <= 1, "presses {presses:?} left {records} records");
            assert!(
                regs.iter().all(|reg| reg.session != WorkSession::Off),
                "OFF must never be stored"
            );
        }
    }
}

#[test]
fn pressing_both_halves_yields_full_day_in_either_order() {
    let day = date(2024, 3, 5);
    let morning_first = toggle_half_day(
        &toggle_half_day(&[], "B", day, HalfDay::Morning, "B", false),
        "B",
        day,
        HalfDay::Afternoon,
        "B",
        false,
    );
    let afternoon_first = toggle_half_day(
        &toggle_half_day(&[], "B", day, HalfDay::Afternoon, "B", false),
        "B",
        day,
        HalfDay::Morning,
        "B",
        false,
    );

    assert_eq!(morning_first.len(), 1);
    assert_eq!(morning_first[0].session, WorkSession::FullDay);
    assert_eq!(afternoon_first[0].session, WorkSession::FullDay);
}

#[test]
fn scenario_staff_member_toggles_morning_twice() {
    let roster = vec![
        Person::new("A", "Anh", Role::Owner),
        Person::new("B", "Bao", Role::Designer),
    ];
    let b = roster[1].actor();
    let day = date(2024, 3, 4);

    let once = toggle_half_day(&[], "B", day, HalfDay::Morning, &b.person_id, b.is_admin);
    assert_eq!(once.len(), 1);
    assert_eq!(once[0].person_id, "B");
    assert_eq!(once[0].date, day);
    assert_eq!(once[0].session, WorkSession::Morning);

    let twice = toggle_half_day(&once, "B", day, HalfDay::Morning, &b.person_id, b.is_admin);
    assert!(twice.is_empty());
}

#[test]
fn unauthorized_toggle_leaves_collection_unchanged() {
    let day = date(2024, 3, 4);
    let regs = vec![
        Registration::with_id("wr-1", "A", day, WorkSession::FullDay),
        Registration::with_id("wr-2", "C", day, WorkSession::Afternoon),
    ];

    for half in [HalfDay::Morning, HalfDay::Afternoon] {
        let next = toggle_half_day(&regs, "C", day, half, "B", false);
        assert_eq!(next, regs);
        let next = toggle_half_day(&regs, "D", day, half, "B", false);
        assert_eq!(next, regs);
    }
}

#[test]
fn admin_may_toggle_anyone() {
    let day = date(2024, 3, 6);
    let next = toggle_half_day(&[], "B", day, HalfDay::Afternoon, "A", true);
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].person_id, "B");
    assert_eq!(next[0].session, WorkSession::Afternoon);
}

#[test]
fn toggles_on_different_keys_commute() {
    let monday = date(2024, 3, 4);
    let tuesday = date(2024, 3, 5);

    let a = toggle_half_day(
        &toggle_half_day(&[], "B", monday, HalfDay::Morning, "A", true),
        "C",
        tuesday,
        HalfDay::Afternoon,
        "A",
        true,
    );
    let b = toggle_half_day(
        &toggle_half_day(&[], "C", tuesday, HalfDay::Afternoon, "A", true),
        "B",
        monday,
        HalfDay::Morning,
        "A",
        true,
    );

    for (person, day) in [("B", monday), ("C", tuesday)] {
        assert_eq!(session_status(&a, person, day), session_status(&b, person, day));
    }
}

#[test]
fn headcount_matches_recount_from_status() {
    let people = ["A", "B", "C", "D", "E"];
    let days: Vec<NaiveDate> = date(2024, 3, 4).iter_days().take(6).collect();

    let mut regs: Vec<Registration> = Vec::new();
    for (p_idx, person) in people.iter().enumerate() {
        for (d_idx, day) in days.iter().enumerate() {
            if (p_idx + d_idx) % 2 == 0 {
                regs = toggle_half_day(&regs, person, *day, HalfDay::Morning, "A", true);
            }
            if (p_idx * d_idx) % 3 == 0 {
                regs = toggle_half_day(&regs, person, *day, HalfDay::Afternoon, "A", true);
            }
        }
    }

    for day in &days {
        let count = headcount(&regs, *day);
        let morning = people
            .iter()
            .filter(|person| session_status(&regs, person, *day).morning)
            .count();
        let afternoon = people
            .iter()
            .filter(|person| session_status(&regs, person, *day).afternoon)
            .count();
        assert_eq!(count.morning_count, morning);
        assert_eq!(count.afternoon_count, afternoon);
    }
}

#[test]
fn absent_key_reports_off() {
    assert_eq!(
        session_status(&[], "nobody", date(2024, 3, 4)),
        SessionStatus {
            morning: false,
            afternoon: false
        }
    );
    let count = headcount(&[], date(2024, 3, 4));
    assert_eq!((count.morning_count, count.afternoon_count), (0, 0));
}

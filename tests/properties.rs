//! Property tests over arbitrary action sequences

use chrono::{DateTime, Days, Duration, NaiveDate, TimeZone, Utc};
use kesher_core::badges::level_for_xp;
use kesher_core::health::HealthState;
use kesher_core::notifications::{NewNotification, NotificationKind, NotificationState};
use kesher_core::risk::risk_level;
use kesher_core::types::{CheckIn, CheckInDraft, Mood, RiskLevel, SleepSample};
use proptest::prelude::*;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
}

#[derive(Debug, Clone)]
enum NotificationOp {
    Add { expires_in_minutes: Option<i64> },
    MarkAsRead(usize),
    Remove(usize),
    MarkAllAsRead,
    ClearExpired,
}

fn notification_op() -> impl Strategy<Value = NotificationOp> {
    prop_oneof![
        3 => proptest::option::of(-30i64..30).prop_map(|expires_in_minutes| NotificationOp::Add { expires_in_minutes }),
        2 => any::<usize>().prop_map(NotificationOp::MarkAsRead),
        1 => any::<usize>().prop_map(NotificationOp::Remove),
        1 => Just(NotificationOp::MarkAllAsRead),
        1 => Just(NotificationOp::ClearExpired),
    ]
}

fn mood() -> impl Strategy<Value = Mood> {
    prop_oneof![
        Just(Mood::Great),
        Just(Mood::Good),
        Just(Mood::Okay),
        Just(Mood::NotGood),
        Just(Mood::Bad),
    ]
}

proptest! {
    #[test]
    fn unread_flag_tracks_entries(ops in proptest::collection::vec(notification_op(), 0..40)) {
        let mut state = NotificationState::new();
        let now = start();

        for op in ops {
            match op {
                NotificationOp::Add { expires_in_minutes } => {
                    let mut new = NewNotification::new(NotificationKind::SystemMessage, "t", "m");
                    if let Some(minutes) = expires_in_minutes {
                        new = new.expires_at(now + Duration::minutes(minutes));
                    }
                    state.add(new, now);
                }
                NotificationOp::MarkAsRead(i) => {
                    if !state.notifications.is_empty() {
                        let id = state.notifications[i % state.notifications.len()].id;
                        state.mark_as_read(id);
                    }
                }
                NotificationOp::Remove(i) => {
                    if !state.notifications.is_empty() {
                        let id = state.notifications[i % state.notifications.len()].id;
                        state.remove(id);
                    }
                }
                NotificationOp::MarkAllAsRead => state.mark_all_as_read(),
                NotificationOp::ClearExpired => state.clear_expired(now),
            }

            let expected = state.notifications.iter().any(|n| !n.read);
            prop_assert_eq!(state.has_unread, expected);
        }
    }

    /// Each step either stays on the same day or advances by one.
    #[test]
    fn longest_streak_monotonic_without_gaps(steps in proptest::collection::vec((0u64..=1, mood()), 1..30)) {
        let mut state = HealthState::new();
        let mut now = start();
        let mut previous_longest = 0;

        for (advance, mood) in steps {
            now = now + Duration::days(advance as i64);
            state.add_check_in(CheckInDraft::new(now.date_naive(), mood), now);

            prop_assert!(state.longest_streak() >= state.current_streak(now.date_naive()));
            prop_assert!(state.longest_streak() >= previous_longest);
            previous_longest = state.longest_streak();
        }
    }

    #[test]
    fn five_bad_days_is_high(hours in proptest::collection::vec(0.0f64..12.0, 0..6)) {
        let today = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        let check_ins: Vec<CheckIn> = (0..5u64)
            .map(|n| {
                let date = today.checked_sub_days(Days::new(n)).unwrap();
                CheckInDraft::new(date, Mood::Bad)
                    .into_check_in(Utc.from_utc_datetime(&date.and_hms_opt(9, 0, 0).unwrap()))
            })
            .collect();
        let sleep: Vec<SleepSample> = hours
            .iter()
            .enumerate()
            .map(|(n, &h)| SleepSample::new(today.checked_sub_days(Days::new(n as u64)).unwrap(), h, None))
            .collect();

        prop_assert_eq!(risk_level(&check_ins, &sleep, today), RiskLevel::High);
    }

    #[test]
    fn four_days_absent_is_high(m in mood()) {
        let today = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        let date = today.checked_sub_days(Days::new(4)).unwrap();
        let check_in = CheckInDraft::new(date, m)
            .into_check_in(Utc.from_utc_datetime(&date.and_hms_opt(9, 0, 0).unwrap()));

        prop_assert_eq!(risk_level(&[check_in], &[], today), RiskLevel::High);
    }

    #[test]
    fn level_is_monotonic_in_xp(a in 0u32..10_000, b in 0u32..10_000) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(level_for_xp(low) <= level_for_xp(high));
        prop_assert!((1..=10).contains(&level_for_xp(high)));
    }
}

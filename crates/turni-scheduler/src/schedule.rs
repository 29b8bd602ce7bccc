use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};

/// Last given weekday of a month (e.g. the last Sunday of March).
fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let last_day = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap()
    } - Duration::days(1);
    let back = (7 + last_day.weekday().num_days_from_monday()
        - weekday.num_days_from_monday())
        % 7;
    last_day - Duration::days(i64::from(back))
}

/// UTC offset of Europe/Rome at `at`.
///
/// EU rule: CEST (UTC+2) from the last Sunday of March, 01:00 UTC, to the
/// last Sunday of October, 01:00 UTC; CET (UTC+1) otherwise. The pack has
/// no tz database crate, and a single fixed zone does not justify one.
pub fn rome_utc_offset(at: DateTime<Utc>) -> FixedOffset {
    let year = at.year();
    let dst_start = Utc
        .from_utc_datetime(
            &last_weekday_of_month(year, 3, Weekday::Sun)
                .and_hms_opt(1, 0, 0)
                .unwrap(),
        );
    let dst_end = Utc
        .from_utc_datetime(
            &last_weekday_of_month(year, 10, Weekday::Sun)
                .and_hms_opt(1, 0, 0)
                .unwrap(),
        );
    if at >= dst_start && at < dst_end {
        FixedOffset::east_opt(2 * 3600).unwrap()
    } else {
        FixedOffset::east_opt(3600).unwrap()
    }
}

/// Convert a local Rome time-of-day to its UTC time-of-day, using the
/// offset in effect at `at`. Wraps around midnight when needed.
pub fn to_utc_fire_time(local: NaiveTime, at: DateTime<Utc>) -> NaiveTime {
    let offset = rome_utc_offset(at);
    local
        .overflowing_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
        .0
}

/// Next UTC instant strictly after `from` whose date's weekday (0 = Monday
/// … 6 = Sunday) is in `weekdays` and whose time is `fire_time_utc`.
///
/// `None` only for an empty weekday set.
pub fn next_fire(
    weekdays: &BTreeSet<u8>,
    fire_time_utc: NaiveTime,
    from: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if weekdays.is_empty() {
        return None;
    }

    // Today's candidate may have already passed, so scan up to 8 days out.
    for days_ahead in 0..=7 {
        let date = from.date_naive() + Duration::days(days_ahead);
        let dow = date.weekday().num_days_from_monday() as u8;
        if !weekdays.contains(&dow) {
            continue;
        }
        let candidate = Utc.from_utc_datetime(&date.and_time(fire_time_utc));
        if candidate > from {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        format!("{s}Z").parse().unwrap()
    }

    #[test]
    fn rome_offset_winter_and_summer() {
        assert_eq!(
            rome_utc_offset(utc("2026-01-15T12:00:00")),
            FixedOffset::east_opt(3600).unwrap()
        );
        assert_eq!(
            rome_utc_offset(utc("2026-07-15T12:00:00")),
            FixedOffset::east_opt(7200).unwrap()
        );
    }

    #[test]
    fn rome_offset_switch_days() {
        // 2026: DST starts Sunday March 29, ends Sunday October 25 (01:00 UTC).
        assert_eq!(
            rome_utc_offset(utc("2026-03-29T00:59:00")),
            FixedOffset::east_opt(3600).unwrap()
        );
        assert_eq!(
            rome_utc_offset(utc("2026-03-29T01:00:00")),
            FixedOffset::east_opt(7200).unwrap()
        );
        assert_eq!(
            rome_utc_offset(utc("2026-10-25T00:59:00")),
            FixedOffset::east_opt(7200).unwrap()
        );
        assert_eq!(
            rome_utc_offset(utc("2026-10-25T01:00:00")),
            FixedOffset::east_opt(3600).unwrap()
        );
    }

    #[test]
    fn fire_time_conversion_summer() {
        // 19:00 Rome in August (CEST) is 17:00 UTC.
        let t = to_utc_fire_time(
            NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            utc("2026-08-06T10:00:00"),
        );
        assert_eq!(t, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
    }

    #[test]
    fn fire_time_conversion_wraps_before_midnight() {
        // 00:30 Rome in summer is 22:30 UTC the previous day; the time-of-day
        // simply wraps.
        let t = to_utc_fire_time(
            NaiveTime::from_hms_opt(0, 30, 0).unwrap(),
            utc("2026-08-06T10:00:00"),
        );
        assert_eq!(t, NaiveTime::from_hms_opt(22, 30, 0).unwrap());
    }

    #[test]
    fn next_fire_same_day_when_time_still_ahead() {
        // 2026-08-06 is a Thursday (weekday 3).
        let weekdays: BTreeSet<u8> = [3].into_iter().collect();
        let fire = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        let next = next_fire(&weekdays, fire, utc("2026-08-06T10:00:00")).unwrap();
        assert_eq!(next, utc("2026-08-06T17:00:00"));
    }

    #[test]
    fn next_fire_skips_to_next_week_when_passed() {
        let weekdays: BTreeSet<u8> = [3].into_iter().collect();
        let fire = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        let next = next_fire(&weekdays, fire, utc("2026-08-06T17:00:00")).unwrap();
        assert_eq!(next, utc("2026-08-13T17:00:00"));
    }

    #[test]
    fn next_fire_picks_nearest_enabled_weekday() {
        // Monday and Friday enabled; from a Thursday evening → Friday.
        let weekdays: BTreeSet<u8> = [0, 4].into_iter().collect();
        let fire = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        let next = next_fire(&weekdays, fire, utc("2026-08-06T18:00:00")).unwrap();
        assert_eq!(next, utc("2026-08-07T17:00:00"));
    }

    #[test]
    fn next_fire_empty_weekdays_is_none() {
        let weekdays = BTreeSet::new();
        let fire = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        assert_eq!(next_fire(&weekdays, fire, utc("2026-08-06T10:00:00")), None);
    }

    #[test]
    fn last_weekday_of_month_examples() {
        assert_eq!(
            last_weekday_of_month(2026, 3, Weekday::Sun),
            NaiveDate::from_ymd_opt(2026, 3, 29).unwrap()
        );
        assert_eq!(
            last_weekday_of_month(2026, 10, Weekday::Sun),
            NaiveDate::from_ymd_opt(2026, 10, 25).unwrap()
        );
        assert_eq!(
            last_weekday_of_month(2025, 12, Weekday::Wed),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
    }
}

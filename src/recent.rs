use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::tracker::RecentMatch;

const NAIVE_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecentMatchTotals {
    pub kills: u64,
    pub matches: u64,
    pub wins: u64,
}

/// Saturates at the earliest representable instant for oversized windows.
pub fn window_start(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parses a `dateCollected` value. Anything unreadable lands one day before
/// the window so it never counts as recent.
pub fn parse_collected_date(raw: &str, now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    let fallback = window_start(now, days)
        .checked_sub_signed(Duration::days(1))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    parse_date(raw.trim()).unwrap_or(fallback)
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    // The tracker sends naive timestamps in UTC.
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

pub fn is_recent(record: &RecentMatch, now: DateTime<Utc>, days: u32) -> bool {
    let collected = parse_collected_date(&record.date_collected, now, days);
    // A saturated window leaves no room below it for the sentinel.
    collected >= window_start(now, days) && collected > DateTime::<Utc>::MIN_UTC
}

pub fn recent_match_totals(
    matches: &[RecentMatch],
    now: DateTime<Utc>,
    days: u32,
) -> RecentMatchTotals {
    matches
        .iter()
        .filter(|record| is_recent(record, now, days))
        .fold(RecentMatchTotals::default(), |mut totals, record| {
            totals.kills += u64::from(record.kills);
            totals.matches += u64::from(record.matches);
            totals.wins += u64::from(record.top1);
            totals
        })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};

    use super::{
        is_recent, parse_collected_date, recent_match_totals, window_start, RecentMatchTotals,
    };
    use crate::tracker::RecentMatch;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 18, 30, 0).unwrap()
    }

    fn record(date: &str, kills: u32, matches: u32, top1: u32) -> RecentMatch {
        RecentMatch {
            date_collected: date.to_owned(),
            kills,
            matches,
            top1,
        }
    }

    fn rfc3339(at: DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    #[test]
    fn boundary_of_window_is_included() {
        let boundary = rfc3339(now() - Duration::days(1));
        assert!(is_recent(&record(&boundary, 0, 0, 0), now(), 1));

        let boundary = rfc3339(now() - Duration::days(3));
        assert!(is_recent(&record(&boundary, 0, 0, 0), now(), 3));
    }

    #[test]
    fn one_day_past_window_is_excluded() {
        let stale = rfc3339(now() - Duration::days(2));
        assert!(!is_recent(&record(&stale, 0, 0, 0), now(), 1));
        let just_outside = rfc3339(now() - Duration::days(1) - Duration::seconds(1));
        assert!(!is_recent(&record(&just_outside, 0, 0, 0), now(), 1));
    }

    #[test]
    fn unparsable_dates_are_never_recent() {
        for days in [0, 1, 7, 365] {
            for raw in ["", "yesterday", "2026-13-40T99:00:00", "14/03/2026"] {
                assert!(!is_recent(&record(raw, 1, 1, 1), now(), days), "{raw} / {days}");
            }
        }
    }

    #[test]
    fn unparsable_date_maps_one_day_before_window() {
        assert_eq!(
            parse_collected_date("garbage", now(), 1),
            window_start(now(), 1) - Duration::days(1)
        );
    }

    #[test]
    fn accepts_naive_tracker_timestamps_as_utc() {
        assert_eq!(
            parse_collected_date("2026-03-14T01:28:19.81", now(), 1),
            Utc.with_ymd_and_hms(2026, 3, 14, 1, 28, 19).unwrap() + Duration::milliseconds(810)
        );
        assert_eq!(
            parse_collected_date("2026-03-14 01:28:19", now(), 1),
            Utc.with_ymd_and_hms(2026, 3, 14, 1, 28, 19).unwrap()
        );
        assert_eq!(
            parse_collected_date("2026-03-14", now(), 1),
            Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_collected_date("2026-03-14T10:00:00+02:00", now(), 1),
            Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn totals_sum_only_recent_matches() {
        let matches = vec![
            record(&rfc3339(now()), 3, 1, 1),
            record(&rfc3339(now() - Duration::hours(5)), 7, 2, 0),
            record("2026-03-14T12:00:00", 2, 1, 1),
            record(&rfc3339(now() - Duration::days(10)), 50, 9, 4),
            record("not a date", 11, 3, 2),
        ];
        let totals = recent_match_totals(&matches, now(), 1);
        assert_eq!(totals.kills, 12);
        assert_eq!(totals.matches, 4);
        assert_eq!(totals.wins, 2);
    }

    #[test]
    fn oversized_window_saturates_instead_of_overflowing() {
        assert_eq!(window_start(now(), u32::MAX), DateTime::<Utc>::MIN_UTC);
        assert_eq!(
            parse_collected_date("garbage", now(), 100_000_000),
            DateTime::<Utc>::MIN_UTC
        );

        let matches = vec![
            record("1999-01-01T00:00:00", 4, 2, 1),
            record(&rfc3339(now()), 1, 1, 0),
            record("garbage", 100, 100, 100),
        ];
        let totals = recent_match_totals(&matches, now(), 100_000_000);
        assert_eq!(
            totals,
            RecentMatchTotals {
                kills: 5,
                matches: 3,
                wins: 1,
            }
        );
    }

    #[test]
    fn totals_are_zero_without_recent_matches() {
        let matches = vec![record("bad", 4, 1, 1)];
        let totals = recent_match_totals(&matches, now(), 1);
        assert_eq!(totals, RecentMatchTotals::default());
        assert_eq!(recent_match_totals(&[], now(), 1), RecentMatchTotals::default());
    }
}

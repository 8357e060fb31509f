//! Consensus meeting time from submitted availability.
//!
//! Every submitted instant is one vote. The instant with the most votes
//! wins; among equally popular instants the chronologically earliest wins,
//! so the result does not depend on input order. With no votes at all the
//! meeting falls back to the next occurrence of a fixed local weekday and
//! hour (Friday 19:00 by default).

use std::collections::BTreeMap;

use chrono::{Datelike, DateTime, Days, NaiveDateTime, TimeDelta, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use super::config::SearchSettings;

/// How the meeting time was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusTime {
    /// Most-voted instant and its vote count.
    Voted { at: DateTime<Utc>, votes: usize },
    /// No availability was submitted; the fixed fallback applies.
    Fallback(DateTime<Utc>),
}

impl ConsensusTime {
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            ConsensusTime::Voted { at, .. } => *at,
            ConsensusTime::Fallback(at) => *at,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ConsensusTime::Fallback(_))
    }
}

/// Pick the most-voted instant, earliest on ties.
///
/// Returns `None` for an empty input.
pub fn most_voted<I>(instants: I) -> Option<(DateTime<Utc>, usize)>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut counts: BTreeMap<DateTime<Utc>, usize> = BTreeMap::new();
    for at in instants {
        *counts.entry(at).or_default() += 1;
    }

    // BTreeMap iterates chronologically, so a strict `>` keeps the earliest of a tie.
    let mut best: Option<(DateTime<Utc>, usize)> = None;
    for (at, votes) in counts {
        if best.is_none_or(|(_, best_votes)| votes > best_votes) {
            best = Some((at, votes));
        }
    }
    best
}

/// The next `weekday` at `hour`:00 local time, strictly after today.
///
/// If today is already `weekday`, the result is one week out. Computed from
/// `now`, so repeated calls within the same local day agree.
pub fn next_weekday_at(now: DateTime<Utc>, zone: Tz, weekday: Weekday, hour: u32) -> DateTime<Utc> {
    let local = now.with_timezone(&zone);
    let today = local.date_naive();

    let current = i64::from(today.weekday().num_days_from_sunday());
    let target = i64::from(weekday.num_days_from_sunday());
    let ahead = match (target - current).rem_euclid(7) {
        0 => 7,
        n => n,
    };

    let day = today
        .checked_add_days(Days::new(ahead as u64))
        .unwrap_or(today);
    let naive = day
        .and_hms_opt(hour.min(23), 0, 0)
        .unwrap_or_else(|| day.and_time(Default::default()));

    localize(zone, naive)
}

/// Resolve a local wall-clock time, stepping past a DST gap if needed.
fn localize(zone: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    zone.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            zone.from_local_datetime(&(naive + TimeDelta::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Resolve the meeting time from all submitted instants.
pub fn resolve(
    instants: &[DateTime<Utc>],
    now: DateTime<Utc>,
    zone: Tz,
    settings: &SearchSettings,
) -> ConsensusTime {
    match most_voted(instants.iter().copied()) {
        Some((at, votes)) => ConsensusTime::Voted { at, votes },
        None => ConsensusTime::Fallback(next_weekday_at(
            now,
            zone,
            settings.fallback_weekday,
            settings.fallback_hour,
        )),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn instant() -> impl Strategy<Value = DateTime<Utc>> {
        // A handful of distinct slots so that ties and repeats are common
        (0i64..6).prop_map(|slot| {
            DateTime::from_timestamp(1_704_067_200 + slot * 3600, 0).unwrap_or_default()
        })
    }

    proptest! {
        /// The winner has the maximum count and is the earliest such instant
        #[test]
        fn winner_is_earliest_of_most_frequent(votes in prop::collection::vec(instant(), 1..30)) {
            let (winner, count) = most_voted(votes.iter().copied()).unwrap();
            let max = votes.iter().map(|v| votes.iter().filter(|w| *w == v).count()).max().unwrap();
            prop_assert_eq!(count, max);
            let earliest = votes
                .iter()
                .filter(|v| votes.iter().filter(|w| w == v).count() == max)
                .min()
                .copied()
                .unwrap();
            prop_assert_eq!(winner, earliest);
        }

        /// Input order never changes the result
        #[test]
        fn order_independent(mut votes in prop::collection::vec(instant(), 1..30)) {
            let forward = most_voted(votes.iter().copied());
            votes.reverse();
            prop_assert_eq!(forward, most_voted(votes.iter().copied()));
        }
    }
}

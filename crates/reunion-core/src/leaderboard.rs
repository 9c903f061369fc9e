use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Attempts beyond this round count are kept in history but never ranked.
pub const MAX_RANKED_ATTEMPT: u32 = 3;

/// Entries shown per leaderboard bucket.
pub const BUCKET_SIZE: usize = 3;

/// One stored game round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessAttempt {
    pub id: i64,
    pub distance_km: f64,
    pub attempt_number: u32,
    pub created_at: DateTime<Utc>,
}

/// A numeric column as it may come back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawNumber {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Untyped game-score row, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttempt {
    pub id: Option<i64>,
    pub distance_km: Option<RawNumber>,
    pub attempt_number: Option<RawNumber>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AttemptParseError {
    #[error("missing field `{0}`")]
    Missing(&'static str),
    #[error("field `{0}` is not a number")]
    NotANumber(&'static str),
    #[error("distance {0} is negative or not finite")]
    BadDistance(f64),
    #[error("attempt number {0} is not positive")]
    BadAttemptNumber(i64),
}

impl TryFrom<RawAttempt> for GuessAttempt {
    type Error = AttemptParseError;

    fn try_from(raw: RawAttempt) -> Result<Self, Self::Error> {
        let id = raw.id.ok_or(AttemptParseError::Missing("id"))?;
        let distance_km = raw
            .distance_km
            .ok_or(AttemptParseError::Missing("distanceKm"))?
            .as_f64()
            .ok_or(AttemptParseError::NotANumber("distanceKm"))?;
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(AttemptParseError::BadDistance(distance_km));
        }
        let attempt = raw
            .attempt_number
            .ok_or(AttemptParseError::Missing("attemptNumber"))?
            .as_i64()
            .ok_or(AttemptParseError::NotANumber("attemptNumber"))?;
        let attempt_number = u32::try_from(attempt)
            .ok()
            .filter(|n| *n > 0)
            .ok_or(AttemptParseError::BadAttemptNumber(attempt))?;
        let created_at = raw
            .created_at
            .ok_or(AttemptParseError::Missing("createdAt"))?;

        Ok(Self {
            id,
            distance_km,
            attempt_number,
            created_at,
        })
    }
}

/// Convert stored rows into typed attempts, dropping malformed rows.
pub fn parse_history<I>(rows: I) -> Vec<GuessAttempt>
where
    I: IntoIterator<Item = RawAttempt>,
{
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            match GuessAttempt::try_from(row) {
                Ok(attempt) => Some(attempt),
                Err(e) => {
                    tracing::warn!(?id, error = %e, "Skipping malformed game score row");
                    None
                },
            }
        })
        .collect()
}

/// Attempts sharing the same round count, best first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardBucket {
    pub attempt_number: u32,
    pub entries: Vec<GuessAttempt>,
}

/// Rank the full history into per-round buckets.
///
/// Only rounds 1..=3 are shown. Within a bucket, closer guesses come first;
/// ties go to the earlier attempt. Each bucket keeps its top three.
pub fn rank_leaderboard(history: &[GuessAttempt]) -> Vec<LeaderboardBucket> {
    let mut groups: BTreeMap<u32, Vec<GuessAttempt>> = BTreeMap::new();
    for attempt in history {
        if !(1..=MAX_RANKED_ATTEMPT).contains(&attempt.attempt_number)
            || !attempt.distance_km.is_finite()
        {
            continue;
        }
        groups
            .entry(attempt.attempt_number)
            .or_default()
            .push(attempt.clone());
    }

    groups
        .into_iter()
        .map(|(attempt_number, mut entries)| {
            entries.sort_by(|a, b| {
                a.distance_km
                    .total_cmp(&b.distance_km)
                    .then_with(|| a.created_at.cmp(&b.created_at))
                    .then_with(|| a.id.cmp(&b.id))
            });
            entries.truncate(BUCKET_SIZE);
            LeaderboardBucket {
                attempt_number,
                entries,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_attempts;
    use chrono::TimeZone;

    fn attempt(id: i64, distance_km: f64, attempt_number: u32) -> GuessAttempt {
        GuessAttempt {
            id,
            distance_km,
            attempt_number,
            created_at: Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
        }
    }

    fn distances(bucket: &LeaderboardBucket) -> Vec<f64> {
        bucket.entries.iter().map(|e| e.distance_km).collect()
    }

    #[test]
    fn empty_history_has_no_buckets() {
        assert!(rank_leaderboard(&[]).is_empty());
    }

    #[test]
    fn excludes_rounds_beyond_three() {
        let history: Vec<_> = (1..=5).map(|n| attempt(n as i64, 1.0, n)).collect();
        let buckets = rank_leaderboard(&history);
        let numbers: Vec<u32> = buckets.iter().map(|b| b.attempt_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn buckets_are_ordered_by_attempt_number() {
        let history = vec![attempt(1, 5.0, 3), attempt(2, 2.0, 1), attempt(3, 9.0, 2)];
        let numbers: Vec<u32> = rank_leaderboard(&history)
            .iter()
            .map(|b| b.attempt_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn truncates_to_top_three_with_stable_ties() {
        let history = make_attempts(&[(3.0, 1), (1.0, 1), (4.0, 1), (1.0, 1), (5.0, 1)]);
        let buckets = rank_leaderboard(&history);
        assert_eq!(buckets.len(), 1);
        assert_eq!(distances(&buckets[0]), vec![1.0, 1.0, 3.0]);
        // The two 1 km guesses keep their submission order
        let ids: Vec<i64> = buckets[0].entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 4, 1]);
    }

    #[test]
    fn later_rounds_dropped_before_ranking() {
        let history = make_attempts(&[
            (3.0, 1),
            (1.0, 1),
            (4.0, 1),
            (1.0, 1),
            (5.0, 1),
            (2.0, 4),
            (2.0, 5),
        ]);
        let buckets = rank_leaderboard(&history);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].attempt_number, 1);
        assert_eq!(distances(&buckets[0]), vec![1.0, 1.0, 3.0]);
    }

    #[test]
    fn tie_broken_by_created_at_not_input_order() {
        let mut late = attempt(1, 2.0, 2);
        late.created_at = Utc.timestamp_opt(1_800_000_000, 0).unwrap();
        let early = attempt(2, 2.0, 2);
        let buckets = rank_leaderboard(&[late, early]);
        let ids: Vec<i64> = buckets[0].entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn entries_non_decreasing_within_bucket() {
        let history: Vec<_> = (0..20)
            .map(|i| attempt(i, ((i * 7919) % 13) as f64, (i % 3) as u32 + 1))
            .collect();
        for bucket in rank_leaderboard(&history) {
            let d = distances(&bucket);
            assert!(d.windows(2).all(|w| w[0] <= w[1]), "{d:?}");
            assert!(d.len() <= BUCKET_SIZE);
        }
    }

    #[test]
    fn zero_attempt_number_is_skipped() {
        let buckets = rank_leaderboard(&[attempt(1, 1.0, 0), attempt(2, 2.0, 1)]);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].entries[0].id, 2);
    }

    #[test]
    fn raw_attempt_accepts_string_numbers() {
        let raw: RawAttempt = serde_json::from_value(serde_json::json!({
            "id": 7,
            "distanceKm": "12.5",
            "attemptNumber": "2",
            "createdAt": "2024-06-01T12:00:00Z",
        }))
        .unwrap();
        let parsed = GuessAttempt::try_from(raw).unwrap();
        assert_eq!(parsed.distance_km, 12.5);
        assert_eq!(parsed.attempt_number, 2);
    }

    #[test]
    fn raw_attempt_rejects_bad_rows() {
        let base = RawAttempt {
            id: Some(1),
            distance_km: Some(RawNumber::Float(1.0)),
            attempt_number: Some(RawNumber::Int(1)),
            created_at: Some(Utc.timestamp_opt(0, 0).unwrap()),
        };
        assert!(GuessAttempt::try_from(base.clone()).is_ok());

        let missing = RawAttempt {
            attempt_number: None,
            ..base.clone()
        };
        assert_eq!(
            GuessAttempt::try_from(missing),
            Err(AttemptParseError::Missing("attemptNumber"))
        );

        let negative = RawAttempt {
            distance_km: Some(RawNumber::Float(-3.0)),
            ..base.clone()
        };
        assert!(matches!(
            GuessAttempt::try_from(negative),
            Err(AttemptParseError::BadDistance(_))
        ));

        let garbage = RawAttempt {
            distance_km: Some(RawNumber::Text("far".to_string())),
            ..base.clone()
        };
        assert_eq!(
            GuessAttempt::try_from(garbage),
            Err(AttemptParseError::NotANumber("distanceKm"))
        );

        let zero = RawAttempt {
            attempt_number: Some(RawNumber::Int(0)),
            ..base
        };
        assert_eq!(
            GuessAttempt::try_from(zero),
            Err(AttemptParseError::BadAttemptNumber(0))
        );
    }

    #[test]
    fn parse_history_skips_malformed_rows() {
        let good = RawAttempt {
            id: Some(1),
            distance_km: Some(RawNumber::Float(0.5)),
            attempt_number: Some(RawNumber::Int(1)),
            created_at: Some(Utc.timestamp_opt(0, 0).unwrap()),
        };
        let bad = RawAttempt {
            id: Some(2),
            ..RawAttempt::default()
        };
        let parsed = parse_history(vec![good, bad]);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, 1);
    }
}

pub mod analytics;
pub mod community;
pub mod geo;
pub mod leaderboard;
pub mod survey;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::community::{NewComment, NewPost, NewReaction};
    use crate::geo::Coordinate;
    use crate::leaderboard::GuessAttempt;
    use crate::survey::NewSurvey;

    /// Fixed base instant so generated timestamps are reproducible.
    pub fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    /// Build attempts with sequential ids, one second apart, from
    /// `(distance_km, attempt_number)` pairs.
    pub fn make_attempts(rows: &[(f64, u32)]) -> Vec<GuessAttempt> {
        rows.iter()
            .enumerate()
            .map(|(i, &(distance_km, attempt_number))| GuessAttempt {
                id: i as i64 + 1,
                distance_km,
                attempt_number,
                created_at: base_time() + Duration::seconds(i as i64),
            })
            .collect()
    }

    /// A guess a short walk from the default target.
    pub fn near_campus() -> Coordinate {
        Coordinate {
            latitude: 31.02,
            longitude: 121.43,
        }
    }

    /// A minimal survey with the given budget and location.
    pub fn make_survey(email: &str, budget: u32, location: &str) -> NewSurvey {
        NewSurvey {
            email: email.to_string(),
            budget,
            location: location.to_string(),
            transportation: "train".to_string(),
            event_types: vec!["networking".to_string()],
            venues: vec!["restaurants".to_string()],
            academic_status: "masters".to_string(),
            availability: vec![],
            dietary_restrictions: None,
            alcohol_preference: "none".to_string(),
            couch_surfing: false,
        }
    }

    pub fn make_post(title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: format!("{title} body"),
            author_id: "anon_test1".to_string(),
        }
    }

    pub fn make_comment(post_id: i64, content: &str) -> NewComment {
        NewComment {
            post_id,
            content: content.to_string(),
            author_id: "anon_test2".to_string(),
            parent_id: None,
        }
    }

    pub fn make_reaction(post_id: i64, emoji: &str) -> NewReaction {
        NewReaction {
            post_id,
            emoji: emoji.to_string(),
            author_id: "anon_test3".to_string(),
        }
    }
}

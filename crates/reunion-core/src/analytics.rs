//! Dashboard aggregations over stored survey responses.
//!
//! Every function here is a pure fold over a snapshot of surveys; the server
//! reloads the snapshot per request. Distributions are ordered by count
//! (descending) and then by label so repeated calls render identically.

use std::collections::HashMap;

use serde::Serialize;

use crate::survey::{
    ACADEMIC_STATUSES, ALCOHOL_PREFERENCES, Choice, EVENT_TYPES, Survey, VENUES, label_for,
};

/// Number of event types listed in the summary card.
pub const POPULAR_EVENT_TYPES: usize = 3;

/// Inclusive budget ranges shown in the bar chart.
pub const BUDGET_RANGES: &[(u32, u32)] = &[(30, 50), (51, 100), (101, 150), (151, 200)];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    #[serde(rename = "type")]
    pub label: String,
    /// Display name for form choices; absent for free-text fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeCount {
    pub range: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySummary {
    pub total_responses: usize,
    pub average_budget: u32,
    pub couch_surfing_requests: usize,
    pub popular_event_types: Vec<CategoryCount>,
}

fn tally<'a, I>(values: I, choices: Option<&[Choice]>) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        *counts.entry(value).or_default() += 1;
    }

    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            name: choices.map(|c| label_for(c, label).to_string()),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out
}

pub fn summary(surveys: &[Survey]) -> SurveySummary {
    let total_responses = surveys.len();
    let average_budget = if surveys.is_empty() {
        0
    } else {
        let sum: u64 = surveys.iter().map(|s| u64::from(s.response.budget)).sum();
        (sum as f64 / total_responses as f64).round() as u32
    };
    let couch_surfing_requests = surveys.iter().filter(|s| s.response.couch_surfing).count();

    let mut popular_event_types = event_type_distribution(surveys);
    popular_event_types.truncate(POPULAR_EVENT_TYPES);

    SurveySummary {
        total_responses,
        average_budget,
        couch_surfing_requests,
        popular_event_types,
    }
}

pub fn event_type_distribution(surveys: &[Survey]) -> Vec<CategoryCount> {
    tally(
        surveys
            .iter()
            .flat_map(|s| s.response.event_types.iter().map(String::as_str)),
        Some(EVENT_TYPES),
    )
}

pub fn venue_distribution(surveys: &[Survey]) -> Vec<CategoryCount> {
    tally(
        surveys
            .iter()
            .flat_map(|s| s.response.venues.iter().map(String::as_str)),
        Some(VENUES),
    )
}

pub fn academic_status_distribution(surveys: &[Survey]) -> Vec<CategoryCount> {
    tally(
        surveys.iter().map(|s| s.response.academic_status.as_str()),
        Some(ACADEMIC_STATUSES),
    )
}

pub fn location_distribution(surveys: &[Survey]) -> Vec<CategoryCount> {
    tally(surveys.iter().map(|s| s.response.location.as_str()), None)
}

pub fn alcohol_distribution(surveys: &[Survey]) -> Vec<CategoryCount> {
    tally(
        surveys.iter().map(|s| s.response.alcohol_preference.as_str()),
        Some(ALCOHOL_PREFERENCES),
    )
}

/// Budget histogram. Fixed ranges always appear; out-of-range budgets land
/// in a trailing `Other` entry that is only present when non-empty.
pub fn budget_distribution(surveys: &[Survey]) -> Vec<RangeCount> {
    let mut counts = vec![0usize; BUDGET_RANGES.len()];
    let mut other = 0;
    for survey in surveys {
        let budget = survey.response.budget;
        match BUDGET_RANGES
            .iter()
            .position(|(lo, hi)| (*lo..=*hi).contains(&budget))
        {
            Some(i) => counts[i] += 1,
            None => other += 1,
        }
    }

    let mut out: Vec<RangeCount> = BUDGET_RANGES
        .iter()
        .zip(counts)
        .map(|((lo, hi), count)| RangeCount {
            range: format!("${lo}-${hi}"),
            count,
        })
        .collect();
    if other > 0 {
        out.push(RangeCount {
            range: "Other".to_string(),
            count: other,
        });
    }
    out
}

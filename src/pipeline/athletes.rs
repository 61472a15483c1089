use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::Result;
use crate::table::Table;

/// The athlete fields kept for downstream use, in output order. Projection
/// errors when any is absent from the source; this is schema enforcement,
/// not leniency.
pub const ATHLETE_COLUMNS: [&str; 20] = [
    "code",
    "current",
    "name",
    "gender",
    "function",
    "country_code",
    "nationality_code",
    "height",
    "weight",
    "disciplines",
    "events",
    "birth_date",
    "birth_place",
    "birth_country",
    "residence_place",
    "residence_country",
    "occupation",
    "lang",
    "coach",
    "other_sports",
];

/// Opening day of the Paris 2024 games; ages are computed against this date.
pub fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 26).expect("valid calendar date")
}

/// Age bracket derived from an athlete's age. A total function of age:
/// every age lands in exactly one bracket, a missing age in `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeGroup {
    Unknown,
    Teen,
    Twenties,
    Thirties,
    Forties,
    FiftyPlus,
}

impl AgeGroup {
    /// Thresholds are checked in ascending order; boundaries 20, 30, 40 and
    /// 50 belong to the upper bracket.
    pub fn from_age(age: Option<i64>) -> Self {
        match age {
            None => AgeGroup::Unknown,
            Some(age) if age < 20 => AgeGroup::Teen,
            Some(age) if age < 30 => AgeGroup::Twenties,
            Some(age) if age < 40 => AgeGroup::Thirties,
            Some(age) if age < 50 => AgeGroup::Forties,
            Some(_) => AgeGroup::FiftyPlus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Unknown => "Unknown",
            AgeGroup::Teen => "Teen (<20)",
            AgeGroup::Twenties => "20s",
            AgeGroup::Thirties => "30s",
            AgeGroup::Forties => "40s",
            AgeGroup::FiftyPlus => "50+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Project the raw athlete table to the fixed column set, parse birth dates
/// coercively, and append the derived `age` and `age_group` columns.
pub fn normalize(raw: &Table) -> Result<Table> {
    let mut athletes = raw.select(&ATHLETE_COLUMNS)?;
    let birth_idx = athletes.require_column("birth_date")?;
    let reference = reference_date();

    let mut ages: Vec<Value> = Vec::with_capacity(athletes.len());
    let mut groups: Vec<Value> = Vec::with_capacity(athletes.len());
    for row in athletes.rows_mut() {
        let birth = match &row[birth_idx] {
            Value::String(raw) => parse_birth_date(raw),
            _ => None,
        };
        // age = floor(days since birth / 365); an approximation good enough
        // for bucketing, not for exact-age use
        let age = birth.map(|date| (reference - date).num_days().div_euclid(365));

        row[birth_idx] = match birth {
            Some(date) => Value::String(date.format("%Y-%m-%d").to_string()),
            None => Value::Null,
        };
        ages.push(age.map(Value::from).unwrap_or(Value::Null));
        groups.push(Value::String(AgeGroup::from_age(age).to_string()));
    }

    athletes.append_column("age", ages)?;
    athletes.append_column("age_group", groups)?;
    Ok(athletes)
}

/// Coercive date parsing: anything that matches none of the recognized
/// formats becomes null rather than an error.
fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date())
        })
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .ok()
}

//! Feature extraction: turns résumé text into structured candidate features.
//!
//! Skills come from the union of the detectors in `detectors.rs`; experience,
//! location and education are inferred from fixed rule tables below.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::screening::detectors::{
    detect_contextual, detect_ngrams, detect_phrase_aliases, detect_required_skills,
    detect_single_tokens,
};

/// Explicit experience values at or above this are treated as noise.
const MAX_EXPLICIT_YEARS: f64 = 60.0;
/// A single date range longer than this is discarded as implausible.
const MAX_RANGE_MONTHS: i32 = 50 * 12;

pub const UNKNOWN_LOCATION: &str = "Unknown";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Highest education level detected, in rank order (PhD highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EducationLevel {
    #[serde(rename = "PhD")]
    Phd,
    #[serde(rename = "MBA")]
    Mba,
    #[serde(rename = "Master's")]
    Masters,
    #[serde(rename = "Bachelor's")]
    Bachelors,
    #[serde(rename = "Associate's")]
    Associates,
    #[serde(rename = "Diploma/Certificate")]
    DiplomaCertificate,
    #[serde(rename = "High School")]
    HighSchool,
    #[serde(rename = "Not specified")]
    NotSpecified,
}

impl EducationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            EducationLevel::Phd => "PhD",
            EducationLevel::Mba => "MBA",
            EducationLevel::Masters => "Master's",
            EducationLevel::Bachelors => "Bachelor's",
            EducationLevel::Associates => "Associate's",
            EducationLevel::DiplomaCertificate => "Diploma/Certificate",
            EducationLevel::HighSchool => "High School",
            EducationLevel::NotSpecified => "Not specified",
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which inferences actually matched something in the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchMeta {
    pub skills_found_count: usize,
    pub experience_matched: bool,
    pub location_matched: bool,
    pub education_matched: bool,
}

/// Structured features of one candidate. Skills are canonical names, sorted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFeatures {
    pub skills: BTreeSet<String>,
    pub experience_years: f64,
    pub location: String,
    pub education_level: EducationLevel,
    pub match_meta: MatchMeta,
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Extracts candidate features, resolving "present" date ranges against today.
pub fn extract(text: &str, required_skills: &[String]) -> CandidateFeatures {
    extract_as_of(text, required_skills, Utc::now().date_naive())
}

/// Same as [`extract`] with an explicit reference date for open-ended ranges.
pub fn extract_as_of(text: &str, required_skills: &[String], today: NaiveDate) -> CandidateFeatures {
    let skills = extract_skills(text, required_skills);
    let experience = infer_experience(text, today);
    let location = infer_location(text);
    let education_level = infer_education(text);

    CandidateFeatures {
        match_meta: MatchMeta {
            skills_found_count: skills.len(),
            experience_matched: experience.is_some(),
            location_matched: location.is_some(),
            education_matched: education_level != EducationLevel::NotSpecified,
        },
        skills,
        experience_years: experience.unwrap_or(0.0),
        location: location.unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        education_level,
    }
}

/// Union of all five skill detectors.
pub fn extract_skills(text: &str, required_skills: &[String]) -> BTreeSet<String> {
    let mut skills = detect_phrase_aliases(text);
    skills.extend(detect_single_tokens(text));
    skills.extend(detect_ngrams(text));
    skills.extend(detect_required_skills(text, required_skills));
    skills.extend(detect_contextual(text));
    skills
}

// ────────────────────────────────────────────────────────────────────────────
// Experience
// ────────────────────────────────────────────────────────────────────────────

const YEARS: &str = r"\b(\d{1,2}(?:\.\d{1,2})?)\s*\+?\s*(?:years?|yrs?)";

/// Explicit statements, tried in order; the first yielding a plausible value wins.
static EXPLICIT_EXPERIENCE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"{YEARS}(?:\s+of)?\s+(?:[a-z\-]+\s+){{0,3}}?experience"),
        format!(r"experience\s*[:\-–—]\s*{YEARS}"),
        format!(r"(?:over|more\s+than)\s+{YEARS}"),
        format!(r"(?:professional|total|work|industry)\s+experience\s+of\s+{YEARS}"),
    ]
    .iter()
    .map(|pattern| Regex::new(&format!("(?i){pattern}")).expect("experience pattern must compile"))
    .collect()
});

const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?";
const DASH: &str = r"\s*(?:-|–|—|to|until)\s*";
const OPEN_END: &str = r"(present|current|now|ongoing|today|date)";

static MONTH_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b{MONTH}\s*'?(\d{{4}}){DASH}(?:{MONTH}\s*'?(\d{{4}})|(\d{{4}})|{OPEN_END})\b"
    ))
    .expect("month range pattern must compile")
});

static YEAR_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b((?:19|20)\d{{2}}){DASH}(?:((?:19|20)\d{{2}})|{OPEN_END})\b"))
        .expect("year range pattern must compile")
});

/// Years of experience, or `None` when nothing in the text supports a value.
pub fn infer_experience(text: &str, today: NaiveDate) -> Option<f64> {
    explicit_experience(text).or_else(|| experience_from_ranges(text, today))
}

fn explicit_experience(text: &str) -> Option<f64> {
    EXPLICIT_EXPERIENCE.iter().find_map(|pattern| {
        pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
            .find(|years| (0.0..MAX_EXPLICIT_YEARS).contains(years))
    })
}

/// Sums every employment range in the text, in months, then converts to years
/// rounded to one decimal.
///
/// Overlapping ranges are summed as-is, so concurrent roles count twice.
fn experience_from_ranges(text: &str, today: NaiveDate) -> Option<f64> {
    let now = month_index(today.year(), today.month());
    let mut total_months: i64 = 0;
    let mut claimed: Vec<(usize, usize)> = Vec::new();

    for caps in MONTH_RANGE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        claimed.push((whole.start(), whole.end()));

        let Some(start) = caps
            .get(2)
            .and_then(|y| y.as_str().parse::<i32>().ok())
            .zip(caps.get(1).and_then(|m| month_number(m.as_str())))
            .map(|(year, month)| month_index(year, month))
        else {
            continue;
        };

        let end = if let (Some(m), Some(y)) = (caps.get(3), caps.get(4)) {
            month_number(m.as_str()).zip(y.as_str().parse::<i32>().ok()).map(|(month, year)| month_index(year, month))
        } else if let Some(y) = caps.get(5) {
            // year-only end: counted to the start of that year
            y.as_str().parse::<i32>().ok().map(|year| month_index(year, 1))
        } else if caps.get(6).is_some() {
            Some(now)
        } else {
            None
        };

        if let Some(months) = end.and_then(|end| plausible_span(start, end)) {
            total_months += i64::from(months);
        }
    }

    for caps in YEAR_RANGE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if claimed
            .iter()
            .any(|(s, e)| whole.start() < *e && *s < whole.end())
        {
            continue;
        }
        let Some(start_year) = caps.get(1).and_then(|y| y.as_str().parse::<i32>().ok()) else {
            continue;
        };
        let start = month_index(start_year, 1);
        let end = match (caps.get(2), caps.get(3)) {
            (Some(y), _) => y.as_str().parse::<i32>().ok().map(|year| month_index(year, 1)),
            (None, Some(_)) => Some(now),
            _ => None,
        };
        if let Some(months) = end.and_then(|end| plausible_span(start, end)) {
            total_months += i64::from(months);
        }
    }

    if total_months <= 0 {
        return None;
    }
    Some(((total_months as f64 / 12.0) * 10.0).round() / 10.0)
}

fn plausible_span(start: i32, end: i32) -> Option<i32> {
    let months = end - start;
    (0..=MAX_RANGE_MONTHS).contains(&months).then_some(months)
}

fn month_index(year: i32, month: u32) -> i32 {
    year * 12 + month as i32 - 1
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

// ────────────────────────────────────────────────────────────────────────────
// Location
// ────────────────────────────────────────────────────────────────────────────

/// Known places, checked in order as whole words. Lower-case.
const GAZETTEER: &[&str] = &[
    // India
    "bangalore", "bengaluru", "mumbai", "bombay", "new delhi", "delhi", "gurgaon", "gurugram",
    "noida", "hyderabad", "chennai", "madras", "pune", "kolkata", "calcutta", "ahmedabad",
    "jaipur", "kochi", "cochin", "chandigarh", "indore", "coimbatore", "thiruvananthapuram",
    "trivandrum", "lucknow", "bhubaneswar", "nagpur", "mysore", "visakhapatnam",
    // North America
    "new york", "san francisco", "seattle", "austin", "boston", "chicago", "los angeles",
    "san jose", "denver", "atlanta", "dallas", "houston", "miami", "washington", "toronto",
    "vancouver", "montreal",
    // Europe
    "london", "berlin", "munich", "amsterdam", "paris", "dublin", "madrid", "barcelona",
    "lisbon", "stockholm", "zurich", "warsaw", "edinburgh", "manchester",
    // Asia-Pacific & Middle East
    "singapore", "dubai", "abu dhabi", "tokyo", "hong kong", "sydney", "melbourne",
    "kuala lumpur", "jakarta", "manila", "tel aviv",
    // Work arrangements
    "remote", "hybrid",
];

static LABELED_LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)(?i:\b(?:location|current\s+location|based\s+in|city|address|residing\s+in|lives\s+in))\s*[:\-–—]\s*([A-Z][A-Za-z.'\-]*(?:[ \t]*,?[ \t]*[A-Z][A-Za-z.'\-]*){0,3})",
    )
    .expect("location label pattern must compile")
});

static GAZETTEER_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    GAZETTEER
        .iter()
        .map(|place| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(place).replace(' ', r"\s+"));
            (Regex::new(&pattern).expect("gazetteer pattern must compile"), *place)
        })
        .collect()
});

/// Labeled location first ("Location: Pune, India"), then the gazetteer.
pub fn infer_location(text: &str) -> Option<String> {
    if let Some(found) = LABELED_LOCATION
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().trim_end_matches([',', '.', '-']).trim().to_string())
        .filter(|s| !s.is_empty())
    {
        return Some(found);
    }

    GAZETTEER_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, place)| capitalize_words(place))
}

fn capitalize_words(place: &str) -> String {
    place
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Education
// ────────────────────────────────────────────────────────────────────────────

/// Ranked education patterns. Evaluated in rank order over the whole text;
/// the first rank with any match wins, wherever the match sits in the text.
static EDUCATION_RANKS: LazyLock<Vec<(EducationLevel, Regex)>> = LazyLock::new(|| {
    [
        (
            EducationLevel::Phd,
            r"\bph\.?\s?d\b\.?|\bdoctor\s+of\s+philosophy\b|\bdoctorate\b|\bdoctoral\b",
        ),
        (
            EducationLevel::Mba,
            r"\bm\.?\s?b\.?\s?a\b\.?|\bmaster\s+of\s+business\s+administration\b",
        ),
        (
            EducationLevel::Masters,
            r"\bmaster['’]s\b|\bmasters?\s+(?:degree|of|in)\b|\bm\.?\s?sc\b|\bm\.?\s?tech\b|\bm\.s\.|\bms\s+in\b|\bm\.e\.?\s+in\b|\bm\.a\.?\s+in\b|\bmca\b|\bpost\s*graduate\b",
        ),
        (
            EducationLevel::Bachelors,
            r"\bbachelor['’]?s?\b|\bb\.?\s?tech\b|\bb\.?\s?sc\b|\bb\.s\.|\bbs\s+in\b|\bb\.e\.?\s+in\b|\bb\.a\.?\s+in\b|\bbca\b|\bundergraduate\s+degree\b",
        ),
        (
            EducationLevel::Associates,
            r"\bassociate['’]?s?\s+(?:degree|of\s+(?:arts|science|applied))\b|\ba\.a\.s?\.?\s+in\b",
        ),
        (
            EducationLevel::DiplomaCertificate,
            r"\bdiploma\b|\bcertificate\s+(?:in|program|course)\b|\bpolytechnic\b",
        ),
        (
            EducationLevel::HighSchool,
            r"\bhigh\s+school\b|\bsecondary\s+school\b|\bhsc\b|\bssc\b|\bged\b|\b12th\s+(?:grade|standard)\b",
        ),
    ]
    .into_iter()
    .map(|(level, pattern)| {
        let regex = Regex::new(&format!("(?i){pattern}")).expect("education pattern must compile");
        (level, regex)
    })
    .collect()
});

pub fn infer_education(text: &str) -> EducationLevel {
    EDUCATION_RANKS
        .iter()
        .find(|(_, pattern)| pattern.is_match(text))
        .map(|(level, _)| *level)
        .unwrap_or(EducationLevel::NotSpecified)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    const RESUME: &str = r#"
        Jane Doe
        Location: Pune, India
        Senior Software Engineer with 8+ years of experience building distributed systems.

        Skills: TypeScript, React Native, Postgres, k8s, Docker
        Set up continuous deployment for every service.

        Education
        B.Tech in Computer Science, 2012
    "#;

    #[test]
    fn test_extract_full_resume() {
        let features = extract_as_of(RESUME, &["Kubernetes".to_string()], today());
        assert!(features.skills.contains("TypeScript"));
        assert!(features.skills.contains("React Native"));
        assert!(features.skills.contains("PostgreSQL"));
        assert!(features.skills.contains("Kubernetes"));
        assert!(features.skills.contains("Docker"));
        assert!(features.skills.contains("CI/CD"));
        assert!(features.skills.contains("Distributed Systems"));
        assert_eq!(features.experience_years, 8.0);
        assert_eq!(features.location, "Pune, India");
        assert_eq!(features.education_level, EducationLevel::Bachelors);
        assert_eq!(features.match_meta.skills_found_count, features.skills.len());
        assert!(features.match_meta.experience_matched);
        assert!(features.match_meta.location_matched);
        assert!(features.match_meta.education_matched);
    }

    #[test]
    fn test_skills_line_is_read_without_requirements() {
        let features = extract_as_of("Skills: Swift, Ruby, Dart, Excel, Oracle, SAP", &[], today());
        for skill in ["Swift", "Ruby", "Dart", "Excel", "Oracle Database", "SAP"] {
            assert!(features.skills.contains(skill), "missing {skill}");
        }
    }

    #[test]
    fn test_empty_text_yields_defaults() {
        let features = extract_as_of("", &[], today());
        assert!(features.skills.is_empty());
        assert_eq!(features.experience_years, 0.0);
        assert_eq!(features.location, UNKNOWN_LOCATION);
        assert_eq!(features.education_level, EducationLevel::NotSpecified);
        assert!(!features.match_meta.experience_matched);
        assert!(!features.match_meta.location_matched);
        assert!(!features.match_meta.education_matched);
    }

    #[test]
    fn test_explicit_experience_patterns() {
        assert_eq!(explicit_experience("8+ years of experience in backend"), Some(8.0));
        assert_eq!(explicit_experience("Experience: 5 years"), Some(5.0));
        assert_eq!(explicit_experience("over 12 years leading teams"), Some(12.0));
        assert_eq!(explicit_experience("Professional experience of 3.5 years"), Some(3.5));
        assert_eq!(explicit_experience("6 years of professional experience"), Some(6.0));
    }

    #[test]
    fn test_explicit_experience_rejects_implausible_values() {
        assert_eq!(explicit_experience("99 years of experience"), None);
    }

    #[test]
    fn test_explicit_experience_needs_whole_number() {
        assert_eq!(explicit_experience("100 years of experience"), None);
        assert_eq!(explicit_experience("150+ years of experience"), None);
        assert_eq!(explicit_experience("Over 120 years of combined team experience"), None);
    }

    #[test]
    fn test_experience_from_month_ranges() {
        let text = "Acme Corp  Jan 2018 – Dec 2019\nGlobex  January 2020 - June 2021";
        // 23 months + 17 months = 40 months
        assert_eq!(infer_experience(text, today()), Some(3.3));
    }

    #[test]
    fn test_experience_present_uses_reference_date() {
        let text = "Initech, Jun 2020 - Present";
        // Jun 2020 → Jun 2024 = 48 months
        assert_eq!(infer_experience(text, today()), Some(4.0));
    }

    #[test]
    fn test_experience_from_year_ranges() {
        let text = "Hooli 2015 - 2018\nPied Piper 2018 – current";
        // 36 months + (Jan 2018 → Jun 2024 = 77 months)
        assert_eq!(infer_experience(text, today()), Some(9.4));
    }

    #[test]
    fn test_overlapping_ranges_are_double_counted() {
        let text = "Role A Jan 2020 - Jan 2022\nRole B Jan 2020 - Jan 2022";
        assert_eq!(infer_experience(text, today()), Some(4.0));
    }

    #[test]
    fn test_implausibly_long_range_is_discarded() {
        let text = "Since 1901 - 2020 and also 2019 - 2020";
        assert_eq!(infer_experience(text, today()), Some(1.0));
    }

    #[test]
    fn test_no_experience_signal() {
        assert_eq!(infer_experience("Enthusiastic learner", today()), None);
    }

    #[test]
    fn test_labeled_location_wins_over_gazetteer() {
        let text = "Previously in London.\nBased in: San Francisco, CA";
        assert_eq!(infer_location(text).as_deref(), Some("San Francisco, CA"));
    }

    #[test]
    fn test_gazetteer_location_is_capitalized() {
        assert_eq!(infer_location("open to work from bengaluru").as_deref(), Some("Bengaluru"));
        assert_eq!(infer_location("fully remote since 2021").as_deref(), Some("Remote"));
        assert_eq!(infer_location("moved to new   york").as_deref(), Some("New York"));
    }

    #[test]
    fn test_gazetteer_requires_whole_words() {
        assert_eq!(infer_location("pursuing parisian cuisine"), None);
    }

    #[test]
    fn test_education_priority_ignores_position() {
        let text = "Bachelor's in Physics (2010). Later completed a PhD in Chemistry.";
        assert_eq!(infer_education(text), EducationLevel::Phd);
    }

    #[test]
    fn test_education_levels() {
        assert_eq!(infer_education("MBA, Wharton"), EducationLevel::Mba);
        assert_eq!(infer_education("Master's degree in CS"), EducationLevel::Masters);
        assert_eq!(infer_education("M.Tech from IIT"), EducationLevel::Masters);
        assert_eq!(infer_education("Associate degree in Nursing"), EducationLevel::Associates);
        assert_eq!(infer_education("Diploma in Mechanical Engineering"), EducationLevel::DiplomaCertificate);
        assert_eq!(infer_education("Graduated high school in 2015"), EducationLevel::HighSchool);
        assert_eq!(infer_education("Self-taught engineer"), EducationLevel::NotSpecified);
    }

    #[test]
    fn test_master_outside_degree_context_is_not_a_degree() {
        assert_eq!(
            infer_education("Certified Scrum Master, self-taught"),
            EducationLevel::NotSpecified
        );
        assert_eq!(
            infer_education("Merged feature work into the master branch"),
            EducationLevel::NotSpecified
        );
        assert_eq!(infer_education("Masters in Data Science"), EducationLevel::Masters);
        assert_eq!(infer_education("Master of Science, ETH"), EducationLevel::Masters);
    }

    #[test]
    fn test_education_level_serializes_as_label() {
        let json = serde_json::to_string(&EducationLevel::Masters).unwrap();
        assert_eq!(json, "\"Master's\"");
        let parsed: EducationLevel = serde_json::from_str("\"Diploma/Certificate\"").unwrap();
        assert_eq!(parsed, EducationLevel::DiplomaCertificate);
    }
}

//! Match scoring: deterministic weighted score of candidate features against
//! a job opening's requirements.
//!
//! finalScore = 0.5·skills + 0.3·experience + 0.2·location, rounded to four
//! decimals, then bucketed into a confidence level.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::screening::features::CandidateFeatures;
use crate::screening::skills::canonicalize;

pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.75;
pub const MEDIUM_CONFIDENCE_THRESHOLD: f64 = 0.45;

/// Location spellings that refer to the same place. Lower-case.
const LOCATION_ALIASES: &[(&str, &str)] = &[
    ("bengaluru", "bangalore"),
    ("new delhi", "delhi"),
    ("ncr", "delhi"),
    ("delhi ncr", "delhi"),
    ("bombay", "mumbai"),
    ("gurugram", "gurgaon"),
    ("madras", "chennai"),
    ("calcutta", "kolkata"),
    ("cochin", "kochi"),
    ("trivandrum", "thiruvananthapuram"),
    ("mysuru", "mysore"),
    ("nyc", "new york"),
    ("new york city", "new york"),
    ("sf", "san francisco"),
    ("bay area", "san francisco"),
    ("sf bay area", "san francisco"),
    ("la", "los angeles"),
    ("work from home", "remote"),
    ("wfh", "remote"),
    ("anywhere", "remote"),
];

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Requirements of one job opening, as supplied by the opening store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequirement {
    pub required_skills: Vec<String>,
    pub required_experience_years: f64,
    pub required_location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn from_score(final_score: f64) -> Self {
        if final_score >= HIGH_CONFIDENCE_THRESHOLD {
            Confidence::High
        } else if final_score >= MEDIUM_CONFIDENCE_THRESHOLD {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "HIGH" => Some(Confidence::High),
            "MEDIUM" => Some(Confidence::Medium),
            "LOW" => Some(Confidence::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub skill_score: f64,
    pub experience_score: f64,
    pub location_score: f64,
    pub final_score: f64,
    pub confidence: Confidence,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub skills: f64,
    pub experience: f64,
    pub location: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 0.5,
            experience: 0.3,
            location: 0.2,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// Scores a candidate against a requirement. Pure and total.
pub fn score(candidate: &CandidateFeatures, requirement: &JobRequirement) -> ScoreResult {
    let weights = ScoringWeights::default();
    let skills = compare_skills(&candidate.skills, &requirement.required_skills);
    let experience_score = experience_score(
        candidate.experience_years,
        requirement.required_experience_years,
    );
    let location_score = location_score(&candidate.location, &requirement.required_location);

    let final_score = round4(
        (weights.skills * skills.score
            + weights.experience * experience_score
            + weights.location * location_score)
            .clamp(0.0, 1.0),
    );
    let confidence = Confidence::from_score(final_score);

    let reason = build_reason(
        &skills,
        candidate,
        requirement,
        experience_score,
        location_score,
        final_score,
        confidence,
    );

    ScoreResult {
        skill_score: skills.score,
        experience_score,
        location_score,
        final_score,
        confidence,
        reason,
    }
}

/// Outcome of comparing canonical skill sets.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillComparison {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub score: f64,
}

/// `|required ∩ candidate| / |required|` over canonical names; 1.0 when
/// nothing is required.
pub fn compare_skills(candidate: &BTreeSet<String>, required: &[String]) -> SkillComparison {
    let required: BTreeSet<String> = required
        .iter()
        .map(|s| canonicalize(s))
        .filter(|s| !s.is_empty())
        .collect();
    if required.is_empty() {
        return SkillComparison {
            matched: vec![],
            missing: vec![],
            score: 1.0,
        };
    }

    let candidate: BTreeSet<String> = candidate.iter().map(|s| canonicalize(s)).collect();
    let (matched, missing): (Vec<String>, Vec<String>) = required
        .into_iter()
        .partition(|skill| candidate.contains(skill));

    let score = matched.len() as f64 / (matched.len() + missing.len()) as f64;
    SkillComparison {
        matched,
        missing,
        score,
    }
}

/// `min(candidate / required, 1)`, or 1.0 when nothing is required.
pub fn experience_score(candidate_years: f64, required_years: f64) -> f64 {
    if required_years <= 0.0 {
        return 1.0;
    }
    (candidate_years.max(0.0) / required_years).min(1.0)
}

/// 1.0 when either side is empty or both name the same place, else 0.0.
pub fn location_score(candidate: &str, required: &str) -> f64 {
    if candidate.trim().is_empty() || required.trim().is_empty() {
        return 1.0;
    }
    if normalize_location(candidate) == normalize_location(required) {
        1.0
    } else {
        0.0
    }
}

/// Lower-cases, keeps the primary place (before the first comma) and resolves
/// known alternate spellings.
pub fn normalize_location(location: &str) -> String {
    let lowered = location.trim().to_lowercase();
    let primary = lowered.split(',').next().unwrap_or_default();
    let primary = primary.split_whitespace().collect::<Vec<_>>().join(" ");
    LOCATION_ALIASES
        .iter()
        .find(|(alias, _)| *alias == primary)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(primary)
}

pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Assembles the explanation, always ordered skills, experience, location, verdict.
fn build_reason(
    skills: &SkillComparison,
    candidate: &CandidateFeatures,
    requirement: &JobRequirement,
    experience_score: f64,
    location_score: f64,
    final_score: f64,
    confidence: Confidence,
) -> String {
    let mut sentences = Vec::with_capacity(5);

    if skills.matched.is_empty() && skills.missing.is_empty() {
        sentences.push("No required skills specified.".to_string());
    } else {
        let matched = if skills.matched.is_empty() {
            "none".to_string()
        } else {
            skills.matched.join(", ")
        };
        sentences.push(format!(
            "Matched skills ({}/{}): {matched}.",
            skills.matched.len(),
            skills.matched.len() + skills.missing.len()
        ));
        if !skills.missing.is_empty() {
            sentences.push(format!("Missing skills: {}.", skills.missing.join(", ")));
        }
    }

    if requirement.required_experience_years > 0.0 {
        sentences.push(format!(
            "Experience: {:.1} of {:.1} required years ({:.0}% of requirement).",
            candidate.experience_years,
            requirement.required_experience_years,
            experience_score * 100.0
        ));
    } else {
        sentences.push(format!(
            "Experience: {:.1} years; no minimum required.",
            candidate.experience_years
        ));
    }

    let location_sentence = if requirement.required_location.trim().is_empty() {
        "Location: no location requirement.".to_string()
    } else if candidate.location.trim().is_empty() {
        "Location: candidate location not stated.".to_string()
    } else if location_score >= 1.0 {
        format!(
            "Location: {} matches required {}.",
            candidate.location, requirement.required_location
        )
    } else {
        format!(
            "Location: {} does not match required {}.",
            candidate.location, requirement.required_location
        )
    };
    sentences.push(location_sentence);

    sentences.push(format!(
        "Final score {:.2}% ({} confidence).",
        final_score * 100.0,
        confidence.as_str()
    ));

    sentences.join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

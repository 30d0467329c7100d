//! Skill detectors: five independent passes over résumé text.
//!
//! Each pass returns canonical skill names and can be exercised on its own;
//! `features::extract_skills` takes their union.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::screening::skills::{aliases_for, all_aliases, canonicalize, is_ambiguous_token, lookup};

/// Aliases containing whitespace or punctuation, longest first.
static PHRASE_ALIASES: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    let mut phrases: Vec<_> = all_aliases()
        .filter(|(alias, _)| alias.chars().any(|c| !c.is_ascii_alphanumeric()))
        .collect();
    phrases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));
    phrases
});

/// Prose patterns that imply a skill without naming it.
static CONTEXT_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"continuous[\s\-]+(?:integration|deployment|delivery)", "CI/CD"),
        (r"(?:build|deploy(?:ment)?|release)\s+pipelines?", "CI/CD"),
        (r"containeri[sz](?:ed|ing|ation)", "Docker"),
        (r"container\s+orchestration", "Kubernetes"),
        (r"infrastructure[\s\-]+as[\s\-]+code", "Infrastructure as Code"),
        (r"(?:wrote|writing|written)\s+(?:\w+\s+){0,2}unit\s+tests?", "Unit Testing"),
        (r"test[\s\-]+driven", "TDD"),
        (r"(?:design(?:ed|ing)?|buil[dt](?:ing)?|develop(?:ed|ing)?)\s+(?:\w+\s+){0,2}restful?\s+(?:apis?|services|endpoints)", "REST APIs"),
        (r"micro[\s\-]?services?\s+architecture", "Microservices"),
        (r"(?:train(?:ed|ing)?|deploy(?:ed|ing)?)\s+(?:\w+\s+){0,2}(?:ml|machine\s+learning)\s+models?", "Machine Learning"),
        (r"neural\s+networks?", "Deep Learning"),
        (r"(?:text|language)\s+(?:classification|understanding|processing)", "NLP"),
        (r"image\s+(?:classification|recognition|segmentation)", "Computer Vision"),
        (r"version\s+control(?:\s+systems?)?", "Git"),
        (r"(?:sprint\s+planning|daily\s+stand-?ups?|scrum\s+master)", "Scrum"),
        (r"agile\s+(?:teams?|environment|practices|methodolog(?:y|ies)|development)", "Agile"),
        (r"peer\s+code\s+reviews?|reviewed\s+(?:pull\s+requests|code)", "Code Review"),
        (r"(?:relational|sql)\s+databases?", "SQL"),
        (r"responsive\s+(?:web\s+)?(?:design|layouts?|ui)", "Responsive Design"),
        (r"(?:led|managed|mentored)\s+(?:a\s+)?team\s+of\s+\d+", "Leadership"),
        (r"(?:mentored|coached)\s+(?:junior|new)\s+(?:engineers|developers|hires)", "Mentoring"),
        (r"on-?call\s+rotation|incident\s+response|slos?\s+and\s+slis?", "Site Reliability Engineering"),
        (r"(?:extract|transform|load)(?:,\s*|\s+)(?:transform|load)", "ETL"),
        (r"penetration\s+tests?", "Penetration Testing"),
    ]
    .into_iter()
    .map(|(pattern, skill)| {
        let regex = Regex::new(&format!("(?i){pattern}")).expect("context pattern must compile");
        (regex, skill)
    })
    .collect()
});

/// Pass 1: longest-first scan of multi-word or punctuated aliases.
///
/// A claimed span is blanked out, so "react native" is taken before the bare
/// "react" inside it can match.
pub fn detect_phrase_aliases(text: &str) -> BTreeSet<String> {
    let mut haystack = text.to_lowercase();
    let mut found = BTreeSet::new();

    for (alias, canonical) in PHRASE_ALIASES.iter() {
        let spans: Vec<(usize, usize)> = haystack
            .match_indices(alias)
            .map(|(start, m)| (start, start + m.len()))
            .filter(|(start, end)| has_word_boundaries(&haystack, *start, *end))
            .collect();
        if spans.is_empty() {
            continue;
        }
        found.insert(canonical.to_string());
        for (start, end) in spans {
            haystack.replace_range(start..end, &" ".repeat(end - start));
        }
    }
    found
}

/// Pass 2: token-by-token lookup of single-word aliases after punctuation
/// stripping. Ambiguous short words are skipped here.
pub fn detect_single_tokens(text: &str) -> BTreeSet<String> {
    tokenize(text)
        .iter()
        .filter(|token| !is_ambiguous_token(token))
        .filter_map(|token| lookup(token))
        .map(str::to_string)
        .collect()
}

/// Pass 3: bigram and trigram lookups over the same token stream.
///
/// Catches names broken across lines or punctuation ("React\nNative",
/// "Type-Script") that are not literal substrings.
pub fn detect_ngrams(text: &str) -> BTreeSet<String> {
    let tokens = tokenize(text);
    let mut found = BTreeSet::new();

    for n in [2, 3] {
        for window in tokens.windows(n) {
            let spaced = window.join(" ");
            let compact = window.concat();
            if let Some(canonical) = lookup(&spaced).or_else(|| lookup(&compact)) {
                found.insert(canonical.to_string());
            }
        }
    }
    found
}

/// Pass 4: targeted search for every skill the job requires.
///
/// Each required skill is canonicalized, every alias of that canonical name is
/// tested against the text with flexible separators, and hits are reported
/// under the canonical name.
pub fn detect_required_skills(text: &str, required_skills: &[String]) -> BTreeSet<String> {
    let mut found = BTreeSet::new();

    for required in required_skills {
        let canonical = canonicalize(required);
        if canonical.is_empty() {
            continue;
        }

        let mut candidates: BTreeSet<String> =
            aliases_for(&canonical).iter().map(|a| a.to_string()).collect();
        candidates.insert(canonical.to_lowercase());
        candidates.insert(required.trim().to_lowercase());

        let hit = candidates
            .iter()
            .filter_map(|alias| flexible_pattern(alias))
            .any(|pattern| pattern.is_match(text));
        if hit {
            found.insert(canonical);
        }
    }
    found
}

/// Pass 5: contextual phrases that imply a skill ("continuous delivery" → CI/CD).
pub fn detect_contextual(text: &str) -> BTreeSet<String> {
    CONTEXT_PATTERNS
        .iter()
        .filter(|(pattern, _)| pattern.is_match(text))
        .map(|(_, skill)| skill.to_string())
        .collect()
}

/// Lower-cases and splits on whitespace, trimming surrounding punctuation but
/// keeping the `+`, `#` and inner `.` that belong to names like C++, C# and Node.js.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '|' | '(' | ')' | '/' | '•'))
        .map(|raw| {
            raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

fn has_word_boundaries(haystack: &str, start: usize, end: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let after = haystack[end..].chars().next();
    !before.is_some_and(is_name_char) && !after.is_some_and(is_name_char)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}

/// Builds a case-insensitive matcher for an alias where spaces, hyphens,
/// underscores and slashes are interchangeable (or absent).
fn flexible_pattern(alias: &str) -> Option<Regex> {
    let pieces: Vec<String> = alias
        .split(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | '/'))
        .filter(|piece| !piece.is_empty())
        .map(regex::escape)
        .collect();
    if pieces.is_empty() {
        return None;
    }
    let body = pieces.join(r"[\s\-_/]*");
    Regex::new(&format!(r"(?i)(?:^|[^\p{{L}}\p{{N}}+#]){body}(?:$|[^\p{{L}}\p{{N}}+#])")).ok()
}

//! Post-execution content guardrails for the document tool.
//!
//! Three independent heuristics inspect produced text: template filler
//! ("placeholders"), repeated second-level markdown headers, and goal drift
//! (output addressing a different domain than the stated goal). Any hit forces
//! a clarify override upstream. These are literal string heuristics by design,
//! not semantic classifiers.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Filler markers that indicate the model emitted template scaffolding
/// instead of content.
const PLACEHOLDER_PATTERNS: [&str; 10] = [
    r"\[insert[^\]]*\]",
    r"\[target[^\]]*\]",
    r"\[assumption[^\]]*\]",
    r"\[constraint[^\]]*\]",
    r"\[estimated[^\]]*\]",
    r"\btbd\b",
    r"\blorem ipsum\b",
    r"\bbullet\s*1\b",
    r"\bbullet\s*2\b",
    r"\bbullet\s*3\b",
];

static PLACEHOLDER_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    PLACEHOLDER_PATTERNS
        .iter()
        .map(|pat| Regex::new(&format!("(?i){pat}")).expect("placeholder pattern should be valid"))
        .collect()
});

/// Keywords from industries that commonly leak into generated plans. Seeing
/// one in the output without it appearing in the goal is a drift signal.
const DRIFT_TOKENS: [&str; 14] = [
    "e-commerce",
    "ecommerce",
    "crm",
    "law firm",
    "law firms",
    "compliance",
    "hr",
    "ats",
    "resume",
    "logistics",
    "gaming",
    "order management",
    "inventory",
    "billing",
];

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9]+").expect("word pattern should be valid"));

/// Case-insensitive match against the fixed filler-marker list.
pub fn contains_placeholders(text: &str) -> bool {
    let low = text.to_lowercase();
    PLACEHOLDER_RES.iter().any(|re| re.is_match(&low))
}

/// True when any `## ` header text appears more than once.
pub fn duplicate_headers(text: &str) -> bool {
    let mut seen = HashSet::new();
    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("## ") && !seen.insert(line.to_string()) {
            return true;
        }
    }
    false
}

/// Heuristic check that the output stays in the goal's domain.
///
/// Empty goal means alignment cannot be judged, so no drift. Otherwise:
/// unrelated-industry tokens in the output that the goal never mentions flag
/// drift; failing that, goal and output are tokenized into lowercase
/// alphanumeric words of length >= 4 and fewer than 2 shared words flags
/// drift, after one widened check that also counts the step title's words. A
/// goal with zero qualifying words cannot be verified and always drifts.
pub fn likely_domain_drift(task_goal: &str, step_title: &str, content: &str) -> bool {
    let goal = task_goal.to_lowercase();
    let out = content.to_lowercase();
    if goal.trim().is_empty() {
        return false;
    }

    for token in DRIFT_TOKENS {
        if out.contains(token) && !goal.contains(token) {
            return true;
        }
    }

    let goal_words = words(&goal);
    if goal_words.is_empty() {
        return true;
    }
    let out_words = words(&out);

    let overlap = goal_words.intersection(&out_words).count();
    if overlap < 2 {
        let title_words = words(&step_title.to_lowercase());
        let widened: HashSet<&String> = out_words.union(&title_words).collect();
        let overlap2 = goal_words.iter().filter(|w| widened.contains(w)).count();
        return overlap2 < 2;
    }

    false
}

fn words(text: &str) -> HashSet<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .filter(|w| w.len() >= 4)
        .collect()
}

/// Outcome of the three guardrail checks for one document-tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardReport {
    pub bad_placeholders: bool,
    pub bad_dup_headers: bool,
    pub bad_domain_drift: bool,
}

impl GuardReport {
    pub fn evaluate(task_goal: &str, step_title: &str, output: &str) -> Self {
        Self {
            bad_placeholders: contains_placeholders(output),
            bad_dup_headers: duplicate_headers(output),
            bad_domain_drift: likely_domain_drift(task_goal, step_title, output),
        }
    }

    /// True when any check fired and the output must be replaced.
    pub fn fired(&self) -> bool {
        self.bad_placeholders || self.bad_dup_headers || self.bad_domain_drift
    }

    /// Audit string naming the checks that fired; recorded in the overriding
    /// decision's `reason` field.
    pub fn reason(&self) -> String {
        format!(
            "bad_placeholders={}, bad_dup_headers={}, bad_domain_drift={}",
            self.bad_placeholders, self.bad_dup_headers, self.bad_domain_drift
        )
    }
}

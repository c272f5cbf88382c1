//! Deterministic clarify fallback document.
//!
//! This is the single universal fallback used whenever the pipeline cannot
//! proceed safely: instead of guessing, it asks the user for the missing
//! information. Pure rendering; never depends on the model.

use minijinja::{Environment, context};

const CLARIFY_TEMPLATE: &str = include_str!("templates/clarify.md");

/// The fixed set of clarifying questions every clarify document asks.
const CLARIFY_QUESTIONS: [&str; 6] = [
    "What is the exact product category and target user persona for this goal?",
    "What is the #1 pain point we are solving (and top 2 secondary pains)?",
    "What is the primary activation event (what must a user do to get value)?",
    "What is the business model (free, freemium, subscription, enterprise) and expected pricing range?",
    "Any must-have integrations (e.g., Stripe, Apple/Google IAP, wearable devices, analytics stack)?",
    "What is the launch geography and the 6-month success target (users / revenue / retention)?",
];

/// Prefix a step title with `Clarify: ` without ever double-prefixing.
pub fn clarify_title(step_title: &str) -> String {
    let trimmed = step_title.trim();
    if trimmed.to_lowercase().starts_with("clarify:") {
        trimmed.to_string()
    } else {
        format!("Clarify: {trimmed}")
    }
}

/// Render the clarify markdown document for one step.
///
/// The context block lists the goal (with a `(missing)` sentinel when empty)
/// and up to 6 assumptions and constraints each.
pub fn make_clarify_doc(
    step_title: &str,
    task_goal: &str,
    assumptions: &[String],
    constraints: &[String],
) -> String {
    let goal = task_goal.trim();
    let goal_line = if goal.is_empty() { "(missing)" } else { goal };

    let mut env = Environment::new();
    env.add_template("clarify", CLARIFY_TEMPLATE)
        .expect("clarify template should be valid");
    let template = env
        .get_template("clarify")
        .expect("clarify template should be registered");
    template
        .render(context! {
            title => clarify_title(step_title),
            goal_line => goal_line,
            assumptions => assumptions.iter().take(6).collect::<Vec<_>>(),
            constraints => constraints.iter().take(6).collect::<Vec<_>>(),
            questions => CLARIFY_QUESTIONS,
        })
        .expect("clarify template rendering should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn title_prefix_is_idempotent() {
        assert_eq!(clarify_title("Define KPIs"), "Clarify: Define KPIs");
        assert_eq!(clarify_title("Clarify: Define KPIs"), "Clarify: Define KPIs");
        assert_eq!(clarify_title("  clarify: goals  "), "clarify: goals");
    }

    #[test]
    fn missing_goal_uses_sentinel() {
        let doc = make_clarify_doc("Define KPIs", "", &[], &[]);
        assert!(doc.starts_with("# Clarify: Define KPIs"));
        assert!(doc.contains("- **task_goal:** (missing)"));
        assert!(doc.contains("- (not provided)"));
    }

    #[test]
    fn goal_and_context_lists_are_rendered() {
        let doc = make_clarify_doc(
            "Plan launch",
            "mobile fitness app",
            &strings(&["solo founder"]),
            &strings(&["ship in 8 weeks"]),
        );
        assert!(doc.contains("- **task_goal:** mobile fitness app"));
        assert!(doc.contains("- solo founder"));
        assert!(doc.contains("- ship in 8 weeks"));
        assert!(!doc.contains("(not provided)"));
    }

    #[test]
    fn context_lists_cap_at_six_entries() {
        let many: Vec<String> = (1..=9).map(|i| format!("assumption {i}")).collect();
        let doc = make_clarify_doc("Plan", "goal words here", &many, &[]);
        assert!(doc.contains("- assumption 6"));
        assert!(!doc.contains("- assumption 7"));
    }

    #[test]
    fn all_six_questions_are_asked() {
        let doc = make_clarify_doc("Plan", "goal", &[], &[]);
        for question in CLARIFY_QUESTIONS {
            assert!(doc.contains(question), "missing question: {question}");
        }
    }
}

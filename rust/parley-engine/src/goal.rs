//! Goals: named targets with constraints, a success template and a
//! confirmation policy.

use parley_state::{PathExpr, ScopedPath, Snapshot, StateResult};

use crate::validation::{Constraint, Violation};

#[derive(Debug, Clone, Default)]
pub struct Goal {
    pub name: String,
    pub constraints: Vec<Constraint>,
    /// Pieces joined without separators before rendering.
    pub success_template: Vec<String>,
    /// Names of the actions run once the goal is satisfied.
    pub success_actions: Vec<String>,
    /// Ask "Is that okay?" before running the success actions.
    pub confirm_on_valid: bool,
    /// Spoken when the goal becomes active after a denial.
    pub initial_response_prompt: Option<String>,
    /// Goal to switch to when the user rejects the confirmation.
    pub deny_goal: Option<String>,
    /// Paths under `utt:/objects` owned by this goal.
    pub object_slots: Vec<PathExpr>,
}

impl Goal {
    pub fn new(name: impl Into<String>) -> Self {
        Goal {
            name: name.into(),
            ..Goal::default()
        }
    }

    /// Constraints declared on `slot`.
    pub fn constraints_for<'a>(
        &'a self,
        slot: &'a ScopedPath,
    ) -> impl Iterator<Item = &'a Constraint> + 'a {
        self.constraints.iter().filter(move |c| &c.slot == slot)
    }

    /// Every violated constraint, in declaration order.
    pub fn violations(&self, snapshot: &Snapshot) -> StateResult<Vec<Violation>> {
        let mut violations = Vec::new();
        for constraint in &self.constraints {
            if let Some(violation) = constraint.check(snapshot)? {
                violations.push(violation);
            }
        }
        Ok(violations)
    }

    /// Renders the success template against `snapshot`.
    ///
    /// Words of the form `<scope:path>rest` become the stored value's text
    /// followed by `rest`; an empty slot renders as nothing.
    pub fn render_success(&self, snapshot: &Snapshot) -> StateResult<String> {
        let template = self.success_template.concat();
        let mut words = Vec::new();
        for word in template.split_whitespace() {
            let placeholder = word
                .strip_prefix('<')
                .and_then(|rest| rest.split_once('>'));
            match placeholder {
                Some((path, rest)) => {
                    let value = snapshot.text_at(path)?.unwrap_or_default();
                    words.push(format!("{value}{rest}"));
                }
                None => words.push(word.to_string()),
            }
        }
        Ok(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::NotNull;
    use parley_state::Node;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn ticket() -> Goal {
        let slot = |p: &str| ScopedPath::parse(p).unwrap();
        Goal {
            constraints: vec![
                Constraint::new(slot("utt:/objects/ticket.title"), "Title?", Arc::new(NotNull)),
                Constraint::new(slot("utt:/objects/ticket.assignee"), "Who?", Arc::new(NotNull)),
            ],
            success_template: vec![
                "You are creating a ticket called <utt:/objects/ticket.title>, ".into(),
                "assigned to <utt:/objects/ticket.assignee>.".into(),
            ],
            ..Goal::new("createTicket")
        }
    }

    #[test]
    fn renders_placeholders_with_trailing_text() {
        let snapshot = Snapshot::default()
            .put_at("utt:/objects/ticket.title", Node::str("hello"))
            .unwrap()
            .put_at("utt:/objects/ticket.assignee", Node::str("matt"))
            .unwrap();
        assert_eq!(
            ticket().render_success(&snapshot).unwrap(),
            "You are creating a ticket called hello, assigned to matt."
        );
    }

    #[test]
    fn missing_values_render_empty() {
        let rendered = ticket().render_success(&Snapshot::default()).unwrap();
        assert_eq!(rendered, "You are creating a ticket called , assigned to .");
    }

    #[test]
    fn violations_keep_declaration_order() {
        let snapshot = Snapshot::default();
        let prompts: Vec<String> = ticket()
            .violations(&snapshot)
            .unwrap()
            .into_iter()
            .map(|v| v.prompt)
            .collect();
        assert_eq!(prompts, vec!["Title?", "Who?"]);
    }

    #[test]
    fn finds_constraints_by_slot() {
        let goal = ticket();
        let slot = ScopedPath::parse("utt:/objects/ticket.assignee").unwrap();
        let prompts: Vec<&str> = goal.constraints_for(&slot).map(|c| c.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["Who?"]);
    }
}

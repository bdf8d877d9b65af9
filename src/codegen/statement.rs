use crate::models::{ActionKind, ActionRecord, Locator};

/// Abstract replay statement. One per Click/Type record, in log order;
/// the preamble and postamble are fixed by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    WaitAndClick { locator: Locator },
    WaitAndType { locator: Locator, value: String },
}

/// Phase one of generation: map the action log onto statements.
/// Unknown record kinds are skipped silently; the order of surrounding
/// valid records is preserved.
pub fn plan(actions: &[ActionRecord]) -> Vec<Statement> {
    actions
        .iter()
        .filter_map(|record| match record.kind {
            ActionKind::Click => Some(Statement::WaitAndClick {
                locator: record.locator.clone(),
            }),
            ActionKind::Type => Some(Statement::WaitAndType {
                locator: record.locator.clone(),
                value: record.value.clone().unwrap_or_default(),
            }),
            ActionKind::Unknown => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_preserves_log_order() {
        let actions = vec![
            ActionRecord::click(Locator::css("#submit")),
            ActionRecord::type_into(Locator::css("input[name='q']"), "hello"),
            ActionRecord::click(Locator::xpath("//a[contains(text(),'Next')]")),
        ];

        let statements = plan(&actions);
        assert_eq!(statements.len(), 3);
        assert!(matches!(statements[0], Statement::WaitAndClick { .. }));
        assert!(matches!(statements[1], Statement::WaitAndType { .. }));
        assert!(matches!(statements[2], Statement::WaitAndClick { .. }));
    }

    #[test]
    fn unknown_kinds_are_skipped_without_disturbing_neighbors() {
        let unknown = ActionRecord {
            kind: crate::models::ActionKind::Unknown,
            locator: Locator::css("#mystery"),
            value: None,
        };
        let actions = vec![
            ActionRecord::click(Locator::css("#first")),
            unknown,
            ActionRecord::click(Locator::css("#last")),
        ];

        let statements = plan(&actions);
        assert_eq!(statements.len(), 2);
        assert_eq!(
            statements[0],
            Statement::WaitAndClick {
                locator: Locator::css("#first")
            }
        );
        assert_eq!(
            statements[1],
            Statement::WaitAndClick {
                locator: Locator::css("#last")
            }
        );
    }

    #[test]
    fn empty_log_plans_to_no_statements() {
        assert!(plan(&[]).is_empty());
    }
}

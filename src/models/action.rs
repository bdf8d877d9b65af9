use serde::{Deserialize, Serialize};

/// Kind of a recorded user interaction.
///
/// `Unknown` absorbs any unrecognized kind arriving over the wire (e.g. a
/// newer capture script shipping kinds this build does not know). The
/// generator skips such records silently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    Type,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocatorStrategy {
    Css,
    Xpath,
}

/// A (strategy, expression) pair identifying an element in the rendered
/// page. The expression is always non-empty: resolution either produces a
/// usable locator or nothing at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Locator {
    pub strategy: LocatorStrategy,
    pub expression: String,
}

impl Locator {
    pub fn css(expression: impl Into<String>) -> Self {
        Self {
            strategy: LocatorStrategy::Css,
            expression: expression.into(),
        }
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Self {
            strategy: LocatorStrategy::Xpath,
            expression: expression.into(),
        }
    }
}

/// One resolved user interaction. Immutable once appended to a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionRecord {
    pub kind: ActionKind,
    pub locator: Locator,
    /// Final field content for `Type`; absent for `Click`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ActionRecord {
    pub fn click(locator: Locator) -> Self {
        Self {
            kind: ActionKind::Click,
            locator,
            value: None,
        }
    }

    pub fn type_into(locator: Locator, value: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Type,
            locator,
            value: Some(value.into()),
        }
    }
}

/// Snapshot of the interacted element, shipped by the capture script with
/// every event. `classes` is carried for diagnostics only; locator
/// resolution never uses it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ElementSnapshot {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub classes: Vec<String>,
}

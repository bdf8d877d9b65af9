//! Locator resolution: element snapshot -> best-effort stable locator.
//!
//! Strict priority, first match wins, never combined: id, then name, then
//! a short visible-text contains match. Elements matching none of the
//! rules are unrecordable by design; no nth-child style path computation
//! is attempted.

use crate::models::{ElementSnapshot, Locator};

/// Upper bound (in chars) for the text-based locator. Longer text is
/// almost certainly paragraph content rather than a label.
const MAX_TEXT_LOCATOR_LEN: usize = 39;

/// Resolve a snapshot to the single best locator, or `None` if the
/// element carries nothing stable enough to find it again.
pub fn resolve(snapshot: &ElementSnapshot) -> Option<Locator> {
    if !snapshot.id.is_empty() {
        return Some(Locator::css(format!("#{}", snapshot.id)));
    }

    let tag = snapshot.tag.to_lowercase();

    if !snapshot.name.is_empty() {
        return Some(Locator::css(format!("{}[name='{}']", tag, snapshot.name)));
    }

    let text = snapshot.text.trim();
    let len = text.chars().count();
    if (1..=MAX_TEXT_LOCATOR_LEN).contains(&len) {
        return Some(Locator::xpath(format!("//{}[contains(text(),'{}')]", tag, text)));
    }

    None
}

//! Track module/item tree limits and validation.
//!
//! A track owns an ordered list of modules, each owning an ordered list of
//! roadmap items. Writes always replace the whole tree; this module holds the
//! rules the input must satisfy before any row is touched, plus the batching
//! and time-budget constants the db layer applies while writing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum number of modules a single track may hold.
pub const MAX_MODULES_PER_TRACK: usize = 500;

/// Maximum number of item rows written by one batch insert.
pub const ITEM_INSERT_BATCH_SIZE: usize = 200;

/// Maximum length (in characters) of a track, module, or item title.
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum length (in characters) of an item's external link.
pub const MAX_LINK_LEN: usize = 2048;

// ---------------------------------------------------------------------------
// Time budgets
// ---------------------------------------------------------------------------

/// Default budget for deleting the old module/item tree.
pub const DEFAULT_DELETE_PHASE_TIMEOUT: Duration = Duration::from_secs(15);

/// Default budget for writing the new module/item tree.
pub const DEFAULT_RECREATE_PHASE_TIMEOUT: Duration = Duration::from_secs(30);

/// The two stages of a tree replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TreePhase {
    /// Removing progress, items, and modules of the existing tree.
    Delete,
    /// Updating the track row and inserting the new modules and items.
    Recreate,
}

impl TreePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Recreate => "recreate",
        }
    }
}

impl std::fmt::Display for TreePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// One roadmap item of an incoming tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInput {
    pub title: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// One module of an incoming tree, with its items in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInput {
    pub title: String,
    #[serde(default)]
    pub items: Vec<ItemInput>,
}

/// Row counts of a tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeCounts {
    pub modules: usize,
    pub items: usize,
}

impl TreeCounts {
    pub fn of(modules: &[ModuleInput]) -> Self {
        Self {
            modules: modules.len(),
            items: modules.iter().map(|m| m.items.len()).sum(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject trees with more than [`MAX_MODULES_PER_TRACK`] modules.
pub fn validate_module_count(count: usize) -> Result<(), CoreError> {
    if count > MAX_MODULES_PER_TRACK {
        return Err(CoreError::Validation(format!(
            "A track may have at most {MAX_MODULES_PER_TRACK} modules, got {count}"
        )));
    }
    Ok(())
}

/// PostgreSQL `TEXT` cannot store NUL, so it is rejected up front.
fn validate_text(value: &str, field: &str) -> Result<(), CoreError> {
    if value.contains('\0') {
        return Err(CoreError::Validation(format!(
            "{field} must not contain NUL characters"
        )));
    }
    Ok(())
}

fn validate_title(title: &str, field: &str) -> Result<(), CoreError> {
    validate_text(title, field)?;
    if title.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_TITLE_LEN} characters, got {len}"
        )));
    }
    Ok(())
}

/// Validate a complete track payload.
///
/// The module count is checked first so an oversized tree is rejected without
/// walking it. Error messages name the offending field by position, e.g.
/// `modules[3].items[7].title`.
pub fn validate_tree(
    title: &str,
    description: &str,
    modules: &[ModuleInput],
) -> Result<(), CoreError> {
    validate_module_count(modules.len())?;
    validate_title(title, "title")?;
    validate_text(description, "description")?;

    for (m, module) in modules.iter().enumerate() {
        validate_title(&module.title, &format!("modules[{m}].title"))?;
        for (i, item) in module.items.iter().enumerate() {
            validate_title(&item.title, &format!("modules[{m}].items[{i}].title"))?;
            if let Some(link) = &item.link {
                validate_text(link, &format!("modules[{m}].items[{i}].link"))?;
                let len = link.chars().count();
                if len > MAX_LINK_LEN {
                    return Err(CoreError::Validation(format!(
                        "modules[{m}].items[{i}].link must be at most {MAX_LINK_LEN} \
                         characters, got {len}"
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Blank links are stored as `NULL`; anything else is trimmed.
pub fn normalize_link(link: Option<String>) -> Option<String> {
    link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty())
}

/// Apply [`normalize_link`] to every item of a tree.
pub fn normalize_tree(modules: Vec<ModuleInput>) -> Vec<ModuleInput> {
    modules
        .into_iter()
        .map(|module| ModuleInput {
            title: module.title,
            items: module
                .items
                .into_iter()
                .map(|item| ItemInput {
                    title: item.title,
                    link: normalize_link(item.link),
                })
                .collect(),
        })
        .collect()
}

/// Split a module's items into insert batches of [`ITEM_INSERT_BATCH_SIZE`].
pub fn item_batches(items: &[ItemInput]) -> std::slice::Chunks<'_, ItemInput> {
    items.chunks(ITEM_INSERT_BATCH_SIZE)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn item(title: &str) -> ItemInput {
        ItemInput {
            title: title.to_string(),
            link: None,
        }
    }

    fn module(title: &str, items: usize) -> ModuleInput {
        ModuleInput {
            title: title.to_string(),
            items: (0..items).map(|i| item(&format!("item {i}"))).collect(),
        }
    }

    #[test]
    fn module_count_at_limit_is_accepted() {
        assert!(validate_module_count(MAX_MODULES_PER_TRACK).is_ok());
    }

    #[test]
    fn module_count_over_limit_is_rejected() {
        let err = validate_module_count(MAX_MODULES_PER_TRACK + 1).unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg.contains("501"));
    }

    #[test]
    fn oversized_tree_fails_on_count_before_titles() {
        // Blank titles everywhere; the count check must win.
        let modules: Vec<_> = (0..501).map(|_| module("", 0)).collect();
        let err = validate_tree("", "", &modules).unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg.contains("at most 500 modules"));
    }

    #[test]
    fn blank_track_title_is_rejected() {
        let err = validate_tree("   ", "", &[module("A", 1)]).unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg == "title must not be empty");
    }

    #[test]
    fn blank_item_title_names_its_position() {
        let mut modules = vec![module("A", 2), module("B", 3)];
        modules[1].items[2].title = String::new();
        let err = validate_tree("Track", "", &modules).unwrap_err();
        assert_matches!(
            err,
            CoreError::Validation(ref msg) if msg == "modules[1].items[2].title must not be empty"
        );
    }

    #[test]
    fn overlong_link_is_rejected() {
        let mut modules = vec![module("A", 1)];
        modules[0].items[0].link = Some("x".repeat(MAX_LINK_LEN + 1));
        assert!(validate_tree("Track", "", &modules).is_err());
    }

    #[test]
    fn nul_characters_are_rejected() {
        let mut modules = vec![module("a\0b", 1)];
        let err = validate_tree("Track", "", &modules).unwrap_err();
        assert_matches!(
            err,
            CoreError::Validation(ref msg) if msg == "modules[0].title must not contain NUL characters"
        );

        modules[0].title = "A".into();
        modules[0].items[0].link = Some("https://example.com/\0".into());
        let err = validate_tree("Track", "", &modules).unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg.starts_with("modules[0].items[0].link"));

        let err = validate_tree("Track", "bad\0text", &[]).unwrap_err();
        assert_matches!(err, CoreError::Validation(ref msg) if msg.starts_with("description"));
    }

    #[test]
    fn empty_tree_is_valid() {
        assert!(validate_tree("Track", "", &[]).is_ok());
    }

    #[test]
    fn blank_links_normalize_to_none() {
        assert_eq!(normalize_link(None), None);
        assert_eq!(normalize_link(Some(String::new())), None);
        assert_eq!(normalize_link(Some("   ".into())), None);
        assert_eq!(
            normalize_link(Some(" https://example.com ".into())),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn item_batches_respect_batch_size() {
        let items: Vec<_> = (0..450).map(|i| item(&i.to_string())).collect();
        let sizes: Vec<usize> = item_batches(&items).map(<[ItemInput]>::len).collect();
        assert_eq!(sizes, vec![200, 200, 50]);
    }

    #[test]
    fn tree_counts_sum_items() {
        let counts = TreeCounts::of(&[module("A", 3), module("B", 1)]);
        assert_eq!(counts, TreeCounts { modules: 2, items: 4 });
    }

    #[test]
    fn phase_display() {
        assert_eq!(TreePhase::Delete.to_string(), "delete");
        assert_eq!(TreePhase::Recreate.to_string(), "recreate");
    }

    #[test]
    fn module_input_items_default_to_empty() {
        let module: ModuleInput = serde_json::from_str(r#"{"title":"A"}"#).unwrap();
        assert!(module.items.is_empty());
    }
}

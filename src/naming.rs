//! Qualified page names.
//!
//! PhenoTips refers to users, groups, studies and patient pages as
//! `xwiki:Namespace.Name`. Callers work with bare names; these helpers
//! convert in both directions.

use crate::error::{PhenoTipsError, Result};

/// Wiki prefix of every qualified name.
pub const WIKI_PREFIX: &str = "xwiki:";

/// Namespace of user accounts.
pub const USERS_SPACE: &str = "XWiki";
/// Namespace of work groups.
pub const GROUPS_SPACE: &str = "Groups";
/// Namespace of studies.
pub const STUDIES_SPACE: &str = "Studies";
/// Namespace of patient records.
pub const DATA_SPACE: &str = "data";

/// Qualify a page name as `xwiki:<namespace>.<name>`.
///
/// A name that already contains a `.` keeps its namespace, and a name that
/// already contains a `:` keeps its wiki. Empty names stay empty.
///
/// ```
/// use phenotips::naming::qualify;
///
/// assert_eq!(qualify("Admin", "XWiki"), "xwiki:XWiki.Admin");
/// assert_eq!(qualify("Groups.Lab", "XWiki"), "xwiki:Groups.Lab");
/// assert_eq!(qualify("xwiki:XWiki.Admin", "XWiki"), "xwiki:XWiki.Admin");
/// ```
pub fn qualify(name: &str, namespace: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    let mut qualified = if name.contains('.') {
        name.to_string()
    } else {
        format!("{namespace}.{name}")
    };
    if !qualified.contains(':') {
        qualified.insert_str(0, WIKI_PREFIX);
    }
    qualified
}

/// Strip the qualification added by [`qualify`].
///
/// `xwiki:<namespace>.` is removed when present; otherwise only `xwiki:` is
/// removed, leaving names from other namespaces as `Other.Name`.
///
/// # Errors
///
/// Returns [`PhenoTipsError::InvalidName`] if the name does not start with
/// `xwiki:`.
pub fn unqualify(name: &str, namespace: &str) -> Result<String> {
    let Some(rest) = name.strip_prefix(WIKI_PREFIX) else {
        return Err(PhenoTipsError::InvalidName {
            name: name.to_string(),
            namespace: namespace.to_string(),
        });
    };
    let bare = rest
        .strip_prefix(namespace)
        .and_then(|r| r.strip_prefix('.'))
        .unwrap_or(rest);
    Ok(bare.to_string())
}

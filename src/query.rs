//! HQL query construction.
//!
//! The PhenoTips query endpoint accepts XWiki's short HQL form: the server
//! prepends `select doc.fullName from XWikiDocument as doc`, and the caller
//! supplies extra `from` entries and a `where` clause. [`HqlQuery`] keeps the
//! structural parts of a query as static strings and lets values enter only
//! through named parameters, which are rendered as escaped string literals.

use serde::{Deserialize, Serialize};

use crate::models::{OBJECT_CLASS_OWNER, OBJECT_CLASS_PATIENT, OBJECT_CLASS_STUDY_BINDING};
use crate::naming::{qualify, DATA_SPACE, STUDIES_SPACE, USERS_SPACE};

/// A short-form HQL query with named parameters.
///
/// Predicates reference parameters as `:name`. Only `'static` fragments can
/// become query structure, so runtime input always ends up inside a quoted
/// literal.
///
/// ```
/// use phenotips::HqlQuery;
///
/// let query = HqlQuery::new()
///     .from("BaseObject", "obj")
///     .filter("doc.space = :space")
///     .bind("space", "Studies");
/// assert_eq!(query.render(), ", BaseObject as obj where doc.space = 'Studies'");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HqlQuery {
    from: Vec<(&'static str, &'static str)>,
    predicates: Vec<&'static str>,
    params: Vec<(&'static str, String)>,
}

impl HqlQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `<entity> as <alias>` to the from clause.
    pub fn from(mut self, entity: &'static str, alias: &'static str) -> Self {
        self.from.push((entity, alias));
        self
    }

    /// Add a predicate; all predicates are joined with `and`.
    pub fn filter(mut self, predicate: &'static str) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Bind a value to the `:name` parameter. Rebinding replaces the value.
    pub fn bind(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    /// Value bound to a parameter, if any.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Query over pages of one space, optionally only those carrying an
    /// object of the given class.
    pub fn pages_in_space(space: &str, having_object: Option<&str>) -> Self {
        let mut query = Self::new();
        if having_object.is_some() {
            query = query.from("BaseObject", "obj");
        }
        query = query.filter("doc.space = :space").bind("space", space);
        if let Some(class) = having_object {
            query = query
                .filter("doc.fullName = obj.name")
                .filter("obj.className = :objectClass")
                .bind("objectClass", class);
        }
        query
    }

    /// Query over patient records matching a filter.
    pub fn patients(filter: &PatientFilter) -> Self {
        let mut query = Self::new().from("BaseObject", "obj");
        if filter.study.is_some() {
            query = query
                .from("BaseObject", "study_obj")
                .from("StringProperty", "study_prop");
        }
        let owner = filter.owner.as_deref().filter(|o| !o.is_empty());
        if owner.is_some() {
            query = query
                .from("BaseObject", "owner_obj")
                .from("StringProperty", "owner_prop");
        }
        let having_object = filter.having_object.as_deref().filter(|c| !c.is_empty());
        if having_object.is_some() {
            query = query.from("BaseObject", "needful_obj");
        }

        query = query
            .filter("doc.space = :space")
            .filter("doc.fullName = obj.name")
            .filter("obj.className = :patientClass")
            .bind("space", DATA_SPACE)
            .bind("patientClass", OBJECT_CLASS_PATIENT);

        if let Some(class) = having_object {
            query = query
                .filter("doc.fullName = needful_obj.name")
                .filter("needful_obj.className = :havingClass")
                .bind("havingClass", class);
        }
        if let Some(study) = &filter.study {
            query = query
                .filter("doc.fullName = study_obj.name")
                .filter("study_obj.className = :studyClass")
                .filter("study_obj.id = study_prop.id.id")
                .filter("study_prop.id.name = 'studyReference'")
                .filter("study_prop.value = :study")
                .bind("studyClass", OBJECT_CLASS_STUDY_BINDING)
                .bind("study", qualify(study, STUDIES_SPACE));
        }
        if let Some(owner) = owner {
            query = query
                .filter("doc.fullName = owner_obj.name")
                .filter("owner_obj.className = :ownerClass")
                .filter("owner_obj.id = owner_prop.id.id")
                .filter("owner_prop.id.name = 'owner'")
                .filter("owner_prop.value = :owner")
                .bind("ownerClass", OBJECT_CLASS_OWNER)
                .bind("owner", qualify(owner, USERS_SPACE));
        }
        query
    }

    /// Render the query text sent to the server.
    ///
    /// Placeholders without a bound value are left untouched.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (entity, alias) in &self.from {
            out.push_str(&format!(", {entity} as {alias}"));
        }
        if !self.predicates.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str("where ");
            let rendered: Vec<String> = self
                .predicates
                .iter()
                .map(|p| self.substitute(p))
                .collect();
            out.push_str(&rendered.join(" and "));
        }
        out
    }

    fn substitute(&self, predicate: &str) -> String {
        let mut out = String::with_capacity(predicate.len());
        let mut chars = predicate.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c != ':' {
                out.push(c);
                continue;
            }
            let start = i + 1;
            let mut end = start;
            while let Some(&(j, next)) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    end = j + next.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let name = &predicate[start..end];
            match self.param(name) {
                Some(value) if !name.is_empty() => out.push_str(&quote_literal(value)),
                _ => {
                    out.push(':');
                    out.push_str(name);
                }
            }
        }
        out
    }
}

impl std::fmt::Display for HqlQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

/// Quote a value as an HQL string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Restrictions for [`PhenoTipsClient::list`](crate::PhenoTipsClient::list).
///
/// `study` and `owner` are bare names; they are qualified before use.
/// `Some("")` as the study selects patients bound to the default study; an
/// empty owner or object class applies no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientFilter {
    pub study: Option<String>,
    pub owner: Option<String>,
    /// Only patients carrying at least one object of this class.
    pub having_object: Option<String>,
}

impl PatientFilter {
    pub fn study(mut self, study: impl Into<String>) -> Self {
        self.study = Some(study.into());
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn having_object(mut self, class: impl Into<String>) -> Self {
        self.having_object = Some(class.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patients_query() {
        let query = HqlQuery::patients(&PatientFilter::default());
        assert_eq!(
            query.render(),
            ", BaseObject as obj where doc.space = 'data' and doc.fullName = obj.name \
             and obj.className = 'PhenoTips.PatientClass'"
        );
    }

    #[test]
    fn test_study_and_owner_query() {
        let filter = PatientFilter::default().study("Cohort1").owner("jdoe");
        let rendered = HqlQuery::patients(&filter).render();
        assert!(rendered.starts_with(
            ", BaseObject as obj, BaseObject as study_obj, StringProperty as study_prop, \
             BaseObject as owner_obj, StringProperty as owner_prop where"
        ));
        assert!(rendered.contains("study_prop.value = 'xwiki:Studies.Cohort1'"));
        assert!(rendered.contains("owner_prop.value = 'xwiki:XWiki.jdoe'"));
        assert!(rendered.contains("study_obj.className = 'PhenoTips.StudyBindingClass'"));
    }

    #[test]
    fn test_empty_owner_is_ignored() {
        let filter = PatientFilter::default().owner("");
        assert_eq!(
            HqlQuery::patients(&filter),
            HqlQuery::patients(&PatientFilter::default())
        );
    }

    #[test]
    fn test_having_object_query() {
        let filter = PatientFilter::default().having_object("PhenoTips.VCF");
        let rendered = HqlQuery::patients(&filter).render();
        assert!(rendered.contains(", BaseObject as needful_obj where"));
        assert!(rendered.contains("needful_obj.className = 'PhenoTips.VCF'"));
    }

    #[test]
    fn test_empty_having_object_is_ignored() {
        let filter = PatientFilter::default().having_object("");
        assert_eq!(
            HqlQuery::patients(&filter),
            HqlQuery::patients(&PatientFilter::default())
        );
    }

    #[test]
    fn test_values_cannot_escape_literal() {
        let filter = PatientFilter::default().study("x' or '1'='1");
        let rendered = HqlQuery::patients(&filter).render();
        assert!(rendered.contains("study_prop.value = 'xwiki:Studies.x'' or ''1''=''1'"));
    }

    #[test]
    fn test_pages_in_space() {
        let query = HqlQuery::pages_in_space("Studies", Some("PhenoTips.StudyClass"));
        assert_eq!(
            query.render(),
            ", BaseObject as obj where doc.space = 'Studies' and doc.fullName = obj.name \
             and obj.className = 'PhenoTips.StudyClass'"
        );

        let query = HqlQuery::pages_in_space("XWiki", None);
        assert_eq!(query.render(), "where doc.space = 'XWiki'");
    }

    #[test]
    fn test_unbound_placeholder_left_alone() {
        let query = HqlQuery::new().filter("doc.space = :space");
        assert_eq!(query.render(), "where doc.space = :space");
    }

    #[test]
    fn test_rebind_replaces_value() {
        let query = HqlQuery::new()
            .filter("doc.space = :space")
            .bind("space", "XWiki")
            .bind("space", "Groups");
        assert_eq!(query.render(), "where doc.space = 'Groups'");
    }
}

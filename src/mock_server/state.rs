//! Mock server state management.
//!
//! Provides the in-memory data store for the mock PhenoTips server.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{
    ClassSchema, PropertyMap, OBJECT_CLASS_OWNER, OBJECT_CLASS_PATIENT,
    OBJECT_CLASS_STUDY_BINDING,
};
use crate::naming::{qualify, DATA_SPACE, STUDIES_SPACE, USERS_SPACE, WIKI_PREFIX};

/// Objects of one class on a page, by number.
pub type ObjectSet = BTreeMap<u32, PropertyMap>;

/// One patient page.
#[derive(Debug, Clone, Default)]
pub struct MockPatient {
    /// Objects by class name.
    pub objects: BTreeMap<String, ObjectSet>,
    /// Attachment contents by file name.
    pub attachments: HashMap<String, Vec<u8>>,
    /// Set once the edit view was requested.
    pub edited: bool,
}

impl MockPatient {
    /// A patient with the given primary properties.
    pub fn new(props: &[(&str, &str)]) -> Self {
        Self::default().with_object(OBJECT_CLASS_PATIENT, props)
    }

    /// Add an object with the next free number.
    pub fn with_object(mut self, class: &str, props: &[(&str, &str)]) -> Self {
        let props = props
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.add_object(class, props);
        self
    }

    /// Owner object referencing a user or `Groups.<name>`.
    pub fn with_owner(self, owner: &str) -> Self {
        let owner = qualify(owner, USERS_SPACE);
        self.with_object(OBJECT_CLASS_OWNER, &[("owner", &owner)])
    }

    /// Study binding; an empty name binds the default study.
    pub fn with_study(self, study: &str) -> Self {
        let reference = qualify(study, STUDIES_SPACE);
        self.with_object(OBJECT_CLASS_STUDY_BINDING, &[("studyReference", &reference)])
    }

    pub fn with_attachment(mut self, filename: &str, contents: &[u8]) -> Self {
        self.attachments
            .insert(filename.to_string(), contents.to_vec());
        self
    }

    /// Add an object and return its number.
    pub fn add_object(&mut self, class: &str, props: PropertyMap) -> u32 {
        let objects = self.objects.entry(class.to_string()).or_default();
        let number = objects.keys().next_back().map_or(0, |n| n + 1);
        objects.insert(number, props);
        number
    }

    pub fn object(&self, class: &str, number: u32) -> Option<&PropertyMap> {
        self.objects.get(class).and_then(|objects| objects.get(&number))
    }

    pub fn object_mut(&mut self, class: &str, number: u32) -> Option<&mut PropertyMap> {
        self.objects
            .get_mut(class)
            .and_then(|objects| objects.get_mut(&number))
    }

    /// Remove an object; returns whether it existed.
    pub fn remove_object(&mut self, class: &str, number: u32) -> bool {
        let Some(objects) = self.objects.get_mut(class) else {
            return false;
        };
        let removed = objects.remove(&number).is_some();
        if objects.is_empty() {
            self.objects.remove(class);
        }
        removed
    }

    fn property(&self, class: &str, name: &str) -> Option<&str> {
        self.object(class, 0)
            .and_then(|props| props.get(name))
            .map(String::as_str)
    }
}

/// Shared state for the mock server.
///
/// This struct holds all the mock data that the server will serve.
/// It's wrapped in `Arc<RwLock<_>>` for concurrent access.
#[derive(Debug, Default)]
pub struct MockState {
    /// Patients indexed by ID (e.g., "P0000001").
    pub patients: BTreeMap<String, MockPatient>,

    /// Class schemas indexed by class name.
    pub classes: HashMap<String, ClassSchema>,

    /// Non-patient page names indexed by space (users, groups, studies).
    pub pages: BTreeMap<String, BTreeSet<String>>,

    /// Optional credentials. If set, requests must authenticate with them.
    pub required_credentials: Option<(String, String)>,

    /// Number given to the next created patient.
    pub next_patient: u32,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self {
            next_patient: 1,
            ..Default::default()
        }
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add a patient to the state.
    pub fn with_patient(mut self, id: &str, patient: MockPatient) -> Self {
        self.insert_patient(id, patient);
        self
    }

    /// Add a class schema to the state.
    pub fn with_class(mut self, schema: ClassSchema) -> Self {
        self.classes.insert(schema.name.clone(), schema);
        self
    }

    /// Add a page, e.g. a user in `XWiki` or a study in `Studies`.
    pub fn with_page(mut self, space: &str, name: &str) -> Self {
        self.pages
            .entry(space.to_string())
            .or_default()
            .insert(name.to_string());
        self
    }

    /// Set the required Basic authentication credentials.
    pub fn with_required_credentials(mut self, username: &str, password: &str) -> Self {
        self.required_credentials = Some((username.to_string(), password.to_string()));
        self
    }

    /// Insert a patient, keeping generated IDs clear of it.
    pub fn insert_patient(&mut self, id: &str, patient: MockPatient) {
        if let Some(number) = id.strip_prefix('P').and_then(|n| n.parse::<u32>().ok()) {
            self.next_patient = self.next_patient.max(number + 1);
        }
        self.patients.insert(id.to_string(), patient);
    }

    /// Create an empty patient owned by `owner` and return its ID.
    ///
    /// The primary object carries every property of the patient class
    /// schema, with empty values.
    pub fn create_patient(&mut self, owner: &str) -> String {
        let id = format!("P{:07}", self.next_patient);
        let props: PropertyMap = self
            .classes
            .get(OBJECT_CLASS_PATIENT)
            .map(|schema| {
                schema
                    .property_names()
                    .into_iter()
                    .map(|name| (name.to_string(), String::new()))
                    .collect()
            })
            .unwrap_or_default();

        let mut patient = MockPatient::default().with_owner(owner);
        patient.add_object(OBJECT_CLASS_PATIENT, props);
        self.insert_patient(&id, patient);
        id
    }

    pub fn get_patient(&self, id: &str) -> Option<&MockPatient> {
        self.patients.get(id)
    }

    pub fn get_patient_mut(&mut self, id: &str) -> Option<&mut MockPatient> {
        self.patients.get_mut(id)
    }

    /// IDs of patients whose `external_id` equals `eid`.
    pub fn find_external_id(&self, eid: &str) -> Vec<String> {
        self.patients
            .iter()
            .filter(|(_, patient)| patient.property(OBJECT_CLASS_PATIENT, "external_id") == Some(eid))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Qualified IDs of the pages matching an HQL `where` clause.
    ///
    /// Only equality conditions against string literals are understood;
    /// that covers every query the client issues.
    pub fn query(&self, statement: &str) -> Vec<String> {
        let conditions = literal_conditions(statement);
        let condition = |lhs: &str| {
            conditions
                .iter()
                .find(|(l, _)| l == lhs)
                .map(|(_, v)| v.as_str())
        };

        let Some(space) = condition("doc.space") else {
            return Vec::new();
        };
        if space != DATA_SPACE {
            return self
                .pages
                .get(space)
                .map(|names| {
                    names
                        .iter()
                        .map(|name| format!("{WIKI_PREFIX}{space}.{name}"))
                        .collect()
                })
                .unwrap_or_default();
        }

        self.patients
            .iter()
            .filter(|(_, patient)| {
                let has = |class: Option<&str>| {
                    class.map_or(true, |class| patient.objects.contains_key(class))
                };
                has(condition("obj.className"))
                    && has(condition("needful_obj.className"))
                    && condition("study_prop.value").map_or(true, |study| {
                        patient.property(OBJECT_CLASS_STUDY_BINDING, "studyReference")
                            == Some(study)
                    })
                    && condition("owner_prop.value").map_or(true, |owner| {
                        patient.property(OBJECT_CLASS_OWNER, "owner") == Some(owner)
                    })
            })
            .map(|(id, _)| format!("{WIKI_PREFIX}{DATA_SPACE}.{id}"))
            .collect()
    }
}

/// `(left side, literal)` pairs of every `x = '...'` in a statement.
fn literal_conditions(statement: &str) -> Vec<(String, String)> {
    let mut conditions = Vec::new();
    let mut rest = statement;
    while let Some(pos) = rest.find(" = '") {
        let lhs = rest[..pos]
            .rsplit(' ')
            .next()
            .unwrap_or_default()
            .to_string();

        let mut literal = String::new();
        let mut chars = rest[pos + 4..].char_indices();
        let mut consumed = rest.len() - pos - 4;
        while let Some((i, c)) = chars.next() {
            if c == '\'' {
                if rest[pos + 4 + i + 1..].starts_with('\'') {
                    literal.push('\'');
                    chars.next();
                    continue;
                }
                consumed = i + 1;
                break;
            }
            literal.push(c);
        }

        conditions.push((lhs, literal));
        rest = &rest[pos + 4 + consumed..];
    }
    conditions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{HqlQuery, PatientFilter};

    fn sample_state() -> MockState {
        MockState::new()
            .with_patient(
                "P0000001",
                MockPatient::new(&[("first_name", "Ann")])
                    .with_owner("jdoe")
                    .with_study("Cohort1"),
            )
            .with_patient(
                "P0000002",
                MockPatient::new(&[("first_name", "Bo")]).with_owner("Admin"),
            )
            .with_page("Studies", "Cohort1")
    }

    #[test]
    fn test_literal_conditions_unescape_quotes() {
        let conditions = literal_conditions("where a.b = 'x''y' and c = 'z'");
        assert_eq!(
            conditions,
            vec![
                ("a.b".to_string(), "x'y".to_string()),
                ("c".to_string(), "z".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_filters_patients() {
        let state = sample_state();

        let all = state.query(&HqlQuery::patients(&PatientFilter::default()).render());
        assert_eq!(all, vec!["xwiki:data.P0000001", "xwiki:data.P0000002"]);

        let filter = PatientFilter::default().study("Cohort1");
        assert_eq!(
            state.query(&HqlQuery::patients(&filter).render()),
            vec!["xwiki:data.P0000001"]
        );

        let filter = PatientFilter::default().owner("Admin");
        assert_eq!(
            state.query(&HqlQuery::patients(&filter).render()),
            vec!["xwiki:data.P0000002"]
        );
    }

    #[test]
    fn test_query_pages_in_space() {
        let state = sample_state();
        let query = HqlQuery::pages_in_space("Studies", Some("PhenoTips.StudyClass"));
        assert_eq!(state.query(&query.render()), vec!["xwiki:Studies.Cohort1"]);
    }

    #[test]
    fn test_create_patient_numbers_after_existing() {
        let mut state = sample_state();
        let id = state.create_patient("Admin");
        assert_eq!(id, "P0000003");
        assert_eq!(
            state.get_patient(&id).unwrap().property(OBJECT_CLASS_OWNER, "owner"),
            Some("xwiki:XWiki.Admin")
        );
    }

    #[test]
    fn test_object_numbers_increase() {
        let mut patient = MockPatient::default();
        assert_eq!(patient.add_object("C", PropertyMap::new()), 0);
        assert_eq!(patient.add_object("C", PropertyMap::new()), 1);
        assert!(patient.remove_object("C", 0));
        assert_eq!(patient.add_object("C", PropertyMap::new()), 2);
        assert!(!patient.remove_object("Missing", 0));
    }
}

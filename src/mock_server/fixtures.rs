//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use super::state::MockPatient;
use crate::models::{
    ClassSchema, PropertyType, OBJECT_CLASS_PATIENT, OBJECT_CLASS_VCF,
};
use crate::naming::{GROUPS_SPACE, STUDIES_SPACE, USERS_SPACE};

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // Class Fixtures
    // =========================================================================

    /// A small `PhenoTips.PatientClass` schema.
    pub fn patient_class() -> ClassSchema {
        let mut schema = ClassSchema::new(OBJECT_CLASS_PATIENT);
        schema
            .properties
            .insert("external_id".to_string(), Self::string_property());
        schema
            .properties
            .insert("first_name".to_string(), Self::string_property());
        schema
            .properties
            .insert("last_name".to_string(), Self::string_property());
        schema.properties.insert(
            "gender".to_string(),
            PropertyType {
                type_name: "StaticList".to_string(),
                values: Some(PropertyType::parse_values("M=Male|F=Female|O=Other")),
                ..Default::default()
            },
        );
        schema.properties.insert(
            "apgar1".to_string(),
            PropertyType {
                type_name: "Number".to_string(),
                number_type: Some("integer".to_string()),
                ..Default::default()
            },
        );
        schema
    }

    fn string_property() -> PropertyType {
        PropertyType {
            type_name: "String".to_string(),
            ..Default::default()
        }
    }

    // =========================================================================
    // Patient Fixtures
    // =========================================================================

    /// A patient with a name, owned by `owner`.
    pub fn named_patient(first: &str, last: &str, owner: &str) -> MockPatient {
        MockPatient::new(&[("first_name", first), ("last_name", last)]).with_owner(owner)
    }

    // =========================================================================
    // Scenario Builders
    // =========================================================================

    /// Create a default set of test data for common scenarios.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario::new()
    }
}

/// A complete test scenario with related entities.
pub struct DefaultScenario {
    pub classes: Vec<ClassSchema>,
    /// `(space, name)` of users, groups and studies.
    pub pages: Vec<(&'static str, &'static str)>,
    pub patients: Vec<(&'static str, MockPatient)>,
}

impl DefaultScenario {
    fn new() -> Self {
        let classes = vec![Fixtures::patient_class()];

        let pages = vec![
            (USERS_SPACE, "Admin"),
            (USERS_SPACE, "jdoe"),
            (GROUPS_SPACE, "Lab"),
            (STUDIES_SPACE, "Cohort1"),
        ];

        let patients = vec![
            (
                "P0000001",
                Fixtures::named_patient("Ann", "Lee", "jdoe").with_study("Cohort1"),
            ),
            ("P0000002", Fixtures::named_patient("Bo", "Smith", "Admin")),
            (
                "P0000003",
                Fixtures::named_patient("Cy", "O'Neil, Jr.", "Groups.Lab")
                    .with_study("Cohort1")
                    .with_object(OBJECT_CLASS_VCF, &[("filename", "cy.vcf")])
                    .with_attachment("cy.vcf", b"##fileformat=VCFv4.2\n"),
            ),
        ];

        Self {
            classes,
            pages,
            patients,
        }
    }
}

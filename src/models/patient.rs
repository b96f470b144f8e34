//! Patient records.

use indexmap::IndexMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::client::PhenoTipsClient;
use crate::error::{PhenoTipsError, Result};
use crate::models::object::{object_path, property_form};
use crate::models::{OBJECT_CLASS_OWNER, OBJECT_CLASS_PATIENT, OBJECT_CLASS_STUDY_BINDING};
use crate::naming::{qualify, unqualify, DATA_SPACE, STUDIES_SPACE, USERS_SPACE};
use crate::query::{HqlQuery, PatientFilter};

/// Property name to raw string value, in server order.
pub type PropertyMap = IndexMap<String, String>;

/// Server-assigned patient identifier, e.g. `P0000001`.
pub type PatientId = String;

/// Optional data applied to a freshly created patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePatient {
    /// Primary properties (`PhenoTips.PatientClass`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<PropertyMap>,
    /// Bare study name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study: Option<String>,
    /// Bare user or group name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Pedigree graph in the editor's serialized JSON form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pedigree: Option<serde_json::Value>,
}

/// Result of resolving an external identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExternalIdMatch {
    /// Exactly one patient carries the external ID.
    Single(PatientId),
    /// Several patients carry the external ID.
    Multiple(Vec<PatientId>),
}

impl ExternalIdMatch {
    /// All matching patient IDs.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            ExternalIdMatch::Single(id) => vec![id.as_str()],
            ExternalIdMatch::Multiple(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PatientJson {
    id: String,
}

impl PhenoTipsClient {
    /// Create a patient and return its ID.
    ///
    /// The optional parts of `data` are applied in order (properties, study,
    /// owner, pedigree). The edit view is then requested once, which makes the
    /// server add its default objects. A failing step aborts the call; steps
    /// already applied are not rolled back.
    #[tracing::instrument(skip(self, data))]
    pub async fn create(&self, data: &CreatePatient) -> Result<PatientId> {
        let response = self.post_empty("rest/patients").await?;
        let patient_id = Self::location_tail(&response, "patient creation")?;
        tracing::info!(%patient_id, "created patient");

        if let Some(props) = &data.patient {
            self.set(&patient_id, props).await?;
        }
        if let Some(study) = &data.study {
            self.set_study(&patient_id, Some(study)).await?;
        }
        if let Some(owner) = &data.owner {
            self.set_owner(&patient_id, owner).await?;
        }
        if let Some(pedigree) = &data.pedigree {
            self.set_pedigree(&patient_id, pedigree).await?;
        }

        // Objects such as PhenoTips.VCF only appear after a visit to the edit view
        let edit_path = format!("bin/edit/data/{}", urlencoding::encode(&patient_id));
        self.get_raw(&edit_path).await?;

        Ok(patient_id)
    }

    /// Delete a patient record.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, patient_id: &str) -> Result<()> {
        let path = format!("rest/patients/{}", urlencoding::encode(patient_id));
        self.delete_raw(&path).await?;
        tracing::info!("deleted patient");
        Ok(())
    }

    /// Primary properties of a patient.
    pub async fn get(&self, patient_id: &str) -> Result<PropertyMap> {
        self.get_object(patient_id, OBJECT_CLASS_PATIENT, 0).await
    }

    /// Update primary properties of a patient.
    pub async fn set(&self, patient_id: &str, props: &PropertyMap) -> Result<()> {
        self.set_object(patient_id, OBJECT_CLASS_PATIENT, 0, props)
            .await
    }

    /// Resolve an external identifier.
    ///
    /// Returns `None` if no patient carries it, a single ID for a unique
    /// match and all candidates when it is ambiguous.
    ///
    /// # Errors
    ///
    /// Returns [`PhenoTipsError::UnexpectedContentType`] if the server answers
    /// with neither JSON nor XML.
    #[tracing::instrument(skip(self))]
    pub async fn get_id(&self, external_id: &str) -> Result<Option<ExternalIdMatch>> {
        let path = format!("rest/patients/eid/{}", urlencoding::encode(external_id));
        let response = self.send_get(&path).await?;
        let response = match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            // Ambiguous IDs are answered with 300 and a list of alternatives
            StatusCode::MULTIPLE_CHOICES => response,
            _ => Self::check_response(response).await?,
        };

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
            .unwrap_or_default();

        match content_type.as_str() {
            "application/json" => {
                let patient: PatientJson = serde_json::from_str(&response.text().await?)?;
                Ok(Some(ExternalIdMatch::Single(patient.id)))
            }
            "application/xml" => {
                let body = response.text().await?;
                let ids = crate::xml::parse_patient_alternatives(&body)?;
                Ok(Some(ExternalIdMatch::Multiple(ids)))
            }
            _ => Err(PhenoTipsError::UnexpectedContentType(content_type)),
        }
    }

    /// IDs of all patients matching a filter.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, filter: &PatientFilter) -> Result<Vec<PatientId>> {
        let pages = self.list_hql(&HqlQuery::patients(filter)).await?;
        pages
            .iter()
            .map(|page| unqualify(page, DATA_SPACE))
            .collect()
    }

    /// Owner of a patient record, as a bare user or group name.
    ///
    /// A record without an owner yields an empty name.
    #[tracing::instrument(skip(self))]
    pub async fn get_owner(&self, patient_id: &str) -> Result<String> {
        let props = self.get_object(patient_id, OBJECT_CLASS_OWNER, 0).await?;
        let owner = props
            .get("owner")
            .ok_or_else(|| PhenoTipsError::MissingProperty {
                class: OBJECT_CLASS_OWNER.to_string(),
                property: "owner".to_string(),
            })?;
        if owner.is_empty() {
            return Ok(String::new());
        }
        unqualify(owner, USERS_SPACE)
    }

    /// Transfer a patient record to a user or group.
    #[tracing::instrument(skip(self))]
    pub async fn set_owner(&self, patient_id: &str, owner: &str) -> Result<()> {
        let props = PropertyMap::from([("owner".to_string(), qualify(owner, USERS_SPACE))]);
        self.set_object(patient_id, OBJECT_CLASS_OWNER, 0, &props)
            .await
    }

    /// Study a patient record belongs to.
    ///
    /// `None` means the record has no study binding; `Some("")` means it is
    /// bound to the default study.
    #[tracing::instrument(skip(self))]
    pub async fn get_study(&self, patient_id: &str) -> Result<Option<String>> {
        let path = object_path(patient_id, OBJECT_CLASS_STUDY_BINDING, 0);
        let Some(response) = self.get_optional(&path).await? else {
            return Ok(None);
        };
        let props = crate::xml::parse_object_properties(&response.text().await?)?;
        match props.get("studyReference").map(String::as_str) {
            None | Some("") => Ok(Some(String::new())),
            Some(reference) => unqualify(reference, STUDIES_SPACE).map(Some),
        }
    }

    /// Bind a patient record to a study, or remove the binding with `None`.
    ///
    /// The binding object is created when missing and deleted when `None` is
    /// assigned; updating it in place requires that it exists.
    #[tracing::instrument(skip(self))]
    pub async fn set_study(&self, patient_id: &str, study: Option<&str>) -> Result<()> {
        let path = object_path(patient_id, OBJECT_CLASS_STUDY_BINDING, 0);
        let existing = self.get_optional(&path).await?;

        match (existing, study) {
            (None, None) => Ok(()),
            (None, Some(study)) => {
                let props = study_reference(study);
                self.create_object(patient_id, OBJECT_CLASS_STUDY_BINDING, &props)
                    .await?;
                Ok(())
            }
            (Some(_), None) => {
                self.delete_raw(&path).await?;
                Ok(())
            }
            (Some(_), Some(study)) => {
                self.put_form(&path, &property_form(&study_reference(study)))
                    .await?;
                Ok(())
            }
        }
    }
}

fn study_reference(study: &str) -> PropertyMap {
    PropertyMap::from([(
        "studyReference".to_string(),
        qualify(study, STUDIES_SPACE),
    )])
}

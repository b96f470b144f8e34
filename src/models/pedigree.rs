//! Pedigrees.
//!
//! Reading uses the REST API. Writing, PED import and PED export drive the
//! pedigree editor in a browser session, since the stored drawing is only
//! regenerated by the editor.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::client::PhenoTipsClient;
use crate::error::{PhenoTipsError, Result};
use crate::models::OBJECT_CLASS_PEDIGREE;

const LOAD_SERIALIZED_SCRIPT: &str =
    "window.editor.getSaveLoadEngine().createGraphFromSerializedData(arguments[0]);";

const IMPORT_SCRIPT: &str =
    "window.editor.getSaveLoadEngine().createGraphFromImportData(arguments[0], 'ped', arguments[1]);";

const EXPORT_PED_SCRIPT: &str =
    "return window.PedigreeExport.exportAsPED(window.editor.getGraph().DG, arguments[0]);";

/// Options for importing a PED file into the pedigree editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PedImportOptions {
    /// Mark every imported individual as evaluated.
    pub mark_evaluated: bool,
    /// Treat PED individual IDs as external IDs.
    pub external_id_mark: bool,
    /// Keep phenotypes the editor does not recognise.
    pub accept_unknown_phenotypes: bool,
}

impl Default for PedImportOptions {
    fn default() -> Self {
        Self {
            mark_evaluated: false,
            external_id_mark: true,
            accept_unknown_phenotypes: true,
        }
    }
}

/// Which identifiers the PED export writes for individuals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdGeneration {
    /// External IDs of the linked patient records.
    #[default]
    External,
    /// Sequential numbers.
    Newid,
    /// Names of the individuals.
    Name,
}

impl IdGeneration {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdGeneration::External => "external",
            IdGeneration::Newid => "newid",
            IdGeneration::Name => "name",
        }
    }
}

/// Serializes a JSON value with object keys sorted at every level.
struct SortedKeys<'a>(&'a Value);

impl Serialize for SortedKeys<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => {
                let sorted: BTreeMap<&str, SortedKeys<'_>> = map
                    .iter()
                    .map(|(key, value)| (key.as_str(), SortedKeys(value)))
                    .collect();
                sorted.serialize(serializer)
            }
            Value::Array(items) => serializer.collect_seq(items.iter().map(SortedKeys)),
            other => other.serialize(serializer),
        }
    }
}

/// Pedigree JSON in the key order the editor stores.
fn to_sorted_json(pedigree: &Value) -> Result<String> {
    Ok(serde_json::to_string(&SortedKeys(pedigree))?)
}

impl PhenoTipsClient {
    /// Pedigree graph of a patient as stored by the editor.
    #[tracing::instrument(skip(self))]
    pub async fn get_pedigree(&self, patient_id: &str) -> Result<Value> {
        let props = self
            .get_object(patient_id, OBJECT_CLASS_PEDIGREE, 0)
            .await?;
        let data = props
            .get("data")
            .ok_or_else(|| PhenoTipsError::MissingProperty {
                class: OBJECT_CLASS_PEDIGREE.to_string(),
                property: "data".to_string(),
            })?;
        Ok(serde_json::from_str(data)?)
    }

    /// Replace the pedigree of a patient through the editor.
    #[tracing::instrument(skip(self, pedigree))]
    pub async fn set_pedigree(&self, patient_id: &str, pedigree: &Value) -> Result<()> {
        let serialized = to_sorted_json(pedigree)?;

        let session = self.browser().await?;
        session
            .open_editor(self.pedigree_editor_url(patient_id)?)
            .await?;
        session
            .run(LOAD_SERIALIZED_SCRIPT, vec![Value::String(serialized)])
            .await?;
        session.save().await
    }

    /// Replace the pedigree of a patient with the contents of a PED file.
    #[tracing::instrument(skip(self, ped))]
    pub async fn import_pedigree_ped(
        &self,
        patient_id: &str,
        ped: &str,
        options: PedImportOptions,
    ) -> Result<()> {
        let session = self.browser().await?;
        session
            .open_editor(self.pedigree_editor_url(patient_id)?)
            .await?;
        session
            .run(
                IMPORT_SCRIPT,
                vec![Value::String(ped.to_string()), serde_json::to_value(options)?],
            )
            .await?;
        session.save().await
    }

    /// Pedigree of a patient in PED format.
    #[tracing::instrument(skip(self))]
    pub async fn export_pedigree_ped(
        &self,
        patient_id: &str,
        id_generation: IdGeneration,
    ) -> Result<String> {
        let session = self.browser().await?;
        session
            .open_editor(self.pedigree_editor_url(patient_id)?)
            .await?;
        let exported = session
            .run(
                EXPORT_PED_SCRIPT,
                vec![Value::String(id_generation.as_str().to_string())],
            )
            .await?;
        Ok(match exported {
            Value::String(ped) => ped,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }
}

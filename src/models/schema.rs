//! Class schemas.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::client::PhenoTipsClient;
use crate::error::Result;
use crate::models::OBJECT_CLASS_PATIENT;
use crate::xml;

/// Type descriptor of one class property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyType {
    /// XWiki property type, e.g. `String`, `StaticList`, `Number`.
    #[serde(rename = "type")]
    pub type_name: String,

    /// Numeric subtype (`integer`, `long`, `float`, `double`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_type: Option<String>,

    #[serde(rename = "validationRegExp", default, skip_serializing_if = "Option::is_none")]
    pub validation_regexp: Option<String>,

    /// Allowed values of a list property, stored value to display value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<IndexMap<String, String>>,
}

impl PropertyType {
    /// Parse a `key=value|key=value` value list.
    ///
    /// A token without `=` maps to itself.
    ///
    /// ```
    /// use phenotips::PropertyType;
    ///
    /// let values = PropertyType::parse_values("M=Male|F=Female|O");
    /// assert_eq!(values["F"], "Female");
    /// assert_eq!(values["O"], "O");
    /// ```
    pub fn parse_values(encoded: &str) -> IndexMap<String, String> {
        encoded
            .split('|')
            .map(|pair| match pair.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (pair.to_string(), pair.to_string()),
            })
            .collect()
    }
}

/// Property definitions of an XWiki class, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSchema {
    pub name: String,
    pub properties: IndexMap<String, PropertyType>,
}

impl ClassSchema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            properties: IndexMap::new(),
        }
    }

    /// Property names in declaration order.
    pub fn property_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl PhenoTipsClient {
    /// Fetch the schema of a class.
    #[tracing::instrument(skip(self))]
    pub async fn list_class_properties(&self, class_name: &str) -> Result<ClassSchema> {
        let path = format!(
            "rest/wikis/xwiki/classes/{}",
            urlencoding::encode(class_name)
        );
        let response = self.get_raw(&path).await?;
        let schema = xml::parse_class(&response.text().await?, class_name)?;
        tracing::debug!(properties = schema.len(), "fetched class schema");
        Ok(schema)
    }

    /// Fetch the schema of the primary patient class.
    pub async fn list_patient_class_properties(&self) -> Result<ClassSchema> {
        self.list_class_properties(OBJECT_CLASS_PATIENT).await
    }
}

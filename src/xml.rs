//! XML response parsing.
//!
//! The REST API answers in the `http://www.xwiki.org` namespace. Documents
//! use it as the default namespace, so elements can be matched by local name.

use serde::Deserialize;

use crate::error::Result;
use crate::models::{ClassSchema, PropertyMap, PropertyType};

/// XML namespace of every REST response.
pub const XWIKI_NS: &str = "http://www.xwiki.org";

#[derive(Debug, Deserialize)]
struct ObjectDoc {
    #[serde(rename = "property", default)]
    properties: Vec<PropertyNode>,
}

#[derive(Debug, Deserialize)]
struct PropertyNode {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@type", default)]
    type_name: Option<String>,
    #[serde(rename = "attribute", default)]
    attributes: Vec<AttributeNode>,
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AttributeNode {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@value", default)]
    value: String,
}

impl PropertyNode {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ObjectsDoc {
    #[serde(rename = "objectSummary", default)]
    summaries: Vec<ObjectSummary>,
}

#[derive(Debug, Deserialize)]
struct ObjectSummary {
    number: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResultsDoc {
    #[serde(rename = "searchResult", default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PatientIdsDoc {
    #[serde(default)]
    alternatives: Option<Alternatives>,
}

#[derive(Debug, Deserialize)]
struct Alternatives {
    #[serde(rename = "patient", default)]
    patients: Vec<PatientRef>,
}

#[derive(Debug, Deserialize)]
struct PatientRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ClassDoc {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "property", default)]
    properties: Vec<PropertyNode>,
}

/// Property name to value of an `<object>` document.
///
/// Properties with an empty or missing `<value>` map to `""`.
pub fn parse_object_properties(xml: &str) -> Result<PropertyMap> {
    let doc: ObjectDoc = quick_xml::de::from_str(xml)?;
    Ok(doc
        .properties
        .into_iter()
        .map(|p| (p.name, p.value.unwrap_or_default()))
        .collect())
}

/// Object numbers of an `<objects>` listing.
pub fn parse_object_numbers(xml: &str) -> Result<Vec<u32>> {
    let doc: ObjectsDoc = quick_xml::de::from_str(xml)?;
    Ok(doc.summaries.into_iter().map(|s| s.number).collect())
}

/// Page IDs of a `<searchResults>` document.
pub fn parse_search_ids(xml: &str) -> Result<Vec<String>> {
    let doc: SearchResultsDoc = quick_xml::de::from_str(xml)?;
    Ok(doc.results.into_iter().map(|r| r.id).collect())
}

/// Patient IDs listed as alternatives for an ambiguous external ID.
pub fn parse_patient_alternatives(xml: &str) -> Result<Vec<String>> {
    let doc: PatientIdsDoc = quick_xml::de::from_str(xml)?;
    Ok(doc
        .alternatives
        .map(|a| a.patients.into_iter().map(|p| p.id).collect())
        .unwrap_or_default())
}

/// Schema of a `<class>` document, in document order.
pub fn parse_class(xml: &str, class_name: &str) -> Result<ClassSchema> {
    let doc: ClassDoc = quick_xml::de::from_str(xml)?;
    let mut schema = ClassSchema::new(doc.id.as_deref().unwrap_or(class_name));
    for node in &doc.properties {
        let property = PropertyType {
            type_name: node.type_name.clone().unwrap_or_default(),
            number_type: node.attribute("numberType").map(str::to_string),
            validation_regexp: node.attribute("validationRegExp").map(str::to_string),
            values: node.attribute("values").map(PropertyType::parse_values),
        };
        schema.properties.insert(node.name.clone(), property);
    }
    Ok(schema)
}

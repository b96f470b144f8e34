//! HTTP request handlers for the mock server.
//!
//! Responses mimic the XWiki REST API: XML in the `http://www.xwiki.org`
//! namespace, `Location` headers on creation and plain 404s for missing
//! pages and objects.

pub mod attachments;
pub mod objects;
pub mod patients;
pub mod queries;

pub use attachments::*;
pub use objects::*;
pub use patients::*;
pub use queries::*;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use quick_xml::escape::escape;

use crate::models::{ClassSchema, PropertyMap};
use crate::xml::XWIKI_NS;

/// An XML document response.
pub(crate) fn xml_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/xml")],
        format!("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n{body}"),
    )
        .into_response()
}

pub(crate) fn not_found(what: impl std::fmt::Display) -> Response {
    (StatusCode::NOT_FOUND, format!("{what} not found")).into_response()
}

/// `<object>` document with one `<property>` per entry.
pub(crate) fn object_xml(patient_id: &str, class: &str, number: u32, props: &PropertyMap) -> String {
    let mut body = format!(
        "<object xmlns=\"{XWIKI_NS}\"><pageId>xwiki:data.{}</pageId><className>{}</className><number>{number}</number>",
        escape(patient_id),
        escape(class),
    );
    for (name, value) in props {
        let name = escape(name.as_str());
        body.push_str(&format!(
            "<property name=\"{name}\"><attribute name=\"name\" value=\"{name}\"/><value>{}</value></property>",
            escape(value.as_str())
        ));
    }
    body.push_str("</object>");
    body
}

/// `<objects>` listing of `(class, number)` summaries.
pub(crate) fn objects_xml<'a>(summaries: impl IntoIterator<Item = (&'a str, u32)>) -> String {
    let mut body = format!("<objects xmlns=\"{XWIKI_NS}\">");
    for (class, number) in summaries {
        body.push_str(&format!(
            "<objectSummary><className>{}</className><number>{number}</number></objectSummary>",
            escape(class)
        ));
    }
    body.push_str("</objects>");
    body
}

/// `<searchResults>` document listing page IDs.
pub(crate) fn search_results_xml(ids: &[String]) -> String {
    let mut body = format!("<searchResults xmlns=\"{XWIKI_NS}\">");
    for id in ids {
        body.push_str(&format!(
            "<searchResult><type>page</type><id>{}</id></searchResult>",
            escape(id.as_str())
        ));
    }
    body.push_str("</searchResults>");
    body
}

/// `<patients>` document listing candidates for an ambiguous external ID.
pub(crate) fn alternatives_xml(eid: &str, ids: &[String]) -> String {
    let mut body = format!("<patients xmlns=\"{XWIKI_NS}\"><alternatives>");
    for id in ids {
        body.push_str(&format!(
            "<patient><id>{}</id><eid>{}</eid></patient>",
            escape(id.as_str()),
            escape(eid)
        ));
    }
    body.push_str("</alternatives></patients>");
    body
}

/// `<class>` document with property type attributes.
pub(crate) fn class_xml(schema: &ClassSchema) -> String {
    let name = escape(schema.name.as_str());
    let mut body = format!("<class xmlns=\"{XWIKI_NS}\"><id>{name}</id><name>{name}</name>");
    for (property_name, property) in &schema.properties {
        body.push_str(&format!(
            "<property name=\"{}\" type=\"{}\">",
            escape(property_name.as_str()),
            escape(property.type_name.as_str())
        ));
        let mut attribute = |name: &str, value: &str| {
            body.push_str(&format!(
                "<attribute name=\"{name}\" value=\"{}\"/>",
                escape(value)
            ));
        };
        if let Some(number_type) = &property.number_type {
            attribute("numberType", number_type);
        }
        if let Some(regexp) = &property.validation_regexp {
            attribute("validationRegExp", regexp);
        }
        if let Some(values) = &property.values {
            let encoded = values
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect::<Vec<_>>()
                .join("|");
            attribute("values", &encoded);
        }
        body.push_str("</property>");
    }
    body.push_str("</class>");
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::Fixtures;
    use crate::xml;

    #[test]
    fn test_object_xml_parses_back() {
        let props = PropertyMap::from([
            ("first_name".to_string(), "Ann".to_string()),
            ("notes".to_string(), "<b> & \"q\"".to_string()),
        ]);
        let body = object_xml("P0000001", "PhenoTips.PatientClass", 0, &props);
        assert_eq!(xml::parse_object_properties(&body).unwrap(), props);
    }

    #[test]
    fn test_class_xml_parses_back() {
        let schema = Fixtures::patient_class();
        let parsed = xml::parse_class(&class_xml(&schema), "ignored").unwrap();
        assert_eq!(parsed, schema);
    }
}

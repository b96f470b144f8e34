//! Object and patient property tests against a mocked REST API.
//!
//! Uses wiremock to check the exact requests the client sends.

use phenotips::{PhenoTipsClient, PhenoTipsError, PropertyMap};
use wiremock::matchers::{basic_auth, body_string, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = "/rest/wikis/xwiki/spaces/data/pages/P0000001";

fn props(pairs: &[(&str, &str)]) -> PropertyMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn object_xml(pairs: &[(&str, &str)]) -> String {
    let mut xml = String::from(r#"<object xmlns="http://www.xwiki.org">"#);
    for (name, value) in pairs {
        xml.push_str(&format!(
            r#"<property name="{name}" type="String"><value>{value}</value></property>"#
        ));
    }
    xml.push_str("</object>");
    xml
}

fn client(server: &MockServer) -> PhenoTipsClient {
    PhenoTipsClient::new(&server.uri(), "Admin", "admin").unwrap()
}

#[tokio::test]
async fn test_get_patient_sends_basic_auth() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PAGE}/objects/PhenoTips.PatientClass/0")))
        .and(basic_auth("Admin", "admin"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            object_xml(&[("first_name", "Ann"), ("last_name", "Lee")]),
            "application/xml",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let patient = client(&mock_server).get("P0000001").await.unwrap();

    assert_eq!(patient, props(&[("first_name", "Ann"), ("last_name", "Lee")]));
}

#[tokio::test]
async fn test_set_patient_sends_property_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("{PAGE}/objects/PhenoTips.PatientClass/0")))
        .and(body_string(
            "property%23first_name=Ann&property%23last_name=Lee+Smith",
        ))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .set(
            "P0000001",
            &props(&[("first_name", "Ann"), ("last_name", "Lee Smith")]),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_object_returns_number_from_location() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{PAGE}/objects")))
        .and(body_string(
            "className=PhenoTips.RelativeClass&property%23relative_type=sibling",
        ))
        .respond_with(ResponseTemplate::new(201).insert_header(
            "Location",
            format!(
                "{}{PAGE}/objects/PhenoTips.RelativeClass/3",
                mock_server.uri()
            )
            .as_str(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let number = client(&mock_server)
        .create_relative("P0000001", &props(&[("relative_type", "sibling")]))
        .await
        .unwrap();

    assert_eq!(number, 3);
}

#[tokio::test]
async fn test_create_object_without_location_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{PAGE}/objects")))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .create_object("P0000001", "PhenoTips.VCF", &PropertyMap::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PhenoTipsError::MissingLocation(_)));
}

#[tokio::test]
async fn test_collaborator_name_is_qualified_on_write() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{PAGE}/objects")))
        .and(body_string_contains(
            "property%23collaborator=xwiki%3AXWiki.jdoe",
        ))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", "/objects/PhenoTips.CollaboratorClass/0"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let number = client(&mock_server)
        .create_collaborator(
            "P0000001",
            &props(&[("collaborator", "jdoe"), ("access", "edit")]),
        )
        .await
        .unwrap();

    assert_eq!(number, 0);
}

#[tokio::test]
async fn test_collaborator_name_is_bare_on_read() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PAGE}/objects/PhenoTips.CollaboratorClass/1")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            object_xml(&[("collaborator", "xwiki:Groups.Lab"), ("access", "view")]),
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let collaborator = client(&mock_server)
        .get_collaborator("P0000001", 1)
        .await
        .unwrap();

    assert_eq!(collaborator["collaborator"], "Groups.Lab");
    assert_eq!(collaborator["access"], "view");
}

#[tokio::test]
async fn test_set_owner_writes_qualified_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("{PAGE}/objects/PhenoTips.OwnerClass/0")))
        .and(body_string("property%23owner=xwiki%3AXWiki.jdoe"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .set_owner("P0000001", "jdoe")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_owner_returns_bare_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PAGE}/objects/PhenoTips.OwnerClass/0")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            object_xml(&[("owner", "xwiki:XWiki.jdoe")]),
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let owner = client(&mock_server).get_owner("P0000001").await.unwrap();

    assert_eq!(owner, "jdoe");
}

#[tokio::test]
async fn test_get_owner_empty_value() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PAGE}/objects/PhenoTips.OwnerClass/0")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(object_xml(&[("owner", "")]), "application/xml"),
        )
        .mount(&mock_server)
        .await;

    let owner = client(&mock_server).get_owner("P0000001").await.unwrap();

    assert_eq!(owner, "");
}

#[tokio::test]
async fn test_list_objects_returns_numbers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{PAGE}/objects/PhenoTips.VCF")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<objects xmlns="http://www.xwiki.org">
                 <objectSummary><className>PhenoTips.VCF</className><number>0</number></objectSummary>
                 <objectSummary><className>PhenoTips.VCF</className><number>2</number></objectSummary>
               </objects>"#,
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let numbers = client(&mock_server).list_vcfs("P0000001").await.unwrap();

    assert_eq!(numbers, vec![0, 2]);
}

#[tokio::test]
async fn test_server_error_carries_status_and_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{PAGE}/objects/PhenoTips.RelativeClass/0")))
        .respond_with(ResponseTemplate::new(403).set_body_string("Access denied"))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .delete_relative("P0000001", 0)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
    assert!(err.to_string().contains("Access denied"));
}

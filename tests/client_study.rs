//! Study binding and patient listing tests.

use phenotips::{PatientFilter, PhenoTipsClient};
use wiremock::matchers::{body_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BINDING: &str =
    "/rest/wikis/xwiki/spaces/data/pages/P0000001/objects/PhenoTips.StudyBindingClass/0";

fn binding_xml(reference: &str) -> String {
    format!(
        r#"<object xmlns="http://www.xwiki.org"><property name="studyReference"><value>{reference}</value></property></object>"#
    )
}

fn client(server: &MockServer) -> PhenoTipsClient {
    PhenoTipsClient::new(&server.uri(), "Admin", "admin").unwrap()
}

async fn mount_binding(server: &MockServer, reference: Option<&str>) {
    let response = match reference {
        Some(reference) => {
            ResponseTemplate::new(200).set_body_raw(binding_xml(reference), "application/xml")
        }
        None => ResponseTemplate::new(404),
    };
    Mock::given(method("GET"))
        .and(path(BINDING))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_get_study_without_binding() {
    let mock_server = MockServer::start().await;
    mount_binding(&mock_server, None).await;

    assert_eq!(client(&mock_server).get_study("P0000001").await.unwrap(), None);
}

#[tokio::test]
async fn test_get_study_bare_name() {
    let mock_server = MockServer::start().await;
    mount_binding(&mock_server, Some("xwiki:Studies.Cohort1")).await;

    let study = client(&mock_server).get_study("P0000001").await.unwrap();
    assert_eq!(study.as_deref(), Some("Cohort1"));
}

#[tokio::test]
async fn test_get_study_default_study() {
    let mock_server = MockServer::start().await;
    mount_binding(&mock_server, Some("")).await;

    let study = client(&mock_server).get_study("P0000001").await.unwrap();
    assert_eq!(study.as_deref(), Some(""));
}

#[tokio::test]
async fn test_clearing_missing_binding_is_a_no_op() {
    let mock_server = MockServer::start().await;
    mount_binding(&mock_server, None).await;

    for verb in ["POST", "PUT", "DELETE"] {
        Mock::given(method(verb))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;
    }

    client(&mock_server)
        .set_study("P0000001", None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_study_creates_binding() {
    let mock_server = MockServer::start().await;
    mount_binding(&mock_server, None).await;

    Mock::given(method("POST"))
        .and(path("/rest/wikis/xwiki/spaces/data/pages/P0000001/objects"))
        .and(body_string(
            "className=PhenoTips.StudyBindingClass&property%23studyReference=xwiki%3AStudies.Cohort1",
        ))
        .respond_with(ResponseTemplate::new(201).insert_header("Location", BINDING))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .set_study("P0000001", Some("Cohort1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_study_updates_binding() {
    let mock_server = MockServer::start().await;
    mount_binding(&mock_server, Some("xwiki:Studies.Cohort1")).await;

    Mock::given(method("PUT"))
        .and(path(BINDING))
        .and(body_string("property%23studyReference=xwiki%3AStudies.Cohort2"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .set_study("P0000001", Some("Cohort2"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_study_none_deletes_binding() {
    let mock_server = MockServer::start().await;
    mount_binding(&mock_server, Some("xwiki:Studies.Cohort1")).await;

    Mock::given(method("DELETE"))
        .and(path(BINDING))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .set_study("P0000001", None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_sends_hql_and_strips_names() {
    let mock_server = MockServer::start().await;

    let statement = ", BaseObject as obj, BaseObject as study_obj, StringProperty as study_prop \
        where doc.space = 'data' and doc.fullName = obj.name \
        and obj.className = 'PhenoTips.PatientClass' \
        and doc.fullName = study_obj.name \
        and study_obj.className = 'PhenoTips.StudyBindingClass' \
        and study_obj.id = study_prop.id.id \
        and study_prop.id.name = 'studyReference' \
        and study_prop.value = 'xwiki:Studies.Cohort1'";

    Mock::given(method("GET"))
        .and(path("/rest/wikis/xwiki/query"))
        .and(query_param("type", "hql"))
        .and(query_param("q", statement))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<searchResults xmlns="http://www.xwiki.org">
                 <searchResult><id>xwiki:data.P0000001</id></searchResult>
                 <searchResult><id>xwiki:data.P0000007</id></searchResult>
               </searchResults>"#,
            "application/xml",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let ids = client(&mock_server)
        .list(&PatientFilter::default().study("Cohort1"))
        .await
        .unwrap();

    assert_eq!(ids, vec!["P0000001", "P0000007"]);
}

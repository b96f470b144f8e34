//! Attachment upload and download tests.

use phenotips::PhenoTipsClient;
use wiremock::matchers::{body_bytes, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTENTS: &[u8] = b"##fileformat=VCFv4.2\n#CHROM\tPOS\n";

fn client(server: &MockServer) -> PhenoTipsClient {
    PhenoTipsClient::new(&server.uri(), "Admin", "admin").unwrap()
}

#[tokio::test]
async fn test_upload_uses_base_name() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("sample 1.vcf");
    std::fs::write(&local, CONTENTS).unwrap();

    Mock::given(method("PUT"))
        .and(path(
            "/rest/wikis/xwiki/spaces/data/pages/P0000001/attachments/sample%201.vcf",
        ))
        .and(body_bytes(CONTENTS))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .upload_file("P0000001", &local)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_download_writes_local_file() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("copy.vcf");

    Mock::given(method("GET"))
        .and(path("/bin/download/data/P0000001/sample.vcf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(CONTENTS))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .download_file("P0000001", "sample.vcf", &local)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&local).unwrap(), CONTENTS);
}

#[tokio::test]
async fn test_missing_attachment_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bin/download/data/P0000001/missing.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server)
        .get_file("P0000001", "missing.pdf")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_delete_attachment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(
            "/rest/wikis/xwiki/spaces/data/pages/P0000001/attachments/old.vcf",
        ))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    client(&mock_server)
        .delete_file("P0000001", "old.vcf")
        .await
        .unwrap();
}

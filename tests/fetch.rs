//! HTTP fetcher against a local mock server.

use pdf_questions::{HttpFetcher, PdfFetcher, QuestionsError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF: &[u8] = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n1 0 obj << >> endobj\n%%EOF";

#[tokio::test]
async fn downloads_body_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/paper.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(PDF),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(None).unwrap();
    let pdf = fetcher
        .fetch(&format!("{}/paper.pdf", server.uri()))
        .await
        .unwrap();

    assert_eq!(pdf.as_slice(), PDF);
    assert_eq!(pdf.len(), PDF.len());
    assert!(pdf.has_pdf_magic());
}

#[tokio::test]
async fn non_success_status_is_a_download_error() {
    let server = MockServer::start().await;
    for (route, code) in [("/missing.pdf", 404), ("/forbidden.pdf", 403), ("/down.pdf", 500)] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(code))
            .mount(&server)
            .await;
    }

    let fetcher = HttpFetcher::new(Some(10)).unwrap();
    for (route, code) in [("/missing.pdf", 404u16), ("/forbidden.pdf", 403), ("/down.pdf", 500)] {
        let err = fetcher
            .fetch(&format!("{}{}", server.uri(), route))
            .await
            .unwrap_err();
        assert!(
            matches!(err, QuestionsError::DownloadFailed { status: Some(s), .. } if s == code),
            "got: {err:?}"
        );
        assert!(
            err.to_string().contains(&code.to_string()),
            "status missing from message: {err}"
        );
    }
}

#[tokio::test]
async fn connection_refused_is_a_download_error() {
    // Bind then drop a server so the port is closed.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let fetcher = HttpFetcher::new(Some(5)).unwrap();
    let err = fetcher.fetch(&format!("{uri}/paper.pdf")).await.unwrap_err();
    assert!(matches!(
        err,
        QuestionsError::DownloadFailed { status: None, .. }
    ));
}

#[tokio::test]
async fn invalid_url_fails_before_any_request() {
    let fetcher = HttpFetcher::new(None).unwrap();
    for url in ["", "not a url", "file:///etc/passwd"] {
        let err = fetcher.fetch(url).await.unwrap_err();
        assert!(matches!(err, QuestionsError::InvalidUrl { .. }), "{url}: {err}");
    }
}

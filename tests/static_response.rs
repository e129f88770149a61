use futures::stream;
use futures::TryStreamExt;
use net_stubbing::http::Bytes;
use net_stubbing::{
    send_static_response, BodyStream, Error, ResponseTarget, StaticResponse, SyntheticResponse,
};

/// Records how it was torn down.
#[derive(Default)]
struct RecordingTarget {
    connection_destroyed: bool,
    destroyed: bool,
}

impl ResponseTarget for RecordingTarget {
    fn destroy_connection(&mut self) {
        self.connection_destroyed = true;
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}

fn dispatch(
    static_response: &StaticResponse,
    body_stream: Option<BodyStream>,
) -> (RecordingTarget, Vec<(SyntheticResponse, BodyStream)>) {
    let mut target = RecordingTarget::default();
    let mut calls = Vec::new();
    send_static_response(
        &mut target,
        static_response,
        |response, body| calls.push((response, body)),
        body_stream,
    )
    .unwrap();
    (target, calls)
}

async fn read_body(body: BodyStream) -> Vec<u8> {
    let chunks: Vec<Bytes> = body.try_collect().await.unwrap();
    chunks.concat()
}

#[async_std::test]
async fn a_forced_network_error_tears_down_the_connection_without_responding() {
    // Arrange
    let static_response = StaticResponse {
        status_code: Some(500),
        body: Some("ignored".into()),
        force_network_error: true,
        ..StaticResponse::default()
    };

    // Act
    let (target, calls) = dispatch(&static_response, None);

    // Assert
    assert!(calls.is_empty());
    assert!(target.connection_destroyed);
    assert!(target.destroyed);
}

#[async_std::test]
async fn markup_bodies_are_served_as_html() {
    // Arrange
    let static_response = StaticResponse {
        status_code: Some(201),
        headers: Some(Default::default()),
        body: Some("<p>hi</p>".into()),
        ..StaticResponse::default()
    };

    // Act
    let (target, mut calls) = dispatch(&static_response, None);

    // Assert
    assert!(!target.connection_destroyed && !target.destroyed);
    assert_eq!(calls.len(), 1);
    let (response, body) = calls.pop().unwrap();
    assert_eq!(response.status(), 201);
    assert_eq!(response.headers()["content-type"], "text/html");
    assert_eq!(response.connection.peer_addr(), None);
    assert_eq!(read_body(body).await, b"<p>hi</p>");
}

#[async_std::test]
async fn defaults_to_an_empty_200() {
    // Arrange
    let static_response = StaticResponse::default();

    // Act
    let (_, mut calls) = dispatch(&static_response, None);

    // Assert
    let (response, body) = calls.pop().unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers().is_empty());
    assert!(read_body(body).await.is_empty());
}

#[async_std::test]
async fn a_zero_status_code_defaults_to_200() {
    // Arrange
    let static_response = StaticResponse::new(0).set_body("ok");

    // Act
    let (_, mut calls) = dispatch(&static_response, None);

    // Assert
    let (response, body) = calls.pop().unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(read_body(body).await, b"ok");
}

#[async_std::test]
async fn the_body_is_streamed_once_in_a_single_chunk() {
    // Arrange
    let static_response = StaticResponse::new(200).set_body("hello");

    // Act
    let (_, mut calls) = dispatch(&static_response, None);

    // Assert
    let (_, body) = calls.pop().unwrap();
    let chunks: Vec<Bytes> = body.try_collect().await.unwrap();
    assert_eq!(chunks, vec![Bytes::from("hello")]);
}

#[async_std::test]
async fn an_explicit_content_type_is_kept() {
    // Arrange
    let static_response = StaticResponse::new(200)
        .insert_header("Content-Type", "text/plain")
        .set_body("<p>not html</p>");

    // Act
    let (_, mut calls) = dispatch(&static_response, None);

    // Assert
    let (response, _) = calls.pop().unwrap();
    let content_types: Vec<_> = response.headers().get_all("content-type").iter().collect();
    assert_eq!(content_types, vec!["text/plain"]);
}

#[async_std::test]
async fn an_explicit_body_stream_overrides_the_body() {
    // Arrange
    let static_response = StaticResponse::new(200).set_body("<p>ignored</p>");
    let chunks: Vec<Result<Bytes, std::io::Error>> =
        vec![Ok(Bytes::from("streamed ")), Ok(Bytes::from("body"))];
    let body_stream: BodyStream = Box::pin(stream::iter(chunks));

    // Act
    let (_, mut calls) = dispatch(&static_response, Some(body_stream));

    // Assert
    let (response, body) = calls.pop().unwrap();
    // The ignored body is not sniffed either.
    assert!(response.headers().get("content-type").is_none());
    assert_eq!(read_body(body).await, b"streamed body");
}

#[async_std::test]
async fn byte_bodies_are_streamed_verbatim() {
    // Arrange
    let bytes = vec![0u8, 159, 146, 150];
    let static_response = StaticResponse::new(200).set_body(bytes.clone());

    // Act
    let (_, mut calls) = dispatch(&static_response, None);

    // Assert
    let (response, body) = calls.pop().unwrap();
    assert!(response.headers().get("content-type").is_none());
    assert_eq!(read_body(body).await, bytes);
}

#[async_std::test]
async fn invalid_headers_fail_before_responding() {
    // Arrange
    let static_response = StaticResponse::new(200).insert_header("bad header", "value");
    let mut target = RecordingTarget::default();
    let mut called = false;

    // Act
    let outcome = send_static_response(&mut target, &static_response, |_, _| called = true, None);

    // Assert
    assert!(matches!(outcome, Err(Error::InvalidHeaderName(name)) if name == "bad header"));
    assert!(!called);
}

#[async_std::test]
async fn invalid_status_codes_fail_before_responding() {
    // Arrange
    let static_response = StaticResponse::new(1000);
    let mut target = RecordingTarget::default();
    let mut called = false;

    // Act
    let outcome = send_static_response(&mut target, &static_response, |_, _| called = true, None);

    // Assert
    assert!(matches!(outcome, Err(Error::InvalidStatusCode(1000))));
    assert!(!called);
}

#[test]
fn the_wire_shape_uses_camel_case() {
    // Arrange
    let raw = r#"{
        "statusCode": 404,
        "headers": { "Content-Type": "application/json", "X-Trace": "abc" },
        "fixture": { "filePath": "errors/not-found.json", "encoding": "utf8" },
        "forceNetworkError": false
    }"#;

    // Act
    let static_response: StaticResponse = serde_json::from_str(raw).unwrap();

    // Assert
    assert_eq!(static_response.status_code, Some(404));
    let headers = static_response.headers.as_ref().unwrap();
    let names: Vec<_> = headers.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["Content-Type", "X-Trace"]);
    let fixture = static_response.fixture.as_ref().unwrap();
    assert_eq!(fixture.file_path, "errors/not-found.json");
    assert_eq!(fixture.encoding.as_deref(), Some("utf8"));
    assert!(!static_response.force_network_error);
    assert_eq!(
        serde_json::to_value(&static_response).unwrap(),
        serde_json::json!({
            "statusCode": 404,
            "headers": { "Content-Type": "application/json", "X-Trace": "abc" },
            "fixture": { "filePath": "errors/not-found.json", "encoding": "utf8" }
        })
    );
}

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use net_stubbing::{send_static_response, ResponseTarget, StaticResponse};
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// The exchange a hyper service is answering.
/// Failing the service makes hyper drop the connection, which resets it for the client.
#[derive(Default)]
struct Exchange {
    reset: bool,
}

impl ResponseTarget for Exchange {
    fn destroy_connection(&mut self) {
        self.reset = true;
    }

    fn destroy(&mut self) {}
}

/// Serve `static_response` to every request on a random local port.
async fn serve(static_response: StaticResponse) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind an OS port.");
    let address = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let static_response = static_response.clone();
            tokio::spawn(async move {
                let service = service_fn(move |_request: hyper::Request<Incoming>| {
                    let static_response = static_response.clone();
                    async move {
                        let mut exchange = Exchange::default();
                        let mut response = None;
                        send_static_response(
                            &mut exchange,
                            &static_response,
                            |synthetic, body| response = Some(synthetic.into_hyper(body)),
                            None,
                        )
                        .expect("Failed to send the static response.");
                        match response {
                            Some(response) if !exchange.reset => Ok(response),
                            _ => Err(io::Error::from(io::ErrorKind::ConnectionReset)),
                        }
                    }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    address
}

#[tokio::test]
async fn a_synthetic_response_is_served_like_a_real_one() {
    // Arrange
    let static_response = StaticResponse::new(201)
        .insert_header("X-Stubbed", "yes")
        .set_body("<p>hi</p>");
    let address = serve(static_response).await;

    // Act
    let response = reqwest::get(format!("http://{}/users", address))
        .await
        .unwrap();

    // Assert
    assert_eq!(response.status(), 201);
    assert_eq!(response.headers()["x-stubbed"], "yes");
    assert_eq!(response.headers()["content-type"], "text/html");
    assert_eq!(response.text().await.unwrap(), "<p>hi</p>");
}

#[tokio::test]
async fn json_bodies_can_be_decoded_by_the_client() {
    // Arrange
    let static_response = StaticResponse::new(200)
        .insert_header("content-type", "application/json")
        .set_body(r#"{"id": 1, "name": "Jane"}"#);
    let address = serve(static_response).await;

    // Act
    let body: serde_json::Value = reqwest::get(format!("http://{}/", address))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert
    assert_eq!(body, serde_json::json!({ "id": 1, "name": "Jane" }));
}

#[tokio::test]
async fn a_forced_network_error_is_a_connection_failure_for_the_client() {
    // Arrange
    let address = serve(StaticResponse::network_error()).await;

    // Act
    let outcome = reqwest::get(format!("http://{}/", address)).await;

    // Assert
    assert!(outcome.is_err());
}

//! Trust-policy behavior against a live TLS endpoint with a self-signed
//! certificate: the default policy must reject it, `insecureTls` must accept
//! it, and supplying the certificate as the trusted authority must accept it
//! with verification still enabled.

use base64::Engine;
use http_workbench_gateway::gateway::STATUS_TEXT_NETWORK_ERROR;
use http_workbench_gateway::infra::resolver::StaticHostMap;
use http_workbench_gateway::{Gateway, RequestDescription};
use rustls::pki_types::PrivateKeyDer;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_rustls::TlsAcceptor;

fn describe(method: &str, url: &str) -> RequestDescription {
    RequestDescription {
        method: method.to_string(),
        target_url: url.to_string(),
        headers: HashMap::new(),
        body: None,
        insecure_tls: false,
        ca_certificate: None,
    }
}

fn gateway() -> Gateway {
    Gateway::new(Arc::new(StaticHostMap::default()))
}

/// Serves canned HTTP/1.1 responses behind a freshly generated self-signed
/// certificate. Returns the listening port and the certificate PEM.
async fn spawn_self_signed_server() -> (u16, String) {
    let params = rcgen::CertificateParams::new(vec![
        "localhost".to_string(),
        "127.0.0.1".to_string(),
    ])
    .unwrap();
    let key_pair = rcgen::KeyPair::generate().unwrap();
    let cert = params.self_signed(&key_pair).unwrap();
    let cert_pem = cert.pem();

    let tls_config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(
            vec![cert.der().clone()],
            PrivateKeyDer::Pkcs8(key_pair.serialize_der().into()),
        )
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(tls_config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // Clients that reject the certificate abort mid-handshake.
                let Ok(mut tls) = acceptor.accept(stream).await else {
                    return;
                };

                let mut request = Vec::new();
                let mut buf = [0u8; 4096];
                loop {
                    match tls.read(&mut buf).await {
                        Ok(0) => return,
                        Ok(n) => {
                            request.extend_from_slice(&buf[..n]);
                            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                                break;
                            }
                        }
                        Err(_) => return,
                    }
                }

                let _ = tls
                    .write_all(
                        b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok",
                    )
                    .await;
                let _ = tls.shutdown().await;
            });
        }
    });

    (port, cert_pem)
}

#[tokio::test]
async fn default_policy_rejects_a_self_signed_certificate() {
    let (port, _cert_pem) = spawn_self_signed_server().await;

    let response = gateway()
        .forward(describe("GET", &format!("https://127.0.0.1:{port}/")))
        .await
        .unwrap();

    assert_eq!(response.status, 0);
    assert_eq!(response.status_text, STATUS_TEXT_NETWORK_ERROR);
    assert!(!response.body.is_empty());
}

#[tokio::test]
async fn insecure_skip_verify_accepts_the_same_endpoint() {
    let (port, _cert_pem) = spawn_self_signed_server().await;

    let mut request = describe("GET", &format!("https://127.0.0.1:{port}/"));
    request.insecure_tls = true;

    let response = gateway().forward(request).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.status_text, "OK");
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn supplied_authority_is_trusted_with_verification_enabled() {
    let (port, cert_pem) = spawn_self_signed_server().await;

    let mut request = describe("GET", &format!("https://127.0.0.1:{port}/"));
    request.ca_certificate =
        Some(base64::engine::general_purpose::STANDARD.encode(&cert_pem));

    let response = gateway().forward(request).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn supplied_authority_does_not_vouch_for_other_endpoints() {
    // Serve under one self-signed certificate, trust a different one.
    let (port, _served_pem) = spawn_self_signed_server().await;
    let (_other_port, other_pem) = spawn_self_signed_server().await;

    let mut request = describe("GET", &format!("https://127.0.0.1:{port}/"));
    request.ca_certificate =
        Some(base64::engine::general_purpose::STANDARD.encode(&other_pem));

    let response = gateway().forward(request).await.unwrap();

    assert_eq!(response.status, 0);
    assert_eq!(response.status_text, STATUS_TEXT_NETWORK_ERROR);
}

use std::io;

use axum::{
    Router,
    http::{Method, StatusCode},
    routing::get,
};
use tokio::net::TcpListener;

pub async fn bind(port: u16) -> io::Result<TcpListener> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    log::info!("Health endpoint listening on port {port}");
    Ok(listener)
}

pub async fn serve(listener: TcpListener) -> io::Result<()> {
    axum::serve(listener, router()).await
}

/// `GET` on any path reports the process as alive.
fn router() -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .fallback(fallback)
}

async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

async fn fallback(method: Method) -> (StatusCode, &'static str) {
    if method == Method::GET || method == Method::HEAD {
        healthz().await
    } else {
        (StatusCode::METHOD_NOT_ALLOWED, "")
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpStream,
    };

    use super::*;

    async fn start() -> SocketAddr {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(serve(listener));
        address
    }

    async fn send(address: SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(address).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    fn get_request(path: &str) -> String {
        format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
    }

    #[tokio::test]
    async fn get_on_any_path_is_ok() {
        let address = start().await;

        for path in ["/healthz", "/", "/health"] {
            let response = send(address, &get_request(path)).await;

            assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
            assert!(response.ends_with("\r\n\r\nOK"), "{response}");
        }
    }

    #[tokio::test]
    async fn other_methods_are_rejected() {
        let address = start().await;
        let request = "POST /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
Content-Length: 0\r\n\r\n";

        let response = send(address, request).await;

        assert!(response.starts_with("HTTP/1.1 405"), "{response}");
    }

    #[tokio::test]
    async fn malformed_request_is_not_ok() {
        let address = start().await;

        let response = send(address, "NOT HTTP\r\n\r\n").await;

        assert!(!response.contains("200 OK"), "{response}");
    }
}

// keydrop/src/test_support.rs
// Local upstream servers for exercising the real HTTP clients

use axum::Router;
use reqwest::Client;

/// Serve `router` on an ephemeral localhost port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Client that never routes localhost traffic through an ambient proxy
pub fn local_client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

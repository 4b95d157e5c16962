//! Development server with live reload
//!
//! Files are resolved by `ServeDir`, so requests can never leave the output
//! directory. When live reload is on, HTML responses get a small script that
//! reloads the page whenever a rebuild succeeds.

use anyhow::Result;
use axum::{
    body::{self, Body},
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::commands::generate;
use crate::Blog;

const RELOAD_ENDPOINT: &str = "/__livereload";

/// Pages larger than this are served without the reload script
const MAX_INJECT_BYTES: usize = 16 * 1024 * 1024;

const RELOAD_SCRIPT: &str = r#"<script>
new WebSocket(`ws://${location.host}/__livereload`).onmessage = (event) => {
  if (event.data === "reload") location.reload();
};
</script>
"#;

struct ServerState {
    public_dir: PathBuf,
    reloads: broadcast::Sender<()>,
    live_reload: bool,
}

/// Serve the output directory, rebuilding and reloading open pages on change
/// unless `watch` is off
pub async fn start(blog: &Blog, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let (reloads, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServerState {
        public_dir: blog.public_dir.clone(),
        reloads: reloads.clone(),
        live_reload: watch,
    });

    let app = Router::new()
        .route(RELOAD_ENDPOINT, get(reload_socket))
        .fallback(serve_file)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;
    let url = format!("http://{}:{}", ip, port);
    tracing::info!("Serving {:?} at {}", blog.public_dir, url);

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let blog = blog.clone();
        tokio::task::spawn_blocking(move || {
            let result = generate::watch(&blog, |_| {
                // No connected pages is not an error
                let _ = reloads.send(());
            });
            if let Err(e) = result {
                tracing::error!("File watcher error: {:#}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn reload_socket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reloads = state.reloads.subscribe();
    ws.on_upgrade(move |socket| push_reloads(socket, reloads))
}

/// Forward every successful rebuild to one browser tab until it goes away
async fn push_reloads(mut socket: WebSocket, mut reloads: broadcast::Receiver<()>) {
    loop {
        tokio::select! {
            signal = reloads.recv() => {
                if let Err(broadcast::error::RecvError::Closed) = signal {
                    break;
                }
                // A lagged receiver still missed a rebuild, so reload anyway
                if socket.send(Message::Text("reload".into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

/// Resolve the request under the output directory; `/a/` serves
/// `a/index.html`. Paths escaping the directory get a 404 from `ServeDir`.
async fn serve_file(State(state): State<Arc<ServerState>>, request: Request<Body>) -> Response {
    let mut files = ServeDir::new(&state.public_dir);
    let response = match files.try_call(request).await {
        Ok(response) => response.map(Body::new),
        Err(e) => {
            tracing::error!("Failed to serve file: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if !state.live_reload || response.status() != StatusCode::OK || !is_html(&response) {
        return response;
    }

    match body::to_bytes(response.into_body(), MAX_INJECT_BYTES).await {
        Ok(bytes) => Html(inject_live_reload(&String::from_utf8_lossy(&bytes))).into_response(),
        Err(e) => {
            tracing::error!("Failed to read page body: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}

/// Insert the reload script before the last `</body>`, or append it
fn inject_live_reload(html: &str) -> String {
    match html.rfind("</body>") {
        Some(pos) => format!("{}{}{}", &html[..pos], RELOAD_SCRIPT, &html[pos..]),
        None => format!("{}{}", html, RELOAD_SCRIPT),
    }
}

fn open_browser(url: &str) -> Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut start = Command::new("cmd");
        start.args(["/c", "start"]);
        start
    } else {
        Command::new("xdg-open")
    };
    command.arg(url).spawn()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn state(public_dir: PathBuf, live_reload: bool) -> Arc<ServerState> {
        let (reloads, _) = broadcast::channel(1);
        Arc::new(ServerState {
            public_dir,
            reloads,
            live_reload,
        })
    }

    async fn get_page(state: Arc<ServerState>, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = serve_file(State(state), request).await;
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    fn site() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let public = dir.path().join("public");
        fs::create_dir_all(public.join("hello")).unwrap();
        fs::write(public.join("index.html"), "<html><body>home</body></html>").unwrap();
        fs::write(public.join("hello/index.html"), "<html><body>hello</body></html>").unwrap();
        fs::write(public.join("logo.txt"), "plain").unwrap();
        fs::write(dir.path().join("secret.html"), "TOP-SECRET").unwrap();
        fs::create_dir_all(dir.path().join("private")).unwrap();
        fs::write(dir.path().join("private/index.html"), "PRIVATE").unwrap();
        (dir, public)
    }

    #[test]
    fn test_inject_before_body_end() {
        let html = inject_live_reload("<html><body><p>hi</p></body></html>");
        assert!(html.contains(RELOAD_ENDPOINT));
        assert!(html.ends_with("</script>\n</body></html>"));
        assert_eq!(html.matches("</body>").count(), 1);
    }

    #[test]
    fn test_inject_without_body() {
        let html = inject_live_reload("<p>fragment</p>");
        assert!(html.starts_with("<p>fragment</p>"));
        assert!(html.contains(RELOAD_ENDPOINT));
    }

    #[tokio::test]
    async fn test_serves_route_index_with_reload_script() {
        let (_dir, public) = site();
        let (status, body) = get_page(state(public.clone(), true), "/hello/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("hello"));
        assert!(body.contains(RELOAD_ENDPOINT));

        let (status, body) = get_page(state(public, true), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("home"));
    }

    #[tokio::test]
    async fn test_static_mode_and_assets_are_untouched() {
        let (_dir, public) = site();
        let (_, body) = get_page(state(public.clone(), false), "/hello/").await;
        assert_eq!(body, "<html><body>hello</body></html>");

        let (status, body) = get_page(state(public, true), "/logo.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "plain");
    }

    #[tokio::test]
    async fn test_parent_dir_requests_stay_inside_output() {
        let (_dir, public) = site();
        for uri in ["/../secret.html", "/../private/", "/hello/../../secret.html"] {
            let (status, body) = get_page(state(public.clone(), true), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert!(!body.contains("SECRET") && !body.contains("PRIVATE"), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_missing_page_is_not_found() {
        let (_dir, public) = site();
        let (status, _) = get_page(state(public, true), "/nope/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

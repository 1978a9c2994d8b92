use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ukabe-cli", version, about = "Dev tools for the ukabe viewer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the built viewer over TLS. Camera capture only works from a
    /// secure context, so plain HTTP is opt-in for localhost work.
    Serve {
        #[arg(long, env = "UKABE_DIST_DIR", default_value = "dist")]
        dir: PathBuf,
        #[arg(long, env = "UKABE_ADDR", default_value = "0.0.0.0:8443")]
        addr: SocketAddr,
        #[arg(long, env = "UKABE_TLS_CERT")]
        cert: Option<PathBuf>,
        #[arg(long, env = "UKABE_TLS_KEY")]
        key: Option<PathBuf>,
        #[arg(long)]
        insecure: bool,
    },
}

struct ServeState {
    root: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Serve {
            dir,
            addr,
            cert,
            key,
            insecure,
        } => serve(dir, addr, cert, key, insecure).await,
    }
}

async fn serve(
    dir: PathBuf,
    addr: SocketAddr,
    cert: Option<PathBuf>,
    key: Option<PathBuf>,
    insecure: bool,
) -> Result<()> {
    if !dir.is_dir() {
        bail!("asset directory {} does not exist", dir.display());
    }
    let state = Arc::new(ServeState { root: dir });
    let router = Router::new().fallback(serve_asset).with_state(state);

    if insecure {
        warn!("serving over plain http; camera capture needs a secure context");
        info!(%addr, "listening");
        axum_server::bind(addr)
            .serve(router.into_make_service())
            .await
            .context("http server failed")?;
        return Ok(());
    }

    let (Some(cert), Some(key)) = (cert, key) else {
        bail!("--cert and --key are required unless --insecure is set");
    };
    let tls = RustlsConfig::from_pem_file(&cert, &key)
        .await
        .with_context(|| format!("loading certificate {}", cert.display()))?;
    info!(%addr, "listening with tls");
    axum_server::bind_rustls(addr, tls)
        .serve(router.into_make_service())
        .await
        .context("https server failed")?;
    Ok(())
}

async fn serve_asset(State(state): State<Arc<ServeState>>, uri: Uri) -> Response {
    let Some(path) = resolve_asset_path(&state.root, uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response()
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Maps a request path onto the asset root. Anything trying to climb out
/// of the root is rejected; directory-ish paths get the index document.
fn resolve_asset_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let trimmed = request_path.trim_start_matches('/');
    let relative = if trimmed.is_empty() { "index.html" } else { trimmed };
    let relative = Path::new(relative);
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return None;
    }
    let mut path = root.join(relative);
    if path.extension().is_none() {
        path = root.join("index.html");
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_maps_to_index() {
        let resolved = resolve_asset_path(Path::new("dist"), "/").unwrap();
        assert_eq!(resolved, Path::new("dist").join("index.html"));
    }

    #[test]
    fn extensionless_routes_fall_back_to_index() {
        let resolved = resolve_asset_path(Path::new("dist"), "/viewer").unwrap();
        assert_eq!(resolved, Path::new("dist").join("index.html"));
    }

    #[test]
    fn traversal_is_rejected() {
        assert!(resolve_asset_path(Path::new("dist"), "/../secret.pem").is_none());
        assert!(resolve_asset_path(Path::new("dist"), "/a/../../b.js").is_none());
    }

    #[test]
    fn assets_keep_their_path() {
        let resolved = resolve_asset_path(Path::new("dist"), "/models/daruma.glb").unwrap();
        assert_eq!(resolved, Path::new("dist").join("models/daruma.glb"));
    }
}

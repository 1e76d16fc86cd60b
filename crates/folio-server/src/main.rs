use std::{
    env, fs,
    io::{self, Write},
    path::PathBuf,
    process,
    str::FromStr,
    sync::Arc,
};

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use folio_content::{Collection, ContentError, Document, Matrix, preview_path};
use folio_renderer::{
    PageRenderer, RenderContext, RenderedPage, SiteDefaults, SiteRenderer, link_policy_from_env,
};
use folio_runtime_config::{CONFIG_PATH_ENV, SiteRuntimeConfig, SiteRuntimeConfigError};
use folio_server::{AppState, FsContentSource, build_router, init_tracing};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::runtime::Builder;
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "folio-server")]
#[command(about = "Render and serve the folio site", long_about = None)]
struct Cli {
    /// Runtime config JSON; falls back to `FOLIO_CONFIG`, then built-in defaults.
    #[arg(long, global = true, value_name = "CONFIG_JSON")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve rendered pages and the revalidation webhook.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long, value_name = "CONTENT_DIR")]
        content: Option<PathBuf>,
    },
    /// Render a content-matrix block or a document to HTML on stdout.
    Render {
        #[arg(long, value_name = "CONTENT_JSON")]
        input: PathBuf,
        /// Print only the body markup.
        #[arg(long)]
        fragment: bool,
    },
    /// Print the draft-preview URL for a document.
    PreviewPath {
        #[arg(long)]
        collection: String,
        #[arg(long)]
        slug: String,
    },
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            err.exit_code()
        }
    };
    process::exit(exit_code);
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config)?;
    init_tracing(&config.telemetry);
    match cli.command {
        Command::Serve {
            host,
            port,
            content,
        } => handle_serve(config, host, port, content),
        Command::Render { input, fragment } => handle_render(&config, input, fragment),
        Command::PreviewPath { collection, slug } => {
            handle_preview_path(&config, &collection, &slug)
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<SiteRuntimeConfig, CliError> {
    let path = path.or_else(|| env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
    let config = match path {
        Some(path) => SiteRuntimeConfig::load(&path)?,
        None => SiteRuntimeConfig::default(),
    };
    let mut config = config.with_env_overrides(|key| env::var(key).ok());
    config.links.custom_target = link_policy_from_env(config.link_policy()).custom_target;
    config.validate()?;
    Ok(config)
}

fn handle_serve(
    mut config: SiteRuntimeConfig,
    host: Option<String>,
    port: Option<u16>,
    content: Option<PathBuf>,
) -> Result<(), CliError> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(content) = content {
        config.content.root = content;
    }
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    if config.server.revalidation_is_open() {
        if config.server.is_loopback() {
            warn!("no revalidation secret configured; the webhook accepts unauthenticated local calls");
        } else {
            warn!(
                addr = %bind_addr,
                "no revalidation secret configured on a non-loopback host; anyone who can reach the server can purge the cache"
            );
        }
    }
    let source = FsContentSource::new(config.content.root.clone());
    let state = AppState::new(Arc::new(source), &config);

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err: io::Error| CliError::Serve(err.to_string()))?;
    runtime.block_on(async move {
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|err| CliError::Serve(err.to_string()))?;
        info!(
            addr = %bind_addr,
            content = %config.content.root.display(),
            "listening on http://{bind_addr}"
        );
        axum::serve(listener, build_router(state))
            .with_graceful_shutdown(wait_for_shutdown())
            .await
            .map_err(|err| CliError::Serve(err.to_string()))
    })
}

async fn wait_for_shutdown() {
    signal::ctrl_c().await.ok();
    info!("shutting down");
}

fn handle_render(
    config: &SiteRuntimeConfig,
    input: PathBuf,
    fragment: bool,
) -> Result<(), CliError> {
    let raw = fs::read_to_string(&input).map_err(|err| CliError::Input(input.clone(), err.into()))?;
    let value: Value =
        serde_json::from_str(&raw).map_err(|err| CliError::Input(input.clone(), err.into()))?;

    let renderer = SiteRenderer::new(render_context(config));
    let page = if is_matrix(&value) {
        let matrix: Matrix = serde_json::from_value(value)
            .map_err(|err| CliError::Input(input.clone(), err.into()))?;
        renderer.matrix(&matrix)
    } else if value.is_object() {
        let document: Document = serde_json::from_value(value)
            .map_err(|err| CliError::Input(input.clone(), err.into()))?;
        renderer.document(&document)
    } else {
        return Err(CliError::Input(
            input,
            anyhow!("expected a content-matrix block or a document object"),
        ));
    };
    write_output(&page, fragment)
}

fn is_matrix(value: &Value) -> bool {
    value.get("rows").is_some()
        || value.get("blockType").and_then(Value::as_str) == Some("own-content-matrix")
}

fn render_context(config: &SiteRuntimeConfig) -> RenderContext {
    RenderContext::new(config.link_policy()).with_site(SiteDefaults {
        title: config.site.title.clone(),
        default_icon: config.site.default_icon.clone(),
    })
}

fn write_output(page: &RenderedPage, fragment: bool) -> Result<(), CliError> {
    let html = if fragment {
        page.fragment_html()
    } else {
        page.html()
    };
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{html}").map_err(|err| CliError::Output(err.into()))?;
    stdout.flush().map_err(|err| CliError::Output(err.into()))
}

fn handle_preview_path(
    config: &SiteRuntimeConfig,
    collection: &str,
    slug: &str,
) -> Result<(), CliError> {
    let collection = Collection::from_str(collection)?;
    let secret = config.server.preview_secret.as_deref().unwrap_or_default();
    println!("{}", preview_path(collection, slug, secret));
    Ok(())
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config load failed: {0}")]
    Config(#[from] SiteRuntimeConfigError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("content input failed ({0}): {1}")]
    Input(PathBuf, #[source] anyhow::Error),
    #[error("failed to write output: {0}")]
    Output(#[source] anyhow::Error),
    #[error("server failure: {0}")]
    Serve(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            CliError::Content(_) => 2,
            CliError::Input(_, _) => 1,
            CliError::Output(_) => 6,
            CliError::Serve(_) => 7,
        }
    }
}

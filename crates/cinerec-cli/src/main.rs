//! cinerec - movie discovery CLI.

/// Application configuration (TOML).
mod config;
/// Plain-text listing renderers.
mod render;
/// `SQLite`-backed session storage.
mod storage;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, BASE_URL_ENV, ConfigKey, ProfilePaths, resolve_base_url};
use crate::render::{RendererKind, render_detail, render_items, render_listing};
use crate::storage::SqliteStorage;
use cinerec_api::ClientError;
use cinerec_api::client::CinerecClient;
use cinerec_api::query::{DiscoverFilters, ListQuery, home_sections};
use cinerec_api::service::{MovieService, validate_movie_id};
use cinerec_api::session::{Session, SessionStore};
use cinerec_api::types::MovieId;
use cinerec_api::view::{
    DetailController, DetailState, ListController, ListSource, ListingItem, select_trailer,
};

/// CLI argument parser.
#[derive(Parser)]
#[command(name = "cinerec", about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Backend API base URL (overrides `CINEREC_BASE_URL` and config).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Sign in, sign up, sign out.
    Auth(AuthCommand),
    /// Browse movies.
    Movies(MoviesCommand),
    /// Manage favorites.
    Favorites(FavoritesCommand),
    /// Manage watch history.
    History(HistoryCommand),
    /// Show or change the config file.
    Config(ConfigCommand),
    /// Print shell completions.
    Completions(CompletionsArgs),
}

/// Arguments for the `auth` subcommand.
#[derive(clap::Args)]
struct AuthCommand {
    /// Auth subcommand to run.
    #[command(subcommand)]
    command: AuthSubcommands,
}

/// Available auth subcommands.
#[derive(Subcommand)]
enum AuthSubcommands {
    /// Sign in with email and password.
    Login(LoginArgs),
    /// Create an account and sign in.
    Signup(SignupArgs),
    /// Sign out and forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
}

/// Arguments for the `auth login` subcommand.
#[derive(clap::Args)]
struct LoginArgs {
    /// Account email.
    #[arg(long, required = true)]
    email: String,
    /// Account password.
    #[arg(long, required = true)]
    password: String,
}

/// Arguments for the `auth signup` subcommand.
#[derive(clap::Args)]
struct SignupArgs {
    /// Display name.
    #[arg(long, required = true)]
    username: String,
    /// Account email.
    #[arg(long, required = true)]
    email: String,
    /// Password (at least 6 characters).
    #[arg(long, required = true)]
    password: String,
    /// Password confirmation.
    #[arg(long, required = true)]
    confirm_password: String,
}

/// Arguments for the `movies` subcommand.
#[derive(clap::Args)]
struct MoviesCommand {
    /// Movies subcommand to run.
    #[command(subcommand)]
    command: MoviesSubcommands,
}

/// Available movies subcommands.
#[derive(Subcommand)]
enum MoviesSubcommands {
    /// Show the home page sections.
    Home(RenderArgs),
    /// Fetch an arbitrary listing (e.g. `movie/top_rated`).
    List(ListArgs),
    /// Search movies by title.
    Search(SearchArgs),
    /// Discover movies of one genre.
    Genre(GenreArgs),
    /// Show movie details (records a view).
    Show(MovieIdArgs),
    /// Open the movie trailer in the browser.
    Trailer(TrailerArgs),
}

/// Renderer selection shared by listing commands.
#[derive(clap::Args)]
struct RenderArgs {
    /// Listing layout (default: from config).
    #[arg(long, value_enum)]
    renderer: Option<RendererKind>,
}

/// Arguments for the `movies list` subcommand.
#[derive(clap::Args)]
struct ListArgs {
    /// Endpoint under `movies/` (e.g. "trending/movie/day").
    #[arg(long, required = true)]
    endpoint: String,
    /// Query parameter as KEY=VALUE (repeatable).
    #[arg(long = "param", value_parser = parse_key_val)]
    params: Vec<(String, String)>,
    #[command(flatten)]
    render: RenderArgs,
}

/// Arguments for the `movies search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search text.
    #[arg(long, required = true)]
    query: String,
    #[command(flatten)]
    render: RenderArgs,
}

/// Arguments for the `movies genre` subcommand.
#[derive(clap::Args)]
struct GenreArgs {
    /// Genre ID (e.g. 28 for action).
    #[arg(long, required = true)]
    id: u32,
    #[command(flatten)]
    render: RenderArgs,
}

/// A single movie ID.
#[derive(clap::Args)]
struct MovieIdArgs {
    /// Movie ID.
    #[arg(long, required = true)]
    id: MovieId,
}

/// Arguments for the `movies trailer` subcommand.
#[derive(clap::Args)]
struct TrailerArgs {
    /// Movie ID.
    #[arg(long, required = true)]
    id: MovieId,
    /// Print the URL without opening a browser.
    #[arg(long)]
    no_open: bool,
}

/// Arguments for the `favorites` subcommand.
#[derive(clap::Args)]
struct FavoritesCommand {
    /// Favorites subcommand to run.
    #[command(subcommand)]
    command: FavoritesSubcommands,
}

/// Available favorites subcommands.
#[derive(Subcommand)]
enum FavoritesSubcommands {
    /// List favorite movies.
    List(RenderArgs),
    /// Add or remove a favorite.
    Toggle(MovieIdArgs),
}

/// Arguments for the `history` subcommand.
#[derive(clap::Args)]
struct HistoryCommand {
    /// History subcommand to run.
    #[command(subcommand)]
    command: HistorySubcommands,
}

/// Available history subcommands.
#[derive(Subcommand)]
enum HistorySubcommands {
    /// List recently viewed movies.
    List(RenderArgs),
    /// Record a view.
    Add(MovieIdArgs),
    /// Remove a movie from the history.
    Remove(MovieIdArgs),
    /// Remove the whole history.
    Clear,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Print the config file location and contents.
    Show,
    /// Change one setting and write the config file.
    Set(ConfigSetArgs),
}

/// Arguments for the `config set` subcommand.
#[derive(clap::Args)]
struct ConfigSetArgs {
    /// Setting to change.
    #[arg(value_enum)]
    key: ConfigKey,
    /// New value.
    value: String,
}

/// Arguments for the `completions` subcommand.
#[derive(clap::Args)]
struct CompletionsArgs {
    /// Target shell.
    #[arg(long, value_enum, required = true)]
    shell: Shell,
}

/// Parses a `KEY=VALUE` pair.
fn parse_key_val(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    Ok((String::from(key), String::from(value)))
}

/// Everything a command needs: config, session store and backend.
struct AppContext {
    config: AppConfig,
    sessions: SessionStore<SqliteStorage>,
    service: MovieService<CinerecClient>,
}

impl AppContext {
    /// Loads config, restores the session and builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if config, store or client setup fails.
    #[instrument(skip_all)]
    fn open(paths: &ProfilePaths, base_url: Option<&str>) -> Result<Self> {
        let config = AppConfig::load(&paths.config_file).context("failed to load config")?;

        let env_url = std::env::var(BASE_URL_ENV).ok();
        let base_url = resolve_base_url(base_url, env_url.as_deref(), &config)?;

        let storage =
            SqliteStorage::open(&paths.store_dir).context("failed to open local storage")?;
        let sessions = SessionStore::restore(storage);

        let client = CinerecClient::builder()
            .base_url(base_url)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .session(sessions.handle())
            .build()
            .context("failed to build backend client")?;

        Ok(Self {
            config,
            sessions,
            service: MovieService::new(client),
        })
    }

    /// Returns the active session, or fails like a guarded page would.
    ///
    /// # Errors
    ///
    /// Returns an error when nobody is signed in.
    async fn require_session(&self) -> Result<Session> {
        match self.sessions.current_session().await {
            Some(session) => Ok(session),
            None => bail!("not signed in. Run `cinerec auth login` first"),
        }
    }

    fn renderer(&self, args: &RenderArgs) -> RendererKind {
        args.renderer.unwrap_or(self.config.display.renderer)
    }
}

/// Logs rendered lines.
fn emit(lines: &[String]) {
    for line in lines {
        tracing::info!("{line}");
    }
}

/// Fails when a listing ended in the error state.
fn ensure_loaded(controller: &ListController) -> Result<()> {
    if let Some(message) = controller.error() {
        bail!("failed to load listing: {message}");
    }
    Ok(())
}

/// Runs the `auth login` subcommand.
///
/// # Errors
///
/// Returns an error if the backend rejects the credentials or is unreachable.
#[instrument(skip_all)]
async fn run_auth_login(ctx: &AppContext, args: &LoginArgs) -> Result<()> {
    let session = ctx
        .sessions
        .login(ctx.service.api(), &args.email, &args.password)
        .await
        .context("login failed")?;
    tracing::info!("Welcome back, {}!", session.username);
    Ok(())
}

/// Runs the `auth signup` subcommand.
///
/// # Errors
///
/// Returns an error on a local validation failure or backend rejection.
#[instrument(skip_all)]
async fn run_auth_signup(ctx: &AppContext, args: &SignupArgs) -> Result<()> {
    let session = ctx
        .sessions
        .signup(
            ctx.service.api(),
            &args.username,
            &args.email,
            &args.password,
            &args.confirm_password,
        )
        .await
        .context("signup failed")?;
    tracing::info!("Welcome, {}!", session.username);
    Ok(())
}

/// Runs the `auth logout` subcommand.
///
/// # Errors
///
/// Returns an error if the stored session cannot be removed.
#[instrument(skip_all)]
async fn run_auth_logout(ctx: &AppContext) -> Result<()> {
    ctx.sessions.logout().await.context("logout failed")?;
    tracing::info!("Signed out");
    Ok(())
}

/// Runs the `auth whoami` subcommand.
#[instrument(skip_all)]
async fn run_auth_whoami(ctx: &AppContext) {
    match ctx.sessions.current_session().await {
        Some(session) => {
            tracing::info!("User: {} (id {})", session.username, session.user_id);
            tracing::info!("Email: {}", session.email);
        }
        None => tracing::info!("Not signed in"),
    }
}

/// Runs the `movies home` subcommand.
///
/// Sections load concurrently; each one degrades to empty on its own.
///
/// # Errors
///
/// Returns an error when nobody is signed in.
#[instrument(skip_all)]
async fn run_movies_home(ctx: &AppContext, args: &RenderArgs) -> Result<()> {
    let session = ctx.require_session().await?;
    tracing::info!("Welcome back, {}", session.username);

    let sections = home_sections(&DiscoverFilters::default());
    let (listings, favorites) = futures::join!(
        futures::future::join_all(
            sections
                .iter()
                .map(|section| ctx.service.load_section(&section.query))
        ),
        ctx.service.list_favorites(),
    );
    let favorited: HashSet<MovieId> = favorites.iter().map(|f| f.movie_id).collect();

    let kind = ctx.renderer(args);
    for (section, listing) in sections.iter().zip(listings) {
        let items: Vec<ListingItem> = listing
            .results
            .into_iter()
            .map(ListingItem::from)
            .collect();
        emit(&render_items(kind, section.title, &items, &favorited));
    }
    Ok(())
}

/// Loads and renders one listing source.
///
/// # Errors
///
/// Returns an error when nobody is signed in or the listing fails.
async fn show_listing(
    ctx: &AppContext,
    title: &str,
    source: ListSource,
    args: &RenderArgs,
) -> Result<()> {
    ctx.require_session().await?;
    let mut controller = ListController::new();
    controller.load(&ctx.service, source).await;
    ensure_loaded(&controller)?;
    emit(&render_listing(ctx.renderer(args), title, &controller));
    Ok(())
}

/// Runs the `movies list` subcommand.
///
/// # Errors
///
/// Returns an error when nobody is signed in or the listing fails.
#[instrument(skip_all)]
async fn run_movies_list(ctx: &AppContext, args: &ListArgs) -> Result<()> {
    let query = args
        .params
        .iter()
        .fold(ListQuery::new(&args.endpoint), |q, (k, v)| {
            q.param(k.as_str(), v.as_str())
        });
    let title = query.to_string();
    show_listing(ctx, &title, ListSource::Movies(query), &args.render).await
}

/// Runs the `movies search` subcommand.
///
/// # Errors
///
/// Returns an error when nobody is signed in or the search fails.
#[instrument(skip_all)]
async fn run_movies_search(ctx: &AppContext, args: &SearchArgs) -> Result<()> {
    let text = args.query.trim();
    if text.is_empty() {
        bail!("search query must not be empty");
    }
    let query = ListQuery::search(text, &DiscoverFilters::default());
    let title = format!("Search: {text}");
    show_listing(ctx, &title, ListSource::Movies(query), &args.render).await
}

/// Runs the `movies genre` subcommand.
///
/// # Errors
///
/// Returns an error when nobody is signed in or the listing fails.
#[instrument(skip_all)]
async fn run_movies_genre(ctx: &AppContext, args: &GenreArgs) -> Result<()> {
    let query = ListQuery::by_genre(args.id, &DiscoverFilters::default());
    let title = format!("Genre {}", args.id);
    show_listing(ctx, &title, ListSource::Movies(query), &args.render).await
}

/// Runs the `movies show` subcommand.
///
/// # Errors
///
/// Returns an error when nobody is signed in or the movie cannot be loaded.
#[instrument(skip_all)]
async fn run_movies_show(ctx: &AppContext, args: &MovieIdArgs) -> Result<()> {
    ctx.require_session().await?;
    let mut controller = DetailController::new(args.id);
    controller.load(&ctx.service).await;

    match controller.state() {
        DetailState::Loaded(view) => {
            emit(&render_detail(view, &ctx.config.display.region));
            Ok(())
        }
        DetailState::Error(ClientError::NotFound(_)) => bail!("Movie not found: {}", args.id),
        DetailState::Error(e) => Err(e.clone()).context("failed to load movie"),
        DetailState::Idle | DetailState::Loading => bail!("movie did not load"),
    }
}

/// Runs the `movies trailer` subcommand.
///
/// # Errors
///
/// Returns an error when nobody is signed in, the movie has no trailer or
/// the browser cannot be launched.
#[instrument(skip_all)]
async fn run_movies_trailer(ctx: &AppContext, args: &TrailerArgs) -> Result<()> {
    ctx.require_session().await?;
    validate_movie_id(args.id)?;
    let videos = ctx
        .service
        .try_get_movie_videos(args.id)
        .await
        .context("failed to fetch videos")?;

    let Some(url) = select_trailer(&videos.results).and_then(|v| v.youtube_url()) else {
        bail!("no trailer available for movie {}", args.id);
    };

    tracing::info!("Trailer: {url}");
    if !args.no_open {
        open::that(&url).with_context(|| format!("failed to open {url}"))?;
    }
    Ok(())
}

/// Runs the `favorites list` subcommand.
///
/// # Errors
///
/// Returns an error when nobody is signed in or favorites cannot be fetched.
#[instrument(skip_all)]
async fn run_favorites_list(ctx: &AppContext, args: &RenderArgs) -> Result<()> {
    show_listing(ctx, "My Favorites", ListSource::Favorites, args).await
}

/// Runs the `favorites toggle` subcommand.
///
/// # Errors
///
/// Returns an error when nobody is signed in or the backend rejects the
/// change.
#[instrument(skip_all)]
async fn run_favorites_toggle(ctx: &AppContext, args: &MovieIdArgs) -> Result<()> {
    ctx.require_session().await?;
    let mut controller = ListController::new();
    controller.load(&ctx.service, ListSource::Favorites).await;
    ensure_loaded(&controller)?;

    controller
        .toggle_favorite(&ctx.service, args.id)
        .await
        .context("failed to toggle favorite")?;

    if controller.is_favorite(args.id) {
        tracing::info!("Added {} to favorites", args.id);
    } else {
        tracing::info!("Removed {} from favorites", args.id);
    }
    Ok(())
}

/// Runs the `history list` subcommand.
///
/// # Errors
///
/// Returns an error when nobody is signed in or history cannot be fetched.
#[instrument(skip_all)]
async fn run_history_list(ctx: &AppContext, args: &RenderArgs) -> Result<()> {
    show_listing(ctx, "Watch History", ListSource::History, args).await
}

/// Runs the `history add` subcommand.
///
/// # Errors
///
/// Returns an error when nobody is signed in or the backend call fails.
#[instrument(skip_all)]
async fn run_history_add(ctx: &AppContext, args: &MovieIdArgs) -> Result<()> {
    ctx.require_session().await?;
    ctx.service
        .add_history(args.id)
        .await
        .context("failed to record view")?;
    tracing::info!("Recorded view of {}", args.id);
    Ok(())
}

/// Runs the `history remove` subcommand.
///
/// # Errors
///
/// Returns an error when nobody is signed in or the backend call fails.
#[instrument(skip_all)]
async fn run_history_remove(ctx: &AppContext, args: &MovieIdArgs) -> Result<()> {
    ctx.require_session().await?;
    let mut controller = ListController::new();
    controller.load(&ctx.service, ListSource::History).await;
    controller
        .remove_history(&ctx.service, args.id)
        .await
        .context("failed to remove from history")?;
    tracing::info!(
        "Removed {} from history ({} remaining)",
        args.id,
        controller.items().len()
    );
    Ok(())
}

/// Runs the `history clear` subcommand.
///
/// # Errors
///
/// Returns an error when nobody is signed in or the backend call fails.
#[instrument(skip_all)]
async fn run_history_clear(ctx: &AppContext) -> Result<()> {
    ctx.require_session().await?;
    let mut controller = ListController::new();
    controller.load(&ctx.service, ListSource::History).await;
    controller
        .clear_history(&ctx.service)
        .await
        .context("failed to clear history")?;
    tracing::info!("Watch history cleared");
    Ok(())
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or parsed.
fn run_config_show(paths: &ProfilePaths) -> Result<()> {
    let config = AppConfig::load(&paths.config_file).context("failed to load config")?;
    tracing::info!("Config file: {}", paths.config_file.display());
    for line in config.to_toml()?.lines().filter(|l| !l.is_empty()) {
        tracing::info!("{line}");
    }
    Ok(())
}

/// Runs the `config set` subcommand.
///
/// # Errors
///
/// Returns an error if the value is invalid or the file cannot be written.
fn run_config_set(config_file: &Path, args: &ConfigSetArgs) -> Result<()> {
    let mut config = AppConfig::load(config_file).context("failed to load config")?;
    config.set(args.key, &args.value)?;
    config.save(config_file).context("failed to save config")?;
    tracing::info!("Updated {}", config_file.display());
    Ok(())
}

/// Writes shell completions to stdout.
fn run_completions(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    let name = String::from(cmd.get_name());
    clap_complete::generate(args.shell, &mut cmd, name, &mut std::io::stdout());
}

/// Installs the tracing subscriber.
fn init_tracing() {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if let Commands::Completions(args) = &cli.command {
        run_completions(args);
        return Ok(());
    }

    let paths = ProfilePaths::resolve(cli.dir.as_deref())?;
    if let Commands::Config(config) = &cli.command {
        return match &config.command {
            ConfigSubcommands::Show => run_config_show(&paths),
            ConfigSubcommands::Set(args) => run_config_set(&paths.config_file, args),
        };
    }

    let ctx = AppContext::open(&paths, cli.base_url.as_deref())?;
    match cli.command {
        Commands::Auth(auth) => match auth.command {
            AuthSubcommands::Login(args) => run_auth_login(&ctx, &args).await,
            AuthSubcommands::Signup(args) => run_auth_signup(&ctx, &args).await,
            AuthSubcommands::Logout => run_auth_logout(&ctx).await,
            AuthSubcommands::Whoami => {
                run_auth_whoami(&ctx).await;
                Ok(())
            }
        },
        Commands::Movies(movies) => match movies.command {
            MoviesSubcommands::Home(args) => run_movies_home(&ctx, &args).await,
            MoviesSubcommands::List(args) => run_movies_list(&ctx, &args).await,
            MoviesSubcommands::Search(args) => run_movies_search(&ctx, &args).await,
            MoviesSubcommands::Genre(args) => run_movies_genre(&ctx, &args).await,
            MoviesSubcommands::Show(args) => run_movies_show(&ctx, &args).await,
            MoviesSubcommands::Trailer(args) => run_movies_trailer(&ctx, &args).await,
        },
        Commands::Favorites(fav) => match fav.command {
            FavoritesSubcommands::List(args) => run_favorites_list(&ctx, &args).await,
            FavoritesSubcommands::Toggle(args) => run_favorites_toggle(&ctx, &args).await,
        },
        Commands::History(history) => match history.command {
            HistorySubcommands::List(args) => run_history_list(&ctx, &args).await,
            HistorySubcommands::Add(args) => run_history_add(&ctx, &args).await,
            HistorySubcommands::Remove(args) => run_history_remove(&ctx, &args).await,
            HistorySubcommands::Clear => run_history_clear(&ctx).await,
        },
        Commands::Completions(_) | Commands::Config(_) => Ok(()),
    }
}

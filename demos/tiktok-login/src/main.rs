use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use identity_core::{IdentityError, Profile, Verification, VerifyRequest};
use identity_oauth2::{
    CallbackParams, InMemorySessionStore, OAuth2Strategy, RequestContext, Session, SessionStore,
};
use identity_tiktok::{ProviderOptions, TikTokStrategy};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod login;

use login::{CallbackResult, PROFILE_KEY, SESSION_TTL_SECONDS};

const SESSION_COOKIE: &str = "tiktok_login_session";

/// Configuration for the TikTok login demo
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    pub use_pkce: bool,
    pub server_host: String,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: std::env::var("TIKTOK_CLIENT_ID")
                .context("TIKTOK_CLIENT_ID environment variable is required")?,
            client_secret: std::env::var("TIKTOK_CLIENT_SECRET")
                .context("TIKTOK_CLIENT_SECRET environment variable is required")?,
            callback_url: std::env::var("TIKTOK_CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:3000/auth/tiktok/callback".to_string()),
            use_pkce: std::env::var("TIKTOK_USE_PKCE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("TIKTOK_USE_PKCE must be true or false")?,
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: std::env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
        })
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub strategy: Arc<TikTokStrategy<Profile>>,
    pub sessions: InMemorySessionStore,
}

type HandlerResult<T> = std::result::Result<T, (StatusCode, String)>;

fn internal_error(err: impl std::fmt::Display) -> (StatusCode, String) {
    error!("Request failed: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

fn create_strategy(config: &AppConfig) -> Result<TikTokStrategy<Profile>> {
    let options = ProviderOptions::new(
        config.client_id.clone(),
        config.client_secret.clone(),
        config.callback_url.clone(),
    )
    .with_pkce(config.use_pkce)
    .with_pass_request_to_callback(true);

    // Every TikTok user is accepted; the profile itself is the session user.
    let strategy = TikTokStrategy::new(options, |request: VerifyRequest| async move {
        let signed_in = request
            .request
            .as_ref()
            .is_some_and(|request| request.session_value(PROFILE_KEY).is_some());
        info!(
            "TikTok user {} signed in{}",
            request.profile.id.as_deref().unwrap_or("<unknown>"),
            if signed_in { ", replacing the previous login" } else { "" }
        );
        Ok::<_, IdentityError>(Verification::accept(request.profile))
    })
    .context("Invalid TikTok provider options")?;

    Ok(strategy)
}

/// Loads the session named by the cookie, or starts a new one.
async fn load_session(state: &AppState, jar: &CookieJar) -> HandlerResult<Session> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(session) = state
            .sessions
            .load(cookie.value())
            .await
            .map_err(internal_error)?
        {
            return Ok(session);
        }
    }

    Session::new(SESSION_TTL_SECONDS).map_err(internal_error)
}

fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

async fn index_handler(Query(params): Query<HashMap<String, String>>) -> Html<String> {
    let notice = params
        .get("error")
        .map(|reason| format!(r#"<p class="error">Login failed: {}</p>"#, escape_html(reason)))
        .unwrap_or_default();

    Html(format!(
        r#"
<!DOCTYPE html>
<html>
<head>
    <title>TikTok Login</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; }}
        .error {{ color: red; }}
        .button {{ background: #fe2c55; color: white; padding: 10px 20px; text-decoration: none; border-radius: 4px; }}
    </style>
</head>
<body>
    <h1>TikTok Login Demo</h1>
    {}
    <a href="/auth/tiktok" class="button">Log in with TikTok</a>
</body>
</html>
        "#,
        notice
    ))
}

/// Starts the login by redirecting to TikTok
async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> HandlerResult<(CookieJar, Redirect)> {
    let mut session = load_session(&state, &jar).await?;

    let url = state
        .strategy
        .authorize(&mut RequestContext::with_session(&mut session))
        .map_err(internal_error)?;

    let cookie = session_cookie(session.id.clone());
    state.sessions.save(session).await.map_err(internal_error)?;

    info!("Redirecting to TikTok authorization endpoint");
    Ok((jar.add(cookie), Redirect::to(url.as_str())))
}

/// Handles the redirect back from TikTok
async fn callback_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(callback): Query<CallbackParams>,
) -> HandlerResult<Response> {
    let session = load_session(&state, &jar).await?;

    let (session_id, result) =
        login::finish_login(state.strategy.as_ref(), &state.sessions, session, callback)
            .await
            .map_err(internal_error)?;
    let jar = jar.add(session_cookie(session_id));

    let response = match result {
        CallbackResult::LoggedIn => (jar, Redirect::to("/profile")).into_response(),
        CallbackResult::Denied(reason) => {
            info!("Sending user back to the start page: {}", reason);
            (jar, Redirect::to("/?error=denied")).into_response()
        }
        CallbackResult::Failed(message) => (
            StatusCode::BAD_GATEWAY,
            jar,
            format!("Login failed: {}", message),
        )
            .into_response(),
    };

    Ok(response)
}

/// Shows the normalized profile of the logged in user
async fn profile_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> HandlerResult<Response> {
    let session = load_session(&state, &jar).await?;

    let Some(raw) = session.values.get(PROFILE_KEY) else {
        return Ok(Redirect::to("/").into_response());
    };
    let profile: Profile = serde_json::from_str(raw).map_err(internal_error)?;

    let avatar = profile
        .profile_image
        .as_deref()
        .map(|url| format!(r#"<img src="{}" width="96" height="96">"#, escape_html(url)))
        .unwrap_or_default();

    Ok(Html(format!(
        r#"
<!DOCTYPE html>
<html>
<head>
    <title>TikTok Profile</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; }}
        pre {{ background: #f0f0f0; padding: 20px; }}
    </style>
</head>
<body>
    <h1>Welcome, {}!</h1>
    {}
    <p><strong>Open ID:</strong> {}</p>
    <pre>{}</pre>
    <a href="/">Back to Home</a>
</body>
</html>
        "#,
        escape_html(profile.display_name.as_deref().unwrap_or("TikTok user")),
        avatar,
        escape_html(profile.id.as_deref().unwrap_or("")),
        escape_html(&profile.raw),
    ))
    .into_response())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env()?;
    info!("Starting TikTok login demo server");

    let strategy = Arc::new(create_strategy(&config)?);
    info!(
        "TikTok strategy initialized (PKCE {})",
        if config.use_pkce { "enabled" } else { "disabled" }
    );

    let sessions = InMemorySessionStore::new();

    // Periodically drop abandoned login sessions
    let cleanup_store = sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            match cleanup_store.cleanup_expired().await {
                Ok(0) => {}
                Ok(removed) => info!("Removed {} expired sessions", removed),
                Err(e) => warn!("Session cleanup failed: {}", e),
            }
        }
    });

    let app_state = AppState { strategy, sessions };

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/auth/tiktok", get(login_handler))
        .route("/auth/tiktok/callback", get(callback_handler))
        .route("/profile", get(profile_handler))
        .with_state(app_state);

    let bind_addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;

    info!("Server running on http://{}", bind_addr);
    info!("TikTok callback URL: {}", config.callback_url);
    warn!(
        "This is an example application. Do not use in production without proper security review."
    );

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

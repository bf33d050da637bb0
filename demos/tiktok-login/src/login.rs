//! Completion of a login attempt on the host side.

use identity_core::Profile;
use identity_oauth2::{
    AuthOutcome, CallbackParams, OAuth2Error, OAuth2Result, OAuth2Strategy, RequestContext,
    Session, SessionStore,
};
use tracing::{error, info, warn};

pub const SESSION_TTL_SECONDS: u64 = 600;

/// Session field holding the logged in user's profile as JSON.
pub const PROFILE_KEY: &str = "profile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackResult {
    LoggedIn,
    Denied(String),
    Failed(String),
}

/// Runs the callback through `strategy` and persists the session for every
/// outcome, so state consumed by the attempt (the PKCE verifier) stays consumed.
///
/// A successful login moves the user to a new session id. Returns the id the
/// session cookie must carry from now on.
pub async fn finish_login<S>(
    strategy: &S,
    sessions: &dyn SessionStore,
    mut session: Session,
    callback: CallbackParams,
) -> OAuth2Result<(String, CallbackResult)>
where
    S: OAuth2Strategy<User = Profile>,
{
    let outcome = strategy
        .authenticate(&mut RequestContext::with_session(&mut session), callback)
        .await;

    let result = match outcome {
        AuthOutcome::Success(profile) => {
            let json = serde_json::to_string(&profile)
                .map_err(|e| OAuth2Error::SessionError(e.to_string()))?;

            let previous = std::mem::replace(&mut session, Session::new(SESSION_TTL_SECONDS)?);
            session.values.insert(PROFILE_KEY.to_string(), json);
            sessions.destroy(&previous.id).await?;

            info!("{} login succeeded, session rotated", strategy.name());
            CallbackResult::LoggedIn
        }
        AuthOutcome::Fail { reason } => {
            let reason = reason.unwrap_or_else(|| "access denied".to_string());
            warn!("{} login failed: {}", strategy.name(), reason);
            CallbackResult::Denied(reason)
        }
        AuthOutcome::Error { phase, error } => {
            error!("{} login errored after {}: {}", strategy.name(), phase, error);
            CallbackResult::Failed(error.to_string())
        }
    };

    let id = session.id.clone();
    sessions.save(session).await?;

    Ok((id, result))
}

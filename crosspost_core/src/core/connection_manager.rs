use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::{BlueskyCredentials, Settings};
use crate::connections::bluesky::{RateLimitedClient, SessionEvent};
use crate::connections::errors::ConnectionError;
use crate::connections::http::HttpTransport;
use crate::connections::mastodon::MastodonClient;
use crate::connections::twitter::{TwitterApi, TwitterClient};
use crate::connections::xrpc::Transport;
use crate::core::login_outcome::LoginOutcome;
use crate::core::platform::Platform;
use crate::storage::{RateLimitGate, SessionCache};

type Slot<T> = Mutex<Option<Arc<T>>>;

struct Inner {
    settings: Settings,
    session_cache: SessionCache,
    gate: RateLimitGate,
    /// Overrides the HTTPS transport for Bluesky when set.
    bluesky_transport: Option<Arc<dyn Transport>>,

    bluesky: Slot<RateLimitedClient>,
    mastodon: Slot<MastodonClient>,
    twitter_api: Slot<TwitterApi>,
    twitter_client: Slot<TwitterClient>,
}

/// Registry of the platform connections of one bot run.
///
/// Each platform has one slot that is filled on the first request and then
/// handed out for the rest of the process. The slot's lock is held while a
/// connection is being established, so concurrent callers wait for the first
/// login instead of starting their own. Cloning the manager only bumps the
/// reference count of the shared state.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

impl ConnectionManager {
    pub fn new(settings: Settings) -> Result<Self, ConnectionError> {
        Self::build(settings, None)
    }

    /// Like [`new`](Self::new), but Bluesky traffic goes through `transport`
    /// instead of HTTPS.
    pub fn with_bluesky_transport(
        settings: Settings,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConnectionError> {
        Self::build(settings, Some(transport))
    }

    fn build(
        settings: Settings,
        bluesky_transport: Option<Arc<dyn Transport>>,
    ) -> Result<Self, ConnectionError> {
        settings.validate()?;
        let session_cache = SessionCache::new(settings.session_cache_path()?);
        let gate = RateLimitGate::new(settings.rate_limit_path()?);
        Ok(Self {
            inner: Arc::new(Inner {
                settings,
                session_cache,
                gate,
                bluesky_transport,
                bluesky: Mutex::new(None),
                mastodon: Mutex::new(None),
                twitter_api: Mutex::new(None),
                twitter_client: Mutex::new(None),
            }),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn session_cache(&self) -> &SessionCache {
        &self.inner.session_cache
    }

    pub fn rate_limit_gate(&self) -> &RateLimitGate {
        &self.inner.gate
    }

    /// Pre-flight check: `true` means this run should do nothing.
    pub fn is_rate_limited(&self) -> Result<bool, ConnectionError> {
        Ok(self.inner.gate.is_blocked()?)
    }

    /// Platforms that have credentials in the settings.
    pub fn configured_platforms(&self) -> Vec<Platform> {
        let settings = &self.inner.settings;
        Platform::ALL
            .into_iter()
            .filter(|platform| match platform {
                Platform::Bluesky => settings.bluesky.is_some(),
                Platform::Mastodon => settings.mastodon.is_some(),
                Platform::TwitterApi | Platform::TwitterClient => settings.twitter.is_some(),
            })
            .collect()
    }

    /// Establish (or reuse) the connection for `platform`.
    pub async fn connect(&self, platform: Platform) -> Result<(), ConnectionError> {
        match platform {
            Platform::Bluesky => self.bluesky().await.map(drop),
            Platform::Mastodon => self.mastodon().await.map(drop),
            Platform::TwitterApi => self.twitter_api().await.map(drop),
            Platform::TwitterClient => self.twitter_client().await.map(drop),
        }
    }

    /// The rate-limited Bluesky client, logging in on first use.
    ///
    /// A cached session is preferred over a password login. On failure the
    /// persisted state is adjusted before the error is returned: a
    /// `RateLimitExceeded` answer closes the rate-limit gate until the
    /// server's reset time, and an expired token deletes the session cache.
    pub async fn bluesky(&self) -> Result<Arc<RateLimitedClient>, ConnectionError> {
        let mut slot = self.inner.bluesky.lock().await;
        if let Some(client) = slot.as_ref() {
            info!("Already connected to Bluesky.");
            return Ok(client.clone());
        }

        let credentials = self
            .inner
            .settings
            .bluesky
            .as_ref()
            .ok_or(ConnectionError::MissingCredentials(Platform::Bluesky))?;
        info!("Connecting to Bluesky: {}.", credentials.pds);

        let transport: Arc<dyn Transport> = match &self.inner.bluesky_transport {
            Some(transport) => transport.clone(),
            None => Arc::new(HttpTransport::new(&credentials.pds)?),
        };
        let client = RateLimitedClient::new(
            transport,
            self.inner.gate.clone(),
            self.inner.settings.rate_limit_buffer,
        );

        // Tokens can rotate on any call, not only at login.
        let cache = self.inner.session_cache.clone();
        client.on_session_change(move |event, session| {
            if !matches!(event, SessionEvent::Create | SessionEvent::Refresh) {
                return;
            }
            info!("Session changed ({:?}), saving it", event);
            let saved = session
                .export()
                .and_then(|exported| cache.write(&exported).map_err(ConnectionError::from));
            if let Err(e) = saved {
                error!("Could not save changed session: {}", e);
            }
        });

        match self.login_bluesky(&client, credentials).await? {
            LoginOutcome::Success => {}
            outcome => {
                self.handle_login_failure(&outcome)?;
                return Err(ConnectionError::LoginFailed {
                    platform: Platform::Bluesky,
                    outcome,
                });
            }
        }

        let client = Arc::new(client);
        *slot = Some(client.clone());
        Ok(client)
    }

    async fn login_bluesky(
        &self,
        client: &RateLimitedClient,
        credentials: &BlueskyCredentials,
    ) -> Result<LoginOutcome, ConnectionError> {
        let cached = self
            .inner
            .session_cache
            .read()?
            .filter(|session| !session.trim().is_empty());
        let attempt = match cached {
            Some(session) => {
                info!("Connecting to Bluesky using saved session.");
                client
                    .login_with_session(&session)
                    .await
                    .map(|_| "Successfully logged in to Bluesky using saved session.")
            }
            None => {
                info!("Creating new Bluesky session using password and username.");
                let password = credentials.password()?;
                client
                    .login(&credentials.handle, &password)
                    .await
                    .map(|_| "Successfully logged in to Bluesky.")
            }
        };

        match attempt {
            Ok(message) => {
                info!("{}", message);
                let session = client.export_session_string()?;
                self.inner.session_cache.write(&session)?;
                Ok(LoginOutcome::Success)
            }
            Err(e @ ConnectionError::IoError(_)) => Err(e),
            Err(e) => {
                error!("{}", e);
                Ok(LoginOutcome::classify(&e))
            }
        }
    }

    fn handle_login_failure(&self, outcome: &LoginOutcome) -> Result<(), ConnectionError> {
        match outcome {
            LoginOutcome::RateLimitExceeded(Some(reset)) => self.inner.gate.write(*reset)?,
            LoginOutcome::RateLimitExceeded(None) => {
                warn!("Rate limit exceeded, but the server sent no reset time.")
            }
            LoginOutcome::ExpiredToken => {
                info!("Session expired, removing session file.");
                self.inner.session_cache.remove()?;
            }
            LoginOutcome::Success | LoginOutcome::Other(_) => {}
        }
        Ok(())
    }

    pub async fn mastodon(&self) -> Result<Arc<MastodonClient>, ConnectionError> {
        let credentials = self.inner.settings.mastodon.as_ref();
        get_or_init(&self.inner.mastodon, Platform::Mastodon, || {
            MastodonClient::new(credentials.ok_or(ConnectionError::MissingCredentials(Platform::Mastodon))?)
        })
        .await
    }

    pub async fn twitter_api(&self) -> Result<Arc<TwitterApi>, ConnectionError> {
        let credentials = self.inner.settings.twitter.as_ref();
        get_or_init(&self.inner.twitter_api, Platform::TwitterApi, || {
            TwitterApi::new(credentials.ok_or(ConnectionError::MissingCredentials(Platform::TwitterApi))?)
        })
        .await
    }

    pub async fn twitter_client(&self) -> Result<Arc<TwitterClient>, ConnectionError> {
        let credentials = self.inner.settings.twitter.as_ref();
        get_or_init(&self.inner.twitter_client, Platform::TwitterClient, || {
            TwitterClient::new(credentials.ok_or(ConnectionError::MissingCredentials(Platform::TwitterClient))?)
        })
        .await
    }
}

/// Shared "connect or return existing" logic for handles that are built
/// without a network round-trip.
async fn get_or_init<T>(
    slot: &Slot<T>,
    platform: Platform,
    init: impl FnOnce() -> Result<T, ConnectionError>,
) -> Result<Arc<T>, ConnectionError> {
    let mut slot = slot.lock().await;
    if let Some(handle) = slot.as_ref() {
        info!("Already connected to {}.", platform);
        return Ok(handle.clone());
    }
    let handle = Arc::new(init()?);
    *slot = Some(handle.clone());
    Ok(handle)
}

use crate::error::FitError;
use async_google_apis_common as common;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::Path;
use yup_oauth2::authenticator::Authenticator;
use common::yup_oauth2::{InstalledFlowAuthenticator, InstalledFlowReturnMethod};

use crate::providers::google::TlsClient;

/// A bearer token and, when known, the instant it stops being accepted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Credential {
        Credential {
            access_token: access_token.into(),
            expires_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Tokens without an expiry are treated as valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |at| at <= now)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of credentials for API calls. The pipeline only ever talks to this trait,
/// never to the OAuth library directly.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Returns a usable credential, running the consent flow if nothing is cached.
    async fn obtain_credential(&self) -> anyhow::Result<Credential>;

    /// Exchanges the stored refresh token for a new access token.
    async fn refresh_credential(&self, stale: &Credential) -> anyhow::Result<Credential>;
}

/// Asks `authorizer` for a credential and refreshes it if it is already stale at `now`.
/// A refresh that hands back the same expired credential is an error.
pub async fn current_credential(
    authorizer: &dyn Authorizer,
    now: DateTime<Utc>,
) -> anyhow::Result<Credential> {
    let credential = authorizer.obtain_credential().await?;
    if !credential.is_expired(now) {
        return Ok(credential);
    }
    log::debug!("cached credential expired at {:?}, refreshing", credential.expires_at());
    let fresh = authorizer.refresh_credential(&credential).await?;
    if fresh == credential {
        anyhow::bail!("authorizer returned the expired credential again");
    }
    Ok(fresh)
}

/// Installed-application OAuth flow: the user is sent to a browser once, Google redirects
/// back to a local listener, and the tokens are written to disk for later runs.
pub struct InstalledFlowAuthorizer {
    auth: Authenticator<hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>,
    scopes: Vec<String>,
}

impl InstalledFlowAuthorizer {
    pub async fn new<S: AsRef<str>>(
        https_client: TlsClient,
        client_secret_path: &Path,
        token_file: &Path,
        scopes: &[S],
    ) -> anyhow::Result<InstalledFlowAuthorizer> {
        let secrets = common::yup_oauth2::read_application_secret(client_secret_path)
            .await
            .map_err(FitError::InvalidClientSecret)?;

        if let Some(dir) = token_file.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let auth =
            InstalledFlowAuthenticator::builder(secrets, InstalledFlowReturnMethod::HTTPRedirect)
                .persist_tokens_to_disk(token_file)
                .hyper_client(https_client)
                .build()
                .await?;
        log::debug!("token store at {}", token_file.display());

        Ok(InstalledFlowAuthorizer {
            auth,
            scopes: scopes.iter().map(|s| s.as_ref().to_string()).collect(),
        })
    }

    async fn token(&self) -> anyhow::Result<Credential> {
        let token = self
            .auth
            .token(self.scopes.as_slice())
            .await
            .map_err(FitError::Authorization)?;
        Ok(Credential::new(token.as_str(), token.expiration_time()))
    }
}

#[async_trait]
impl Authorizer for InstalledFlowAuthorizer {
    async fn obtain_credential(&self) -> anyhow::Result<Credential> {
        self.token().await
    }

    async fn refresh_credential(&self, _stale: &Credential) -> anyhow::Result<Credential> {
        // The authenticator refreshes on its own once the cached token has expired.
        self.token().await
    }
}

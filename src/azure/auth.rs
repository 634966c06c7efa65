//! Azure Authentication
//!
//! Handles bearer token acquisition using either a pre-issued access token
//! (`AZURE_ACCESS_TOKEN`, e.g. from `az account get-access-token`) or a
//! service principal through `azure_identity`'s client-secret credential.

use super::http::ApiError;
use azure_core::auth::TokenCredential;
use azure_identity::ClientSecretCredential;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Scope requested for Azure Resource Manager access
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Default authority host for Azure public cloud
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Token expiry buffer - refresh tokens this much before they actually expire
/// This prevents using tokens that are about to expire during a request
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// TTL assumed for static tokens, whose expiry is unknown
const STATIC_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Where access tokens come from
#[derive(Clone)]
pub enum CredentialSource {
    /// A token issued out of band; it cannot be refreshed
    Static(String),
    /// Service principal using the client-credentials grant
    ClientSecret {
        authority_host: String,
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Static(_) => f.write_str("Static(<redacted>)"),
            CredentialSource::ClientSecret {
                tenant_id,
                client_id,
                ..
            } => f
                .debug_struct("ClientSecret")
                .field("tenant_id", tenant_id)
                .field("client_id", client_id)
                .finish_non_exhaustive(),
        }
    }
}

/// Resolved token provider behind a [`CredentialSource`]
#[derive(Clone)]
enum TokenProvider {
    Static(String),
    ServicePrincipal {
        tenant_id: String,
        credential: Arc<ClientSecretCredential>,
    },
}

/// Azure credentials holder with token caching
#[derive(Clone)]
pub struct AzureCredentials {
    provider: TokenProvider,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl AzureCredentials {
    /// Build credentials; fails only on a malformed authority host
    pub fn new(source: CredentialSource) -> Result<Self, ApiError> {
        let provider = match source {
            CredentialSource::Static(token) => TokenProvider::Static(token),
            CredentialSource::ClientSecret {
                authority_host,
                tenant_id,
                client_id,
                client_secret,
            } => {
                let authority = azure_core::Url::parse(&authority_host).map_err(|e| {
                    ApiError::Auth(format!("invalid authority host {:?}: {}", authority_host, e))
                })?;
                let credential = ClientSecretCredential::new(
                    azure_core::new_http_client(),
                    authority,
                    tenant_id.clone(),
                    client_id,
                    client_secret,
                );
                TokenProvider::ServicePrincipal {
                    tenant_id,
                    credential: Arc::new(credential),
                }
            }
        };

        Ok(Self {
            provider,
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Get an access token for API calls
    /// Checks token expiry before returning cached token
    pub async fn get_token(&self) -> Result<String, ApiError> {
        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let (token, ttl) = match &self.provider {
            TokenProvider::Static(token) => (token.clone(), STATIC_TOKEN_TTL),
            TokenProvider::ServicePrincipal {
                tenant_id,
                credential,
            } => {
                tracing::debug!("Requesting token for tenant {}", tenant_id);
                let access = credential
                    .get_token(&[MANAGEMENT_SCOPE])
                    .await
                    .map_err(|e| {
                        ApiError::Auth(format!("token request for tenant {} failed: {}", tenant_id, e))
                    })?;

                let remaining = access.expires_on.unix_timestamp() - chrono::Utc::now().timestamp();
                let ttl = Duration::from_secs(u64::try_from(remaining).unwrap_or(0));
                (access.token.secret().to_string(), ttl)
            }
        };

        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token)
    }

    /// Force refresh the token
    pub async fn refresh_token(&self) -> Result<String, ApiError> {
        {
            let mut cache = self.token_cache.write().await;
            *cache = None;
        }

        self.get_token().await
    }
}

/// Resolve a credential source from the environment
///
/// `AZURE_ACCESS_TOKEN` wins; otherwise the service principal variables
/// `AZURE_CLIENT_SECRET` (or `ARM_CLIENT_SECRET`) must be present together
/// with the tenant and client ids resolved by the caller.
pub fn credential_source_from_env(
    authority_host: &str,
    tenant_id: Option<&str>,
    client_id: Option<&str>,
) -> Result<CredentialSource, ApiError> {
    if let Ok(token) = std::env::var("AZURE_ACCESS_TOKEN") {
        if !token.trim().is_empty() {
            return Ok(CredentialSource::Static(token.trim().to_string()));
        }
    }

    let secret = std::env::var("AZURE_CLIENT_SECRET")
        .or_else(|_| std::env::var("ARM_CLIENT_SECRET"))
        .map_err(|_| {
            ApiError::Auth(
                "no credentials found: set AZURE_ACCESS_TOKEN or AZURE_CLIENT_SECRET".to_string(),
            )
        })?;

    let tenant_id = tenant_id
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Auth("no tenant id configured".to_string()))?;
    let client_id = client_id
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Auth("no client id configured".to_string()))?;

    Ok(CredentialSource::ClientSecret {
        authority_host: authority_host.to_string(),
        tenant_id: tenant_id.to_string(),
        client_id: client_id.to_string(),
        client_secret: secret,
    })
}

// SPDX-License-Identifier: MIT

//! Identity provider client.
//!
//! Narrow REST client over the hosted identity service: account creation,
//! credential checks, email/phone verification challenges, TOTP second
//! factor, and password changes. Session tokens themselves are minted by this
//! service (see `middleware::auth`); the provider is only consulted to vouch
//! for credentials and verification state.
//!
//! Verification status is read-through with a short TTL cache so the frontend
//! can poll `/account/verification-status` while the user clicks an emailed
//! link in another tab without hammering the provider.

use crate::config::Config;
use crate::error::AppError;
use crate::models::VerificationStatus;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a cached verification lookup stays fresh.
const VERIFICATION_CACHE_TTL: Duration = Duration::from_secs(5);

/// Identity provider client.
pub struct IdentityService {
    /// HTTP client; `None` in offline/mock mode
    http: Option<reqwest::Client>,
    base_url: String,
    api_key: String,
    /// Bounded-TTL cache of verification lookups, shared across requests
    verification_cache: Arc<DashMap<String, (VerificationStatus, Instant)>>,
    /// Mock behavior knobs (debug builds only)
    #[cfg(debug_assertions)]
    mock: std::sync::Mutex<MockIdentity>,
}

/// Configurable mock behavior for offline tests.
#[cfg(debug_assertions)]
#[derive(Debug, Clone)]
pub struct MockIdentity {
    pub status: VerificationStatus,
    /// Reject all credential checks with `Unauthorized`
    pub reject_credentials: bool,
    /// Treat every signup email as already registered
    pub duplicate_email: bool,
}

#[cfg(debug_assertions)]
impl Default for MockIdentity {
    fn default() -> Self {
        Self {
            status: VerificationStatus {
                email_verified: true,
                phone_verified: true,
                has_phone: true,
                email: Some("test@example.com".to_string()),
                phone: Some("+16505550199".to_string()),
            },
            reject_credentials: false,
            duplicate_email: false,
        }
    }
}

/// Account record as returned by the provider.
#[derive(Debug, Deserialize)]
struct AccountResponse {
    id: String,
    email: String,
    email_verified: bool,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    phone_verified: bool,
}

/// TOTP enrollment returned on second-factor creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotpEnrollment {
    /// Base32 TOTP secret for authenticator apps
    pub secret: String,
    /// otpauth:// provisioning URI
    pub otpauth_url: String,
}

impl IdentityService {
    /// Create a client talking to the configured identity provider.
    pub fn new(
        config: &Config,
        verification_cache: Arc<DashMap<String, (VerificationStatus, Instant)>>,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Failed to build identity HTTP client: {}", e))
            })?;

        Ok(Self {
            http: Some(http),
            base_url: config.identity_api_url.trim_end_matches('/').to_string(),
            api_key: config.identity_api_key.clone(),
            verification_cache,
            #[cfg(debug_assertions)]
            mock: std::sync::Mutex::new(MockIdentity::default()),
        })
    }

    /// Create a mock identity client for testing (offline mode).
    /// Only available in debug/test builds.
    #[cfg(debug_assertions)]
    pub fn new_mock() -> Self {
        Self {
            http: None,
            base_url: "http://identity.mock".to_string(),
            api_key: "mock".to_string(),
            verification_cache: Arc::new(DashMap::new()),
            mock: std::sync::Mutex::new(MockIdentity::default()),
        }
    }

    /// Adjust mock behavior (debug builds only).
    #[cfg(debug_assertions)]
    pub fn set_mock(&self, mock: MockIdentity) {
        *self.mock.lock().unwrap() = mock;
        self.verification_cache.clear();
    }

    fn get_client(&self) -> Result<&reqwest::Client, AppError> {
        self.http
            .as_ref()
            .ok_or_else(|| AppError::Identity("Identity provider not connected".to_string()))
    }

    #[cfg(debug_assertions)]
    fn mock_user_id(email: &str) -> String {
        let local = email.split('@').next().unwrap_or(email);
        format!("usr_{}", local.replace(|c: char| !c.is_alphanumeric(), "_"))
    }

    // ─── Accounts & Credentials ──────────────────────────────────

    /// Create a new account at the provider. Returns the new user ID.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<String, AppError> {
        #[cfg(debug_assertions)]
        if self.http.is_none() {
            let mock = self.mock.lock().unwrap();
            if mock.duplicate_email {
                return Err(AppError::AlreadyExists(
                    "An account with this email already exists".to_string(),
                ));
            }
            return Ok(Self::mock_user_id(email));
        }

        let response = self
            .get_client()?
            .post(format!("{}/v1/accounts", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "name": name,
            }))
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Account creation failed: {}", e)))?;

        let account: AccountResponse = Self::expect_success(response, "account")
            .await?
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("Invalid account response: {}", e)))?;

        Ok(account.id)
    }

    /// Check email/password against the provider. Returns the user ID.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<String, AppError> {
        #[cfg(debug_assertions)]
        if self.http.is_none() {
            let mock = self.mock.lock().unwrap();
            if mock.reject_credentials {
                return Err(AppError::Unauthorized);
            }
            return Ok(Self::mock_user_id(email));
        }

        let response = self
            .get_client()?
            .post(format!("{}/v1/sessions/verify", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Credential check failed: {}", e)))?;

        let account: AccountResponse = Self::expect_success(response, "session")
            .await?
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("Invalid session response: {}", e)))?;

        Ok(account.id)
    }

    /// Change the account password, re-verifying the current one upstream.
    pub async fn change_password(
        &self,
        user_id: &str,
        current: &str,
        new: &str,
    ) -> Result<(), AppError> {
        #[cfg(debug_assertions)]
        if self.http.is_none() {
            let mock = self.mock.lock().unwrap();
            if mock.reject_credentials {
                return Err(AppError::Forbidden("Current password is incorrect".to_string()));
            }
            return Ok(());
        }

        let response = self
            .get_client()?
            .post(format!("{}/v1/accounts/{}/password", self.base_url, user_id))
            .header("x-api-key", &self.api_key)
            .json(&serde_json::json!({
                "current_password": current,
                "new_password": new,
            }))
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Password change failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AppError::Forbidden("Current password is incorrect".to_string()));
        }
        Self::expect_success(response, "password").await?;
        Ok(())
    }

    // ─── Verification Status ─────────────────────────────────────

    /// Fetch verification state, served from cache when fresh.
    pub async fn verification_status(&self, user_id: &str) -> Result<VerificationStatus, AppError> {
        if let Some(entry) = self.verification_cache.get(user_id) {
            let (status, fetched_at) = entry.value();
            if fetched_at.elapsed() < VERIFICATION_CACHE_TTL {
                return Ok(status.clone());
            }
        }

        let status = self.fetch_verification_status(user_id).await?;
        self.verification_cache
            .insert(user_id.to_string(), (status.clone(), Instant::now()));
        Ok(status)
    }

    async fn fetch_verification_status(
        &self,
        user_id: &str,
    ) -> Result<VerificationStatus, AppError> {
        #[cfg(debug_assertions)]
        if self.http.is_none() {
            return Ok(self.mock.lock().unwrap().status.clone());
        }

        let response = self
            .get_client()?
            .get(format!("{}/v1/accounts/{}", self.base_url, user_id))
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Verification lookup failed: {}", e)))?;

        let account: AccountResponse = Self::expect_success(response, "account")
            .await?
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("Invalid account response: {}", e)))?;

        Ok(VerificationStatus {
            email_verified: account.email_verified,
            phone_verified: account.phone_verified,
            has_phone: account.phone.is_some(),
            email: Some(account.email),
            phone: account.phone,
        })
    }

    /// Ask the provider to send an email verification challenge.
    pub async fn send_email_verification(&self, user_id: &str) -> Result<(), AppError> {
        self.send_challenge(user_id, "email").await
    }

    /// Ask the provider to send an SMS verification challenge.
    pub async fn send_phone_verification(&self, user_id: &str) -> Result<(), AppError> {
        self.send_challenge(user_id, "phone").await
    }

    async fn send_challenge(&self, user_id: &str, channel: &str) -> Result<(), AppError> {
        #[cfg(debug_assertions)]
        if self.http.is_none() {
            return Ok(());
        }

        let response = self
            .get_client()?
            .post(format!(
                "{}/v1/accounts/{}/verification/{}",
                self.base_url, user_id, channel
            ))
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Verification send failed: {}", e)))?;

        Self::expect_success(response, "verification").await?;
        Ok(())
    }

    // ─── TOTP Second Factor ──────────────────────────────────────

    /// Create a TOTP factor. The returned secret must be verified with
    /// [`Self::verify_totp`] before the factor becomes active.
    pub async fn create_totp(&self, user_id: &str) -> Result<TotpEnrollment, AppError> {
        #[cfg(debug_assertions)]
        if self.http.is_none() {
            return Ok(TotpEnrollment {
                secret: "MOCKSECRETBASE32".to_string(),
                otpauth_url: format!("otpauth://totp/MissionSend:{}?secret=MOCKSECRETBASE32", user_id),
            });
        }

        let response = self
            .get_client()?
            .post(format!("{}/v1/accounts/{}/mfa/totp", self.base_url, user_id))
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("TOTP creation failed: {}", e)))?;

        Self::expect_success(response, "totp")
            .await?
            .json()
            .await
            .map_err(|e| AppError::Identity(format!("Invalid TOTP response: {}", e)))
    }

    /// Verify a TOTP code, activating the factor.
    pub async fn verify_totp(&self, user_id: &str, code: &str) -> Result<(), AppError> {
        #[cfg(debug_assertions)]
        if self.http.is_none() {
            if code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit()) {
                return Ok(());
            }
            return Err(AppError::BadRequest("Invalid verification code".to_string()));
        }

        let response = self
            .get_client()?
            .post(format!(
                "{}/v1/accounts/{}/mfa/totp/verify",
                self.base_url, user_id
            ))
            .header("x-api-key", &self.api_key)
            .json(&serde_json::json!({ "code": code }))
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("TOTP verification failed: {}", e)))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::BAD_REQUEST
        {
            return Err(AppError::BadRequest("Invalid verification code".to_string()));
        }
        Self::expect_success(response, "totp").await?;
        Ok(())
    }

    /// Remove the TOTP factor.
    pub async fn delete_totp(&self, user_id: &str) -> Result<(), AppError> {
        #[cfg(debug_assertions)]
        if self.http.is_none() {
            return Ok(());
        }

        let response = self
            .get_client()?
            .delete(format!("{}/v1/accounts/{}/mfa/totp", self.base_url, user_id))
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("TOTP removal failed: {}", e)))?;

        Self::expect_success(response, "totp").await?;
        Ok(())
    }

    // ─── Helpers ─────────────────────────────────────────────────

    async fn expect_success(
        response: reqwest::Response,
        what: &str,
    ) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            reqwest::StatusCode::UNAUTHORIZED => Err(AppError::Unauthorized),
            reqwest::StatusCode::CONFLICT => Err(AppError::AlreadyExists(format!(
                "{} already exists",
                what
            ))),
            reqwest::StatusCode::NOT_FOUND => Err(AppError::NotFound(what.to_string())),
            reqwest::StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::BadRequest(body))
            }
            other => Err(AppError::Identity(format!(
                "{}: unexpected provider status {}",
                what, other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_round_trip() {
        let identity = IdentityService::new_mock();
        let id = identity
            .create_account("ruth@example.com", "hunter22", "Ruth")
            .await
            .unwrap();
        assert_eq!(id, "usr_ruth");

        let same = identity
            .verify_credentials("ruth@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(same, id);
    }

    #[tokio::test]
    async fn test_mock_rejects_credentials_when_configured() {
        let identity = IdentityService::new_mock();
        identity.set_mock(MockIdentity {
            reject_credentials: true,
            ..MockIdentity::default()
        });

        let err = identity
            .verify_credentials("ruth@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_verification_status_is_cached() {
        let identity = IdentityService::new_mock();
        let first = identity.verification_status("usr_ruth").await.unwrap();
        assert!(first.email_verified);

        // A mock change without cache invalidation is not visible within TTL
        identity.mock.lock().unwrap().status.email_verified = false;
        let cached = identity.verification_status("usr_ruth").await.unwrap();
        assert!(cached.email_verified);
    }
}

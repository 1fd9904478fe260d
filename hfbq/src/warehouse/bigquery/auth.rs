use hfbq_config::shared::ServiceAccountKeySource;
use secrecy::ExposeSecret;
use yup_oauth2::authenticator::DefaultAuthenticator;
use yup_oauth2::{ServiceAccountAuthenticator, ServiceAccountKey};

use crate::error::{ErrorKind, LoaderError, LoaderResult};
use crate::loader_error;

/// OAuth2 scope granting access to BigQuery.
const BIGQUERY_SCOPE: &str = "https://www.googleapis.com/auth/bigquery";

/// Source of bearer tokens for BigQuery requests.
///
/// Tokens are cached by the authenticator and refreshed before they expire.
#[derive(Clone)]
pub(crate) struct TokenProvider {
    authenticator: DefaultAuthenticator,
}

impl TokenProvider {
    /// Builds a provider from the configured key source.
    pub(crate) async fn from_key_source(source: ServiceAccountKeySource<'_>) -> LoaderResult<Self> {
        let key = match source {
            ServiceAccountKeySource::Inline(key) => {
                yup_oauth2::parse_service_account_key(key.expose_secret())
                    .map_err(|err| invalid_key_error("inline service account key", err))?
            }
            ServiceAccountKeySource::Path(path) => yup_oauth2::read_service_account_key(path)
                .await
                .map_err(|err| invalid_key_error(path, err))?,
        };

        Self::from_key(key).await
    }

    async fn from_key(key: ServiceAccountKey) -> LoaderResult<Self> {
        let authenticator = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|err| {
                loader_error!(
                    ErrorKind::DestinationAuthenticationError,
                    "Failed to build the BigQuery authenticator",
                    err.to_string(),
                    source: err
                )
            })?;

        Ok(Self { authenticator })
    }

    /// Returns a valid access token for the BigQuery scope.
    pub(crate) async fn access_token(&self) -> LoaderResult<String> {
        let token = self
            .authenticator
            .token(&[BIGQUERY_SCOPE])
            .await
            .map_err(|err| {
                let kind = match &err {
                    yup_oauth2::Error::HttpError(_) | yup_oauth2::Error::LowLevelError(_) => {
                        ErrorKind::DestinationConnectionFailed
                    }
                    _ => ErrorKind::DestinationAuthenticationError,
                };

                loader_error!(
                    kind,
                    "Failed to obtain a BigQuery access token",
                    err.to_string(),
                    source: err
                )
            })?;

        match token.token() {
            Some(token) => Ok(token.to_string()),
            None => Err(loader_error!(
                ErrorKind::DestinationAuthenticationError,
                "Token endpoint returned no access token"
            )),
        }
    }
}

fn invalid_key_error(origin: &str, err: std::io::Error) -> LoaderError {
    loader_error!(
        ErrorKind::ConfigError,
        "Failed to read the service account key",
        format!("{origin}: {err}"),
        source: err
    )
}

//! Conversions from external infrastructure errors into domain errors.

use peoplexd_common::auth::TokenManagerError;
use peoplexd_domain::PeopleXdError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PeopleXdError);

impl From<InfraError> for PeopleXdError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PeopleXdError> for InfraError {
    fn from(value: PeopleXdError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoPeopleXdError {
    fn into_peoplexd(self) -> PeopleXdError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PeopleXdError */
/* -------------------------------------------------------------------------- */

impl IntoPeopleXdError for HttpError {
    fn into_peoplexd(self) -> PeopleXdError {
        if self.is_timeout() {
            return PeopleXdError::TransientUpstreamFailure {
                status: None,
                message: format!("request timed out: {self}"),
            };
        }
        if self.is_decode() {
            return PeopleXdError::InvalidResponse(format!("failed to decode response: {self}"));
        }
        if self.is_builder() {
            return PeopleXdError::Internal(format!("failed to build HTTP request: {self}"));
        }
        PeopleXdError::Network(format!("HTTP request failed: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_peoplexd())
    }
}

/* -------------------------------------------------------------------------- */
/* TokenManagerError → PeopleXdError */
/* -------------------------------------------------------------------------- */

impl IntoPeopleXdError for TokenManagerError {
    fn into_peoplexd(self) -> PeopleXdError {
        PeopleXdError::AuthenticationFailure(self.to_string())
    }
}

impl From<TokenManagerError> for InfraError {
    fn from(value: TokenManagerError) -> Self {
        InfraError(value.into_peoplexd())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → PeopleXdError */
/* -------------------------------------------------------------------------- */

impl IntoPeopleXdError for serde_json::Error {
    fn into_peoplexd(self) -> PeopleXdError {
        PeopleXdError::InvalidResponse(format!("invalid JSON body: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_peoplexd())
    }
}

/// Convert a token failure into the domain error surfaced to callers.
pub fn token_error(err: TokenManagerError) -> PeopleXdError {
    InfraError::from(err).into()
}

/// Path identifier extractors
///
/// Ids are taken as raw strings so handlers can answer a malformed id with
/// the resource's 404. If a segment does not percent-decode to UTF-8, the
/// undecoded segment from the request URI is used instead, which then fails
/// UUID validation like any other malformed id.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use std::{collections::HashMap, convert::Infallible};
use tracing::debug;

/// `:id` of `/projects/:id...`
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectIdParam(pub String);

/// `:id` and `:user_id` of `/projects/:id/users/:user_id`
#[derive(Debug, Clone, PartialEq)]
pub struct MemberParams {
    pub project_id: String,
    pub user_id: String,
}

/// Positions of the id segments in `/projects/:id/users/:user_id`
const PROJECT_SEGMENT: usize = 1;
const USER_SEGMENT: usize = 3;

async fn raw_param<S>(parts: &mut Parts, state: &S, name: &str, segment: usize) -> String
where
    S: Send + Sync,
{
    match Path::<HashMap<String, String>>::from_request_parts(parts, state).await {
        Ok(Path(mut params)) => params.remove(name).unwrap_or_default(),
        Err(rejection) => {
            debug!(%rejection, uri = %parts.uri, "Falling back to raw path segment");
            parts
                .uri
                .path()
                .split('/')
                .filter(|s| !s.is_empty())
                .nth(segment)
                .unwrap_or_default()
                .to_string()
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ProjectIdParam
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(raw_param(parts, state, "id", PROJECT_SEGMENT).await))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MemberParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            project_id: raw_param(parts, state, "id", PROJECT_SEGMENT).await,
            user_id: raw_param(parts, state, "user_id", USER_SEGMENT).await,
        })
    }
}

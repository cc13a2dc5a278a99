//! Shareable kiosk routes and rehydration from the URL alone.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::api_types::{Passport, Product};
use crate::backend::Backend;
use crate::errors::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Survey,
    Recommendation(String),
    Passport(String),
    Catalog,
    Stylist,
}

impl Route {
    /// Parse a path such as `/passport/abc123`. Absolute URLs are reduced to their path.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let input = input.trim();
        let path = if input.starts_with("http://") || input.starts_with("https://") {
            Url::parse(input)
                .map_err(|e| Error::InvalidRoute(format!("{input}: {e}")))?
                .path()
                .to_string()
        } else {
            input
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string()
        };

        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Ok(Route::Home);
        }
        let Some(rest) = trimmed.strip_prefix('/') else {
            return Err(Error::InvalidRoute(format!("{input}: must start with '/'")));
        };

        let segments: Vec<&str> = rest.split('/').collect();
        match segments.as_slice() {
            ["survey"] => Ok(Route::Survey),
            ["catalog"] => Ok(Route::Catalog),
            ["stylist"] => Ok(Route::Stylist),
            ["recommendation", id] if !id.is_empty() => {
                Ok(Route::Recommendation(decode_id(input, id)?))
            }
            ["passport", id] if !id.is_empty() => Ok(Route::Passport(decode_id(input, id)?)),
            ["recommendation" | "passport"] | ["recommendation" | "passport", _] => Err(
                Error::InvalidRoute(format!("{input}: missing session id")),
            ),
            _ => Err(Error::InvalidRoute(input.to_string())),
        }
    }

    pub fn to_path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Survey => "/survey".to_string(),
            Route::Recommendation(id) => format!("/recommendation/{}", urlencoding::encode(id)),
            Route::Passport(id) => format!("/passport/{}", urlencoding::encode(id)),
            Route::Catalog => "/catalog".to_string(),
            Route::Stylist => "/stylist".to_string(),
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            Route::Recommendation(id) | Route::Passport(id) => Some(id),
            _ => None,
        }
    }
}

/// Session ids arrive percent-encoded in links.
fn decode_id(input: &str, id: &str) -> Result<String, Error> {
    urlencoding::decode(id)
        .map(|id| id.into_owned())
        .map_err(|e| Error::InvalidRoute(format!("{input}: {e}")))
}

impl FromStr for Route {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Route::parse(s)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

/// What a route shows once its data has been fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum RouteView {
    Welcome,
    Survey,
    Recommendation(Passport),
    Passport(Passport),
    Catalog(Vec<Product>),
    Stylist,
}

/// Build the view for `route` using only the route and the backend.
///
/// A failed passport fetch is returned as an error rather than left loading.
pub async fn rehydrate(route: &Route, backend: &dyn Backend) -> Result<RouteView, Error> {
    debug!(route = %route, "rehydrating route");
    let view = match route {
        Route::Home => RouteView::Welcome,
        Route::Survey => RouteView::Survey,
        Route::Stylist => RouteView::Stylist,
        Route::Recommendation(id) => RouteView::Recommendation(backend.passport(id).await?),
        Route::Passport(id) => RouteView::Passport(backend.passport(id).await?),
        Route::Catalog => RouteView::Catalog(backend.products().await?),
    };
    Ok(view)
}

//! Market-data API client: token listings, lookups and search

use crate::models::{DetailedToken, MarketToken, SearchResult, TokenInfo, TokenSort};
use crate::transform::{detailed_token, matches_query, normalize_tokens};
use regex::Regex;
use serde_json::Value;
use services_common::constants::{MAX_SEARCH_RESULTS, MIN_SEARCH_QUERY_LEN};
use services_common::{ApiClient, ApiResponse, ServiceError, ServiceResult};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

const AUTH_REQUIRED_MESSAGE: &str = "API authentication required. Please check your API key.";
const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";
const TOKEN_NOT_FOUND_MESSAGE: &str = "Token not found or not supported";

/// Base58 mint address
static MINT_ADDRESS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").ok());

/// Whether `s` looks like a token mint rather than a name
#[must_use]
pub fn is_mint_address(s: &str) -> bool {
    MINT_ADDRESS.as_ref().is_some_and(|re| re.is_match(s))
}

/// Client for the token endpoints
#[derive(Debug, Clone)]
pub struct MarketDataClient {
    client: ApiClient,
}

impl MarketDataClient {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Listing for `sort`, normalised
    ///
    /// # Errors
    /// Authentication, rate-limit, server and transport failures
    pub async fn list_tokens(&self, sort: TokenSort) -> ServiceResult<Vec<MarketToken>> {
        let response = self.client.get(sort.path(), &[]).await?;
        if !response.is_success() {
            warn!(%sort, status = response.status, "Token listing failed");
            return Err(listing_error(&response));
        }

        let body: Value = response.json()?;
        let tokens = normalize_tokens(&body);
        info!(%sort, count = tokens.len(), "Fetched token listing");
        Ok(tokens)
    }

    /// Raw `/tokens/{mint}` payload
    ///
    /// # Errors
    /// [`ServiceError::NotFound`] for unknown mints, plus the listing errors
    pub async fn token_info(&self, mint: &str) -> ServiceResult<TokenInfo> {
        let response = self.fetch_token(mint).await?;
        if !response.is_success() {
            return Err(token_error(&response));
        }
        response.json()
    }

    /// Detailed view of one token
    ///
    /// # Errors
    /// Same as [`Self::token_info`]
    pub async fn token_details(&self, mint: &str) -> ServiceResult<DetailedToken> {
        let info = self.token_info(mint).await?;
        Ok(detailed_token(info, mint))
    }

    /// Search tokens by name, symbol or mint
    ///
    /// A mint address is looked up directly. Anything else is matched against
    /// the trending listing, keeping at most twenty hits.
    ///
    /// # Errors
    /// [`ServiceError::InvalidRequest`] for one-character queries,
    /// [`ServiceError::NotFound`] for unknown mints, plus the listing errors
    pub async fn search(&self, query: &str) -> ServiceResult<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchResult::Matches(Vec::new()));
        }
        if query.chars().count() < MIN_SEARCH_QUERY_LEN {
            return Err(ServiceError::InvalidRequest(format!(
                "Search query must be at least {MIN_SEARCH_QUERY_LEN} characters long"
            )));
        }

        if is_mint_address(query) {
            let response = self.fetch_token(query).await?;
            if response.is_success() {
                let info: TokenInfo = response.json()?;
                debug!(mint = query, "Resolved search by mint");
                return Ok(SearchResult::Token(Box::new(detailed_token(info, query))));
            }
            if response.status == 404 {
                return Err(ServiceError::NotFound(TOKEN_NOT_FOUND_MESSAGE.to_string()));
            }
            warn!(
                mint = query,
                status = response.status,
                "Mint lookup failed, searching trending tokens instead"
            );
        }

        let matches: Vec<_> = self
            .list_tokens(TokenSort::Trending)
            .await?
            .into_iter()
            .filter(|t| matches_query(t, query))
            .take(MAX_SEARCH_RESULTS)
            .collect();
        debug!(query, count = matches.len(), "Search finished");
        Ok(SearchResult::Matches(matches))
    }

    async fn fetch_token(&self, mint: &str) -> ServiceResult<ApiResponse> {
        if !is_mint_address(mint) {
            return Err(ServiceError::InvalidRequest(format!(
                "'{mint}' is not a token address"
            )));
        }
        self.client.get(&format!("/tokens/{mint}"), &[]).await
    }
}

/// 401, 429 and 5xx get fixed messages; the rest report the status line
fn listing_error(response: &ApiResponse) -> ServiceError {
    match response.status {
        401 => ServiceError::AuthenticationFailed(AUTH_REQUIRED_MESSAGE.to_string()),
        429 => ServiceError::RateLimited(RATE_LIMITED_MESSAGE.to_string()),
        s if s >= 500 => ServiceError::ServerError(SERVER_ERROR_MESSAGE.to_string()),
        status => ServiceError::Remote {
            status,
            message: response.status_line(),
        },
    }
}

fn token_error(response: &ApiResponse) -> ServiceError {
    if response.status == 404 {
        ServiceError::NotFound(TOKEN_NOT_FOUND_MESSAGE.to_string())
    } else {
        listing_error(response)
    }
}

//! Pinboard v1 API client
//!
//! Only the three methods the workflow needs: `posts/update` (cheap change
//! marker), `posts/all` (every bookmark with its tags) and `posts/add`.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::error::{PinboardError, PinboardResult};
use super::models::{NewPost, Post, PostsResponse, ResultResponse, UpdateResponse};

const USER_AGENT: &str = concat!("pinboard-tags/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(30);

/// Script Filters run on every keystroke, so an unreachable host must fail fast
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the tag cache gets its data from
pub trait BookmarkSource {
    /// Remote change marker; changes whenever any bookmark changes
    fn last_update(&self) -> PinboardResult<String>;

    /// Every bookmark of the account
    fn all_posts(&self) -> PinboardResult<Vec<Post>>;
}

/// Blocking HTTP client for the Pinboard API
pub struct PinboardClient {
    http: Client,
    base: Url,
    token: Option<String>,
}

impl PinboardClient {
    /// Create a client. A missing token only fails once a request is made.
    pub fn new(api_base: &str, token: Option<&str>) -> PinboardResult<Self> {
        let base = if api_base.ends_with('/') {
            Url::parse(api_base)?
        } else {
            Url::parse(&format!("{}/", api_base))?
        };

        let http = Client::builder()
            .timeout(TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base,
            token: token.map(str::to_string),
        })
    }

    /// Build the URL for an API method
    pub fn endpoint(&self, method: &str, params: &[(&str, &str)]) -> PinboardResult<Url> {
        let token = self.token.as_deref().ok_or(PinboardError::MissingToken)?;

        let mut url = self.base.join(method)?;
        url.query_pairs_mut()
            .append_pair("auth_token", token)
            .extend_pairs(params.iter().copied());

        Ok(url)
    }

    fn get(&self, method: &str, params: &[(&str, &str)]) -> PinboardResult<String> {
        let url = self.endpoint(method, params)?;
        debug!(method, "Calling Pinboard");

        // Strip the URL from transport errors, it carries the token
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| PinboardError::Http(e.without_url()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(PinboardError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => Err(PinboardError::RateLimited),
            status if !status.is_success() => Err(PinboardError::Status {
                status: status.as_u16(),
            }),
            _ => response
                .text()
                .map_err(|e| PinboardError::Http(e.without_url())),
        }
    }

    /// Add (or replace) a bookmark
    pub fn add_post(&self, post: &NewPost) -> PinboardResult<()> {
        let params = post.params();
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let body = self.get("posts/add", &params)?;
        parse_result(&body)?;

        info!(url = %post.url, "Bookmark added");
        Ok(())
    }
}

impl BookmarkSource for PinboardClient {
    fn last_update(&self) -> PinboardResult<String> {
        let body = self.get("posts/update", &[])?;
        parse_update(&body)
    }

    fn all_posts(&self) -> PinboardResult<Vec<Post>> {
        let body = self.get("posts/all", &[])?;
        let posts = parse_posts(&body)?;
        info!(count = posts.len(), "Fetched bookmarks");
        Ok(posts)
    }
}

/// Decode a `posts/update` body into its change marker
pub fn parse_update(body: &str) -> PinboardResult<String> {
    let response: UpdateResponse = quick_xml::de::from_str(body)?;
    Ok(response.time)
}

/// Decode a `posts/all` body
pub fn parse_posts(body: &str) -> PinboardResult<Vec<Post>> {
    let response: PostsResponse = quick_xml::de::from_str(body)?;
    Ok(response.posts.into_iter().map(Post::from).collect())
}

/// Decode a `<result code="..."/>` body
pub fn parse_result(body: &str) -> PinboardResult<()> {
    let response: ResultResponse = quick_xml::de::from_str(body)?;
    response.into_result()
}

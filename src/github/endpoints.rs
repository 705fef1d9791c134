// Gist API endpoint functions.
// Typed methods for the metadata, raw content, listing, and mutation endpoints.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::config::Credentials;
use crate::error::Result;

use super::client::GistClient;
use super::decode::{listing_payloads, single_payload};
use super::transport::ApiResponse;
use super::types::{
    Comment, CommentRequest, CreateRequest, GistFilter, Payload, UpdateRequest,
};

/// Percent-encode one path segment of an API endpoint.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

impl GistClient {
    /// Get the metadata payload of one gist.
    pub async fn fetch_metadata(&self, id: &str, credentials: Option<Credentials>) -> Result<Payload> {
        let response = self
            .get(&format!("/gists/{}", segment(id)), credentials)
            .await?;
        let body: Value = serde_json::from_str(&response.body)?;
        single_payload(body)
    }

    /// Get the raw content of one file.
    ///
    /// Content must be UTF-8; binary files fail instead of being mangled.
    pub async fn fetch_raw(&self, url: &str, credentials: Option<Credentials>) -> Result<String> {
        let response = self.get_url(url, credentials).await?;
        Ok(response.body)
    }

    /// Get the public gist payloads of a user (first page only).
    pub async fn list_user_gists(&self, user: &str, credentials: Option<Credentials>) -> Result<Vec<Payload>> {
        let response = self
            .get(&format!("/users/{}/gists", segment(user)), credentials)
            .await?;
        let body: Value = serde_json::from_str(&response.body)?;
        listing_payloads(body)
    }

    /// Get the comments of a gist.
    pub async fn list_comments(&self, id: &str, credentials: Option<Credentials>) -> Result<Vec<Comment>> {
        let response = self
            .get(&format!("/gists/{}/comments", segment(id)), credentials)
            .await?;
        let body: Value = serde_json::from_str(&response.body)?;
        listing_payloads(body)?
            .iter()
            .map(Comment::from_payload)
            .collect()
    }

    /// Authenticated listing for a filter. Status is not interpreted.
    pub async fn list_gists(
        &self,
        filter: &GistFilter,
        credentials: Option<Credentials>,
    ) -> Result<ApiResponse> {
        self.send(Method::GET, &filter.endpoint(), None, credentials)
            .await
    }

    /// PATCH a gist's description and files.
    pub async fn update_gist(
        &self,
        id: &str,
        request: &UpdateRequest,
        credentials: Option<Credentials>,
    ) -> Result<ApiResponse> {
        self.send_json(Method::PATCH, &format!("/gists/{}", segment(id)), request, credentials)
            .await
    }

    /// Create a gist; 201 on success.
    pub async fn create_gist(
        &self,
        request: &CreateRequest,
        credentials: Option<Credentials>,
    ) -> Result<ApiResponse> {
        self.send_json(Method::POST, "/gists", request, credentials)
            .await
    }

    /// Delete a gist; 204 on success.
    pub async fn delete_gist(&self, id: &str, credentials: Option<Credentials>) -> Result<ApiResponse> {
        self.send(Method::DELETE, &format!("/gists/{}", segment(id)), None, credentials)
            .await
    }

    /// Star a gist; 204 on success.
    pub async fn star_gist(&self, id: &str, credentials: Option<Credentials>) -> Result<ApiResponse> {
        self.send(Method::PUT, &format!("/gists/{}/star", segment(id)), None, credentials)
            .await
    }

    /// Unstar a gist; 204 on success.
    pub async fn unstar_gist(&self, id: &str, credentials: Option<Credentials>) -> Result<ApiResponse> {
        self.send(Method::DELETE, &format!("/gists/{}/star", segment(id)), None, credentials)
            .await
    }

    /// 204 when starred, 404 when not.
    pub async fn check_star(&self, id: &str, credentials: Option<Credentials>) -> Result<ApiResponse> {
        self.send(Method::GET, &format!("/gists/{}/star", segment(id)), None, credentials)
            .await
    }

    /// Fork a gist; 201 with the new gist on success.
    pub async fn fork_gist(&self, id: &str, credentials: Option<Credentials>) -> Result<ApiResponse> {
        self.send(Method::POST, &format!("/gists/{}/forks", segment(id)), None, credentials)
            .await
    }

    /// Post a comment; 201 with the comment on success.
    pub async fn create_comment(
        &self,
        id: &str,
        body: &str,
        credentials: Option<Credentials>,
    ) -> Result<ApiResponse> {
        let request = CommentRequest {
            body: body.to_string(),
        };
        self.send_json(
            Method::POST,
            &format!("/gists/{}/comments", segment(id)),
            &request,
            credentials,
        )
        .await
    }

    /// Replace a comment's body; 200 with the comment on success.
    pub async fn edit_comment(
        &self,
        id: &str,
        comment_id: &str,
        body: &str,
        credentials: Option<Credentials>,
    ) -> Result<ApiResponse> {
        let request = CommentRequest {
            body: body.to_string(),
        };
        self.send_json(
            Method::PATCH,
            &format!("/gists/{}/comments/{}", segment(id), segment(comment_id)),
            &request,
            credentials,
        )
        .await
    }

    /// Delete a comment; 204 on success.
    pub async fn delete_comment(
        &self,
        id: &str,
        comment_id: &str,
        credentials: Option<Credentials>,
    ) -> Result<ApiResponse> {
        self.send(
            Method::DELETE,
            &format!("/gists/{}/comments/{}", segment(id), segment(comment_id)),
            None,
            credentials,
        )
        .await
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: &T,
        credentials: Option<Credentials>,
    ) -> Result<ApiResponse> {
        let body = serde_json::to_value(body)?;
        self.send(method, endpoint, Some(body), credentials).await
    }
}

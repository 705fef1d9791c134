// Collection queries and authenticated operations.
// Reads fail loud; server-side writes report failure as false / None / empty.

use serde_json::Value;

use crate::config::Credentials;
use crate::error::Result;
use crate::github::decode::{listing_payloads, single_payload};
use crate::github::{ApiResponse, Comment, CreateRequest, GistClient, GistFilter, Payload};

use super::resource::Gist;

/// Entry point for gist queries, optionally carrying wrapper-level credentials.
#[derive(Debug, Clone)]
pub struct Gists {
    client: GistClient,
    credentials: Option<Credentials>,
}

impl Gists {
    /// Wrapper relying on the client's default credentials.
    pub fn new(client: GistClient) -> Self {
        Self {
            client,
            credentials: None,
        }
    }

    /// Wrapper whose credentials apply to every operation it performs.
    pub fn with_credentials(client: GistClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials: Some(credentials),
        }
    }

    /// Underlying API client.
    pub fn client(&self) -> &GistClient {
        &self.client
    }

    /// A lazily loaded gist that inherits this wrapper's credentials.
    pub fn gist(&self, id: impl Into<String>) -> Gist {
        Gist::new(self.client.clone(), id).with_credentials(self.credentials.clone())
    }

    fn resolved_credentials(&self) -> Option<Credentials> {
        self.client.resolve_credentials(None, self.credentials.as_ref())
    }

    fn to_gists(&self, payloads: Vec<Payload>) -> Result<Vec<Gist>> {
        payloads
            .into_iter()
            .map(|payload| {
                Gist::from_payload(self.client.clone(), payload)
                    .map(|gist| gist.with_credentials(self.credentials.clone()))
            })
            .collect()
    }

    /// Public gists of `user`, in server order. Each result reuses its listing
    /// payload, so reading its metadata costs no further request.
    pub async fn fetch_by_user(&self, user: &str) -> Result<Vec<Gist>> {
        let payloads = self
            .client
            .list_user_gists(user, self.resolved_credentials())
            .await?;
        tracing::debug!(user, count = payloads.len(), "fetched user gists");
        self.to_gists(payloads)
    }

    /// Comments of a gist.
    pub async fn comments(&self, id: &str) -> Result<Vec<Comment>> {
        self.client
            .list_comments(id, self.resolved_credentials())
            .await
    }

    /// Authenticated listing. Empty without credentials or on any failure.
    pub async fn fetch_gists(&self, filter: GistFilter) -> Vec<Gist> {
        let Some(credentials) = self.require_credentials("list gists") else {
            return Vec::new();
        };
        let Some(response) = expect_status(
            "list gists",
            self.client.list_gists(&filter, Some(credentials)).await,
            200,
        ) else {
            return Vec::new();
        };

        let decoded = serde_json::from_str::<Value>(&response.body)
            .map_err(Into::into)
            .and_then(|body| match filter {
                GistFilter::Id(_) => single_payload(body).map(|p| vec![p]),
                _ => listing_payloads(body),
            })
            .and_then(|payloads| self.to_gists(payloads));

        decoded.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "gist listing could not be decoded");
            Vec::new()
        })
    }

    /// Create a gist. `None` on failure.
    pub async fn create(&self, request: &CreateRequest) -> Option<Gist> {
        let credentials = self.require_credentials("create gist")?;
        let response = expect_status(
            "create gist",
            self.client.create_gist(request, Some(credentials)).await,
            201,
        )?;
        let gist = self.decode_gist("create gist", &response)?;
        tracing::info!(gist = %gist.id(), "created gist");
        Some(gist)
    }

    /// Delete a gist. `false` on failure.
    pub async fn delete(&self, id: &str) -> bool {
        let Some(credentials) = self.require_credentials("delete gist") else {
            return false;
        };
        let deleted = expect_status(
            "delete gist",
            self.client.delete_gist(id, Some(credentials)).await,
            204,
        )
        .is_some();
        if deleted {
            tracing::info!(gist = %id, "deleted gist");
        }
        deleted
    }

    /// Star a gist. `false` on failure.
    pub async fn star(&self, id: &str) -> bool {
        let Some(credentials) = self.require_credentials("star gist") else {
            return false;
        };
        expect_status(
            "star gist",
            self.client.star_gist(id, Some(credentials)).await,
            204,
        )
        .is_some()
    }

    /// Unstar a gist. `false` on failure.
    pub async fn unstar(&self, id: &str) -> bool {
        let Some(credentials) = self.require_credentials("unstar gist") else {
            return false;
        };
        expect_status(
            "unstar gist",
            self.client.unstar_gist(id, Some(credentials)).await,
            204,
        )
        .is_some()
    }

    /// Whether the authenticated user starred `id`. `false` also covers failures.
    pub async fn is_starred(&self, id: &str) -> bool {
        let Some(credentials) = self.require_credentials("check star") else {
            return false;
        };
        match self.client.check_star(id, Some(credentials)).await {
            Ok(response) => response.status == 204,
            Err(e) => {
                tracing::warn!(error = %e, "check star failed");
                false
            }
        }
    }

    /// Fork a gist. `None` on failure.
    pub async fn fork(&self, id: &str) -> Option<Gist> {
        let credentials = self.require_credentials("fork gist")?;
        let response = expect_status(
            "fork gist",
            self.client.fork_gist(id, Some(credentials)).await,
            201,
        )?;
        self.decode_gist("fork gist", &response)
    }

    /// Comment on a gist. `None` on failure.
    pub async fn create_comment(&self, id: &str, body: &str) -> Option<Comment> {
        let credentials = self.require_credentials("create comment")?;
        let response = expect_status(
            "create comment",
            self.client.create_comment(id, body, Some(credentials)).await,
            201,
        )?;
        decode_comment("create comment", &response)
    }

    /// Replace a comment's body. `None` on failure.
    pub async fn edit_comment(&self, id: &str, comment_id: &str, body: &str) -> Option<Comment> {
        let credentials = self.require_credentials("edit comment")?;
        let response = expect_status(
            "edit comment",
            self.client
                .edit_comment(id, comment_id, body, Some(credentials))
                .await,
            200,
        )?;
        decode_comment("edit comment", &response)
    }

    /// Delete a comment. `false` on failure.
    pub async fn delete_comment(&self, id: &str, comment_id: &str) -> bool {
        let Some(credentials) = self.require_credentials("delete comment") else {
            return false;
        };
        expect_status(
            "delete comment",
            self.client
                .delete_comment(id, comment_id, Some(credentials))
                .await,
            204,
        )
        .is_some()
    }

    fn require_credentials(&self, operation: &str) -> Option<Credentials> {
        let credentials = self.resolved_credentials();
        if credentials.is_none() {
            tracing::warn!(operation, "no credentials configured, skipping");
        }
        credentials
    }

    fn decode_gist(&self, operation: &str, response: &ApiResponse) -> Option<Gist> {
        let gist = serde_json::from_str::<Value>(&response.body)
            .map_err(Into::into)
            .and_then(single_payload)
            .and_then(|payload| Gist::from_payload(self.client.clone(), payload));
        match gist {
            Ok(gist) => Some(gist.with_credentials(self.credentials.clone())),
            Err(e) => {
                tracing::warn!(operation, error = %e, "response could not be decoded");
                None
            }
        }
    }
}

/// Keep the response only if it carries the expected status.
fn expect_status(operation: &str, response: Result<ApiResponse>, expected: u16) -> Option<ApiResponse> {
    match response {
        Ok(response) if response.status == expected => Some(response),
        Ok(response) => {
            tracing::warn!(operation, status = response.status, body = %response.body, "request rejected");
            None
        }
        Err(e) => {
            tracing::warn!(operation, error = %e, "request failed");
            None
        }
    }
}

fn decode_comment(operation: &str, response: &ApiResponse) -> Option<Comment> {
    let comment = serde_json::from_str::<Value>(&response.body)
        .map_err(Into::into)
        .and_then(single_payload)
        .and_then(|payload| Comment::from_payload(&payload));
    match comment {
        Ok(comment) => Some(comment),
        Err(e) => {
            tracing::warn!(operation, error = %e, "response could not be decoded");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubTransport;
    use reqwest::Method;

    const LISTING: &str = r#"[
        {"id": "one", "description": "first", "public": true, "files": {"a.txt": {}}},
        {"id": "two", "description": "My .bashrc configuration", "public": true, "files": {}}
    ]"#;

    fn authed(stub: StubTransport) -> (std::sync::Arc<StubTransport>, Gists) {
        let (stub, client) = stub.shared();
        (stub, Gists::with_credentials(client, Credentials::new("alice", "secret")))
    }

    #[tokio::test]
    async fn test_fetch_by_user_uses_listing_payloads() {
        let (stub, client) = StubTransport::new()
            .with(Method::GET, "http://api.test/users/alice/gists", 200, LISTING)
            .shared();
        let gists = Gists::new(client).fetch_by_user("alice").await.unwrap();

        assert_eq!(gists.len(), 2);
        assert_eq!(gists[0].id(), "one");
        assert_eq!(
            gists[1].description().await.unwrap().as_deref(),
            Some("My .bashrc configuration")
        );
        assert_eq!(stub.total_calls(), 1);
    }

    #[tokio::test]
    async fn test_reads_carry_wrapper_credentials() {
        let (stub, gists) = authed(
            StubTransport::new()
                .with(Method::GET, "http://api.test/users/alice/gists", 200, LISTING)
                .with(Method::GET, "http://api.test/gists/one/comments", 200, "[]")
                .with(Method::GET, "http://gist.test/one/raw/a.txt", 200, "alpha"),
        );
        let expected = Some(Credentials::new("alice", "secret"));

        let listed = gists.fetch_by_user("alice").await.unwrap();
        assert_eq!(stub.last_request().unwrap().credentials, expected);

        assert!(gists.comments("one").await.unwrap().is_empty());
        assert_eq!(stub.last_request().unwrap().credentials, expected);

        assert_eq!(listed[0].file("a.txt").await.unwrap().as_deref(), Some("alpha"));
        let raw = stub.last_request().unwrap();
        assert_eq!(raw.url, "http://gist.test/one/raw/a.txt");
        assert_eq!(raw.credentials, expected);
    }

    #[tokio::test]
    async fn test_fetch_by_user_empty_is_not_an_error() {
        let client = StubTransport::new()
            .with(Method::GET, "http://api.test/users/alice/gists", 200, "[]")
            .client();
        let gists = Gists::new(client).fetch_by_user("alice").await.unwrap();
        assert!(gists.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_by_user_fails_loud() {
        let client = StubTransport::new().client();
        assert!(Gists::new(client).fetch_by_user("ghost").await.is_err());
    }

    #[tokio::test]
    async fn test_authenticated_ops_without_credentials_are_quiet() {
        let (stub, client) = StubTransport::new().shared();
        let gists = Gists::new(client);

        assert!(gists.fetch_gists(GistFilter::Starred).await.is_empty());
        assert!(!gists.star("abc").await);
        assert!(!gists.delete("abc").await);
        assert!(gists.fork("abc").await.is_none());
        assert!(gists.create_comment("abc", "hi").await.is_none());
        assert_eq!(stub.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_gists_filters() {
        let (_stub, gists) = authed(
            StubTransport::new()
                .with(Method::GET, "http://api.test/gists/starred", 200, LISTING)
                .with(
                    Method::GET,
                    "http://api.test/gists/one",
                    200,
                    r#"{"id": "one", "public": true}"#,
                ),
        );

        let starred = gists.fetch_gists(GistFilter::Starred).await;
        assert_eq!(starred.iter().map(Gist::id).collect::<Vec<_>>(), vec!["one", "two"]);

        let single = gists.fetch_gists(GistFilter::Id("one".into())).await;
        assert_eq!(single.len(), 1);

        assert!(gists.fetch_gists(GistFilter::Public).await.is_empty());
    }

    #[tokio::test]
    async fn test_star_family_expects_204() {
        let (stub, gists) = authed(
            StubTransport::new()
                .with(Method::PUT, "http://api.test/gists/abc/star", 204, "")
                .with(Method::DELETE, "http://api.test/gists/abc/star", 204, "")
                .with(Method::GET, "http://api.test/gists/abc/star", 204, ""),
        );

        assert!(gists.star("abc").await);
        assert!(gists.unstar("abc").await);
        assert!(gists.is_starred("abc").await);
        assert!(!gists.is_starred("other").await);

        stub.route(Method::PUT, "http://api.test/gists/abc/star", 200, "");
        assert!(!gists.star("abc").await);
    }

    #[tokio::test]
    async fn test_create_and_fork_decode_gists() {
        let (stub, gists) = authed(
            StubTransport::new()
                .with(
                    Method::POST,
                    "http://api.test/gists",
                    201,
                    r#"{"id": "new1", "description": "demo", "public": false, "files": {"x.txt": {}}}"#,
                )
                .with(
                    Method::POST,
                    "http://api.test/gists/abc/forks",
                    201,
                    r#"{"id": "fork1", "public": true}"#,
                ),
        );

        let request = CreateRequest::new(false).description("demo").file("x.txt", "hi");
        let created = gists.create(&request).await.unwrap();
        assert_eq!(created.id(), "new1");
        assert_eq!(created.file_names().await.unwrap(), vec!["x.txt"]);

        let sent = stub.requests()[0].body.clone().unwrap();
        assert_eq!(sent["files"]["x.txt"]["content"], "hi");

        let fork = gists.fork("abc").await.unwrap();
        assert_eq!(fork.id(), "fork1");
        assert_eq!(stub.total_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_writes_return_sentinels() {
        let (stub, gists) = authed(
            StubTransport::new()
                .with(Method::POST, "http://api.test/gists", 422, "Validation Failed")
                .with(Method::DELETE, "http://api.test/gists/abc", 404, "Not Found"),
        );
        stub.fail(Method::POST, "http://api.test/gists/abc/forks");

        assert!(gists.create(&CreateRequest::new(true)).await.is_none());
        assert!(!gists.delete("abc").await);
        assert!(gists.fork("abc").await.is_none());
    }

    #[tokio::test]
    async fn test_comment_operations() {
        let (_stub, gists) = authed(
            StubTransport::new()
                .with(
                    Method::POST,
                    "http://api.test/gists/abc/comments",
                    201,
                    r#"{"id": 7, "body": "hi", "user": {"login": "alice"}}"#,
                )
                .with(
                    Method::PATCH,
                    "http://api.test/gists/abc/comments/7",
                    200,
                    r#"{"id": 7, "body": "edited", "user": {"login": "alice"}}"#,
                )
                .with(Method::DELETE, "http://api.test/gists/abc/comments/7", 204, ""),
        );

        let created = gists.create_comment("abc", "hi").await.unwrap();
        assert_eq!(created.id.as_deref(), Some("7"));

        let edited = gists.edit_comment("abc", "7", "edited").await.unwrap();
        assert_eq!(edited.body.as_deref(), Some("edited"));

        assert!(gists.delete_comment("abc", "7").await);
        assert!(!gists.delete_comment("abc", "8").await);
    }

    #[tokio::test]
    async fn test_gist_inherits_wrapper_credentials() {
        let (stub, gists) = authed(
            StubTransport::new().with(Method::PATCH, "http://api.test/gists/abc", 200, "{}"),
        );
        stub.route(
            Method::GET,
            "http://api.test/gists/abc",
            200,
            r#"{"id": "abc", "public": true}"#,
        );

        let mut gist = gists.gist("abc");
        assert!(gist.save().await.unwrap().is_ok());

        let patch = stub
            .requests()
            .into_iter()
            .find(|r| r.method == Method::PATCH)
            .unwrap();
        assert_eq!(patch.credentials, Some(Credentials::new("alice", "secret")));
    }
}

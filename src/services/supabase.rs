use crate::models::{AuthUser, Group, GroupMember, NewWishlistItem, Profile, WishlistItem};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Postgres error code for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

const MEMBER_SELECT: &str = "*,profiles:user_id(id,full_name,is_child)";

/// Errors that can occur when interacting with the hosted backend
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    ApiError {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl SupabaseError {
    /// True when the backend rejected a write because the row already exists
    pub fn is_duplicate(&self) -> bool {
        match self {
            SupabaseError::ApiError { code, message, .. } => {
                code.as_deref() == Some(UNIQUE_VIOLATION) || message.contains("duplicate")
            }
            _ => false,
        }
    }
}

/// Table names in the hosted database
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub groups: String,
    pub group_members: String,
    pub profiles: String,
    pub wishlist_items: String,
}

impl Default for SupabaseTables {
    fn default() -> Self {
        Self {
            groups: "groups".to_string(),
            group_members: "group_members".to_string(),
            profiles: "profiles".to_string(),
            wishlist_items: "wishlist_items".to_string(),
        }
    }
}

/// Client for the hosted table and auth APIs
///
/// Table access goes through the PostgREST dialect (`/rest/v1/{table}` with
/// `column=eq.value` filters) using the service key. Session lookups go to
/// `/auth/v1/user` with the caller's own token.
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: Client,
    tables: SupabaseTables,
}

impl SupabaseClient {
    /// Create a new client
    pub fn new(
        base_url: String,
        api_key: String,
        tables: SupabaseTables,
        timeout: Duration,
    ) -> Result<Self, SupabaseError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            tables,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str, params: &[(&str, String)]) -> String {
        let url = format!("{}/rest/v1/{}", self.base_url, table);
        if params.is_empty() {
            return url;
        }

        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{}", url, query)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Turn non-success responses into typed errors
    async fn check(response: Response) -> Result<Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(SupabaseError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed: Option<Value> = serde_json::from_str(&body).ok();
        let code = parsed
            .as_ref()
            .and_then(|v| v.get("code"))
            .and_then(|c| c.as_str())
            .map(str::to_string);
        let message = parsed
            .as_ref()
            .and_then(|v| v.get("message").or_else(|| v.get("msg")))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or(body);

        Err(SupabaseError::ApiError {
            status: status.as_u16(),
            code,
            message,
        })
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.table_url(table, params);
        tracing::debug!("Selecting from: {}", url);

        let response = self.request(Method::GET, &url).send().await?;
        let response = Self::check(response).await?;

        let json: Value = response.json().await?;
        serde_json::from_value(json)
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse {} rows: {}", table, e)))
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
        what: &str,
    ) -> Result<T, SupabaseError> {
        let mut params = params.to_vec();
        params.push(("limit", "1".to_string()));

        self.select(table, &params)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SupabaseError::NotFound(what.to_string()))
    }

    async fn insert<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> Result<T, SupabaseError> {
        let url = self.table_url(table, &[]);

        let response = self
            .request(Method::POST, &url)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let json: Value = response.json().await?;
        // PostgREST returns the inserted rows as an array
        let row = match json {
            Value::Array(rows) => rows.into_iter().next().ok_or_else(|| {
                SupabaseError::InvalidResponse(format!("Insert into {} returned no rows", table))
            })?,
            other => other,
        };

        serde_json::from_value(row)
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse inserted {} row: {}", table, e)))
    }

    async fn update<B: Serialize>(
        &self,
        table: &str,
        params: &[(&str, String)],
        body: &B,
    ) -> Result<(), SupabaseError> {
        let url = self.table_url(table, params);

        let response = self
            .request(Method::PATCH, &url)
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await?;
        Self::check(response).await?;

        Ok(())
    }

    async fn delete(&self, table: &str, params: &[(&str, String)]) -> Result<(), SupabaseError> {
        let url = self.table_url(table, params);

        let response = self.request(Method::DELETE, &url).send().await?;
        Self::check(response).await?;

        Ok(())
    }

    /// Fetch a group by id
    pub async fn get_group(&self, group_id: &str) -> Result<Group, SupabaseError> {
        self.select_one(
            &self.tables.groups,
            &[("select", "*".to_string()), ("id", eq(group_id))],
            &format!("group {}", group_id),
        )
        .await
    }

    /// Groups the user belongs to, newest first
    pub async fn list_groups_for_user(&self, user_id: &str) -> Result<Vec<Group>, SupabaseError> {
        let memberships: Vec<Value> = self
            .select(
                &self.tables.group_members,
                &[("select", "group_id".to_string()), ("user_id", eq(user_id))],
            )
            .await?;

        let group_ids: Vec<&str> = memberships
            .iter()
            .filter_map(|m| m.get("group_id").and_then(|g| g.as_str()))
            .collect();

        if group_ids.is_empty() {
            return Ok(vec![]);
        }

        let id_list = group_ids
            .iter()
            .map(|id| format!("\"{}\"", id))
            .collect::<Vec<_>>()
            .join(",");

        self.select(
            &self.tables.groups,
            &[
                ("select", "*".to_string()),
                ("id", format!("in.({})", id_list)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    /// Insert a group owned by `created_by`
    pub async fn create_group(
        &self,
        name: &str,
        description: Option<&str>,
        created_by: &str,
    ) -> Result<Group, SupabaseError> {
        let body = json!({
            "name": name,
            "description": description,
            "created_by": created_by,
        });

        let group: Group = self.insert(&self.tables.groups, &body).await?;
        tracing::debug!("Created group {} for {}", group.id, created_by);

        Ok(group)
    }

    /// All memberships of a group joined with their profiles
    pub async fn list_group_members(&self, group_id: &str) -> Result<Vec<GroupMember>, SupabaseError> {
        self.select(
            &self.tables.group_members,
            &[("select", MEMBER_SELECT.to_string()), ("group_id", eq(group_id))],
        )
        .await
    }

    /// Membership row of a user in a group, if any
    pub async fn get_membership(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Option<GroupMember>, SupabaseError> {
        let rows: Vec<GroupMember> = self
            .select(
                &self.tables.group_members,
                &[
                    ("select", MEMBER_SELECT.to_string()),
                    ("group_id", eq(group_id)),
                    ("user_id", eq(user_id)),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().next())
    }

    pub async fn add_group_member(&self, group_id: &str, user_id: &str) -> Result<GroupMember, SupabaseError> {
        let body = json!({ "group_id": group_id, "user_id": user_id });
        self.insert(&self.tables.group_members, &body).await
    }

    pub async fn insert_profile(&self, profile: &Profile) -> Result<Profile, SupabaseError> {
        self.insert(&self.tables.profiles, profile).await
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, SupabaseError> {
        self.select_one(
            &self.tables.profiles,
            &[("select", "id,full_name,is_child".to_string()), ("id", eq(user_id))],
            &format!("profile {}", user_id),
        )
        .await
    }

    /// Write the receiver for one membership row
    pub async fn update_member_assignment(
        &self,
        membership_id: &str,
        receiver_id: &str,
    ) -> Result<(), SupabaseError> {
        self.update(
            &self.tables.group_members,
            &[("id", eq(membership_id))],
            &json!({ "assigned_to": receiver_id }),
        )
        .await
    }

    pub async fn mark_assignment_completed(&self, group_id: &str) -> Result<(), SupabaseError> {
        self.update(
            &self.tables.groups,
            &[("id", eq(group_id))],
            &json!({ "assignment_completed": true }),
        )
        .await
    }

    /// A member's wishlist in a group, newest first
    pub async fn list_wishlist_items(
        &self,
        group_id: &str,
        user_id: &str,
    ) -> Result<Vec<WishlistItem>, SupabaseError> {
        self.select(
            &self.tables.wishlist_items,
            &[
                ("select", "*".to_string()),
                ("group_id", eq(group_id)),
                ("user_id", eq(user_id)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    pub async fn get_wishlist_item(&self, item_id: &str) -> Result<WishlistItem, SupabaseError> {
        self.select_one(
            &self.tables.wishlist_items,
            &[("select", "*".to_string()), ("id", eq(item_id))],
            &format!("wishlist item {}", item_id),
        )
        .await
    }

    pub async fn insert_wishlist_item(&self, item: &NewWishlistItem) -> Result<WishlistItem, SupabaseError> {
        self.insert(&self.tables.wishlist_items, item).await
    }

    pub async fn delete_wishlist_item(&self, item_id: &str) -> Result<(), SupabaseError> {
        self.delete(&self.tables.wishlist_items, &[("id", eq(item_id))]).await
    }

    pub async fn set_item_purchased(&self, item_id: &str, purchased: bool) -> Result<(), SupabaseError> {
        self.update(
            &self.tables.wishlist_items,
            &[("id", eq(item_id))],
            &json!({ "purchased": purchased }),
        )
        .await
    }

    /// Resolve a session token to its user through the auth API
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        let url = format!("{}/auth/v1/user", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;
        let response = Self::check(response).await?;

        response
            .json::<AuthUser>()
            .await
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse user: {}", e)))
    }

    /// Health check against the auth service
    pub async fn health_check(&self) -> Result<bool, SupabaseError> {
        let url = format!("{}/auth/v1/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

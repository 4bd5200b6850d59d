//! `/api/users` handlers. Each one delegates to `UserService` and wraps the
//! result in the `ApiResult` envelope.

use axum::extract::{Path, Query, State};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use tracing::debug;

use service::pagination::{Page, PageRequest, DEFAULT_DIRECTION, DEFAULT_PAGE, DEFAULT_SIZE, DEFAULT_SORT};
use service::user::domain::{ChangePasswordInput, LoginInput, RegisterInput, UpdateUserInput};
use service::user::User;

use crate::errors::ApiError;
use crate::extract::ValidatedJson;
use crate::metrics::track;
use crate::response::ApiResult;
use crate::state::ServerState;

type ApiResponse<T> = Result<ApiResult<T>, ApiError>;
type UserId = WithRejection<Path<i32>, ApiError>;

/// Paging query shared by list and search.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl PageQuery {
    fn into_request(self) -> Result<PageRequest, ApiError> {
        Ok(PageRequest::parse(
            self.page.unwrap_or(DEFAULT_PAGE),
            self.size.unwrap_or(DEFAULT_SIZE),
            self.sort.as_deref().unwrap_or(DEFAULT_SORT),
            self.direction.as_deref().unwrap_or(DEFAULT_DIRECTION),
        )?)
    }
}

// Spelled out instead of `#[serde(flatten)]`: urlencoded numbers don't survive flattening.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub keyword: String,
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: String,
}

pub async fn register(
    State(state): State<ServerState>,
    ValidatedJson(input): ValidatedJson<RegisterInput>,
) -> ApiResponse<User> {
    let user = track("register", state.users.register(input)).await?;
    Ok(ApiResult::success("register success", user))
}

pub async fn login(
    State(state): State<ServerState>,
    ValidatedJson(input): ValidatedJson<LoginInput>,
) -> ApiResponse<User> {
    let user = track("login", state.users.login(input)).await?;
    Ok(ApiResult::success("login success", user))
}

pub async fn get_user(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): UserId,
) -> ApiResponse<User> {
    let user = track("get_user", state.users.get_user(id)).await?;
    Ok(ApiResult::success("success", user))
}

pub async fn update_user(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): UserId,
    ValidatedJson(input): ValidatedJson<UpdateUserInput>,
) -> ApiResponse<User> {
    let user = track("update_user", state.users.update_user(id, input)).await?;
    Ok(ApiResult::success("update success", user))
}

/// `oldPassword` and `newPassword` arrive as query parameters.
pub async fn update_password(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): UserId,
    WithRejection(Query(input), _): WithRejection<Query<ChangePasswordInput>, ApiError>,
) -> ApiResponse<()> {
    track("update_password", state.users.update_password(id, input)).await?;
    Ok(ApiResult::success("password changed", ()))
}

pub async fn delete_user(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): UserId,
) -> ApiResponse<()> {
    track("delete_user", state.users.delete_user(id)).await?;
    Ok(ApiResult::success("account deleted", ()))
}

pub async fn check_username(
    State(state): State<ServerState>,
    WithRejection(Query(q), _): WithRejection<Query<UsernameQuery>, ApiError>,
) -> ApiResponse<bool> {
    let available = track("check_username", state.users.check_username_available(&q.username)).await?;
    debug!(username = %q.username, available, "username checked");
    Ok(ApiResult::success("success", available))
}

pub async fn list_users(
    State(state): State<ServerState>,
    WithRejection(Query(q), _): WithRejection<Query<PageQuery>, ApiError>,
) -> ApiResponse<Page<User>> {
    let req = q.into_request()?;
    let page = track("list_users", state.users.list_users(req)).await?;
    Ok(ApiResult::success("query success", page))
}

pub async fn search_users(
    State(state): State<ServerState>,
    WithRejection(Query(q), _): WithRejection<Query<SearchQuery>, ApiError>,
) -> ApiResponse<Page<User>> {
    let paging = PageQuery { page: q.page, size: q.size, sort: q.sort, direction: q.direction };
    let req = paging.into_request()?;
    let page = track("search_users", state.users.search_users(&q.keyword, req)).await?;
    Ok(ApiResult::success("search success", page))
}

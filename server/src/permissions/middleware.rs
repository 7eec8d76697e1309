//! Permission middleware.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use bo_common::{Permission, PermissionMode};

use crate::auth::{AuthError, CurrentUser};
use crate::error::AppError;

/// Middleware factory requiring permission codes on a route.
///
/// Must run inside `require_auth`. Requests from users lacking the codes get
/// `403 Forbidden` with the missing codes in the body.
///
/// # Usage
///
/// ```ignore
/// Router::new().route(
///     "/roles/{id}/deactivate",
///     post(handler).layer(from_fn(require_permissions([Permission::RoleDeactivate], PermissionMode::All))),
/// )
/// ```
pub fn require_permissions<I, S>(
    required: I,
    mode: PermissionMode,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>>
       + Clone
       + Send
       + 'static
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let required: Arc<[String]> = required
        .into_iter()
        .map(|code| code.as_ref().to_string())
        .collect();

    permission_layer(required, mode)
}

fn permission_layer(
    required: Arc<[String]>,
    mode: PermissionMode,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>>
       + Clone
       + Send
       + 'static {
    move |request: Request, next: Next| {
        let required = Arc::clone(&required);
        Box::pin(async move {
            let Some(current) = request.extensions().get::<CurrentUser>() else {
                return AuthError::MissingUser.into_response();
            };

            if let Err(err) = current.require_permissions(&required[..], mode) {
                tracing::info!(
                    user_id = %current.identity.user_id,
                    error = %err,
                    "Permission denied"
                );
                return AppError::Forbidden(err).into_response();
            }

            next.run(request).await
        })
    }
}

/// Middleware factory requiring a single catalog permission.
pub fn require_permission(
    permission: Permission,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>>
       + Clone
       + Send
       + 'static {
    require_permissions([permission], PermissionMode::All)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use bo_common::{GrantedPermission, Identity, PermissionSet, User};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::backend::TokenContext;

    fn current_user(codes: &[&str]) -> CurrentUser {
        let user = User {
            id: Uuid::new_v4(),
            email: Some("pm@example.com".into()),
            display_name: None,
            permissions: codes
                .iter()
                .map(|code| GrantedPermission::new(*code, *code))
                .collect(),
        };

        CurrentUser {
            identity: Identity {
                user_id: user.id,
                employee_id: Uuid::new_v4(),
                auth_session_id: None,
            },
            permissions: PermissionSet::from_user(&user),
            user,
            tokens: TokenContext::default(),
        }
    }

    /// Router guarded by `required`, with `granted` injected as the current user.
    fn guarded(granted: &[&str], required: &[&'static str], mode: PermissionMode) -> Router {
        let current = current_user(granted);
        Router::new()
            .route(
                "/",
                get(|| async { "ok" })
                    .layer(from_fn(require_permissions(required.to_vec(), mode))),
            )
            .layer(from_fn(move |mut request: Request, next: Next| {
                request.extensions_mut().insert(current.clone());
                next.run(request)
            }))
    }

    async fn send(router: Router) -> (StatusCode, Value) {
        let response = router
            .oneshot(axum::http::Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_any_mode_passes_with_one_code() {
        let router = guarded(
            &["SPRINT_VIEW"],
            &["SPRINT_VIEW", "SPRINT_MANAGE"],
            PermissionMode::Any,
        );

        let (status, _) = send(router).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_any_mode_rejects_without_codes() {
        let router = guarded(
            &["ROLE_VIEW"],
            &["SPRINT_VIEW", "SPRINT_MANAGE"],
            PermissionMode::Any,
        );

        let (status, body) = send(router).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "FORBIDDEN");
        assert_eq!(body["missing"], json!(["SPRINT_VIEW", "SPRINT_MANAGE"]));
    }

    #[tokio::test]
    async fn test_all_mode_lists_only_missing_codes() {
        let required = ["ROLE_VIEW", "ROLE_ACTIVATE", "ROLE_DEACTIVATE"];

        let (status, body) = send(guarded(
            &["ROLE_VIEW", "ROLE_ACTIVATE"],
            &required,
            PermissionMode::All,
        ))
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["missing"], json!(["ROLE_DEACTIVATE"]));

        let (status, _) = send(guarded(&required, &required, PermissionMode::All)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_current_user_is_unauthenticated() {
        let router = Router::new().route(
            "/",
            get(|| async { "ok" }).layer(from_fn(require_permission(Permission::RoleView))),
        );

        let (status, body) = send(router).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHENTICATED");
    }
}

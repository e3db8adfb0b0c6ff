use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;

use crate::{models::users::User, AppState, Error, Result};

/// The authenticated user for this request, if any. Inserted on every
/// request so handlers can decide for themselves what anonymity means.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

pub async fn attach_user(mut req: Request, next: Next) -> Result<impl IntoResponse> {
    let app_state = req
        .extensions()
        .get::<Arc<AppState>>()
        .cloned()
        .ok_or(Error::InternalServerError)?;

    let cookies = CookieJar::from_headers(req.headers());

    let token = cookies
        .get("token")
        .map(|c| c.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| {
                    auth_value
                        .strip_prefix("Bearer ")
                        .map(|stripped| stripped.to_string())
                })
        });

    let user = match token {
        Some(token) => match app_state.auth_service.decode_token(token) {
            Ok(user_id) => app_state.auth_service.get_user(user_id).await.ok(),
            Err(_) => None,
        },
        None => None,
    };

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// One stable key per visitor: the account for signed-in readers, the
/// client address otherwise. Proxied requests use the first hop of
/// X-Forwarded-For so every visitor behind one proxy is not collapsed
/// into a single reader.
pub fn visitor_key(headers: &HeaderMap, addr: SocketAddr, user: Option<&User>) -> String {
    if let Some(user) = user {
        return format!("user:{}", user.id);
    }

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty());

    match forwarded {
        Some(ip) => format!("ip:{ip}"),
        None => format!("ip:{}", addr.ip()),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn addr() -> SocketAddr {
        "192.168.1.7:4431".parse().unwrap()
    }

    #[test]
    fn signed_in_visitor_keys_on_account() {
        let user = User {
            id: Uuid::now_v7(),
            username: "casey".to_string(),
            email: "casey@example.com".to_string(),
            password: "hash".to_string(),
            created_at: Utc::now(),
        };

        let key = visitor_key(&HeaderMap::new(), addr(), Some(&user));
        assert_eq!(key, format!("user:{}", user.id));
    }

    #[test]
    fn forwarded_header_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.9, 10.0.0.1"),
        );

        let key = visitor_key(&headers, addr(), None);
        assert_eq!(key, "ip:203.0.113.9");
    }

    #[test]
    fn falls_back_to_peer_address() {
        let key = visitor_key(&HeaderMap::new(), addr(), None);
        assert_eq!(key, "ip:192.168.1.7");
    }

    #[test]
    fn empty_forwarded_header_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));

        let key = visitor_key(&headers, addr(), None);
        assert_eq!(key, "ip:192.168.1.7");
    }
}

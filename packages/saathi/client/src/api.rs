use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::{Client, Response, Url};
use saathi_core::reducer::DASHBOARD_ROUTE;
use saathi_core::types::*;
use saathi_core::{AgentKind, AuthError, DispatchError};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const SIGN_IN_REJECTED: &str = "Invalid email or password";

/// Everything the advisory front-end asks of the outside world.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    async fn submit_query(&self, request: &QueryRequest) -> Result<AgentResponse, DispatchError>;

    async fn recommend_crops(
        &self,
        request: &CropRecommendationRequest,
    ) -> Result<Vec<CropRecommendation>, DispatchError>;

    async fn register(&self, request: &RegistrationRequest) -> Result<(), AuthError>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<(), AuthError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CsrfBody {
    #[serde(rename = "csrfToken")]
    csrf_token: String,
}

/// `{url}` answered by the credentials callback; failures carry `?error=`.
#[derive(Debug, Deserialize)]
struct CallbackBody {
    url: Option<String>,
}

/// HTTP client for the advisory backend and the app's auth routes.
///
/// Auth calls go through their own client that keeps cookies (the CSRF
/// cookie must accompany the sign-in post) and never follows redirects.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    auth: Client,
    pub backend_url: String,
    pub app_url: String,
}

impl ApiClient {
    pub fn new(backend_url: String, app_url: String, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let auth = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .redirect(Policy::none())
            .build()?;
        Ok(Self {
            client,
            auth,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            app_url: app_url.trim_end_matches('/').to_string(),
        })
    }

    fn backend(&self, path: &str) -> String {
        format!("{}{}", self.backend_url, path)
    }

    fn app(&self, path: &str) -> String {
        format!("{}{}", self.app_url, path)
    }

    /// `GET /health` on the backend. Any non-success status counts as down.
    pub async fn check_backend(&self) -> Result<(), DispatchError> {
        let resp = self
            .client
            .get(self.backend("/health"))
            .send()
            .await
            .map_err(dispatch_error)?;
        ensure_success(resp).await.map(|_| ())
    }

    async fn csrf_token(&self) -> Result<String, AuthError> {
        let resp = self
            .auth
            .get(self.app("/api/auth/csrf"))
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AuthError::Unavailable(format!(
                "csrf endpoint returned status {}",
                status
            )));
        }

        resp.json::<CsrfBody>()
            .await
            .map(|body| body.csrf_token)
            .map_err(|e| AuthError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl AgentBackend for ApiClient {
    async fn submit_query(&self, request: &QueryRequest) -> Result<AgentResponse, DispatchError> {
        debug!(input_type = request.input_type.as_str(), language = %request.language, "dispatching query");

        let resp = self
            .client
            .post(self.backend("/query"))
            .json(request)
            .send()
            .await
            .map_err(dispatch_error)?;

        let response = ensure_success(resp)
            .await?
            .json::<AgentResponse>()
            .await
            .map_err(dispatch_error)?;

        Ok(response.normalized())
    }

    async fn recommend_crops(
        &self,
        request: &CropRecommendationRequest,
    ) -> Result<Vec<CropRecommendation>, DispatchError> {
        let url = self.backend(AgentKind::CropRecommendation.endpoint());
        debug!(%url, soil_type = %request.soil_type, "requesting crop recommendations");

        let resp = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(dispatch_error)?;

        let body = ensure_success(resp)
            .await?
            .json::<CropRecommendationResponse>()
            .await
            .map_err(dispatch_error)?;

        Ok(body.recommended_crops)
    }

    async fn register(&self, request: &RegistrationRequest) -> Result<(), AuthError> {
        let resp = self
            .client
            .post(self.app("/api/auth/register"))
            .json(request)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        if resp.status().is_success() {
            return Ok(());
        }

        let status = resp.status();
        let message = error_message(resp).await;
        warn!(%status, "registration rejected");
        Err(AuthError::rejected(message))
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let csrf_token = self.csrf_token().await?;
        let callback_url = self.app(DASHBOARD_ROUTE);

        let resp = self
            .auth
            .post(self.app("/api/auth/callback/credentials"))
            .form(&[
                ("csrfToken", csrf_token.as_str()),
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
                ("callbackUrl", callback_url.as_str()),
                ("redirect", "false"),
                ("json", "true"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status.is_redirection() {
            warn!(%status, "sign-in redirected instead of answering");
            return Err(sign_in_rejected(None));
        }
        if !status.is_success() {
            let message = error_message(resp).await;
            warn!(%status, "sign-in rejected");
            return Err(sign_in_rejected(message));
        }

        let url = resp
            .json::<CallbackBody>()
            .await
            .ok()
            .and_then(|body| body.url)
            .ok_or_else(|| sign_in_rejected(None))?;

        match callback_error(&self.app_url, &url) {
            None => Ok(()),
            Some(code) => {
                warn!(%code, "sign-in rejected");
                Err(sign_in_rejected(None))
            }
        }
    }
}

fn sign_in_rejected(message: Option<String>) -> AuthError {
    AuthError::Rejected {
        message: message.unwrap_or_else(|| SIGN_IN_REJECTED.to_string()),
    }
}

/// The `error` query parameter of a callback url, if any.
fn callback_error(base: &str, url: &str) -> Option<String> {
    match Url::parse(base).and_then(|base| base.join(url)) {
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == "error")
            .map(|(_, value)| value.into_owned()),
        Err(e) => Some(format!("invalid callback url: {}", e)),
    }
}

async fn ensure_success(resp: Response) -> Result<Response, DispatchError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    warn!(%status, url = %resp.url(), "backend returned non-success status");
    Err(DispatchError::Status {
        status: status.as_u16(),
    })
}

async fn error_message(resp: Response) -> Option<String> {
    let body = resp.json::<ErrorBody>().await.ok()?;
    body.message.or(body.error).filter(|m| !m.trim().is_empty())
}

fn dispatch_error(e: reqwest::Error) -> DispatchError {
    if e.is_timeout() {
        DispatchError::Timeout
    } else if e.is_decode() {
        DispatchError::Decode(e.to_string())
    } else if let Some(status) = e.status() {
        DispatchError::Status {
            status: status.as_u16(),
        }
    } else {
        DispatchError::Unreachable(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::response::{Html, IntoResponse};
    use axum::routing::{get, post};
    use axum::{Form, Json, Router};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(url: &str) -> ApiClient {
        ApiClient::new(url.to_string(), url.to_string(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_submit_query_round_trip() {
        let router = Router::new().route(
            "/query",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["input_type"], "image");
                assert_eq!(body["language"], "en");
                Json(json!({
                    "response": format!("echo: {}", body["query"].as_str().unwrap()),
                    "agent_used": "disease_detection",
                    "confidence": 1.4,
                    "processing_time": 0.25
                }))
            }),
        );
        let url = spawn(router).await;

        let response = client(&url)
            .submit_query(&QueryRequest {
                query: "spots on leaves".to_string(),
                language: "en".to_string(),
                input_type: Modality::Image,
            })
            .await
            .unwrap();

        assert_eq!(response.response, "echo: spots on leaves");
        assert_eq!(response.agent_used.as_deref(), Some("disease_detection"));
        // Normalized on the way in
        assert_eq!(response.confidence, Some(1.0));
        assert_eq!(response.processing_time, Some(0.25));
    }

    #[tokio::test]
    async fn test_non_success_status_is_dispatch_error() {
        let router = Router::new().route(
            "/query",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let url = spawn(router).await;

        let err = client(&url)
            .submit_query(&QueryRequest {
                query: "hello".to_string(),
                language: "en".to_string(),
                input_type: Modality::Text,
            })
            .await
            .unwrap_err();

        assert_eq!(err, DispatchError::Status { status: 502 });
    }

    #[tokio::test]
    async fn test_undecodable_body_is_decode_error() {
        let router = Router::new().route("/query", post(|| async { "not json" }));
        let url = spawn(router).await;

        let err = client(&url)
            .submit_query(&QueryRequest {
                query: "hello".to_string(),
                language: "en".to_string(),
                input_type: Modality::Text,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = client(&url)
            .recommend_crops(&CropRecommendationRequest {
                soil_type: "red".to_string(),
                location: "Mysuru".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let router = Router::new().route(
            "/query",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"response": "too late"}))
            }),
        );
        let url = spawn(router).await;
        let api = ApiClient::new(url.clone(), url, Duration::from_millis(100)).unwrap();

        let err = api
            .submit_query(&QueryRequest {
                query: "hello".to_string(),
                language: "en".to_string(),
                input_type: Modality::Text,
            })
            .await
            .unwrap_err();

        assert_eq!(err, DispatchError::Timeout);
    }

    #[tokio::test]
    async fn test_recommend_crops_hits_catalog_endpoint() {
        let router = Router::new().route(
            "/crop-recommendation",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["soil_type"], "black");
                assert!(body.get("ph_level").is_none());
                Json(json!({
                    "recommended_crops": [
                        {"name": "Cotton", "confidence": 0.9, "reasons": ["Black soil"], "expected_yield": 2.1, "market_price": 6600},
                        {"name": "Soybean", "confidence": 0.8, "reasons": [], "expected_yield": 1.8, "market_price": 4300}
                    ]
                }))
            }),
        );
        let url = spawn(router).await;

        let crops = client(&url)
            .recommend_crops(&CropRecommendationRequest {
                soil_type: "black".to_string(),
                location: "Nagpur".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let names: Vec<&str> = crops.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Cotton", "Soybean"]);
        assert_eq!(crops[0].market_price, 6600.0);
    }

    #[tokio::test]
    async fn test_register_rejection_carries_message() {
        let router = Router::new().route(
            "/api/auth/register",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"message": "User already exists"})),
                )
            }),
        );
        let url = spawn(router).await;

        let err = client(&url)
            .register(&RegistrationRequest {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                password: "monsoon".to_string(),
                phone: None,
                location: None,
            })
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AuthError::Rejected {
                message: "User already exists".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_register_rejection_without_body() {
        let router = Router::new().route(
            "/api/auth/register",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let url = spawn(router).await;

        let err = client(&url)
            .register(&RegistrationRequest {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                password: "monsoon".to_string(),
                phone: None,
                location: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::rejected(None));
    }

    const CSRF_TOKEN: &str = "tok-123";

    // Credentials endpoints shaped like next-auth: a CSRF token with its
    // cookie, and a callback that redirects when either is missing.
    fn auth_router() -> Router {
        Router::new()
            .route(
                "/api/auth/csrf",
                get(|| async {
                    (
                        [(
                            header::SET_COOKIE,
                            format!("next-auth.csrf-token={}; Path=/", CSRF_TOKEN),
                        )],
                        Json(json!({ "csrfToken": CSRF_TOKEN })),
                    )
                }),
            )
            .route(
                "/api/auth/callback/credentials",
                post(
                    |headers: HeaderMap, Form(form): Form<HashMap<String, String>>| async move {
                        let has_cookie = headers
                            .get(header::COOKIE)
                            .and_then(|v| v.to_str().ok())
                            .is_some_and(|c| c.contains(&format!("next-auth.csrf-token={}", CSRF_TOKEN)));
                        if !has_cookie || form.get("csrfToken").map(String::as_str) != Some(CSRF_TOKEN) {
                            return (
                                StatusCode::FOUND,
                                [(header::LOCATION, "/api/auth/signin?csrf=true")],
                            )
                                .into_response();
                        }

                        let url = if form.get("password").map(String::as_str) == Some("monsoon") {
                            "http://localhost:3000/dashboard"
                        } else {
                            "http://localhost:3000/api/auth/error?error=CredentialsSignin"
                        };
                        Json(json!({ "url": url })).into_response()
                    },
                ),
            )
            .route(
                "/api/auth/signin",
                get(|| async { Html("<html>Sign in</html>") }),
            )
    }

    fn credentials(password: &str) -> Credentials {
        Credentials {
            email: "asha@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_with_csrf_token() {
        let url = spawn(auth_router()).await;

        assert_eq!(client(&url).sign_in(&credentials("monsoon")).await, Ok(()));
    }

    #[tokio::test]
    async fn test_sign_in_error_url_is_rejection() {
        let url = spawn(auth_router()).await;

        let err = client(&url)
            .sign_in(&credentials("drought"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AuthError::Rejected {
                message: SIGN_IN_REJECTED.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_sign_in_redirect_is_rejection() {
        // Callback that always bounces to the sign-in page
        let router = Router::new()
            .route(
                "/api/auth/csrf",
                get(|| async { Json(json!({ "csrfToken": CSRF_TOKEN })) }),
            )
            .route(
                "/api/auth/callback/credentials",
                post(|| async {
                    (
                        StatusCode::FOUND,
                        [(header::LOCATION, "/api/auth/signin?csrf=true")],
                    )
                }),
            )
            .route(
                "/api/auth/signin",
                get(|| async { Html("<html>Sign in</html>") }),
            );
        let url = spawn(router).await;

        let err = client(&url)
            .sign_in(&credentials("monsoon"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AuthError::Rejected {
                message: SIGN_IN_REJECTED.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_sign_in_without_csrf_endpoint_is_unavailable() {
        let router = Router::new().route(
            "/api/auth/callback/credentials",
            post(|| async { Json(json!({ "url": "http://localhost:3000/dashboard" })) }),
        );
        let url = spawn(router).await;

        let err = client(&url)
            .sign_in(&credentials("monsoon"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Unavailable(_)));
    }

    #[test]
    fn test_callback_error() {
        let base = "http://localhost:3000";
        assert_eq!(callback_error(base, "http://localhost:3000/dashboard"), None);
        assert_eq!(callback_error(base, "/dashboard"), None);
        assert_eq!(
            callback_error(base, "/api/auth/error?error=CredentialsSignin").as_deref(),
            Some("CredentialsSignin")
        );
    }

    #[tokio::test]
    async fn test_check_backend() {
        let router = Router::new().route("/health", get(|| async { "ok" }));
        let url = spawn(router).await;

        assert_eq!(client(&url).check_backend().await, Ok(()));
    }
}

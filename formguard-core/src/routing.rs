// Routing system for HTTP requests

use crate::{Error, HttpMethod, HttpRequest, HttpResponse};
use formguard_log::debug;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A route handler function type
pub type HandlerFn = Arc<
    dyn Fn(HttpRequest) -> Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>
        + Send
        + Sync,
>;

/// Route definition with handler
#[derive(Clone)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    pub handler: HandlerFn,
}

impl Route {
    pub fn new<F, Fut>(method: HttpMethod, path: impl Into<String>, handler: F) -> Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        Self {
            method,
            path: path.into(),
            handler: Arc::new(move |request| Box::pin(handler(request))),
        }
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish()
    }
}

/// Router for managing routes and dispatching requests
#[derive(Debug, Clone, Default)]
pub struct Router {
    pub routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Add a route to the router
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Register a `GET` handler
    pub fn get<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.add_route(Route::new(HttpMethod::GET, path, handler));
        self
    }

    /// Register a `POST` handler
    pub fn post<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.add_route(Route::new(HttpMethod::POST, path, handler));
        self
    }

    /// Find a route that matches the request and run it
    pub async fn route(&self, mut request: HttpRequest) -> Result<HttpResponse, Error> {
        // Split the query string off the path
        let (path, query_string) = match request.path.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (request.path.clone(), None),
        };

        if let Some(query) = query_string {
            request.query_params = parse_query_string(&query);
        }

        let mut path_matched = false;
        for route in &self.routes {
            let Some(params) = match_path(&route.path, &path) else {
                continue;
            };
            path_matched = true;

            if route.method != request.method {
                continue;
            }

            debug!(target: "formguard::router", "{} {} -> {}", request.method, path, route.path);
            request.path_params = params;
            return (route.handler)(request).await;
        }

        if path_matched {
            Err(Error::MethodNotAllowed(format!("{} {}", request.method, path)))
        } else {
            Err(Error::RouteNotFound(format!("{} {}", request.method, path)))
        }
    }

    /// Route the request and render any error as a response
    pub async fn handle(&self, request: HttpRequest) -> HttpResponse {
        match self.route(request).await {
            Ok(response) => response,
            Err(error) => {
                if error.is_server_error() {
                    formguard_log::error!(target: "formguard::router", "{}", error);
                }
                error.into_response()
            }
        }
    }
}

/// Match a route path pattern against a request path
/// Returns Some(params) if matched, None otherwise
fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(param_name) = pattern_part.strip_prefix(':') {
            params.insert(param_name.to_string(), path_part.to_string());
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}

/// Parse a query string into a map of decoded parameters
fn parse_query_string(query: &str) -> HashMap<String, String> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(query)
        .unwrap_or_default()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpStatus;

    fn router() -> Router {
        let mut router = Router::new();
        router
            .get("/form", |_req| async { Ok(HttpResponse::html("<form></form>")) })
            .post("/form", |_req| async {
                Ok(HttpResponse::text(HttpStatus::Ok, "OK"))
            })
            .get("/users/:id", |req| async move {
                let id = req.param("id").cloned().unwrap_or_default();
                Ok(HttpResponse::text(HttpStatus::Ok, id))
            });
        router
    }

    #[test]
    fn test_match_path_static() {
        let result = match_path("/form/login", "/form/login");
        assert_eq!(result.map(|p| p.len()), Some(0));
    }

    #[test]
    fn test_match_path_with_param() {
        let params = match_path("/users/:id", "/users/123").unwrap();
        assert_eq!(params.get("id"), Some(&"123".to_string()));
    }

    #[test]
    fn test_match_path_no_match() {
        assert!(match_path("/users/:id", "/posts/123").is_none());
        assert!(match_path("/form", "/form/login").is_none());
    }

    #[test]
    fn test_match_path_empty() {
        assert!(match_path("/", "/").is_some());
    }

    #[test]
    fn test_parse_query_string_decodes() {
        let params = parse_query_string("name=john%20doe&email=test%40example.com");
        assert_eq!(params.get("name"), Some(&"john doe".to_string()));
        assert_eq!(params.get("email"), Some(&"test@example.com".to_string()));
    }

    #[tokio::test]
    async fn test_route_dispatch_by_method() {
        let router = router();

        let response = router
            .route(HttpRequest::new(HttpMethod::GET, "/form"))
            .await
            .unwrap();
        assert!(response.body_string().unwrap().contains("<form>"));

        let response = router
            .route(HttpRequest::new(HttpMethod::POST, "/form"))
            .await
            .unwrap();
        assert_eq!(response.body_string().as_deref(), Some("OK"));
    }

    #[tokio::test]
    async fn test_route_params_and_query() {
        let mut router = router();
        router.get("/search", |req| async move {
            let q = req.query("q").cloned().unwrap_or_default();
            Ok(HttpResponse::text(HttpStatus::Ok, q))
        });

        let response = router
            .route(HttpRequest::new(HttpMethod::GET, "/users/42"))
            .await
            .unwrap();
        assert_eq!(response.body_string().as_deref(), Some("42"));

        let response = router
            .route(HttpRequest::new(HttpMethod::GET, "/search?q=eko+khannedy"))
            .await
            .unwrap();
        assert_eq!(response.body_string().as_deref(), Some("eko khannedy"));
    }

    #[tokio::test]
    async fn test_route_not_found_and_method_not_allowed() {
        let router = router();

        let error = router
            .route(HttpRequest::new(HttpMethod::GET, "/missing"))
            .await
            .unwrap_err();
        assert!(matches!(error, Error::RouteNotFound(_)));

        let error = router
            .route(HttpRequest::new(HttpMethod::DELETE, "/form"))
            .await
            .unwrap_err();
        assert!(matches!(error, Error::MethodNotAllowed(_)));
    }

    #[tokio::test]
    async fn test_handle_renders_errors() {
        let response = router()
            .handle(HttpRequest::new(HttpMethod::GET, "/missing"))
            .await;
        assert_eq!(response.status, 404);
    }
}

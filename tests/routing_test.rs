//! Groups, middleware ordering, and registration failures.

use std::sync::{Arc, Mutex};

use axum::http::{Method, StatusCode};
use axum::middleware::Next;

use dessert::handler::SignatureError;
use dessert::{middleware, Controller, JsonReply, Middleware, RouteOptions};

mod common;

type Log = Arc<Mutex<Vec<&'static str>>>;

fn recording(log: &Log, name: &'static str) -> Middleware {
    let log = log.clone();
    middleware(move |request, next: Next| {
        let log = log.clone();
        async move {
            log.lock().unwrap().push(name);
            next.run(request).await
        }
    })
}

fn ping() -> (u16, JsonReply<&'static str>, Option<anyhow::Error>) {
    (200, JsonReply("pong"), None)
}

#[tokio::test]
async fn test_group_prefix() {
    let mut api = Controller::base("/api/v1/");
    api.get("/ping", || async { ping() }).unwrap();
    api.get("", || async {}).unwrap();
    let router = common::router(vec![api]);

    let (status, _) = common::send(&router, common::get("/api/v1")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = common::send(&router, common::get("/api/v1/ping")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#""pong""#);

    let (status, _) = common::send(&router, common::get("/ping")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_middleware_runs_global_then_group_then_route() {
    let log: Log = Arc::default();

    let mut api = Controller::new("/api", vec![recording(&log, "group-1"), recording(&log, "group-2")]);
    api.route(
        Method::GET,
        "/ping",
        || async { ping() },
        RouteOptions::default().with_interceptor(recording(&log, "route")),
    )
    .unwrap();

    let router = common::router_with(vec![api], vec![recording(&log, "global")]);
    let (status, _) = common::send(&router, common::get("/api/ping")).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(*log.lock().unwrap(), vec!["global", "group-1", "group-2", "route"]);
}

#[tokio::test]
async fn test_group_middleware_stays_in_group() {
    let log: Log = Arc::default();

    let mut admin = Controller::new("/admin", vec![recording(&log, "admin")]);
    admin.get("/stats", || async { ping() }).unwrap();
    let mut public = Controller::base("/public");
    public.get("/ping", || async { ping() }).unwrap();

    let router = common::router(vec![admin, public]);
    common::send(&router, common::get("/public/ping")).await;
    assert!(log.lock().unwrap().is_empty());

    common::send(&router, common::get("/admin/stats")).await;
    assert_eq!(*log.lock().unwrap(), vec!["admin"]);
}

#[tokio::test]
async fn test_middleware_can_short_circuit() {
    let deny = middleware(|request: axum::extract::Request, next: Next| async move {
        if request.headers().contains_key("authorization") {
            next.run(request).await
        } else {
            axum::response::IntoResponse::into_response(StatusCode::UNAUTHORIZED)
        }
    });
    let mut admin = Controller::new("/admin", vec![deny]);
    admin.get("/stats", || async { ping() }).unwrap();
    let router = common::router(vec![admin]);

    let (status, _) = common::send(&router, common::get("/admin/stats")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let mut api = Controller::base("/api");
    api.post("/things", || async {}).unwrap();
    let router = common::router(vec![api]);

    let (status, _) = common::send(&router, common::get("/api/things")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = common::send(&router, common::post_json("/api/things", "{}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[derive(serde::Deserialize)]
struct Plain {
    #[allow(dead_code)]
    name: String,
}
dessert::param!(Plain:);

#[derive(serde::Deserialize)]
struct Impostor;
dessert::param!(Impostor: Context);

#[test]
fn test_registration_rejects_bad_signatures() {
    let mut api = Controller::base("/api");

    let err = api.get("/plain", |_p: Plain| async {}).unwrap_err();
    assert!(matches!(err.source, SignatureError::UnknownParamType { position: 0, .. }));

    let err = api
        .get("/ctx", |_p: Plain, _ctx: dessert::RequestContext| async {})
        .unwrap_err();
    // Position 0 is checked first.
    assert!(matches!(err.source, SignatureError::UnknownParamType { position: 0, .. }));

    let err = api.get("/impostor", |_i: Impostor| async {}).unwrap_err();
    assert!(matches!(err.source, SignatureError::NotAContext { position: 0, .. }));

    let err = api
        .get("/reply", || async { (200u16, "not a reply", None::<anyhow::Error>) })
        .unwrap_err();
    assert!(matches!(err.source, SignatureError::NotResponse(_)));

    let err = api
        .get("/error", || async { (200u16, JsonReply(1), "not an error") })
        .unwrap_err();
    assert!(matches!(err.source, SignatureError::NotError(_)));
    assert_eq!(err.to_string().split(':').next(), Some("invalid handler for GET /error"));

    assert!(api.routes().is_empty());
}

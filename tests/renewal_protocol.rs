use pocket_bar_client::mock::MockTransport;
use pocket_bar_client::{
    ApiClient, ClientConfig, ClientError, Cocktail, Credential, FailureKind, HttpRequest, LocalizedText,
    RegisterRequest, RenewalPolicy, Role, SessionHolder, SessionState, TransportError, TransportFault,
};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const REFRESH: &str = "/identity/account/refreshtoken";

fn client(transport: &Arc<MockTransport>) -> ApiClient<MockTransport> {
    client_with(transport, RenewalPolicy::PerCall)
}

fn client_with(transport: &Arc<MockTransport>, renewal: RenewalPolicy) -> ApiClient<MockTransport> {
    let config = ClientConfig::new("http://bar.test").with_renewal(renewal);
    ApiClient::with_transport(Arc::clone(transport), &config)
}

fn expired() -> Credential {
    Credential::new("expired-token", "ana")
        .with_refresh_token("refresh-1")
        .with_role(Role::Admin)
}

fn fresh_json() -> Value {
    json!({"tokenValue": "fresh-token", "refreshToken": "refresh-2", "username": "ana", "role": "Admin"})
}

fn mojito_json() -> Value {
    json!({"id": "c-1", "name": {"en-GB": "Mojito"}, "isAlcoholic": true})
}

/// Server that rejects `expired-token`, serves everything to `fresh-token`,
/// and renews on the refresh route.
fn expiring_server(refresh_ok: bool) -> MockTransport {
    MockTransport::from_fn(move |request: &HttpRequest| {
        if request.path == REFRESH {
            return if refresh_ok {
                MockTransport::reply(StatusCode::OK, Some(fresh_json()))
            } else {
                MockTransport::reply(StatusCode::UNAUTHORIZED, Some(json!("Refresh token expired")))
            };
        }

        if request.bearer.as_deref() != Some("fresh-token") {
            return MockTransport::reply(StatusCode::UNAUTHORIZED, Some(json!("Token expired")));
        }

        if request.method == Method::GET && request.path == "/cocktails" {
            MockTransport::reply(StatusCode::OK, Some(json!([mojito_json()])))
        } else if request.method == Method::GET {
            MockTransport::reply(StatusCode::OK, Some(mojito_json()))
        } else if request.method == Method::POST {
            MockTransport::reply(StatusCode::CREATED, request.body.clone())
        } else {
            MockTransport::reply(StatusCode::NO_CONTENT, None)
        }
    })
}

#[tokio::test]
async fn add_with_valid_credential_returns_created_entity() {
    let transport = Arc::new(MockTransport::sequence([MockTransport::reply(
        StatusCode::CREATED,
        Some(mojito_json()),
    )]));
    let cocktails = client(&transport).cocktails();
    let mojito = Cocktail {
        name: LocalizedText::en_gb_only("Mojito"),
        ..Default::default()
    };
    let valid = Credential::new("valid-token", "ana");

    let response = cocktails.add(&mojito, Some(&valid)).await.unwrap();

    assert!(response.is_success());
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = response.data().unwrap().as_ref().unwrap();
    assert_eq!(created.id.as_deref(), Some("c-1"));
    assert_eq!(created.name.en_gb(), Some("Mojito"));
    assert!(response.error_message().is_none());
    assert!(response.renewed_credential().is_none());

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].authorization().as_deref(), Some("bearer valid-token"));
}

#[tokio::test]
async fn get_all_with_expired_credential_renews_and_retries_once() {
    let transport = Arc::new(expiring_server(true));
    let cocktails = client(&transport).cocktails();

    let response = cocktails.get_all(Some(&expired())).await.unwrap();

    assert!(response.is_success());
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.data().unwrap().len(), 1);
    let renewed = response.renewed_credential().unwrap();
    assert_eq!(renewed.token_value(), "fresh-token");
    assert_eq!(renewed.role(), Some(&Role::Admin));

    let bearers: Vec<(String, Option<String>)> = transport
        .calls()
        .into_iter()
        .map(|call| (call.path, call.bearer))
        .collect();
    assert_eq!(
        bearers,
        vec![
            ("/cocktails".to_string(), Some("expired-token".to_string())),
            (REFRESH.to_string(), Some("expired-token".to_string())),
            ("/cocktails".to_string(), Some("fresh-token".to_string())),
        ]
    );
}

#[tokio::test]
async fn remove_with_failed_refresh_surfaces_original_401() {
    let transport = Arc::new(expiring_server(false));
    let cocktails = client(&transport).cocktails();

    let response = cocktails.remove("c-1", Some(&expired())).await.unwrap();

    assert!(!response.is_success());
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.failure_kind(), Some(FailureKind::Authentication));
    assert_eq!(response.error_message(), Some("Token expired"));
    assert!(response.renewed_credential().is_none());
    assert_eq!(transport.calls_to("/cocktails/c-1"), 1);
    assert_eq!(transport.calls_to(REFRESH), 1);
}

#[tokio::test]
async fn update_not_found_is_terminal() {
    let transport = Arc::new(MockTransport::sequence([MockTransport::reply(
        StatusCode::NOT_FOUND,
        Some(json!("Cocktail c-9 does not exist")),
    )]));
    let cocktails = client(&transport).cocktails();
    let valid = Credential::new("valid-token", "ana");

    let response = cocktails
        .update("c-9", &Cocktail::default(), Some(&valid))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.failure_kind(), Some(FailureKind::Resource));
    assert_eq!(response.error_message(), Some("Cocktail c-9 does not exist"));
    assert!(response.data().is_none());
    assert!(response.renewed_credential().is_none());
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn register_with_mismatched_passwords_makes_no_call() {
    let transport = Arc::new(MockTransport::new());
    let api = client(&transport);

    let err = api
        .identity()
        .register(&RegisterRequest::new("ana@bar.ee", "ana", "secret", "secret!"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn unauthorized_without_credential_is_not_renewed() {
    let transport = Arc::new(expiring_server(true));
    let cocktails = client(&transport).cocktails();

    let response = cocktails.get("c-1", None).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.renewed_credential().is_none());
    assert_eq!(transport.call_count(), 1);
    assert_eq!(transport.calls()[0].authorization(), None);
}

#[tokio::test]
async fn retry_that_fails_still_carries_renewed_credential() {
    let transport = Arc::new(MockTransport::from_fn(|request: &HttpRequest| {
        match (request.path.as_str(), request.bearer.as_deref()) {
            (REFRESH, _) => MockTransport::reply(StatusCode::OK, Some(fresh_json())),
            (_, Some("fresh-token")) => {
                MockTransport::reply(StatusCode::FORBIDDEN, Some(json!("Admins only")))
            }
            _ => MockTransport::reply(StatusCode::UNAUTHORIZED, None),
        }
    }));
    let drink_types = client(&transport).drink_types();

    let response = drink_types.remove("d-1", Some(&expired())).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.failure_kind(), Some(FailureKind::Authorization));
    assert_eq!(response.error_message(), Some("Admins only"));
    assert_eq!(
        response.renewed_credential().map(Credential::token_value),
        Some("fresh-token")
    );
}

#[tokio::test]
async fn never_more_than_one_renewal_and_one_retry() {
    // Server keeps saying 401, even to the renewed token
    let transport = Arc::new(MockTransport::from_fn(|request: &HttpRequest| {
        if request.path == REFRESH {
            MockTransport::reply(StatusCode::OK, Some(fresh_json()))
        } else {
            MockTransport::reply(StatusCode::UNAUTHORIZED, Some(json!("Token expired")))
        }
    }));
    let ingredients = client(&transport).ingredients();

    let response = ingredients.get_all(Some(&expired())).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.renewed_credential().is_some());
    assert_eq!(transport.calls_to(REFRESH), 1);
    assert_eq!(transport.calls_to("/ingredients"), 2);
}

#[tokio::test]
async fn empty_read_body_is_a_distinct_failure() {
    let transport = Arc::new(MockTransport::sequence([MockTransport::reply(StatusCode::OK, None)]));
    let cocktails = client(&transport).cocktails();

    let response = cocktails.get("c-1", Some(&Credential::new("valid-token", "ana"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.failure_kind(), Some(FailureKind::EmptyBody));
    assert!(response.data().is_none());
}

#[tokio::test]
async fn transport_faults_become_results_or_local_errors() {
    let transport = Arc::new(MockTransport::sequence([
        MockTransport::fault(TransportError::new(TransportFault::Timeout, "operation timed out")),
        MockTransport::fault(TransportError::new(TransportFault::Other, "invalid certificate")),
    ]));
    let cocktails = client(&transport).cocktails();

    let timed_out = cocktails.get_all(None).await.unwrap();
    assert_eq!(timed_out.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(timed_out.failure_kind(), Some(FailureKind::Transport));

    let err = cocktails.get_all(None).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}

#[tokio::test]
async fn repeated_reads_return_identical_payloads() {
    let transport = Arc::new(MockTransport::from_fn(|_: &HttpRequest| {
        MockTransport::reply(StatusCode::OK, Some(mojito_json()))
    }));
    let cocktails = client(&transport).cocktails();
    let valid = Credential::new("valid-token", "ana");

    let first = cocktails.get("c-1", Some(&valid)).await.unwrap().into_data().unwrap();
    let second = cocktails.get("c-1", Some(&valid)).await.unwrap().into_data().unwrap();

    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[tokio::test]
async fn session_follows_renewals_and_logout() {
    let transport = Arc::new(MockTransport::from_fn(|request: &HttpRequest| {
        match (request.path.as_str(), request.bearer.as_deref()) {
            ("/identity/account/login", _) => MockTransport::reply(
                StatusCode::OK,
                Some(json!({"tokenValue": "expired-token", "refreshToken": "refresh-1", "username": "ana", "role": "Admin"})),
            ),
            (REFRESH, _) => MockTransport::reply(StatusCode::OK, Some(fresh_json())),
            (_, Some("fresh-token")) => MockTransport::reply(StatusCode::OK, Some(json!([]))),
            _ => MockTransport::reply(StatusCode::UNAUTHORIZED, None),
        }
    }));
    let api = client(&transport);
    let session = SessionHolder::new();

    let login = api
        .identity()
        .login(&pocket_bar_client::LoginRequest::new("ana@bar.ee", "secret"))
        .await
        .unwrap();
    session.replace(login.into_data());
    assert_eq!(session.state(), SessionState::Authenticated(Some(Role::Admin)));

    let current = session.read();
    let response = api.ingredients().get_all(current.as_deref()).await.unwrap();
    assert!(session.absorb(&response));
    assert_eq!(session.read().unwrap().token_value(), "fresh-token");
    assert_eq!(session.state(), SessionState::Authenticated(Some(Role::Admin)));

    session.logout();
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[tokio::test]
async fn concurrent_expiry_renews_per_operation() {
    let transport = Arc::new(expiring_server(true).with_latency(Duration::from_millis(20)));
    let api = client(&transport);
    let credential = expired();

    let cocktails = api.cocktails();

    let (list, removed) = tokio::join!(
        cocktails.get_all(Some(&credential)),
        cocktails.remove("c-1", Some(&credential)),
    );

    assert!(list.unwrap().renewed_credential().is_some());
    assert!(removed.unwrap().renewed_credential().is_some());
    assert_eq!(transport.calls_to(REFRESH), 2);
}

#[tokio::test]
async fn single_flight_shares_one_refresh() {
    let transport = Arc::new(expiring_server(true).with_latency(Duration::from_millis(20)));
    let api = client_with(&transport, RenewalPolicy::SingleFlight);
    let credential = expired();

    let cocktails = api.cocktails();

    let (list, removed) = tokio::join!(
        cocktails.get_all(Some(&credential)),
        cocktails.remove("c-1", Some(&credential)),
    );

    let list = list.unwrap();
    let removed = removed.unwrap();
    assert!(list.is_success());
    assert!(removed.is_success());
    assert_eq!(list.renewed_credential(), removed.renewed_credential());
    assert_eq!(transport.calls_to(REFRESH), 1);
}

#[tokio::test]
async fn renewal_keeps_role_and_refresh_token_the_server_omits() {
    let transport = Arc::new(MockTransport::from_fn(|request: &HttpRequest| {
        if request.path == REFRESH {
            return MockTransport::reply(StatusCode::OK, Some(json!({"tokenValue": "fresh-token"})));
        }
        if request.bearer.as_deref() == Some("fresh-token") {
            MockTransport::reply(StatusCode::OK, Some(json!([mojito_json()])))
        } else {
            MockTransport::reply(StatusCode::UNAUTHORIZED, None)
        }
    }));
    let api = client(&transport);
    let session = SessionHolder::with_credential(expired());

    let current = session.read();
    let response = api.cocktails().get_all(current.as_deref()).await.unwrap();
    assert!(response.is_success());
    assert!(session.absorb(&response));

    let renewed = session.read().unwrap();
    assert_eq!(renewed.token_value(), "fresh-token");
    assert_eq!(renewed.refresh_token(), Some("refresh-1"));
    assert_eq!(renewed.username(), "ana");
    assert_eq!(session.state(), SessionState::Authenticated(Some(Role::Admin)));
}

#[tokio::test]
async fn single_flight_failed_refresh_attaches_nothing() {
    let transport = Arc::new(expiring_server(false).with_latency(Duration::from_millis(20)));
    let api = client_with(&transport, RenewalPolicy::SingleFlight);
    let credential = expired();

    let cocktails = api.cocktails();

    let (list, removed) = tokio::join!(
        cocktails.get_all(Some(&credential)),
        cocktails.remove("c-1", Some(&credential)),
    );

    let list = list.unwrap();
    let removed = removed.unwrap();
    for status in [list.status(), removed.status()] {
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    assert_eq!(list.failure_kind(), Some(FailureKind::Authentication));
    assert_eq!(removed.failure_kind(), Some(FailureKind::Authentication));
    assert!(list.renewed_credential().is_none());
    assert!(removed.renewed_credential().is_none());
    assert_eq!(transport.calls_to(REFRESH), 1);
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn retry_fault_after_renewal_still_updates_session() {
    let transport = Arc::new(MockTransport::from_fn(|request: &HttpRequest| {
        if request.path == REFRESH {
            return MockTransport::reply(StatusCode::OK, Some(fresh_json()));
        }
        if request.bearer.as_deref() == Some("fresh-token") {
            MockTransport::fault(TransportError::new(TransportFault::Other, "connection reset by peer"))
        } else {
            MockTransport::reply(StatusCode::UNAUTHORIZED, None)
        }
    }));
    let api = client(&transport);
    let session = SessionHolder::with_credential(expired());

    let current = session.read();
    let err = api.cocktails().get("c-1", current.as_deref()).await.unwrap_err();

    assert!(matches!(err, ClientError::TransportAfterRenewal { .. }));
    assert!(session.absorb_error(&err));
    assert_eq!(session.read().unwrap().token_value(), "fresh-token");
    assert_eq!(transport.calls_to(REFRESH), 1);
    assert_eq!(transport.call_count(), 3);
}

//! HTTP client against a mock backend
//!
//! Checks request shapes (paths, query strings, token header) and how
//! backend answers are decoded or mapped to errors.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use inscripciones::api::{
    ApiClient, ApiError, Credentials, HttpApiClient, InscriptionQuery, RegistrationSubmission,
};
use inscripciones::config::ApiConfig;
use inscripciones::types::{AttendeeEntry, Money, PaymentMethodId, ProfileId, RateId, UserId};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpApiClient {
    HttpApiClient::new(&ApiConfig {
        base_url: format!("{}/api/", server.uri()),
        timeout: Duration::from_secs(5),
        page_size: 666,
    })
    .unwrap()
}

fn session_json() -> serde_json::Value {
    json!({
        "user": {
            "id": 4,
            "username": "ana",
            "email": "ana@example.org",
            "names": "Ana",
            "lastname": "Rojas",
            "is_superuser": false,
            "profile_description": "ADMINISTRADOR"
        },
        "token": "tok-123"
    })
}

#[tokio::test]
async fn paginated_catalog_is_unwrapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tarifa"))
        .and(query_param("page_size", "666"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [
                {"id": 1, "description": "General", "price": "150.00", "active": true},
                {"id": 2, "description": "Niños", "price": "75.50", "active": false}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rates = client(&server).rates().await.unwrap();

    assert_eq!(rates.len(), 2);
    assert_eq!(rates[0].price, Money::from_cents(15_000));
    assert_eq!(rates[1].price, Money::from_cents(7_550));
    assert!(!rates[1].active);
}

#[tokio::test]
async fn plain_lists_are_decoded_directly() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/activity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 3,
                "title": "Retiro anual",
                "is_active": true,
                "settings": {"inscription": {"show_tarifas": true, "emails": null}}
            }
        ])))
        .mount(&server)
        .await;

    let activities = client(&server).activities().await.unwrap();

    assert_eq!(activities.len(), 1);
    assert!(activities[0].is_active);
    assert_eq!(activities[0].settings.inscription.show_tarifas, Some(true));
    assert!(activities[0].settings.inscription.emails.is_empty());
}

#[tokio::test]
async fn token_is_sent_after_it_is_installed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/kind"))
        .and(header("Authorization", "Token tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/kind"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let api = client(&server);
    assert_eq!(api.kinds().await, Err(ApiError::Unauthorized));

    api.set_token(Some("tok-123".into()));
    assert_eq!(api.kinds().await, Ok(Vec::new()));
}

#[tokio::test]
async fn forbidden_also_requires_login() {
    let server = MockServer::start().await;
    Mock::given(path("/api/profile"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let error = client(&server).profiles().await.unwrap_err();

    assert!(error.requires_login());
}

#[tokio::test]
async fn profiles_are_a_plain_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "description": "ADMINISTRADOR", "status": true},
            {"id": 2, "description": null, "status": false}
        ])))
        .mount(&server)
        .await;

    let profiles = client(&server).profiles().await.unwrap();

    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].id, ProfileId::new(1));
    assert_eq!(profiles[0].description, "ADMINISTRADOR");
    assert!(profiles[0].status);
    assert_eq!(profiles[1].description, "");
}

#[tokio::test]
async fn user_listing_requests_the_given_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 11,
            "next": null,
            "previous": "http://backend/api/users?page=1",
            "results": [{
                "id": 11,
                "username": "luis",
                "email": null,
                "names": "Luis",
                "lastname": "Paz",
                "is_active": true,
                "profile": 2,
                "profile_description": "CAJERO"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server).users(2).await.unwrap();

    assert_eq!(page.count, Some(11));
    assert!(!page.has_next());
    assert!(page.previous.is_some());
    let user = &page.results[0];
    assert_eq!(user.id, UserId::new(11));
    assert_eq!(user.email, "");
    assert_eq!(user.profile, Some(ProfileId::new(2)));
    assert_eq!(user.profile_description.as_deref(), Some("CAJERO"));
}

#[tokio::test]
async fn server_errors_keep_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(path("/api/church"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&server)
        .await;

    let error = client(&server).churches().await.unwrap_err();

    assert_eq!(
        error,
        ApiError::Status {
            status: 500,
            message: "database down".to_string()
        }
    );
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(path("/api/church"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let error = client(&server).churches().await.unwrap_err();

    assert!(matches!(error, ApiError::Decode(_)));
}

#[tokio::test]
async fn inscription_listing_sends_page_and_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inscription"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "50"))
        .and(query_param("search", "rojas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 51,
            "next": null,
            "previous": "http://backend/api/inscription?page=1",
            "results": [{
                "id": 51,
                "amount": "150.00",
                "person": {"names": "Ana", "lastnames": "Rojas", "doc_num": "123"},
                "group": {"vouchergroup": "V-9", "paymentmethod": {"id": 1, "description": "Yape"}},
                "checkinat": "2024-05-01T15:30:00Z",
                "status": "P"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = InscriptionQuery::first(50)
        .with_search(Some("rojas".into()))
        .next_page();
    let page = client(&server).inscriptions(&query).await.unwrap();

    assert!(!page.has_next());
    assert_eq!(page.count, Some(51));
    assert_eq!(page.results[0].person.lastnames, "Rojas");
    assert_eq!(page.results[0].checkinat.as_deref(), Some("2024-05-01T15:30:00Z"));
}

#[tokio::test]
async fn login_posts_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_partial_json(json!({"username": "ana", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json()))
        .expect(1)
        .mount(&server)
        .await;

    let session = client(&server)
        .login(&Credentials::new("ana", "secret"))
        .await
        .unwrap();

    assert_eq!(session.token, "tok-123");
    assert!(session.user.is_admin());
}

#[tokio::test]
async fn registration_is_posted_with_amount_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/inscription/register"))
        .and(body_partial_json(json!({
            "tarifa": 2,
            "paymentmethod": 5,
            "vouchergroup": "OP-991",
            "amount": "301.00"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 77,
            "vouchergroup": "OP-991"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let submission = RegistrationSubmission {
        activity: None,
        tarifa: RateId::new(2),
        paymentmethod: PaymentMethodId::new(5),
        vouchergroup: "OP-991".into(),
        amount: Money::from_cents(30_100),
        people: vec![
            AttendeeEntry::new("Ana", "Rojas", "1"),
            AttendeeEntry::new("Luis", "Paz", "2"),
        ],
    };
    let receipt = client(&server).submit_registration(&submission).await.unwrap();

    assert_eq!(receipt.id, 77);
}

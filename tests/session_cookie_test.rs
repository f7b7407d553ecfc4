// Properties of the session credential and the session accessor
use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use actix_web::HttpResponse;
use base64::{engine::general_purpose, Engine as _};

use greenlight::session::{CredentialCodec, SessionKeys, SESSION_COOKIE};
use greenlight::testing::TestFixtures;
use greenlight::{GreenlightError, UserData};

const NOW: i64 = 1_750_000_000;

#[test]
fn test_round_trip_for_every_provider_shape() {
    let codec = CredentialCodec::new(SessionKeys::generate(), 3600);
    let users = [
        TestFixtures::user_data("github"),
        UserData::new("google", "g@x.com").with_avatar("https://lh3.example/p.jpg"),
        UserData::new("github", "unicode@x.com").with_name("Zoë Ω 漢字"),
    ];

    for user in users {
        let value = codec.encode_at(SESSION_COOKIE, &user, NOW).unwrap();
        let decoded: UserData = codec.decode_at(SESSION_COOKIE, &value, NOW).unwrap();
        assert_eq!(decoded, user);
    }
}

#[test]
fn test_encoding_is_not_deterministic() {
    let codec = CredentialCodec::new(SessionKeys::generate(), 3600);
    let user = TestFixtures::user_data("github");
    let first = codec.encode_at(SESSION_COOKIE, &user, NOW).unwrap();
    let second = codec.encode_at(SESSION_COOKIE, &user, NOW).unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_plaintext_is_not_visible() {
    let codec = CredentialCodec::new(SessionKeys::generate(), 3600);
    let value = codec
        .encode(SESSION_COOKIE, &TestFixtures::user_data("github"))
        .unwrap();
    let frame = general_purpose::URL_SAFE_NO_PAD.decode(&value).unwrap();
    let frame = String::from_utf8(frame).unwrap();
    assert_eq!(frame.split('|').count(), 3);
    assert!(!frame.contains("ada@x.com"));
    assert!(!frame.contains("github"));
}

#[test]
fn test_expiry_boundary() {
    let codec = CredentialCodec::new(SessionKeys::generate(), 60);
    let value = codec
        .encode_at(SESSION_COOKIE, &TestFixtures::user_data("github"), NOW)
        .unwrap();

    assert!(codec
        .decode_at::<UserData>(SESSION_COOKIE, &value, NOW + 60)
        .is_ok());
    assert!(matches!(
        codec.decode_at::<UserData>(SESSION_COOKIE, &value, NOW + 61),
        Err(GreenlightError::InvalidCredential)
    ));
}

#[test]
fn test_session_survives_shared_keys() {
    let keys = SessionKeys::from_keys(&[3u8; 64], &[4u8; 32]).unwrap();
    let before_restart = greenlight::SessionManager::new(keys.clone(), false, 1);
    let after_restart = greenlight::SessionManager::new(keys, false, 1);

    let cookie = before_restart
        .create_session_cookie(&TestFixtures::user_data("github"))
        .unwrap();
    let req = TestRequest::default().cookie(cookie).to_http_request();
    assert_eq!(
        after_restart.get_user_data(&req),
        Some(TestFixtures::user_data("github"))
    );
}

#[test]
fn test_absent_and_corrupted_are_indistinguishable() {
    let manager = TestFixtures::session_manager();
    let valid = manager
        .create_session_cookie(&TestFixtures::user_data("github"))
        .unwrap();
    let mut corrupted_value = valid.value().to_string();
    corrupted_value.insert(corrupted_value.len() / 2, 'x');

    let requests = [
        TestRequest::default().to_http_request(),
        TestRequest::default()
            .cookie(TestFixtures::raw_session_cookie(""))
            .to_http_request(),
        TestRequest::default()
            .cookie(TestFixtures::raw_session_cookie(&corrupted_value))
            .to_http_request(),
    ];
    for req in &requests {
        assert_eq!(manager.get_user_data(req), None);
    }
}

#[test]
fn test_set_then_clear_on_same_response_flow() {
    let manager = TestFixtures::session_manager();

    let mut login = HttpResponse::Ok().finish();
    manager
        .set_user_data(&TestFixtures::user_data("google"), &mut login)
        .unwrap();
    let session = login
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap()
        .into_owned();

    let mut logout = HttpResponse::Ok().finish();
    manager.clear_user_data(&mut logout).unwrap();
    assert_eq!(logout.status(), StatusCode::OK);
    let cleared = logout
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap()
        .into_owned();

    let req = TestRequest::default().cookie(session).to_http_request();
    assert!(manager.get_user_data(&req).is_some());

    let req = TestRequest::default().cookie(cleared).to_http_request();
    assert!(manager.get_user_data(&req).is_none());
}

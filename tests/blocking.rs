#![cfg(feature = "blocking")]

use std::net::TcpListener;
use std::time::Duration;

use acs_sts::blocking::Client;
use acs_sts::{AssumeRoleRequest, ClientConfig, Credential, RequestOptions, StsError};
use mockito::Matcher;

fn test_credential() -> Credential {
    Credential::new("test-access-key-id", "test-access-key-secret")
}

fn test_client(endpoint: String) -> Client {
    let config = ClientConfig::default().with_endpoint(endpoint);
    Client::with_config(test_credential(), config).expect("failed to build client")
}

fn valid_request() -> AssumeRoleRequest {
    AssumeRoleRequest::builder()
        .role_arn("acs:ram::123456789012:role/test-role")
        .role_session_name("session-name")
        .build()
}

#[test]
fn blocking_assume_role_success() {
    let mut server = mockito::Server::new();

    let mock = server
        .mock("POST", "/")
        .match_header("Content-Type", "application/x-www-form-urlencoded")
        .match_header("x-acs-action", "AssumeRole")
        .match_header(
            "authorization",
            Matcher::Regex(r"^ACS3-HMAC-SHA256 Credential=test-access-key-id,".into()),
        )
        .match_body(Matcher::UrlEncoded("DurationSeconds".into(), "3600".into()))
        .with_status(200)
        .with_header("Content-Type", "application/json")
        .with_body(
            r#"{
                "RequestId": "6894B13B-6D71-4EF5-88FA-F32781734A7F",
                "AssumedRoleUser": {
                    "Arn": "acs:ram::123456:role/test-role/session-name",
                    "AssumedRoleId": "33157794895460****:session-name"
                },
                "Credentials": {
                    "AccessKeyId": "STS.XXXXXXXXXXXX",
                    "AccessKeySecret": "YYYYYYYYYYYY",
                    "SecurityToken": "ZZZZZZZZZZZZ",
                    "Expiration": "2024-01-01T01:00:00Z"
                }
            }"#,
        )
        .create();

    let client = test_client(server.url());

    let resp = client
        .assume_role(valid_request())
        .expect("assume_role should succeed");

    assert_eq!(resp.request_id, "6894B13B-6D71-4EF5-88FA-F32781734A7F");
    assert_eq!(
        resp.assumed_role_user.arn,
        "acs:ram::123456:role/test-role/session-name"
    );
    assert_eq!(resp.credentials.access_key_id, "STS.XXXXXXXXXXXX");
    assert_eq!(resp.credentials.security_token, "ZZZZZZZZZZZZ");
    assert_eq!(resp.credentials.expiration, "2024-01-01T01:00:00Z");

    mock.assert();
}

#[test]
fn blocking_assume_role_api_error() {
    let mut server = mockito::Server::new();

    let mock = server
        .mock("POST", "/")
        .with_status(400)
        .with_header("Content-Type", "application/json")
        .with_body(
            r#"{
                "RequestId": "err-req-001",
                "HostId": "sts.aliyuncs.com",
                "Code": "EntityNotExist.Role",
                "Message": "The role not exists.",
                "Recommend": "https://error-center.aliyun.com/"
            }"#,
        )
        .create();

    let client = test_client(server.url());

    let err = client
        .assume_role(valid_request())
        .expect_err("assume_role should fail with API error");

    assert_eq!(err.request_id(), Some("err-req-001"));
    assert_eq!(err.error_code(), Some("EntityNotExist.Role"));
    match err {
        StsError::Api {
            message, recommend, ..
        } => {
            assert_eq!(message, "The role not exists.");
            assert_eq!(
                recommend.as_deref(),
                Some("https://error-center.aliyun.com/")
            );
        }
        other => panic!("expected StsError::Api, got: {:?}", other),
    }

    mock.assert();
}

#[test]
fn blocking_assume_role_server_error() {
    let mut server = mockito::Server::new();

    let mock = server.mock("POST", "/").with_status(500).expect(1).create();

    let client = test_client(server.url());

    let err = client
        .assume_role(valid_request())
        .expect_err("assume_role should fail with server error");
    assert_eq!(err.status(), Some(500));

    mock.assert();
}

#[test]
fn blocking_assume_role_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => held.push(stream),
                Err(_) => break,
            }
        }
    });

    let client = test_client(format!("http://{}", addr));

    let err = client
        .assume_role_with_options(
            valid_request(),
            RequestOptions::default().with_timeout(Duration::from_millis(300)),
        )
        .expect_err("assume_role should time out");

    assert!(err.is_timeout(), "expected timeout, got: {:?}", err);
}

#![allow(clippy::unused_async)]
//! Origin-restricted authorization entries.

use salvo::http::StatusCode;

use super::helpers::*;
use webacl_test::component::config::OriginPolicy;

const APP: &str = "https://app.example";

/// User one may write `/o/` only through the trusted application; reads are public.
async fn restricted_container(pod: &TestPod) {
    pod.seed_acl(
        "/o/.acl",
        &format!(
            "<#app> acl:accessTo <./> ; acl:defaultForNew <./> ;
                acl:agent <{USER1}> ; acl:origin <{APP}> ;
                acl:mode acl:Read, acl:Write .
             <#public> acl:accessTo <./> ; acl:defaultForNew <./> ;
                acl:agentClass foaf:Agent ; acl:mode acl:Read ."
        ),
    )
    .await;
}

fn write(origin: Option<&str>) -> TestRequest {
    let request = TestRequest::put("/o/doc.ttl")
        .as_user(User::One)
        .turtle_body("<#d> <#p> \"d\" .");
    match origin {
        Some(origin) => request.origin(origin),
        None => request,
    }
}

/// ## Summary
/// The restricted entry applies only to requests from its origin.
#[test_log::test(tokio::test)]
async fn restricted_entry_matches_its_origin_only() {
    let pod = TestPod::new();
    restricted_container(&pod).await;

    write(Some(APP))
        .send(&pod.service)
        .await
        .assert_status(StatusCode::CREATED);

    write(Some("https://app.example:443"))
        .send(&pod.service)
        .await
        .assert_status(StatusCode::CREATED);

    write(Some("https://evil.example"))
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    TestRequest::get("/o/doc.ttl")
        .origin("https://evil.example")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);
}

/// ## Summary
/// Without an `Origin` header a restricted entry does not apply by default.
#[test_log::test(tokio::test)]
async fn missing_origin_is_strict_by_default() {
    let pod = TestPod::new();
    restricted_container(&pod).await;

    write(None)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

/// ## Summary
/// Non-browser clients can be trusted when the policy says so.
#[test_log::test(tokio::test)]
async fn missing_origin_can_be_trusted() {
    let pod = TestPod::with_settings(|settings| {
        settings.acl.origin_policy = OriginPolicy::TrustMissing;
    });
    restricted_container(&pod).await;

    write(None)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::CREATED);

    write(Some("https://evil.example"))
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

/// ## Summary
/// Trusted origins are not subject to origin restrictions.
#[test_log::test(tokio::test)]
async fn trusted_origins_bypass_restrictions() {
    let pod = TestPod::with_settings(|settings| {
        settings.acl.trusted_origins = vec!["https://tools.example/".to_string()];
    });
    restricted_container(&pod).await;

    write(Some("https://tools.example"))
        .send(&pod.service)
        .await
        .assert_status(StatusCode::CREATED);
}

/// ## Summary
/// A container readable only from `http://example.org/`: a known agent from
/// another origin is forbidden, an anonymous one is challenged.
#[test_log::test(tokio::test)]
async fn wrong_origin_status_depends_on_identity() {
    let pod = TestPod::new();
    pod.seed_acl(
        "/e/.acl",
        &format!(
            "<#site> acl:accessTo <./> ;
                acl:agent <{USER1}> ; acl:agentClass foaf:Agent ;
                acl:origin <http://example.org/> ; acl:mode acl:Read ."
        ),
    )
    .await;

    TestRequest::head("/e/")
        .as_user(User::One)
        .origin("http://example.org/")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);

    TestRequest::head("/e/")
        .as_user(User::One)
        .origin("http://example.com/")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    TestRequest::head("/e/")
        .origin("http://example.com/")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_header("WWW-Authenticate", "WebID-TLS realm=\"webacl\"");

    TestRequest::head("/e/")
        .origin("http://example.org/")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);
}

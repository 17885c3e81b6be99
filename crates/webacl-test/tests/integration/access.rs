#![allow(clippy::unused_async)]
//! Access decisions over HTTP.
//!
//! Verifies inheritance through `acl:defaultForNew`, the status mapping of
//! denials, `Control` for ACL documents and the no-ACL fallback.

use salvo::http::StatusCode;

use super::helpers::*;

/// Container `/d/` where user one has full control and everyone may read.
async fn shared_container(pod: &TestPod) {
    pod.seed_acl(
        "/d/.acl",
        &format!(
            "<#owner> a acl:Authorization ;
                acl:accessTo <./> ; acl:defaultForNew <./> ;
                acl:agent <{USER1}> ;
                acl:mode acl:Read, acl:Write, acl:Control .
             <#public> a acl:Authorization ;
                acl:accessTo <./> ; acl:defaultForNew <./> ;
                acl:agentClass foaf:Agent ;
                acl:mode acl:Read ."
        ),
    )
    .await;
    pod.seed("/d/x.ttl", "<#x> <#p> \"x\" .").await;
}

// ============================================================================
// Inheritance and status mapping
// ============================================================================

/// ## Summary
/// Anyone can read a resource inheriting a public read rule.
#[test_log::test(tokio::test)]
async fn inherited_public_read() {
    let pod = TestPod::new();
    shared_container(&pod).await;

    TestRequest::get("/d/x.ttl")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_header("Content-Type", "text/turtle")
        .assert_body_contains("\"x\"");

    TestRequest::get("/d/x.ttl")
        .as_user(User::Two)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);
}

/// ## Summary
/// Anonymous denials challenge for a certificate; authenticated denials are forbidden.
#[test_log::test(tokio::test)]
async fn denials_map_to_401_and_403() {
    let pod = TestPod::new();
    shared_container(&pod).await;

    TestRequest::put("/d/x.ttl")
        .turtle_body("<#x> <#p> \"anonymous\" .")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_header("WWW-Authenticate", "WebID-TLS realm=\"webacl\"");

    TestRequest::put("/d/x.ttl")
        .as_user(User::Two)
        .turtle_body("<#x> <#p> \"two\" .")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .assert_no_header("WWW-Authenticate");

    TestRequest::get("/d/x.ttl")
        .send(&pod.service)
        .await
        .assert_body_contains("\"x\"");
}

/// ## Summary
/// The owner may write, create nested resources and delete them.
#[test_log::test(tokio::test)]
async fn owner_writes_and_deletes() {
    let pod = TestPod::new();
    shared_container(&pod).await;

    TestRequest::put("/d/nested/deep/y.ttl")
        .as_user(User::One)
        .turtle_body("<#y> <#p> \"y\" .")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::CREATED)
        .assert_header("User", USER1);

    assert!(pod.exists("/d/nested/deep/y.ttl").await);

    TestRequest::get("/d/nested/deep/y.ttl")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_contains("\"y\"");

    TestRequest::delete("/d/nested/deep/y.ttl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);

    assert!(!pod.exists("/d/nested/deep/y.ttl").await);

    TestRequest::delete("/d/nested/deep/y.ttl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// ## Summary
/// A container is only deleted once it is empty.
#[test_log::test(tokio::test)]
async fn non_empty_container_conflicts() {
    let pod = TestPod::new();
    shared_container(&pod).await;
    pod.seed("/d/box/item.ttl", "<#i> <#p> \"i\" .").await;

    TestRequest::delete("/d/box/")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::CONFLICT);

    TestRequest::delete("/d/box/item.ttl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);

    TestRequest::delete("/d/box/")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);
}

/// ## Summary
/// A child container with its own ACL no longer inherits from its parent.
#[test_log::test(tokio::test)]
async fn own_acl_stops_inheritance() {
    let pod = TestPod::new();
    shared_container(&pod).await;
    pod.seed_acl(
        "/d/private/.acl",
        &format!(
            "<#two> acl:accessTo <./> ; acl:defaultForNew <./> ;
                acl:agent <{USER2}> ; acl:mode acl:Read ."
        ),
    )
    .await;
    pod.seed("/d/private/z.ttl", "<#z> <#p> \"z\" .").await;

    TestRequest::get("/d/private/z.ttl")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    TestRequest::get("/d/private/z.ttl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    TestRequest::get("/d/private/z.ttl")
        .as_user(User::Two)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);
}

/// ## Summary
/// `acl:accessTo` on a container does not reach its members.
#[test_log::test(tokio::test)]
async fn access_to_is_not_inherited() {
    let pod = TestPod::new();
    pod.seed_acl(
        "/listing/.acl",
        "<#public> acl:accessTo <./> ; acl:agentClass foaf:Agent ; acl:mode acl:Read .",
    )
    .await;
    pod.seed("/listing/member.ttl", "<#m> <#p> \"m\" .").await;

    TestRequest::get("/listing/")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_contains("member.ttl");

    TestRequest::get("/listing/member.ttl")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

/// ## Summary
/// Any verified `WebID` matches `acl:AuthenticatedAgent`; anonymous requests do not.
#[test_log::test(tokio::test)]
async fn authenticated_agent_class() {
    let pod = TestPod::new();
    pod.seed_acl(
        "/members/.acl",
        "<#members> acl:accessTo <./> ; acl:defaultForNew <./> ;
            acl:agentClass acl:AuthenticatedAgent ; acl:mode acl:Read .",
    )
    .await;
    pod.seed("/members/news.ttl", "<#n> <#p> \"news\" .").await;

    TestRequest::get("/members/news.ttl")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    for user in [User::One, User::Two] {
        TestRequest::get("/members/news.ttl")
            .as_user(user)
            .send(&pod.service)
            .await
            .assert_status(StatusCode::OK);
    }
}

// ============================================================================
// ACL documents
// ============================================================================

/// ## Summary
/// Writing an ACL requires `Control` on the resource it governs, not `Write`.
#[test_log::test(tokio::test)]
async fn acl_edits_require_control() {
    let pod = TestPod::new();
    pod.seed_acl(
        "/e/.acl",
        &format!(
            "<#owner> acl:accessTo <./> ; acl:defaultForNew <./> ;
                acl:agent <{USER1}> ; acl:mode acl:Control .
             <#editor> acl:accessTo <./> ; acl:defaultForNew <./> ;
                acl:agent <{USER2}> ; acl:mode acl:Read, acl:Write ."
        ),
    )
    .await;

    let takeover = format!(
        "{ACL_PREFIXES}<#mine> acl:accessTo <./> ; acl:agent <{USER2}> ; acl:mode acl:Control ."
    );

    TestRequest::put("/e/notes.ttl")
        .as_user(User::Two)
        .turtle_body("<#n> <#p> \"n\" .")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::put("/e/.acl")
        .as_user(User::Two)
        .turtle_body(&takeover)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    TestRequest::get("/e/.acl")
        .as_user(User::Two)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    TestRequest::get("/e/.acl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_contains("acl:Control");

    TestRequest::put("/e/.acl")
        .as_user(User::One)
        .turtle_body(&takeover)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::put("/e/notes.ttl")
        .as_user(User::Two)
        .turtle_body("<#n> <#p> \"again\" .")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

/// ## Summary
/// `acl:owner` gives `Control` to the owner only, not to the other grantees of
/// the same entry.
#[test_log::test(tokio::test)]
async fn owner_control_is_not_shared() {
    let pod = TestPod::new();
    pod.seed_acl(
        "/shared/.acl",
        &format!(
            "<#mixed> acl:accessTo <./> ; acl:defaultForNew <./> ;
                acl:owner <{USER1}> ; acl:agent <{USER2}> ;
                acl:agentClass foaf:Agent ; acl:mode acl:Read ."
        ),
    )
    .await;
    pod.seed("/shared/doc.ttl", "<#d> <#p> \"d\" .").await;

    TestRequest::put("/shared/doc.ttl")
        .turtle_body("<#d> <#p> \"anonymous\" .")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    TestRequest::put("/shared/doc.ttl")
        .as_user(User::Two)
        .turtle_body("<#d> <#p> \"two\" .")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    TestRequest::get("/shared/.acl")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    TestRequest::get("/shared/.acl")
        .as_user(User::Two)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    TestRequest::get("/shared/doc.ttl")
        .as_user(User::Two)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);

    TestRequest::put("/shared/doc.ttl")
        .as_user(User::One)
        .turtle_body("<#d> <#p> \"one\" .")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::get("/shared/.acl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);
}

/// ## Summary
/// ACL documents that are not valid Turtle are rejected before they are stored.
#[test_log::test(tokio::test)]
async fn invalid_acl_is_rejected() {
    let pod = TestPod::new();
    shared_container(&pod).await;

    TestRequest::put("/d/.acl")
        .as_user(User::One)
        .turtle_body("<#broken> acl:mode")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    TestRequest::get("/d/x.ttl")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);
}

/// ## Summary
/// A stored ACL that cannot be parsed fails closed with a server error.
#[test_log::test(tokio::test)]
async fn unparsable_stored_acl_is_a_server_error() {
    let pod = TestPod::new();
    pod.seed("/broken/.acl", "this is not turtle").await;
    pod.seed("/broken/doc.ttl", "<#d> <#p> \"d\" .").await;

    TestRequest::get("/broken/doc.ttl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

/// ## Summary
/// An ACL without applicable entries denies, even to configured owners.
#[test_log::test(tokio::test)]
async fn empty_acl_is_authoritative() {
    let pod = TestPod::with_settings(|settings| {
        settings.acl.owners = vec![USER1.to_string()];
    });
    pod.seed_acl("/locked/.acl", "").await;
    pod.seed("/locked/doc.ttl", "<#d> <#p> \"d\" .").await;

    TestRequest::get("/locked/doc.ttl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

// ============================================================================
// Fallback when no ACL exists
// ============================================================================

/// ## Summary
/// Without any ACL only the configured owners get access.
#[test_log::test(tokio::test)]
async fn owner_only_fallback() {
    let pod = TestPod::with_settings(|settings| {
        settings.acl.owners = vec![USER1.to_string()];
    });
    pod.seed("/doc.ttl", "<#d> <#p> \"d\" .").await;

    TestRequest::get("/doc.ttl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);

    TestRequest::put("/.acl")
        .as_user(User::One)
        .turtle_body(&format!(
            "{ACL_PREFIXES}<#public> acl:accessTo <./> ; acl:defaultForNew <./> ;
                acl:agentClass foaf:Agent ; acl:mode acl:Read ."
        ))
        .send(&pod.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::get("/doc.ttl")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);
}

/// ## Summary
/// Without any ACL and without owners, every request is denied.
#[test_log::test(tokio::test)]
async fn fallback_denies_non_owners() {
    let pod = TestPod::new();
    pod.seed("/doc.ttl", "<#d> <#p> \"d\" .").await;

    TestRequest::get("/doc.ttl")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    TestRequest::get("/doc.ttl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#![allow(clippy::unused_async)]
//! Group-granted access through `acl:agentGroup` / group `acl:agentClass`.

use salvo::http::StatusCode;

use super::helpers::*;

const REMOTE_GROUPS: &str = "https://groups.example.org/team";

/// `/team/` grants read and write to the editors group of `/groups.ttl`,
/// and user one controls the rest of the pod.
async fn team_pod(pod: &TestPod) {
    pod.seed_acl(
        "/.acl",
        &format!(
            "<#owner> acl:accessTo <./> ; acl:defaultForNew <./> ;
                acl:agent <{USER1}> ; acl:mode acl:Read, acl:Write, acl:Control ."
        ),
    )
    .await;
    pod.seed(
        "/groups.ttl",
        &format!("{ACL_PREFIXES}<#editors> vcard:hasMember <{USER2}> ."),
    )
    .await;
    pod.seed_acl(
        "/team/.acl",
        "<#editors> acl:accessTo <./> ; acl:defaultForNew <./> ;
            acl:agentGroup </groups.ttl#editors> ; acl:mode acl:Read, acl:Write .",
    )
    .await;
}

/// ## Summary
/// Members of the group get the granted modes; others do not.
#[test_log::test(tokio::test)]
async fn group_members_are_granted() {
    let pod = TestPod::new();
    team_pod(&pod).await;

    TestRequest::put("/team/plan.ttl")
        .as_user(User::Two)
        .turtle_body("<#plan> <#p> \"v1\" .")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::get("/team/plan.ttl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    TestRequest::get("/team/plan.ttl")
        .send(&pod.service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

/// ## Summary
/// Editing a group document in the pod takes effect on the next request.
#[test_log::test(tokio::test)]
async fn group_edits_take_effect_immediately() {
    let pod = TestPod::new();
    team_pod(&pod).await;
    pod.seed("/team/plan.ttl", "<#plan> <#p> \"v1\" .").await;

    TestRequest::get("/team/plan.ttl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    TestRequest::put("/groups.ttl")
        .as_user(User::One)
        .turtle_body(&format!(
            "{ACL_PREFIXES}<#editors> vcard:hasMember <{USER1}>, <{USER2}> ."
        ))
        .send(&pod.service)
        .await
        .assert_status(StatusCode::CREATED);

    TestRequest::get("/team/plan.ttl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);

    TestRequest::delete("/groups.ttl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);

    TestRequest::get("/team/plan.ttl")
        .as_user(User::Two)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

/// ## Summary
/// Groups published outside the pod are dereferenced, with `foaf:member` accepted.
#[test_log::test(tokio::test)]
async fn remote_groups_are_dereferenced() {
    let pod = TestPod::new();
    pod.remote.publish(
        REMOTE_GROUPS,
        &format!("{ACL_PREFIXES}<#crew> foaf:member <{USER1}> ."),
    );
    pod.seed_acl(
        "/crew/.acl",
        &format!(
            "<#crew> acl:accessTo <./> ; acl:defaultForNew <./> ;
                acl:agentClass <{REMOTE_GROUPS}#crew> ; acl:mode acl:Read ."
        ),
    )
    .await;
    pod.seed("/crew/log.ttl", "<#log> <#p> \"l\" .").await;

    TestRequest::get("/crew/log.ttl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::OK);

    TestRequest::get("/crew/log.ttl")
        .as_user(User::Two)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

/// ## Summary
/// An unreachable group document means nobody is a member.
#[test_log::test(tokio::test)]
async fn unreachable_group_grants_nothing() {
    let pod = TestPod::new();
    pod.seed_acl(
        "/crew/.acl",
        "<#crew> acl:accessTo <./> ; acl:defaultForNew <./> ;
            acl:agentGroup <https://gone.example.org/team#crew> ; acl:mode acl:Read .",
    )
    .await;
    pod.seed("/crew/log.ttl", "<#log> <#p> \"l\" .").await;

    TestRequest::get("/crew/log.ttl")
        .as_user(User::One)
        .send(&pod.service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

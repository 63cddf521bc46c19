#![allow(clippy::unwrap_used)]
// End-to-end aggregation tests against a wiremock upstream.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rbxfolio_api::{Endpoints, RetryPolicy};
use rbxfolio_core::{
    Aggregator, AggregatorConfig, CoreError, OwnershipPolicy, SubResourceView,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Aggregator) {
    setup_with(|_| {}).await
}

async fn setup_with(adjust: impl FnOnce(&mut AggregatorConfig)) -> (MockServer, Aggregator) {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();

    let mut config = AggregatorConfig::new(Endpoints::single_host(&base).unwrap());
    config.retry = RetryPolicy {
        max_retries: 1,
        base_delay: Duration::from_millis(1),
    };
    adjust(&mut config);

    Mock::given(method("POST"))
        .and(path("/v2/logout"))
        .respond_with(ResponseTemplate::new(403).insert_header("x-csrf-token", "tok"))
        .mount(&server)
        .await;

    let aggregator = Aggregator::connect(&config).unwrap();
    (server, aggregator)
}

fn game(id: u64, creator_type: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Game {id}"),
        "creator": { "id": 42, "type": creator_type },
        "rootPlace": { "id": id * 10, "type": "Place" },
        "placeVisits": id * 100
    })
}

fn page(data: Vec<Value>, next: Option<&str>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "previousPageCursor": null,
        "nextPageCursor": next,
        "data": data
    }))
}

fn membership(group_id: u64, rank: u8) -> Value {
    json!({
        "group": { "id": group_id, "name": format!("Group {group_id}"), "memberCount": group_id * 3 },
        "role": { "id": 1, "name": if rank == 255 { "Owner" } else { "Member" }, "rank": rank }
    })
}

async fn mount_username(server: &MockServer, name: &str, id: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/usernames/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "requestedUsername": name, "id": id, "name": name, "displayName": name }]
        })))
        .mount(server)
        .await;
}

async fn mount_user_games(server: &MockServer, user_id: u64, games: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/users/{user_id}/games")))
        .respond_with(page(games, None))
        .mount(server)
        .await;
}

async fn mount_roles(server: &MockServer, user_id: u64, roles: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/users/{user_id}/groups/roles")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": roles })))
        .mount(server)
        .await;
}

async fn mount_group_games(server: &MockServer, group_id: u64, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/groups/{group_id}/gamesV2")))
        .and(query_param("accessFilter", "2"))
        .respond_with(response)
        .mount(server)
        .await;
}

// ── Resource listing ────────────────────────────────────────────────

#[tokio::test]
async fn test_alice_end_to_end() {
    let (server, aggregator) = setup().await;
    mount_username(&server, "alice", 42).await;

    // Profile games: 50 on the first page, 10 user games plus one
    // group-created game on the second.
    let first: Vec<Value> = (1..=50).map(|id| game(id, "User")).collect();
    let mut second: Vec<Value> = (51..=60).map(|id| game(id, "User")).collect();
    second.push(game(999, "Group"));

    Mock::given(method("GET"))
        .and(path("/v2/users/42/games"))
        .and(query_param("cursor", "p2"))
        .respond_with(page(second, None))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/users/42/games"))
        .and(query_param("cursor", ""))
        .respond_with(page(first, Some("p2")))
        .expect(1)
        .mount(&server)
        .await;

    mount_roles(&server, 42, vec![membership(7, 255), membership(8, 100)]).await;
    mount_group_games(&server, 7, ResponseTemplate::new(500)).await;
    Mock::given(method("GET"))
        .and(path("/v2/groups/8/gamesV2"))
        .respond_with(page(vec![game(800, "Group")], None))
        .expect(0)
        .mount(&server)
        .await;

    let listing = aggregator.list_resources("alice").await.unwrap();

    assert_eq!(listing.identity_name, "alice");
    assert_eq!(listing.identity_id, 42);
    assert_eq!(listing.total_resources, 60);
    assert_eq!(listing.resources.len(), 60);
    assert_eq!(listing.owned_groups.len(), 1);
    assert_eq!(listing.owned_groups[0].group_id, 7);
    assert_eq!(listing.owned_groups[0].role, "Owner");

    let first_entry = &listing.resources[0];
    assert_eq!(first_entry.resource_id, 1);
    assert_eq!(first_entry.root_resource_id, Some(10));
    assert_eq!(first_entry.metric, 100);
    assert_eq!(
        first_entry.icon_ref,
        "rbxthumb://type=GameIcon&id=1&w=150&h=150"
    );
    assert!(listing.resources.iter().all(|r| r.resource_id != 999));
}

#[tokio::test]
async fn test_failed_group_is_isolated() {
    let (server, aggregator) = setup().await;
    mount_user_games(&server, 5, Vec::new()).await;
    mount_roles(
        &server,
        5,
        vec![membership(1, 255), membership(2, 255), membership(3, 255)],
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/users/5$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5, "name": "carol", "displayName": "Carol"
        })))
        .mount(&server)
        .await;

    mount_group_games(&server, 1, page(vec![game(100, "Group")], None)).await;
    mount_group_games(&server, 2, ResponseTemplate::new(503)).await;
    mount_group_games(&server, 3, page(vec![game(300, "Group")], None)).await;

    let listing = aggregator.list_resources("5").await.unwrap();

    let ids: Vec<u64> = listing.resources.iter().map(|r| r.resource_id).collect();
    assert_eq!(ids, vec![100, 300]);
    assert_eq!(listing.owned_groups.len(), 3);
    assert_eq!(listing.identity_name, "carol");
}

#[tokio::test]
async fn test_delegate_policy_admits_rank_254() {
    let (server, aggregator) =
        setup_with(|config| config.ownership = OwnershipPolicy::OwnerOrDelegate).await;
    mount_username(&server, "dave", 9).await;
    mount_user_games(&server, 9, Vec::new()).await;
    mount_roles(
        &server,
        9,
        vec![membership(1, 254), membership(2, 253), membership(3, 255)],
    )
    .await;
    mount_group_games(&server, 1, page(Vec::new(), None)).await;
    mount_group_games(&server, 3, page(Vec::new(), None)).await;

    let listing = aggregator.list_resources("dave").await.unwrap();

    let groups: Vec<u64> = listing.owned_groups.iter().map(|g| g.group_id).collect();
    assert_eq!(groups, vec![1, 3]);
}

#[tokio::test]
async fn test_level_one_failure_surfaces() {
    let (server, aggregator) = setup().await;
    mount_username(&server, "erin", 11).await;
    mount_user_games(&server, 11, Vec::new()).await;
    Mock::given(method("GET"))
        .and(path("/v1/users/11/groups/roles"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;

    let result = aggregator.list_resources("erin").await;

    assert!(matches!(
        result,
        Err(CoreError::Rejected { status: 400, .. })
    ));
}

#[tokio::test]
async fn test_repeat_listing_is_served_from_cache() {
    let (server, aggregator) = setup().await;
    Mock::given(method("POST"))
        .and(path("/v1/usernames/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": 42, "name": "alice" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/users/42/games"))
        .respond_with(page(vec![game(1, "User")], None))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/users/42/groups/roles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let first = aggregator.list_resources("alice").await.unwrap();
    // Username keys are case-insensitive.
    let second = aggregator.list_resources("ALICE").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_budget_exceeded_is_timeout() {
    let (server, aggregator) =
        setup_with(|config| config.request_timeout = Duration::from_millis(200)).await;
    mount_username(&server, "slow", 3).await;
    Mock::given(method("GET"))
        .and(path("/v2/users/3/games"))
        .respond_with(page(Vec::new(), None).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    mount_roles(&server, 3, Vec::new()).await;

    let err = aggregator.list_resources("slow").await.unwrap_err();

    assert!(matches!(err, CoreError::Timeout { .. }));
    assert_eq!(err.status_code(), 504);
}

// ── Identity resolution ─────────────────────────────────────────────

#[tokio::test]
async fn test_numeric_input_uses_direct_lookup() {
    let (server, aggregator) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1/users/123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 123, "name": "numbers", "displayName": "Numbers"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/usernames/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let identity = aggregator.resolve_identity("123").await.unwrap();

    assert_eq!(identity.id, 123);
    assert_eq!(identity.display_name, "Numbers");
}

#[tokio::test]
async fn test_mixed_input_uses_name_lookup() {
    let (server, aggregator) = setup().await;
    mount_username(&server, "bob123abc", 77).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/users/\d+$"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let identity = aggregator.resolve_identity("bob123abc").await.unwrap();

    assert_eq!(identity.id, 77);
    assert_eq!(identity.name, "bob123abc");
}

#[tokio::test]
async fn test_unknown_username_is_not_found() {
    let (server, aggregator) = setup().await;
    Mock::given(method("POST"))
        .and(path("/v1/usernames/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let err = aggregator.list_resources("nobody").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let (server, aggregator) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1/users/404404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{ "code": 3, "message": "The user id is invalid." }]
        })))
        .mount(&server)
        .await;

    let err = aggregator.resolve_identity("404404").await.unwrap_err();

    assert!(matches!(err, CoreError::NotFound { ref identifier } if identifier == "404404"));
}

// ── Sub-resource listing ────────────────────────────────────────────

async fn mount_pass_fixtures(server: &MockServer) {
    mount_username(server, "alice", 42).await;
    mount_user_games(
        server,
        42,
        vec![game(100, "User"), game(200, "User"), game(300, "User")],
    )
    .await;
    mount_roles(server, 42, Vec::new()).await;

    Mock::given(method("GET"))
        .and(path("/v1/games/100/game-passes"))
        .respond_with(page(
            vec![
                json!({ "id": 1, "name": "VIP", "displayName": "VIP", "productId": 11, "price": 100 }),
                json!({ "id": 2, "name": "Retired", "displayName": "Retired", "productId": null, "price": null }),
            ],
            None,
        ))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/games/200/game-passes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/games/300/game-passes"))
        .respond_with(page(Vec::new(), None))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sub_resources_keep_failed_games() {
    let (server, aggregator) = setup().await;
    mount_pass_fixtures(&server).await;

    let listing = aggregator
        .list_sub_resources("alice", SubResourceView::All)
        .await
        .unwrap();

    assert_eq!(listing.total_resources_with_sub_resources, 3);
    assert_eq!(listing.total_sub_resources, 2);

    let counts: Vec<(u64, usize)> = listing
        .resources
        .iter()
        .map(|r| (r.resource_id, r.sub_resources.len()))
        .collect();
    assert_eq!(counts, vec![(100, 2), (200, 0), (300, 0)]);
    assert_eq!(listing.resources[0].sub_resources[1].price, None);

    let body = serde_json::to_value(&listing).unwrap();
    assert_eq!(body["identityName"], "alice");
    assert_eq!(body["resources"][0]["subResources"][0]["price"], 100);
}

#[tokio::test]
async fn test_non_empty_view_drops_games_without_passes() {
    let (server, aggregator) = setup().await;
    mount_pass_fixtures(&server).await;

    let listing = aggregator
        .list_sub_resources("alice", SubResourceView::NonEmpty)
        .await
        .unwrap();

    assert_eq!(listing.total_resources_with_sub_resources, 1);
    assert_eq!(listing.total_sub_resources, 2);
    assert_eq!(listing.resources[0].name, "Game 100");
}

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use super::support::{
    create_property, create_reservation, json_body, seed_other_org, dispatch, setup_tenant,
};

#[tokio::test]
async fn admins_can_create_and_update_properties() {
    let fixture = setup_tenant().await;

    let created =
        create_property(&fixture, "Harbour Cottage", "1 Quay Lane", Some("Sleeps four")).await;
    assert_eq!(created["name"], "Harbour Cottage");
    assert_eq!(created["address"], "1 Quay Lane");
    assert_eq!(created["description"], "Sleeps four");
    assert_eq!(created["orgId"], json!(fixture.org_id.as_str()));
    let id = created["id"].as_str().expect("property id");

    let path = fixture.path(&format!("/properties/{}", id));
    let response = dispatch(
        &fixture.app,
        Method::PUT,
        &path,
        Some(&fixture.admin_cookie),
        Some(json!({ "name": "Harbour House", "address": "2 Quay Lane" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response).await;
    assert_eq!(body["data"]["name"], "Harbour House");
    assert_eq!(body["data"]["address"], "2 Quay Lane");
    // Updates replace the whole record; an omitted description clears it.
    assert_eq!(body["data"]["description"], Value::Null);
}

#[tokio::test]
async fn property_listing_is_scoped_to_the_organization() {
    let fixture = setup_tenant().await;
    create_property(&fixture, "Harbour Cottage", "1 Quay Lane", None).await;
    create_property(&fixture, "Hillside Loft", "9 Ridge Road", None).await;

    let (other_org, other_cookie) =
        seed_other_org(&fixture.app, "Mountain Lodges", "rival@example.com").await;
    let response = dispatch(
        &fixture.app,
        Method::POST,
        &format!("/api/v1/orgs/{}/properties", other_org),
        Some(&other_cookie),
        Some(json!({ "name": "Summit Cabin", "address": "1 Peak Way" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = dispatch(
        &fixture.app,
        Method::GET,
        &fixture.path("/properties"),
        Some(&fixture.member_cookie),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .expect("property list")
        .iter()
        .map(|p| p["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, ["Harbour Cottage", "Hillside Loft"]);
}

#[tokio::test]
async fn properties_in_other_orgs_read_as_not_found() {
    let fixture = setup_tenant().await;
    let (other_org, other_cookie) =
        seed_other_org(&fixture.app, "Mountain Lodges", "rival@example.com").await;

    let response = dispatch(
        &fixture.app,
        Method::POST,
        &format!("/api/v1/orgs/{}/properties", other_org),
        Some(&other_cookie),
        Some(json!({ "name": "Summit Cabin", "address": "1 Peak Way" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = json_body(response).await;
    let foreign_id = body["data"]["id"].as_str().expect("property id").to_string();

    // A real id, but the wrong tenant: indistinguishable from absent.
    let path = fixture.path(&format!("/properties/{}", foreign_id));
    let response =
        dispatch(&fixture.app, Method::GET, &path, Some(&fixture.owner_cookie), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response).await;
    assert_eq!(body["error"], json!(format!("property not found: {}", foreign_id)));
}

#[tokio::test]
async fn updating_a_missing_property_is_not_found() {
    let fixture = setup_tenant().await;

    let path = fixture.path("/properties/no-such-property");
    let response = dispatch(
        &fixture.app,
        Method::PUT,
        &path,
        Some(&fixture.admin_cookie),
        Some(json!({ "name": "Harbour House", "address": "2 Quay Lane" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response).await;
    assert_eq!(body["error"], "property not found: no-such-property");
}

#[tokio::test]
async fn members_cannot_write_properties() {
    let fixture = setup_tenant().await;
    let created = create_property(&fixture, "Harbour Cottage", "1 Quay Lane", None).await;
    let id = created["id"].as_str().expect("property id");

    let path = fixture.path(&format!("/properties/{}", id));
    let response = dispatch(
        &fixture.app,
        Method::PUT,
        &path,
        Some(&fixture.member_cookie),
        Some(json!({ "name": "Renamed", "address": "Nowhere" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response =
        dispatch(&fixture.app, Method::DELETE, &path, Some(&fixture.member_cookie), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = json_body(response).await;
    assert_eq!(body["error"], "Insufficient role");
}

#[tokio::test]
async fn deleting_a_property_requires_owner() {
    let fixture = setup_tenant().await;
    let created = create_property(&fixture, "Harbour Cottage", "1 Quay Lane", None).await;
    let id = created["id"].as_str().expect("property id");
    let path = fixture.path(&format!("/properties/{}", id));

    let response =
        dispatch(&fixture.app, Method::DELETE, &path, Some(&fixture.admin_cookie), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response =
        dispatch(&fixture.app, Method::DELETE, &path, Some(&fixture.owner_cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response).await;
    assert_eq!(body, json!({ "ok": true }));

    let response =
        dispatch(&fixture.app, Method::GET, &path, Some(&fixture.owner_cookie), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_property_cascades_to_reservations() {
    let fixture = setup_tenant().await;
    let created = create_property(&fixture, "Harbour Cottage", "1 Quay Lane", None).await;
    let property_id = created["id"].as_str().expect("property id").to_string();

    let reservation =
        create_reservation(&fixture, &property_id, "Alex Morgan", "2026-09-12", "2026-09-15").await;
    let reservation_id = reservation["id"].as_str().expect("reservation id").to_string();

    let path = fixture.path(&format!("/properties/{}", property_id));
    let response =
        dispatch(&fixture.app, Method::DELETE, &path, Some(&fixture.owner_cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let path = fixture.path(&format!("/reservations/{}", reservation_id));
    let response =
        dispatch(&fixture.app, Method::GET, &path, Some(&fixture.owner_cookie), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reservations")
        .fetch_one(&fixture.app.pool)
        .await
        .expect("count reservations");
    assert_eq!(remaining, 0);
}

mod common;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use serde_json::{Value, json};

use api_server::build_app;

#[actix_rt::test]
async fn create_list_update_delete() {
    let app = test::init_service(build_app(common::state(common::config()))).await;

    let res = test::call_service(&app, common::new_cat("Miso").to_request()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["message"], "Cat added successfully");
    let id = body["id"].as_i64().unwrap();

    let cats: Value =
        test::call_and_read_body_json(&app, TestRequest::get().uri("/cats").to_request()).await;
    assert_eq!(
        cats,
        json!([{ "id": id, "name": "Miso", "tag": "tabby", "pfp": null }])
    );

    let req = TestRequest::put()
        .uri(&format!("/cats/{}", id))
        .set_json(json!({ "name": "Tofu", "id": 99, "owner": "someone" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body["message"],
        format!("Record Num: {} updated successfully", id)
    );

    let cat: Value = test::call_and_read_body_json(
        &app,
        TestRequest::get().uri(&format!("/cats/{}", id)).to_request(),
    )
    .await;
    assert_eq!(cat["id"], id);
    assert_eq!(cat["name"], "Tofu");
    assert_eq!(cat["tag"], "tabby");

    let req = TestRequest::delete().uri(&format!("/cats/{}", id)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body["message"],
        format!("Record Num: {} deleted successfully", id)
    );

    let req = TestRequest::get().uri(&format!("/cats/{}", id)).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn rejects_invalid_cat_input() {
    let app = test::init_service(build_app(common::state(common::config()))).await;

    let req = TestRequest::post()
        .uri("/cats")
        .set_json(json!({ "tag": "orange" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({ "error": "Name is required" }));

    let cats: Value =
        test::call_and_read_body_json(&app, TestRequest::get().uri("/cats").to_request()).await;
    assert_eq!(cats, json!([]));

    let req = TestRequest::post()
        .uri("/cats")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));

    test::call_service(&app, common::new_cat("Miso").to_request()).await;

    let req = TestRequest::put().uri("/cats/1").set_json(json!({})).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["error"], "No fields provided for update.");

    let req = TestRequest::put()
        .uri("/cats/1")
        .set_json(json!({ "color": "black" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "No valid fields provided for update.");

    let res = test::call_service(&app, TestRequest::get().uri("/cats/abc").to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = test::call_service(
        &app,
        TestRequest::get().uri("/cats?page=0").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn missing_cats_are_not_found() {
    let app = test::init_service(build_app(common::state(common::config()))).await;

    let req = TestRequest::put()
        .uri("/cats/42")
        .set_json(json!({ "name": "Ghost" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({ "error": "Cat not found" }));

    let res = test::call_service(&app, TestRequest::delete().uri("/cats/42").to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn paginates_when_asked() {
    let app = test::init_service(build_app(common::state(common::config()))).await;

    for n in 1..=25 {
        let res = test::call_service(&app, common::new_cat(&format!("Cat {}", n)).to_request()).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let page: Value = test::call_and_read_body_json(
        &app,
        TestRequest::get().uri("/cats?page=3&limit=10").to_request(),
    )
    .await;
    assert_eq!(page["cats"].as_array().unwrap().len(), 5);
    assert_eq!(page["cats"][0]["name"], "Cat 21");
    assert_eq!(
        page["pagination"],
        json!({ "page": 3, "limit": 10, "total": 25, "totalPages": 3 })
    );

    let past_end: Value = test::call_and_read_body_json(
        &app,
        TestRequest::get().uri("/cats?page=4&limit=10").to_request(),
    )
    .await;
    assert_eq!(past_end["cats"], json!([]));
    assert_eq!(past_end["pagination"]["total"], 25);

    let defaults: Value = test::call_and_read_body_json(
        &app,
        TestRequest::get().uri("/cats?page=1").to_request(),
    )
    .await;
    assert_eq!(defaults["cats"].as_array().unwrap().len(), 10);

    let all: Value =
        test::call_and_read_body_json(&app, TestRequest::get().uri("/cats").to_request()).await;
    assert_eq!(all.as_array().unwrap().len(), 25);
}

#[actix_rt::test]
async fn accepts_form_bodies_and_api_prefix() {
    let app = test::init_service(build_app(common::state(common::config()))).await;

    let req = TestRequest::post()
        .uri("/api/cats")
        .set_form(vec![("name", "Biscuit"), ("pfp", "https://example.com/b.png")])
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let cats: Value =
        test::call_and_read_body_json(&app, TestRequest::get().uri("/cats").to_request()).await;
    assert_eq!(cats[0]["name"], "Biscuit");
    assert_eq!(cats[0]["tag"], Value::Null);
    assert_eq!(cats[0]["pfp"], "https://example.com/b.png");

    let health: Value =
        test::call_and_read_body_json(&app, TestRequest::get().uri("/api/health").to_request())
            .await;
    assert_eq!(health["status"], "ok");
}

#[actix_rt::test]
async fn protected_writes_need_a_session() {
    let mut config = common::config();
    config.cats.write_requires_auth = true;
    let app = test::init_service(build_app(common::state(config))).await;

    let res = test::call_service(&app, common::new_cat("Miso").to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "Authentication required");

    test::call_service(&app, common::register("alice").to_request()).await;
    let res = test::call_service(&app, common::login("alice").to_request()).await;
    let cookie = common::session_cookie(&res);

    let req = common::new_cat("Miso").cookie(cookie.clone()).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    // reads stay public
    let res = test::call_service(&app, TestRequest::get().uri("/cats").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}

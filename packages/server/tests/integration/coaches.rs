use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn creates_user_profile_and_coach_details_together() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let cat = app.create_category(&admin, "U13").await;

    let res = app.create_coach(&admin, "marta", &[cat]).await;

    assert_eq!(res.body["user"]["role"], "COACH");
    assert_eq!(res.body["profile"]["profile_type"], "COACH");
    assert_eq!(res.body["coach_profile"]["category_ids"], json!([cat]));
    assert_eq!(
        res.body["coach_profile"]["profile_id"],
        res.body["profile"]["id"]
    );

    let token = app.login("marta", "coachpass").await.body["token"]
        .as_str()
        .unwrap()
        .to_string();
    let me = app.get_with_token(routes::ME, &token).await;
    assert_eq!(me.body["is_coach"], true);
    assert_eq!(me.body["is_admin"], false);
}

#[tokio::test]
async fn unknown_category_rolls_back_the_whole_account() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;

    let res = app
        .post_with_token(
            routes::COACHES,
            &json!({
                "username": "marta",
                "password": "coachpass",
                "first_name": "Marta",
                "last_name": "Gómez",
                "document_type": "DNI",
                "category_ids": [12345],
            }),
            &admin,
        )
        .await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["message"], "Categories with IDs 12345 not found");

    // The username is free again, so nothing was committed.
    let retry = app.create_coach(&admin, "marta", &[]).await;
    assert_eq!(retry.status, 201);

    let list = app
        .get_with_token(&format!("{}?search=marta", routes::USERS), &admin)
        .await;
    assert_eq!(list.body["pagination"]["total"], 1);
}

#[tokio::test]
async fn duplicate_category_ids_are_rejected_up_front() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let cat = app.create_category(&admin, "U13").await;

    let res = app
        .post_with_token(
            routes::COACHES,
            &json!({
                "username": "marta",
                "password": "coachpass",
                "first_name": "Marta",
                "last_name": "Gómez",
                "document_type": "DNI",
                "category_ids": [cat, cat],
            }),
            &admin,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

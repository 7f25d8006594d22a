use common::UserRole;
use serde_json::{Value, json};

use crate::common::{TestApp, routes};

fn player_body(profile_id: i32) -> Value {
    json!({
        "profile_id": profile_id,
        "first_name": "Tomás",
        "last_name": "Ruiz",
        "email": "tomas@example.com",
        "document": "40999888",
        "document_type": "DNI",
    })
}

mod create_profile {
    use super::*;

    #[tokio::test]
    async fn admin_profile_auto_provisions_coach_with_username_defaults() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let admin_id = app.db_user("admin").await.id;

        let profile_id = app.create_profile(&admin, admin_id, "ADMIN").await;

        let res = app.get_with_token(&routes::profile(profile_id), &admin).await;
        assert_eq!(res.status, 200, "{}", res.text);
        let coach = &res.body["coach_profile"];
        assert_eq!(coach["first_name"], "admin");
        assert_eq!(coach["last_name"], "");
        assert_eq!(coach["document_type"], "N/A");
        assert!(coach["document"].is_null());
        assert_eq!(coach["category_ids"], json!([]));

        let me = app.get_with_token(routes::ME, &admin).await;
        assert_eq!(me.body["is_admin"], true);
        assert_eq!(me.body["is_coach"], true);
        assert_eq!(me.body["coach_profile_id"], coach["id"]);
    }

    #[tokio::test]
    async fn administrators_get_exactly_one_coach_per_profile() {
        let app = TestApp::spawn().await;
        let master = app
            .create_user_with_role("root", "rootpass", UserRole::Master)
            .await;
        let root_id = app.db_user("root").await.id;

        app.create_profile(&master, root_id, "PLAYER").await;
        app.create_profile(&master, root_id, "OTHER").await;
        let again = app
            .post_with_token(
                routes::PROFILES,
                &json!({"user_id": root_id, "profile_type": "OTHER"}),
                &master,
            )
            .await;
        assert_eq!(again.status, 409);

        let res = app
            .get_with_token(&routes::user_profiles(root_id), &master)
            .await;
        let profiles = res.body.as_array().expect("profile list");
        assert_eq!(profiles.len(), 2);
        for profile in profiles {
            assert!(
                profile["coach_profile"].is_object(),
                "missing coach for {profile}"
            );
        }
    }

    #[tokio::test]
    async fn provisioning_fields_override_defaults() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let admin_id = app.db_user("admin").await.id;
        let cat = app.create_category(&admin, "U13").await;

        let res = app
            .post_with_token(
                routes::PROFILES,
                &json!({
                    "user_id": admin_id,
                    "profile_type": "ADMIN",
                    "first_name": "Ana",
                    "last_name": "Sosa",
                    "document_type": "PASSPORT",
                    "document": "X123",
                    "category_ids": [cat],
                }),
                &admin,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let detail = app.get_with_token(&routes::profile(res.id()), &admin).await;
        let coach = &detail.body["coach_profile"];
        assert_eq!(coach["first_name"], "Ana");
        assert_eq!(coach["document_type"], "PASSPORT");
        assert_eq!(coach["document"], "X123");
        assert_eq!(coach["category_ids"], json!([cat]));
    }

    #[tokio::test]
    async fn blank_provisioning_fields_use_defaults() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let admin_id = app.db_user("admin").await.id;

        let res = app
            .post_with_token(
                routes::PROFILES,
                &json!({
                    "user_id": admin_id,
                    "profile_type": "ADMIN",
                    "first_name": "",
                    "document_type": "",
                }),
                &admin,
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let detail = app.get_with_token(&routes::profile(res.id()), &admin).await;
        let coach = &detail.body["coach_profile"];
        assert_eq!(coach["first_name"], "admin");
        assert_eq!(coach["document_type"], "N/A");
    }

    #[tokio::test]
    async fn unused_blank_fields_do_not_reject_a_player_profile() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let alice = app.register("alice", "secret1").await;

        let res = app
            .post_with_token(
                routes::PROFILES,
                &json!({"user_id": alice, "profile_type": "PLAYER", "first_name": ""}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn concurrent_duplicates_yield_one_conflict() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let alice = app.register("alice", "secret1").await;
        let body = json!({"user_id": alice, "profile_type": "PLAYER"});

        let (first, second) = tokio::join!(
            app.post_with_token(routes::PROFILES, &body, &admin),
            app.post_with_token(routes::PROFILES, &body, &admin),
        );

        let mut statuses = [first.status, second.status];
        statuses.sort_unstable();
        assert_eq!(statuses, [201, 409], "{} / {}", first.text, second.text);

        let res = app.get_with_token(&routes::user_profiles(alice), &admin).await;
        assert_eq!(res.body.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn coach_role_user_is_not_auto_provisioned() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let carl = app.register("carl", "secret1").await;

        let profile_id = app.create_profile(&admin, carl, "COACH").await;

        let res = app.get_with_token(&routes::profile(profile_id), &admin).await;
        assert!(res.body["coach_profile"].is_null());
    }

    #[tokio::test]
    async fn duplicate_profile_type_conflicts() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let alice = app.register("alice", "secret1").await;
        app.create_profile(&admin, alice, "PLAYER").await;

        let res = app
            .post_with_token(
                routes::PROFILES,
                &json!({"user_id": alice, "profile_type": "PLAYER"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn unknown_references_are_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let alice = app.register("alice", "secret1").await;

        let no_user = app
            .post_with_token(
                routes::PROFILES,
                &json!({"user_id": 4242, "profile_type": "PLAYER"}),
                &admin,
            )
            .await;
        assert_eq!(no_user.status, 404);
        assert_eq!(no_user.body["message"], "User with ID 4242 not found");

        let no_category = app
            .post_with_token(
                routes::PROFILES,
                &json!({"user_id": alice, "profile_type": "PLAYER", "category_id": 77}),
                &admin,
            )
            .await;
        assert_eq!(no_category.status, 404);
        assert_eq!(no_category.body["message"], "Category with ID 77 not found");

        let no_coach = app
            .post_with_token(
                routes::PROFILES,
                &json!({"user_id": alice, "profile_type": "PLAYER", "coach_profile_id": 55}),
                &admin,
            )
            .await;
        assert_eq!(no_coach.status, 404);
        assert_eq!(no_coach.body["message"], "CoachProfile with ID 55 not found");
    }

    #[tokio::test]
    async fn player_can_be_assigned_to_an_existing_coach() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let cat = app.create_category(&admin, "U15").await;
        let coach = app.create_coach(&admin, "marta", &[cat]).await;
        let coach_id = coach.body["coach_profile"]["id"].clone();
        let alice = app.register("alice", "secret1").await;

        let res = app
            .post_with_token(
                routes::PROFILES,
                &json!({
                    "user_id": alice,
                    "profile_type": "PLAYER",
                    "category_id": cat,
                    "coach_profile_id": coach_id,
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["coach_profile_id"], coach_id);
        assert_eq!(res.body["category_id"], cat);
    }

    #[tokio::test]
    async fn requires_admin() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("alice", "secret1", UserRole::Player)
            .await;
        let alice = app.db_user("alice").await.id;

        let res = app
            .post_with_token(
                routes::PROFILES,
                &json!({"user_id": alice, "profile_type": "PLAYER"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 403);
    }
}

mod player_profiles {
    use super::*;

    #[tokio::test]
    async fn player_details_require_a_player_profile() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let carl = app.register("carl", "secret1").await;
        let profile_id = app.create_profile(&admin, carl, "COACH").await;

        let res = app
            .post_with_token(routes::PLAYER_PROFILES, &player_body(profile_id), &admin)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn second_player_detail_conflicts() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let alice = app.register("alice", "secret1").await;
        let profile_id = app.create_profile(&admin, alice, "PLAYER").await;

        let first = app
            .post_with_token(routes::PLAYER_PROFILES, &player_body(profile_id), &admin)
            .await;
        assert_eq!(first.status, 201, "{}", first.text);
        assert_eq!(first.body["is_active"], false);
        assert!(first.body["family_contact"].is_null());

        let second = app
            .post_with_token(routes::PLAYER_PROFILES, &player_body(profile_id), &admin)
            .await;
        assert_eq!(second.status, 409);
    }

    #[tokio::test]
    async fn missing_profile_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;

        let res = app
            .post_with_token(routes::PLAYER_PROFILES, &player_body(31337), &admin)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "Profile with ID 31337 not found");
    }

    #[tokio::test]
    async fn coaches_may_activate_players_but_players_may_not() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let coach = app.create_coach(&admin, "marta", &[]).await;
        let coach_token = app.login("marta", "coachpass").await.body["token"]
            .as_str()
            .unwrap()
            .to_string();
        assert_eq!(coach.status, 201);

        let player_token = app
            .create_user_with_role("alice", "secret1", UserRole::Player)
            .await;
        let alice = app.db_user("alice").await.id;
        let profile_id = app.create_profile(&admin, alice, "PLAYER").await;
        let player = app
            .post_with_token(routes::PLAYER_PROFILES, &player_body(profile_id), &admin)
            .await;
        let player_id = player.id();

        let denied = app
            .patch_with_token(
                &routes::player_profile(player_id),
                &json!({"is_active": true}),
                &player_token,
            )
            .await;
        assert_eq!(denied.status, 403);

        let res = app
            .patch_with_token(
                &routes::player_profile(player_id),
                &json!({"is_active": true, "family_contact": "+54 11 5555", "birth_date": "2012-01-31"}),
                &coach_token,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["is_active"], true);
        assert_eq!(res.body["family_contact"], "+54 11 5555");
        assert_eq!(res.body["birth_date"], "2012-01-31");
        assert_eq!(res.body["first_name"], "Tomás");

        let cleared = app
            .patch_with_token(
                &routes::player_profile(player_id),
                &json!({"is_active": false, "birth_date": null}),
                &admin,
            )
            .await;
        assert_eq!(cleared.body["is_active"], false);
        assert!(cleared.body["birth_date"].is_null());
    }
}

mod coach_profiles {
    use super::*;

    #[tokio::test]
    async fn coach_details_rejected_for_player_profile_of_regular_user() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let alice = app.register("alice", "secret1").await;
        let profile_id = app.create_profile(&admin, alice, "PLAYER").await;

        let res = app
            .post_with_token(
                routes::COACH_PROFILES,
                &json!({
                    "profile_id": profile_id,
                    "first_name": "Ali",
                    "last_name": "Ce",
                    "document_type": "DNI",
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn missing_categories_are_reported_together() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let carl = app.register("carl", "secret1").await;
        let profile_id = app.create_profile(&admin, carl, "COACH").await;
        let cat = app.create_category(&admin, "U17").await;

        let res = app
            .post_with_token(
                routes::COACH_PROFILES,
                &json!({
                    "profile_id": profile_id,
                    "first_name": "Carl",
                    "last_name": "Ortiz",
                    "document_type": "DNI",
                    "category_ids": [98, cat, 99],
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "Categories with IDs 98, 99 not found");
    }

    #[tokio::test]
    async fn second_coach_detail_conflicts() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let carl = app.register("carl", "secret1").await;
        let profile_id = app.create_profile(&admin, carl, "COACH").await;
        let body = json!({
            "profile_id": profile_id,
            "first_name": "Carl",
            "last_name": "Ortiz",
            "document_type": "DNI",
        });

        let first = app
            .post_with_token(routes::COACH_PROFILES, &body, &admin)
            .await;
        assert_eq!(first.status, 201, "{}", first.text);

        let second = app
            .post_with_token(routes::COACH_PROFILES, &body, &admin)
            .await;
        assert_eq!(second.status, 409);
    }

    #[tokio::test]
    async fn category_set_replace_clear_and_failed_replace() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let c1 = app.create_category(&admin, "U9").await;
        let c2 = app.create_category(&admin, "U11").await;
        let coach = app.create_coach(&admin, "marta", &[c1]).await;
        let coach_id = coach.body["coach_profile"]["id"].as_i64().unwrap() as i32;
        let path = routes::coach_profile(coach_id);

        let replaced = app
            .patch_with_token(&path, &json!({"category_ids": [c2, c1]}), &admin)
            .await;
        assert_eq!(replaced.status, 200, "{}", replaced.text);

        let failed = app
            .patch_with_token(
                &path,
                &json!({"category_ids": [c1, 9999], "first_name": "Changed"}),
                &admin,
            )
            .await;
        assert_eq!(failed.status, 404);
        assert_eq!(failed.body["message"], "Categories with IDs 9999 not found");

        let current = app.get_with_token(&path, &admin).await;
        let mut ids: Vec<i64> = current.body["category_ids"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_i64)
            .collect();
        ids.sort();
        assert_eq!(ids, vec![c1 as i64, c2 as i64]);
        assert_eq!(current.body["first_name"], "Marta");

        let untouched = app
            .patch_with_token(&path, &json!({"last_name": "López"}), &admin)
            .await;
        assert_eq!(untouched.body["category_ids"].as_array().map(Vec::len), Some(2));

        let cleared = app
            .patch_with_token(&path, &json!({"category_ids": []}), &admin)
            .await;
        assert_eq!(cleared.status, 200, "{}", cleared.text);
        assert_eq!(cleared.body["category_ids"], json!([]));

        app.patch_with_token(&path, &json!({"category_ids": [c1]}), &admin)
            .await;
        let nulled = app
            .patch_with_token(&path, &json!({"category_ids": null}), &admin)
            .await;
        assert_eq!(nulled.body["category_ids"], json!([]));
    }
}

mod update_profile {
    use super::*;

    #[tokio::test]
    async fn changing_type_onto_a_held_type_conflicts() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let alice = app.register("alice", "secret1").await;
        app.create_profile(&admin, alice, "PLAYER").await;
        let other = app.create_profile(&admin, alice, "OTHER").await;

        let res = app
            .patch_with_token(&routes::profile(other), &json!({"profile_type": "PLAYER"}), &admin)
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn profile_with_player_details_keeps_its_type() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let alice = app.register("alice", "secret1").await;
        let profile_id = app.create_profile(&admin, alice, "PLAYER").await;
        app.post_with_token(routes::PLAYER_PROFILES, &player_body(profile_id), &admin)
            .await;

        let res = app
            .patch_with_token(
                &routes::profile(profile_id),
                &json!({"profile_type": "COACH"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn category_can_be_set_and_cleared() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let cat = app.create_category(&admin, "Senior").await;
        let alice = app.register("alice", "secret1").await;
        let profile_id = app.create_profile(&admin, alice, "PLAYER").await;
        let path = routes::profile(profile_id);

        let set = app
            .patch_with_token(&path, &json!({"category_id": cat}), &admin)
            .await;
        assert_eq!(set.body["category_id"], cat);

        let kept = app.patch_with_token(&path, &json!({}), &admin).await;
        assert_eq!(kept.body["category_id"], cat);

        let cleared = app
            .patch_with_token(&path, &json!({"category_id": null}), &admin)
            .await;
        assert!(cleared.body["category_id"].is_null());

        let missing = app
            .patch_with_token(&path, &json!({"category_id": 8080}), &admin)
            .await;
        assert_eq!(missing.status, 404);
    }
}

mod delete_profile {
    use super::*;

    #[tokio::test]
    async fn deleting_a_coach_profile_unassigns_its_players() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let coach = app.create_coach(&admin, "marta", &[]).await;
        let coach_profile_id = coach.body["profile"]["id"].as_i64().unwrap() as i32;
        let coach_id = coach.body["coach_profile"]["id"].clone();
        let alice = app.register("alice", "secret1").await;
        let res = app
            .post_with_token(
                routes::PROFILES,
                &json!({"user_id": alice, "profile_type": "PLAYER", "coach_profile_id": coach_id}),
                &admin,
            )
            .await;
        let player_profile = res.id();

        let del = app
            .delete_with_token(&routes::profile(coach_profile_id), &admin)
            .await;
        assert_eq!(del.status, 204, "{}", del.text);

        let player = app
            .get_with_token(&routes::profile(player_profile), &admin)
            .await;
        assert_eq!(player.status, 200);
        assert!(player.body["coach_profile_id"].is_null());
    }
}

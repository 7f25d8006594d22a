use common::UserRole;
use serde_json::json;

use crate::common::{JWT_SECRET, TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn registered_user_is_an_inactive_player_with_hashed_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice", "password": "secret1"}),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["role"], "PLAYER");
        assert_eq!(res.body["is_active"], false);
        assert!(res.body.get("password").is_none());

        let stored = app.db_user("alice").await;
        assert_ne!(stored.password, "secret1");
        assert!(stored.password.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn second_registration_with_same_username_conflicts() {
        let app = TestApp::spawn().await;
        let body = json!({"username": "alice", "password": "secret1"});

        let first = app.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(first.status, 201, "{}", first.text);

        let second = app.post_without_token(routes::REGISTER, &body).await;
        assert_eq!(second.status, 409);
        assert_eq!(second.body["code"], "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let app = TestApp::spawn().await;
        app.register("alice", "secret1").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "Alice", "password": "secret1"}),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({"username": "alice", "password": "12345"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::REGISTER, &json!({"username": "alice"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn register_complete_creates_user_profile_and_player_details() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER_COMPLETE,
                &json!({
                    "username": "lucia",
                    "password": "secret1",
                    "first_name": "Lucía",
                    "last_name": "Pérez",
                    "email": "lucia@example.com",
                    "document_type": "DNI",
                    "document": "40111222",
                    "birth_date": "2011-07-01",
                }),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["user"]["role"], "PLAYER");
        assert_eq!(res.body["user"]["is_active"], false);
        assert_eq!(res.body["profile"]["profile_type"], "PLAYER");
        assert_eq!(res.body["player_profile"]["birth_date"], "2011-07-01");
        assert_eq!(res.body["player_profile"]["is_active"], false);
        assert_eq!(
            res.body["player_profile"]["profile_id"],
            res.body["profile"]["id"]
        );
    }

    #[tokio::test]
    async fn register_complete_leaves_nothing_behind_when_the_username_is_taken() {
        let app = TestApp::spawn().await;
        app.register("lucia", "secret1").await;

        let res = app
            .post_without_token(
                routes::REGISTER_COMPLETE,
                &json!({
                    "username": "lucia",
                    "password": "secret1",
                    "first_name": "Lucía",
                    "last_name": "Pérez",
                    "email": "lucia@example.com",
                    "document_type": "DNI",
                    "document": "40111222",
                }),
            )
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "USERNAME_TAKEN");

        let user_id = app.db_user("lucia").await.id;
        let admin = app.create_admin().await;
        let profiles = app
            .get_with_token(&routes::user_profiles(user_id), &admin)
            .await;
        assert_eq!(profiles.status, 200);
        assert_eq!(profiles.body.as_array().map(Vec::len), Some(0));
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn inactive_account_cannot_log_in_until_activated() {
        let app = TestApp::spawn().await;
        let alice_id = app.register("alice", "secret1").await;

        let res = app.login("alice", "secret1").await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");

        let admin = app.create_admin().await;
        let patch = app
            .patch_with_token(&routes::user(alice_id), &json!({"is_active": true}), &admin)
            .await;
        assert_eq!(patch.status, 200, "{}", patch.text);

        let res = app.login("alice", "secret1").await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.body["token"].is_string());
        assert_eq!(res.body["user"]["username"], "alice");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let app = TestApp::spawn().await;
        app.create_user_with_role("alice", "secret1", UserRole::Player)
            .await;

        let wrong = app.login("alice", "wrongpass").await;
        let unknown = app.login("nobody", "secret1").await;

        assert_eq!(wrong.status, 401);
        assert_eq!(unknown.status, 401);
        assert_eq!(wrong.body, unknown.body);
    }

    #[tokio::test]
    async fn inactive_and_bad_password_share_one_message() {
        let app = TestApp::spawn().await;
        app.register("inactive", "secret1").await;
        app.create_user_with_role("active", "secret1", UserRole::Player)
            .await;

        let inactive = app.login("inactive", "secret1").await;
        let bad = app.login("active", "nope-nope").await;
        assert_eq!(inactive.body, bad.body);
    }
}

mod tokens {
    use super::*;

    #[tokio::test]
    async fn verify_accepts_a_fresh_token() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("alice", "secret1", UserRole::Player)
            .await;

        let res = app.get_with_token(routes::VERIFY, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["valid"], true);
        assert_eq!(res.body["user_id"], app.db_user("alice").await.id);
    }

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn tampered_token_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("alice", "secret1", UserRole::Player)
            .await;
        let tampered = format!("{token}x");

        let res = app.get_with_token(routes::VERIFY, &tampered).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_user_with_role("alice", "secret1", UserRole::Player)
            .await;
        let id = app.db_user("alice").await.id;
        let expired =
            club_server::utils::jwt::sign_with_ttl(id, JWT_SECRET, chrono::Duration::hours(-1))
                .unwrap();

        let res = app.get_with_token(routes::ME, &expired).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn token_of_deactivated_user_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let token = app
            .create_user_with_role("alice", "secret1", UserRole::Player)
            .await;
        let id = app.db_user("alice").await.id;

        let patch = app
            .patch_with_token(&routes::user(id), &json!({"is_active": false}), &admin)
            .await;
        assert_eq!(patch.status, 200, "{}", patch.text);

        let res = app.get_with_token(routes::ME, &token).await;
        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}

mod me {
    use super::*;

    #[tokio::test]
    async fn plain_player_has_no_capabilities() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("alice", "secret1", UserRole::Player)
            .await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["is_master"], false);
        assert_eq!(res.body["is_admin"], false);
        assert_eq!(res.body["is_player"], false);
        assert_eq!(res.body["is_coach"], false);
        assert!(res.body["player_profile_id"].is_null());
    }

    #[tokio::test]
    async fn master_is_also_admin() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("root", "rootpass", UserRole::Master)
            .await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.body["role"], "MASTER");
        assert_eq!(res.body["is_master"], true);
        assert_eq!(res.body["is_admin"], true);
    }

    #[tokio::test]
    async fn player_details_make_the_caller_a_player() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin().await;
        let res = app
            .post_without_token(
                routes::REGISTER_COMPLETE,
                &json!({
                    "username": "lucia",
                    "password": "secret1",
                    "first_name": "Lucía",
                    "last_name": "Pérez",
                    "email": "lucia@example.com",
                    "document_type": "DNI",
                    "document": "40111222",
                }),
            )
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        let player_id = res.body["player_profile"]["id"].clone();
        let user_id = res.body["user"]["id"].as_i64().unwrap() as i32;

        app.patch_with_token(&routes::user(user_id), &json!({"is_active": true}), &admin)
            .await;
        let token = app.login("lucia", "secret1").await.body["token"]
            .as_str()
            .unwrap()
            .to_string();

        let me = app.get_with_token(routes::ME, &token).await;
        assert_eq!(me.body["is_player"], true);
        assert_eq!(me.body["is_coach"], false);
        assert_eq!(me.body["player_profile_id"], player_id);
    }
}

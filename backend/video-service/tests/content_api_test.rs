//! Videos, engagement, playlists and watch history over HTTP

#[macro_use]
mod common;

use actix_web::test;
use common::{call, memory_state, open_channel, register, upload};
use serde_json::json;
use uuid::Uuid;

#[actix_web::test]
async fn test_video_lifecycle() {
    let app = test_app!(memory_state());
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let video_id = upload(&app, &alice, "Down the rabbit hole").await;

    let (status, body) = call(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/videos/{}", video_id))
            .to_request(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["duration"], "01:02:05");
    assert_eq!(body["views"], 0);
    assert_eq!(body["owner_id"], alice.id.to_string());

    for expected in 1..=2 {
        let (status, body) = call(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/videos/{}/views", video_id))
                .to_request(),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["views"], expected);
    }

    let (status, _) = call(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/videos/{}", video_id))
            .insert_header(bob.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(status, 403);

    let (status, _) = call(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/videos/{}", video_id))
            .insert_header(alice.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = call(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/videos/{}", video_id))
            .to_request(),
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Video not found");
}

#[actix_web::test]
async fn test_video_routes_split_public_and_gated_methods() {
    let app = test_app!(memory_state());
    let alice = register(&app, "alice").await;
    let video_id = upload(&app, &alice, "Tea party").await;

    let (status, _) = call(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/videos/{}", video_id))
            .to_request(),
    )
    .await;
    assert_eq!(status, 401);

    let (status, _) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/videos")
            .set_json(json!({ "title": "x", "url": "https://a.b/c", "duration_seconds": 1 }))
            .to_request(),
    )
    .await;
    assert_eq!(status, 401);

    let (status, body) = call(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/videos/not-a-uuid")
            .to_request(),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["status"], 400);
}

#[actix_web::test]
async fn test_likes() {
    let app = test_app!(memory_state());
    let alice = register(&app, "alice").await;
    let video_id = upload(&app, &alice, "Cheshire grin").await;
    let like_uri = format!("/api/v1/videos/{}/like", video_id);

    let like = || {
        test::TestRequest::post()
            .uri(&like_uri)
            .insert_header(alice.bearer())
            .to_request()
    };

    assert_eq!(call(&app, like()).await.0, 201);
    let (status, body) = call(&app, like()).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], "You already liked this video");

    let (status, body) = call(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/videos/{}/likes", video_id))
            .to_request(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["like_count"], 1);

    let unlike = || {
        test::TestRequest::delete()
            .uri(&like_uri)
            .insert_header(alice.bearer())
            .to_request()
    };
    assert_eq!(call(&app, unlike()).await.0, 200);
    assert_eq!(call(&app, unlike()).await.0, 404);

    let (status, _) = call(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/videos/{}/like", Uuid::new_v4()))
            .insert_header(alice.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(status, 404);
}

#[actix_web::test]
async fn test_subscriptions() {
    let app = test_app!(memory_state());
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;

    let orphan = upload(&app, &alice, "Before the channel").await;
    let (status, body) = call(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/videos/{}/subscription", orphan))
            .insert_header(bob.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Video has no channel");

    let channel_id = open_channel(&app, &alice, "Wonderland").await;
    let video_id = upload(&app, &alice, "After the channel").await;
    let subscribe_uri = format!("/api/v1/videos/{}/subscription", video_id);

    let subscribe = || {
        test::TestRequest::post()
            .uri(&subscribe_uri)
            .insert_header(bob.bearer())
            .to_request()
    };
    assert_eq!(call(&app, subscribe()).await.0, 201);
    assert_eq!(call(&app, subscribe()).await.0, 409);

    let (status, body) = call(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/channels/{}/subscribers/count", channel_id))
            .to_request(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["subscriber_count"], 1);

    let (status, body) = call(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users/subscriptions")
            .insert_header(bob.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 1);
    assert_eq!(body["channels"][0]["channel_name"], "Wonderland");
    assert_eq!(body["channels"][0]["subscriber_count"], 1);

    let unsubscribe = || {
        test::TestRequest::delete()
            .uri(&subscribe_uri)
            .insert_header(bob.bearer())
            .to_request()
    };
    assert_eq!(call(&app, unsubscribe()).await.0, 200);
    assert_eq!(call(&app, unsubscribe()).await.0, 404);
}

#[actix_web::test]
async fn test_second_channel_conflicts() {
    let app = test_app!(memory_state());
    let alice = register(&app, "alice").await;
    open_channel(&app, &alice, "Wonderland").await;

    let (status, body) = call(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/users/channel")
            .insert_header(alice.bearer())
            .set_form([("channel_name", "Looking Glass")])
            .to_request(),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], "User already has a channel");
}

#[actix_web::test]
async fn test_comments_ownership_and_order() {
    let app = test_app!(memory_state());
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let video_id = upload(&app, &alice, "Mad hatter").await;
    let comments_uri = format!("/api/v1/videos/{}/comments", video_id);

    let mut ids = Vec::new();
    for content in ["first", "second"] {
        let (status, body) = call(
            &app,
            test::TestRequest::post()
                .uri(&comments_uri)
                .insert_header(alice.bearer())
                .set_json(json!({ "content": content }))
                .to_request(),
        )
        .await;
        assert_eq!(status, 201);
        ids.push(body["id"].as_str().unwrap().to_string());
    }

    let (status, _) = call(
        &app,
        test::TestRequest::post()
            .uri(&comments_uri)
            .insert_header(alice.bearer())
            .set_json(json!({ "content": "   " }))
            .to_request(),
    )
    .await;
    assert_eq!(status, 400);

    let (status, body) = call(
        &app,
        test::TestRequest::get()
            .uri(&format!("{}?limit=10&offset=0", comments_uri))
            .to_request(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["comments"][0]["content"], "second");
    assert_eq!(body["comments"][1]["content"], "first");

    let comment_uri = format!("/api/v1/comments/{}", ids[0]);
    let (status, _) = call(
        &app,
        test::TestRequest::put()
            .uri(&comment_uri)
            .insert_header(bob.bearer())
            .set_json(json!({ "content": "hijacked" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, 403);

    let (status, body) = call(
        &app,
        test::TestRequest::put()
            .uri(&comment_uri)
            .insert_header(alice.bearer())
            .set_json(json!({ "content": "edited" }))
            .to_request(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["content"], "edited");

    let (status, _) = call(
        &app,
        test::TestRequest::delete()
            .uri(&comment_uri)
            .insert_header(bob.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(status, 403);

    let (status, _) = call(
        &app,
        test::TestRequest::delete()
            .uri(&comment_uri)
            .insert_header(alice.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(status, 200);
}

#[actix_web::test]
async fn test_playlists() {
    let app = test_app!(memory_state());
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let video_id = upload(&app, &alice, "Queen of hearts").await;

    let (status, body) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/playlists")
            .insert_header(alice.bearer())
            .set_json(json!({ "name": "Secret garden", "is_public": false }))
            .to_request(),
    )
    .await;
    assert_eq!(status, 201);
    let playlist_uri = format!("/api/v1/playlists/{}", body["id"].as_str().unwrap());

    let (status, _) = call(
        &app,
        test::TestRequest::get()
            .uri(&playlist_uri)
            .insert_header(bob.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(status, 404);

    let add = |user: &common::TestUser| {
        test::TestRequest::post()
            .uri(&format!("{}/videos", playlist_uri))
            .insert_header(user.bearer())
            .set_json(json!({ "video_id": video_id }))
            .to_request()
    };
    let (status, body) = call(&app, add(&alice)).await;
    assert_eq!(status, 200);
    assert_eq!(body["video_ids"], json!([video_id]));
    assert_eq!(call(&app, add(&alice)).await.0, 409);

    let remove = || {
        test::TestRequest::delete()
            .uri(&format!("{}/videos/{}", playlist_uri, video_id))
            .insert_header(alice.bearer())
            .to_request()
    };
    assert_eq!(call(&app, remove()).await.0, 200);
    assert_eq!(call(&app, remove()).await.0, 404);

    let (status, _) = call(
        &app,
        test::TestRequest::delete()
            .uri(&playlist_uri)
            .insert_header(alice.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(status, 200);
}

#[actix_web::test]
async fn test_public_playlist_is_read_only_for_others() {
    let app = test_app!(memory_state());
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let video_id = upload(&app, &alice, "Caucus race").await;

    let (_, body) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/playlists")
            .insert_header(alice.bearer())
            .set_json(json!({ "name": "Open house" }))
            .to_request(),
    )
    .await;
    assert_eq!(body["is_public"], true);
    let playlist_uri = format!("/api/v1/playlists/{}", body["id"].as_str().unwrap());

    let (status, _) = call(
        &app,
        test::TestRequest::get()
            .uri(&playlist_uri)
            .insert_header(bob.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(status, 200);

    let (status, _) = call(
        &app,
        test::TestRequest::post()
            .uri(&format!("{}/videos", playlist_uri))
            .insert_header(bob.bearer())
            .set_json(json!({ "video_id": video_id }))
            .to_request(),
    )
    .await;
    assert_eq!(status, 403);

    let (status, _) = call(
        &app,
        test::TestRequest::delete()
            .uri(&playlist_uri)
            .insert_header(bob.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(status, 403);
}

#[actix_web::test]
async fn test_watch_history() {
    let app = test_app!(memory_state());
    let alice = register(&app, "alice").await;
    let first = upload(&app, &alice, "Pool of tears").await;
    let second = upload(&app, &alice, "Lobster quadrille").await;

    for video_id in [first, second] {
        let (status, _) = call(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/watch-history")
                .insert_header(alice.bearer())
                .set_json(json!({ "video_id": video_id }))
                .to_request(),
        )
        .await;
        assert_eq!(status, 201);
    }

    let (status, _) = call(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/watch-history")
            .insert_header(alice.bearer())
            .set_json(json!({ "video_id": Uuid::new_v4() }))
            .to_request(),
    )
    .await;
    assert_eq!(status, 404);

    let (status, body) = call(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/watch-history?page=1&limit=1")
            .insert_header(alice.bearer())
            .to_request(),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["history"].as_array().unwrap().len(), 1);
    assert_eq!(body["history"][0]["video_id"], second.to_string());

    for bad in ["page=0", "limit=0", "limit=101", "page=9223372036854775807&limit=100"] {
        let (status, _) = call(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/watch-history?{}", bad))
                .insert_header(alice.bearer())
                .to_request(),
        )
        .await;
        assert_eq!(status, 400, "{} should be rejected", bad);
    }

    let remove = || {
        test::TestRequest::delete()
            .uri(&format!("/api/v1/watch-history/{}", first))
            .insert_header(alice.bearer())
            .to_request()
    };
    assert_eq!(call(&app, remove()).await.0, 200);
    assert_eq!(call(&app, remove()).await.0, 404);
}

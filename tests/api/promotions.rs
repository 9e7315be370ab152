use std::time::Duration;

use crate::helpers::{FakeRemoteStore, promotion, spawn_app, spawn_app_with};

#[tokio::test]
async fn no_promotion_when_nothing_is_active() {
    // arrange
    let app = spawn_app().await;

    // act
    let body = app.get_active_promotion("/").await;

    // assert
    assert!(body["promotion"].is_null());
    assert!(body["reveal"].is_null());
}

#[tokio::test]
async fn active_promotion_comes_with_reveal_settings() {
    // arrange
    let remote = FakeRemoteStore::with_promotions(vec![promotion(
        "newsletter",
        serde_json::json!({ "delaySeconds": 5, "showFrequency": "always" }),
    )]);
    let app = spawn_app_with(remote).await;

    // act
    let body = app.get_active_promotion("/").await;

    // assert
    assert_eq!(body["promotion"]["id"], "newsletter");
    assert_eq!(body["reveal"]["delay_ms"], 5000);
    assert_eq!(body["reveal"]["scroll_threshold_px"], 200);
}

#[tokio::test]
async fn reveal_delay_is_clamped() {
    // arrange
    let remote = FakeRemoteStore::with_promotions(vec![promotion(
        "newsletter",
        serde_json::json!({ "delaySeconds": 600 }),
    )]);
    let app = spawn_app_with(remote).await;

    // act
    let body = app.get_active_promotion("/").await;

    // assert
    assert_eq!(body["reveal"]["delay_ms"], 30_000);
}

#[tokio::test]
async fn promotions_are_filtered_by_page() {
    // arrange
    let remote = FakeRemoteStore::with_promotions(vec![promotion(
        "blog-only",
        serde_json::json!({ "pages": ["/blog"], "showFrequency": "always" }),
    )]);
    let app = spawn_app_with(remote).await;

    // act
    let home = app.get_active_promotion("/").await;
    let blog = app.get_active_promotion("/blog").await;

    // assert
    assert!(home["promotion"].is_null());
    assert_eq!(blog["promotion"]["id"], "blog-only");
}

#[tokio::test]
async fn expired_promotions_are_not_offered() {
    // arrange
    let remote = FakeRemoteStore::with_promotions(vec![promotion(
        "last-year",
        serde_json::json!({ "endDate": "2020-01-01" }),
    )]);
    let app = spawn_app_with(remote).await;

    // act
    let body = app.get_active_promotion("/").await;

    // assert
    assert!(body["promotion"].is_null());
}

#[tokio::test]
async fn session_promotion_is_offered_once_per_session() {
    // arrange
    let remote = FakeRemoteStore::with_promotions(vec![promotion(
        "per-session",
        serde_json::json!({ "showFrequency": "session" }),
    )]);
    let app = spawn_app_with(remote).await;

    // act - part 1 - shown and recorded
    let first = app.get_active_promotion("/").await;
    assert_eq!(first["promotion"]["id"], "per-session");
    app.post_promotion_view("per-session", "session").await;

    // act - part 2 - not again in the same session
    let second = app.get_active_promotion("/").await;
    assert!(second["promotion"].is_null());

    // act - part 3 - a fresh session gets it again
    app.reset_visitor().await;
    let third = app.get_active_promotion("/").await;
    assert_eq!(third["promotion"]["id"], "per-session");
}

#[tokio::test]
async fn once_promotion_is_never_offered_again() {
    // arrange
    let remote = FakeRemoteStore::with_promotions(vec![promotion(
        "one-shot",
        serde_json::json!({ "showFrequency": "once" }),
    )]);
    let app = spawn_app_with(remote).await;

    // act
    app.get_active_promotion("/").await;
    app.post_promotion_view("one-shot", "once").await;
    app.reset_visitor().await;
    let body = app.get_active_promotion("/").await;

    // assert
    assert!(body["promotion"].is_null());
}

#[tokio::test]
async fn always_promotion_is_offered_every_time() {
    // arrange
    let remote = FakeRemoteStore::with_promotions(vec![promotion(
        "sticky",
        serde_json::json!({ "showFrequency": "always" }),
    )]);
    let app = spawn_app_with(remote).await;

    for _ in 0..3 {
        // act
        let body = app.get_active_promotion("/").await;
        app.post_promotion_view("sticky", "always").await;

        // assert
        assert_eq!(body["promotion"]["id"], "sticky");
    }
}

#[tokio::test]
async fn new_visitor_promotion_stops_for_returning_visitors() {
    // arrange
    let remote = FakeRemoteStore::with_promotions(vec![promotion(
        "welcome",
        serde_json::json!({ "showFrequency": "always", "targetAudience": "new_visitors" }),
    )]);
    let app = spawn_app_with(remote).await;

    // act
    let first_visit = app.get_active_promotion("/").await;
    app.reset_visitor().await;
    let second_visit = app.get_active_promotion("/").await;

    // assert
    assert_eq!(first_visit["promotion"]["id"], "welcome");
    assert!(second_visit["promotion"].is_null());
}

#[tokio::test]
async fn slow_remote_means_no_promotion() {
    // arrange
    let remote = FakeRemoteStore::with_promotions(vec![promotion(
        "too-late",
        serde_json::json!({ "showFrequency": "always" }),
    )])
    .slow(Duration::from_secs(3));
    let app = spawn_app_with(remote).await;

    // act
    let body = app.get_active_promotion("/").await;

    // assert
    assert!(body["promotion"].is_null());
}

#[tokio::test]
async fn promotion_view_is_counted_once_per_session() {
    // arrange
    let app = spawn_app().await;

    // act
    let first: serde_json::Value = app
        .post_promotion_view("newsletter", "always")
        .await
        .json()
        .await
        .unwrap();
    let second: serde_json::Value = app
        .post_promotion_view("newsletter", "always")
        .await
        .json()
        .await
        .unwrap();

    // assert
    assert_eq!(first["counted"], true);
    assert_eq!(second["counted"], false);
    let analytics = app.wait_for(|remote| remote.promotion_analytics("newsletter")).await;
    assert_eq!(analytics.views, 1);
    assert_eq!(analytics.unique_views, 1);
}

#[tokio::test]
async fn clicks_are_counted_every_time() {
    // arrange
    let app = spawn_app().await;

    // act
    app.post_promotion_view("newsletter", "always").await;
    app.wait_for(|remote| remote.promotion_analytics("newsletter")).await;
    for clicks in 1..=2 {
        let response = app.post_promotion_action("newsletter", "click").await;
        assert_eq!(response.status().as_u16(), 202);
        app.wait_for(|remote| {
            remote
                .promotion_analytics("newsletter")
                .filter(|a| a.clicks == clicks)
        })
        .await;
    }

    // assert
    let analytics = app.remote.promotion_analytics("newsletter").unwrap();
    assert_eq!(analytics.views, 1);
    assert!((analytics.click_through_rate - 200.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn closes_do_not_move_the_click_through_rate() {
    // arrange
    let app = spawn_app().await;

    // act
    let response = app.post_promotion_action("newsletter", "close").await;

    // assert
    assert_eq!(response.status().as_u16(), 202);
    let analytics = app.wait_for(|remote| remote.promotion_analytics("newsletter")).await;
    assert_eq!(analytics.closes, 1);
    assert_eq!(analytics.clicks, 0);
    assert!(analytics.click_through_rate.abs() < f64::EPSILON);
}

#[tokio::test]
async fn malformed_identifiers_are_rejected() {
    // arrange
    let app = spawn_app().await;

    // act
    let response = app.post_promotion_action("not.valid", "click").await;

    // assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn offered_promotion_keeps_its_own_frequency_on_view() {
    // arrange
    let remote = FakeRemoteStore::with_promotions(vec![promotion(
        "one-shot",
        serde_json::json!({ "showFrequency": "once" }),
    )]);
    let app = spawn_app_with(remote).await;

    // act - the UI reports the view without saying how often it may show
    let offered = app.get_active_promotion("/").await;
    let response = app.post_promotion_view_without_body("one-shot").await;
    app.reset_visitor().await;
    let next_session = app.get_active_promotion("/").await;

    // assert
    assert_eq!(offered["promotion"]["id"], "one-shot");
    assert_eq!(response.status().as_u16(), 200);
    assert!(next_session["promotion"].is_null());
}

#[tokio::test]
async fn offered_frequency_wins_over_the_request_body() {
    // arrange
    let remote = FakeRemoteStore::with_promotions(vec![promotion(
        "one-shot",
        serde_json::json!({ "showFrequency": "once" }),
    )]);
    let app = spawn_app_with(remote).await;

    // act
    app.get_active_promotion("/").await;
    app.post_promotion_view("one-shot", "always").await;
    app.reset_visitor().await;
    let next_session = app.get_active_promotion("/").await;

    // assert
    assert!(next_session["promotion"].is_null());
}

#[tokio::test]
async fn view_of_an_unknown_promotion_needs_a_frequency() {
    // arrange
    let app = spawn_app().await;

    // act
    let response = app.post_promotion_view_without_body("never-offered").await;

    // assert
    assert_eq!(response.status().as_u16(), 400);
    assert!(app.remote.promotion_analytics("never-offered").is_none());
}

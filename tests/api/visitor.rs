use crate::helpers::spawn_app;

#[tokio::test]
async fn visitor_id_is_stable_across_requests() {
    // arrange
    let app = spawn_app().await;

    // act
    let first = app.get_visitor().await;
    let second = app.get_visitor().await;

    // assert
    assert_eq!(first["visitor_id"], second["visitor_id"]);
    assert_eq!(first["session_id"], second["session_id"]);
    assert_eq!(first["returning"], false);
}

#[tokio::test]
async fn reset_starts_a_new_session_for_a_returning_visitor() {
    // arrange
    let app = spawn_app().await;
    let before = app.get_visitor().await;

    // act
    let reset = app.reset_visitor().await;
    let after = app.get_visitor().await;

    // assert
    assert_ne!(before["session_id"], reset["session_id"]);
    assert_eq!(reset["session_id"], after["session_id"]);
    assert_eq!(before["visitor_id"], after["visitor_id"]);
    assert_eq!(after["returning"], true);
}

#[tokio::test]
async fn fingerprint_follows_the_browser_signals() {
    // arrange
    let app = spawn_app().await;
    let other = spawn_app().await;

    // act
    let first = app.get_visitor().await;
    let second = other.get_visitor().await;

    // assert
    assert_ne!(first["visitor_id"], second["visitor_id"]);
    assert_eq!(first["fingerprint"], second["fingerprint"]);
    assert!(!first["fingerprint"].as_str().unwrap().is_empty());
}

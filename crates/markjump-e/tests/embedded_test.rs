//! Needs a running WebDriver server; set `MARKJUMP_WEBDRIVER_URL`
//! (e.g. `http://localhost:4444`) to enable.

use markjump_e::backend::EmbeddedBackend;
use markjump_engine::backend::Backend;
use markjump_engine::dispatcher::MarkerDispatcher;
use markjump_engine::protocol::{Activation, DispatchOutcome, DispatchRequest};
use serial_test::serial;

const PAGE: &str = r##"<html><head><title>Markers</title></head><body>
<button id="go" onclick="window.clicks = (window.clicks || 0) + 1">Go</button>
<input id="c" type="checkbox">
<a id="empty" href="" onclick="window.emptyClicks = (window.emptyClicks || 0) + 1; return false;">menu</a>
<a id="blank" href="about:blank">blank</a>
<form id="f" onsubmit="window.submitted = (window.submitted || 0) + 1; return false;">
<input id="s" type="submit" value="Send">
</form>
<input id="lone" type="submit" value="Orphan">
<span class="marker" key="B" pointed-link="#go"></span>
<span class="marker" key="C" pointed-link="#c"></span>
<span class="marker" key="D" pointed-link="#missing"></span>
<span class="marker" key="E" pointed-link="#empty"></span>
<span class="marker" key="N" pointed-link="#blank"></span>
<span class="marker" key="S" pointed-link="#s"></span>
<span class="marker" key="O" pointed-link="#lone"></span>
</body></html>"##;

fn page_url() -> String {
    format!("data:text/html,{}", PAGE.replace('#', "%23"))
}

async fn launch() -> Option<EmbeddedBackend> {
    let url = std::env::var("MARKJUMP_WEBDRIVER_URL").ok()?;
    let mut backend = EmbeddedBackend::with_url(url).headless();
    match backend.launch().await {
        Ok(()) => Some(backend),
        Err(e) => {
            eprintln!("Failed to connect to WebDriver: {}", e);
            None
        }
    }
}

#[tokio::test]
#[serial]
async fn test_embedded_dispatch() {
    let Some(mut backend) = launch().await else {
        return;
    };
    backend.navigate(&page_url()).await.expect("Navigation failed");

    let dispatcher = MarkerDispatcher::default();
    let outcome = backend
        .dispatch(&dispatcher, &DispatchRequest::new("B", false).unwrap())
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        DispatchOutcome::Activated {
            activation: Activation::Click,
            ..
        }
    ));

    let client = &backend.get_client().unwrap().client;
    let clicks = client.execute("return window.clicks;", vec![]).await.unwrap();
    assert_eq!(clicks, 1);

    backend
        .dispatch(&dispatcher, &DispatchRequest::new("C", false).unwrap())
        .await
        .unwrap();
    let client = &backend.get_client().unwrap().client;
    let checked = client
        .execute("return document.getElementById('c').checked;", vec![])
        .await
        .unwrap();
    assert_eq!(checked, true);

    let err = backend
        .dispatch(&dispatcher, &DispatchRequest::new("D", false).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TARGET_NOT_FOUND");

    backend.close().await.expect("Close failed");
}

#[tokio::test]
#[serial]
async fn test_embedded_empty_href_and_submit() {
    let Some(mut backend) = launch().await else {
        return;
    };
    backend.navigate(&page_url()).await.expect("Navigation failed");
    let dispatcher = MarkerDispatcher::default();

    let outcome = backend
        .dispatch(&dispatcher, &DispatchRequest::new("E", false).unwrap())
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        DispatchOutcome::Activated {
            activation: Activation::Click,
            ..
        }
    ));

    let outcome = backend
        .dispatch(&dispatcher, &DispatchRequest::new("S", false).unwrap())
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        DispatchOutcome::Activated {
            activation: Activation::Submit,
            ..
        }
    ));

    let client = &backend.get_client().unwrap().client;
    let counts = client
        .execute("return [window.emptyClicks, window.submitted];", vec![])
        .await
        .unwrap();
    assert_eq!(counts, serde_json::json!([1, 1]));

    let err = backend
        .dispatch(&dispatcher, &DispatchRequest::new("O", false).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "SCRIPT_ERROR");

    backend.close().await.expect("Close failed");
}

#[tokio::test]
#[serial]
async fn test_embedded_new_context_keeps_marker_window() {
    let Some(mut backend) = launch().await else {
        return;
    };
    backend.navigate(&page_url()).await.expect("Navigation failed");
    let client = backend.get_client().unwrap().client.clone();
    let original = client.window().await.unwrap();

    let outcome = backend
        .dispatch(
            &MarkerDispatcher::default(),
            &DispatchRequest::new("N", true).unwrap(),
        )
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        DispatchOutcome::Activated {
            activation: Activation::OpenNewContext { .. },
            ..
        }
    ));
    assert_eq!(client.windows().await.unwrap().len(), 2);
    assert_eq!(client.window().await.unwrap(), original);

    // markers on the original page are still reachable
    backend
        .dispatch(
            &MarkerDispatcher::default(),
            &DispatchRequest::new("B", false).unwrap(),
        )
        .await
        .unwrap();
    let clicks = client.execute("return window.clicks;", vec![]).await.unwrap();
    assert_eq!(clicks, 1);

    backend.close().await.expect("Close failed");
}

#[tokio::test]
async fn test_dispatch_requires_connection() {
    let mut backend = EmbeddedBackend::with_url("http://localhost:1");
    let err = backend
        .dispatch(
            &MarkerDispatcher::default(),
            &DispatchRequest::new("B", false).unwrap(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_READY");
}

use markjump_engine::backend::Backend;
use markjump_engine::dispatcher::MarkerDispatcher;
use markjump_engine::error::DispatchError;
use markjump_engine::protocol::{Activation, DispatchOutcome, DispatchRequest};
use markjump_h::backend::HeadlessBackend;
use serial_test::serial;

const PAGE: &str = r##"<html><head><title>Markers</title></head><body>
<button id="go" onclick="window.clicks = (window.clicks || 0) + 1">Go</button>
<input id="q" type="text" value="hello">
<input id="c" type="checkbox">
<a id="far" href="https://example.com/">far</a>
<a id="empty" href="" onclick="window.emptyClicks = (window.emptyClicks || 0) + 1; return false;">menu</a>
<form id="f" onsubmit="window.submitted = (window.submitted || 0) + 1; return false;">
<input id="s" type="submit" value="Send">
</form>
<input id="lone" type="submit" value="Orphan">
<span class="marker" key="B" pointed-link="#go"></span>
<span class="marker" key="T" pointed-link="#q"></span>
<span class="marker" key="C" pointed-link="#c"></span>
<span class="marker" key="L" pointed-link="#far"></span>
<span class="marker" key="D" pointed-link="#missing"></span>
<span class="marker" key="E" pointed-link="#empty"></span>
<span class="marker" key="S" pointed-link="#s"></span>
<span class="marker" key="O" pointed-link="#lone"></span>
</body></html>"##;

fn data_url() -> String {
    format!("data:text/html,{}", PAGE.replace('#', "%23"))
}

/// Launches Chromium, or returns `None` when no browser is available.
async fn launch() -> Option<HeadlessBackend> {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::INFO)
        .try_init()
        .ok();

    let mut backend = HeadlessBackend::new();
    match backend.launch().await {
        Ok(()) => Some(backend),
        Err(e) => {
            eprintln!("Failed to launch browser (is Chromium installed?): {}", e);
            None
        }
    }
}

async fn eval<T: serde::de::DeserializeOwned>(backend: &HeadlessBackend, expr: &str) -> T {
    backend
        .get_client()
        .unwrap()
        .page
        .evaluate(expr)
        .await
        .unwrap()
        .into_value()
        .unwrap()
}

async fn run(backend: &mut HeadlessBackend, key: &str) -> Result<DispatchOutcome, DispatchError> {
    let request = DispatchRequest::new(key, false).unwrap();
    backend.dispatch(&MarkerDispatcher::default(), &request).await
}

#[tokio::test]
#[serial]
async fn test_headless_dispatch_activations() {
    let Some(mut backend) = launch().await else {
        return;
    };

    let nav = backend.navigate(&data_url()).await.expect("Navigation failed");
    assert_eq!(nav.title, "Markers");

    let outcome = run(&mut backend, "b").await.unwrap();
    assert!(matches!(
        outcome,
        DispatchOutcome::Activated {
            activation: Activation::Click,
            ..
        }
    ));
    assert_eq!(eval::<u32>(&backend, "window.clicks").await, 1);

    run(&mut backend, "T").await.unwrap();
    assert_eq!(eval::<String>(&backend, "document.activeElement.id").await, "q");
    assert_eq!(
        eval::<u32>(&backend, "document.getElementById('q').selectionEnd").await,
        5
    );

    run(&mut backend, "C").await.unwrap();
    assert!(eval::<bool>(&backend, "document.getElementById('c').checked").await);

    let err = run(&mut backend, "D").await.unwrap_err();
    assert_eq!(err.code(), "TARGET_NOT_FOUND");

    let outcome = run(&mut backend, "ZZ").await.unwrap();
    assert!(!outcome.had_effect());

    backend.close().await.expect("Close failed");
}

#[tokio::test]
#[serial]
async fn test_headless_link_classification() {
    let Some(mut backend) = launch().await else {
        return;
    };
    backend.navigate(&data_url()).await.expect("Navigation failed");

    // classification only: resolve the link without leaving the page
    let client = backend.get_client().unwrap();
    let document = markjump_h::dom::CdpDocument::new(client);
    let marker = markjump_engine::resolver::find_marker(
        &document,
        "L",
        MarkerDispatcher::default().config(),
    )
    .await
    .unwrap()
    .unwrap();
    let target = markjump_engine::resolver::resolve_target(
        &document,
        &marker,
        "L",
        MarkerDispatcher::default().config(),
    )
    .await
    .unwrap();
    let category = markjump_engine::classifier::classify(&target.element)
        .await
        .unwrap();
    assert_eq!(
        category,
        markjump_engine::protocol::Category::NavigableLink {
            url: "https://example.com/".into()
        }
    );

    backend.close().await.expect("Close failed");
}

#[tokio::test]
#[serial]
async fn test_headless_empty_href_and_submit() {
    let Some(mut backend) = launch().await else {
        return;
    };
    backend.navigate(&data_url()).await.expect("Navigation failed");

    let outcome = run(&mut backend, "E").await.unwrap();
    assert!(matches!(
        outcome,
        DispatchOutcome::Activated {
            activation: Activation::Click,
            ..
        }
    ));
    assert_eq!(eval::<u32>(&backend, "window.emptyClicks").await, 1);

    let outcome = run(&mut backend, "S").await.unwrap();
    assert!(matches!(
        outcome,
        DispatchOutcome::Activated {
            activation: Activation::Submit,
            ..
        }
    ));
    assert_eq!(eval::<u32>(&backend, "window.submitted").await, 1);

    let err = run(&mut backend, "O").await.unwrap_err();
    assert_eq!(err.code(), "SCRIPT_ERROR");

    backend.close().await.expect("Close failed");
}

#[tokio::test]
async fn test_dispatch_requires_launch() {
    let mut backend = HeadlessBackend::new();
    let err = run(&mut backend, "B").await.unwrap_err();
    assert_eq!(err.code(), "NOT_READY");
}

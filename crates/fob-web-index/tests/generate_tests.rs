//! End-to-end generation tests.
//!
//! These run full generations against in-memory snapshots and real
//! directories and check the written document.

use std::fs;
use std::ops::ControlFlow;
use std::sync::Arc;

use fob_web_index::{
    BuildEvent, BuildSnapshot, BundleOutput, FsWriter, MemoryWriter, RegenerationTrigger,
    SharedSnapshot, TagInfo, WebIndexConfig, WebIndexError, WebIndexOptions, WebIndexPlugin,
};
use parking_lot::Mutex;
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn vendor_then_app() -> BuildSnapshot {
    BuildSnapshot::new(vec![
        BundleOutput::new("vendor.js").named("vendor"),
        BundleOutput::new("app.js").named("app"),
    ])
}

fn position(html: &str, needle: &str) -> usize {
    html.find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in:\n{html}"))
}

#[tokio::test]
async fn test_default_tags_follow_snapshot_order() {
    let plugin = WebIndexPlugin::default();
    let generated = plugin.generate_document(&vendor_then_app()).await.unwrap();

    let html = &generated.html;
    assert!(position(html, "src=/vendor.js") < position(html, "src=/app.js"));
    assert!(html.contains("<script type=\"text/javascript\" src=/app.js defer></script>"));
}

#[tokio::test]
async fn test_generation_is_deterministic() {
    let plugin = WebIndexPlugin::new(
        WebIndexOptions::new()
            .script_transform(|path, _| Ok(Some(TagInfo::new(format!("<s {path}>")))))
            .variable("title", "Same"),
    );
    let snapshot = vendor_then_app().with_styles(["a.css", "b.css"]);

    let first = plugin.generate_document(&snapshot).await.unwrap();
    let second = plugin.generate_document(&snapshot).await.unwrap();
    assert_eq!(first.html, second.html);
}

#[tokio::test]
async fn test_negative_order_moves_app_first() {
    let plugin = WebIndexPlugin::new(WebIndexOptions::new().script_transform(|path, filename| {
        let tag = format!("<script src={path}></script>");
        Ok(Some(if filename == "app.js" {
            TagInfo::new(tag).with_order(-1)
        } else {
            TagInfo::new(tag)
        }))
    }));

    let html = plugin
        .generate_document(&vendor_then_app())
        .await
        .unwrap()
        .html;
    assert!(position(&html, "src=/app.js") < position(&html, "src=/vendor.js"));
}

#[tokio::test]
async fn test_equal_order_keeps_discovery_order() {
    let snapshot = BuildSnapshot::default().with_styles(["c.css", "a.css", "b.css"]);
    let plugin = WebIndexPlugin::new(WebIndexOptions::new().css_transform(|path, _| {
        Ok(Some(TagInfo::new(format!("[{path}]")).with_order(5)))
    }));

    let html = plugin.generate_document(&snapshot).await.unwrap().html;
    assert!(html.contains("[/c.css][/a.css][/b.css]"));
}

#[tokio::test]
async fn test_declined_assets_are_excluded() {
    let plugin = WebIndexPlugin::new(WebIndexOptions::new().script_transform(|path, filename| {
        Ok((filename != "vendor.js").then(|| TagInfo::new(format!("<script src={path}>"))))
    }));

    let html = plugin
        .generate_document(&vendor_then_app())
        .await
        .unwrap()
        .html;
    assert!(!html.contains("vendor.js"));
    assert!(html.contains("src=/app.js"));
}

#[tokio::test]
async fn test_non_indexed_and_empty_bundles_are_skipped() {
    let snapshot = BuildSnapshot::new(vec![
        BundleOutput::new("lazy.js").web_indexed(false),
        BundleOutput::without_output().named("types"),
        BundleOutput::new("main.js").in_folder("js"),
    ]);

    let generated = WebIndexPlugin::default()
        .generate_document(&snapshot)
        .await
        .unwrap();
    assert_eq!(generated.scripts, 1);
    assert!(!generated.html.contains("lazy.js"));
    assert!(generated.html.contains("src=/js/main.js"));
}

#[tokio::test]
async fn test_override_replaces_computed_markup() {
    let plugin = WebIndexPlugin::new(
        WebIndexOptions::new()
            .variable("script", "<!-- no scripts -->")
            .variable("title", "Custom Title"),
    );

    let html = plugin
        .generate_document(&vendor_then_app())
        .await
        .unwrap()
        .html;
    assert!(html.contains("<!-- no scripts -->"));
    assert!(!html.contains("vendor.js"));
    assert!(html.contains("<title>Custom Title</title>"));
}

#[tokio::test]
async fn test_identity_transform_matches_default() {
    let snapshot = vendor_then_app().with_styles(["styles.css"]);
    let default = WebIndexPlugin::default()
        .generate_document(&snapshot)
        .await
        .unwrap();

    let identity = WebIndexPlugin::new(
        WebIndexOptions::new()
            .script_transform(|path, _| {
                Ok(Some(TagInfo::new(format!(
                    "\n<script type=\"text/javascript\" src={path} defer></script>"
                ))))
            })
            .css_transform(|path, _| {
                Ok(Some(TagInfo::new(format!(
                    "<link rel=\"stylesheet\" href=\"{path}\">"
                ))))
            }),
    )
    .generate_document(&snapshot)
    .await
    .unwrap();

    assert_eq!(default.html, identity.html);
}

#[tokio::test]
async fn test_public_path_and_display_names() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let plugin = WebIndexPlugin::new(
        WebIndexOptions::new()
            .with_public_path("/static/")
            .script_transform(move |path, filename| {
                log.lock().push(format!("{path}|{filename}"));
                Ok(None)
            }),
    );
    let snapshot = BuildSnapshot::new(vec![
        BundleOutput::new("app.mjs").in_folder("js"),
        BundleOutput::new("vendor.js"),
    ]);

    plugin.generate_document(&snapshot).await.unwrap();
    assert_eq!(
        *seen.lock(),
        vec![
            "/static/js/app.mjs|app.mjs.js".to_string(),
            "/static/vendor.js|vendor.js".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_failed_generation_keeps_previous_document() {
    let temp = TempDir::new().unwrap();
    let writer = FsWriter::new(temp.path());
    let snapshot = vendor_then_app();

    WebIndexPlugin::default()
        .generate(&snapshot, &writer)
        .await
        .unwrap();
    let before = fs::read_to_string(temp.path().join("index.html")).unwrap();

    let failing = WebIndexPlugin::new(
        WebIndexOptions::new().script_transform(|_, _| anyhow::bail!("transform exploded")),
    );
    let err = failing.generate(&snapshot, &writer).await.unwrap_err();
    assert!(matches!(err, WebIndexError::Transform { .. }));
    assert!(err.to_string().contains("transform exploded"));

    let after = fs::read_to_string(temp.path().join("index.html")).unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_missing_template_fails_without_writing() {
    let temp = TempDir::new().unwrap();
    let writer = MemoryWriter::new();
    let plugin = WebIndexPlugin::new(
        WebIndexOptions::new()
            .with_root(temp.path())
            .template_path("missing.html"),
    );

    let err = plugin
        .generate(&vendor_then_app(), &writer)
        .await
        .unwrap_err();
    assert!(matches!(err, WebIndexError::TemplateNotFound { .. }));
    assert_eq!(writer.write_count(), 0);
}

#[tokio::test]
async fn test_template_file_with_default_macro() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("index.html.j2"),
        r#"{% macro default(state) -%}
<html><head>{{ state.css }}</head><body>{{ state.script }}<h1>{{ state.title }}</h1></body></html>
{%- endmacro %}"#,
    )
    .unwrap();

    let plugin = WebIndexPlugin::new(
        WebIndexOptions::new()
            .with_root(temp.path())
            .template_path("index.html.j2")
            .variable("title", "Hello"),
    );
    let html = plugin
        .generate_document(&vendor_then_app().with_styles(["s.css"]))
        .await
        .unwrap()
        .html;

    assert!(html.starts_with("<html><head><link rel=\"stylesheet\" href=\"/s.css\"></head>"));
    assert!(html.ends_with("<h1>Hello</h1></body></html>"));
}

#[tokio::test]
async fn test_inline_template_receives_state() {
    let plugin = WebIndexPlugin::new(WebIndexOptions::new().template_fn(|state| {
        Ok(format!("{}|{}", state.css(), state.script().trim()))
    }));
    let html = plugin
        .generate_document(&BuildSnapshot::new(vec![BundleOutput::new("a.js")]).with_styles(["a.css"]))
        .await
        .unwrap()
        .html;
    assert_eq!(
        html,
        "<link rel=\"stylesheet\" href=\"/a.css\">|<script type=\"text/javascript\" src=/a.js defer></script>"
    );
}

#[tokio::test]
async fn test_config_rules_reorder_tags() {
    let options = WebIndexConfig::from_value(json!({
        "outFile": "app.html",
        "tags": {
            "script": {
                "rules": [{ "filename": "app.js", "order": -1 }]
            }
        }
    }))
    .unwrap()
    .into_options()
    .unwrap();

    let writer = MemoryWriter::new();
    WebIndexPlugin::new(options)
        .generate(&vendor_then_app(), &writer)
        .await
        .unwrap();

    let html = writer.get("app.html").unwrap();
    assert!(position(&html, "src=/app.js") < position(&html, "src=/vendor.js"));
}

#[tokio::test]
async fn test_watch_regenerates_after_each_quiet_period() {
    let snapshot = SharedSnapshot::new(vendor_then_app());
    let writer = Arc::new(MemoryWriter::new());
    let trigger = RegenerationTrigger::new(WebIndexPlugin::default(), snapshot.clone(), writer.clone());

    let (tx, rx) = mpsc::channel(16);
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let watch = tokio::spawn(async move {
        trigger
            .watch(rx, move |result| {
                let _ = done_tx.send(result.map(|generated| generated.html));
                ControlFlow::Continue(())
            })
            .await
    });

    tx.send(BuildEvent::BuildFinished).await.unwrap();
    let first = done_rx.recv().await.unwrap().unwrap();
    assert!(first.contains("src=/vendor.js"));

    snapshot.replace(BuildSnapshot::new(vec![BundleOutput::new("next.js")]));
    tx.send(BuildEvent::OutputChanged(None)).await.unwrap();
    let second = done_rx.recv().await.unwrap().unwrap();
    assert!(second.contains("src=/next.js"));
    assert!(!second.contains("vendor.js"));

    drop(tx);
    assert_eq!(watch.await.unwrap(), 2);
    assert_eq!(writer.write_count(), 2);
}

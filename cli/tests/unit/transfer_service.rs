//! Unit tests for the fail-fast upload step.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;
use std::time::Duration;

use hoist_cli::application::ports::SessionConnector as _;
use hoist_cli::application::services::transfer::upload_all;
use hoist_cli::domain::DeployError;
use hoist_cli::domain::config::TransferItem;

use crate::mocks::{FakeFs, FakeHost, FakeSession, RecordingReporter, target};

async fn session(host: &FakeHost) -> FakeSession {
    host.connector()
        .connect(&target("10.0.0.1"), Duration::from_secs(1))
        .await
        .unwrap()
}

fn item(local: &str, remote: &str) -> TransferItem {
    TransferItem {
        local: PathBuf::from(local),
        remote: remote.to_string(),
    }
}

#[tokio::test]
async fn uploads_in_order_and_resolves_paths() {
    let host = FakeHost::new();
    let fs = FakeFs::with(&[("/w/route.ts", ""), ("/w/page.tsx", "")]);
    let items = [
        item("/w/route.ts", "src/app/api/contact/route.ts"),
        item("/w/page.tsx", "/srv/other/page.tsx"),
    ];

    let n = upload_all(&session(&host).await, &fs, &RecordingReporter::default(), &target("h"), &items)
        .await
        .unwrap();

    assert_eq!(n, 2);
    let remotes: Vec<String> = host.state().uploads.iter().map(|(_, r)| r.clone()).collect();
    assert_eq!(
        remotes,
        vec![
            "/app/src/app/api/contact/route.ts".to_string(),
            "/srv/other/page.tsx".to_string()
        ]
    );
}

#[tokio::test]
async fn each_success_is_reported_before_the_next_step() {
    let host = FakeHost::new();
    let fs = FakeFs::with(&[("/w/a.ts", ""), ("/w/b.ts", "")]);
    let reporter = RecordingReporter::default();

    upload_all(
        &session(&host).await,
        &fs,
        &reporter,
        &target("h"),
        &[item("/w/a.ts", "a.ts"), item("/w/b.ts", "b.ts")],
    )
    .await
    .unwrap();

    let kinds: Vec<&str> = reporter.events().iter().map(|(k, _)| *k).collect();
    assert_eq!(kinds, vec!["step", "success", "step", "success"]);
}

#[tokio::test]
async fn first_failure_stops_the_batch() {
    let host = FakeHost::new();
    host.state().fail_upload_at = Some(0);
    let fs = FakeFs::with(&[("/w/a.ts", ""), ("/w/b.ts", "")]);

    let err = upload_all(
        &session(&host).await,
        &fs,
        &RecordingReporter::default(),
        &target("h"),
        &[item("/w/a.ts", "a.ts"), item("/w/b.ts", "b.ts")],
    )
    .await
    .unwrap_err();

    assert_eq!(
        err,
        DeployError::Transfer {
            local: "/w/a.ts".to_string(),
            remote: "/app/a.ts".to_string(),
            reason: "permission denied".to_string(),
        }
    );
    assert_eq!(host.state().upload_attempts, 1, "b.ts must not be attempted");
}

#[tokio::test]
async fn empty_list_uploads_nothing() {
    let host = FakeHost::new();

    let n = upload_all(&session(&host).await, &FakeFs::default(), &RecordingReporter::default(), &target("h"), &[])
        .await
        .unwrap();

    assert_eq!(n, 0);
    assert!(host.state().uploads.is_empty());
}

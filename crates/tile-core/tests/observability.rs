//! Observability tests for publish lifecycle tracing.

use tile_core::{
    emit_archive_built, emit_publish_skipped, emit_publish_started, emit_publish_uploaded,
    emit_review_completed, emit_version_checked, publish_span,
};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_emit_publish_started_logs_tile_and_version() {
    emit_publish_started("acme/widgets", "1.2.0");
    assert!(logs_contain("publish.started"));
    assert!(logs_contain("acme/widgets"));
}

#[traced_test]
#[test]
fn test_emit_version_checked_logs_membership() {
    emit_version_checked("acme/widgets", "1.2.0", 2, true);
    assert!(logs_contain("publish.version_checked"));
    assert!(logs_contain("already_published=true"));
}

#[traced_test]
#[test]
fn test_emit_publish_skipped_logs_message() {
    emit_publish_skipped("acme/widgets", "1.2.0");
    assert!(logs_contain("already published, skipping"));
}

#[traced_test]
#[test]
fn test_emit_review_completed_logs_score() {
    emit_review_completed("skills/a", 85, 80.0, true);
    assert!(logs_contain("review.completed"));
    assert!(logs_contain("score=85"));
}

#[traced_test]
#[test]
fn test_emit_archive_built_and_uploaded() {
    emit_archive_built(3, 512, "abc123");
    emit_publish_uploaded("acme/widgets", "1.2.0", 512);
    assert!(logs_contain("Archive created (512 bytes)"));
    assert!(logs_contain("Published acme/widgets@1.2.0"));
}

#[traced_test]
#[test]
fn test_publish_span_wraps_events() {
    let span = publish_span("./tile");
    span.in_scope(|| emit_publish_started("acme/widgets", "0.1.0"));
    assert!(logs_contain("tile.publish"));
}

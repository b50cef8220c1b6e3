//! Integration tests for per-user progress and track summaries.

use pixelperfect_core::progress::ProgressStatus;
use pixelperfect_core::track_tree::{ItemInput, ModuleInput};
use pixelperfect_db::models::progress::TrackProgressDetail;
use pixelperfect_db::models::track::{CreateTrack, TrackTree};
use pixelperfect_db::models::user::CreateUser;
use pixelperfect_db::repositories::{ProgressRepo, RoadmapItemRepo, TrackRepo, UserRepo};
use pixelperfect_db::PhaseBudgets;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_track(pool: &PgPool, title: &str, items: usize) -> TrackTree {
    let input = CreateTrack {
        title: title.to_string(),
        description: String::new(),
        modules: vec![ModuleInput {
            title: "Only".to_string(),
            items: (0..items)
                .map(|i| ItemInput {
                    title: format!("item {i}"),
                    link: Some(format!("https://example.com/{i}")),
                })
                .collect(),
        }],
    };
    TrackRepo::create_with_tree(pool, &input, PhaseBudgets::default())
        .await
        .unwrap()
}

async fn seed_user(pool: &PgPool, external_id: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            external_id: external_id.to_string(),
            email: format!("{external_id}@example.com"),
            name: None,
            role: None,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upsert_creates_then_updates(pool: PgPool) {
    let track = seed_track(&pool, "Rust", 2).await;
    let user_id = seed_user(&pool, "u1").await;
    let item_id = track.modules[0].items[0].id;

    let first = ProgressRepo::upsert(&pool, user_id, item_id, ProgressStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(first.status().unwrap(), ProgressStatus::InProgress);

    let second = ProgressRepo::upsert(&pool, user_id, item_id, ProgressStatus::Completed)
        .await
        .unwrap();
    assert_eq!(second.id, first.id, "upsert must reuse the (user, item) row");
    assert_eq!(second.status().unwrap(), ProgressStatus::Completed);

    let rows = ProgressRepo::list_for_user_track(&pool, user_id, track.track.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_summaries_report_completion(pool: PgPool) {
    let rust = seed_track(&pool, "Rust", 4).await;
    let empty = seed_track(&pool, "Empty", 0).await;
    let me = seed_user(&pool, "me").await;
    let other = seed_user(&pool, "other").await;

    let items = &rust.modules[0].items;
    ProgressRepo::upsert(&pool, me, items[0].id, ProgressStatus::Completed)
        .await
        .unwrap();
    ProgressRepo::upsert(&pool, me, items[1].id, ProgressStatus::InProgress)
        .await
        .unwrap();
    // Someone else's completions must not count towards mine.
    for i in items {
        ProgressRepo::upsert(&pool, other, i.id, ProgressStatus::Completed)
            .await
            .unwrap();
    }

    let summaries = ProgressRepo::summaries_for_user(&pool, me).await.unwrap();
    assert_eq!(summaries.len(), 2);

    let rust_summary = summaries
        .iter()
        .find(|s| s.track_id == rust.track.id)
        .unwrap();
    assert_eq!(rust_summary.total_items, 4);
    assert_eq!(rust_summary.completed_items, 1);
    assert_eq!(rust_summary.completion_percentage, 25.0);

    let empty_summary = summaries
        .iter()
        .find(|s| s.track_id == empty.track.id)
        .unwrap();
    assert_eq!(empty_summary.total_items, 0);
    assert_eq!(empty_summary.completion_percentage, 0.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_summaries_counts_subtree(pool: PgPool) {
    let track = seed_track(&pool, "Counted", 3).await;
    let user_id = seed_user(&pool, "counter").await;
    ProgressRepo::upsert(
        &pool,
        user_id,
        track.modules[0].items[2].id,
        ProgressStatus::Completed,
    )
    .await
    .unwrap();

    let summaries = TrackRepo::list_summaries(&pool).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].module_count, 1);
    assert_eq!(summaries[0].item_count, 3);
    assert_eq!(summaries[0].progress_count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_items_listed_in_position_order(pool: PgPool) {
    let track = seed_track(&pool, "Ordered", 5).await;
    let module_id = track.modules[0].module.id;

    let items = RoadmapItemRepo::list_by_module(&pool, module_id).await.unwrap();
    let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["item 0", "item 1", "item 2", "item 3", "item 4"]);

    let found = RoadmapItemRepo::find_by_id(&pool, items[3].id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.link.as_deref(), Some("https://example.com/3"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_track_detail_marks_each_item(pool: PgPool) {
    let track = seed_track(&pool, "Detail", 3).await;
    let other_track = seed_track(&pool, "Elsewhere", 1).await;
    let me = seed_user(&pool, "reader").await;
    let items = &track.modules[0].items;

    ProgressRepo::upsert(&pool, me, items[0].id, ProgressStatus::Completed)
        .await
        .unwrap();
    ProgressRepo::upsert(&pool, me, items[2].id, ProgressStatus::InProgress)
        .await
        .unwrap();
    ProgressRepo::upsert(
        &pool,
        me,
        other_track.modules[0].items[0].id,
        ProgressStatus::Completed,
    )
    .await
    .unwrap();

    let rows = ProgressRepo::list_for_user_track(&pool, me, track.track.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2, "progress on other tracks is not listed");

    let tree = TrackRepo::find_tree(&pool, track.track.id)
        .await
        .unwrap()
        .unwrap();
    let detail = TrackProgressDetail::new(tree, &rows).unwrap();

    let statuses: Vec<ProgressStatus> = detail.modules[0]
        .items
        .iter()
        .map(|i| i.status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            ProgressStatus::Completed,
            ProgressStatus::NotStarted,
            ProgressStatus::InProgress
        ]
    );
    assert_eq!(detail.total_items, 3);
    assert_eq!(detail.completed_items, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_overview_counts_only_my_rows(pool: PgPool) {
    let track = seed_track(&pool, "Overview", 3).await;
    let me = seed_user(&pool, "me").await;
    let other = seed_user(&pool, "other").await;
    let items = &track.modules[0].items;

    let empty = ProgressRepo::overview_for_user(&pool, me).await.unwrap();
    assert_eq!(empty.total_progress, 0);
    assert_eq!(empty.completed_items, 0);

    ProgressRepo::upsert(&pool, me, items[0].id, ProgressStatus::Completed)
        .await
        .unwrap();
    ProgressRepo::upsert(&pool, me, items[1].id, ProgressStatus::InProgress)
        .await
        .unwrap();
    ProgressRepo::upsert(&pool, other, items[2].id, ProgressStatus::Completed)
        .await
        .unwrap();

    let overview = ProgressRepo::overview_for_user(&pool, me).await.unwrap();
    assert_eq!(overview.total_progress, 2);
    assert_eq!(overview.completed_items, 1);
}

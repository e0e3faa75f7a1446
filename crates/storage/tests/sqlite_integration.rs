use chrono::Duration;
use quiz_core::model::{EntryId, EntryOrigin, HistoryEntry, LeaderboardEntry};
use quiz_core::time::fixed_now;
use storage::repository::{
    HistoryRepository, LeaderboardRepository, ProfileRepository, RemoteCacheRepository,
    RemoteSnapshot,
};
use storage::sqlite::SqliteRepository;

fn entry(name: &str, score: u8, origin: EntryOrigin) -> LeaderboardEntry {
    LeaderboardEntry::new(
        EntryId::generate(),
        name,
        score,
        "/placeholder-user.jpg",
        "June 11, 2025",
        fixed_now(),
        None,
        origin,
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_persists_leaderboard() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_board?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let board = vec![
        entry("Priya Das", 95, EntryOrigin::Local),
        entry("Arjun Sen", 92, EntryOrigin::Local),
        entry("Meera Roy", 88, EntryOrigin::Local),
    ];
    repo.save_entries(&board).await.unwrap();

    let loaded = repo.load_entries().await.expect("load");
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[0].name(), "Priya Das");
    assert_eq!(loaded[0].score(), 95);
    assert_eq!(loaded[0].origin(), EntryOrigin::Local);

    // saving the board whole replaces the previous contents
    repo.save_entries(&board[..1]).await.unwrap();
    assert_eq!(repo.load_entries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_remote_cache_overwrites_previous_snapshot() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_cache?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.load_snapshot().await.unwrap().is_none());

    let first = RemoteSnapshot {
        fetched_at: fixed_now(),
        entries: vec![entry("Ravi Sharma", 80, EntryOrigin::Remote)],
    };
    repo.save_snapshot(&first).await.unwrap();

    let second = RemoteSnapshot {
        fetched_at: fixed_now() + Duration::seconds(30),
        entries: vec![
            entry("Ravi Sharma", 80, EntryOrigin::Remote),
            entry("Sunita Patel", 78, EntryOrigin::Remote),
        ],
    };
    repo.save_snapshot(&second).await.unwrap();

    let loaded = repo.load_snapshot().await.unwrap().expect("snapshot");
    assert_eq!(loaded.fetched_at, second.fetched_at);
    assert_eq!(loaded.entries.len(), 2);
    assert_eq!(loaded.entries[1].origin(), EntryOrigin::Remote);
}

#[tokio::test]
async fn sqlite_profile_round_trips() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_profile?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.player_name().await.unwrap().is_none());
    assert!(repo.device_id().await.unwrap().is_none());

    repo.set_player_name("Guest42").await.unwrap();
    repo.set_player_name("Priya Das").await.unwrap();
    repo.set_device_id("6a1f").await.unwrap();

    assert_eq!(repo.player_name().await.unwrap().as_deref(), Some("Priya Das"));
    assert_eq!(repo.device_id().await.unwrap().as_deref(), Some("6a1f"));
}

#[tokio::test]
async fn sqlite_history_lists_newest_first() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_history?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    for n in 0..5_u32 {
        repo.append_history(&HistoryEntry {
            date: "June 11, 2025".into(),
            category: "durga-trivia".into(),
            score: n * 20,
            total_questions: 3,
            time_spent_secs: 45,
            timestamp: fixed_now() + Duration::seconds(i64::from(n)),
        })
        .await
        .unwrap();
    }

    let page = repo.list_history(3).await.unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page[0].score, 80);
    assert_eq!(page[2].score, 40);
}

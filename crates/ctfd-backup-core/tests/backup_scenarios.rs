//! Integration test: category backups and full runs against the mock API.

mod common;

use common::mock_api::MockApi;
use ctfd_backup_core::backup::{
    backup_challenges, backup_scoreboard, backup_teams, BackupContext, CategoryStatus,
};
use ctfd_backup_core::client::ApiClient;
use ctfd_backup_core::config::{Category, CategorySelection};
use ctfd_backup_core::counters::RunCounters;
use ctfd_backup_core::layout::BackupLayout;
use ctfd_backup_core::{BackupConfig, Orchestrator};
use serde_json::json;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

struct Harness {
    client: ApiClient,
    config: BackupConfig,
    layout: BackupLayout,
    counters: RunCounters,
}

impl Harness {
    fn new(config: BackupConfig, root: &std::path::Path) -> Self {
        Self {
            client: ApiClient::new(&config),
            config,
            layout: BackupLayout::new(root),
            counters: RunCounters::new(),
        }
    }

    fn ctx(&self) -> BackupContext<'_> {
        BackupContext {
            client: &self.client,
            config: &self.config,
            layout: &self.layout,
            counters: &self.counters,
        }
    }
}

fn mount_challenge(api: &MockApi, id: u64, name: &str, category: &str, value: i64) {
    api.json(
        &format!("/api/v1/challenges/{}", id),
        json!({"id": id, "name": name, "category": category, "value": value, "solves": 1,
               "author": "root", "description": "desc", "files": []}),
    );
    api.json(
        &format!("/api/v1/challenges/{}/solves", id),
        json!([{"name": "alice", "date": "2026-03-01"}]),
    );
}

fn mount_team(api: &MockApi, id: u64, name: &str, solves: usize) {
    api.json(
        &format!("/api/v1/teams/{}", id),
        json!({"id": id, "name": name, "score": 100, "members": []}),
    );
    let solves: Vec<_> = (0..solves)
        .map(|i| json!({"challenge": {"name": format!("c{}", i)}, "date": "2026-03-01"}))
        .collect();
    api.json(&format!("/api/v1/teams/{}/solves", id), json!(solves));
    api.json(&format!("/api/v1/teams/{}/awards", id), json!([]));
}

#[test]
fn scoreboard_writes_both_rankings() {
    let api = MockApi::start();
    api.json(
        "/api/v1/scoreboard",
        json!([{"pos": 1, "name": "A", "score": 100, "members": [{"name": "x"}]}]),
    );
    let dir = tempdir().unwrap();
    let h = Harness::new(common::config(api.url(), dir.path()), &dir.path().join("t_backup"));

    let run = backup_scoreboard(&h.ctx()).unwrap();
    assert_eq!(run.report.listed, 1);

    let board = h.layout.category_dir(Category::Scoreboard);
    let teams = fs::read_to_string(board.join("TEAM_RANKING.md")).unwrap();
    assert!(teams.contains("| 1 | A | 100 |"));
    let users = fs::read_to_string(board.join("USER_RANKING.md")).unwrap();
    assert!(users.contains("| 1 | x | 100 | A |"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(board.join("user_ranking.json")).unwrap()).unwrap();
    assert_eq!(json[0]["name"], "x");
    assert_eq!(json[0]["score"], 100);
    assert!(board.join("team_ranking.json").is_file());
}

#[test]
fn failing_challenge_is_left_out_of_summary_and_index() {
    let api = MockApi::start();
    api.json(
        "/api/v1/challenges?page=1",
        json!([{"id": 1, "name": "one"}, {"id": 2, "name": "two"}, {"id": 3, "name": "three"}]),
    );
    mount_challenge(&api, 1, "one", "web", 300);
    api.status("/api/v1/challenges/2", 500);
    mount_challenge(&api, 3, "three", "crypto", 100);
    api.json(
        "/api/v1/challenges/3",
        json!({"id": 3, "name": "three", "category": "crypto", "value": 100,
               "files": ["/files/f3/notes.txt?token=abc"]}),
    );
    api.raw("/files/f3/notes.txt", 200, "text/plain", b"hello".to_vec());

    let dir = tempdir().unwrap();
    let h = Harness::new(common::config(api.url(), dir.path()), &dir.path().join("t_backup"));
    h.counters.begin(Category::Challenges);

    let run = backup_challenges(&h.ctx()).unwrap();
    assert_eq!(run.summary.len(), 2);
    let names: Vec<&str> = run.summary.records().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["three", "one"]);
    assert_eq!(run.report.listed, 3);
    assert_eq!(run.report.processed, 2);
    assert_eq!(run.report.failed, 1);

    let chals = h.layout.category_dir(Category::Challenges);
    let index = fs::read_to_string(chals.join("README.md")).unwrap();
    assert!(index.contains("Total: 2 challenges in 2 categories"));
    assert!(index.contains("[one](./web/one_1/)"));
    assert!(index.contains("[three](./crypto/three_3/)"));
    assert!(!index.contains("two"));

    let three = chals.join("crypto").join("three_3");
    assert_eq!(fs::read(three.join("notes.txt")).unwrap(), b"hello");
    assert!(three.join("description.md").is_file());
    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(three.join("challenge.json")).unwrap()).unwrap();
    assert_eq!(record["files"][0]["download"]["ok"], true);
    assert_eq!(record["files"][0]["download"]["bytes"], 5);
    assert!(chals.join("web").join("one_1").join("description.md").is_file());
}

fn read_json(path: &std::path::Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn same_named_challenges_keep_separate_folders() {
    let api = MockApi::start();
    api.json(
        "/api/v1/challenges?page=1",
        json!([{"id": 1, "name": "login"}, {"id": 2, "name": "login"}]),
    );
    mount_challenge(&api, 1, "login", "web", 100);
    mount_challenge(&api, 2, "login", "web", 200);

    let dir = tempdir().unwrap();
    let h = Harness::new(common::config(api.url(), dir.path()), &dir.path().join("t_backup"));
    h.counters.begin(Category::Challenges);

    let run = backup_challenges(&h.ctx()).unwrap();
    assert_eq!(run.report.processed, 2);

    let web = h.layout.category_dir(Category::Challenges).join("web");
    let mut dirs: Vec<String> = fs::read_dir(&web)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    dirs.sort();
    assert_eq!(dirs, vec!["login_1", "login_2"]);
    assert_eq!(read_json(&web.join("login_1").join("challenge.json"))["id"], 1);
    assert_eq!(read_json(&web.join("login_2").join("challenge.json"))["value"], 200);

    let index = fs::read_to_string(h.layout.category_dir(Category::Challenges).join("README.md")).unwrap();
    assert!(index.contains("(./web/login_1/)"));
    assert!(index.contains("(./web/login_2/)"));
}

#[test]
fn same_named_attachments_are_both_kept() {
    let api = MockApi::start();
    api.json("/api/v1/challenges?page=1", json!([{"id": 4, "name": "twins"}]));
    api.json(
        "/api/v1/challenges/4",
        json!({"id": 4, "name": "twins", "category": "misc", "value": 50,
               "files": ["/files/aaa/flag.txt?token=1", "/files/bbb/flag.txt?token=2"]}),
    );
    api.json("/api/v1/challenges/4/solves", json!([]));
    api.raw("/files/aaa/flag.txt", 200, "text/plain", vec![b'a'; 100_000]);
    api.raw("/files/bbb/flag.txt", 200, "text/plain", b"bbbbbbbbbb".to_vec());

    let dir = tempdir().unwrap();
    let h = Harness::new(common::config(api.url(), dir.path()), &dir.path().join("t_backup"));
    h.counters.begin(Category::Challenges);
    backup_challenges(&h.ctx()).unwrap();

    let twins = h.layout.category_dir(Category::Challenges).join("misc").join("twins_4");
    assert_eq!(fs::read(twins.join("flag.txt")).unwrap().len(), 100_000);
    assert_eq!(fs::read(twins.join("flag_2.txt")).unwrap(), b"bbbbbbbbbb");

    let record = read_json(&twins.join("challenge.json"));
    assert_eq!(record["files"][0]["name"], "flag.txt");
    assert_eq!(record["files"][0]["download"]["bytes"], 100_000);
    assert_eq!(record["files"][1]["name"], "flag_2.txt");
    assert_eq!(record["files"][1]["download"]["bytes"], 10);
    assert_ne!(record["files"][0]["download"]["sha256"], record["files"][1]["download"]["sha256"]);
}

#[test]
fn attachment_downloads_respect_file_cap() {
    let api = MockApi::start();
    let links: Vec<String> = (1..=6).map(|i| format!("/files/h{}/part{}.bin", i, i)).collect();
    api.json("/api/v1/challenges?page=1", json!([{"id": 9, "name": "bulk"}]));
    api.json(
        "/api/v1/challenges/9",
        json!({"id": 9, "name": "bulk", "category": "forensics", "value": 300, "files": links}),
    );
    api.json("/api/v1/challenges/9/solves", json!([]));
    for (i, link) in links.iter().enumerate() {
        api.raw_delayed(
            link,
            200,
            "application/octet-stream",
            vec![i as u8; 64],
            Some(Duration::from_millis(100)),
        );
    }

    let dir = tempdir().unwrap();
    let mut config = common::config(api.url(), dir.path());
    config.workers.files = 2;
    let h = Harness::new(config, &dir.path().join("t_backup"));
    h.counters.begin(Category::Challenges);

    let run = backup_challenges(&h.ctx()).unwrap();
    assert_eq!(run.report.processed, 1);
    assert!(api.peak_in_flight() <= 2, "peak {}", api.peak_in_flight());

    let bulk = h.layout.category_dir(Category::Challenges).join("forensics").join("bulk_9");
    for i in 1..=6u8 {
        assert_eq!(fs::read(bulk.join(format!("part{}.bin", i))).unwrap(), vec![i - 1; 64]);
    }
    let record = read_json(&bulk.join("challenge.json"));
    let files = record["files"].as_array().unwrap();
    assert_eq!(files.len(), 6);
    assert!(files.iter().all(|f| f["download"]["ok"] == true));
}

#[test]
fn team_counters_and_index() {
    let api = MockApi::start();
    api.json(
        "/api/v1/teams?page=1",
        json!([{"id": 1, "name": "zeta"}, {"id": 2, "name": "Alpha"}, {"id": 3, "name": "idle"}]),
    );
    mount_team(&api, 1, "zeta", 2);
    mount_team(&api, 2, "Alpha", 1);
    mount_team(&api, 3, "idle", 0);

    let dir = tempdir().unwrap();
    let h = Harness::new(common::config(api.url(), dir.path()), &dir.path().join("t_backup"));
    h.counters.begin(Category::Teams);

    let run = backup_teams(&h.ctx()).unwrap();
    let snapshot = h.counters.snapshot();
    assert_eq!(snapshot.processed, 2);
    assert_eq!(snapshot.failed, 1);
    assert_eq!(run.report.status, CategoryStatus::Completed);

    let names: Vec<&str> = run.summary.records().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "zeta"]);

    let teams = h.layout.category_dir(Category::Teams);
    assert!(teams.join("zeta_1").join("team_info.json").is_file());
    assert!(teams.join("Alpha_2").join("README.md").is_file());
    assert!(!teams.join("idle_3").exists());
    let index = fs::read_to_string(teams.join("README.md")).unwrap();
    assert!(index.find("Alpha").unwrap() < index.find("zeta").unwrap());
}

#[test]
fn entity_workers_respect_cap() {
    let api = MockApi::start();
    let stubs: Vec<_> = (1..=8).map(|id| json!({"id": id, "name": format!("t{}", id)})).collect();
    api.json("/api/v1/teams?page=1", json!(stubs));
    for id in 1..=8u64 {
        api.json_delayed(
            &format!("/api/v1/teams/{}", id),
            json!({"id": id, "name": format!("t{}", id), "members": []}),
            Some(Duration::from_millis(50)),
        );
        api.json(&format!("/api/v1/teams/{}/solves", id), json!([{"date": "x"}]));
    }

    let dir = tempdir().unwrap();
    let mut config = common::config(api.url(), dir.path());
    config.workers.participants = 3;
    let h = Harness::new(config, &dir.path().join("t_backup"));
    h.counters.begin(Category::Teams);

    let run = backup_teams(&h.ctx()).unwrap();
    assert_eq!(run.summary.len(), 8);
    assert!(api.peak_in_flight() <= 3, "peak {}", api.peak_in_flight());
}

#[test]
fn run_skips_disabled_and_survives_aborted_categories() {
    let api = MockApi::start();
    api.status("/api/v1/challenges?page=1", 500);
    api.json("/api/v1/users?page=1", json!([{"id": 5, "name": "solo"}]));
    api.json("/api/v1/users/5", json!({"id": 5, "name": "solo", "score": 10}));
    api.json("/api/v1/users/5/solves", json!([{"challenge": {"name": "c"}, "date": "d"}]));
    api.json("/api/v1/users/5/awards", json!([]));

    let dir = tempdir().unwrap();
    let mut config = common::config(api.url(), dir.path());
    config.categories = CategorySelection {
        scoreboard: false,
        challenges: true,
        teams: false,
        users: true,
    };
    let orchestrator = Orchestrator::new(config).unwrap();
    let report = orchestrator.run().unwrap();

    assert_eq!(report.root, dir.path().join("test_backup"));
    let order: Vec<Category> = report.categories.iter().map(|r| r.category).collect();
    assert_eq!(order, Category::ALL.to_vec());

    let status = |c| report.category(c).map(|r| r.status.clone());
    assert_eq!(status(Category::Scoreboard), Some(CategoryStatus::Disabled));
    assert_eq!(status(Category::Teams), Some(CategoryStatus::Disabled));
    assert!(matches!(status(Category::Challenges), Some(CategoryStatus::Aborted(_))));
    assert_eq!(status(Category::Users), Some(CategoryStatus::Completed));
    assert!(!report.is_complete());

    let users = report.category(Category::Users).unwrap();
    assert_eq!((users.listed, users.processed, users.failed), (1, 1, 0));
    assert!(report.root.join("Users").join("solo_5").join("user_info.json").is_file());
    assert_eq!(api.hits("/api/v1/scoreboard"), 0);
    assert_eq!(api.hits("/api/v1/teams?page=1"), 0);
}

#[test]
fn invalid_config_is_rejected_before_running() {
    let dir = tempdir().unwrap();
    let mut config = common::config("ftp://example.com", dir.path());
    assert!(Orchestrator::new(config.clone()).is_err());
    config.base_url = "http://example.com".to_string();
    config.workers.files = 0;
    assert!(Orchestrator::new(config).is_err());
}

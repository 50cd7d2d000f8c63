use drive::config::ConfigLoader;
use drive::error::ApiError;
use drive::tooling::cli::Commands;
use drive::views::SortMode;
use std::path::PathBuf;

use crate::integration::support::{CliFixture, FakeService};

fn list_json() -> Commands {
    Commands::List {
        search: String::new(),
        sort: SortMode::Default,
        type_filter: None,
        format: "json".to_string(),
    }
}

#[test]
fn upload_and_list_json_contract() {
    let fixture = CliFixture::new();
    fixture.write_file("a.txt", "alpha");
    let service = FakeService::new();
    let cli = fixture.context(&service);

    let output = cli
        .execute(&Commands::Upload {
            paths: vec![PathBuf::from("a.txt")],
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let upload = &parsed["uploads"][0];
    assert_eq!(upload["file"], "a.txt");
    assert_eq!(upload["transaction_id"], "tx0001");

    let output = cli.execute(&list_json()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["owner_name"], "Ada");
    assert_eq!(parsed["total"], 1);
    assert_eq!(parsed["sort"], "default");
    let item = &parsed["items"][0];
    assert_eq!(item["name"], "a.txt");
    assert_eq!(item["media_type"], "text/plain");
    assert_eq!(item["transaction_id"], "tx0001");
    assert_eq!(item["is_retrieved"], false);
    assert_eq!(item["owned_locally"], true);
    assert!(item.get("owner_private_key").is_none());
}

#[test]
fn session_snapshot_carries_items_between_runs() {
    let fixture = CliFixture::new();
    fixture.write_file("a.txt", "alpha");
    let service = FakeService::new();
    {
        let cli = fixture.context(&service);
        cli.execute(&Commands::Upload {
            paths: vec![PathBuf::from("a.txt")],
            format: "text".to_string(),
        })
        .unwrap();
        cli.execute(&Commands::Owner {
            name: Some("Grace".to_string()),
        })
        .unwrap();
    }
    assert!(fixture.snapshot_path().exists());

    let cli = fixture.context(&service);
    let owner = cli.execute(&Commands::Owner { name: None }).unwrap();
    assert_eq!(owner, "Grace");
    let parsed: serde_json::Value =
        serde_json::from_str(&cli.execute(&list_json()).unwrap()).unwrap();
    assert_eq!(parsed["total"], 1);
    assert_eq!(parsed["items"][0]["name"], "a.txt");
}

#[test]
fn retrieve_with_save_writes_download() {
    let fixture = CliFixture::new();
    let service = FakeService::new();
    service.seed("ext42", "report.pdf", "Grace", b"%PDF-1.7");
    let cli = fixture.context(&service);

    let output = cli
        .execute(&Commands::Retrieve {
            id: "ext42".to_string(),
            save: true,
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["outcome"], "added");
    assert_eq!(parsed["index"], 0);
    assert_eq!(parsed["item"]["name"], "report.pdf");
    assert_eq!(parsed["item"]["media_type"], "application/pdf");
    assert_eq!(parsed["item"]["size"], 8);
    assert!(parsed["item"]["blake3"].as_str().is_some());

    let saved = fixture.downloads().join("report.pdf");
    assert_eq!(parsed["saved_to"], saved.display().to_string());
    assert_eq!(std::fs::read(saved).unwrap(), b"%PDF-1.7");
}

#[test]
fn download_in_new_run_retrieves_first() {
    let fixture = CliFixture::new();
    let service = FakeService::new();
    service.seed("ext42", "report.pdf", "Grace", b"%PDF-1.7");
    fixture.context(&service)
        .execute(&Commands::Retrieve {
            id: "ext42".to_string(),
            save: false,
            format: "text".to_string(),
        })
        .unwrap();

    // Content is never persisted, so the next run fetches it again.
    let cli = fixture.context(&service);
    let output = cli
        .execute(&Commands::Download {
            id: "ext42".to_string(),
            dir: None,
        })
        .unwrap();

    assert!(output.starts_with("Saved "));
    assert_eq!(service.fetches(), 2);
    assert_eq!(service.lookups(), 1);
    assert!(fixture.downloads().join("report.pdf").exists());
}

#[test]
fn unreadable_session_snapshot_is_left_untouched() {
    let fixture = CliFixture::new();
    std::fs::create_dir_all(fixture.snapshot_path().parent().unwrap()).unwrap();
    std::fs::write(fixture.snapshot_path(), "not json").unwrap();
    fixture.write_file("a.txt", "alpha");
    let service = FakeService::new();
    let cli = fixture.context(&service);

    cli.execute(&Commands::Upload {
        paths: vec![PathBuf::from("a.txt")],
        format: "text".to_string(),
    })
    .unwrap();

    assert_eq!(
        std::fs::read_to_string(fixture.snapshot_path()).unwrap(),
        "not json"
    );
}

#[test]
fn failed_upload_surfaces_service_error() {
    let fixture = CliFixture::new();
    fixture.write_file("a.txt", "alpha");
    let service = FakeService::new();
    service
        .fail_uploads
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let cli = fixture.context(&service);

    let result = cli.execute(&Commands::Upload {
        paths: vec![PathBuf::from("a.txt")],
        format: "text".to_string(),
    });

    assert!(matches!(result, Err(ApiError::ServiceRejected { status: 500, .. })));
    assert!(!fixture.snapshot_path().exists());
}

#[test]
fn failed_json_upload_is_an_error() {
    let fixture = CliFixture::new();
    fixture.write_file("a.txt", "alpha");
    let service = FakeService::new();
    service
        .fail_uploads
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let cli = fixture.context(&service);

    let result = cli.execute(&Commands::Upload {
        paths: vec![PathBuf::from("a.txt")],
        format: "json".to_string(),
    });

    assert!(matches!(result, Err(ApiError::ServiceRejected { status: 500, .. })));
    assert!(!fixture.snapshot_path().exists());
}

#[test]
fn unreadable_path_is_reported_per_file() {
    let fixture = CliFixture::new();
    fixture.write_file("a.txt", "alpha");
    let service = FakeService::new();
    let cli = fixture.context(&service);

    let output = cli
        .execute(&Commands::Upload {
            paths: vec![PathBuf::from("a.txt"), PathBuf::from("missing.txt")],
            format: "json".to_string(),
        })
        .unwrap();
    assert_eq!(service.uploads(), 1);
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let rows = parsed["uploads"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["file"], "a.txt");
    assert_eq!(rows[0]["transaction_id"], "tx0001");
    assert_eq!(rows[1]["file"], "missing.txt");
    assert!(rows[1]["error"].as_str().unwrap().contains("I/O error"));
    assert!(fixture.snapshot_path().exists());

    let text = cli
        .execute(&Commands::Upload {
            paths: vec![PathBuf::from("missing.txt"), PathBuf::from("a.txt")],
            format: "text".to_string(),
        })
        .unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("Failed missing.txt:"));
    assert_eq!(lines[1], "Uploaded a.txt (transaction tx0002)");
}

#[test]
fn only_unreadable_paths_fail_the_command() {
    let fixture = CliFixture::new();
    let service = FakeService::new();
    let cli = fixture.context(&service);

    let result = cli.execute(&Commands::Upload {
        paths: vec![PathBuf::from("missing.txt")],
        format: "json".to_string(),
    });

    assert!(matches!(
        result,
        Err(ApiError::StorageError(drive::error::StorageError::IoError(_)))
    ));
    assert_eq!(service.uploads(), 0);
}

#[test]
fn show_text_and_unknown_id() {
    let fixture = CliFixture::new();
    let service = FakeService::new();
    service.seed("ext42", "report.pdf", "Grace", b"%PDF-1.7");
    let cli = fixture.context(&service);
    cli.execute(&Commands::Retrieve {
        id: "ext42".to_string(),
        save: false,
        format: "text".to_string(),
    })
    .unwrap();

    let output = cli
        .execute(&Commands::Show {
            id: "ext42".to_string(),
            format: "text".to_string(),
        })
        .unwrap();
    assert!(output.contains("report.pdf"));
    assert!(output.contains("Transaction: ext42"));
    assert!(output.contains("BLAKE3"));

    let missing = cli.execute(&Commands::Show {
        id: "nothere".to_string(),
        format: "text".to_string(),
    });
    assert!(matches!(missing, Err(ApiError::NotFound(_))));
}

#[test]
fn keys_json_reports_configured_public_key() {
    let mut fixture = CliFixture::new();
    fixture.config.keys.public_key = Some("aa11".to_string());
    fixture.config.keys.private_key = Some("bb22".to_string());
    let service = FakeService::new();
    let cli = fixture.context(&service);

    let output = cli
        .execute(&Commands::Keys {
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["public_key"], "aa11");
    assert_eq!(parsed["owner_name"], "Ada");
    assert!(parsed.get("private_key").is_none());
}

#[test]
fn init_writes_workspace_config_once() {
    let fixture = CliFixture::new();
    let service = FakeService::new();
    let cli = fixture.context(&service);

    cli.execute(&Commands::Init {
        owner: Some("Grace".to_string()),
        force: false,
    })
    .unwrap();

    let path = ConfigLoader::workspace_config_path(&fixture.workspace());
    let written = ConfigLoader::load_from_file(&path).unwrap();
    assert_eq!(written.owner_name, "Grace");
    assert_eq!(
        written.keys.public_key.as_deref(),
        Some(cli.drive().keys().public_key.as_str())
    );
    assert_eq!(cli.drive().owner_name(), "Grace");

    let again = cli.execute(&Commands::Init {
        owner: Some("Grace".to_string()),
        force: false,
    });
    assert!(matches!(again, Err(ApiError::ConfigError(_))));
}

#[test]
fn export_and_import_commands() {
    let fixture = CliFixture::new();
    fixture.write_file("a.txt", "alpha");
    let service = FakeService::new();
    let cli = fixture.context(&service);
    cli.execute(&Commands::Upload {
        paths: vec![PathBuf::from("a.txt")],
        format: "text".to_string(),
    })
    .unwrap();
    let exported = fixture.temp.path().join("exported.json");

    let output = cli
        .execute(&Commands::Export {
            path: exported.clone(),
        })
        .unwrap();
    assert!(output.starts_with("Exported 1 items"));

    let other = CliFixture::new();
    let cli = other.context(&service);
    let output = cli.execute(&Commands::Import { path: exported }).unwrap();
    assert!(output.starts_with("Imported 1 items"));
    assert!(other.snapshot_path().exists());
}

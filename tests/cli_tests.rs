mod test_helpers;

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use std::fs;
use test_helpers::TestDiary;

#[test]
fn test_cli_help_lists_subcommands() {
    Command::cargo_bin("deary")
        .unwrap()
        .arg("help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("create"))
                .and(predicate::str::contains("list"))
                .and(predicate::str::contains("show")),
        );
}

#[test]
fn test_cli_requires_subcommand() {
    Command::cargo_bin("deary").unwrap().assert().failure().code(2);
}

#[test]
#[serial]
fn test_end_to_end_hello() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    diary.init();
    assert!(diary.list().is_empty());

    let id = diary.create("hello");
    assert_eq!(id.len(), "YYYYMMDD-HHMMSS".len());

    assert_eq!(diary.list(), vec![id.clone()]);

    diary
        .command("true")
        .arg("show")
        .arg(&id)
        .assert()
        .success()
        .stdout("hello\n");

    let stored = fs::read(diary.repo_dir().join(&id)).unwrap();
    assert!(!stored.windows(5).any(|w| w == b"hello"));
    assert!(diary.scratch_leftovers().is_empty());
}

#[test]
#[serial]
fn test_empty_entry_is_abandoned() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    diary.init();

    diary
        .command(&diary.writing_editor(""))
        .arg("create")
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("nothing saved"));

    let whitespace_editor = diary.editor("blank", "printf '\\n  \\n' > \"$1\"");
    diary
        .command(&whitespace_editor)
        .arg("create")
        .assert()
        .success();

    assert!(diary.list().is_empty());
    assert!(diary.scratch_leftovers().is_empty());
}

#[test]
#[serial]
fn test_init_twice_fails_with_already_exists() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    diary.init();
    let id = diary.create("first");

    diary
        .command("true")
        .arg("init")
        .arg("ABCD1234")
        .assert()
        .failure()
        .code(8)
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(diary.list(), vec![id.clone()]);
    diary
        .command("true")
        .arg("show")
        .arg(&id)
        .assert()
        .success()
        .stdout("first\n");
}

#[test]
#[serial]
fn test_commands_before_init_report_missing_diary() {
    let Some(diary) = TestDiary::new() else {
        return;
    };

    diary
        .command("true")
        .arg("list")
        .assert()
        .failure()
        .code(11)
        .stderr(predicate::str::contains("deary init"));
}

#[test]
#[serial]
fn test_show_unknown_entry_is_not_found() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    diary.init();

    diary
        .command("true")
        .arg("show")
        .arg("20000101-000000")
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("not found"));
}

#[test]
#[serial]
fn test_show_rejects_metadata_names() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    diary.init();

    diary
        .command("true")
        .arg("show")
        .arg(".key_id")
        .assert()
        .failure()
        .code(2);
}

#[test]
#[serial]
fn test_edit_and_delete() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    diary.init();
    let id = diary.create("draft");

    diary
        .command(&diary.writing_editor("final"))
        .arg("edit")
        .arg(&id)
        .assert()
        .success()
        .stdout(format!("{}\n", id));
    diary
        .command("true")
        .arg("show")
        .arg(&id)
        .assert()
        .success()
        .stdout("final\n");

    // `true` leaves the file as it was
    diary
        .command("true")
        .arg("edit")
        .arg(&id)
        .assert()
        .success()
        .stderr(predicate::str::contains("No changes"));

    diary
        .command("true")
        .arg("delete")
        .arg(&id)
        .assert()
        .success();
    assert!(diary.list().is_empty());

    diary
        .command("true")
        .arg("delete")
        .arg(&id)
        .assert()
        .failure()
        .code(10);
    assert!(diary.scratch_leftovers().is_empty());
}

#[test]
#[serial]
fn test_missing_editor_fails_without_leftovers() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    diary.init();

    diary
        .command("deary-no-such-editor")
        .arg("create")
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("not found"));

    assert!(diary.list().is_empty());
    assert!(diary.scratch_leftovers().is_empty());
}

#[test]
#[serial]
fn test_reading_ignores_editor_with_arguments() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    diary.init();
    let id = diary.create("hello");

    diary
        .command("vim -n")
        .arg("list")
        .assert()
        .success()
        .stdout(format!("{}\n", id));
    diary
        .command("code --wait")
        .arg("show")
        .arg(&id)
        .assert()
        .success()
        .stdout("hello\n");
}

#[test]
#[serial]
fn test_init_ignores_editor_with_arguments() {
    let Some(diary) = TestDiary::new() else {
        return;
    };

    diary
        .command("emacsclient -t")
        .arg("init")
        .arg(&diary.recipient)
        .assert()
        .success();
}

#[test]
#[serial]
fn test_create_with_editor_arguments_is_config_error() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    diary.init();

    diary
        .command("vim -n")
        .arg("create")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("cannot contain spaces"));

    assert!(diary.list().is_empty());
    assert!(diary.scratch_leftovers().is_empty());
}

#[test]
#[serial]
fn test_scratch_on_disk_is_refused() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    diary.init();
    let on_disk = tempfile::tempdir().unwrap();
    if deary::crypto::scratch::is_memory_backed(on_disk.path()).unwrap_or(true) {
        return;
    }

    diary
        .command(&diary.writing_editor("never"))
        .env("DEARY_SCRATCH_DIR", on_disk.path())
        .arg("create")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("memory-backed"));

    assert!(diary.list().is_empty());
    assert_eq!(fs::read_dir(on_disk.path()).unwrap().count(), 0);
}

#[test]
#[serial]
fn test_entries_listed_in_creation_order() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    diary.init();

    let ids: Vec<String> = ["one", "two", "three"]
        .iter()
        .map(|text| diary.create(text))
        .collect();

    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(diary.list(), ids);
}

//! Entry lifecycle against a real git repository and the age engine.

mod test_helpers;

use deary::crypto::{AgeEngine, CryptoEngine};
use deary::editor::SystemEditor;
use deary::errors::{AppError, RepoError};
use deary::interrupt::InterruptFlag;
use deary::ops::{self, CreateOutcome, EditOutcome, Journal};
use deary::repo::{EntryRepository, GitRepository};
use deary::EntryId;
use test_helpers::TestDiary;

fn journal(diary: &TestDiary, editor: String) -> Journal {
    let repo = GitRepository::open(&diary.repo_dir()).expect("open repository");
    Journal::new(
        Box::new(repo),
        Box::new(AgeEngine::new(diary.identity_path())),
        Box::new(SystemEditor { editor_cmd: editor }),
        vec![diary.scratch.path().to_path_buf()],
        InterruptFlag::detached(),
        diary.recipient.clone(),
    )
}

fn init(diary: &TestDiary) -> GitRepository {
    ops::init_repository(&diary.repo_dir(), &diary.recipient).expect("init diary")
}

#[test]
fn test_create_show_list_roundtrip() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    init(&diary);
    let journal = journal(&diary, diary.writing_editor("hello"));

    let id = match ops::create_entry(&journal).unwrap() {
        CreateOutcome::Committed(id) => id,
        CreateOutcome::Abandoned => panic!("entry should have been committed"),
    };

    assert_eq!(ops::list_entries(&journal).unwrap(), vec![id.clone()]);
    assert_eq!(ops::show_entry(&journal, &id).unwrap().as_slice(), b"hello");
    assert!(diary.scratch_leftovers().is_empty());

    // The committed blob is age ciphertext for the diary's recipient.
    let repo = GitRepository::open(&diary.repo_dir()).unwrap();
    let blob = repo.read_tracked(id.as_str()).unwrap();
    let engine = AgeEngine::new(diary.identity_path());
    assert_eq!(engine.decrypt(&blob).unwrap().as_slice(), b"hello");
}

#[test]
fn test_same_second_entries_get_suffixes() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    init(&diary);
    let journal = journal(&diary, diary.writing_editor("again"));
    let base = EntryId::parse("20240115-093005").unwrap();

    let first = ops::create_entry_as(&journal, base.clone()).unwrap();
    let second = ops::create_entry_as(&journal, base.clone()).unwrap();

    assert_eq!(first, CreateOutcome::Committed(base.clone()));
    assert_eq!(second, CreateOutcome::Committed(base.with_suffix(2)));
    assert_eq!(
        ops::list_entries(&journal).unwrap(),
        vec![base.clone(), base.with_suffix(2)]
    );
}

#[test]
fn test_empty_entry_leaves_history_alone() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    init(&diary);
    let journal = journal(&diary, diary.writing_editor(""));

    assert_eq!(ops::create_entry(&journal).unwrap(), CreateOutcome::Abandoned);
    assert!(ops::list_entries(&journal).unwrap().is_empty());
    assert!(diary.scratch_leftovers().is_empty());
}

#[test]
fn test_editor_removing_file_counts_as_empty() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    init(&diary);
    let journal = journal(&diary, diary.editor("remover", "rm -f \"$1\""));

    assert_eq!(ops::create_entry(&journal).unwrap(), CreateOutcome::Abandoned);
    assert!(diary.scratch_leftovers().is_empty());
}

#[test]
fn test_rename_saving_editor_is_cleaned_up() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    init(&diary);
    // Saves like editors that write a sibling file and rename it into place.
    let editor = diary.editor(
        "renamer",
        "printf 'renamed' > \"$1.swp\" && mv \"$1.swp\" \"$1\"",
    );
    let journal = journal(&diary, editor);

    let id = match ops::create_entry(&journal).unwrap() {
        CreateOutcome::Committed(id) => id,
        CreateOutcome::Abandoned => panic!("entry should have been committed"),
    };
    assert_eq!(ops::show_entry(&journal, &id).unwrap().as_slice(), b"renamed");
    assert!(diary.scratch_leftovers().is_empty());
}

#[test]
fn test_edit_keeps_identifier() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    init(&diary);
    let base = EntryId::parse("20240115-093005").unwrap();
    ops::create_entry_as(&journal(&diary, diary.writing_editor("draft")), base.clone()).unwrap();

    let editor = diary.editor("appender", "printf ' and more' >> \"$1\"");
    let journal = journal(&diary, editor);
    assert_eq!(ops::edit_entry(&journal, &base).unwrap(), EditOutcome::Saved);

    assert_eq!(
        ops::show_entry(&journal, &base).unwrap().as_slice(),
        b"draft and more"
    );
    assert_eq!(ops::list_entries(&journal).unwrap(), vec![base]);
    assert!(diary.scratch_leftovers().is_empty());
}

#[test]
fn test_delete_then_show_is_not_found() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    init(&diary);
    let journal = journal(&diary, diary.writing_editor("short lived"));
    let id = EntryId::parse("20240115-093005").unwrap();
    ops::create_entry_as(&journal, id.clone()).unwrap();

    ops::delete_entry(&journal, &id).unwrap();

    assert!(matches!(
        ops::show_entry(&journal, &id),
        Err(AppError::Repo(RepoError::NotFound { .. }))
    ));
    assert!(ops::list_entries(&journal).unwrap().is_empty());
}

#[test]
fn test_wrong_identity_cannot_show() {
    let Some(diary) = TestDiary::new() else {
        return;
    };
    init(&diary);
    let id = EntryId::parse("20240115-093005").unwrap();
    ops::create_entry_as(&journal(&diary, diary.writing_editor("private")), id.clone()).unwrap();

    let Some(stranger) = TestDiary::new() else {
        return;
    };
    let journal = Journal::new(
        Box::new(GitRepository::open(&diary.repo_dir()).unwrap()),
        Box::new(AgeEngine::new(stranger.identity_path())),
        Box::new(SystemEditor {
            editor_cmd: "true".to_string(),
        }),
        vec![diary.scratch.path().to_path_buf()],
        InterruptFlag::detached(),
        diary.recipient.clone(),
    );

    assert!(matches!(
        ops::show_entry(&journal, &id),
        Err(AppError::Crypto(_))
    ));
}

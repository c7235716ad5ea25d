//! Selector, runner and store working together through the public API

use std::fs;
use std::io::Cursor;

use kickstart::config::default_groups;
use kickstart::display::{LineKind, MemoryDisplay};
use kickstart::selector::{AfterTutorial, ByteKeys, Selector, SelectorExit};
use kickstart::tui::PlainScreen;
use kickstart::{EditorLauncher, Outcome, ScriptedInput, Session, Translator, Workspace, tutorials};
use progressstore::ProgressStore;
use tempfile::TempDir;

fn selector(temp: &TempDir, keys: &[u8], answers: &[&str]) -> (Selector, MemoryDisplay) {
    let store = ProgressStore::load(temp.path().join("state.json"), default_groups()).expect("store should load");
    let display = MemoryDisplay::new();
    let session = Session::new(
        Box::new(display.clone()),
        Box::new(ScriptedInput::new(answers.iter().copied())),
        Translator::english(),
        EditorLauncher::default(),
        Workspace::new(temp.path().join("work")),
    );
    let selector = Selector::new(
        store,
        tutorials::registry().expect("registry should build"),
        session,
        Box::new(ByteKeys::new(Cursor::new(keys.to_vec()))),
        Box::new(PlainScreen::new(Box::new(display.clone()))),
    )
    .expect("selector should build");
    (selector, display)
}

fn create_project(temp: &TempDir) {
    let project = temp.path().join("work/mcp-weather");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("pyproject.toml"), "[project]\nname = \"mcp-weather\"\n").unwrap();
}

#[test]
fn test_satisfied_tutorial_completes_from_menu() {
    let temp = TempDir::new().unwrap();
    create_project(&temp);

    let (mut selector, display) = selector(&temp, b"\rq", &["", ""]);
    assert_eq!(selector.run().unwrap(), SelectorExit::Quit);

    let store = selector.into_store();
    assert!(store.is_completed("MakeProject"));
    assert!((store.total_progress() - 0.2).abs() < 1e-9);
    assert!(display.contains("You've completed step 1 of 1."));
    assert!(display.contains("MakeProject marked complete."));

    // A fresh process sees the same progress
    let reloaded = ProgressStore::load(temp.path().join("state.json"), default_groups()).unwrap();
    assert!(reloaded.is_completed("MakeProject"));
    assert_eq!(reloaded.state().current_tutorial.as_deref(), Some("MakeProject"));
}

#[test]
fn test_unfinished_tutorial_is_left_incomplete() {
    let temp = TempDir::new().unwrap();
    create_project(&temp);

    // Down to ModifyToml; the pyproject has no script entry, so pick "4. Exit tutorial"
    let (selector, display) = selector(&temp, b"j\r", &["4", ""]);
    let mut selector = selector.with_after(AfterTutorial::Exit);

    let exit = selector.run().unwrap();
    assert_eq!(
        exit,
        SelectorExit::Ran {
            name: "ModifyToml".to_string(),
            outcome: Outcome::Incomplete,
        }
    );
    assert!(!selector.store().is_completed("ModifyToml"));
    assert!(display.contains("Exiting ModifyToml."));
}

#[test]
fn test_cursor_survives_restart() {
    let temp = TempDir::new().unwrap();

    // Right to the server group, then quit
    let (mut first, _) = selector(&temp, b"lq", &[]);
    first.run().unwrap();
    drop(first);

    let (mut second, display) = selector(&temp, b"q", &[]);
    assert_eq!(second.navigator().group_index(), 1);
    second.run().unwrap();

    let view = second.view();
    let selected = view.selected().expect("a group is selected");
    assert_eq!(selected.key, "server");
    assert_eq!(selected.tutorials[0].name, "MakeServer");
    assert!(display.of_kind(LineKind::Instruct).iter().any(|l| l.contains("MakeServer")));
}

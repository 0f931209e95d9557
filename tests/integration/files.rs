//! Compiling from files on disk

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use trogdor::compile_file;
use trogdor::foundation::ErrorKind;
use trogdor::language::CompilerConfig;

fn write(dir: &TempDir, file: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(file);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn extension_selects_the_front_end() {
    let dir = TempDir::new().unwrap();
    let markup = write(&dir, "cave.xml", r#"<game><rooms><room name="start"><title>Cave</title></room></rooms></game>"#);
    let natural = write(&dir, "cave.ni", "The Cave is a room.");

    for path in [markup, natural] {
        let game = compile_file(&path, &CompilerConfig::default()).unwrap();
        assert_eq!(game.start_room().unwrap().title(), "Cave");
    }
}

#[test]
fn errors_name_the_file() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.ni", "The box is not open.\nThe box is open.");
    let err = compile_file(&path, &CompilerConfig::default()).unwrap_err();
    assert!(err.is_parse());
    assert!(err.to_string().contains("broken.ni"), "{err}");
    assert_eq!(err.line(), Some(2));
}

#[test]
fn scripts_resolve_next_to_the_source() {
    let dir = TempDir::new().unwrap();
    write(&dir, "init.lua", "start()");
    let path = write(&dir, 
        "game.xml",
        r#"<game><events><script src="init.lua"/></events><rooms><room name="start"/></rooms></game>"#,
    );
    let game = compile_file(&path, &CompilerConfig::default()).unwrap();
    let scripts = game.script_engine().scripts(&trogdor::runtime::ScriptOwner::Game);
    assert_eq!(scripts[0].source(), Some("start()"));
}

#[test]
fn missing_file() {
    let dir = TempDir::new().unwrap();
    let err = compile_file(dir.path().join("nowhere.xml"), &CompilerConfig::default()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Io { .. }));
}

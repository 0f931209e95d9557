//! Integration tests for script delivery

use std::fs;

use tempfile::TempDir;
use trogdor_foundation::{Error, Result};
use trogdor_language::{CompilerConfig, Instantiator, Vocabulary, parse_markup};
use trogdor_runtime::{Runtime, Script, ScriptEngine, ScriptOwner, compile_markup};

const SCRIPTED: &str = r#"<game>
  <classes><creatures><creature class="ghost"><events><script>haunt()</script></events></creature></creatures></classes>
  <events><script>init()</script><event name="tick">onTick</event></events>
  <rooms><room name="start"><events><event name="enter">onEnter</event></events></room></rooms>
  <creatures><ghost name="casper"/><ghost name="slimer"/></creatures>
</game>"#;

/// Records owners in load order and refuses scripts that mention `forbidden`.
#[derive(Debug, Default)]
struct Recorder {
    owners: Vec<ScriptOwner>,
}

impl ScriptEngine for Recorder {
    fn load(&mut self, owner: &ScriptOwner, script: &Script) -> Result<()> {
        if script.source().is_some_and(|s| s.contains("forbidden")) {
            return Err(Error::validation(format!("{owner} loaded a forbidden script"), 0));
        }
        self.owners.push(owner.clone());
        Ok(())
    }
}

fn instantiate(source: &str) -> Result<Recorder> {
    let vocabulary = Vocabulary::english();
    let parsed = parse_markup(source, &vocabulary)?;
    let mut instantiator = Instantiator::new(Runtime::with_engine(Recorder::default())?, &vocabulary);
    instantiator.instantiate(&parsed.ast)?;
    Ok(instantiator.into_backend().into_game().into_script_engine())
}

#[test]
fn store_keeps_scripts_by_owner() {
    let game = compile_markup(SCRIPTED, &CompilerConfig::default()).unwrap();
    let store = game.script_engine();
    assert_eq!(store.scripts(&ScriptOwner::Game), &[Script::Inline("init()".to_string())]);
    for ghost in ["casper", "slimer"] {
        let scripts = store.scripts(&ScriptOwner::Entity(ghost.to_string()));
        assert_eq!(scripts[0].source(), Some("haunt()"));
    }
    assert_eq!(game.settings().events.get("tick").map(String::as_str), Some("onTick"));
    let start = game.start_room().unwrap();
    assert_eq!(start.events.get("enter").map(String::as_str), Some("onEnter"));
}

#[test]
fn custom_engine_sees_class_scripts_per_entity() {
    let recorder = instantiate(SCRIPTED).unwrap();
    assert_eq!(
        recorder.owners,
        vec![
            ScriptOwner::Class("ghost".to_string()),
            ScriptOwner::Game,
            ScriptOwner::Entity("casper".to_string()),
            ScriptOwner::Entity("slimer".to_string()),
        ]
    );
}

#[test]
fn engine_errors_stop_instantiation() {
    let source = SCRIPTED.replace("init()", "forbidden()");
    let err = instantiate(&source).unwrap_err();
    assert!(err.to_string().contains("forbidden"));
}

#[test]
fn script_files_resolve_against_the_base() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("init.lua"), "print('hi')").unwrap();

    let source = r#"<game><events><script src="init.lua"/></events><rooms><room name="start"/></rooms></game>"#;
    let config = CompilerConfig::default().with_script_base(dir.path());
    let game = compile_markup(source, &config).unwrap();
    let scripts = game.script_engine().scripts(&ScriptOwner::Game);
    assert_eq!(scripts.len(), 1);
    assert_eq!(scripts[0].source(), Some("print('hi')"));
    assert!(matches!(&scripts[0], Script::File { path, .. } if path.ends_with("init.lua")));
}

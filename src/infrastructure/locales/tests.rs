use super::*;

struct TempLocales {
    root: PathBuf,
}

impl TempLocales {
    fn new() -> Self {
        let root = std::env::temp_dir().join(format!("herald-locales-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(root.join("source")).unwrap();
        Self { root }
    }

    fn write(&self, rel: &str, content: &str) {
        let path = self.root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

impl Drop for TempLocales {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

#[tokio::test]
async fn test_translation_overlays_source() {
    let dir = TempLocales::new();
    dir.write("source/a.json", r#"{ "b": "X", "c": "Y" }"#);
    dir.write("translated/fr/a.json", r#"{ "b": "X'" }"#);

    let store = LocaleStore::new("en");
    assert_eq!(store.load_dir(&dir.root).await.unwrap(), 2);

    let fr = store.get("fr").unwrap();
    assert_eq!(fr.get("a.b"), Some("X'"));
    assert_eq!(fr.get("a.c"), Some("Y"));

    let en = store.source().unwrap();
    assert_eq!(en.get("a.b"), Some("X"));
    assert_eq!(en.len(), fr.len());
}

#[tokio::test]
async fn test_zero_translations_still_exposes_source() {
    let dir = TempLocales::new();
    dir.write("source/general.yaml", "pong: Pong!\nnested:\n  deep: yes sir\n");

    let store = LocaleStore::new("en");
    assert_eq!(store.load_dir(&dir.root).await.unwrap(), 1);
    assert_eq!(store.codes(), vec!["en"]);

    let en = store.get("en").unwrap();
    assert_eq!(en.get("general.pong"), Some("Pong!"));
    assert_eq!(en.get("general.nested.deep"), Some("yes sir"));
}

#[tokio::test]
async fn test_missing_translated_files_fall_back() {
    let dir = TempLocales::new();
    dir.write("source/general.json", r#"{ "hello": "Hello" }"#);
    dir.write("source/commands.json", r#"{ "ping": { "reply": "Pong" } }"#);
    dir.write("translated/de/general.json", r#"{ "hello": "Hallo" }"#);

    let store = LocaleStore::new("en");
    store.load_dir(&dir.root).await.unwrap();

    let de = store.get("de").unwrap();
    assert_eq!(de.get("general.hello"), Some("Hallo"));
    assert_eq!(de.get("commands.ping.reply"), Some("Pong"));
    assert_eq!(de.overridden(), 1);
}

#[tokio::test]
async fn test_same_group_files_merge_first_wins() {
    let dir = TempLocales::new();
    dir.write(
        "source/general.json",
        r#"{ "hello": "Hello", "bye": "Bye", "menu": { "open": "Open" } }"#,
    );
    dir.write("source/general.yaml", "hello: Howdy\nthanks: Thanks\nmenu:\n  close: Close\n");
    dir.write("translated/fr/general.yaml", "thanks: Merci\n");

    let store = LocaleStore::new("en");
    store.load_dir(&dir.root).await.unwrap();

    let en = store.source().unwrap();
    assert_eq!(en.get("general.hello"), Some("Hello"));
    assert_eq!(en.get("general.bye"), Some("Bye"));
    assert_eq!(en.get("general.thanks"), Some("Thanks"));
    assert_eq!(en.get("general.menu.open"), Some("Open"));
    assert_eq!(en.get("general.menu.close"), Some("Close"));
    assert_eq!(en.len(), 5);

    let fr = store.get("fr").unwrap();
    assert_eq!(fr.get("general.thanks"), Some("Merci"));
    assert_eq!(fr.get("general.bye"), Some("Bye"));
}

#[tokio::test]
async fn test_malformed_translation_is_skipped() {
    let dir = TempLocales::new();
    dir.write("source/general.json", r#"{ "hello": "Hello" }"#);
    dir.write("translated/es/general.json", "{ not json");

    let store = LocaleStore::new("en");
    store.load_dir(&dir.root).await.unwrap();

    assert_eq!(store.get("es").unwrap().get("general.hello"), Some("Hello"));
}

#[tokio::test]
async fn test_malformed_source_fails() {
    let dir = TempLocales::new();
    dir.write("source/general.json", "{ not json");

    let store = LocaleStore::new("en");
    let err = store.load_dir(&dir.root).await.unwrap_err();
    assert!(matches!(err, LocaleError::Parse { .. }));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_missing_source_dir() {
    let root = std::env::temp_dir().join(format!("herald-missing-{}", uuid::Uuid::new_v4()));
    let store = LocaleStore::new("en");
    let err = store.load_dir(&root).await.unwrap_err();
    assert!(matches!(err, LocaleError::MissingSource(_)));
}

#[test]
fn test_lookup_before_load_degrades() {
    let store = LocaleStore::new("en");
    assert!(store.get("en").is_none());
    assert!(store.get_or_source("fr").is_none());
    assert!(store.is_empty());
}

#[test]
fn test_get_or_source_falls_back() {
    let store = LocaleStore::new("en");
    store.insert(Locale::source("en", HashMap::from([("k".to_string(), "v".to_string())])));
    assert_eq!(store.get_or_source("xx").unwrap().code, "en");
}

#[test]
fn test_group_name_strips_everything_after_first_dot() {
    assert_eq!(group_name("general.json"), Some("general"));
    assert_eq!(group_name("general.old.yaml"), Some("general"));
    assert_eq!(group_name(".hidden.json"), None);
    assert!(is_locale_file("a.yml"));
    assert!(!is_locale_file("README.md"));
}

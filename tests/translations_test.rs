//! Sanity checks on the shipped translation files: both languages must
//! parse and cover the same key tree so no locale falls back for keys
//! the other one has.

use std::collections::BTreeSet;
use std::path::Path;
use serde_json::Value;

fn load(lang: &str) -> Value {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("translations")
        .join(format!("{}.json", lang));
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("invalid JSON in {}: {}", path.display(), e))
}

fn collect_keys(prefix: &str, value: &Value, keys: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{}.{}", prefix, k)
                };
                collect_keys(&key, v, keys);
            }
        }
        _ => {
            keys.insert(prefix.to_string());
        }
    }
}

#[test]
fn both_languages_cover_the_same_keys() {
    let mut en_keys = BTreeSet::new();
    let mut fa_keys = BTreeSet::new();
    collect_keys("", &load("en"), &mut en_keys);
    collect_keys("", &load("fa"), &mut fa_keys);

    let only_en: Vec<_> = en_keys.difference(&fa_keys).collect();
    let only_fa: Vec<_> = fa_keys.difference(&en_keys).collect();
    assert!(
        only_en.is_empty() && only_fa.is_empty(),
        "missing in fa: {:?}; missing in en: {:?}",
        only_en,
        only_fa
    );
}

#[test]
fn handler_keys_are_present() {
    let mut keys = BTreeSet::new();
    collect_keys("", &load("en"), &mut keys);

    for key in [
        "commands.start.welcome",
        "commands.help.text",
        "commands.language.choose",
        "commands.admin.stats",
        "broadcast.confirm_prompt",
        "broadcast.invalid_schedule",
        "panel.lists_summary",
        "panel.ask_welcome",
        "moderation.warned",
        "download.too_large",
        "dialog.text_required",
    ] {
        assert!(keys.contains(key), "missing translation key {}", key);
    }
}

#[test]
fn placeholders_match_across_languages() {
    // The formatter substitutes {name}-style placeholders; a locale that
    // drops one silently loses information.
    let pairs = [
        ("commands.start.welcome", vec!["{name}"]),
        ("moderation.warned", vec!["{count}", "{limit}"]),
        ("download.too_large", vec!["{limit}"]),
        ("broadcast.result", vec!["{recipients}", "{sent}", "{failed}"]),
    ];

    for lang in ["en", "fa"] {
        let table = load(lang);
        for (key, placeholders) in &pairs {
            let mut value = &table;
            for part in key.split('.') {
                value = value.get(part).unwrap_or_else(|| panic!("{} missing {}", lang, key));
            }
            let text = value.as_str().unwrap_or_else(|| panic!("{} {} is not a string", lang, key));
            for placeholder in placeholders {
                assert!(
                    text.contains(placeholder),
                    "{} {} lost placeholder {}",
                    lang,
                    key,
                    placeholder
                );
            }
        }
    }
}

//! Translation strings exposed to the browser

use serde_json::{json, Map, Value};

use super::translator::Translator;
use crate::error::Result;
use crate::events::{EventManager, EventResult, JsTranslations, PanelEvent};

/// Core strings used by the panel's scripts, as `(key, msgid)`
const CORE_STRINGS: &[(&str, &str)] = &[
    ("ok", "Ok"),
    ("warning", "Warning!"),
    ("yes", "Yes"),
    ("no", "No"),
    ("confirmation_required", "Confirmation required"),
    ("close", "Close"),
    ("generate", "Generate"),
    ("show", "Show"),
    ("your_new_password", "Your new password"),
    (
        "password_generate_alert",
        "You must first generate a password by clicking on the generate button.",
    ),
];

/// Build the JS translation object
///
/// The `core` namespace is filled first; `GetJsTranslations` listeners may
/// then add or override namespaces.
pub fn js_translations(translator: &Translator, events: &EventManager, password_length: usize) -> Result<String> {
    let mut core: Map<String, Value> = CORE_STRINGS
        .iter()
        .map(|(key, msgid)| (key.to_string(), json!(translator.translate(msgid))))
        .collect();
    core.insert("password_length".to_string(), json!(password_length));

    let mut translations = JsTranslations::new();
    translations.insert("core".to_string(), core);

    let result = events.dispatch_with(
        &PanelEvent::GetJsTranslations,
        EventResult::with_translations(translations),
    );

    Ok(serde_json::to_string(&result.into_translations())?)
}

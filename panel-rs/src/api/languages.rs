//! Language index endpoints

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::accounts::{Principal, Role};
use crate::api::handlers::{ApiResult, SharedState};
use crate::i18n::{js_translations, LanguageEntry, Translator};
use crate::messages::PageMessages;

#[derive(Debug, Default, Deserialize)]
pub struct LanguagesQuery {
    #[serde(default)]
    pub locales_only: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum LanguageList {
    Languages { languages: Vec<LanguageEntry>, messages: PageMessages },
    Locales { locales: Vec<String>, messages: PageMessages },
}

/// GET /api/languages
pub async fn list_languages(
    State(state): State<SharedState>,
    _principal: Principal,
    Query(query): Query<LanguagesQuery>,
) -> ApiResult<impl IntoResponse> {
    let languages = state.languages.for_request();
    let mut messages = PageMessages::new();

    let list = if query.locales_only {
        let locales = languages.available_locales(&mut messages).await?;
        LanguageList::Locales { locales, messages }
    } else {
        let languages = languages.available_languages(&mut messages).await?;
        LanguageList::Languages { languages, messages }
    };
    Ok(Json(list))
}

#[derive(Debug, Serialize)]
struct Rebuilt {
    count: usize,
    messages: PageMessages,
}

/// POST /api/admin/languages/rebuild
pub async fn rebuild_index(
    State(state): State<SharedState>,
    principal: Principal,
) -> ApiResult<impl IntoResponse> {
    principal.require(Role::Admin)?;

    let mut messages = PageMessages::new();
    let index = state.languages.for_request().rebuild(&mut messages).await?;
    messages.success("Languages index has been successfully rebuilt.");

    Ok(Json(Rebuilt {
        count: index.len(),
        messages,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DefaultLanguageRequest {
    pub locale: String,
}

/// PUT /api/admin/languages/default
pub async fn set_default_language(
    State(state): State<SharedState>,
    principal: Principal,
    Json(req): Json<DefaultLanguageRequest>,
) -> ApiResult<impl IntoResponse> {
    principal.require(Role::Admin)?;

    let mut messages = PageMessages::new();
    state
        .languages
        .for_request()
        .change_default_language(&req.locale, &mut messages)
        .await?;
    messages.success("Default language successfully updated.");

    Ok(Json(messages))
}

#[derive(Debug, Deserialize)]
pub struct JsQuery {
    pub locale: Option<String>,
}

/// GET /api/i18n/js
pub async fn get_js_translations(
    State(state): State<SharedState>,
    _principal: Principal,
    Query(query): Query<JsQuery>,
) -> ApiResult<impl IntoResponse> {
    let languages = state.languages.for_request();
    let locale = match query.locale {
        Some(locale) => locale,
        None => languages.default_language().await?,
    };

    let translator = Translator::load(languages.root(), &locale);
    let body = js_translations(&translator, &state.events, state.password_length)?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body))
}

use crate::shared::i18n::{CURRENT_LOCALE, Locale};
use axum::{
    extract::Request,
    http::{HeaderMap, Uri, header::ACCEPT_LANGUAGE},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

/// Resolve the locale from `?lang=`, then `Accept-Language`, then `x-lang`.
pub fn resolve_locale(uri: &Uri, headers: &HeaderMap) -> Locale {
    let from_query = uri
        .query()
        .and_then(|q| serde_qs::Config::default().deserialize_str::<LangQuery>(q).ok())
        .and_then(|q| q.lang)
        .and_then(|lang| Locale::from_tag(&lang));

    from_query
        .or_else(|| {
            headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok())
                .and_then(Locale::from_accept_language)
        })
        .or_else(|| {
            headers
                .get("x-lang")
                .and_then(|v| v.to_str().ok())
                .and_then(Locale::from_tag)
        })
        .unwrap_or_default()
}

/// Runs the rest of the stack with the request locale in scope.
pub async fn locale(req: Request, next: Next) -> Response {
    let locale = resolve_locale(req.uri(), req.headers());
    CURRENT_LOCALE.scope(locale, next.run(req)).await
}

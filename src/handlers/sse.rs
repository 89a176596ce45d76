// src/handlers/sse.rs

use std::convert::Infallible;

use axum::response::sse::Event;
use serde::Serialize;

use crate::{
    common::{error::AppError, i18n::I18nStore},
    middleware::i18n::Locale,
};

/// Converte um item do feed num evento SSE. Falhas viram um evento
/// `error` e o stream continua aberto.
pub fn snapshot_event<T: Serialize>(
    item: Result<T, AppError>,
    locale: &Locale,
    store: &I18nStore,
) -> Result<Event, Infallible> {
    let event = match item {
        Ok(snapshot) => Event::default()
            .event("snapshot")
            .json_data(&snapshot)
            .unwrap_or_else(|e| {
                tracing::error!("🔥 Falha ao serializar snapshot: {}", e);
                Event::default().event("error").data(store.message(&locale.0, "internal_error"))
            }),
        Err(e) => {
            let api_error = e.to_api_error(locale, store);
            Event::default().event("error").data(api_error.error)
        }
    };

    Ok(event)
}

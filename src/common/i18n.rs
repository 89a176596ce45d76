// src/common/i18n.rs

use std::collections::HashMap;

const DEFAULT_LANG: &str = "en";

// Mensagens de erro por idioma, indexadas pelo código de `AppError::code()`
const PT: &[(&str, &str)] = &[
    ("validation_error", "Um ou mais campos são inválidos."),
    ("client_not_found", "Cliente não encontrado."),
    ("installment_not_found", "Parcela não encontrada."),
    ("user_not_found", "Usuário não encontrado."),
    ("email_already_exists", "Este e-mail já está em uso."),
    ("invalid_credentials", "E-mail ou senha inválidos."),
    ("invalid_token", "Token de autenticação inválido ou ausente."),
    ("forbidden", "Você não tem permissão para realizar esta ação."),
    ("owner_protected", "O Dono não pode ser alterado ou removido."),
    ("owner_role_reserved", "O cargo de Dono não pode ser atribuído."),
    ("ai_unavailable", "Não foi possível gerar o texto. Tente novamente."),
    ("internal_error", "Ocorreu um erro inesperado."),
];

const EN: &[(&str, &str)] = &[
    ("validation_error", "One or more fields are invalid."),
    ("client_not_found", "Client not found."),
    ("installment_not_found", "Installment not found."),
    ("user_not_found", "User not found."),
    ("email_already_exists", "This e-mail is already in use."),
    ("invalid_credentials", "Invalid e-mail or password."),
    ("invalid_token", "Missing or invalid authentication token."),
    ("forbidden", "You are not allowed to perform this action."),
    ("owner_protected", "The Owner cannot be changed or removed."),
    ("owner_role_reserved", "The Owner role cannot be assigned."),
    ("ai_unavailable", "The text could not be generated. Please try again."),
    ("internal_error", "An unexpected error occurred."),
];

pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages = HashMap::new();
        messages.insert("pt", PT.iter().copied().collect());
        messages.insert("en", EN.iter().copied().collect());
        Self { messages }
    }

    /// Busca a mensagem no idioma pedido, caindo para o inglês e por fim para o próprio código.
    pub fn message(&self, lang: &str, code: &str) -> String {
        self.messages
            .get(lang)
            .and_then(|table| table.get(code))
            .or_else(|| self.messages.get(DEFAULT_LANG).and_then(|table| table.get(code)))
            .map(|m| m.to_string())
            .unwrap_or_else(|| code.to_string())
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_falls_back_to_english() {
        let store = I18nStore::new();
        assert_eq!(store.message("de", "client_not_found"), "Client not found.");
    }

    #[test]
    fn unknown_code_is_returned_as_is() {
        let store = I18nStore::new();
        assert_eq!(store.message("pt", "no_such_code"), "no_such_code");
    }

    #[test]
    fn every_code_has_both_languages() {
        let pt: Vec<_> = PT.iter().map(|(k, _)| *k).collect();
        let en: Vec<_> = EN.iter().map(|(k, _)| *k).collect();
        assert_eq!(pt, en);
    }
}

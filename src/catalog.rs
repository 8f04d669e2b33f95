//! The fixed set of errors shared by every service.
//!
//! | Code | Constant | Status |
//! |---|---|---|
//! | `00000` | [`INTERNAL_SERVICE`] | 503 Service Unavailable |
//! | `00001` | [`CONFIG_NOT_FOUND`] | 404 Not Found |
//! | `00002` | [`REQUIRED_DATA`] | 400 Bad Request |
//! | `00003` | [`INVALID_AUTH_TOKEN`] | 401 Unauthorized |
//!
//! Codes are stable: clients key off them. Never renumber an entry; append.

use http::StatusCode;

use crate::structured::StructuredError;

pub const INTERNAL_SERVICE: StructuredError = StructuredError::new(
    "00000",
    "Serviço indisponível no momento. Por favor, tente novamente em alguns instantes",
    StatusCode::SERVICE_UNAVAILABLE,
);

pub const CONFIG_NOT_FOUND: StructuredError = StructuredError::new(
    "00001",
    "Configuração de URL do JWT não encontrada",
    StatusCode::NOT_FOUND,
);

pub const REQUIRED_DATA: StructuredError = StructuredError::new(
    "00002",
    "Dados obrigatórios",
    StatusCode::BAD_REQUEST,
);

pub const INVALID_AUTH_TOKEN: StructuredError = StructuredError::new(
    "00003",
    "Token de autenticação inválido",
    StatusCode::UNAUTHORIZED,
);

/// Every catalog entry, in code order. Read-only for the life of the process.
pub static CATALOG: [StructuredError; 4] = [
    INTERNAL_SERVICE,
    CONFIG_NOT_FOUND,
    REQUIRED_DATA,
    INVALID_AUTH_TOKEN,
];

/// Finds a catalog entry by its code.
pub fn lookup(code: &str) -> Option<&'static StructuredError> {
    CATALOG.iter().find(|e| e.code() == code)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn codes_are_unique() {
        let codes: HashSet<_> = CATALOG.iter().map(StructuredError::code).collect();
        assert_eq!(codes.len(), CATALOG.len());
    }

    #[test]
    fn statuses_match_the_table() {
        assert_eq!(INTERNAL_SERVICE.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(CONFIG_NOT_FOUND.status(), StatusCode::NOT_FOUND);
        assert_eq!(REQUIRED_DATA.status(), StatusCode::BAD_REQUEST);
        assert_eq!(INVALID_AUTH_TOKEN.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn lookup_by_code() {
        assert_eq!(lookup("00003"), Some(&INVALID_AUTH_TOKEN));
        assert_eq!(lookup("99999"), None);
    }

    #[test]
    fn status_is_stable_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| CATALOG.iter().map(|e| e.status()).collect::<Vec<_>>()))
            .collect();

        let expected: Vec<_> = CATALOG.iter().map(|e| e.status()).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn required_data_renders_like_the_wire() {
        assert_eq!(REQUIRED_DATA.render(), "00002: Dados obrigatórios.");
    }
}

//! Pure validation helpers for company registration input.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Validate a CNPJ (Brazilian company tax id). Accepts punctuated or bare
/// input; strips non-digits, requires 14 digits, rejects the all-same-digit
/// sequences, and verifies both mod-11 check digits.
pub fn validar_cnpj(cnpj: &str) -> bool {
    let digits: Vec<u32> = cnpj.chars().filter_map(|c| c.to_digit(10)).collect();

    if digits.len() != 14 {
        return false;
    }
    if digits.iter().all(|&d| d == digits[0]) {
        return false;
    }

    digito_verificador(&digits[..12]) == digits[12]
        && digito_verificador(&digits[..13]) == digits[13]
}

/// Mod-11 check digit: weights start at `len - 7`, decrease to 2, then wrap
/// back to 9.
fn digito_verificador(digits: &[u32]) -> u32 {
    let mut peso = digits.len() as u32 - 7;
    let mut soma = 0;
    for &d in digits {
        soma += d * peso;
        peso = if peso == 2 { 9 } else { peso - 1 };
    }
    let resto = soma % 11;
    if resto < 2 { 0 } else { 11 - resto }
}

/// Parse an ISO-8601 datetime. Accepts RFC 3339 (`2024-01-01T00:00:00Z`,
/// with offset) or a bare `YYYY-MM-DDTHH:MM:SS[.fff]` treated as UTC.
pub fn parse_data_iso(data: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(data) {
        return Some(dt.with_timezone(&Utc));
    }
    for formato in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.3f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(data, formato) {
            return Some(naive.and_utc());
        }
    }
    None
}

/// The registration period must end strictly after it starts.
pub fn validar_periodo(inicio: DateTime<Utc>, fim: DateTime<Utc>) -> bool {
    fim > inicio
}

/// Razão social must have at least 3 characters after trimming.
pub fn validar_razao_social(razao_social: &str) -> bool {
    razao_social.trim().chars().count() >= 3
}

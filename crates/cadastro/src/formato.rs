//! Canonical string forms: cleaned/masked CNPJ and queue naming.

use empresas_core::EmpresaId;

/// Strip everything but digits.
pub fn limpar_cnpj(cnpj: &str) -> String {
    cnpj.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Render a CNPJ as `NN.NNN.NNN/NNNN-NN`. Anything that does not clean to
/// exactly 14 digits is returned as given.
pub fn formatar_cnpj(cnpj: &str) -> String {
    let digitos = limpar_cnpj(cnpj);
    if digitos.len() != 14 {
        return cnpj.to_string();
    }
    format!(
        "{}.{}.{}/{}-{}",
        &digitos[0..2],
        &digitos[2..5],
        &digitos[5..8],
        &digitos[8..12],
        &digitos[12..14]
    )
}

/// Per-company queue name.
pub fn nome_fila(id: EmpresaId) -> String {
    format!("empresa-{id}-queue")
}

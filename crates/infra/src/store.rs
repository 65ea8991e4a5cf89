//! In-memory `EmpresaStore` adapter.

use std::sync::RwLock;

use async_trait::async_trait;

use empresas_cadastro::{Empresa, EmpresaStore, StoreError};
use empresas_core::EmpresaId;

/// Process-local store. Records live in a `Vec` so listing keeps insertion
/// order; everything is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryEmpresaStore {
    empresas: RwLock<Vec<Empresa>>,
}

impl InMemoryEmpresaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmpresaStore for InMemoryEmpresaStore {
    async fn insert(&self, empresa: Empresa) -> Result<(), StoreError> {
        self.empresas.write().unwrap().push(empresa);
        Ok(())
    }

    async fn get(&self, id: EmpresaId) -> Result<Option<Empresa>, StoreError> {
        let empresas = self.empresas.read().unwrap();
        Ok(empresas.iter().find(|e| e.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Empresa>, StoreError> {
        Ok(self.empresas.read().unwrap().clone())
    }

    async fn update(&self, empresa: Empresa) -> Result<(), StoreError> {
        let mut empresas = self.empresas.write().unwrap();
        let slot = empresas
            .iter_mut()
            .find(|e| e.id == empresa.id)
            .ok_or(StoreError::NotFound)?;
        *slot = empresa;
        Ok(())
    }

    async fn delete(&self, id: EmpresaId) -> Result<(), StoreError> {
        let mut empresas = self.empresas.write().unwrap();
        let pos = empresas
            .iter()
            .position(|e| e.id == id)
            .ok_or(StoreError::NotFound)?;
        empresas.remove(pos);
        Ok(())
    }

    async fn find_by_cnpj(&self, cnpj: &str) -> Result<Option<Empresa>, StoreError> {
        let empresas = self.empresas.read().unwrap();
        Ok(empresas.iter().find(|e| e.cnpj == cnpj).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use empresas_cadastro::{AtualizarEmpresa, CriarEmpresa, EmpresaService, ServiceError};
    use empresas_core::DomainError;

    fn criar_input(cnpj: &str) -> CriarEmpresa {
        CriarEmpresa {
            razao_social: "Empresa Teste LTDA".to_string(),
            cnpj: cnpj.to_string(),
            data_inicio: "2024-01-01T00:00:00Z".to_string(),
            data_fim: "2024-12-31T00:00:00Z".to_string(),
        }
    }

    fn service() -> EmpresaService<InMemoryEmpresaStore> {
        EmpresaService::new(InMemoryEmpresaStore::new())
    }

    #[tokio::test]
    async fn criar_e_buscar() {
        let service = service();
        let criada = service.criar(criar_input("11.444.777/0001-61")).await.unwrap();
        assert_eq!(criada.cnpj, "11444777000161");

        let buscada = service.buscar_por_id(criada.id).await.unwrap();
        assert_eq!(buscada, Some(criada));
    }

    #[tokio::test]
    async fn listar_preserva_ordem_de_insercao() {
        let service = service();
        let primeira = service.criar(criar_input("11444777000161")).await.unwrap();
        let segunda = service.criar(criar_input("11222333000181")).await.unwrap();

        let listadas = service.listar().await.unwrap();
        assert_eq!(listadas.len(), 2);
        assert_eq!(listadas[0].id, primeira.id);
        assert_eq!(listadas[1].id, segunda.id);
    }

    #[tokio::test]
    async fn cnpj_duplicado_gera_conflito() {
        let service = service();
        service.criar(criar_input("11444777000161")).await.unwrap();

        let err = service
            .criar(criar_input("11.444.777/0001-61"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn atualizar_parcial_mantem_campos_ausentes() {
        let service = service();
        let criada = service.criar(criar_input("11444777000161")).await.unwrap();

        let atualizada = service
            .atualizar(
                criada.id,
                AtualizarEmpresa {
                    razao_social: Some("Novo Nome SA".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(atualizada.razao_social, "Novo Nome SA");
        assert_eq!(atualizada.cnpj, criada.cnpj);
        assert_eq!(atualizada.data_inicio, criada.data_inicio);
        assert!(atualizada.updated_at >= criada.updated_at);
    }

    #[tokio::test]
    async fn atualizar_cnpj_para_o_de_outra_empresa_gera_conflito() {
        let service = service();
        service.criar(criar_input("11444777000161")).await.unwrap();
        let segunda = service.criar(criar_input("11222333000181")).await.unwrap();

        let err = service
            .atualizar(
                segunda.id,
                AtualizarEmpresa {
                    cnpj: Some("11444777000161".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn atualizar_cnpj_para_o_proprio_nao_conflita() {
        let service = service();
        let criada = service.criar(criar_input("11444777000161")).await.unwrap();

        let atualizada = service
            .atualizar(
                criada.id,
                AtualizarEmpresa {
                    cnpj: Some("11.444.777/0001-61".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(atualizada.cnpj, "11444777000161");
    }

    #[tokio::test]
    async fn atualizar_periodo_inconsistente_falha() {
        let service = service();
        let criada = service.criar(criar_input("11444777000161")).await.unwrap();

        let err = service
            .atualizar(
                criada.id,
                AtualizarEmpresa {
                    data_fim: Some("2023-01-01T00:00:00Z".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn deletar_remove_e_liberta_o_cnpj() {
        let service = service();
        let criada = service.criar(criar_input("11444777000161")).await.unwrap();

        service.deletar(criada.id).await.unwrap();
        assert_eq!(service.buscar_por_id(criada.id).await.unwrap(), None);

        // The CNPJ can be registered again.
        service.criar(criar_input("11444777000161")).await.unwrap();
    }

    #[tokio::test]
    async fn deletar_id_desconhecido_falha() {
        let service = service();
        let err = service.deletar(EmpresaId::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound)));
    }

    #[tokio::test]
    async fn criar_rejeita_entradas_invalidas() {
        let service = service();

        let mut input = criar_input("11444777000161");
        input.razao_social = "AB".to_string();
        assert!(service.criar(input).await.is_err());

        let mut input = criar_input("11444777000162");
        input.cnpj = "11444777000162".to_string();
        assert!(service.criar(input).await.is_err());

        let mut input = criar_input("11444777000161");
        input.data_inicio = "01/01/2024".to_string();
        assert!(service.criar(input).await.is_err());

        let mut input = criar_input("11444777000161");
        input.data_fim = "2023-01-01T00:00:00Z".to_string();
        assert!(service.criar(input).await.is_err());
    }
}

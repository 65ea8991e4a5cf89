//! Job handler dispatch: maps a job kind to its simulated processing work.

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use empresas_queue::{JobData, JobError, JobOutcome, JobProcessor};

/// Known job kinds. Unrecognized kinds are not rejected; they run the default
/// handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobKind {
    EnviarEmail,
    GerarRelatorio,
    SincronizarDados,
    ProcessarPagamento,
    Backup,
    Outro(String),
}

impl JobKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "enviar-email" => JobKind::EnviarEmail,
            "gerar-relatorio" => JobKind::GerarRelatorio,
            "sincronizar-dados" => JobKind::SincronizarDados,
            "processar-pagamento" => JobKind::ProcessarPagamento,
            "backup" => JobKind::Backup,
            other => JobKind::Outro(other.to_string()),
        }
    }

    /// Simulated processing time for this kind of work.
    pub fn duracao(&self) -> Duration {
        let millis = match self {
            JobKind::EnviarEmail => 2000,
            JobKind::GerarRelatorio => 3000,
            JobKind::SincronizarDados => 2500,
            _ => 1000,
        };
        Duration::from_millis(millis)
    }
}

/// Processor behind every company queue. Each kind sleeps for its simulated
/// duration and completes; real side effects are out of scope here.
#[derive(Debug, Default)]
pub struct EmpresaJobProcessor;

#[async_trait]
impl JobProcessor for EmpresaJobProcessor {
    async fn process(&self, data: &JobData) -> Result<JobOutcome, JobError> {
        let kind = JobKind::parse(&data.kind);
        info!(
            empresa_id = %data.tenant_id,
            empresa = %data.tenant_name,
            tipo = %data.kind,
            "processando job"
        );

        tokio::time::sleep(kind.duracao()).await;

        info!(
            empresa_id = %data.tenant_id,
            tipo = %data.kind,
            "job processado"
        );
        Ok(JobOutcome::now())
    }
}

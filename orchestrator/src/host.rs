//! Host seam: the external step interpreter that performs suspended actions.

use async_trait::async_trait;
use ensemble_protocol::HostAction;
use ensemble_protocol::HostEvent;
use serde_json::Value;

use crate::runtime::OrchestratorRun;

/// The external scheduler. Implementors perform one suspended action
/// (spawning the batch, installing a history rewrite, replaying text) and
/// return the resumption event once every piece of it has a terminal
/// outcome. A host that times out a batch must still answer with a result
/// list of the original length (missing entries degrade to synthetic
/// failures on our side).
#[async_trait]
pub trait Host {
    async fn perform(&mut self, action: HostAction) -> anyhow::Result<HostEvent>;
}

/// Drive a run to completion against a host, returning the terminal output
/// payload. Each suspension point is one awaited host call; the state
/// machine itself stays synchronous.
pub async fn drive<H: Host>(mut run: OrchestratorRun, host: &mut H) -> anyhow::Result<Value> {
    let mut action = run.start()?;
    loop {
        match action {
            HostAction::EmitOutput { payload } => {
                tracing::debug!(run_id = %run.run_id(), "output emitted");
                return Ok(payload);
            }
            pending => {
                let event = host.perform(pending).await?;
                action = run.resume(event)?;
            }
        }
    }
}

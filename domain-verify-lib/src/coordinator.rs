//! Bulk verification of ranked candidates.
//!
//! One task is spawned per candidate; the only throttle is the WHOIS permit
//! pool inside the verifier. Each task owns an output slot by index, so the
//! result order always equals the input order however the tasks finish.

use crate::context::CheckContext;
use crate::error::VerifyError;
use crate::types::{Candidate, CheckOutcome, VerificationRecord};
use crate::verifier::DomainVerifier;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info, warn};

/// Verify the first `limit` candidates concurrently.
///
/// Candidates are expected pre-sorted by the caller. The returned vector has
/// exactly `min(limit, candidates.len())` entries in input order. A failure
/// is confined to its own entry; when `ctx` finishes, unfinished entries
/// carry the context's cancellation-kind error. An already-finished context
/// returns immediately without spawning anything.
pub async fn check_top(
    verifier: &DomainVerifier,
    ctx: &CheckContext,
    candidates: &[Candidate],
    limit: usize,
) -> Vec<CheckOutcome> {
    check_top_with_progress(verifier, ctx, candidates, limit, |_| {}).await
}

/// Like [`check_top`], calling `on_complete` as each entry finishes.
pub async fn check_top_with_progress<F>(
    verifier: &DomainVerifier,
    ctx: &CheckContext,
    candidates: &[Candidate],
    limit: usize,
    mut on_complete: F,
) -> Vec<CheckOutcome>
where
    F: FnMut(&CheckOutcome),
{
    let selected = &candidates[..limit.min(candidates.len())];

    if let Err(e) = ctx.check() {
        debug!("Context already done, skipping {} candidates", selected.len());
        return selected
            .iter()
            .map(|c| CheckOutcome::new(c.clone(), Err(e.clone())))
            .collect();
    }

    info!("Checking {} candidates", selected.len());

    let mut slots: Vec<Option<Result<VerificationRecord, VerifyError>>> =
        vec![None; selected.len()];
    let mut abort_handles = Vec::with_capacity(selected.len());
    let mut pending = FuturesUnordered::new();

    for (idx, candidate) in selected.iter().enumerate() {
        let verifier = verifier.clone();
        let ctx = ctx.clone();
        let name = candidate.name.clone();

        let handle = tokio::spawn(async move { verifier.verify(&ctx, &name).await });
        abort_handles.push(handle.abort_handle());
        pending.push(async move { (idx, handle.await) });
    }

    let interrupted = loop {
        tokio::select! {
            biased;
            joined = pending.next() => match joined {
                Some((idx, joined)) => {
                    let result = joined.unwrap_or_else(|e| {
                        warn!("Verification task for {} failed: {}", selected[idx].name, e);
                        Err(VerifyError::internal(format!("verification task failed: {}", e)))
                    });
                    on_complete(&CheckOutcome::new(selected[idx].clone(), result.clone()));
                    slots[idx] = Some(result);
                }
                None => break None,
            },
            err = ctx.done() => break Some(err),
        }
    };

    if let Some(err) = &interrupted {
        let unfinished = slots.iter().filter(|s| s.is_none()).count();
        warn!("Bulk check interrupted ({}), {} unfinished", err, unfinished);
        for handle in &abort_handles {
            handle.abort();
        }
    }

    let outcomes: Vec<CheckOutcome> = selected
        .iter()
        .zip(slots)
        .map(|(candidate, slot)| {
            let result = slot.unwrap_or_else(|| {
                Err(interrupted
                    .clone()
                    .unwrap_or_else(|| VerifyError::internal("verification produced no result")))
            });
            CheckOutcome::new(candidate.clone(), result)
        })
        .collect();

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!(
        "Checked {} candidates ({} errors)",
        outcomes.len(),
        failed
    );
    outcomes
}

//! One verification run.
//!
//! `RunContext` threads the flags, the config store, and the collaborator
//! seams through a run so no component reaches for process-wide state. The
//! driver is sequential over the registry: availability first, then one
//! extension pass and one version pass, every correction buffered and
//! flushed once at the end. Per-service failures are warned and skipped;
//! only catalog and persistence failures abort.

use crate::availability::resolve_availability;
use crate::config::{ConfigStore, OutputTarget};
use crate::diff::diff_sets;
use crate::error::VerifyError;
use crate::model::{CapabilityKind, DeclaredSet, Direction, Discrepancy};
use crate::normalize::{normalize_extensions, normalize_versions};
use crate::probe::{CapabilityProbe, ServiceCatalog};
use crate::reconcile::{UpdateSet, corrected_list};
use crate::registry::{AVAILABILITY_SECTION, SERVICES, ServiceId};

#[derive(Clone, Copy, Debug, Default)]
pub struct RunFlags {
    /// Rewrite config options whose declared state contradicts discovery.
    pub update: bool,
    /// Replace wildcard declarations with the full discovered list.
    pub replace_wildcard: bool,
}

pub struct RunContext<'a> {
    pub store: &'a ConfigStore,
    pub catalog: &'a dyn ServiceCatalog,
    pub probe: &'a dyn CapabilityProbe,
    pub flags: RunFlags,
    /// Pre-validated rewrite destination; required when `flags.update`.
    pub target: Option<OutputTarget>,
}

/// A verification step sidelined by a per-service failure.
#[derive(Debug)]
pub struct SkippedStep {
    pub service: ServiceId,
    pub kind: CapabilityKind,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct RunReport {
    /// Every mismatch found, in report order.
    pub discrepancies: Vec<Discrepancy>,
    /// Steps skipped because of probe or payload failures.
    pub skipped: Vec<SkippedStep>,
    /// Number of config values rewritten (zero in report-only mode).
    pub corrections: usize,
}

/// Renders one discrepancy as its report line. Pure; the driver prints each
/// line as the discrepancy is found.
pub fn report_line(discrepancy: &Discrepancy) -> String {
    let spec = discrepancy.service.spec();
    match (discrepancy.kind, discrepancy.direction) {
        (CapabilityKind::Availability, Direction::ShouldEnable) => format!(
            "endpoint type '{}' is published; {} should be enabled in [{}]",
            spec.catalog_type.unwrap_or(spec.id.as_str()),
            discrepancy.service,
            AVAILABILITY_SECTION,
        ),
        (CapabilityKind::Availability, Direction::ShouldDisable) => format!(
            "endpoint type '{}' not found; disable {} in [{}] or fix its catalog type",
            spec.catalog_type.unwrap_or(spec.id.as_str()),
            discrepancy.service,
            AVAILABILITY_SECTION,
        ),
        (kind, direction) => {
            let option = match kind {
                CapabilityKind::Extension => {
                    spec.extensions.map(|ext| ext.option).unwrap_or("api_extensions")
                }
                _ => spec.versions.map(|ver| ver.option).unwrap_or("api_versions"),
            };
            let verdict = match direction {
                Direction::ShouldEnable => "should be added to",
                Direction::ShouldDisable => "should not be in",
            };
            format!(
                "{} {} '{}' {} [{}] {}",
                discrepancy.service, kind, discrepancy.capability, verdict, spec.section, option,
            )
        }
    }
}

/// Drives one full run: catalog, availability, extension pass, version pass,
/// single flush. Returns the report; `Err` only for whole-run failures.
pub fn run_verification(mut ctx: RunContext<'_>) -> Result<RunReport, VerifyError> {
    let catalog = ctx.catalog.fetch()?;
    let availability = resolve_availability(&catalog, ctx.store);

    let mut report = RunReport::default();
    let mut updates = UpdateSet::new();

    for discrepancy in &availability.discrepancies {
        println!("{}", report_line(discrepancy));
        if ctx.flags.update {
            updates.put_flag(
                AVAILABILITY_SECTION,
                discrepancy.service.as_str(),
                discrepancy.direction,
            );
        }
    }
    report
        .discrepancies
        .extend(availability.discrepancies.iter().cloned());

    for spec in SERVICES {
        if spec.extensions.is_none() || !availability.cleared(spec.id) {
            continue;
        }
        verify_step(
            &ctx,
            &mut updates,
            &mut report,
            spec.id,
            CapabilityKind::Extension,
        )?;
    }

    for spec in SERVICES {
        if spec.versions.is_none() || !availability.cleared(spec.id) {
            continue;
        }
        verify_step(
            &ctx,
            &mut updates,
            &mut report,
            spec.id,
            CapabilityKind::ApiVersion,
        )?;
    }

    if ctx.flags.update {
        let mut target = ctx.target.take().ok_or_else(|| VerifyError::Persistence {
            reason: "update requested without a validated output target".to_string(),
        })?;
        report.corrections = updates.len();
        ctx.store.write_all(&updates, &mut target)?;
    }

    Ok(report)
}

/// Probes, normalizes, and diffs one (service, kind) pair. Per-service
/// failures are warned and recorded as skips; fatal errors propagate.
fn verify_step(
    ctx: &RunContext<'_>,
    updates: &mut UpdateSet,
    report: &mut RunReport,
    service: ServiceId,
    kind: CapabilityKind,
) -> Result<(), VerifyError> {
    let spec = service.spec();
    let (option, discovered) = match kind {
        CapabilityKind::Extension => {
            let Some(extensions) = spec.extensions else {
                return Ok(());
            };
            let discovered = ctx
                .probe
                .probe_extensions(service)
                .and_then(|payload| normalize_extensions(service, &payload));
            (extensions.option, discovered)
        }
        CapabilityKind::ApiVersion => {
            let Some(versions) = spec.versions else {
                return Ok(());
            };
            let discovered = ctx
                .probe
                .probe_api_versions(service)
                .and_then(|payload| normalize_versions(service, &payload));
            (versions.option, discovered)
        }
        CapabilityKind::Availability => return Ok(()),
    };

    let discovered = match discovered {
        Ok(discovered) => discovered,
        Err(err) if !err.is_fatal() => {
            eprintln!("capsync: skipping {service} {kind} verification: {err}");
            report.skipped.push(SkippedStep {
                service,
                kind,
                reason: err.to_string(),
            });
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    let declared = DeclaredSet::parse(ctx.store.declared(spec.section, option).as_deref());
    let discrepancies = diff_sets(service, kind, &declared, &discovered);
    for discrepancy in &discrepancies {
        println!("{}", report_line(discrepancy));
    }
    if ctx.flags.update {
        if let Some(value) =
            corrected_list(&declared, &discovered, &discrepancies, ctx.flags.replace_wildcard)
        {
            updates.put_list(spec.section, option, value);
        }
    }
    report.discrepancies.extend(discrepancies);
    Ok(())
}

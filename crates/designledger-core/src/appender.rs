use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use designledger_audit::{AuditError, AuditRecorder, ChainEntry, ChainMetadata};
use designledger_ledger::{
    find_conflict, normalize, validate_prefix, Assertion, Conflict, DecisionId, DecisionRecord,
    LedgerError, RecordDraft, RecordStatus,
};
use designledger_logging::{LogEvent, Logger, RunJournal};
use designledger_style::{
    project_title, render_style_guide, GuideSnapshot, ProposalInputs, Section, StyleProposer,
    TopicArea,
};

use crate::outcome::RecorderFailure;
use crate::{InputDocuments, InputPaths, RunContext, RunError, RunOutcome};

/// Drafts for one run, plus what was learned while building them
#[derive(Default)]
struct Plan {
    drafts: Vec<RecordDraft>,
    deferred: Vec<TopicArea>,
    conflicts: Vec<Conflict>,
    open_conflicts: Vec<Conflict>,
    unchanged: usize,
}

/// Runs one style pass against the shared ledger
pub struct Appender<'a> {
    recorder: &'a dyn AuditRecorder,
    logger: Arc<Logger>,
}

impl<'a> Appender<'a> {
    pub fn new(recorder: &'a dyn AuditRecorder, logger: Arc<Logger>) -> Self {
        Self { recorder, logger }
    }

    /// Check inputs, append this run's decisions, regenerate the guide and
    /// report to the recorders.
    ///
    /// Every fatal check happens before the first write.
    pub async fn run(&self, ctx: RunContext) -> Result<RunOutcome, RunError> {
        self.logger.log(&LogEvent::RunStarted {
            task_id: ctx.task_id.clone(),
            mode: ctx.mode.to_string(),
            prefix: ctx.prefix.clone(),
            working_dir: ctx.working_dir.clone(),
        });

        validate_prefix(&ctx.prefix)?;
        let inputs = InputDocuments::load(&ctx.paths).map_err(|e| {
            if let RunError::MissingRequiredInput { ref name, ref path } = e {
                self.logger.log(&LogEvent::InputMissing {
                    name: name.clone(),
                    path: path.clone(),
                    required: true,
                });
            }
            e
        })?;

        let mut warnings = Vec::new();
        for name in inputs.missing_optional() {
            let path = match name {
                "constraints" => &ctx.paths.constraints,
                _ => &ctx.paths.domain_knowledge,
            };
            self.logger.log(&LogEvent::InputMissing {
                name: name.to_string(),
                path: path.clone(),
                required: false,
            });
            warnings.push(format!("{} not found; proposals fall back to defaults", name));
        }
        for id in inputs.ledger.duplicates() {
            warnings.push(format!("Duplicate decision id {} in the ledger", id));
        }

        for prefix in &ctx.required_prefixes {
            if inputs.ledger.contains_prefix(prefix) {
                continue;
            }
            self.logger.log(&LogEvent::PrerequisiteMissing {
                prefix: prefix.clone(),
                strict: ctx.strict_prerequisites,
            });
            if ctx.strict_prerequisites {
                return Err(RunError::MissingPrerequisiteDecision {
                    prefix: prefix.clone(),
                });
            }
            warnings.push(format!(
                "No {} decisions in the ledger; proposals use defaults",
                prefix
            ));
        }

        ctx.answers.validate()?;
        if !ctx.answers.is_empty() {
            debug!(count = ctx.answers.len(), "Operator answers loaded");
        }

        let plan = self.plan(&ctx, &inputs);

        if ctx.dry_run {
            return self.dry_run(ctx, inputs, plan, warnings);
        }

        let advisory_sources = inputs.advisory_sources();
        let InputDocuments {
            project_spec,
            mut ledger,
            ..
        } = inputs;

        // Preconditions passed; from here on the run writes
        let journal = self.open_journal(&ctx, &project_spec);
        let mut failures = Vec::new();

        fs::create_dir_all(&ctx.snapshot_dir)?;
        fs::copy(ledger.path(), ctx.before_snapshot())?;

        let result = self.recorder.phase_started(&ctx.phase).await;
        self.note_recorder("phase_started", result, &mut failures);

        let Plan {
            drafts,
            deferred,
            conflicts,
            open_conflicts,
            unchanged,
        } = plan;
        let appended = ledger.append(&ctx.prefix, drafts)?;
        self.logger.log(&LogEvent::RecordsAppended {
            prefix: ctx.prefix.clone(),
            ids: appended.iter().map(ToString::to_string).collect(),
        });

        let style_guide = render(&ctx, &project_spec, ledger.records(), ledger.path());
        write_atomic(&ctx.paths.style_guide, &style_guide)?;
        self.logger.log(&LogEvent::StyleGuideWritten {
            path: ctx.paths.style_guide.clone(),
            bytes: style_guide.len(),
        });

        fs::copy(ledger.path(), ctx.after_snapshot())?;

        let mut outcome = RunOutcome {
            task_id: ctx.task_id.clone(),
            mode: ctx.mode,
            prefix: ctx.prefix.clone(),
            appended,
            deferred,
            conflicts,
            open_conflicts,
            unchanged,
            warnings,
            recorder_failures: Vec::new(),
            style_guide_path: ctx.paths.style_guide.clone(),
            style_guide,
            dry_run: false,
            total_duration_secs: 0.0,
        };

        let entry = ChainEntry {
            task_id: ctx.task_id.clone(),
            pipeline: ctx.pipeline.clone(),
            stage: ctx.stage.clone(),
            agent: ctx.agent.clone(),
            before: ctx.before_snapshot(),
            after: ctx.after_snapshot(),
            description: outcome.summary(),
            metadata: ChainMetadata {
                decisions: outcome.appended.iter().map(ToString::to_string).collect(),
                style_guide_created: true,
                advisory_sources,
            },
        };
        let result = self.recorder.record_chain(&entry).await;
        self.note_recorder("record_chain", result, &mut failures);

        let result = self
            .recorder
            .phase_completed(&ctx.phase, &outcome.summary())
            .await;
        self.note_recorder("phase_completed", result, &mut failures);

        outcome.recorder_failures = failures;
        outcome.total_duration_secs = ctx.elapsed().as_secs_f64();

        if let Some(journal) = journal {
            for id in &outcome.appended {
                if let Some(record) = ledger.get(id) {
                    journal.write_decision(
                        &id.to_string(),
                        status_label(record.status),
                        &record.statement,
                    );
                }
            }
            journal.write_end(
                "success",
                outcome.appended.len(),
                outcome.conflicts.len(),
                outcome.warnings.len() + outcome.recorder_failures.len(),
                outcome.total_duration_secs,
            );
        }

        self.logger.log(&LogEvent::RunCompleted {
            appended: outcome.appended.len(),
            conflicts: outcome.conflicts.len(),
            deferred: outcome.deferred.len(),
            duration_secs: outcome.total_duration_secs,
        });
        info!(
            task_id = %outcome.task_id,
            appended = outcome.appended.len(),
            "Run completed"
        );

        Ok(outcome)
    }

    /// Build the drafts for every area in checklist order
    fn plan(&self, ctx: &RunContext, inputs: &InputDocuments) -> Plan {
        let records = inputs.ledger.records();
        let upstream: Vec<DecisionRecord> = records
            .iter()
            .filter(|r| r.is_active() && r.id.prefix() != ctx.prefix)
            .cloned()
            .collect();

        let proposer = StyleProposer::new(
            &ProposalInputs {
                project_spec: &inputs.project_spec,
                constraints: inputs.constraints.as_deref(),
                domain_knowledge: inputs.domain_knowledge.as_deref(),
                upstream: &upstream,
            },
            ctx.answers.clone(),
        );
        debug!(
            profile = proposer.profile().label(),
            brand = %proposer.brand_color(),
            "Proposer ready"
        );

        let mut plan = Plan::default();
        for area in TopicArea::ALL {
            if !ctx.mode.covers(area) {
                if !area_has_record(records, &ctx.prefix, area) {
                    let reason = area.deferral_reason();
                    self.logger.log(&LogEvent::TopicDeferred {
                        area: area.title().to_string(),
                        reason: reason.clone(),
                    });
                    plan.drafts.push(RecordDraft::deferred(reason));
                    plan.deferred.push(area);
                }
                continue;
            }

            let proposals = proposer.propose(area);
            let proposed = proposals.len();
            let before = plan.drafts.len();

            for proposal in proposals {
                if already_in_force(records, &ctx.prefix, &proposal.assertion) {
                    plan.unchanged += 1;
                    continue;
                }

                if let Some(conflict) = find_conflict(records, &ctx.prefix, &proposal.assertion) {
                    let detail = conflict.detail();
                    if conflict_recorded(records, &ctx.prefix, &detail) {
                        debug!(
                            existing = %conflict.existing,
                            key = %conflict.key,
                            "Conflict still open"
                        );
                        plan.open_conflicts.push(conflict);
                        continue;
                    }
                    warn!(
                        existing = %conflict.existing,
                        key = %conflict.key,
                        "Proposal contradicts an upstream decision"
                    );
                    self.logger.log(&LogEvent::ConflictRecorded {
                        existing: conflict.existing.to_string(),
                        key: conflict.key.clone(),
                        existing_value: conflict.existing_value.clone(),
                        proposed_value: conflict.proposed_value.clone(),
                    });
                    plan.drafts.push(RecordDraft::conflict(detail));
                    plan.conflicts.push(conflict);
                    continue;
                }

                plan.drafts.push(proposal.into_draft());
            }

            self.logger.log(&LogEvent::TopicProcessed {
                area: area.title().to_string(),
                proposed,
                appended: plan.drafts.len() - before,
            });
        }
        plan
    }

    fn dry_run(
        &self,
        ctx: RunContext,
        inputs: InputDocuments,
        plan: Plan,
        warnings: Vec<String>,
    ) -> Result<RunOutcome, RunError> {
        let mut records = inputs.ledger.records().to_vec();
        let first = inputs.ledger.next_id(&ctx.prefix)?.seq();
        let mut appended = Vec::with_capacity(plan.drafts.len());
        for (offset, draft) in plan.drafts.into_iter().enumerate() {
            let seq = u32::try_from(offset)
                .ok()
                .and_then(|offset| first.checked_add(offset))
                .ok_or_else(|| LedgerError::SequenceExhausted {
                    prefix: ctx.prefix.clone(),
                })?;
            let id = DecisionId::new(&ctx.prefix, seq)?;
            appended.push(id.clone());
            records.push(draft.into_record(id));
        }

        let style_guide = render(&ctx, &inputs.project_spec, &records, inputs.ledger.path());
        info!(would_append = appended.len(), "Dry run, nothing written");

        Ok(RunOutcome {
            task_id: ctx.task_id.clone(),
            mode: ctx.mode,
            prefix: ctx.prefix.clone(),
            appended,
            deferred: plan.deferred,
            conflicts: plan.conflicts,
            open_conflicts: plan.open_conflicts,
            unchanged: plan.unchanged,
            warnings,
            recorder_failures: Vec::new(),
            style_guide_path: ctx.paths.style_guide.clone(),
            style_guide,
            dry_run: true,
            total_duration_secs: ctx.elapsed().as_secs_f64(),
        })
    }

    fn open_journal(&self, ctx: &RunContext, project_spec: &str) -> Option<RunJournal> {
        let dir = ctx.journal_dir.as_ref()?;
        match RunJournal::create(dir, project_spec) {
            Ok(journal) => {
                journal.write_start(
                    &ctx.task_id,
                    &ctx.mode.to_string(),
                    &ctx.prefix,
                    &ctx.working_dir,
                );
                Some(journal)
            }
            Err(e) => {
                warn!(error = %e, dir = %dir.display(), "Could not create run journal");
                None
            }
        }
    }

    fn note_recorder(
        &self,
        call: &str,
        result: Result<(), AuditError>,
        failures: &mut Vec<RecorderFailure>,
    ) {
        if let Err(e) = result {
            self.logger.log(&LogEvent::RecorderFailed {
                recorder: self.recorder.name().to_string(),
                call: call.to_string(),
                error: e.to_string(),
            });
            failures.push(RecorderFailure {
                recorder: self.recorder.name().to_string(),
                call: call.to_string(),
                error: e.to_string(),
            });
        }
    }
}

/// Render the guide from the ledger as it is now
pub fn render_current(
    paths: &InputPaths,
    prefix: &str,
    upstream_prefixes: &[String],
) -> Result<String, RunError> {
    let inputs = InputDocuments::load(paths)?;
    let title = project_title(&inputs.project_spec);
    Ok(render_style_guide(&GuideSnapshot {
        title: &title,
        ledger_name: &ledger_name(inputs.ledger.path()),
        prefix,
        upstream_prefixes,
        records: inputs.ledger.records(),
    }))
}

/// Rewrite the style guide from the current ledger without appending
pub fn regenerate(
    paths: &InputPaths,
    prefix: &str,
    upstream_prefixes: &[String],
) -> Result<String, RunError> {
    validate_prefix(prefix)?;
    let guide = render_current(paths, prefix, upstream_prefixes)?;
    write_atomic(&paths.style_guide, &guide)?;
    info!(path = %paths.style_guide.display(), "Style guide regenerated");
    Ok(guide)
}

fn render(
    ctx: &RunContext,
    project_spec: &str,
    records: &[DecisionRecord],
    ledger: &Path,
) -> String {
    let title = project_title(project_spec);
    render_style_guide(&GuideSnapshot {
        title: &title,
        ledger_name: &ledger_name(ledger),
        prefix: &ctx.prefix,
        upstream_prefixes: &ctx.required_prefixes,
        records,
    })
}

fn ledger_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// The latest own record for the key already says exactly this
fn already_in_force(records: &[DecisionRecord], prefix: &str, proposed: &Assertion) -> bool {
    let key = proposed.normalized_key();
    records
        .iter()
        .rev()
        .filter(|r| r.id.prefix() == prefix)
        .filter_map(DecisionRecord::assertion)
        .find(|a| a.normalized_key() == key)
        .is_some_and(|a| normalize(&a.statement()) == normalize(&proposed.statement()))
}

fn conflict_recorded(records: &[DecisionRecord], prefix: &str, detail: &str) -> bool {
    let detail = normalize(detail);
    records.iter().any(|r| {
        r.id.prefix() == prefix
            && r.status == RecordStatus::Conflict
            && normalize(&r.statement) == detail
    })
}

/// Whether the area already has a decision or deferral under `prefix`
fn area_has_record(records: &[DecisionRecord], prefix: &str, area: TopicArea) -> bool {
    records
        .iter()
        .filter(|r| r.id.prefix() == prefix)
        .any(|r| match r.status {
            RecordStatus::Active => r
                .assertion()
                .is_some_and(|a| Section::route(&a.key) == area.section()),
            RecordStatus::Deferred => TopicArea::from_deferral(&r.statement) == Some(area),
            RecordStatus::Conflict => false,
        })
}

fn status_label(status: RecordStatus) -> &'static str {
    match status {
        RecordStatus::Active => "active",
        RecordStatus::Deferred => "deferred",
        RecordStatus::Conflict => "conflict",
    }
}

/// Write through a sibling temp file so readers never see a partial guide
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    let tmp = path.with_file_name(name);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

//! The generation pipeline orchestrator.
//!
//! `DocumentGenerator` owns every collaborating subsystem (cache, monitor,
//! layout engine, font resolver, emitter) by constructor injection; nothing
//! here is process-global, so parallel generators in one process stay fully
//! isolated. A run walks an explicit state machine and samples the monitor
//! between stages; memory pressure signals trigger cache reclamation
//! in-line rather than from background timers.

use crate::error::PipelineError;
use crate::pipeline::batch::BatchProcessor;
use crate::pipeline::classify::{classify, ErrorKind, ErrorRecord, Severity, StageContext};
use crate::pipeline::compose::{compose, LetterheadAssets};
use crate::pipeline::filename::suggested_filename;
use crate::pipeline::images::{optimize, ImageLimits, OptimizedImage};
use crate::pipeline::metrics::RunReport;
use crate::pipeline::monitor::PerformanceMonitor;
use crate::pipeline::validate::validate;
use chrono::Utc;
use facture_cache::{Fingerprint, RenderCache};
use facture_layout::{FontResolver, FontSource, LayoutEngine};
use facture_render_core::{DocumentEmitter, DocumentMeta};
use facture_types::DocumentRequest;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Lifecycle of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Validating,
    CacheCheck,
    Optimizing,
    ResolvingFonts,
    LayingOut,
    Rendering,
    Caching,
    Done,
    Failed,
}

/// The product of a successful run.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub bytes: Arc<Vec<u8>>,
    pub filename: String,
    pub cache_hit: bool,
    pub report: RunReport,
}

/// Payload handed to an external viewer or print dialog.
#[derive(Debug, Clone)]
pub struct PrintTarget {
    pub bytes: Arc<Vec<u8>>,
    pub mime_type: &'static str,
    pub filename: String,
}

impl GenerationOutput {
    pub fn print_target(&self) -> PrintTarget {
        PrintTarget {
            bytes: Arc::clone(&self.bytes),
            mime_type: "application/pdf",
            filename: self.filename.clone(),
        }
    }
}

/// Degradations accumulated while a run keeps going: the human-readable
/// warning strings and their classified records stay in lockstep.
#[derive(Default)]
struct RunDiagnostics {
    warnings: Vec<String>,
    errors: Vec<ErrorRecord>,
}

impl RunDiagnostics {
    fn degrade(&mut self, kind: ErrorKind, message: String) {
        self.errors
            .push(ErrorRecord::new(kind, message.clone()).with_severity(Severity::Warning));
        self.warnings.push(message);
    }
}

/// One document-generation engine instance. Not `Sync`; callers wanting
/// concurrency construct one generator per worker.
pub struct DocumentGenerator {
    pub(crate) cache: RenderCache,
    pub(crate) monitor: PerformanceMonitor,
    pub(crate) layout: LayoutEngine,
    pub(crate) fonts: FontResolver,
    pub(crate) emitter: Box<dyn DocumentEmitter>,
    pub(crate) batch: BatchProcessor,
    pub(crate) image_limits: ImageLimits,
    pub(crate) preferred_family: String,
    pub(crate) producer: String,
    pub(crate) debug: bool,
    state: RunState,
}

impl DocumentGenerator {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn assemble(
        cache: RenderCache,
        monitor: PerformanceMonitor,
        layout: LayoutEngine,
        fonts: FontResolver,
        emitter: Box<dyn DocumentEmitter>,
        batch: BatchProcessor,
        image_limits: ImageLimits,
        preferred_family: String,
        producer: String,
        debug: bool,
    ) -> Self {
        Self {
            cache,
            monitor,
            layout,
            fonts,
            emitter,
            batch,
            image_limits,
            preferred_family,
            producer,
            debug,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn cache_stats(&self) -> facture_cache::CacheStats {
        self.cache.stats()
    }

    /// Drops every cached document and returns the bytes freed.
    pub fn clear_cache(&mut self) -> usize {
        self.cache.clear()
    }

    /// Generates one document end to end.
    pub fn generate(&mut self, request: &DocumentRequest) -> Result<GenerationOutput, ErrorRecord> {
        self.generate_with_cancel(request, Arc::new(AtomicBool::new(false)))
    }

    /// Generates one document, aborting at the next stage boundary once
    /// `cancel` is raised. Cancellation surfaces as a non-fatal record.
    pub fn generate_with_cancel(
        &mut self,
        request: &DocumentRequest,
        cancel: Arc<AtomicBool>,
    ) -> Result<GenerationOutput, ErrorRecord> {
        self.monitor.start_run();
        match self.run(request, &cancel) {
            Ok(output) => {
                self.transition(RunState::Done);
                log::info!(
                    "generated '{}' ({} bytes, {} page(s), cache_hit={}) in {:?}",
                    output.filename,
                    output.bytes.len(),
                    output.report.page_count,
                    output.cache_hit,
                    output.report.render_time,
                );
                Ok(output)
            }
            Err((error, stage)) => {
                self.transition(RunState::Failed);
                let record = classify(
                    &error,
                    StageContext {
                        stage,
                        document_number: &request.document_number,
                    },
                );
                if record.is_fatal() {
                    log::error!("generation failed during {stage}: {error}");
                } else {
                    log::warn!("generation stopped during {stage}: {error}");
                }
                if self.debug {
                    log::debug!("diagnostic detail: {}", record.detail);
                }
                Err(record)
            }
        }
    }

    fn run(
        &mut self,
        request: &DocumentRequest,
        cancel: &Arc<AtomicBool>,
    ) -> Result<GenerationOutput, (PipelineError, &'static str)> {
        let mut diagnostics = RunDiagnostics::default();

        self.transition(RunState::Validating);
        check_cancel(cancel, "validate")?;
        let stage = Instant::now();
        let model =
            validate(request).map_err(|issues| (PipelineError::Validation(issues), "validate"))?;
        self.monitor.record_stage("validate", stage.elapsed());

        self.transition(RunState::CacheCheck);
        let key = Fingerprint::of_request(request)
            .map_err(|err| (PipelineError::Json(err), "cache_check"))?;
        if let Some(bytes) = self.cache.get(&key) {
            log::debug!("cache hit for {key:?}");
            let filename =
                suggested_filename(request.kind, &request.document_number, &request.customer.name);
            let report = RunReport {
                render_time: self.monitor.run_elapsed(),
                memory: self.monitor.usage_summary(),
                pdf_size_bytes: bytes.len(),
                // Page count is not retained for cached documents.
                page_count: 0,
                cache_hit: true,
                cache: self.cache.stats(),
                stages: self.monitor.stage_timings().to_vec(),
                warnings: diagnostics.warnings,
                errors: diagnostics.errors,
            };
            return Ok(GenerationOutput {
                bytes,
                filename,
                cache_hit: true,
                report,
            });
        }
        self.relieve_pressure(&mut diagnostics);

        self.transition(RunState::Optimizing);
        check_cancel(cancel, "optimize_images")?;
        let stage = Instant::now();
        let assets = self.optimize_letterhead(request, cancel, &mut diagnostics)?;
        self.monitor.record_stage("optimize_images", stage.elapsed());
        self.relieve_pressure(&mut diagnostics);

        self.transition(RunState::ResolvingFonts);
        check_cancel(cancel, "resolve_fonts")?;
        let stage = Instant::now();
        let sample: String = model
            .items
            .iter()
            .map(|item| item.description.as_str())
            .chain([model.customer.name.as_str(), model.issuer.name.as_str()])
            .collect::<Vec<_>>()
            .join(" ");
        let resolved = self.fonts.resolve(&self.preferred_family, &sample);
        if resolved.source != FontSource::Webfont {
            diagnostics.degrade(
                ErrorKind::Font,
                format!(
                    "font '{}' unavailable, substituted '{}'",
                    self.preferred_family, resolved.family
                ),
            );
        }
        if !resolved.ok {
            diagnostics.degrade(
                ErrorKind::Font,
                "no installed font covers the document text; glyphs may render incorrectly"
                    .to_string(),
            );
        }
        self.monitor.record_stage("resolve_fonts", stage.elapsed());

        self.transition(RunState::LayingOut);
        check_cancel(cancel, "layout")?;
        let stage = Instant::now();
        // Cell wrapping is the per-item cost of layout; chunk it so large
        // documents yield and honor the cancel flag between chunks.
        let layout = &self.layout;
        let mut run = self.batch.run(
            model.items.clone(),
            |item| layout.wrap_item(&item),
            cancel.clone(),
        );
        for progress in run.by_ref() {
            log::debug!("wrapped item cells {}/{}", progress.processed, progress.total);
        }
        let outcome = run.finish();
        if outcome.cancelled {
            return Err((PipelineError::Cancelled, "layout"));
        }
        let plan = self
            .layout
            .plan_with_cells(&model, outcome.results)
            .map_err(|err| (PipelineError::Layout(err), "layout"))?;
        self.monitor.record_stage("layout", stage.elapsed());
        self.relieve_pressure(&mut diagnostics);

        self.transition(RunState::Rendering);
        check_cancel(cancel, "render")?;
        let stage = Instant::now();
        let pages = compose(&model, &plan, self.layout.geometry(), &assets);
        let meta = DocumentMeta {
            title: format!("{} {}", model.kind.label(), model.document_number),
            producer: self.producer.clone(),
            font_family: resolved.family.clone(),
            creation_date: Some(Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()),
        };
        let bytes = Arc::new(
            self.emitter
                .emit(&meta, &pages)
                .map_err(|err| (PipelineError::Render(err), "render"))?,
        );
        self.monitor.record_stage("render", stage.elapsed());
        self.relieve_pressure(&mut diagnostics);

        self.transition(RunState::Caching);
        if !self.cache.insert(key, bytes.clone()) {
            log::debug!("document too large for the render cache, not retained");
        }

        let filename =
            suggested_filename(model.kind, &model.document_number, &model.customer.name);
        let report = RunReport {
            render_time: self.monitor.run_elapsed(),
            memory: self.monitor.usage_summary(),
            pdf_size_bytes: bytes.len(),
            page_count: plan.page_count,
            cache_hit: false,
            cache: self.cache.stats(),
            stages: self.monitor.stage_timings().to_vec(),
            warnings: diagnostics.warnings.clone(),
            errors: diagnostics.errors.clone(),
        };
        Ok(GenerationOutput {
            bytes,
            filename,
            cache_hit: false,
            report,
        })
    }

    /// Optimizes the letterhead images as one chunked batch run.
    fn optimize_letterhead(
        &mut self,
        request: &DocumentRequest,
        cancel: &Arc<AtomicBool>,
        diagnostics: &mut RunDiagnostics,
    ) -> Result<LetterheadAssets, (PipelineError, &'static str)> {
        enum Slot {
            Logo,
            Seal,
        }

        let mut sources: Vec<(Slot, Vec<u8>)> = Vec::new();
        if let Some(logo) = &request.issuer.logo {
            if !logo.bytes.is_empty() {
                sources.push((Slot::Logo, logo.bytes.clone()));
            }
        }
        if let Some(seal) = &request.issuer.seal {
            if !seal.bytes.is_empty() {
                sources.push((Slot::Seal, seal.bytes.clone()));
            }
        }
        if sources.is_empty() {
            return Ok(LetterheadAssets::default());
        }

        let limits = self.image_limits;
        let mut run = self.batch.run(
            sources,
            move |(slot, bytes): (Slot, Vec<u8>)| -> (Slot, OptimizedImage) {
                (slot, optimize(&bytes, &limits))
            },
            cancel.clone(),
        );
        for progress in run.by_ref() {
            log::debug!(
                "optimized letterhead image {}/{}",
                progress.processed,
                progress.total
            );
        }
        let outcome = run.finish();
        if outcome.cancelled {
            return Err((PipelineError::Cancelled, "optimize_images"));
        }

        let mut assets = LetterheadAssets::default();
        for (slot, image) in outcome.results {
            if let Some(warning) = &image.warning {
                diagnostics.degrade(ErrorKind::Image, warning.clone());
            }
            match slot {
                Slot::Logo => assets.logo = Some(image),
                Slot::Seal => assets.seal = Some(image),
            }
        }
        Ok(assets)
    }

    /// Samples the monitor and runs the reclamation path on pressure
    /// signals. Critical pressure surfaces as a warning on the output; the
    /// run itself continues with caches dropped.
    fn relieve_pressure(&mut self, diagnostics: &mut RunDiagnostics) {
        let reading = self.monitor.sample();
        if reading.entered_cleanup || reading.entered_critical {
            let freed = self.cache.clear();
            self.monitor.record_reclaimed(freed);
        }
        if reading.entered_critical {
            diagnostics.degrade(
                ErrorKind::Memory,
                format!(
                    "memory critically high ({:.0}% of budget), render cache dropped",
                    reading.ratio * 100.0
                ),
            );
        }
    }

    fn transition(&mut self, next: RunState) {
        if self.state != next {
            log::trace!("run state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}

fn check_cancel(
    cancel: &Arc<AtomicBool>,
    stage: &'static str,
) -> Result<(), (PipelineError, &'static str)> {
    if cancel.load(Ordering::Relaxed) {
        Err((PipelineError::Cancelled, stage))
    } else {
        Ok(())
    }
}

//! Update execution paths
//!
//! Everything in here runs when a debounce timer fires. Each update kind
//! picks its strategy from the size category frozen into the request
//! context, so an edit arriving mid-pass cannot change the plan under us.
//! A host error aborts the whole pass; the next request recomputes from a
//! fresh snapshot, so nothing is lost.

use crate::adaptive::SizeCategory;
use crate::engine::Engine;
use crate::host::{DocumentId, EditorHost, HostError};
use crate::outline::parse_outline;
use crate::scheduler::{KindSet, RequestContext, UpdateKind};
use crate::status;
use crate::tokenizer::{tokenize, tokenize_structural};
use std::sync::Arc;
use std::time::{Duration, Instant};

impl Engine {
    /// Run every kind in the fired request, then record the pass latency
    /// for the adaptive analyzer.
    pub(crate) fn execute(
        &mut self,
        host: &mut dyn EditorHost,
        doc: DocumentId,
        kinds: KindSet,
        context: &RequestContext,
    ) {
        let started = Instant::now();
        if let Err(err) = self.run_kinds(host, doc, kinds, context) {
            tracing::debug!(%doc, %err, "update pass abandoned");
            return;
        }
        let elapsed = started.elapsed();
        self.history.record(context.category, elapsed);
        tracing::debug!(
            %doc,
            ?kinds,
            category = ?context.category,
            elapsed_ms = elapsed.as_millis() as u64,
            "update pass complete"
        );
    }

    fn run_kinds(
        &mut self,
        host: &mut dyn EditorHost,
        doc: DocumentId,
        kinds: KindSet,
        context: &RequestContext,
    ) -> Result<(), HostError> {
        let now = Instant::now();
        for kind in kinds.iter() {
            match kind {
                UpdateKind::Styling => self.run_styling(host, doc, context)?,
                UpdateKind::Outline => self.run_outline(host, doc, context, now)?,
                UpdateKind::StatusCounters => self.run_status(host, doc, context)?,
                UpdateKind::LineNumberGutter => self.run_gutter(host, doc, context)?,
            }
            if let Some(state) = self.docs.get_mut(&doc) {
                state.last_run[kind.index()] = Some(Instant::now());
            }
        }
        Ok(())
    }

    /// Styling strategy by size class: small documents restyle fully through
    /// the result cache, large ones restyle only changed lines, huge ones
    /// restyle the viewport with the structural pattern subset.
    fn run_styling(
        &mut self,
        host: &mut dyn EditorHost,
        doc: DocumentId,
        context: &RequestContext,
    ) -> Result<(), HostError> {
        match context.category {
            SizeCategory::Small => self.style_full_cached(host, doc, context),
            SizeCategory::Large => self.style_changed_lines(host, doc, context),
            SizeCategory::Huge => self.style_viewport(host, doc),
        }
    }

    fn style_full_cached(
        &mut self,
        host: &mut dyn EditorHost,
        doc: DocumentId,
        context: &RequestContext,
    ) -> Result<(), HostError> {
        if let Some(hash) = context.content_hash {
            if let Some(cached) = self.cache.get_styling(hash) {
                for (index, spans) in cached.iter().enumerate() {
                    host.apply_style_spans(doc, index + 1, spans);
                }
                tracing::debug!(%doc, "styling served from cache");
                return Ok(());
            }
        }

        let mut styling = Vec::with_capacity(context.line_count);
        for line in 1..=context.line_count {
            let text = host.line_text(doc, line)?;
            styling.push(tokenize(&text));
        }
        let styling = Arc::new(styling);
        for (index, spans) in styling.iter().enumerate() {
            host.apply_style_spans(doc, index + 1, spans);
        }
        if let Some(hash) = context.content_hash {
            self.cache.put_styling(hash, styling);
        }
        Ok(())
    }

    fn style_changed_lines(
        &mut self,
        host: &mut dyn EditorHost,
        doc: DocumentId,
        context: &RequestContext,
    ) -> Result<(), HostError> {
        let Some(state) = self.docs.get_mut(&doc) else {
            return Ok(());
        };
        let report =
            state
                .tracker
                .report_changes(&*host, doc, self.config.dispatch.localized_window)?;

        match report.scope {
            crate::change_tracker::ChangeScope::Localized => {
                for line in report.lines {
                    let text = host.line_text(doc, line)?;
                    host.apply_style_spans(doc, line, &tokenize(&text));
                }
            }
            crate::change_tracker::ChangeScope::Broad => {
                for line in 1..=context.line_count {
                    let text = host.line_text(doc, line)?;
                    host.apply_style_spans(doc, line, &tokenize(&text));
                }
            }
        }
        Ok(())
    }

    fn style_viewport(
        &mut self,
        host: &mut dyn EditorHost,
        doc: DocumentId,
    ) -> Result<(), HostError> {
        let Some(state) = self.docs.get(&doc) else {
            return Ok(());
        };
        let window = state.viewport.current_window(&*host, doc, &self.config.viewport);
        for line in window.first_line..=window.last_line {
            let text = host.line_text(doc, line)?;
            host.apply_style_spans(doc, line, &tokenize_structural(&text));
        }
        Ok(())
    }

    /// Outline passes over huge documents are additionally rate limited by a
    /// cooldown, on top of debounce and minimum interval.
    fn run_outline(
        &mut self,
        host: &mut dyn EditorHost,
        doc: DocumentId,
        context: &RequestContext,
        now: Instant,
    ) -> Result<(), HostError> {
        if context.category == SizeCategory::Huge {
            let cooldown = Duration::from_millis(self.config.dispatch.outline_cooldown_ms);
            let last = self.docs.get(&doc).and_then(|state| state.last_outline_pass);
            if let Some(last) = last {
                if now.duration_since(last) < cooldown {
                    tracing::debug!(%doc, "outline pass inside cooldown, skipped");
                    return Ok(());
                }
            }
        }

        if let Some(hash) = context.content_hash {
            if let Some(cached) = self.cache.get_outline(hash) {
                host.outline_updated(doc, &cached);
                self.stamp_outline_pass(doc, now);
                return Ok(());
            }
        }

        let mut lines = Vec::with_capacity(context.line_count);
        for line in 1..=context.line_count {
            lines.push(host.line_text(doc, line)?);
        }
        let outline = Arc::new(parse_outline(lines.iter().map(String::as_str)));
        host.outline_updated(doc, &outline);
        if let Some(hash) = context.content_hash {
            self.cache.put_outline(hash, outline);
        }
        self.stamp_outline_pass(doc, now);
        Ok(())
    }

    fn stamp_outline_pass(&mut self, doc: DocumentId, now: Instant) {
        if let Some(state) = self.docs.get_mut(&doc) {
            state.last_outline_pass = Some(now);
        }
    }

    fn run_status(
        &mut self,
        host: &mut dyn EditorHost,
        doc: DocumentId,
        context: &RequestContext,
    ) -> Result<(), HostError> {
        if let Some(hash) = context.content_hash {
            if let Some(cached) = self.cache.get_counters(hash) {
                host.counters_updated(doc, &cached);
                return Ok(());
            }
        }

        let mut lines = Vec::with_capacity(context.line_count);
        for line in 1..=context.line_count {
            lines.push(host.line_text(doc, line)?);
        }
        let counters = status::count(lines.iter().map(String::as_str));
        host.counters_updated(doc, &counters);
        if let Some(hash) = context.content_hash {
            self.cache.put_counters(hash, counters);
        }
        Ok(())
    }

    /// Small documents always repaint the gutter; large and huge ones only
    /// when the viewport moved past the significance threshold.
    fn run_gutter(
        &mut self,
        host: &mut dyn EditorHost,
        doc: DocumentId,
        context: &RequestContext,
    ) -> Result<(), HostError> {
        let Some(state) = self.docs.get_mut(&doc) else {
            return Ok(());
        };
        match context.category {
            SizeCategory::Small => {
                let window = state.viewport.current_window(&*host, doc, &self.config.viewport);
                host.gutter_refresh(doc, window);
            }
            SizeCategory::Large | SizeCategory::Huge => {
                if state
                    .viewport
                    .has_moved_significantly(&*host, doc, &self.config.viewport)
                {
                    host.gutter_refresh(doc, state.viewport.last_window());
                }
            }
        }
        Ok(())
    }
}

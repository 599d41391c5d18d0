//! The sort operator itself: drives upstream through the build phase,
//! produces a run set, and drains it in final order.

use std::sync::Arc;

use vsort_core::block::Block;
use vsort_core::budget::{MemoryBudget, ResizableGuard};
use vsort_core::schema::Schema;
use vsort_core::sort_key::SortDescription;

use super::config::SortConfig;
use super::cursor::Run;
use super::error::{Result, SortError};
use super::merge_reader::MergeReader;
use super::run_buffer::RunBuffer;
use super::run_set::RunSet;
use super::traits::{RuntimeState, SortKeyExprCtx, Upstream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorState {
    Init,
    Open,
    Building,
    MergedReady,
    SingleRunReady,
    Draining,
    Eos,
}

/// Buffers upstream rows into sorted runs, then drains them (merging when
/// more than one run was produced) in final order, applying `offset`/`limit`.
pub struct SortOperator<U, G, M>
where
    U: Upstream,
    G: ResizableGuard + 'static,
    M: MemoryBudget<Guard = G>,
{
    upstream: U,
    budget: M,
    config: SortConfig,
    key_columns: Vec<usize>,
    expr_ctx: Option<Arc<dyn SortKeyExprCtx>>,
    description: Arc<SortDescription>,
    description_resolved: bool,
    state: OperatorState,
    run_buffer: Option<RunBuffer<G>>,
    run_set: Option<RunSet>,
    reader: Option<MergeReader>,
    rows_emitted: usize,
}

impl<U, G, M> SortOperator<U, G, M>
where
    U: Upstream,
    G: ResizableGuard + 'static,
    M: MemoryBudget<Guard = G>,
{
    /// `key_columns` are the sort-key column indices to use verbatim when no
    /// `expr_ctx` is given, or as a fallback if `expr_ctx.need_materialize_tuple()`
    /// is false.
    pub fn new(
        upstream: U,
        budget: M,
        config: SortConfig,
        key_columns: Vec<usize>,
        expr_ctx: Option<Arc<dyn SortKeyExprCtx>>,
    ) -> Self {
        let description = Arc::new(config.sort_description(&key_columns));
        Self {
            upstream,
            budget,
            config,
            key_columns,
            expr_ctx,
            description,
            description_resolved: false,
            state: OperatorState::Init,
            run_buffer: None,
            run_set: None,
            reader: None,
            rows_emitted: 0,
        }
    }

    pub fn state(&self) -> OperatorState {
        self.state
    }

    pub fn row_descriptor(&self) -> &Schema {
        self.upstream.row_descriptor()
    }

    pub fn open(&mut self, runtime: &dyn RuntimeState) -> Result<()> {
        self.state = OperatorState::Open;
        let column_names: Vec<String> = self
            .upstream
            .row_descriptor()
            .fields
            .iter()
            .map(|f| f.name.clone())
            .collect();
        self.run_buffer = Some(RunBuffer::new(
            column_names,
            self.config.run_row_threshold,
            self.config.run_byte_threshold,
        ));
        self.run_set = Some(RunSet::new(Arc::clone(&self.description), self.config.limit_hint()));
        match self.build(runtime) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    /// Pull one result batch in final order, or `None` at end of stream.
    pub fn next(&mut self, runtime: &dyn RuntimeState) -> Result<Option<Block>> {
        match self.state {
            OperatorState::Eos => Ok(None),
            OperatorState::MergedReady | OperatorState::SingleRunReady => {
                self.state = OperatorState::Draining;
                self.next(runtime)
            }
            OperatorState::Draining => self.drain_one(runtime),
            other => Err(SortError::Internal(format!(
                "next() called while operator is in state {other:?}"
            ))),
        }
    }

    fn drain_one(&mut self, runtime: &dyn RuntimeState) -> Result<Option<Block>> {
        match self.drain_one_checked(runtime) {
            Ok(v) => Ok(v),
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    fn drain_one_checked(&mut self, runtime: &dyn RuntimeState) -> Result<Option<Block>> {
        if runtime.is_cancelled() {
            return Err(SortError::Cancelled);
        }
        runtime.check_query_state()?;

        let Some(reader) = &mut self.reader else {
            return Ok(None);
        };

        let remaining_limit = self.config.limit.map(|l| l.saturating_sub(self.rows_emitted));
        if remaining_limit == Some(0) {
            self.state = OperatorState::Eos;
            return Ok(None);
        }
        let target = remaining_limit
            .unwrap_or_else(|| runtime.batch_size())
            .min(runtime.batch_size())
            .max(1);

        match reader.emit_batch(target, &self.budget)? {
            Some(block) => {
                self.rows_emitted += block.num_rows();
                Ok(Some(block))
            }
            None => {
                self.state = OperatorState::Eos;
                Ok(None)
            }
        }
    }

    /// Drive the upstream to exhaustion, accumulating runs.
    fn build(&mut self, runtime: &dyn RuntimeState) -> Result<()> {
        self.state = OperatorState::Building;
        loop {
            let (block, eos) = self.upstream.next().map_err(|e| match e {
                SortError::Upstream(_) | SortError::Cancelled => e,
                other => SortError::Upstream(other.to_string()),
            })?;

            self.ingest(&block, runtime)?;

            if eos {
                break;
            }
        }
        self.flush_pending_run(runtime)?;
        self.finish_build()
    }

    /// Resolve `self.description` against the first non-empty block seen,
    /// when the operator was configured with an expression context. Assumes
    /// every block from this upstream shares a schema, so the materialized
    /// key column indices a `SortKeyExpr` returns for one block hold for all
    /// of them; resolving once avoids re-evaluating expressions per block.
    fn resolve_description(&mut self, block: &Block) -> Result<()> {
        if self.description_resolved {
            return Ok(());
        }
        self.description_resolved = true;

        let Some(ctx) = &self.expr_ctx else {
            return Ok(());
        };
        if !ctx.need_materialize_tuple() {
            return Ok(());
        }

        let mut resolved = Vec::with_capacity(ctx.lhs_ordering_expr_ctxs().len());
        for expr in ctx.lhs_ordering_expr_ctxs() {
            let col = expr
                .evaluate(block)
                .map_err(|e| SortError::Expression(e.to_string()))?;
            resolved.push(col);
        }
        self.description = Arc::new(self.config.sort_description(&resolved));
        Ok(())
    }

    fn ingest(&mut self, block: &Block, runtime: &dyn RuntimeState) -> Result<()> {
        if block.is_empty() {
            return Ok(());
        }
        self.resolve_description(block)?;
        let crossed = {
            let buffer = self.run_buffer.as_mut().expect("open() initializes run_buffer");
            buffer.append(block, &self.budget)?
        };
        if crossed {
            self.flush_pending_run(runtime)?;
        }
        Ok(())
    }

    fn flush_pending_run(&mut self, runtime: &dyn RuntimeState) -> Result<()> {
        let buffer = self.run_buffer.as_mut().expect("open() initializes run_buffer");
        if buffer.is_empty() {
            return Ok(());
        }
        let (unsorted, guard) = buffer.extract()?;
        let rows = unsorted.num_rows();
        let sorted = super::partial_sort::PartialSorter::sort(&unsorted, &self.description, self.config.limit_hint())?;
        let guard = guard.map(|g| Box::new(g) as Box<dyn vsort_core::budget::BudgetGuard>);
        self.run_set
            .as_mut()
            .expect("open() initializes run_set")
            .push(Run::with_guard(sorted, guard));

        #[cfg(feature = "tracing")]
        tracing::trace!(rows, runs = self.run_set.as_ref().map(|s| s.len()).unwrap_or(0), "flushed sort run");

        if runtime.is_cancelled() {
            return Err(SortError::Cancelled);
        }
        runtime.check_query_state()
    }

    fn finish_build(&mut self) -> Result<()> {
        let run_set = self.run_set.take().expect("open() initializes run_set");
        let runs = run_set.into_runs();
        self.state = if runs.len() <= 1 {
            OperatorState::SingleRunReady
        } else {
            OperatorState::MergedReady
        };
        self.reader = Some(MergeReader::new(runs, Arc::clone(&self.description), self.config.offset));
        Ok(())
    }

    /// Release resources and move to `Eos`. Safe to call more than once;
    /// runs unconditionally on every exit path, including errors, per this
    /// operator's build-then-unconditionally-close contract. Full teardown:
    /// drops the `SortKeyExprCtx`, the `RunSet`/`MergeReader` (and every
    /// `Arc<Run>` and its guard with them), and the `RunBuffer`.
    pub fn close(&mut self) {
        self.run_buffer = None;
        self.run_set = None;
        self.reader = None;
        self.expr_ctx = None;
        self.state = OperatorState::Eos;
    }

    /// Clear the skipped/emitted-row counters and reposition the merge
    /// reader back to the start of the already-admitted run set, so the same
    /// output can be replayed without rebuilding. Runs, buffers, and the
    /// reader itself survive — full teardown is `close`'s job, not this
    /// one's.
    pub fn reset(&mut self) {
        self.rows_emitted = 0;
        if let Some(reader) = &mut self.reader {
            reader.rewind();
            self.state = OperatorState::Draining;
        }
    }
}

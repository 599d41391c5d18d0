//! `VecUpstream`: an in-memory `Upstream` used by tests and the demo binary
//! to feed a fixed sequence of blocks into a `SortOperator`.

use std::collections::VecDeque;

use vsort_core::block::Block;
use vsort_core::schema::Schema;
use vsort_operators::sort::{SortError, Upstream};

pub struct VecUpstream {
    schema: Schema,
    blocks: VecDeque<Block>,
}

impl VecUpstream {
    pub fn new(schema: Schema, blocks: Vec<Block>) -> Self {
        Self {
            schema,
            blocks: blocks.into(),
        }
    }
}

impl Upstream for VecUpstream {
    fn next(&mut self) -> Result<(Block, bool), SortError> {
        match self.blocks.pop_front() {
            Some(block) => {
                let eos = self.blocks.is_empty();
                Ok((block, eos))
            }
            None => Ok((Block::empty(self.schema.fields.iter().map(|f| f.name.clone()).collect()), true)),
        }
    }

    fn row_descriptor(&self) -> &Schema {
        &self.schema
    }
}

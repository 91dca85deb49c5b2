//! One reducer stage of the pipeline.

use std::sync::mpsc::{Receiver, SyncSender};

use tracing::{debug, trace, warn};

use crate::error::{PrimitiveError, TreeError};
use crate::hash::Primitive;
use crate::token::Token;

/// Accumulates up to `branching` child digests into one parent digest.
#[derive(Debug)]
pub(crate) struct Level<P> {
    index: usize,
    branching: usize,
    group: P,
    members: usize,
}

impl<P: Primitive> Level<P> {
    pub(crate) fn new(index: usize, branching: usize) -> Self {
        Level {
            index,
            branching,
            group: P::default(),
            members: 0,
        }
    }

    /// Adds a child digest; returns the parent digest once the group is full.
    pub(crate) fn push(&mut self, child: &[u8]) -> Result<Option<Vec<u8>>, PrimitiveError> {
        if self.members == 0 {
            self.group.reset();
        }
        self.group.write(child)?;
        self.members += 1;

        if self.members == self.branching {
            self.members = 0;
            return Ok(Some(self.group.sum(&[])));
        }
        Ok(None)
    }

    /// Closes a short group. An idle level yields nothing.
    pub(crate) fn flush(&mut self) -> Option<Vec<u8>> {
        if self.members == 0 {
            return None;
        }
        self.members = 0;
        Some(self.group.sum(&[]))
    }

    /// Worker loop: reads `input` in order and forwards to `output` until a
    /// `Close` arrives or either neighbour goes away.
    pub(crate) fn run(
        mut self,
        input: Receiver<Token>,
        output: SyncSender<Token>,
    ) -> Result<(), TreeError> {
        let level = self.index;
        debug!(level, "level started");

        for token in input.iter() {
            trace!(level, token = token.name(), "received");
            let forward: Vec<Token> = match token {
                Token::Data(child) => match self.push(&child) {
                    Ok(parent) => parent.map(Token::Data).into_iter().collect(),
                    Err(e) => {
                        warn!(level, error = %e, "primitive failed, stopping level");
                        return Err(e.into());
                    }
                },
                Token::Flush => match self.flush() {
                    Some(parent) => vec![Token::Data(parent), Token::Flush],
                    None => vec![Token::Flush],
                },
                Token::Close => {
                    if output.send(Token::Close).is_err() {
                        debug!(level, "upper level gone while closing");
                    }
                    debug!(level, "level closed");
                    return Ok(());
                }
            };

            for token in forward {
                if output.send(token).is_err() {
                    debug!(level, "upper level gone, stopping");
                    return Ok(());
                }
            }
        }

        debug!(level, "lower level gone, stopping");
        Ok(())
    }
}

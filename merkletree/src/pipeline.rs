//! Worker threads and the channels between them.
//!
//! Channel `i` feeds level `i`; channel `H-1` is the root, read by the caller.
//! Inner channels are rendezvous channels and are the only backpressure in the
//! system. The root channel has room for one result and the control token
//! that follows it, so a height-1 tree (no workers, the caller on both ends)
//! never blocks on itself.

use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

use tracing::{debug, trace, warn};

use crate::config::TreeConfig;
use crate::error::{Result, TreeError};
use crate::hash::Primitive;
use crate::level::Level;
use crate::token::Token;

const ROOT_SLOTS: usize = 2;

type Worker = JoinHandle<Result<()>>;

#[derive(Debug)]
pub(crate) struct Pipeline {
    input: SyncSender<Token>,
    root: Receiver<Token>,
    workers: Vec<Worker>,
}

fn channel(index: usize, height: usize) -> (SyncSender<Token>, Receiver<Token>) {
    if index + 1 == height {
        mpsc::sync_channel(ROOT_SLOTS)
    } else {
        mpsc::sync_channel(0)
    }
}

impl Pipeline {
    /// Spawns one worker per level of a validated `config`.
    pub(crate) fn start<P: Primitive>(config: &TreeConfig) -> Result<Self> {
        let height = config.height();
        let (input, mut upstream) = channel(0, height);
        let mut workers = Vec::with_capacity(config.levels());

        for index in 0..config.levels() {
            let (tx, rx) = channel(index + 1, height);
            let level = Level::<P>::new(index, config.branching());
            let spawned = thread::Builder::new()
                .name(format!("merkle-level-{index}"))
                .spawn(move || level.run(upstream, tx));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    warn!(level = index, error = %e, "failed to spawn level");
                    drop(input);
                    let _ = join_all(workers);
                    return Err(TreeError::Spawn(e));
                }
            }
            upstream = rx;
        }

        debug!(height, branching = config.branching(), "pipeline started");
        Ok(Pipeline {
            input,
            root: upstream,
            workers,
        })
    }

    pub(crate) fn send(&self, token: Token) -> Result<()> {
        trace!(token = token.name(), "sending");
        self.input
            .send(token)
            .map_err(|_| TreeError::PipelineDisconnected)
    }

    fn recv(&self) -> Result<Token> {
        self.root.recv().map_err(|_| TreeError::PipelineDisconnected)
    }

    /// Sends one `Flush` and waits for it at the root. Returns the single
    /// digest that surfaced ahead of it, if any.
    pub(crate) fn flush(&self) -> Result<Option<Vec<u8>>> {
        self.send(Token::Flush)?;

        let mut root = None;
        loop {
            match self.recv()? {
                Token::Data(digest) if root.is_none() => root = Some(digest),
                Token::Flush => return Ok(root),
                other => return Err(TreeError::UnexpectedToken(other.name())),
            }
        }
    }

    /// Sends `Close`, waits for its acknowledgment and joins every worker.
    pub(crate) fn close(self) -> Result<()> {
        if let Err(e) = self.send(Token::Close) {
            return Err(self.abort().err().unwrap_or(e));
        }

        loop {
            match self.recv() {
                Ok(Token::Close) => break,
                Ok(token) => trace!(token = token.name(), "discarding unread root token"),
                Err(e) => return Err(self.abort().err().unwrap_or(e)),
            }
        }

        debug!("pipeline closed");
        join_all(self.workers)
    }

    /// Tears the pipeline down without the close handshake. Dropping the
    /// caller's ends unblocks every worker; the first worker failure wins.
    pub(crate) fn abort(self) -> Result<()> {
        let Pipeline {
            input,
            root,
            workers,
        } = self;
        drop(input);
        drop(root);
        join_all(workers)
    }
}

fn join_all(workers: Vec<Worker>) -> Result<()> {
    let mut outcome = Ok(());
    for (level, handle) in workers.into_iter().enumerate() {
        let result = handle
            .join()
            .unwrap_or(Err(TreeError::WorkerPanicked { level }));
        if let Err(e) = result {
            warn!(level, error = %e, "level failed");
            if outcome.is_ok() {
                outcome = Err(e);
            }
        }
    }
    outcome
}

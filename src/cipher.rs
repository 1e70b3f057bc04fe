use crate::{
    config::MessageExhaustion,
    frame::{Dimensions, RgbFrame},
    stego::{CipherOperation, CoordinatePermuter, FrameReconciler},
    video_io::{FrameSink, FrameSource},
};
use anyhow::{Context, Result};
use std::mem;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub operation: CipherOperation,
    /// positive rounds scramble the message before the operation, negative rounds
    /// descramble the composite after it
    pub rounds: i32,
    pub seed: u64,
    pub message_exhaustion: MessageExhaustion,
}

#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub latest_frame: u64,
    pub total_frames: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub frames: u64,
    pub message_frames: u64,
    /// frames processed after the message ran out, see [`MessageExhaustion`]
    pub filler_frames: u64,
    pub passed_through: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageState {
    Flowing,
    Exhausted,
}

/// Combines a cloak stream with a message (or key) stream frame by frame.
///
/// All buffers are allocated once, cloak sized, and reused for every frame.
pub struct CipherSession {
    options: SessionOptions,
    reconciler: FrameReconciler,
    permuter: CoordinatePermuter,
    message_state: MessageState,
    has_native: bool,

    cloak: RgbFrame,
    // last complete message frame and the buffer the next one is read into
    native: RgbFrame,
    incoming: RgbFrame,
    prepared: RgbFrame,
    scratch: RgbFrame,
}

impl CipherSession {
    pub fn new(options: SessionOptions, cloak_dims: Dimensions, message_dims: Dimensions) -> Self {
        info!(
            "{:?} with cloak {} and message {}, {} rounds",
            options.operation, cloak_dims, message_dims, options.rounds
        );
        if message_dims.width > cloak_dims.width || message_dims.height > cloak_dims.height {
            info!("the message is larger than the cloak and will be cropped to {}", cloak_dims);
        }

        Self {
            options,
            reconciler: FrameReconciler::new(options.seed),
            permuter: CoordinatePermuter::new(cloak_dims, options.rounds),
            message_state: MessageState::Flowing,
            has_native: false,
            cloak: RgbFrame::new(cloak_dims),
            native: RgbFrame::new(message_dims),
            incoming: RgbFrame::new(message_dims),
            prepared: RgbFrame::new(cloak_dims),
            scratch: RgbFrame::new(cloak_dims),
        }
    }

    pub fn options(&self) -> SessionOptions { self.options }

    /// Pulls the next message frame into the prepared buffer. Returns whether there
    /// is a prepared frame to combine with the current cloak frame.
    fn advance_message(&mut self, message: &mut impl FrameSource) -> Result<bool> {
        if self.message_state == MessageState::Flowing {
            if message.read_frame(&mut self.incoming).context("could not read message frame")? {
                mem::swap(&mut self.native, &mut self.incoming);
                self.has_native = true;
                self.reconciler.reconcile_into(&self.native, &mut self.prepared);
                return Ok(true);
            }
            self.message_state = MessageState::Exhausted;
            info!("message stream ended, continuing with {:?}", self.options.message_exhaustion);
        }

        if !self.has_native {
            return Ok(false);
        }
        Ok(match self.options.message_exhaustion {
            MessageExhaustion::Filler => {
                self.reconciler.fill_into(&self.native, &mut self.prepared);
                true
            }
            MessageExhaustion::RepeatLast => true,
            MessageExhaustion::PassThrough => false,
        })
    }

    /// Applies the operation to the cloak frame currently held by the session.
    fn process_frame(&mut self) -> Result<()> {
        let key = if self.options.rounds > 0 {
            self.permuter.permute_into(&self.prepared, &mut self.scratch)?;
            &self.scratch
        } else {
            &self.prepared
        };
        self.options.operation.apply_to_frame(&mut self.cloak, key)?;

        if self.options.rounds < 0 {
            self.permuter.permute_into(&self.cloak, &mut self.scratch)?;
            mem::swap(&mut self.cloak, &mut self.scratch);
        }
        Ok(())
    }

    /// Runs until the cloak stream ends. The message stream ending first is handled
    /// according to [`SessionOptions::message_exhaustion`].
    pub fn run(
        &mut self,
        cloak: &mut impl FrameSource,
        message: &mut impl FrameSource,
        sink: &mut impl FrameSink,
        mut progress: impl FnMut(Progress),
    ) -> Result<SessionSummary> {
        let mut summary = SessionSummary::default();
        let total_frames = cloak.frame_count();

        while cloak.read_frame(&mut self.cloak).context("could not read cloak frame")? {
            if self.advance_message(message)? {
                match self.message_state {
                    MessageState::Flowing => summary.message_frames += 1,
                    MessageState::Exhausted => summary.filler_frames += 1,
                }
                self.process_frame()?;
            } else {
                summary.passed_through += 1;
            }

            sink.write_frame(&self.cloak)
                .with_context(|| format!("could not write frame {}", summary.frames))?;
            summary.frames += 1;
            progress(Progress { latest_frame: summary.frames, total_frames });
        }

        debug!("{:?}", summary);
        info!(
            "processed {} frames: {} with message frames, {} after the message ended, {} passed \
             through",
            summary.frames, summary.message_frames, summary.filler_frames, summary.passed_through
        );
        Ok(summary)
    }
}

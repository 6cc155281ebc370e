//! Closes the revealed card when the list scrolls away from it.
//!
//! The host feeds `(first visible index, offset within that item)`
//! samples. A close fires when the first visible index changes or the
//! offset moves more than a threshold from the last checkpoint. The
//! driver consumes every sample in order — a conflated latest-value
//! cell could skip the crossing sample entirely during a fast fling.

use futures::{Stream, StreamExt};
use tracing::debug;

use crate::error::Result;
use crate::reveal::RevealRegistry;

/// One scroll position observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    /// Index of the first visible list item.
    pub first_visible: usize,
    /// Scroll offset within that item, in density-independent units.
    pub offset: f32,
}

#[derive(Debug)]
pub struct ScrollAutoCloser {
    threshold: f32,
    checkpoint: Option<(usize, f32)>,
}

impl ScrollAutoCloser {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            checkpoint: None,
        }
    }

    /// Feed one sample; returns `true` when the revealed card should
    /// close. The first sample only seeds the checkpoint — a list can
    /// mount already scrolled, and that position is not a crossing.
    /// On a close the checkpoint resets to the triggering sample, so
    /// the next close needs a fresh full displacement.
    pub fn observe(&mut self, sample: ScrollSample) -> bool {
        let Some((last_first_visible, last_offset)) = self.checkpoint else {
            self.checkpoint = Some((sample.first_visible, sample.offset));
            return false;
        };
        let crossed = sample.first_visible != last_first_visible
            || (sample.offset - last_offset).abs() > self.threshold;
        if crossed {
            self.checkpoint = Some((sample.first_visible, sample.offset));
        }
        crossed
    }

    /// Consume the sample stream, closing the revealed card on every
    /// threshold crossing. Runs until the stream ends.
    pub async fn drive<S>(mut self, mut samples: S, registry: &RevealRegistry) -> Result<()>
    where
        S: Stream<Item = ScrollSample> + Unpin,
    {
        while let Some(sample) = samples.next().await {
            if self.observe(sample) {
                debug!(
                    first_visible = sample.first_visible,
                    offset = sample.offset,
                    "scroll threshold crossed; closing revealed card"
                );
                registry.close_active_animated().await?;
            }
        }
        Ok(())
    }
}

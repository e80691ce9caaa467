use log::{debug, warn};
use std::time::Duration;
use tokio::{sync::mpsc::UnboundedSender, time};

/// One piece of a map transfer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MapFrame {
    /// Position of this frame, starting at zero.
    pub index: usize,
    /// The number of frames in the whole transfer.
    pub total: usize,
    pub data: Vec<u8>,
}

/// An encoded map split into frames no larger than the transport allows.
///
/// Frames are handed out in order and reassemble into the original payload when concatenated.
pub struct MapTransfer {
    frames: Vec<MapFrame>,
}

impl MapTransfer {
    /// Splits `payload` into frames of at most `frame_size` bytes. Returns `None` if `frame_size` is
    /// zero. An empty payload still produces one (empty) frame so the receiver learns the transfer
    /// is complete.
    pub fn new(payload: Vec<u8>, frame_size: usize) -> Option<Self> {
        if frame_size == 0 {
            return None;
        }

        if payload.is_empty() {
            return Some(MapTransfer {
                frames: vec![MapFrame {
                    index: 0,
                    total: 1,
                    data: payload,
                }],
            });
        }

        let total = (payload.len() + frame_size - 1) / frame_size;
        let frames = payload
            .chunks(frame_size)
            .enumerate()
            .map(|(index, data)| MapFrame {
                index,
                total,
                data: data.to_vec(),
            })
            .collect();

        Some(MapTransfer { frames })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[MapFrame] {
        &self.frames
    }

    /// The payload size in bytes.
    pub fn len(&self) -> usize {
        self.frames.iter().map(|frame| frame.data.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sends every frame in order, pausing `delay` between frames so a slow link is not flooded.
    /// Stops early if the receiver goes away and returns the number of frames sent.
    pub async fn drip_feed(self, sender: &UnboundedSender<MapFrame>, delay: Duration) -> usize {
        let total = self.frames.len();
        let mut sent = 0;

        for frame in self.frames {
            if sent > 0 && !delay.is_zero() {
                time::sleep(delay).await;
            }

            if sender.send(frame).is_err() {
                warn!("Map transfer abandoned after {} of {} frames", sent, total);
                return sent;
            }
            sent += 1;
        }

        debug!("Map transfer sent {} frames", sent);
        sent
    }
}

use crate::world::{BlockChanged, MapObserver};
use log::warn;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Forwards block changes to the replication task.
///
/// Sending on an unbounded channel never blocks, so the writer's thread is not held up by slow
/// peers. Changes arrive in the order they were written.
pub struct BlockChangeSender {
    sender: UnboundedSender<BlockChanged>,
}

impl BlockChangeSender {
    pub fn new(sender: UnboundedSender<BlockChanged>) -> Self {
        BlockChangeSender { sender }
    }

    /// Creates a sender together with the receiving end of its channel.
    pub fn channel() -> (Self, UnboundedReceiver<BlockChanged>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (BlockChangeSender::new(sender), receiver)
    }
}

impl MapObserver for BlockChangeSender {
    fn block_changed(&self, change: &BlockChanged) {
        if self.sender.send(*change).is_err() {
            warn!(
                "Dropped change at {:?}: replication receiver is closed",
                change.position
            );
        }
    }
}

/// Receives gate transitions from the engine as they happen.
///
/// `index` is the position of the triggering sample inside the current chunk;
/// `chunk_done` is called once per chunk with its length so observers can keep
/// an absolute sample position.
pub trait GateObserver {
    fn gate_closed(&mut self, index: usize);
    fn gate_opened(&mut self, index: usize);
    fn chunk_done(&mut self, _len: usize) {}
}

impl GateObserver for () {
    fn gate_closed(&mut self, _index: usize) {}
    fn gate_opened(&mut self, _index: usize) {}
}

// Element type of a receive buffer, 8 bytes aligned so the buffer can be
// viewed as any numeric payload.
pub trait Align8: bytemuck::Pod {}

impl Align8 for u64 {}

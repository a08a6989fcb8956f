//! VoicePool: fixed-capacity bookkeeping of pending note-offs.

use heapless::Vec;
use tracing::trace;
use vsq_ir::{Note, Timestamp};

use crate::bus::ControlBus;
use crate::error::PoolExhausted;
use crate::protocol::{self, MidiMessage, DEFAULT_RELEASE_VELOCITY};

/// Identifier for a voice slot in the pool.
pub type VoiceId = usize;

/// A promise to silence one sounding note.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoiceReservation {
    pub channel: u8,
    pub note: Note,
    /// When the note-off goes out
    pub due: Timestamp,
}

/// Pool of `N` voice slots with an index free list.
///
/// Nothing here allocates: slots are a fixed array and the free list is a
/// fixed-capacity stack of slot indices.
#[derive(Clone, Debug)]
pub struct VoicePool<const N: usize> {
    /// Voice slots (None = free).
    slots: [Option<VoiceReservation>; N],
    /// Indices of free slots in descending order; the lowest is on top.
    free: Vec<VoiceId, N>,
}

impl<const N: usize> VoicePool<N> {
    /// Create a pool with every slot free.
    pub fn new() -> Self {
        let mut free = Vec::new();
        for id in (0..N).rev() {
            let pushed = free.push(id);
            debug_assert!(pushed.is_ok());
        }
        Self { slots: [None; N], free }
    }

    /// Total number of slots.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Count of active (occupied) voice slots.
    pub fn active_count(&self) -> usize {
        N - self.free.len()
    }

    /// Get a reservation by slot.
    pub fn get(&self, id: VoiceId) -> Option<&VoiceReservation> {
        self.slots.get(id).and_then(|s| s.as_ref())
    }

    /// Iterate over active reservations.
    pub fn iter(&self) -> impl Iterator<Item = (VoiceId, &VoiceReservation)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|v| (id, v)))
    }

    /// Reserve a slot for a note-off due at `due`.
    ///
    /// Fails when every slot is taken; existing reservations are untouched.
    pub fn reserve(
        &mut self,
        channel: u8,
        note: Note,
        due: Timestamp,
    ) -> Result<VoiceId, PoolExhausted> {
        let id = self.free.pop().ok_or(PoolExhausted)?;
        self.slots[id] = Some(VoiceReservation { channel, note, due });
        trace!(voice = id, channel, note = note.0, due = due.as_millis(), "voice reserved");
        Ok(id)
    }

    /// Send a note-off for every reservation due at `now` and free its slot.
    ///
    /// Returns the number of note-offs sent.
    pub fn expire_due<B: ControlBus + ?Sized>(&mut self, now: Timestamp, bus: &mut B) -> usize {
        let mut sent = 0;
        for id in 0..N {
            let Some(voice) = self.slots[id] else { continue };
            if !now.has_reached(voice.due) {
                continue;
            }
            protocol::send(
                bus,
                MidiMessage::note_off(voice.channel, voice.note, DEFAULT_RELEASE_VELOCITY),
            );
            self.free_slot(id);
            sent += 1;
        }
        sent
    }

    /// Send every outstanding note-off now, regardless of due time.
    pub fn release_all<B: ControlBus + ?Sized>(&mut self, bus: &mut B) -> usize {
        let mut sent = 0;
        for id in 0..N {
            if let Some(voice) = self.slots[id] {
                protocol::send(
                    bus,
                    MidiMessage::note_off(voice.channel, voice.note, DEFAULT_RELEASE_VELOCITY),
                );
                self.free_slot(id);
                sent += 1;
            }
        }
        sent
    }

    /// Return a slot to the free list, keeping it sorted in descending
    /// order so `reserve` always pops the lowest free index.
    fn free_slot(&mut self, id: VoiceId) {
        if self.slots[id].take().is_none() {
            return;
        }
        let pushed = self.free.push(id);
        debug_assert!(pushed.is_ok());
        let mut i = self.free.len() - 1;
        while i > 0 && self.free[i - 1] < self.free[i] {
            self.free.swap(i - 1, i);
            i -= 1;
        }
    }
}

impl<const N: usize> Default for VoicePool<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::RecordingBus;

    fn ms(v: u32) -> Timestamp {
        Timestamp::from_millis(v)
    }

    // === Allocation tests ===

    #[test]
    fn pool_new_is_empty() {
        let pool = VoicePool::<4>::new();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.capacity(), 4);
    }

    #[test]
    fn pool_reserve_takes_lowest_free_slot() {
        let mut pool = VoicePool::<4>::new();
        assert_eq!(pool.reserve(0, Note(60), ms(100)), Ok(0));
        assert_eq!(pool.reserve(0, Note(62), ms(100)), Ok(1));
        assert_eq!(pool.active_count(), 2);
        assert_eq!(pool.get(1).unwrap().note, Note(62));
    }

    #[test]
    fn pool_exhaustion_keeps_existing_reservations() {
        let mut pool = VoicePool::<2>::new();
        pool.reserve(0, Note(60), ms(100)).unwrap();
        pool.reserve(1, Note(61), ms(200)).unwrap();
        assert_eq!(pool.reserve(2, Note(62), ms(50)), Err(PoolExhausted));
        assert_eq!(pool.active_count(), 2);

        let mut bus = RecordingBus::new();
        assert_eq!(pool.expire_due(ms(100), &mut bus), 1);
        assert_eq!(bus.messages(), [MidiMessage::note_off(0, Note(60), 64)]);
        assert_eq!(pool.expire_due(ms(200), &mut bus), 1);
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn pool_reuses_lowest_slot_after_out_of_order_frees() {
        let mut pool = VoicePool::<4>::new();
        pool.reserve(0, Note(60), ms(30)).unwrap();
        pool.reserve(0, Note(61), ms(10)).unwrap();
        pool.reserve(0, Note(62), ms(20)).unwrap();
        let mut bus = RecordingBus::new();
        // Frees slot 1 first, then slot 2, then slot 0.
        pool.expire_due(ms(10), &mut bus);
        pool.expire_due(ms(20), &mut bus);
        pool.expire_due(ms(30), &mut bus);
        assert_eq!(pool.reserve(1, Note(70), ms(100)), Ok(0));
        assert_eq!(pool.reserve(1, Note(71), ms(100)), Ok(1));
        assert_eq!(pool.reserve(1, Note(72), ms(100)), Ok(2));
        assert_eq!(pool.reserve(1, Note(73), ms(100)), Ok(3));
    }

    #[test]
    fn pool_freed_slot_is_reused() {
        let mut pool = VoicePool::<1>::new();
        pool.reserve(0, Note(60), ms(10)).unwrap();
        assert!(pool.reserve(0, Note(61), ms(10)).is_err());
        pool.expire_due(ms(10), &mut RecordingBus::new());
        assert_eq!(pool.reserve(0, Note(61), ms(20)), Ok(0));
    }

    // === Expiry tests ===

    #[test]
    fn expire_leaves_future_voices() {
        let mut pool = VoicePool::<4>::new();
        pool.reserve(0, Note(60), ms(100)).unwrap();
        pool.reserve(0, Note(64), ms(300)).unwrap();
        let mut bus = RecordingBus::new();
        assert_eq!(pool.expire_due(ms(99), &mut bus), 0);
        assert!(bus.writes().is_empty());
        assert_eq!(pool.expire_due(ms(150), &mut bus), 1);
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.iter().next().map(|(_, v)| v.note), Some(Note(64)));
    }

    #[test]
    fn late_tick_still_expires() {
        let mut pool = VoicePool::<4>::new();
        pool.reserve(5, Note(40), ms(100)).unwrap();
        let mut bus = RecordingBus::new();
        assert_eq!(pool.expire_due(ms(1_000), &mut bus), 1);
        assert_eq!(bus.data_bytes(), [0x85, 40, 64]);
    }

    #[test]
    fn release_all_silences_everything() {
        let mut pool = VoicePool::<4>::new();
        pool.reserve(0, Note(60), ms(100)).unwrap();
        pool.reserve(1, Note(62), ms(5_000)).unwrap();
        let mut bus = RecordingBus::new();
        assert_eq!(pool.release_all(&mut bus), 2);
        assert_eq!(pool.active_count(), 0);
        assert_eq!(bus.messages().len(), 2);
    }
}

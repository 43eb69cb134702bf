//! Sprite-sheet animation playback.
//!
//! [`Animator`] drives frame selection over time for an owned
//! [`AnimationSet`]. The [`SpriteAnimator`](crate::components::spriteanimator::SpriteAnimator)
//! component wraps one and copies the current frame onto its sprite each tick.
//!
//! # States
//!
//! | Call | From | To | `frame_index` | timer |
//! |---|---|---|---|---|
//! | `play` | any | Playing | kept, or 0 when an id is selected | kept, or reset with the index |
//! | `pause` | any | Paused | kept | kept |
//! | `stop` | any | Stopped | 0 | reset |
//! | `update` past the last frame, not looping | Playing | Stopped | 0 | reset |
//!
//! # Advance rule
//!
//! Each [`Animator::update`] adds `dt` to an internal timer and compares it
//! against the current frame's length scaled by the multiplier. At most one
//! frame boundary is crossed per call, however large `dt` is; hosts call
//! `update` at a roughly fixed cadence. Passing the last frame wraps to 0 and
//! keeps playing only when looping.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use log::{debug, warn};

use crate::error::{SerializeError, SerializeResult};
use crate::resources::animation::{Animation, Frame};
use crate::resources::animationstore::AnimationSet;
use crate::serialization::xml::{self, XmlElement, XmlNode};
use crate::serialization::{
    BinaryReader, BinarySerializable, BinaryWriter, XmlSerializable, impl_xml_display,
};

/// Playback state of an [`Animator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped = 0,
    Playing = 1,
    Paused = 2,
}

impl PlaybackState {
    pub const ALL: [PlaybackState; 3] = [
        PlaybackState::Stopped,
        PlaybackState::Playing,
        PlaybackState::Paused,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaybackState {
    type Err = SerializeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SerializeError::invalid(format!("unknown playback state '{s}'")))
    }
}

impl BinarySerializable for PlaybackState {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write_u32(*self as u32)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        let tag = r.read_u32()?;
        Self::ALL
            .get(tag as usize)
            .copied()
            .ok_or_else(|| SerializeError::invalid(format!("unknown playback state {tag}")))
    }
}

/// Playback state machine over an [`AnimationSet`].
#[derive(Debug, Clone)]
pub struct Animator {
    set: AnimationSet,
    selected: String,
    frame_index: usize,
    playback: PlaybackState,
    looping: bool,
    multiplier: f32,
    elapsed: Duration,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(AnimationSet::new())
    }
}

impl Animator {
    /// Stopped, looping animator at normal speed. Nothing is selected until
    /// the first access picks the first animation.
    pub fn new(set: AnimationSet) -> Self {
        Self {
            set,
            selected: String::new(),
            frame_index: 0,
            playback: PlaybackState::Stopped,
            looping: true,
            multiplier: 1.0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn animations(&self) -> &AnimationSet {
        &self.set
    }

    /// Mutable access to the set. A selection that disappears is replaced by
    /// the first animation on next access.
    pub fn animations_mut(&mut self) -> &mut AnimationSet {
        &mut self.set
    }

    /// Replace the whole set and return to the stopped state.
    pub fn set_animations(&mut self, set: AnimationSet) {
        self.set = set;
        self.selected.clear();
        self.stop();
    }

    /// Id of the selected animation; may be empty or stale.
    pub fn selected(&self) -> &str {
        &self.selected
    }

    /// Select an animation by id, resetting the frame index and timer.
    ///
    /// An id that is not in the set is ignored: the previous selection is
    /// kept and `false` is returned.
    pub fn set_selected(&mut self, id: &str) -> bool {
        match self.set.get(id) {
            Some(animation) => {
                self.selected = animation.id().to_string();
                self.frame_index = 0;
                self.elapsed = Duration::ZERO;
                true
            }
            None => {
                warn!("Animation '{id}' not found, keeping '{}'", self.selected);
                false
            }
        }
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Jump to a frame, clamped into the current animation's range.
    pub fn set_frame_index(&mut self, index: usize) {
        let count = self.current_animation().map_or(0, Animation::count);
        self.frame_index = index.min(count.saturating_sub(1));
        self.elapsed = Duration::ZERO;
    }

    pub fn is_playing(&self) -> bool {
        self.playback == PlaybackState::Playing
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Scale applied to frame lengths; negative values clamp to 0, and 0
    /// behaves as paused.
    pub fn set_multiplier(&mut self, multiplier: f32) {
        self.multiplier = if multiplier.is_finite() {
            multiplier.max(0.0)
        } else {
            0.0
        };
    }

    pub fn state(&self) -> PlaybackState {
        self.playback
    }

    /// Start playing, optionally selecting `id` first.
    ///
    /// A known id selects it from frame 0 even when already playing.
    pub fn play(&mut self, id: Option<&str>) {
        if let Some(id) = id {
            self.set_selected(id);
        }
        self.playback = PlaybackState::Playing;
    }

    /// Hold the current frame and timer; `play` resumes from them.
    pub fn pause(&mut self) {
        self.playback = PlaybackState::Paused;
    }

    pub fn stop(&mut self) {
        self.frame_index = 0;
        self.elapsed = Duration::ZERO;
        self.playback = PlaybackState::Stopped;
    }

    /// The selected animation. When the selection is missing from the set
    /// the first animation is selected and the frame index reset.
    pub fn current_animation(&mut self) -> Option<&Animation> {
        if self.set.is_empty() {
            return None;
        }
        if !self.set.contains(&self.selected) {
            let first = self.set.first()?.id().to_string();
            debug!("Selecting first animation '{first}'");
            self.selected = first;
            self.frame_index = 0;
            self.elapsed = Duration::ZERO;
        }
        self.set.get(&self.selected)
    }

    /// Frame at the (clamped) frame index.
    pub fn current_frame(&mut self) -> Option<&Frame> {
        let frame_index = self.frame_index;
        let animation = self.current_animation()?;
        let last = animation.count().checked_sub(1)?;
        animation.frames().get(frame_index.min(last))
    }

    /// Advance the timer by `dt`, crossing at most one frame boundary.
    pub fn update(&mut self, dt: Duration) {
        if self.set.is_empty() || !self.is_playing() || self.multiplier <= 0.0 {
            return;
        }
        let multiplier = self.multiplier;
        let frame_index = self.frame_index;
        let Some(animation) = self.current_animation() else {
            return;
        };
        let count = animation.count();
        if count <= 1 {
            self.frame_index = 0;
            return;
        }
        let index = frame_index.min(count - 1);
        let threshold = scaled(animation.frames()[index].length(), multiplier);

        self.elapsed += dt;
        self.frame_index = index;
        if self.elapsed >= threshold {
            self.elapsed = Duration::ZERO;
            self.frame_index += 1;
            if self.frame_index >= count {
                self.frame_index = 0;
                if !self.looping {
                    self.playback = PlaybackState::Stopped;
                }
            }
        }
    }
}

/// `length * multiplier`, rounded to whole microseconds. Products past the
/// `u64` microsecond range clamp to [`Duration::MAX`], a frame that never ends.
fn scaled(length: Duration, multiplier: f32) -> Duration {
    if multiplier == 1.0 {
        return length;
    }
    let micros = (length.as_micros() as f64 * f64::from(multiplier)).round();
    if micros >= u64::MAX as f64 {
        return Duration::MAX;
    }
    Duration::from_micros(micros as u64)
}

impl PartialEq for Animator {
    /// The running timer is transient and not compared.
    fn eq(&self, other: &Self) -> bool {
        self.set == other.set
            && self.selected.to_lowercase() == other.selected.to_lowercase()
            && self.frame_index == other.frame_index
            && self.playback == other.playback
            && self.looping == other.looping
            && self.multiplier == other.multiplier
    }
}

fn validate_multiplier(value: f32) -> SerializeResult<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(SerializeError::invalid(format!("invalid multiplier {value}")))
    }
}

impl BinarySerializable for Animator {
    fn write_binary(&self, w: &mut BinaryWriter<'_>) -> SerializeResult<()> {
        w.write(&self.set)?;
        w.write_str(&self.selected)?;
        w.write_u64(self.frame_index as u64)?;
        w.write(&self.playback)?;
        w.write_bool(self.looping)?;
        w.write_f32(self.multiplier)
    }

    fn read_binary(r: &mut BinaryReader<'_>) -> SerializeResult<Self> {
        Ok(Self {
            set: r.read()?,
            selected: r.read_string()?,
            frame_index: r.read_len()?,
            playback: r.read()?,
            looping: r.read_bool()?,
            multiplier: validate_multiplier(r.read_f32()?)?,
            elapsed: Duration::ZERO,
        })
    }
}

impl XmlSerializable for Animator {
    const ELEMENT: &'static str = "Animator";

    fn to_element(&self) -> XmlElement {
        XmlElement::new(Self::ELEMENT)
            .attr("Selected", &self.selected)
            .attr("FrameIndex", self.frame_index)
            .attr("State", self.playback)
            .attr("Loop", self.looping)
            .attr("Multiplier", self.multiplier)
            .child(self.set.to_element())
    }

    fn from_element(node: XmlNode<'_, '_>) -> SerializeResult<Self> {
        xml::expect_element(node, Self::ELEMENT)?;
        Ok(Self {
            selected: xml::attr_str(node, "Selected")?.to_string(),
            frame_index: xml::attr(node, "FrameIndex")?,
            playback: xml::attr(node, "State")?,
            looping: xml::attr(node, "Loop")?,
            multiplier: validate_multiplier(xml::float_attr(node, "Multiplier")?)?,
            set: AnimationSet::from_element(xml::child(node, AnimationSet::ELEMENT)?)?,
            elapsed: Duration::ZERO,
        })
    }
}

impl_xml_display!(Animator);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Rect;

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    fn anim(id: &str, lengths: &[f32]) -> Animation {
        Animation::with_frames(
            id,
            lengths
                .iter()
                .enumerate()
                .map(|(i, l)| Frame::new(Rect::new(i as f32 * 8.0, 0.0, 8.0, 8.0), secs(*l))),
        )
        .unwrap()
    }

    fn animator(anims: Vec<Animation>) -> Animator {
        Animator::new(anims.into_iter().collect())
    }

    #[test]
    fn test_default_is_stopped_and_looping() {
        let a = Animator::default();
        assert_eq!(a.state(), PlaybackState::Stopped);
        assert!(a.is_looping());
        assert_eq!(a.multiplier(), 1.0);
    }

    #[test]
    fn test_empty_set_has_no_current() {
        let mut a = Animator::default();
        assert!(a.current_animation().is_none());
        assert!(a.current_frame().is_none());
        a.play(None);
        a.update(secs(1.0));
        assert_eq!(a.frame_index(), 0);
    }

    #[test]
    fn test_advances_and_loops() {
        let mut a = animator(vec![anim("walk", &[0.5, 0.5])]);
        a.play(None);
        a.update(secs(0.5));
        assert_eq!(a.frame_index(), 1);
        a.update(secs(0.5));
        assert_eq!(a.frame_index(), 0);
        assert!(a.is_playing());
    }

    #[test]
    fn test_stops_after_last_frame_without_loop() {
        let mut a = animator(vec![anim("walk", &[0.5, 0.5])]);
        a.set_looping(false);
        a.play(None);
        a.update(secs(0.5));
        a.update(secs(0.5));
        assert_eq!(a.frame_index(), 0);
        assert!(!a.is_playing());
    }

    #[test]
    fn test_one_advance_per_update_even_for_large_dt() {
        let mut a = animator(vec![anim("walk", &[0.1, 0.1, 0.1, 0.1])]);
        a.play(None);
        a.update(secs(10.0));
        assert_eq!(a.frame_index(), 1);
    }

    #[test]
    fn test_timer_accumulates_across_updates() {
        let mut a = animator(vec![anim("walk", &[0.5, 0.5])]);
        a.play(None);
        a.update(secs(0.25));
        assert_eq!(a.frame_index(), 0);
        a.update(secs(0.25));
        assert_eq!(a.frame_index(), 1);
    }

    #[test]
    fn test_multiplier_scales_frame_length() {
        let mut a = animator(vec![anim("walk", &[0.5, 0.5])]);
        a.set_multiplier(2.0);
        a.play(None);
        a.update(secs(0.5));
        assert_eq!(a.frame_index(), 0);
        a.update(secs(0.5));
        assert_eq!(a.frame_index(), 1);
    }

    #[test]
    fn test_zero_multiplier_behaves_as_paused() {
        let mut a = animator(vec![anim("walk", &[0.1, 0.1])]);
        a.set_multiplier(-3.0);
        assert_eq!(a.multiplier(), 0.0);
        a.play(None);
        a.update(secs(1.0));
        assert_eq!(a.frame_index(), 0);
    }

    #[test]
    fn test_single_frame_never_advances() {
        let mut a = animator(vec![anim("idle", &[0.1])]);
        a.play(None);
        for _ in 0..5 {
            a.update(secs(1.0));
        }
        assert_eq!(a.frame_index(), 0);
        assert!(a.is_playing());
    }

    #[test]
    fn test_pause_retains_index_and_stop_resets() {
        let mut a = animator(vec![anim("walk", &[0.1, 0.1, 0.1])]);
        a.play(None);
        a.update(secs(0.1));
        a.pause();
        assert_eq!(a.state(), PlaybackState::Paused);
        a.update(secs(0.1));
        assert_eq!(a.frame_index(), 1);
        a.stop();
        assert_eq!(a.state(), PlaybackState::Stopped);
        assert_eq!(a.frame_index(), 0);
    }

    #[test]
    fn test_pause_on_first_frame_is_paused_not_stopped() {
        let mut a = animator(vec![anim("walk", &[0.5, 0.5])]);
        a.play(None);
        a.update(secs(0.4));
        a.pause();
        assert_eq!(a.frame_index(), 0);
        assert_eq!(a.state(), PlaybackState::Paused);

        // Resuming keeps the timer.
        a.play(None);
        a.update(secs(0.1));
        assert_eq!(a.frame_index(), 1);
    }

    #[test]
    fn test_pause_from_stopped_and_round_trip() {
        let mut a = animator(vec![anim("walk", &[0.5, 0.5])]);
        a.pause();
        assert_eq!(a.state(), PlaybackState::Paused);
        let from_bytes = Animator::from_bytes(&a.to_bytes().unwrap()).unwrap();
        let from_xml = Animator::from_xml_str(&a.to_xml()).unwrap();
        assert_eq!(from_bytes.state(), PlaybackState::Paused);
        assert_eq!(from_xml, a);
    }

    #[test]
    fn test_scaled_clamps_huge_lengths() {
        assert_eq!(scaled(Duration::MAX, 4.0), Duration::MAX);
        assert_eq!(scaled(Duration::from_secs(u64::MAX / 2), 3.0), Duration::MAX);
        assert_eq!(scaled(secs(0.5), 2.0), Duration::from_secs(1));
        assert_eq!(scaled(secs(0.5), 0.5), Duration::from_millis(250));
    }

    #[test]
    fn test_play_with_id_resets_index() {
        let mut a = animator(vec![anim("walk", &[0.1, 0.1]), anim("run", &[0.1, 0.1])]);
        a.play(Some("walk"));
        a.update(secs(0.1));
        assert_eq!(a.frame_index(), 1);
        a.play(Some("RUN"));
        assert_eq!(a.selected(), "run");
        assert_eq!(a.frame_index(), 0);
    }

    #[test]
    fn test_unknown_selection_is_ignored() {
        let mut a = animator(vec![anim("walk", &[0.1]), anim("run", &[0.1])]);
        assert!(a.set_selected("walk"));
        assert!(!a.set_selected("fly"));
        assert_eq!(a.selected(), "walk");
    }

    #[test]
    fn test_missing_selection_falls_back_to_first() {
        let mut a = animator(vec![anim("walk", &[0.1, 0.1]), anim("run", &[0.1, 0.1])]);
        a.play(Some("walk"));
        a.update(secs(0.1));
        a.animations_mut().remove("walk");
        assert_eq!(a.current_animation().unwrap().id(), "run");
        assert_eq!(a.frame_index(), 0);
    }

    #[test]
    fn test_current_frame_clamps_index() {
        let mut a = animator(vec![anim("walk", &[0.1, 0.1, 0.1])]);
        a.play(None);
        a.update(secs(0.1));
        a.update(secs(0.1));
        assert_eq!(a.frame_index(), 2);
        a.animations_mut()
            .get_mut("walk")
            .unwrap()
            .remove(2)
            .unwrap();
        assert_eq!(a.current_frame().unwrap().rect.left, 8.0);
    }

    #[test]
    fn test_set_frame_index_clamps() {
        let mut a = animator(vec![anim("walk", &[0.1, 0.1])]);
        a.set_frame_index(9);
        assert_eq!(a.frame_index(), 1);
    }

    #[test]
    fn test_round_trips_ignore_timer() {
        let mut a = animator(vec![anim("walk", &[0.25, 0.5]), anim("run", &[0.1])]);
        a.set_looping(false);
        a.set_multiplier(1.5);
        a.play(Some("walk"));
        a.update(secs(0.1));
        let from_bytes = Animator::from_bytes(&a.to_bytes().unwrap()).unwrap();
        assert_eq!(from_bytes, a);
        let from_xml = Animator::from_xml_str(&a.to_xml()).unwrap();
        assert_eq!(from_xml, a);
    }
}

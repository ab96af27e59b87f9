//! Scroll-synchronised playback of one background video.
//!
//! ```text
//! Idle ──start()──► Opening ──time ≥ opening end──► Looping(intro)
//! Looping(r)   ◄── loop section enters view
//! Scrubbing(r) ◄── scrub section enters view | scroll inside a scrub section
//! any ──stop()──► Idle
//! ```
//!
//! The controller owns the video clock. Every switch of mode cancels the
//! pending callbacks of the previous mode before scheduling new ones, so at
//! most one loop tick and one smoothing tick are ever outstanding.
//!
//! Surface errors are swallowed: a failed seek leaves the last frame on
//! screen, which is the intended degradation.

use super::frames::{
    FrameMode, FrameRange, FrameTable, estimate_fps, frame_to_time, scrub_progress,
    scrub_target_frame,
};
use super::markup::SectionSpec;
use super::surface::{FrameHandle, FrameScheduler, PageLayout, VideoSurface};
use crate::config::VideoConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Opening,
    Looping(FrameRange),
    Scrubbing(FrameRange),
}

/// Ping-pong position inside a loop range.
#[derive(Debug, Clone)]
struct PingPong {
    start: u32,
    end: u32,
    frame: u32,
    direction: i64,
    /// Seconds not yet converted into whole frames.
    elapsed: f64,
    last_ms: Option<f64>,
}

impl PingPong {
    fn new(range: &FrameRange) -> Self {
        Self {
            start: range.start_frame,
            end: range.end_frame,
            frame: range.start_frame,
            direction: 1,
            elapsed: 0.0,
            last_ms: None,
        }
    }

    /// Advance by `frames`, reflecting off either end as often as needed.
    ///
    /// The position is tracked as a phase on the `2 * (end - start)` cycle:
    /// the first half runs up, the second half runs back down.
    fn advance(&mut self, frames: i64) {
        let span = i64::from(self.end) - i64::from(self.start);
        if span <= 0 {
            self.frame = self.start;
            return;
        }

        let offset = i64::from(self.frame.clamp(self.start, self.end) - self.start);
        let phase = if self.direction > 0 { offset } else { 2 * span - offset };
        let phase = (phase + frames).rem_euclid(2 * span);

        let (offset, direction) = if phase < span {
            (phase, 1)
        } else {
            (2 * span - phase, -1)
        };
        self.frame = self.start + offset as u32;
        self.direction = direction;
    }
}

pub struct FrameController<V: VideoSurface, S: FrameScheduler> {
    video: V,
    scheduler: S,
    table: FrameTable,
    sections: Vec<SectionSpec>,
    tuning: VideoConfig,

    fps: f64,
    state: PlaybackState,
    opening_end: f64,
    ping_pong: Option<PingPong>,
    target_time: Option<f64>,
    last_scroll_y: f64,

    loop_tick: Option<FrameHandle>,
    smooth_tick: Option<FrameHandle>,
    scroll_tick: Option<FrameHandle>,
}

impl<V: VideoSurface, S: FrameScheduler> FrameController<V, S> {
    pub fn new(
        video: V,
        scheduler: S,
        table: FrameTable,
        sections: Vec<SectionSpec>,
        tuning: VideoConfig,
    ) -> Self {
        Self {
            video,
            scheduler,
            table,
            sections,
            fps: tuning.fallback_fps,
            tuning,
            state: PlaybackState::Idle,
            opening_end: 0.0,
            ping_pong: None,
            target_time: None,
            last_scroll_y: 0.0,
            loop_tick: None,
            smooth_tick: None,
            scroll_tick: None,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn video(&self) -> &V {
        &self.video
    }

    /// Frame of the running ping-pong loop.
    pub fn loop_frame(&self) -> Option<u32> {
        self.ping_pong.as_ref().map(|p| p.frame)
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Called once metadata is loaded: play the opening from its first frame.
    pub fn start(&mut self) {
        self.cancel_all();
        self.fps = estimate_fps(
            self.table.total_frames(),
            self.video.duration(),
            self.tuning.fallback_fps,
        );

        let Some(opening) = self.table.opening().cloned() else {
            self.state = PlaybackState::Idle;
            return;
        };
        self.opening_end = opening.end_time(self.fps);
        self.video.seek(opening.start_time(self.fps)).ok();
        self.video.play().ok();
        self.state = PlaybackState::Opening;
    }

    /// Single teardown path.
    pub fn stop(&mut self) {
        self.cancel_all();
        self.video.pause().ok();
        self.state = PlaybackState::Idle;
    }

    fn cancel_all(&mut self) {
        self.cancel_modes();
        if let Some(handle) = self.scroll_tick.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Cancel the loop and smoothing callbacks.
    fn cancel_modes(&mut self) {
        self.cancel_loop();
        self.cancel_smoothing();
    }

    fn cancel_loop(&mut self) {
        self.ping_pong = None;
        if let Some(handle) = self.loop_tick.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    fn cancel_smoothing(&mut self) {
        self.target_time = None;
        if let Some(handle) = self.smooth_tick.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// `timeupdate` from the video element.
    pub fn on_time_update(&mut self) {
        if self.state != PlaybackState::Opening || self.video.current_time() < self.opening_end {
            return;
        }
        self.video.pause().ok();
        match self.table.intro().cloned() {
            Some(intro) => self.start_loop(intro),
            None => self.state = PlaybackState::Idle,
        }
    }

    /// Section `index` crossed the visibility threshold.
    pub fn on_intersect(&mut self, index: usize, layout: &impl PageLayout) {
        if matches!(self.state, PlaybackState::Idle | PlaybackState::Opening) {
            return;
        }
        let Some(range) = self.sections.get(index).and_then(|s| s.range.clone()) else {
            return;
        };

        match range.mode {
            FrameMode::Loop => self.start_loop(range),
            FrameMode::Scrub => {
                self.cancel_modes();
                let frame = match layout.section_rect(index) {
                    Some(rect) => {
                        let progress =
                            scrub_progress(layout.viewport_center(), rect.top, rect.height);
                        scrub_target_frame(&range, progress)
                    }
                    None => range.start_frame,
                };
                self.video.pause().ok();
                self.video.seek(frame_to_time(frame, self.fps)).ok();
                self.state = PlaybackState::Scrubbing(range);
            }
        }
    }

    /// Page scrolled; the work happens on the next animation frame.
    pub fn on_scroll(&mut self) {
        if matches!(self.state, PlaybackState::Idle | PlaybackState::Opening) {
            return;
        }
        if self.scroll_tick.is_none() {
            self.scroll_tick = Some(self.scheduler.request_frame());
        }
    }

    /// Animation frame `handle` fired at `now_ms`.
    pub fn on_frame(&mut self, handle: FrameHandle, now_ms: f64, layout: &impl PageLayout) {
        if self.loop_tick == Some(handle) {
            self.loop_tick = None;
            self.loop_step(now_ms);
        } else if self.smooth_tick == Some(handle) {
            self.smooth_tick = None;
            self.smooth_step();
        } else if self.scroll_tick == Some(handle) {
            self.scroll_tick = None;
            self.scroll_step(layout);
        }
    }

    // ------------------------------------------------------------------------
    // Modes
    // ------------------------------------------------------------------------

    fn start_loop(&mut self, range: FrameRange) {
        self.cancel_modes();
        self.video.pause().ok();
        self.video.seek(range.start_time(self.fps)).ok();
        self.ping_pong = Some(PingPong::new(&range));
        self.state = PlaybackState::Looping(range);
        self.loop_tick = Some(self.scheduler.request_frame());
    }

    fn loop_step(&mut self, now_ms: f64) {
        let frame_duration = 1.0 / self.fps.max(1.0);
        let Some(pp) = self.ping_pong.as_mut() else {
            return;
        };

        let delta = pp.last_ms.map_or(0.0, |last| (now_ms - last).max(0.0) / 1000.0);
        pp.last_ms = Some(now_ms);
        pp.elapsed += delta;

        if pp.elapsed >= frame_duration {
            let frames = (pp.elapsed / frame_duration).floor();
            pp.elapsed -= frames * frame_duration;
            pp.advance(frames as i64);
            let time = frame_to_time(pp.frame, self.fps);
            self.video.seek(time).ok();
        }

        self.loop_tick = Some(self.scheduler.request_frame());
    }

    fn scroll_step(&mut self, layout: &impl PageLayout) {
        let scroll_y = layout.scroll_y();
        let scrolling_up = scroll_y < self.last_scroll_y;
        self.last_scroll_y = scroll_y;

        let center = layout.viewport_center();
        let hit = self.sections.iter().enumerate().find_map(|(index, section)| {
            let range = section.range.as_ref().filter(|r| r.mode == FrameMode::Scrub)?;
            let rect = layout.section_rect(index).filter(|rect| rect.straddles(center))?;
            Some((range.clone(), rect))
        });
        let Some((range, rect)) = hit else {
            return;
        };

        self.cancel_loop();
        let frame = scrub_target_frame(&range, scrub_progress(center, rect.top, rect.height));
        let time = frame_to_time(frame, self.fps);
        self.state = PlaybackState::Scrubbing(range);
        self.video.pause().ok();

        if scrolling_up {
            self.cancel_smoothing();
            self.video.seek(time).ok();
        } else {
            self.target_time = Some(time);
            if self.smooth_tick.is_none() {
                self.smooth_tick = Some(self.scheduler.request_frame());
            }
        }
    }

    fn smooth_step(&mut self) {
        let Some(target) = self.target_time else {
            return;
        };

        let current = self.video.current_time();
        let gap = target - current;
        if gap.abs() > self.tuning.snap_seconds {
            self.video.seek(target).ok();
            self.target_time = None;
            return;
        }

        let next = current + gap * self.tuning.smoothing;
        if self.video.seek(next).is_err() {
            self.target_time = None;
            return;
        }
        if (target - next).abs() < self.tuning.settle_seconds {
            self.video.seek(target).ok();
            self.target_time = None;
            return;
        }

        self.smooth_tick = Some(self.scheduler.request_frame());
    }
}

#[cfg(test)]
mod tests {
    use super::super::surface::SectionRect;
    use super::super::surface::fake::{FakeLayout, FakeScheduler, FakeVideo};
    use super::*;

    type Controller = FrameController<FakeVideo, FakeScheduler>;

    /// 8 fps so frame durations (125 ms) are exact in binary floating point.
    const FPS: f64 = 8.0;

    fn table() -> FrameTable {
        FrameTable::new(
            60,
            vec![
                FrameRange::new("opening", 1, 4, FrameMode::Scrub),
                FrameRange::new("intro", 5, 9, FrameMode::Loop),
                FrameRange::new("test-loop", 10, 20, FrameMode::Loop),
                FrameRange::new("test-scrub", 21, 41, FrameMode::Scrub),
                FrameRange::new("outro", 42, 60, FrameMode::Loop),
            ],
        )
    }

    fn sections() -> Vec<SectionSpec> {
        vec![
            SectionSpec::parse("test-loop", Some("loop"), Some("[10,20]")),
            SectionSpec::parse("test-scrub", Some("scrub"), Some("[21,41]")),
            SectionSpec::parse("broken", Some("scrub"), Some("nope")),
        ]
    }

    fn layout(scroll_y: f64, scrub_top: f64) -> FakeLayout {
        FakeLayout {
            viewport_height: 800.0,
            scroll_y,
            rects: vec![
                Some(SectionRect {
                    top: scrub_top - 1000.0,
                    height: 1000.0,
                }),
                Some(SectionRect {
                    top: scrub_top,
                    height: 1000.0,
                }),
                None,
            ],
        }
    }

    fn controller() -> Controller {
        let video = FakeVideo::with_duration(60.0 / FPS);
        FrameController::new(
            video,
            FakeScheduler::default(),
            table(),
            sections(),
            VideoConfig::default(),
        )
    }

    /// Started controller that finished the opening.
    fn looping() -> Controller {
        let mut ctl = controller();
        ctl.start();
        ctl.video.time = frame_to_time(4, FPS);
        ctl.on_time_update();
        ctl
    }

    fn fire_loop(ctl: &mut Controller, now_ms: f64) {
        let handle = ctl.loop_tick.expect("loop tick pending");
        ctl.on_frame(handle, now_ms, &FakeLayout::default());
    }

    #[test]
    fn test_start_plays_opening() {
        let mut ctl = controller();
        ctl.start();

        assert_eq!(ctl.state(), &PlaybackState::Opening);
        assert_eq!(ctl.fps(), FPS);
        assert!(ctl.video().playing);
        assert_eq!(ctl.video().seeks, vec![0.0]);
    }

    #[test]
    fn test_fallback_fps_without_duration() {
        let mut ctl = FrameController::new(
            FakeVideo::default(),
            FakeScheduler::default(),
            table(),
            sections(),
            VideoConfig::default(),
        );
        ctl.start();
        assert_eq!(ctl.fps(), 30.0);
    }

    #[test]
    fn test_opening_hands_over_to_intro_loop() {
        let mut ctl = controller();
        ctl.start();

        ctl.video.time = frame_to_time(3, FPS);
        ctl.on_time_update();
        assert_eq!(ctl.state(), &PlaybackState::Opening);

        ctl.video.time = frame_to_time(4, FPS);
        ctl.on_time_update();
        assert!(matches!(ctl.state(), PlaybackState::Looping(r) if r.name == "intro"));
        assert!(!ctl.video().playing);
        assert_eq!(ctl.loop_frame(), Some(5));
        assert!(ctl.loop_tick.is_some());
    }

    #[test]
    fn test_events_ignored_during_opening() {
        let mut ctl = controller();
        ctl.start();

        ctl.on_intersect(0, &layout(0.0, 0.0));
        ctl.on_scroll();
        assert_eq!(ctl.state(), &PlaybackState::Opening);
        assert!(ctl.scheduler.pending.is_empty());
    }

    #[test]
    fn test_ping_pong_reflects_at_bounds() {
        let mut ctl = looping();
        ctl.on_intersect(0, &layout(0.0, 400.0));
        assert_eq!(ctl.loop_frame(), Some(10));

        // first tick only sets the baseline
        fire_loop(&mut ctl, 1000.0);
        assert_eq!(ctl.loop_frame(), Some(10));

        // 12 frames forward from 10 overshoots 20 by 2
        fire_loop(&mut ctl, 1000.0 + 12.0 * 125.0);
        assert_eq!(ctl.loop_frame(), Some(18));

        // now heading down: 10 frames back reaches 8, reflected to 12
        fire_loop(&mut ctl, 1000.0 + 22.0 * 125.0);
        assert_eq!(ctl.loop_frame(), Some(12));

        // heading up again
        fire_loop(&mut ctl, 1000.0 + 23.0 * 125.0);
        assert_eq!(ctl.loop_frame(), Some(13));
        assert_eq!(ctl.video().time, frame_to_time(13, FPS));
    }

    #[test]
    fn test_ping_pong_accumulates_partial_frames() {
        let mut ctl = looping();
        ctl.on_intersect(0, &layout(0.0, 400.0));
        fire_loop(&mut ctl, 0.0);

        fire_loop(&mut ctl, 100.0);
        assert_eq!(ctl.loop_frame(), Some(10));
        fire_loop(&mut ctl, 200.0);
        assert_eq!(ctl.loop_frame(), Some(11));
    }

    #[test]
    fn test_ping_pong_stays_in_range_after_long_stall() {
        let mut ctl = looping();
        ctl.on_intersect(0, &layout(0.0, 400.0));
        fire_loop(&mut ctl, 0.0);
        fire_loop(&mut ctl, 60_000.0);

        let frame = ctl.loop_frame().unwrap();
        assert!((10..=20).contains(&frame));
    }

    #[test]
    fn test_ping_pong_keeps_phase_over_several_bounces() {
        let mut ctl = looping();
        ctl.on_intersect(0, &layout(0.0, 400.0));
        fire_loop(&mut ctl, 0.0);

        // 45 frames up from 10 over a 10..=20 loop: two full cycles plus 5
        fire_loop(&mut ctl, 45.0 * 125.0);
        assert_eq!(ctl.loop_frame(), Some(15));

        // still heading up
        fire_loop(&mut ctl, 46.0 * 125.0);
        assert_eq!(ctl.loop_frame(), Some(16));

        // 14 more: up to 20, then back down to 10
        fire_loop(&mut ctl, 60.0 * 125.0);
        assert_eq!(ctl.loop_frame(), Some(10));
        fire_loop(&mut ctl, 61.0 * 125.0);
        assert_eq!(ctl.loop_frame(), Some(11));
    }

    #[test]
    fn test_ping_pong_single_frame_range() {
        let range = FrameRange::new("still", 7, 7, FrameMode::Loop);
        let mut pp = PingPong::new(&range);
        pp.advance(5);
        assert_eq!(pp.frame, 7);
    }

    #[test]
    fn test_intersect_scrub_snaps_to_position() {
        let mut ctl = looping();
        // viewport centre 400, section top 400 - 500 = -100 → progress 0.5
        ctl.on_intersect(1, &layout(0.0, -100.0));

        assert!(matches!(ctl.state(), PlaybackState::Scrubbing(r) if r.name == "test-scrub"));
        assert_eq!(ctl.video().time, frame_to_time(31, FPS));
        assert!(ctl.loop_tick.is_none());
        assert!(ctl.loop_frame().is_none());
    }

    #[test]
    fn test_intersect_scrub_without_rect_snaps_to_start() {
        let mut ctl = looping();
        let mut no_rects = layout(0.0, 0.0);
        no_rects.rects.clear();
        ctl.on_intersect(1, &no_rects);
        assert_eq!(ctl.video().time, frame_to_time(21, FPS));
    }

    #[test]
    fn test_intersect_skips_malformed_and_unknown_sections() {
        let mut ctl = looping();
        let before = ctl.state().clone();
        ctl.on_intersect(2, &layout(0.0, 0.0));
        ctl.on_intersect(99, &layout(0.0, 0.0));
        assert_eq!(ctl.state(), &before);
    }

    #[test]
    fn test_scroll_is_throttled() {
        let mut ctl = looping();
        let pending = ctl.scheduler.pending.len();
        ctl.on_scroll();
        ctl.on_scroll();
        ctl.on_scroll();
        assert_eq!(ctl.scheduler.pending.len(), pending + 1);
    }

    #[test]
    fn test_scroll_down_smooths_towards_target() {
        let mut ctl = looping();
        ctl.video.time = frame_to_time(21, FPS);

        // centre 400 at 10% of a 1000px section
        let page = layout(100.0, 300.0);
        ctl.on_scroll();
        let handle = ctl.scroll_tick.unwrap();
        ctl.on_frame(handle, 0.0, &page);

        assert!(matches!(ctl.state(), PlaybackState::Scrubbing(_)));
        assert!(ctl.loop_tick.is_none());
        let target = frame_to_time(23, FPS);
        assert_eq!(ctl.target_time, Some(target));

        let mut steps = 0;
        while let Some(handle) = ctl.smooth_tick {
            ctl.on_frame(handle, 0.0, &page);
            steps += 1;
            assert!(steps < 50);
        }
        assert!(steps > 1);
        assert_eq!(ctl.video().time, target);
        assert_eq!(ctl.target_time, None);
    }

    #[test]
    fn test_smoothing_snaps_large_gaps() {
        let mut ctl = looping();
        ctl.video.time = 0.0;

        let page = layout(100.0, -500.0);
        ctl.on_scroll();
        ctl.on_frame(ctl.scroll_tick.unwrap(), 0.0, &page);
        ctl.on_frame(ctl.smooth_tick.unwrap(), 0.0, &page);

        // centre 400 at 90% → frame 39, more than 0.5s away from 0
        assert_eq!(ctl.video().time, frame_to_time(39, FPS));
        assert!(ctl.smooth_tick.is_none());
    }

    #[test]
    fn test_scroll_up_snaps_and_cancels_smoothing() {
        let mut ctl = looping();
        ctl.video.time = frame_to_time(21, FPS);

        let down = layout(100.0, 300.0);
        ctl.on_scroll();
        ctl.on_frame(ctl.scroll_tick.unwrap(), 0.0, &down);
        let smoothing = ctl.smooth_tick.unwrap();

        let up = layout(50.0, 200.0);
        ctl.on_scroll();
        ctl.on_frame(ctl.scroll_tick.unwrap(), 16.0, &up);

        assert!(ctl.smooth_tick.is_none());
        assert!(ctl.scheduler.cancelled.contains(&smoothing));
        // 20% through 21..=41
        assert_eq!(ctl.video().time, frame_to_time(25, FPS));

        // the cancelled handle firing late does nothing
        let seeks = ctl.video().seeks.len();
        ctl.on_frame(smoothing, 32.0, &up);
        assert_eq!(ctl.video().seeks.len(), seeks);
    }

    #[test]
    fn test_scroll_outside_scrub_sections_keeps_loop() {
        let mut ctl = looping();
        // scrub section far below the viewport
        let page = layout(0.0, 5000.0);
        ctl.on_scroll();
        ctl.on_frame(ctl.scroll_tick.unwrap(), 0.0, &page);
        assert!(matches!(ctl.state(), PlaybackState::Looping(_)));
        assert!(ctl.loop_tick.is_some());
    }

    #[test]
    fn test_seek_failure_ends_smoothing() {
        let mut ctl = looping();
        ctl.video.time = frame_to_time(21, FPS);
        let page = layout(100.0, 300.0);
        ctl.on_scroll();
        ctl.on_frame(ctl.scroll_tick.unwrap(), 0.0, &page);

        ctl.video.fail_seeks = true;
        ctl.on_frame(ctl.smooth_tick.unwrap(), 0.0, &page);
        assert!(ctl.smooth_tick.is_none());
        assert_eq!(ctl.target_time, None);
    }

    #[test]
    fn test_stop_cancels_everything() {
        let mut ctl = looping();
        ctl.on_scroll();
        assert!(!ctl.scheduler.pending.is_empty());

        ctl.stop();
        assert_eq!(ctl.state(), &PlaybackState::Idle);
        assert!(ctl.scheduler.pending.is_empty());
        assert!(ctl.loop_frame().is_none());

        // idle controller ignores input
        ctl.on_scroll();
        ctl.on_intersect(0, &layout(0.0, 0.0));
        assert!(ctl.scheduler.pending.is_empty());
    }

    #[test]
    fn test_loop_switch_cancels_previous_tick() {
        let mut ctl = looping();
        let intro_tick = ctl.loop_tick.unwrap();
        ctl.on_intersect(0, &layout(0.0, 400.0));

        assert!(ctl.scheduler.cancelled.contains(&intro_tick));
        assert_eq!(ctl.scheduler.pending.len(), 1);
    }
}

/*
 *  compositor.rs
 *
 *  Tixel - time, in pixels
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
//! The glyph compositor: lays the time string out across the panel,
//! clipping per character, and runs the digit-transition animation as an
//! explicit three-state machine advanced once per render call. Only the
//! hour:minute block animates; the small seconds block always renders
//! statically.
//!
//! The render path never fails: missing time renders blanks, unknown
//! characters render as zero width, width overflow clips, and a length
//! change between frames snaps instead of animating.

use arrayvec::ArrayString;
use serde::{Deserialize, Serialize};

use crate::clock_font::{FontBook, Glyph, GlyphRole, GlyphStyle, BLANK_SEPARATOR, GLYPH_HEIGHT};
use crate::config::ClockSettings;
use crate::display::{MatrixFrame, DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// One animation step per glyph row.
pub const STEP_MS: u64 = 40;

/// The animated hour:separator:minute block; seconds are tracked
/// separately and never participate in transitions.
type LargeText = ArrayString<5>;

/// The five digit-transition styles. The enum order is the canonical,
/// serialization-stable one; dispatch is always on the variant, never on
/// an index.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationStyle {
    /// Old glyph scrolls out above a descending blank row; the new one
    /// scrolls in beneath it.
    #[default]
    WipeWithGap,
    /// A blank row descends over glyphs that stay put.
    ScrollReplaceWithGap,
    /// Row-by-row replacement with no blank row.
    PlainScroll,
    /// Old glyph scrolls out above the blank row; the new one is drawn
    /// unshifted beneath it.
    WipeWithGapUnshifted,
    /// Old glyph scrolls out, new one drawn unshifted, no blank row.
    ShiftWithoutGap,
}

impl AnimationStyle {
    /// Styles that reserve a blank transition row take one extra step.
    pub fn steps(self) -> u64 {
        match self {
            AnimationStyle::WipeWithGap
            | AnimationStyle::ScrollReplaceWithGap
            | AnimationStyle::WipeWithGapUnshifted => GLYPH_HEIGHT as u64 + 1,
            AnimationStyle::PlainScroll | AnimationStyle::ShiftWithoutGap => {
                GLYPH_HEIGHT as u64
            }
        }
    }

    pub fn duration_ms(self) -> u64 {
        self.steps() * STEP_MS
    }
}

/// Selects the source row byte for output row `y` of a mid-transition
/// glyph. `prev` and `curr` are the old and new bitmaps; `step` has
/// already been clamped to the style's last valid step.
fn compose_row(
    style: AnimationStyle,
    step: usize,
    y: usize,
    prev: &[u8; GLYPH_HEIGHT],
    curr: &[u8; GLYPH_HEIGHT],
) -> u8 {
    // the old glyph, shifted up by step+1 rows; rows pushed past the top
    // are gone
    let shifted_prev = |y: usize| -> u8 {
        let idx = y + step + 1;
        if idx < GLYPH_HEIGHT {
            prev[idx]
        } else {
            0
        }
    };
    match style {
        AnimationStyle::WipeWithGap => {
            if y == step {
                0
            } else if y < step {
                shifted_prev(y)
            } else {
                curr[y - step - 1]
            }
        }
        AnimationStyle::ScrollReplaceWithGap => {
            if y == step {
                0
            } else if y < step {
                prev[y]
            } else {
                curr[y]
            }
        }
        AnimationStyle::PlainScroll => {
            if y < step {
                prev[y]
            } else {
                curr[y]
            }
        }
        AnimationStyle::WipeWithGapUnshifted => {
            if y == step {
                0
            } else if y < step {
                shifted_prev(y)
            } else {
                curr[y]
            }
        }
        AnimationStyle::ShiftWithoutGap => {
            if y < step {
                shifted_prev(y)
            } else {
                curr[y]
            }
        }
    }
}

/// Everything one render call needs from the outside world.
pub struct RenderRequest<'a> {
    pub hour: &'a str,
    pub minute: &'a str,
    pub second: &'a str,
    pub separator_visible: bool,
    pub time_available: bool,
    pub animate: bool,
    /// Monotonic milliseconds; drives the animation clock.
    pub now_ms: u64,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    Static,
    Armed { style: AnimationStyle, since: u64 },
    Running { style: AnimationStyle, started_at: u64 },
}

pub struct Compositor {
    previous: Option<LargeText>,
    phase: Phase,
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            previous: None,
            phase: Phase::Static,
        }
    }

    pub fn in_progress(&self) -> bool {
        !matches!(self.phase, Phase::Static)
    }

    pub fn previous_text(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    /// Renders one frame. The frame is cleared first; trailing unused
    /// columns therefore stay blank.
    pub fn render(
        &mut self,
        req: &RenderRequest<'_>,
        settings: &ClockSettings,
        fonts: &FontBook,
        frame: &mut MatrixFrame,
    ) {
        frame.clear();

        let (text, seconds, animate) = if req.time_available {
            (
                build_text(req.hour, req.minute, req.separator_visible),
                if settings.show_seconds { req.second } else { "" },
                req.animate && settings.animated,
            )
        } else {
            // the canonical "no time yet" frame: blank placeholders,
            // nothing to animate
            (build_text("  ", "  ", false), "", false)
        };

        self.advance(&text, settings.animation_style, animate, req.now_ms);

        let anim = match self.phase {
            Phase::Static => None,
            Phase::Armed { style, since } => Some((style, clamp_step(style, req.now_ms - since))),
            Phase::Running { style, started_at } => {
                Some((style, clamp_step(style, req.now_ms - started_at)))
            }
        };
        paint(
            frame,
            &text,
            seconds,
            self.previous.as_deref(),
            anim,
            settings,
            fonts,
        );
    }

    /// Produces the frame a given settings/time combination would draw,
    /// without touching animation state.
    pub fn render_preview(
        settings: &ClockSettings,
        fonts: &FontBook,
        hour: &str,
        minute: &str,
        second: &str,
    ) -> MatrixFrame {
        let mut frame = MatrixFrame::new();
        let text = build_text(hour, minute, true);
        let seconds = if settings.show_seconds { second } else { "" };
        paint(&mut frame, &text, seconds, None, None, settings, fonts);
        frame
    }

    /// The one authoritative state transition, evaluated once per render.
    fn advance(&mut self, target: &str, style: AnimationStyle, animate: bool, now: u64) {
        let owned = |s: &str| LargeText::from(s).unwrap_or_default();

        if !animate {
            self.phase = Phase::Static;
            self.previous = Some(owned(target));
            return;
        }
        let Some(prev) = self.previous else {
            // first frame: adopt without animating
            self.previous = Some(owned(target));
            self.phase = Phase::Static;
            return;
        };
        match self.phase {
            Phase::Running { style, started_at } => {
                if now.saturating_sub(started_at) >= style.duration_ms() {
                    self.previous = Some(owned(target));
                    self.phase = Phase::Static;
                } else if target.len() != prev.len() {
                    // length desync mid-run: snap, never garble
                    self.previous = Some(owned(target));
                    self.phase = Phase::Static;
                }
            }
            Phase::Armed { style, since } => {
                if now.saturating_sub(since) >= style.duration_ms() {
                    self.previous = Some(owned(target));
                    self.phase = Phase::Static;
                } else {
                    self.phase = Phase::Running {
                        style,
                        started_at: since,
                    };
                }
            }
            Phase::Static => {
                if target.len() != prev.len() {
                    self.previous = Some(owned(target));
                } else if has_animatable_change(&prev, target) {
                    self.phase = Phase::Armed { style, since: now };
                } else {
                    // non-animatable drift (separator blink) still has to
                    // track, or the next comparison uses a stale image
                    self.previous = Some(owned(target));
                }
            }
        }
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_step(style: AnimationStyle, elapsed_ms: u64) -> usize {
    (elapsed_ms / STEP_MS).min(style.steps() - 1) as usize
}

/// A cell is a candidate when its new character is a digit that differs
/// from the old one (a space-padded hour animates into its digit);
/// separator changes pop.
fn has_animatable_change(prev: &str, curr: &str) -> bool {
    prev.bytes()
        .zip(curr.bytes())
        .any(|(p, c)| p != c && c.is_ascii_digit())
}

fn build_text(hour: &str, minute: &str, separator_visible: bool) -> LargeText {
    let mut text = LargeText::new();
    for ch in hour.chars().take(2) {
        let _ = text.try_push(ch);
    }
    let _ = text.try_push(if separator_visible { ':' } else { BLANK_SEPARATOR });
    for ch in minute.chars().take(2) {
        let _ = text.try_push(ch);
    }
    text
}

fn put(frame: &mut MatrixFrame, row: usize, col: usize, rotate: bool) {
    if rotate {
        frame.set_point(DISPLAY_HEIGHT - 1 - row, DISPLAY_WIDTH - 1 - col, true);
    } else {
        frame.set_point(row, col, true);
    }
}

/// Left-to-right layout walk with ordered clipping: left pad, then glyph
/// body, then right pad, each capped to the columns that remain. A glyph
/// whose clipped body is zero wide still advances the bookkeeping (by
/// zero) and moves on. `previous` and `anim` apply to the large block
/// only; the seconds block draws statically.
fn paint(
    frame: &mut MatrixFrame,
    large: &str,
    seconds: &str,
    previous: Option<&str>,
    anim: Option<(AnimationStyle, usize)>,
    settings: &ClockSettings,
    fonts: &FontBook,
) {
    let large_role = if seconds.is_empty() {
        GlyphRole::Wide
    } else {
        GlyphRole::Narrow
    };

    let mut used = 0usize;
    for (i, ch) in large.chars().enumerate() {
        let style = GlyphStyle {
            family: settings.font,
            role: large_role,
            bold: settings.bold,
            compact: settings.compact,
        };
        let glyph = fonts.lookup(ch, style);

        // the previous bitmap, when this cell is mid-transition
        let prev_rows = match (anim, previous) {
            (Some((anim_style, step)), Some(p)) if p.len() == large.len() => {
                let pch = p.as_bytes()[i] as char;
                if pch != ch && ch.is_ascii_digit() {
                    Some((anim_style, step, fonts.lookup(pch, style).rows))
                } else {
                    None
                }
            }
            _ => None,
        };
        blit(frame, &mut used, &glyph, prev_rows, settings.rotate_180);
    }

    for ch in seconds.chars().take(2) {
        let style = GlyphStyle {
            family: settings.font,
            role: GlyphRole::Small,
            bold: settings.bold,
            compact: settings.compact,
        };
        let glyph = fonts.lookup(ch, style);
        blit(frame, &mut used, &glyph, None, settings.rotate_180);
    }
}

fn blit(
    frame: &mut MatrixFrame,
    used: &mut usize,
    glyph: &Glyph,
    prev: Option<(AnimationStyle, usize, [u8; GLYPH_HEIGHT])>,
    rotate: bool,
) {
    *used += (glyph.left_pad as usize).min(DISPLAY_WIDTH - *used);
    let body = (glyph.width as usize).min(DISPLAY_WIDTH - *used);
    for col in 0..body {
        for y in 0..GLYPH_HEIGHT {
            let row_byte = match &prev {
                Some((style, step, prows)) => compose_row(*style, *step, y, prows, &glyph.rows),
                None => glyph.rows[y],
            };
            if (row_byte >> (GLYPH_HEIGHT - 1 - col)) & 1 != 0 {
                put(frame, y, *used + col, rotate);
            }
        }
    }
    *used += body;
    *used += (glyph.right_pad as usize).min(DISPLAY_WIDTH - *used);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock_font::FontBook;

    fn request<'a>(hour: &'a str, minute: &'a str, now_ms: u64) -> RenderRequest<'a> {
        RenderRequest {
            hour,
            minute,
            second: "00",
            separator_visible: true,
            time_available: true,
            animate: true,
            now_ms,
        }
    }

    fn fixture() -> (Compositor, ClockSettings, FontBook, MatrixFrame) {
        (
            Compositor::new(),
            ClockSettings::default(),
            FontBook::new(),
            MatrixFrame::new(),
        )
    }

    #[test]
    fn layout_is_idempotent() {
        let (_, settings, fonts, _) = fixture();
        let a = Compositor::render_preview(&settings, &fonts, "12", "34", "00");
        let b = Compositor::render_preview(&settings, &fonts, "12", "34", "00");
        assert_eq!(a, b);
        assert!(!a.is_blank());
    }

    #[test]
    fn first_frame_adopts_without_animation() {
        let (mut comp, settings, fonts, mut frame) = fixture();
        comp.render(&request("12", "34", 0), &settings, &fonts, &mut frame);
        assert!(!comp.in_progress());
        assert_eq!(comp.previous_text(), Some("12:34"));
    }

    #[test]
    fn animation_completes_after_exact_duration() {
        let (mut comp, settings, fonts, mut frame) = fixture();
        comp.render(&request("12", "34", 0), &settings, &fonts, &mut frame);
        comp.render(&request("12", "35", 1000), &settings, &fonts, &mut frame);
        assert!(comp.in_progress());

        let duration = settings.animation_style.duration_ms();
        comp.render(
            &request("12", "35", 1000 + duration),
            &settings,
            &fonts,
            &mut frame,
        );
        assert!(!comp.in_progress());
        assert_eq!(comp.previous_text(), Some("12:35"));
    }

    #[test]
    fn length_change_snaps_without_animating() {
        let (mut comp, settings, fonts, mut frame) = fixture();
        comp.render(&request("12", "34", 0), &settings, &fonts, &mut frame);

        // a one-character hour shortens the tracked text
        comp.render(&request("9", "35", 20), &settings, &fonts, &mut frame);
        assert!(!comp.in_progress());
        assert_eq!(comp.previous_text(), Some("9:35"));
    }

    #[test]
    fn seconds_only_change_does_not_animate() {
        let (mut comp, mut settings, fonts, mut frame) = fixture();
        settings.show_seconds = true;

        let mut req = request("12", "34", 0);
        req.second = "07";
        comp.render(&req, &settings, &fonts, &mut frame);

        let mut req = request("12", "34", 1000);
        req.second = "08";
        comp.render(&req, &settings, &fonts, &mut frame);
        assert!(!comp.in_progress());
        // the seconds block still tracks, just without a transition
        let expected = Compositor::render_preview(&settings, &fonts, "12", "34", "08");
        assert_eq!(frame, expected);
    }

    #[test]
    fn space_padded_hour_animates_into_its_digit() {
        let (mut comp, settings, fonts, mut frame) = fixture();
        comp.render(&request(" 9", "59", 0), &settings, &fonts, &mut frame);
        comp.render(&request("10", "00", 1000), &settings, &fonts, &mut frame);
        assert!(comp.in_progress());
    }

    #[test]
    fn separator_blink_is_not_a_candidate() {
        let (mut comp, settings, fonts, mut frame) = fixture();
        comp.render(&request("12", "34", 0), &settings, &fonts, &mut frame);
        let mut req = request("12", "34", 500);
        req.separator_visible = false;
        comp.render(&req, &settings, &fonts, &mut frame);
        assert!(!comp.in_progress());
    }

    #[test]
    fn disabled_animation_resets_state() {
        let (mut comp, settings, fonts, mut frame) = fixture();
        comp.render(&request("12", "34", 0), &settings, &fonts, &mut frame);
        comp.render(&request("12", "35", 20), &settings, &fonts, &mut frame);
        assert!(comp.in_progress());

        let mut req = request("12", "35", 40);
        req.animate = false;
        comp.render(&req, &settings, &fonts, &mut frame);
        assert!(!comp.in_progress());
        assert_eq!(comp.previous_text(), Some("12:35"));
    }

    #[test]
    fn plain_scroll_midpoint_mixes_old_and_new_rows() {
        let (mut comp, mut settings, fonts, mut frame) = fixture();
        settings.animation_style = AnimationStyle::PlainScroll;

        let old = Compositor::render_preview(&settings, &fonts, "12", "34", "00");
        let new = Compositor::render_preview(&settings, &fonts, "12", "35", "00");

        comp.render(&request("12", "34", 1000), &settings, &fonts, &mut frame);
        comp.render(&request("12", "35", 2000), &settings, &fonts, &mut frame);
        comp.render(&request("12", "35", 2160), &settings, &fonts, &mut frame);
        assert!(comp.in_progress());

        // wide layout: the trailing digit's body occupies columns 25..31
        for col in 25..31 {
            for row in 0..4 {
                assert_eq!(frame.point(row, col), old.point(row, col), "row {row} col {col}");
            }
            for row in 4..8 {
                assert_eq!(frame.point(row, col), new.point(row, col), "row {row} col {col}");
            }
        }
        // unchanged digits are not candidates and render the new text
        for col in 0..25 {
            for row in 0..8 {
                assert_eq!(frame.point(row, col), new.point(row, col), "row {row} col {col}");
            }
        }
    }

    #[test]
    fn no_time_renders_the_blank_frame() {
        let (mut comp, settings, fonts, mut frame) = fixture();
        let req = RenderRequest {
            hour: "99",
            minute: "99",
            second: "99",
            separator_visible: true,
            time_available: false,
            animate: true,
            now_ms: 0,
        };
        comp.render(&req, &settings, &fonts, &mut frame);
        assert!(frame.is_blank());
        assert!(!comp.in_progress());
    }

    #[test]
    fn unknown_character_is_skipped_but_bookkeeping_advances() {
        let (_, settings, fonts, _) = fixture();
        let frame = Compositor::render_preview(&settings, &fonts, "X5", "00", "");
        // 'X' contributes zero columns, so '5' starts at column 0
        assert!(frame.point(0, 0));
    }

    #[test]
    fn rotation_flips_rows_and_columns() {
        let (_, mut settings, fonts, _) = fixture();
        let plain = Compositor::render_preview(&settings, &fonts, "12", "34", "00");
        settings.rotate_180 = true;
        let rotated = Compositor::render_preview(&settings, &fonts, "12", "34", "00");
        for row in 0..DISPLAY_HEIGHT {
            for col in 0..DISPLAY_WIDTH {
                assert_eq!(
                    rotated.point(row, col),
                    plain.point(DISPLAY_HEIGHT - 1 - row, DISPLAY_WIDTH - 1 - col)
                );
            }
        }
    }

    #[test]
    fn seconds_layout_clips_within_the_panel() {
        let (_, mut settings, fonts, _) = fixture();
        settings.show_seconds = true;
        // narrow digits + separator + small seconds overflow by one
        // padding column, which must clip silently
        let frame = Compositor::render_preview(&settings, &fonts, "28", "59", "47");
        assert!(!frame.is_blank());
    }

    #[test]
    fn compose_row_rules() {
        let prev = [1, 2, 3, 4, 5, 6, 7, 8];
        let curr = [11, 12, 13, 14, 15, 16, 17, 18];

        // blank row at the step line for gap styles
        for style in [
            AnimationStyle::WipeWithGap,
            AnimationStyle::ScrollReplaceWithGap,
            AnimationStyle::WipeWithGapUnshifted,
        ] {
            assert_eq!(compose_row(style, 3, 3, &prev, &curr), 0);
        }

        // scroll-replace keeps both glyphs unshifted
        assert_eq!(
            compose_row(AnimationStyle::ScrollReplaceWithGap, 3, 1, &prev, &curr),
            prev[1]
        );
        assert_eq!(
            compose_row(AnimationStyle::ScrollReplaceWithGap, 3, 6, &prev, &curr),
            curr[6]
        );

        // plain scroll splits at the step line
        assert_eq!(compose_row(AnimationStyle::PlainScroll, 4, 3, &prev, &curr), prev[3]);
        assert_eq!(compose_row(AnimationStyle::PlainScroll, 4, 4, &prev, &curr), curr[4]);

        // shifted styles read the old glyph step+1 rows lower, blank past
        // the top
        assert_eq!(
            compose_row(AnimationStyle::ShiftWithoutGap, 2, 1, &prev, &curr),
            prev[4]
        );
        assert_eq!(
            compose_row(AnimationStyle::ShiftWithoutGap, 7, 5, &prev, &curr),
            0
        );

        // wipe-with-gap scrolls the new glyph in beneath the gap
        assert_eq!(
            compose_row(AnimationStyle::WipeWithGap, 2, 5, &prev, &curr),
            curr[2]
        );
    }

    #[test]
    fn gap_styles_take_one_extra_step() {
        assert_eq!(AnimationStyle::WipeWithGap.steps(), 9);
        assert_eq!(AnimationStyle::ScrollReplaceWithGap.steps(), 9);
        assert_eq!(AnimationStyle::WipeWithGapUnshifted.steps(), 9);
        assert_eq!(AnimationStyle::PlainScroll.steps(), 8);
        assert_eq!(AnimationStyle::ShiftWithoutGap.steps(), 8);
    }
}

//! Accessibility UI / interaction preferences

use serde::{Deserialize, Serialize};

/// Smallest and largest accepted font scale multipliers
pub const FONT_SCALE_MIN: f32 = 1.0;
pub const FONT_SCALE_MAX: f32 = 2.0;

/// Accessibility preferences of one learner
///
/// Every policy carries a default set; caller-supplied preferences are merged
/// over those defaults with [`PreferenceSet::merged_over`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceSet {
    pub high_contrast: bool,
    pub font_scale: f32,
    pub dyslexia_font: bool,
    pub focus_line: bool,
    pub captions_always_on: bool,
    pub visual_rubric: bool,
    pub stammer_friendly: bool,
    pub longer_response_window: bool,
    pub sensory_friendly: bool,
    pub gamification_off: bool,
    pub aac_mode: bool,
}

impl Default for PreferenceSet {
    fn default() -> Self {
        Self {
            high_contrast: false,
            font_scale: FONT_SCALE_MIN,
            dyslexia_font: false,
            focus_line: false,
            captions_always_on: false,
            visual_rubric: false,
            stammer_friendly: false,
            longer_response_window: false,
            sensory_friendly: false,
            gamification_off: false,
            aac_mode: false,
        }
    }
}

impl PreferenceSet {
    /// Merge `self` (caller preferences) over `defaults`.
    ///
    /// Flags are OR'ed: a category default can never be switched off by the
    /// caller. Font scale takes the larger value, clamped to the accepted range.
    pub fn merged_over(&self, defaults: &PreferenceSet) -> PreferenceSet {
        PreferenceSet {
            high_contrast: self.high_contrast || defaults.high_contrast,
            font_scale: self
                .font_scale
                .max(defaults.font_scale)
                .clamp(FONT_SCALE_MIN, FONT_SCALE_MAX),
            dyslexia_font: self.dyslexia_font || defaults.dyslexia_font,
            focus_line: self.focus_line || defaults.focus_line,
            captions_always_on: self.captions_always_on || defaults.captions_always_on,
            visual_rubric: self.visual_rubric || defaults.visual_rubric,
            stammer_friendly: self.stammer_friendly || defaults.stammer_friendly,
            longer_response_window: self.longer_response_window
                || defaults.longer_response_window,
            sensory_friendly: self.sensory_friendly || defaults.sensory_friendly,
            gamification_off: self.gamification_off || defaults.gamification_off,
            aac_mode: self.aac_mode || defaults.aac_mode,
        }
    }
}

//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!

use std::cell::Cell;

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Projectile lands on the board (or bounces off a wall)
    Impact,
    /// A matched ball pops
    Pop,
    /// Level cleared
    LevelClear,
    /// Level failed
    LevelFail,
    /// Projectile fired
    Launch,
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    /// Cycles pop pitch so bursts don't sound identical
    pop_variation: Cell<u32>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            pop_variation: Cell::new(0),
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Suspend audio context (tab hidden / game paused)
    pub fn suspend(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.suspend();
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect immediately
    pub fn play(&self, effect: SoundEffect) {
        self.play_with_delay(effect, 0.0);
    }

    /// Play a sound effect `delay_ms` from now. Cascade pops arrive with
    /// their stagger already computed by the simulation.
    pub fn play_with_delay(&self, effect: SoundEffect, delay_ms: f32) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let when = ctx.current_time() + delay_ms.max(0.0) as f64 / 1000.0;

        match effect {
            SoundEffect::Impact => self.play_impact(ctx, vol, when),
            SoundEffect::Pop => self.play_pop(ctx, vol, when),
            SoundEffect::LevelClear => self.play_level_clear(ctx, vol, when),
            SoundEffect::LevelFail => self.play_level_fail(ctx, vol, when),
            SoundEffect::Launch => self.play_launch(ctx, vol, when),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Impact - solid thump
    fn play_impact(&self, ctx: &AudioContext, vol: f32, t: f64) {
        let Some((osc, gain)) = self.create_osc(ctx, 180.0, OscillatorType::Sine) else {
            return;
        };

        gain.gain().set_value_at_time(vol * 0.5, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();
        osc.frequency().set_value_at_time(180.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(70.0, t + 0.1)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Pop - short rising blip, pitch cycling per call
    fn play_pop(&self, ctx: &AudioContext, vol: f32, t: f64) {
        let step = self.pop_variation.get();
        self.pop_variation.set(step.wrapping_add(1));
        let base = 500.0 + 80.0 * (step % 4) as f32;

        let Some((osc, gain)) = self.create_osc(ctx, base, OscillatorType::Triangle) else {
            return;
        };

        gain.gain().set_value_at_time(vol * 0.35, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.12)
            .ok();
        osc.frequency().set_value_at_time(base, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(base * 2.0, t + 0.08)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Launch - whoosh up
    fn play_launch(&self, ctx: &AudioContext, vol: f32, t: f64) {
        let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Triangle) else {
            return;
        };

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.2)
            .ok();
        osc.frequency().set_value_at_time(200.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(600.0, t + 0.15)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + 0.25).ok();
    }

    /// Level clear - triumphant fanfare
    fn play_level_clear(&self, ctx: &AudioContext, vol: f32, when: f64) {
        for (i, freq) in [400.0, 500.0, 600.0, 800.0].iter().enumerate() {
            let t = when + i as f64 * 0.1;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.5).ok();
            }
        }
    }

    /// Level fail - sad descending
    fn play_level_fail(&self, ctx: &AudioContext, vol: f32, when: f64) {
        for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
            let t = when + i as f64 * 0.2;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.4).ok();
            }
        }
    }
}
